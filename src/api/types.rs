use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::alerts::{AlertKind, AlertNotification};
use crate::domain::{Player, Position, ProjectionResult};
use crate::providers::ProviderKind;
use crate::services::usage::UsageRecord;

// ============================================================================
// Projection Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct EnhanceRequest {
    pub players: Vec<PlayerInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInput {
    pub id: String,
    pub name: String,
    pub position: Position,
    pub team: String,
    pub opponent: String,
    #[serde(default)]
    pub salary: u32,
    pub base_projection: f64,
}

impl PlayerInput {
    pub fn into_player(self) -> Player {
        Player {
            id: self.id,
            name: self.name,
            position: self.position,
            team: self.team,
            opponent: self.opponent,
            salary: self.salary,
            base_projection: self.base_projection,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhanceMeta {
    pub processed_at: DateTime<Utc>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnhanceResponse {
    pub players: Vec<ProjectionResult>,
    pub meta: EnhanceMeta,
}

// ============================================================================
// Slate Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SlateRequest {
    #[serde(default)]
    pub label: Option<String>,
    pub players: Vec<PlayerInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlateResponse {
    pub label: Option<String>,
    pub players: usize,
    pub games: usize,
}

// ============================================================================
// Admin Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<u32>,
}

/// One provider-day row as the dashboard consumes it, quota fraction
/// precomputed so the frontend never divides by a zero limit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRow {
    pub provider: ProviderKind,
    pub day: NaiveDate,
    pub request_count: u64,
    pub total_cost: f64,
    pub daily_limit: u32,
    pub quota_used: f64,
}

impl From<UsageRecord> for UsageRow {
    fn from(record: UsageRecord) -> Self {
        Self {
            quota_used: record.quota_used(),
            provider: record.provider,
            day: record.day,
            request_count: record.request_count,
            total_cost: record.total_cost,
            daily_limit: record.daily_limit,
        }
    }
}

// ============================================================================
// Health Check Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub enabled_providers: Vec<String>,
    pub slate_players: usize,
    pub uptime_secs: i64,
}

// ============================================================================
// WebSocket Types
// ============================================================================

/// Wire envelope pushed to subscribed clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    #[serde(rename = "PROJECTION_ALERT")]
    ProjectionAlert(AlertNotification),
    #[serde(rename = "SOCIAL_UPDATE")]
    SocialUpdate(AlertNotification),
    #[serde(rename = "WEATHER_UPDATE")]
    WeatherUpdate(AlertNotification),
}

impl From<AlertNotification> for WsMessage {
    fn from(notification: AlertNotification) -> Self {
        match notification.kind {
            AlertKind::ProjectionChange => Self::ProjectionAlert(notification),
            AlertKind::SocialUpdate => Self::SocialUpdate(notification),
            AlertKind::WeatherUpdate => Self::WeatherUpdate(notification),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertPayload, AlertSeverity};
    use serde_json::json;
    use uuid::Uuid;

    fn note(kind: AlertKind) -> AlertNotification {
        AlertNotification {
            id: Uuid::new_v4(),
            kind,
            subject_id: "p1".to_string(),
            severity: AlertSeverity::Warning,
            payload: AlertPayload {
                old_value: 20.0,
                new_value: 21.0,
                percentage_change: 0.05,
            },
            message: "projection for p1 moved +5.0% (20.00 to 21.00)".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_ws_envelope_type_tags() {
        let message = WsMessage::from(note(AlertKind::ProjectionChange));
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "PROJECTION_ALERT");
        assert_eq!(value["data"]["subject_id"], "p1");
        assert_eq!(value["data"]["severity"], "WARNING");

        let weather = WsMessage::from(note(AlertKind::WeatherUpdate));
        let value = serde_json::to_value(&weather).unwrap();
        assert_eq!(value["type"], "WEATHER_UPDATE");

        let social = WsMessage::from(note(AlertKind::SocialUpdate));
        let value = serde_json::to_value(&social).unwrap();
        assert_eq!(value["type"], "SOCIAL_UPDATE");
    }

    #[test]
    fn test_usage_row_carries_quota_fraction() {
        let record = UsageRecord {
            provider: ProviderKind::Odds,
            day: Utc::now().date_naive(),
            request_count: 125,
            total_cost: 0.125,
            daily_limit: 500,
        };

        let row = UsageRow::from(record);
        assert!((row.quota_used - 0.25).abs() < 1e-12);

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["provider"], "odds");
        assert!((value["quota_used"].as_f64().unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_player_input_accepts_minimal_payload() {
        let payload = json!({
            "id": "p-001",
            "name": "Test Player",
            "position": "WR",
            "team": "BUF",
            "opponent": "MIA",
            "base_projection": 14.2
        });

        let input: PlayerInput = serde_json::from_value(payload).unwrap();
        assert_eq!(input.salary, 0);

        let player = input.into_player();
        assert_eq!(player.position, Position::Wr);
        assert!(player.validate().is_ok());
    }
}
