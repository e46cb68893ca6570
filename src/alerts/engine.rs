//! Threshold alerting over observed value streams
//!
//! One state slot per tracked subject. The first observation only seeds the
//! slot; afterwards every observation updates it, and a change past the
//! configured threshold emits a notification unless an identical one already
//! fired inside the suppression window.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::alerts::{AlertBus, AlertKind, AlertNotification, AlertPayload, AlertSeverity};
use crate::config::AlertsConfig;
use crate::domain::{SocialSignal, WeatherSignal};
use crate::services::metrics::CoreMetrics;

/// Divisor floor so a change against an old value of zero stays finite
const DELTA_FLOOR: f64 = 1e-6;

/// Width of the rounded change bucket used as the dedup key
const CHANGE_BUCKET: f64 = 0.01;

pub struct AlertEngine {
    thresholds: AlertsConfig,
    suppression: Duration,
    /// Last modified projection per player
    last_projection: DashMap<String, f64>,
    /// Last sentiment per player
    last_sentiment: DashMap<String, f64>,
    /// Last weather severity per game key
    last_weather: DashMap<String, f64>,
    /// When each (subject, kind, bucket) combination last fired
    recent: DashMap<(String, AlertKind, i64), Instant>,
    bus: AlertBus,
    metrics: Arc<CoreMetrics>,
}

impl AlertEngine {
    pub fn new(config: &AlertsConfig, metrics: Arc<CoreMetrics>) -> Self {
        Self {
            suppression: Duration::from_secs(config.suppression_secs),
            bus: AlertBus::new(config.channel_capacity),
            thresholds: config.clone(),
            last_projection: DashMap::new(),
            last_sentiment: DashMap::new(),
            last_weather: DashMap::new(),
            recent: DashMap::new(),
            metrics,
        }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<AlertNotification> {
        self.bus.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    /// Record a freshly computed projection and alert on a large enough move.
    /// The threshold compares the relative change.
    pub fn observe_projection(&self, player_id: &str, new_value: f64) -> Option<AlertNotification> {
        let old = Self::swap_last(&self.last_projection, player_id, new_value)?;
        let pct = relative_change(old, new_value);
        let message = format!(
            "projection for {} moved {:+.1}% ({:.2} to {:.2})",
            player_id,
            pct * 100.0,
            old,
            new_value
        );
        self.evaluate(
            AlertKind::ProjectionChange,
            player_id,
            old,
            new_value,
            pct.abs(),
            self.thresholds.projection_change_pct,
            message,
        )
    }

    /// Record polled sentiment. The threshold compares the absolute
    /// sentiment delta, not the relative change.
    pub fn observe_social(&self, player_id: &str, signal: &SocialSignal) -> Option<AlertNotification> {
        let new_value = signal.sentiment;
        let old = Self::swap_last(&self.last_sentiment, player_id, new_value)?;
        let delta = new_value - old;
        let message = format!(
            "sentiment for {} shifted {:+.2} ({:.2} to {:.2})",
            player_id, delta, old, new_value
        );
        self.evaluate(
            AlertKind::SocialUpdate,
            player_id,
            old,
            new_value,
            delta.abs(),
            self.thresholds.sentiment_delta,
            message,
        )
    }

    /// Record polled weather for a game, thresholded on the absolute
    /// severity delta.
    pub fn observe_weather(&self, game_key: &str, signal: &WeatherSignal) -> Option<AlertNotification> {
        let new_value = signal.severity();
        let old = Self::swap_last(&self.last_weather, game_key, new_value)?;
        let delta = new_value - old;
        let message = format!(
            "weather severity for {} changed {:+.1} ({:.1} to {:.1})",
            game_key, delta, old, new_value
        );
        self.evaluate(
            AlertKind::WeatherUpdate,
            game_key,
            old,
            new_value,
            delta.abs(),
            self.thresholds.weather_severity_delta,
            message,
        )
    }

    /// Forget every tracked subject and the suppression ledger. Called at
    /// slate rollover so the next slate seeds from scratch.
    pub fn reset(&self) {
        self.last_projection.clear();
        self.last_sentiment.clear();
        self.last_weather.clear();
        self.recent.clear();
    }

    /// Drop suppression entries older than the window. Driven by a
    /// background task so the map stays bounded across long slates.
    pub fn sweep_suppression(&self) -> usize {
        let before = self.recent.len();
        let window = self.suppression;
        let now = Instant::now();
        self.recent
            .retain(|_, fired_at| now.duration_since(*fired_at) < window);
        before.saturating_sub(self.recent.len())
    }

    /// Periodic suppression-ledger sweep
    pub fn spawn_suppression_sweep(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let period = self.suppression.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            loop {
                tick.tick().await;
                let dropped = self.sweep_suppression();
                if dropped > 0 {
                    debug!("dropped {} expired suppression entries", dropped);
                }
            }
        })
    }

    /// Store the newest value for a subject and hand back the previous one.
    /// The entry guard serializes concurrent updates to the same subject, so
    /// two writers can never both read the same old value. A first
    /// observation seeds the slot and returns `None`.
    fn swap_last(map: &DashMap<String, f64>, subject: &str, new_value: f64) -> Option<f64> {
        match map.entry(subject.to_string()) {
            Entry::Occupied(mut slot) => Some(slot.insert(new_value)),
            Entry::Vacant(slot) => {
                slot.insert(new_value);
                None
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn evaluate(
        &self,
        kind: AlertKind,
        subject: &str,
        old_value: f64,
        new_value: f64,
        magnitude: f64,
        threshold: f64,
        message: String,
    ) -> Option<AlertNotification> {
        if !magnitude.is_finite() || magnitude < threshold {
            return None;
        }

        let severity = if magnitude >= 2.0 * threshold {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Warning
        };

        let pct = relative_change(old_value, new_value);
        if self.is_suppressed(kind, subject, pct) {
            self.metrics.inc_alerts_suppressed();
            debug!(
                "suppressed duplicate {} alert for {} within the window",
                kind, subject
            );
            return None;
        }

        let notification = AlertNotification {
            id: Uuid::new_v4(),
            kind,
            subject_id: subject.to_string(),
            severity,
            payload: AlertPayload {
                old_value,
                new_value,
                percentage_change: pct,
            },
            message,
            timestamp: Utc::now(),
        };

        info!(
            "{} {} alert for {}: {}",
            severity, kind, subject, notification.message
        );
        self.metrics.inc_alerts_emitted();
        self.bus.publish(notification.clone());
        Some(notification)
    }

    /// True when the same (subject, kind, rounded change bucket) already
    /// fired inside the window. A miss arms the key either way.
    fn is_suppressed(&self, kind: AlertKind, subject: &str, pct: f64) -> bool {
        let bucket = (pct / CHANGE_BUCKET).round() as i64;
        let now = Instant::now();
        match self.recent.entry((subject.to_string(), kind, bucket)) {
            Entry::Occupied(mut slot) => {
                if now.duration_since(*slot.get()) < self.suppression {
                    true
                } else {
                    slot.insert(now);
                    false
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(now);
                false
            }
        }
    }
}

fn relative_change(old: f64, new: f64) -> f64 {
    (new - old) / old.abs().max(DELTA_FLOOR)
}
