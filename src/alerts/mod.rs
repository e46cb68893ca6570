//! Alert generation and fan-out
//!
//! The engine watches per-subject values (projections, sentiment, weather
//! severity), fires threshold alerts with a suppression window, and publishes
//! onto a broadcast bus that slow subscribers cannot stall.

pub mod bus;
pub mod engine;

pub use bus::AlertBus;
pub use engine::AlertEngine;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    ProjectionChange,
    SocialUpdate,
    WeatherUpdate,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectionChange => "PROJECTION_CHANGE",
            Self::SocialUpdate => "SOCIAL_UPDATE",
            Self::WeatherUpdate => "WEATHER_UPDATE",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Old and new observed values plus the relative change between them
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlertPayload {
    pub old_value: f64,
    pub new_value: f64,
    pub percentage_change: f64,
}

/// Immutable once created; everything downstream gets a clone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertNotification {
    pub id: Uuid,
    pub kind: AlertKind,
    pub subject_id: String,
    pub severity: AlertSeverity,
    pub payload: AlertPayload,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
