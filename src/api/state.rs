use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::alerts::AlertEngine;
use crate::config::AppConfig;
use crate::domain::SlateStore;
use crate::error::Result;
use crate::projection::ProjectionService;
use crate::providers::{ProviderHub, SignalSource};
use crate::services::metrics::CoreMetrics;
use crate::services::usage::UsageTracker;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,

    /// Concrete provider clients; also the watcher's signal source
    pub providers: Arc<ProviderHub>,

    /// Enhancement pipeline
    pub projections: Arc<ProjectionService>,

    /// Threshold alerting and the broadcast bus behind `/ws`
    pub alerts: Arc<AlertEngine>,

    /// Per-provider per-day accounting
    pub usage: Arc<UsageTracker>,

    /// Players currently tracked for polling
    pub slate: Arc<SlateStore>,

    pub metrics: Arc<CoreMetrics>,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    /// Wire the full service graph from configuration
    pub fn build(config: AppConfig) -> Result<Self> {
        let config = Arc::new(config);
        let metrics = Arc::new(CoreMetrics::new());
        let usage = Arc::new(UsageTracker::new(&config.usage, &config.providers));
        let providers = Arc::new(ProviderHub::from_config(
            &config,
            Arc::clone(&usage),
            Arc::clone(&metrics),
        )?);
        let alerts = Arc::new(AlertEngine::new(&config.alerts, Arc::clone(&metrics)));
        let projections = Arc::new(ProjectionService::new(
            &config,
            Arc::clone(&providers) as Arc<dyn SignalSource>,
            Arc::clone(&alerts),
            Arc::clone(&metrics),
        ));

        Ok(Self {
            config,
            providers,
            projections,
            alerts,
            usage,
            slate: Arc::new(SlateStore::new()),
            metrics,
            start_time: Utc::now(),
        })
    }

    /// Get process uptime in seconds
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_builds_from_defaults() {
        let state = AppState::build(AppConfig::default_config()).unwrap();
        assert!(state.slate.is_empty());
        assert_eq!(state.alerts.subscriber_count(), 0);
        assert!(state.uptime_seconds() >= 0);
    }
}
