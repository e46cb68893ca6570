use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::info;

/// Metrics collector for observability
pub struct CoreMetrics {
    /// Total player projections computed
    pub projections_computed: AtomicU64,
    /// Total enhancement batches served
    pub projection_batches: AtomicU64,
    /// Total outbound provider calls
    pub provider_calls: AtomicU64,
    /// Provider calls that failed or timed out
    pub provider_failures: AtomicU64,
    /// Signal cache hits
    pub cache_hits: AtomicU64,
    /// Alerts published to the bus
    pub alerts_emitted: AtomicU64,
    /// Alerts dropped inside the suppression window
    pub alerts_suppressed: AtomicU64,
    /// Connected WebSocket subscribers
    pub ws_clients: AtomicU64,
    /// Last batch timestamp
    last_batch: RwLock<i64>,
}

impl CoreMetrics {
    pub fn new() -> Self {
        Self {
            projections_computed: AtomicU64::new(0),
            projection_batches: AtomicU64::new(0),
            provider_calls: AtomicU64::new(0),
            provider_failures: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            alerts_emitted: AtomicU64::new(0),
            alerts_suppressed: AtomicU64::new(0),
            ws_clients: AtomicU64::new(0),
            last_batch: RwLock::new(Utc::now().timestamp()),
        }
    }

    pub fn inc_projections(&self, count: u64) {
        self.projections_computed.fetch_add(count, Ordering::Relaxed);
    }

    pub async fn inc_batches(&self) {
        self.projection_batches.fetch_add(1, Ordering::Relaxed);
        *self.last_batch.write().await = Utc::now().timestamp();
    }

    pub fn inc_provider_calls(&self) {
        self.provider_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_provider_failures(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_alerts_emitted(&self) {
        self.alerts_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_alerts_suppressed(&self) {
        self.alerts_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ws_client_connected(&self) {
        self.ws_clients.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ws_client_disconnected(&self) {
        // Saturating: a disconnect for a client we never counted stays at zero
        let _ = self
            .ws_clients
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// Get current metrics as a formatted string
    pub fn summary(&self) -> String {
        format!(
            r#"
=== SLATECAST STATUS ===
Projections: {} in {} batches
Provider Calls: {} ({} failed, {} cache hits)
Alerts: {} emitted, {} suppressed
WS Clients: {}
========================
"#,
            self.projections_computed.load(Ordering::Relaxed),
            self.projection_batches.load(Ordering::Relaxed),
            self.provider_calls.load(Ordering::Relaxed),
            self.provider_failures.load(Ordering::Relaxed),
            self.cache_hits.load(Ordering::Relaxed),
            self.alerts_emitted.load(Ordering::Relaxed),
            self.alerts_suppressed.load(Ordering::Relaxed),
            self.ws_clients.load(Ordering::Relaxed),
        )
    }

    /// Export metrics in Prometheus format
    pub fn prometheus(&self) -> String {
        format!(
            r#"# HELP slatecast_projections_total Total player projections computed
# TYPE slatecast_projections_total counter
slatecast_projections_total {}

# HELP slatecast_projection_batches_total Total enhancement batches served
# TYPE slatecast_projection_batches_total counter
slatecast_projection_batches_total {}

# HELP slatecast_provider_calls_total Total outbound provider calls
# TYPE slatecast_provider_calls_total counter
slatecast_provider_calls_total {}

# HELP slatecast_provider_failures_total Provider calls that failed or timed out
# TYPE slatecast_provider_failures_total counter
slatecast_provider_failures_total {}

# HELP slatecast_cache_hits_total Signal cache hits
# TYPE slatecast_cache_hits_total counter
slatecast_cache_hits_total {}

# HELP slatecast_alerts_emitted_total Alerts published to the bus
# TYPE slatecast_alerts_emitted_total counter
slatecast_alerts_emitted_total {}

# HELP slatecast_alerts_suppressed_total Alerts dropped inside the suppression window
# TYPE slatecast_alerts_suppressed_total counter
slatecast_alerts_suppressed_total {}

# HELP slatecast_ws_clients Connected WebSocket subscribers
# TYPE slatecast_ws_clients gauge
slatecast_ws_clients {}
"#,
            self.projections_computed.load(Ordering::Relaxed),
            self.projection_batches.load(Ordering::Relaxed),
            self.provider_calls.load(Ordering::Relaxed),
            self.provider_failures.load(Ordering::Relaxed),
            self.cache_hits.load(Ordering::Relaxed),
            self.alerts_emitted.load(Ordering::Relaxed),
            self.alerts_suppressed.load(Ordering::Relaxed),
            self.ws_clients.load(Ordering::Relaxed),
        )
    }

    /// Log periodic status
    pub fn log_status(&self) {
        info!("{}", self.summary());
    }
}

impl Default for CoreMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_client_gauge_never_underflows() {
        let metrics = CoreMetrics::new();
        metrics.ws_client_disconnected();
        assert_eq!(metrics.ws_clients.load(Ordering::Relaxed), 0);

        metrics.ws_client_connected();
        metrics.ws_client_connected();
        metrics.ws_client_disconnected();
        assert_eq!(metrics.ws_clients.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_prometheus_export_carries_counts() {
        let metrics = CoreMetrics::new();
        metrics.inc_projections(3);
        metrics.inc_alerts_emitted();

        let text = metrics.prometheus();
        assert!(text.contains("slatecast_projections_total 3"));
        assert!(text.contains("slatecast_alerts_emitted_total 1"));
    }
}
