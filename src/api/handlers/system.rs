use axum::{extract::State, Json};

use crate::api::{state::AppState, types::HealthResponse};

/// GET /health -- lightweight liveness/readiness probe
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let enabled_providers = state
        .providers
        .enabled_providers()
        .iter()
        .map(|p| p.as_str().to_string())
        .collect();

    Json(HealthResponse {
        status: "ok".to_string(),
        enabled_providers,
        slate_players: state.slate.len(),
        uptime_secs: state.uptime_seconds(),
    })
}

/// GET /metrics -- counters in Prometheus text exposition format
pub async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.prometheus()
}
