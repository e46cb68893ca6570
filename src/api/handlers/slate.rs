use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::api::handlers::projections::validated_players;
use crate::api::{state::AppState, types::*};

/// POST /api/slate
///
/// Replace the tracked slate. The background watcher starts polling the new
/// players and games on its next tick.
pub async fn load_slate(
    State(state): State<AppState>,
    Json(request): Json<SlateRequest>,
) -> std::result::Result<Json<SlateResponse>, (StatusCode, String)> {
    let players = validated_players(request.players)?;

    let count = state.slate.load(request.label.clone(), players).await;
    let games = state.slate.game_keys().len();
    info!(
        "slate loaded: {} players across {} games ({})",
        count,
        games,
        request.label.as_deref().unwrap_or("unlabeled")
    );

    Ok(Json(SlateResponse {
        label: request.label,
        players: count,
        games,
    }))
}

/// DELETE /api/slate
///
/// Rollover: empty the store and reset the alert engine so the next slate
/// seeds fresh instead of comparing against stale values.
pub async fn clear_slate(State(state): State<AppState>) -> Json<SlateResponse> {
    let label = state.slate.label().await;
    let dropped = state.slate.clear().await;
    state.alerts.reset();
    info!(
        "slate cleared: {} players dropped ({})",
        dropped,
        label.as_deref().unwrap_or("unlabeled")
    );

    Json(SlateResponse {
        label,
        players: 0,
        games: 0,
    })
}
