use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use tracing::info;

use crate::api::{state::AppState, types::*};
use crate::domain::Player;

/// POST /api/projections
///
/// Enhance a batch of players. Validation is all-or-nothing: one bad player
/// rejects the request before any provider is called. Validated players join
/// the tracked slate so the background watcher polls them afterwards.
pub async fn enhance_projections(
    State(state): State<AppState>,
    Json(request): Json<EnhanceRequest>,
) -> std::result::Result<Json<EnhanceResponse>, (StatusCode, String)> {
    let players = validated_players(request.players)?;
    for player in &players {
        state.slate.upsert(player.clone());
    }

    info!("enhancing {} players", players.len());
    let results = state.projections.enhance_slate(&players).await;

    Ok(Json(EnhanceResponse {
        meta: EnhanceMeta {
            processed_at: Utc::now(),
            count: results.len(),
        },
        players: results,
    }))
}

pub(super) fn validated_players(
    inputs: Vec<PlayerInput>,
) -> std::result::Result<Vec<Player>, (StatusCode, String)> {
    if inputs.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "players must not be empty".to_string(),
        ));
    }

    let mut players = Vec::with_capacity(inputs.len());
    for input in inputs {
        let player = input.into_player();
        if let Err(e) = player.validate() {
            return Err((StatusCode::UNPROCESSABLE_ENTITY, e.to_string()));
        }
        players.push(player);
    }
    Ok(players)
}
