use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::api::{
    auth::ensure_admin_authorized,
    state::AppState,
    types::{HistoryQuery, UsageRow},
};

/// GET /api/admin/usage
///
/// Today's ledger with a zeroed entry for every known provider, so the
/// dashboard never renders a null row.
pub async fn get_current_usage(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> std::result::Result<Json<Vec<UsageRow>>, (StatusCode, String)> {
    ensure_admin_authorized(&headers)?;
    let rows = state
        .usage
        .current_usage()
        .into_iter()
        .map(UsageRow::from)
        .collect();
    Ok(Json(rows))
}

/// GET /api/admin/usage/history?days=7
pub async fn get_usage_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> std::result::Result<Json<Vec<UsageRow>>, (StatusCode, String)> {
    ensure_admin_authorized(&headers)?;
    let days = query.days.unwrap_or(7);
    let rows = state
        .usage
        .usage_history(days)
        .into_iter()
        .map(UsageRow::from)
        .collect();
    Ok(Json(rows))
}
