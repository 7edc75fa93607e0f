use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};

use crate::routes::auth::session::RequireAdmin;
use crate::state::AppState;

/// GET /api/metrics. Read-only snapshot of the aggregates; admin only.
pub async fn metrics_snapshot(State(state): State<AppState>, _admin: RequireAdmin) -> Response {
    Json(state.metrics.snapshot()).into_response()
}
