use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::catalog::ProductCatalog;
use crate::responses::JsonResponse;
use crate::state::AppState;

/// GET /api/products. Public catalog snapshot.
pub async fn list_products(State(state): State<AppState>) -> Response {
    match state.catalog.read() {
        Ok(products) => Json(products).into_response(),
        Err(err) => {
            error!(?err, "failed to read product catalog");
            JsonResponse::server_error("Catalog unavailable").into_response()
        }
    }
}
