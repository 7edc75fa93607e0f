use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{info, warn};

use crate::metrics::PaymentEvent;
use crate::responses::JsonResponse;
use crate::services::payments::PaymentService;
use crate::state::AppState;

/// POST /webhook. Registered with a raw body so signature verification sees
/// the exact payload bytes; no JSON extractor may run first.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    let sig = match headers
        .get("Stripe-Signature")
        .and_then(|h| h.to_str().ok())
    {
        Some(s) => s,
        None => return JsonResponse::bad_request("Missing Stripe-Signature").into_response(),
    };

    let event = match state.payments.verify_webhook(&body, sig) {
        Ok(event) => event,
        Err(err) => {
            warn!(?err, "webhook signature verification failed");
            return (StatusCode::BAD_REQUEST, "invalid webhook").into_response();
        }
    };

    match PaymentEvent::from_webhook(&event) {
        PaymentEvent::Ignored => {
            info!(event_type = %event.r#type, "unhandled provider event acknowledged");
        }
        parsed => state.metrics.record(&parsed),
    }

    // Acknowledge every verified delivery so the provider stops retrying.
    Json(json!({ "received": true })).into_response()
}
