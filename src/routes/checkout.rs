use std::collections::HashSet;

use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::catalog::ProductCatalog;
use crate::models::product::Product;
use crate::responses::JsonResponse;
use crate::services::payments::{
    CheckoutLineItem, CheckoutMode, CreateCheckoutSessionRequest, PaymentService,
};
use crate::state::AppState;

use super::auth::session::MaybeSession;

const SUB_ITEMS_IN_PAYMENT_CART: &str =
    r#"Cart has subscription items. Use "Checkout (Subscription)"."#;
const ONE_TIME_ITEMS_IN_SUB_CART: &str =
    r#"Cart has one-time items. Use "Checkout (One-time)"."#;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    pub mode: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItemPayload>,
    pub guest_email: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemPayload {
    pub price_id: String,
    #[serde(default)]
    pub qty: u64,
}

/// The cart arrives from an untrusted client, so every price id is checked
/// against the server-held catalog: a `payment` checkout may only contain
/// one-time price ids, a `subscription` checkout only subscription price ids.
fn validate_cart(
    mode: CheckoutMode,
    items: &[LineItemPayload],
    products: &[Product],
) -> Result<(), &'static str> {
    let (allowed, rejection): (HashSet<&str>, &'static str) = match mode {
        CheckoutMode::Payment => (
            products
                .iter()
                .filter_map(|p| p.one_time_price_id.as_deref())
                .collect(),
            SUB_ITEMS_IN_PAYMENT_CART,
        ),
        CheckoutMode::Subscription => (
            products
                .iter()
                .filter_map(|p| p.subscription_price_id.as_deref())
                .collect(),
            ONE_TIME_ITEMS_IN_SUB_CART,
        ),
    };

    for item in items {
        if !allowed.contains(item.price_id.as_str()) {
            return Err(rejection);
        }
    }
    Ok(())
}

/// Logged-in email wins and any client-supplied guest email is ignored;
/// otherwise the trimmed guest email is used.
fn resolve_customer_email(
    session_email: Option<String>,
    guest_email: Option<&str>,
) -> Option<String> {
    session_email.or_else(|| {
        guest_email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(String::from)
    })
}

pub async fn create_checkout_session(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Json(payload): Json<CheckoutPayload>,
) -> Response {
    if payload.line_items.is_empty() {
        return JsonResponse::bad_request("No line items").into_response();
    }

    let mode = match payload.mode.as_deref() {
        Some("payment") => CheckoutMode::Payment,
        Some("subscription") => CheckoutMode::Subscription,
        _ => return JsonResponse::bad_request("Invalid mode").into_response(),
    };

    let products = match state.catalog.read() {
        Ok(products) => products,
        Err(err) => {
            error!(?err, "failed to read product catalog for checkout");
            return JsonResponse::server_error("Catalog unavailable").into_response();
        }
    };

    if let Err(msg) = validate_cart(mode, &payload.line_items, &products) {
        return JsonResponse::bad_request(msg).into_response();
    }

    let customer_email = match resolve_customer_email(
        session.map(|claims| claims.email),
        payload.guest_email.as_deref(),
    ) {
        Some(email) => email,
        None => {
            return JsonResponse::bad_request("Email required (login or guest email)")
                .into_response();
        }
    };

    let request = CreateCheckoutSessionRequest {
        success_url: format!(
            "{}/admin.html?success=true&session_id={{CHECKOUT_SESSION_ID}}",
            state.config.base_url
        ),
        cancel_url: format!("{}/index.html?canceled=true", state.config.base_url),
        mode,
        line_items: payload
            .line_items
            .iter()
            .map(|li| CheckoutLineItem {
                price: li.price_id.clone(),
                quantity: if li.qty == 0 { 1 } else { li.qty },
            })
            .collect(),
        customer_email,
        allow_promotion_codes: true,
    };

    match state.payments.create_checkout_session(request).await {
        Ok(session) => match session.url {
            Some(url) => Json(json!({ "url": url })).into_response(),
            None => {
                error!(session_id = %session.id, "provider returned a session without a redirect url");
                JsonResponse::server_error("Unable to create checkout session").into_response()
            }
        },
        Err(err) => {
            error!(?err, "checkout session creation failed");
            JsonResponse::server_error("Unable to create checkout session").into_response()
        }
    }
}
