use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::user::PublicUser;
use crate::responses::JsonResponse;
use crate::state::AppState;
use crate::store::user_store::UserStore;
use crate::utils::password::verify_password;

use super::session::{establish_session, MaybeSession};

#[derive(Deserialize, Serialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// Unknown email and wrong password answer identically so the endpoint
// cannot be used to enumerate accounts.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub async fn handle_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Response {
    let user = match state.users.find_by_email(payload.email.trim()).await {
        Ok(Some(record)) => record,
        Ok(None) => return JsonResponse::unauthorized(INVALID_CREDENTIALS).into_response(),
        Err(err) => {
            tracing::error!(?err, "user store read failed during login");
            return JsonResponse::server_error("Store error").into_response();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => establish_session(&user, &state),
        Ok(false) => JsonResponse::unauthorized(INVALID_CREDENTIALS).into_response(),
        Err(err) => {
            tracing::error!(?err, "password verification failed");
            JsonResponse::server_error("Internal error").into_response()
        }
    }
}

/// Pure read of session state; no store access.
pub async fn handle_me(MaybeSession(session): MaybeSession) -> Response {
    match session {
        Some(claims) => Json(json!({
            "authenticated": true,
            "user": PublicUser::from(&claims),
        }))
        .into_response(),
        None => Json(json!({ "authenticated": false, "user": null })).into_response(),
    }
}
