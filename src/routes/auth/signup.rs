use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::models::user::UserRole;
use crate::responses::JsonResponse;
use crate::state::AppState;
use crate::store::user_store::{UserStore, UserStoreError};
use crate::utils::password::hash_password;

use super::session::establish_session;

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Deserialize, Serialize)]
pub struct SignupPayload {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(rename = "adminInvite")]
    pub admin_invite: Option<String>,
}

/// Admin is granted only when the submitted invite matches the configured,
/// non-empty code. An absent or empty configured code never grants admin.
fn grant_role(invite: Option<&str>, configured: Option<&str>) -> UserRole {
    match (invite, configured) {
        (Some(code), Some(expected)) if !expected.is_empty() && code == expected => UserRole::Admin,
        _ => UserRole::User,
    }
}

pub async fn handle_signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Response {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return JsonResponse::bad_request("Email and password required").into_response();
    }
    if payload.password.chars().count() < MIN_PASSWORD_CHARS {
        return JsonResponse::bad_request("Password must be at least 6 chars").into_response();
    }

    let role = grant_role(
        payload.admin_invite.as_deref(),
        state.config.admin_invite_code.as_deref(),
    );

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::error!(?err, "password hashing failed");
            return JsonResponse::server_error("Password hashing failed").into_response();
        }
    };

    let user = match state.users.create_user(&email, &password_hash, role).await {
        Ok(user) => user,
        Err(UserStoreError::EmailTaken) => {
            return JsonResponse::conflict("Account already exists").into_response();
        }
        Err(err) => {
            tracing::error!(?err, "failed to persist new account");
            return JsonResponse::server_error("Could not create user").into_response();
        }
    };

    establish_session(&user, &state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        extract::Request,
        http::StatusCode,
        routing::post,
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::config::Config;
    use crate::metrics::MetricsHandle;
    use crate::services::payments::MockPaymentService;
    use crate::store::mock_store::MockUserStore;
    use crate::store::user_store::UserStore;
    use crate::utils::jwt::JwtKeys;

    fn test_state(users: MockUserStore, invite_code: Option<&str>) -> AppState {
        AppState {
            users: Arc::new(users),
            catalog: Arc::new(StaticCatalog::default()),
            payments: Arc::new(MockPaymentService::new()),
            metrics: MetricsHandle::new(),
            jwt_keys: JwtKeys::from_secret("0123456789abcdef0123456789abcdef").unwrap(),
            config: Arc::new(Config {
                port: 3000,
                base_url: "http://localhost:3000".into(),
                session_secret: "0123456789abcdef0123456789abcdef".into(),
                stripe_secret_key: "sk_test_dummy".into(),
                stripe_webhook_secret: "whsec_test".into(),
                admin_invite_code: invite_code.map(String::from),
                users_path: "data/users.json".into(),
                products_path: "data/products.json".into(),
                public_dir: "public".into(),
            }),
        }
    }

    fn build_app(state: AppState) -> Router {
        Router::new()
            .route("/signup", post(handle_signup))
            .with_state(state)
    }

    async fn post_signup(app: Router, body: Value) -> (StatusCode, Value, Option<String>) {
        let res = app
            .oneshot(
                Request::post("/signup")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = res.status();
        let cookie = res
            .headers()
            .get("set-cookie")
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        (status, json, cookie)
    }

    // --- Role assignment ---

    #[test]
    fn correct_invite_grants_admin() {
        assert_eq!(grant_role(Some("letmein"), Some("letmein")), UserRole::Admin);
    }

    #[test]
    fn wrong_absent_or_empty_invite_grants_user() {
        assert_eq!(grant_role(Some("nope"), Some("letmein")), UserRole::User);
        assert_eq!(grant_role(None, Some("letmein")), UserRole::User);
        assert_eq!(grant_role(Some(""), Some("letmein")), UserRole::User);
        // A blank configured code must never grant admin, even on an exact match.
        assert_eq!(grant_role(Some(""), Some("")), UserRole::User);
        assert_eq!(grant_role(Some("anything"), None), UserRole::User);
    }

    // --- Handler ---

    #[tokio::test]
    async fn signup_creates_a_user_session() {
        let app = build_app(test_state(MockUserStore::new(), Some("letmein")));
        let (status, json, cookie) = post_signup(
            app,
            json!({ "email": "a@x.com", "password": "secret1" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
        assert_eq!(json["user"]["email"], "a@x.com");
        assert_eq!(json["user"]["role"], "user");
        assert!(json["user"].get("passwordHash").is_none());

        let cookie = cookie.expect("session cookie should be set");
        assert!(cookie.starts_with("auth_token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
    }

    #[tokio::test]
    async fn duplicate_email_differing_only_in_case_conflicts() {
        let state = test_state(MockUserStore::new(), None);
        let app = build_app(state);

        let (status, _, _) = post_signup(
            app.clone(),
            json!({ "email": "a@x.com", "password": "secret1" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json, _) = post_signup(
            app,
            json!({ "email": "A@X.com", "password": "secret1" }),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["message"], "Account already exists");
    }

    #[tokio::test]
    async fn short_password_is_rejected_even_with_valid_email() {
        let app = build_app(test_state(MockUserStore::new(), None));
        let (status, json, _) = post_signup(
            app,
            json!({ "email": "a@x.com", "password": "five5" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Password must be at least 6 chars");
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let app = build_app(test_state(MockUserStore::new(), None));
        let (status, _, _) = post_signup(app.clone(), json!({ "password": "secret1" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) = post_signup(app, json!({ "email": "a@x.com" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn matching_invite_signs_up_an_admin() {
        let state = test_state(MockUserStore::new(), Some("letmein"));
        let users = state.users.clone();
        let app = build_app(state);

        let (status, json, _) = post_signup(
            app,
            json!({ "email": "boss@x.com", "password": "secret1", "adminInvite": "letmein" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["user"]["role"], "admin");

        let stored = users.find_by_email("boss@x.com").await.unwrap().unwrap();
        assert_eq!(stored.role, UserRole::Admin);
        // Only the salted hash is persisted.
        assert_ne!(stored.password_hash, "secret1");
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn email_is_trimmed_and_lowercased_before_storing() {
        let state = test_state(MockUserStore::new(), None);
        let users = state.users.clone();
        let app = build_app(state);

        let (status, json, _) = post_signup(
            app,
            json!({ "email": "  Mixed@Case.COM  ", "password": "secret1" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["user"]["email"], "mixed@case.com");
        assert!(users.find_by_email("mixed@case.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn store_failure_is_a_server_error() {
        let app = build_app(test_state(MockUserStore::failing(), None));
        let (status, _, _) = post_signup(
            app,
            json!({ "email": "a@x.com", "password": "secret1" }),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
