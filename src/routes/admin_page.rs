use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::responses::JsonResponse;
use crate::routes::auth::session::RequireAdmin;
use crate::state::AppState;

/// GET /admin.html. The dashboard page is gated on the admin role here,
/// registered ahead of the generic static fallback so the file is never
/// served unauthenticated.
pub async fn admin_page(State(state): State<AppState>, _admin: RequireAdmin) -> Response {
    let path = state.config.public_dir.join("admin.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!(?err, path = %path.display(), "failed to read admin dashboard page");
            JsonResponse::not_found("Not found").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        extract::Request,
        http::{header, StatusCode},
        routing::get,
        Router,
    };
    use chrono::{Duration, Utc};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::config::Config;
    use crate::metrics::MetricsHandle;
    use crate::models::user::UserRole;
    use crate::routes::auth::claims::{Claims, SESSION_COOKIE};
    use crate::services::payments::MockPaymentService;
    use crate::store::mock_store::MockUserStore;
    use crate::utils::jwt::{create_session_token, JwtKeys};

    fn test_state(public_dir: std::path::PathBuf) -> AppState {
        AppState {
            users: Arc::new(MockUserStore::new()),
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
                admin_invite_code: None,
                users_path: "data/users.json".into(),
                products_path: "data/products.json".into(),
                public_dir,
            }),
        }
    }

    fn cookie_for(state: &AppState, role: UserRole) -> String {
        let claims = Claims {
            id: "u-1".into(),
            email: "admin@x.com".into(),
            role,
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        let token = create_session_token(&claims, &state.jwt_keys).unwrap();
        format!("{}={}", SESSION_COOKIE, token)
    }

    #[tokio::test]
    async fn admin_page_is_gated_by_role() {
        let public_dir = std::env::temp_dir().join(format!("public-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&public_dir).unwrap();
        std::fs::write(public_dir.join("admin.html"), "<h1>Dashboard</h1>").unwrap();

        let state = test_state(public_dir);
        let admin_cookie = cookie_for(&state, UserRole::Admin);
        let user_cookie = cookie_for(&state, UserRole::User);
        let app = Router::new()
            .route("/admin.html", get(admin_page))
            .with_state(state);

        let res = app
            .clone()
            .oneshot(Request::get("/admin.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = app
            .clone()
            .oneshot(
                Request::get("/admin.html")
                    .header(header::COOKIE, user_cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = app
            .oneshot(
                Request::get("/admin.html")
                    .header(header::COOKIE, admin_cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<h1>Dashboard</h1>");
    }
}
