use std::convert::Infallible;
use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use serde_json::json;
use time::Duration as TimeDuration;

use crate::models::user::{PublicUser, User, UserRole};
use crate::responses::JsonResponse;
use crate::state::AppState;
use crate::utils::jwt::{create_session_token, decode_session_token};

use super::claims::{Claims, SESSION_COOKIE, SESSION_TTL_HOURS};

/// Requires a live session; rejects with 401 otherwise.
#[derive(Debug)]
pub struct AuthSession(pub Claims);

impl<S> FromRequestParts<S> for AuthSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .ok_or_else(|| JsonResponse::unauthorized("Unauthenticated").into_response())?;

        let data = decode_session_token(token.value(), &app.jwt_keys)
            .map_err(|_| JsonResponse::unauthorized("Unauthenticated").into_response())?;

        Ok(AuthSession(data.claims))
    }
}

/// Never rejects: any session-read failure reads as "no session". Used by
/// routes that serve both logged-in and guest callers.
#[derive(Debug)]
pub struct MaybeSession(pub Option<Claims>);

impl<S> FromRequestParts<S> for MaybeSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = <AuthSession as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|AuthSession(claims)| claims);
        Ok(MaybeSession(session))
    }
}

/// Marker for the role a [`RequireRole`] guard demands.
pub trait RoleRequirement {
    const ROLE: UserRole;
}

#[derive(Debug)]
pub struct AdminRole;

impl RoleRequirement for AdminRole {
    const ROLE: UserRole = UserRole::Admin;
}

/// Capability guard composed in front of a handler: 401 without a session,
/// 403 when the session's role does not match the requirement.
#[derive(Debug)]
pub struct RequireRole<R: RoleRequirement> {
    pub claims: Claims,
    _role: PhantomData<R>,
}

pub type RequireAdmin = RequireRole<AdminRole>;

impl<S, R> FromRequestParts<S> for RequireRole<R>
where
    AppState: FromRef<S>,
    S: Send + Sync,
    R: RoleRequirement + Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthSession(claims) =
            <AuthSession as FromRequestParts<S>>::from_request_parts(parts, state).await?;

        if claims.role != R::ROLE {
            return Err(JsonResponse::forbidden("Forbidden").into_response());
        }

        Ok(RequireRole {
            claims,
            _role: PhantomData,
        })
    }
}

/// Issues a session for `user` and returns the `{ok, user}` response with the
/// session cookie attached. Shared by signup and login.
pub fn establish_session(user: &User, state: &AppState) -> Response {
    let claims = Claims {
        id: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
        exp: (Utc::now() + Duration::hours(SESSION_TTL_HOURS)).timestamp() as usize,
    };

    let token = match create_session_token(&claims, &state.jwt_keys) {
        Ok(token) => token,
        Err(err) => {
            tracing::error!(?err, "session token creation failed");
            return JsonResponse::server_error("Token generation failed").into_response();
        }
    };

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(false)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(TimeDuration::hours(SESSION_TTL_HOURS))
        .build();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie.to_string()).unwrap(),
    );

    (
        StatusCode::OK,
        headers,
        Json(json!({ "ok": true, "user": PublicUser::from(user) })),
    )
        .into_response()
}
