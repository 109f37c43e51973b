use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    Json,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use super::error::ApiError;
use crate::auth::Session;
use crate::db::{LoginRequest, NewUser, UserResponse};
use crate::AppState;

/// Register endpoint
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewUser>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Login endpoint. On success the session cookie pair is set on the response.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserResponse>), ApiError> {
    let (jar, session) = state
        .auth
        .login(jar, &request.email, &request.password)
        .await
        .map_err(|e| {
            tracing::info!(error = %e, "Login rejected");
            ApiError::from(e)
        })?;
    Ok((jar, Json(UserResponse::from(session.user))))
}

/// Current session owner
///
/// GET /api/auth/me
pub async fn me(session: Session) -> Json<UserResponse> {
    Json(UserResponse::from(session.user))
}

/// Extractor for the authenticated session behind a request's cookies
#[async_trait]
impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        state
            .auth
            .check_headers(&parts.headers)
            .await
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
