use axum::{extract::FromRequestParts, http::header};

use crate::{
    dto::auth::TokenKind,
    error::AppError,
    roles::{Action, Role},
    services::auth_service::decode_token,
    state::AppState,
};

/// The verified caller attached to a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
}

pub fn ensure_permission(user: &AuthUser, action: Action) -> Result<(), AppError> {
    if !user.role.permits(action) {
        tracing::warn!(user_id = user.user_id, role = user.role.name(), ?action, "permission denied");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::unauthorized("Invalid Authorization header"))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization scheme"))?
            .trim();

        decode_token(&state.config.jwt_secret, token, TokenKind::Access)
    }
}
