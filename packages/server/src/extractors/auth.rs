use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use common::UserRole;
use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect};
use uuid::Uuid;

use crate::entity::user;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication, or take
/// `Option<AuthUser>` on routes that anonymous callers may reach.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub is_admin: bool,
}

impl AuthUser {
    pub fn is_host(&self) -> bool {
        self.role.is_host()
    }

    /// Reject a still-valid token whose account has since been deleted.
    ///
    /// Inside a transaction the row stays share-locked until it ends, so an
    /// account deletion cannot slip in before rows referencing it are written.
    pub async fn ensure_account<C: ConnectionTrait>(&self, db: &C) -> Result<(), AppError> {
        user::Entity::find_by_id(self.user_id)
            .lock_shared()
            .one(db)
            .await?
            .map(|_| ())
            .ok_or(AppError::TokenInvalid)
    }
}

fn bearer_token(parts: &Parts) -> Option<Result<&str, AppError>> {
    let header = parts.headers.get("Authorization")?;
    Some(
        header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AppError::TokenInvalid),
    )
}

fn decode(token: &str, state: &AppState) -> Result<AuthUser, AppError> {
    let claims =
        jwt::verify(token, &state.config.auth.jwt_secret).map_err(|_| AppError::TokenInvalid)?;

    Ok(AuthUser {
        user_id: claims.uid,
        email: claims.sub,
        role: claims.role,
        is_admin: claims.is_admin,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::TokenMissing)??;
        decode(token, state)
    }
}

/// A missing header means an anonymous caller; a present but bad token is still rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match bearer_token(parts) {
            None => Ok(None),
            Some(token) => decode(token?, state).map(Some),
        }
    }
}
