use chrono::{DateTime, Utc};
use common::UserRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{double_option, validate_email, validate_password};
use crate::entity::user;
use crate::error::AppError;

/// Public view of a user, embedded in participant and request listings.
#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    #[schema(example = "profile_pictures/default.jpg")]
    pub profile_picture: String,
}

impl From<user::Model> for UserSummary {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            first_name: m.first_name,
            last_name: m.last_name,
            role: m.role,
            profile_picture: m.profile_picture,
        }
    }
}

/// Full profile of the authenticated user.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "ada")]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub is_admin: bool,
    pub profile_picture: String,
    pub profile_background: String,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            username: m.username,
            first_name: m.first_name,
            last_name: m.last_name,
            role: m.role,
            is_admin: m.is_admin,
            profile_picture: m.profile_picture,
            profile_background: m.profile_background,
            created_at: m.created_at,
        }
    }
}

/// Partial profile update. A `null` username resets it to the e-mail local part.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateMeRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub username: Option<Option<String>>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// New password (8-128 characters).
    pub password: Option<String>,
    pub profile_picture: Option<String>,
    pub profile_background: Option<String>,
}

pub fn validate_update_me(payload: &UpdateMeRequest) -> Result<(), AppError> {
    if let Some(Some(username)) = &payload.username {
        let username = username.trim();
        if username.is_empty() || username.chars().count() > 150 {
            return Err(AppError::field(
                "username",
                "Username must be 1-150 characters",
            ));
        }
    }
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }
    for (field, value) in [
        ("first_name", &payload.first_name),
        ("last_name", &payload.last_name),
    ] {
        if value.as_ref().is_some_and(|v| v.chars().count() > 150) {
            return Err(AppError::field(field, "Must be at most 150 characters"));
        }
    }
    for (field, value) in [
        ("profile_picture", &payload.profile_picture),
        ("profile_background", &payload.profile_background),
    ] {
        if value.as_ref().is_some_and(|v| v.trim().is_empty()) {
            return Err(AppError::field(field, "Must not be empty"));
        }
    }
    if let Some(password) = &payload.password {
        validate_password(password)?;
    }
    Ok(())
}
