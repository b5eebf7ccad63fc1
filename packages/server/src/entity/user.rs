use common::UserRole;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub email: String,
    /// Defaults to the local part of `email`.
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC string.
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub is_admin: bool,
    pub profile_picture: String,
    pub profile_background: String,

    #[sea_orm(has_many)]
    pub participations: HasMany<super::participant::Entity>,

    #[sea_orm(has_many)]
    pub participation_requests: HasMany<super::participation_request::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
