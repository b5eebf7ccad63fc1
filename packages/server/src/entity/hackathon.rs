use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hackathon")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub host_id: Uuid,
    #[sea_orm(belongs_to, from = "host_id", to = "id")]
    pub host: HasOne<super::user::Entity>,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub category_id: Option<Uuid>,
    #[sea_orm(belongs_to, from = "category_id", to = "id", on_delete = "SetNull")]
    pub category: HasOne<super::category::Entity>,

    pub prize: i64,
    pub start_datetime: DateTimeUtc,
    pub end_datetime: DateTimeUtc,

    /// Participant row of this same hackathon. Kept as a plain column because
    /// participant already references hackathon.
    pub winner_id: Option<Uuid>,

    pub image: String,

    #[sea_orm(has_many)]
    pub participants: HasMany<super::participant::Entity>,

    #[sea_orm(has_many)]
    pub participation_requests: HasMany<super::participation_request::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Whether `now` falls inside `[start_datetime, end_datetime]`, both ends inclusive.
    pub fn is_active_at(&self, now: DateTimeUtc) -> bool {
        self.start_datetime <= now && now <= self.end_datetime
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }
}

impl ActiveModelBehavior for ActiveModel {}
