use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::hackathon::HackathonBrief;
use super::shared::{PageParams, Pagination};
use super::user::UserSummary;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ParticipantResponse {
    pub id: Uuid,
    pub hackathon_id: Uuid,
    pub user: UserSummary,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ParticipantListResponse {
    pub data: Vec<ParticipantResponse>,
    pub pagination: Pagination,
}

/// One of the caller's own participations.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MyParticipationResponse {
    pub id: Uuid,
    pub hackathon: HackathonBrief,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MyParticipationListResponse {
    pub data: Vec<MyParticipationResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MyParticipationListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// Case-insensitive substring of the hackathon title.
    pub search: Option<String>,
}

impl MyParticipationListQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}
