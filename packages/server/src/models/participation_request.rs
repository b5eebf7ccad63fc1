use chrono::{DateTime, Utc};
use common::ParticipationStatus;
use sea_orm::Order;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::hackathon::HackathonBrief;
use super::shared::{PageParams, Pagination};
use super::user::UserSummary;
use crate::error::AppError;

/// Review decision. Only `approved` and `rejected` are accepted.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateRequestStatus {
    #[schema(example = "approved")]
    pub status: String,
}

impl UpdateRequestStatus {
    /// The requested target state; `pending` or anything unknown is a 400.
    pub fn decision(&self) -> Result<ParticipationStatus, AppError> {
        match self.status.parse::<ParticipationStatus>() {
            Ok(status @ (ParticipationStatus::Approved | ParticipationStatus::Rejected)) => {
                Ok(status)
            }
            _ => Err(AppError::field("status", "Invalid status.")),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RequestResponse {
    pub id: Uuid,
    pub hackathon_id: Uuid,
    pub user: UserSummary,
    pub status: ParticipationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RequestListResponse {
    pub data: Vec<RequestResponse>,
    pub pagination: Pagination,
}

/// One of the caller's own requests.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MyRequestResponse {
    pub id: Uuid,
    pub hackathon: HackathonBrief,
    pub status: ParticipationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MyRequestListResponse {
    pub data: Vec<MyRequestResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, Default, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequestListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// Status filter; repeat the key or separate values with commas.
    #[serde(default)]
    pub status: Vec<String>,
    /// Hackathon listing: substring of the requester's username, e-mail or name.
    /// Own listing: substring of the hackathon title.
    pub search: Option<String>,
    /// `created_at` or `-created_at` (default).
    pub ordering: Option<String>,
}

impl RequestListQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            page_size: self.page_size,
        }
    }

    pub fn statuses(&self) -> Result<Vec<ParticipationStatus>, AppError> {
        self.status
            .iter()
            .flat_map(|raw| raw.split(','))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<ParticipationStatus>()
                    .map_err(|e| AppError::field("status", e.to_string()))
            })
            .collect()
    }

    pub fn created_order(&self) -> Result<Order, AppError> {
        match self.ordering.as_deref().map(str::trim) {
            None | Some("") | Some("-created_at") => Ok(Order::Desc),
            Some("created_at") => Ok(Order::Asc),
            Some(_) => Err(AppError::field(
                "ordering",
                "ordering must be one of: created_at, -created_at",
            )),
        }
    }
}
