use chrono::{DateTime, Utc};
use sea_orm::Order;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::CategoryResponse;
use super::shared::{PageParams, Pagination, double_option, validate_title};
use crate::entity::hackathon;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateHackathonRequest {
    #[schema(example = "Spring Jam")]
    pub title: String,
    pub description: String,
    /// Category ID.
    pub category: Option<Uuid>,
    /// Non-negative prize amount. Default: 0.
    #[serde(default)]
    #[schema(example = 5000)]
    pub prize: i64,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    /// Image URL produced by the storage service.
    #[schema(example = "https://cdn.example.com/hackathons/spring-jam.png")]
    pub image: String,
}

pub fn validate_create_hackathon(payload: &CreateHackathonRequest) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    validate_description(&payload.description)?;
    validate_prize(payload.prize)?;
    validate_image(&payload.image)?;
    validate_window(payload.start_datetime, payload.end_datetime)
}

/// Partial update. `category` and `winner` accept `null` to clear the reference.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateHackathonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub category: Option<Option<Uuid>>,
    pub prize: Option<i64>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    /// Participant ID of the winner. Only settable once the hackathon is not active.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub winner: Option<Option<Uuid>>,
    pub image: Option<String>,
}

/// Field checks that don't need the stored row. The time window and the
/// winner rules are checked against the locked row in the handler.
pub fn validate_update_hackathon(payload: &UpdateHackathonRequest) -> Result<(), AppError> {
    if let Some(title) = &payload.title {
        validate_title(title)?;
    }
    if let Some(description) = &payload.description {
        validate_description(description)?;
    }
    if let Some(prize) = payload.prize {
        validate_prize(prize)?;
    }
    if let Some(image) = &payload.image {
        validate_image(image)?;
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.trim().is_empty() {
        return Err(AppError::field("description", "Description must not be empty"));
    }
    Ok(())
}

fn validate_prize(prize: i64) -> Result<(), AppError> {
    if prize < 0 {
        return Err(AppError::field("prize", "Prize must be >= 0"));
    }
    Ok(())
}

fn validate_image(image: &str) -> Result<(), AppError> {
    if image.trim().is_empty() {
        return Err(AppError::field("image", "Image must not be empty"));
    }
    Ok(())
}

pub fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if start >= end {
        return Err(AppError::field(
            "end_datetime",
            "End datetime must be after start datetime.",
        ));
    }
    Ok(())
}

/// Filters shared by every hackathon listing.
#[derive(Deserialize, Default, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HackathonListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// Category slug.
    pub category: Option<String>,
    /// `active` (running now) or `past` (ended). Other values are ignored.
    pub hackathon_status: Option<String>,
    /// Only hackathons starting at or after this instant.
    pub start_after: Option<DateTime<Utc>>,
    /// Only hackathons ending at or before this instant.
    pub end_before: Option<DateTime<Utc>>,
    /// Username of the winning participant.
    pub winner: Option<String>,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    /// `start_datetime`, `end_datetime` or `prize`, optionally prefixed with `-`.
    pub ordering: Option<String>,
}

impl HackathonListQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            page_size: self.page_size,
        }
    }

    pub fn order(&self) -> Result<(hackathon::Column, Order), AppError> {
        let raw = self.ordering.as_deref().map(str::trim).unwrap_or("");
        let (field, order) = match raw.strip_prefix('-') {
            Some(field) => (field, Order::Desc),
            None => (raw, Order::Asc),
        };
        let column = match field {
            "" | "start_datetime" => hackathon::Column::StartDatetime,
            "end_datetime" => hackathon::Column::EndDatetime,
            "prize" => hackathon::Column::Prize,
            _ => {
                return Err(AppError::field(
                    "ordering",
                    "ordering must be one of: start_datetime, end_datetime, prize",
                ));
            }
        };
        Ok((column, order))
    }
}

#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct HostSummary {
    pub id: Uuid,
    #[schema(example = "grace")]
    pub username: String,
}

#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct WinnerSummary {
    pub participant_id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "ada")]
    pub username: String,
}

#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct HackathonListItem {
    pub id: Uuid,
    #[schema(example = "Spring Jam")]
    pub title: String,
    pub host: HostSummary,
    pub category: Option<CategoryResponse>,
    #[schema(example = 5000)]
    pub prize: i64,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub winner: Option<WinnerSummary>,
    pub image: String,
    /// Whether the hackathon is running right now.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HackathonResponse {
    #[serde(flatten)]
    pub summary: HackathonListItem,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HackathonListResponse {
    pub data: Vec<HackathonListItem>,
    pub pagination: Pagination,
}

/// Compact hackathon reference embedded in the caller's own requests and participations.
#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct HackathonBrief {
    pub id: Uuid,
    #[schema(example = "Spring Jam")]
    pub title: String,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub is_active: bool,
}

impl From<&hackathon::Model> for HackathonBrief {
    fn from(m: &hackathon::Model) -> Self {
        Self {
            id: m.id,
            title: m.title.clone(),
            start_datetime: m.start_datetime,
            end_datetime: m.end_datetime,
            is_active: m.is_active(),
        }
    }
}
