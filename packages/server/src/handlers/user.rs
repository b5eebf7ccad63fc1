use axum::Json;
use axum::extract::State;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{hackathon, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::path::AppPath;
use crate::extractors::query::AppQuery;
use crate::models::hackathon::{HackathonListQuery, HackathonListResponse};
use crate::state::AppState;
use crate::utils::hackathon::paginate_hackathons;

#[utoipa::path(
    get,
    path = "/{user_id}/hackathons",
    tag = "Users",
    operation_id = "listUserHackathons",
    summary = "List hackathons hosted by a user",
    description = "Public. Accepts the same filters as the hackathon list.",
    params(("user_id" = Uuid, Path, description = "User ID"), HackathonListQuery),
    responses(
        (status = 200, description = "Hosted hackathons", body = HackathonListResponse),
        (status = 400, description = "Invalid filter (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(user_id = %user_id))]
pub async fn list_user_hackathons(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<HackathonListQuery>,
) -> Result<Json<HackathonListResponse>, AppError> {
    user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let select = hackathon::Entity::find().filter(hackathon::Column::HostId.eq(user_id));
    Ok(Json(paginate_hackathons(&state.db, select, &query).await?))
}
