use axum::Json;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::participant;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::path::AppPath;
use crate::extractors::query::AppQuery;
use crate::models::participant::*;
use crate::models::shared::PageParams;
use crate::permissions::{self, AccessContext};
use crate::state::AppState;
use crate::utils::hackathon::{find_hackathon, hackathon_host_of, user_summaries};
use crate::utils::participation;

#[utoipa::path(
    get,
    path = "/",
    tag = "Participants",
    operation_id = "listParticipants",
    summary = "List participants of a hackathon",
    description = "Public. Newest first.",
    params(("id" = Uuid, Path, description = "Hackathon ID"), PageParams),
    responses(
        (status = 200, description = "List of participants", body = ParticipantListResponse),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, page), fields(hackathon_id = %hackathon_id))]
pub async fn list_participants(
    State(state): State<AppState>,
    AppPath(hackathon_id): AppPath<Uuid>,
    AppQuery(page): AppQuery<PageParams>,
) -> Result<Json<ParticipantListResponse>, AppError> {
    find_hackathon(&state.db, hackathon_id).await?;

    let select =
        participant::Entity::find().filter(participant::Column::HackathonId.eq(hackathon_id));

    let total = select
        .clone()
        .paginate(&state.db, page.per_page())
        .num_items()
        .await?;

    let rows = select
        .order_by_desc(participant::Column::CreatedAt)
        .order_by_desc(participant::Column::Id)
        .offset(Some(page.offset()))
        .limit(Some(page.per_page()))
        .all(&state.db)
        .await?;

    Ok(Json(ParticipantListResponse {
        data: participant_responses(&state.db, rows).await?,
        pagination: page.pagination(total),
    }))
}

#[utoipa::path(
    get,
    path = "/{participant_id}",
    tag = "Participants",
    operation_id = "getParticipant",
    summary = "Get a participant",
    params(
        ("id" = Uuid, Path, description = "Hackathon ID"),
        ("participant_id" = Uuid, Path, description = "Participant ID"),
    ),
    responses(
        (status = 200, description = "Participant", body = ParticipantResponse),
        (status = 404, description = "Participant not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(hackathon_id = %hackathon_id, participant_id = %participant_id))]
pub async fn get_participant(
    State(state): State<AppState>,
    AppPath((hackathon_id, participant_id)): AppPath<(Uuid, Uuid)>,
) -> Result<Json<ParticipantResponse>, AppError> {
    let model = find_participant(&state.db, hackathon_id, participant_id).await?;
    let mut items = participant_responses(&state.db, vec![model]).await?;
    items
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Participant not found".into()))
}

#[utoipa::path(
    delete,
    path = "/{participant_id}",
    tag = "Participants",
    operation_id = "removeParticipant",
    summary = "Remove a participant",
    description = "Admins and the hackathon's host only. Clears the hackathon winner if it pointed at this participant and marks the approved request rejected.",
    params(
        ("id" = Uuid, Path, description = "Hackathon ID"),
        ("participant_id" = Uuid, Path, description = "Participant ID"),
    ),
    responses(
        (status = 204, description = "Participant removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Participant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(hackathon_id = %hackathon_id, participant_id = %participant_id))]
pub async fn remove_participant(
    method: Method,
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath((hackathon_id, participant_id)): AppPath<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let model = participant::Entity::find_by_id(participant_id)
        .filter(participant::Column::HackathonId.eq(hackathon_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Participant not found".into()))?;

    let host_id = hackathon_host_of(&txn, &model).await?;
    permissions::hackathon_staff()
        .check(&AccessContext::new(&method, Some(&auth_user)).with_hackathon_host(host_id))?;

    participation::remove_participant(&txn, &model).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_participant<C: ConnectionTrait>(
    db: &C,
    hackathon_id: Uuid,
    participant_id: Uuid,
) -> Result<participant::Model, AppError> {
    participant::Entity::find_by_id(participant_id)
        .filter(participant::Column::HackathonId.eq(hackathon_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Participant not found".into()))
}

async fn participant_responses<C: ConnectionTrait>(
    db: &C,
    rows: Vec<participant::Model>,
) -> Result<Vec<ParticipantResponse>, AppError> {
    let users = user_summaries(db, rows.iter().map(|p| p.user_id)).await?;
    Ok(rows
        .into_iter()
        .filter_map(|p| {
            let user = users.get(&p.user_id)?.clone();
            Some(ParticipantResponse {
                id: p.id,
                hackathon_id: p.hackathon_id,
                user,
                created_at: p.created_at,
            })
        })
        .collect())
}
