use axum::Json;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{category, hackathon, participant};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::extractors::query::AppQuery;
use crate::models::hackathon::*;
use crate::permissions::{self, AccessContext};
use crate::state::AppState;
use crate::utils::hackathon::{
    find_hackathon, find_hackathon_for_update, hackathon_response, paginate_hackathons,
    purge_hackathons,
};

#[utoipa::path(
    get,
    path = "/",
    tag = "Hackathons",
    operation_id = "listHackathons",
    summary = "List hackathons with filters",
    description = "Public. Filters by category slug, `hackathon_status` (`active` or `past`), `start_after`, `end_before`, winner username and a title/description search. Ordered by `start_datetime` unless `ordering` says otherwise.",
    params(HackathonListQuery),
    responses(
        (status = 200, description = "List of hackathons", body = HackathonListResponse),
        (status = 400, description = "Invalid filter (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_hackathons(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<HackathonListQuery>,
) -> Result<Json<HackathonListResponse>, AppError> {
    let response = paginate_hackathons(&state.db, hackathon::Entity::find(), &query).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Hackathons",
    operation_id = "createHackathon",
    summary = "Create a hackathon",
    description = "Hosts and admins only. The caller becomes the host.",
    request_body = CreateHackathonRequest,
    responses(
        (status = 201, description = "Hackathon created", body = HackathonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_hackathon(
    method: Method,
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateHackathonRequest>,
) -> Result<impl IntoResponse, AppError> {
    permissions::hackathon_create().check(&AccessContext::new(&method, Some(&auth_user)))?;
    validate_create_hackathon(&payload)?;

    let txn = state.db.begin().await?;
    auth_user.ensure_account(&txn).await?;
    if let Some(category_id) = payload.category {
        ensure_category(&txn, category_id).await?;
    }

    let now = chrono::Utc::now();
    let new_hackathon = hackathon::ActiveModel {
        id: Set(Uuid::now_v7()),
        host_id: Set(auth_user.user_id),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        category_id: Set(payload.category),
        prize: Set(payload.prize),
        start_datetime: Set(payload.start_datetime),
        end_datetime: Set(payload.end_datetime),
        winner_id: Set(None),
        image: Set(payload.image.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = new_hackathon.insert(&txn).await?;
    txn.commit().await?;
    tracing::info!(hackathon_id = %model.id, host_id = %model.host_id, "Hackathon created");

    let response = hackathon_response(&state.db, model).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Hackathons",
    operation_id = "getHackathon",
    summary = "Get a hackathon by ID",
    params(("id" = Uuid, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Hackathon details", body = HackathonResponse),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_hackathon(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<HackathonResponse>, AppError> {
    let model = find_hackathon(&state.db, id).await?;
    Ok(Json(hackathon_response(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Hackathons",
    operation_id = "updateHackathon",
    summary = "Update a hackathon",
    description = "Admins and the hackathon's host only. PATCH semantics; an empty payload returns the current resource. The time window is re-checked against stored values. `winner` must be a participant of this hackathon and can only change while the hackathon is not active.",
    params(("id" = Uuid, Path, description = "Hackathon ID")),
    request_body = UpdateHackathonRequest,
    responses(
        (status = 200, description = "Hackathon updated", body = HackathonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_hackathon(
    method: Method,
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateHackathonRequest>,
) -> Result<Json<HackathonResponse>, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_hackathon_for_update(&txn, id).await?;
    permissions::hackathon_write().check(
        &AccessContext::new(&method, Some(&auth_user)).with_hackathon_host(existing.host_id),
    )?;

    if payload == UpdateHackathonRequest::default() {
        txn.commit().await?;
        return Ok(Json(hackathon_response(&state.db, existing).await?));
    }

    validate_update_hackathon(&payload)?;

    // Cross-field time validation against existing values
    if payload.start_datetime.is_some() || payload.end_datetime.is_some() {
        validate_window(
            payload.start_datetime.unwrap_or(existing.start_datetime),
            payload.end_datetime.unwrap_or(existing.end_datetime),
        )?;
    }

    if let Some(Some(category_id)) = payload.category {
        ensure_category(&txn, category_id).await?;
    }

    if let Some(winner) = payload.winner {
        if existing.is_active() {
            return Err(AppError::field(
                "winner",
                "Cannot set winner while hackathon is active.",
            ));
        }
        if let Some(participant_id) = winner {
            let belongs = participant::Entity::find_by_id(participant_id)
                .filter(participant::Column::HackathonId.eq(id))
                .one(&txn)
                .await?
                .is_some();
            if !belongs {
                return Err(AppError::field(
                    "winner",
                    "Selected participant is not a participant of this hackathon.",
                ));
            }
        }
    }

    let mut active: hackathon::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(category) = payload.category {
        active.category_id = Set(category);
    }
    if let Some(prize) = payload.prize {
        active.prize = Set(prize);
    }
    if let Some(start) = payload.start_datetime {
        active.start_datetime = Set(start);
    }
    if let Some(end) = payload.end_datetime {
        active.end_datetime = Set(end);
    }
    if let Some(winner) = payload.winner {
        active.winner_id = Set(winner);
    }
    if let Some(ref image) = payload.image {
        active.image = Set(image.trim().to_string());
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(&txn).await?;
    txn.commit().await?;

    if let Some(winner) = payload.winner {
        tracing::info!(hackathon_id = %id, winner = ?winner, "Hackathon winner changed");
    }

    Ok(Json(hackathon_response(&state.db, updated).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Hackathons",
    operation_id = "deleteHackathon",
    summary = "Delete a hackathon",
    description = "Admins and the hackathon's host only. Deletes its participation requests and participants as well.",
    params(("id" = Uuid, Path, description = "Hackathon ID")),
    responses(
        (status = 204, description = "Hackathon deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_hackathon(
    method: Method,
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_hackathon_for_update(&txn, id).await?;
    permissions::hackathon_write().check(
        &AccessContext::new(&method, Some(&auth_user)).with_hackathon_host(existing.host_id),
    )?;

    purge_hackathons(&txn, vec![id]).await?;
    txn.commit().await?;

    tracing::info!(hackathon_id = %id, "Hackathon deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_category<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), AppError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::field("category", "Category not found."))
}
