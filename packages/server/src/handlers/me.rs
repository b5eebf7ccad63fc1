use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, LockType, Query as SeaQuery};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{hackathon, participant, participation_request, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::extractors::query::AppQuery;
use crate::models::hackathon::{HackathonListQuery, HackathonListResponse};
use crate::models::participant::{
    MyParticipationListQuery, MyParticipationListResponse, MyParticipationResponse,
};
use crate::models::participation_request::{
    MyRequestListResponse, MyRequestResponse, RequestListQuery,
};
use crate::models::shared::search_pattern;
use crate::models::user::{UpdateMeRequest, UserResponse, validate_update_me};
use crate::state::AppState;
use crate::utils::hackathon::{hackathon_briefs, paginate_hackathons, purge_hackathons};
use crate::utils::participation::{self, clear_winner, lock_hackathons};
use crate::utils::slug::{normalize_email, username_from_email};
use crate::utils::hash;

async fn find_me<C: ConnectionTrait>(db: &C, auth_user: &AuthUser) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(auth_user.user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Restrict a hackathon-owned selection to hackathons whose title matches `search`.
fn hackathon_title_filter<E, C>(select: Select<E>, column: C, search: Option<&str>) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    match search_pattern(search) {
        Some(pattern) => select.filter(
            column.in_subquery(
                SeaQuery::select()
                    .column(hackathon::Column::Id)
                    .from(hackathon::Entity)
                    .and_where(
                        Expr::expr(Func::lower(Expr::col(hackathon::Column::Title)))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    )
                    .to_owned(),
            ),
        ),
        None => select,
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Me",
    operation_id = "getMe",
    summary = "Get the authenticated user's profile",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(find_me(&state.db, &auth_user).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/",
    tag = "Me",
    operation_id = "updateMe",
    summary = "Update the authenticated user's profile",
    description = "PATCH semantics. Setting `username` to `null` derives it from the e-mail address again. A new `password` is re-hashed.",
    request_body = UpdateMeRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "E-mail or username taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn update_me(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateMeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let txn = state.db.begin().await?;
    let existing = user::Entity::find_by_id(auth_user.user_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if payload == UpdateMeRequest::default() {
        txn.commit().await?;
        return Ok(Json(existing.into()));
    }

    validate_update_me(&payload)?;

    let email = payload
        .email
        .as_deref()
        .map(normalize_email)
        .unwrap_or_else(|| existing.email.clone());

    let mut active: user::ActiveModel = existing.into();

    if payload.email.is_some() {
        active.email = Set(email.clone());
    }
    match payload.username {
        Some(Some(ref name)) => active.username = Set(name.trim().to_string()),
        Some(None) => active.username = Set(username_from_email(&email)),
        None => {}
    }
    if let Some(ref first_name) = payload.first_name {
        active.first_name = Set(first_name.trim().to_string());
    }
    if let Some(ref last_name) = payload.last_name {
        active.last_name = Set(last_name.trim().to_string());
    }
    if let Some(ref password) = payload.password {
        let hash = hash::hash_password(password)
            .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;
        active.password = Set(hash);
    }
    if let Some(ref picture) = payload.profile_picture {
        active.profile_picture = Set(picture.trim().to_string());
    }
    if let Some(ref background) = payload.profile_background {
        active.profile_background = Set(background.trim().to_string());
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A user with that e-mail or username already exists".into())
        }
        _ => AppError::from(e),
    })?;
    txn.commit().await?;

    tracing::info!(user_id = %updated.id, "Profile updated");
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/",
    tag = "Me",
    operation_id = "deleteMe",
    summary = "Delete the authenticated user's account",
    description = "Also deletes the user's requests, participations and hosted hackathons.",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn delete_me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let me = user::Entity::find_by_id(auth_user.user_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let hosted: Vec<Uuid> = hackathon::Entity::find()
        .select_only()
        .column(hackathon::Column::Id)
        .filter(hackathon::Column::HostId.eq(me.id))
        .into_tuple()
        .all(&txn)
        .await?;
    purge_hackathons(&txn, hosted.clone()).await?;

    let participations: Vec<(Uuid, Uuid)> = participant::Entity::find()
        .select_only()
        .column(participant::Column::Id)
        .column(participant::Column::HackathonId)
        .filter(participant::Column::UserId.eq(me.id))
        .into_tuple()
        .all(&txn)
        .await?;
    lock_hackathons(&txn, participations.iter().map(|(_, hackathon_id)| *hackathon_id)).await?;
    clear_winner(&txn, participations.iter().map(|(id, _)| *id)).await?;
    participant::Entity::delete_many()
        .filter(participant::Column::UserId.eq(me.id))
        .exec(&txn)
        .await?;
    participation_request::Entity::delete_many()
        .filter(participation_request::Column::UserId.eq(me.id))
        .exec(&txn)
        .await?;

    user::Entity::delete_by_id(me.id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        user_id = %auth_user.user_id,
        hosted = hosted.len(),
        participations = participations.len(),
        "Account deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/requests",
    tag = "Me",
    operation_id = "listMyRequests",
    summary = "List the caller's participation requests",
    description = "Filter by `status` and search the hackathon title. Newest first unless `ordering=created_at`.",
    params(RequestListQuery),
    responses(
        (status = 200, description = "Own requests", body = MyRequestListResponse),
        (status = 400, description = "Invalid filter (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = %auth_user.user_id))]
pub async fn list_my_requests(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<RequestListQuery>,
) -> Result<Json<MyRequestListResponse>, AppError> {
    let params = query.page_params();
    let statuses = query.statuses()?;
    let order = query.created_order()?;

    let mut select = participation_request::Entity::find()
        .filter(participation_request::Column::UserId.eq(auth_user.user_id));
    if !statuses.is_empty() {
        select = select.filter(participation_request::Column::Status.is_in(statuses));
    }
    let select = hackathon_title_filter(
        select,
        participation_request::Column::HackathonId,
        query.search.as_deref(),
    );

    let total = select
        .clone()
        .paginate(&state.db, params.per_page())
        .num_items()
        .await?;

    let rows = select
        .order_by(participation_request::Column::CreatedAt, order.clone())
        .order_by(participation_request::Column::Id, order)
        .offset(Some(params.offset()))
        .limit(Some(params.per_page()))
        .all(&state.db)
        .await?;

    Ok(Json(MyRequestListResponse {
        data: my_request_responses(&state.db, rows).await?,
        pagination: params.pagination(total),
    }))
}

#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "Me",
    operation_id = "getMyRequest",
    summary = "Get one of the caller's requests",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request", body = MyRequestResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Request not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, id = %id))]
pub async fn get_my_request(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MyRequestResponse>, AppError> {
    let model = participation_request::Entity::find_by_id(id)
        .filter(participation_request::Column::UserId.eq(auth_user.user_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Participation request not found".into()))?;

    my_request_responses(&state.db, vec![model])
        .await?
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Participation request not found".into()))
}

#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "Me",
    operation_id = "deleteMyRequest",
    summary = "Withdraw one of the caller's requests",
    description = "Only pending requests may be withdrawn.",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 204, description = "Request withdrawn"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Request is no longer pending (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Request not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, id = %id))]
pub async fn delete_my_request(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let model = participation_request::Entity::find_by_id(id)
        .filter(participation_request::Column::UserId.eq(auth_user.user_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Participation request not found".into()))?;

    participation::delete_own_request(&txn, model).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/participations",
    tag = "Me",
    operation_id = "listMyParticipations",
    summary = "List the hackathons the caller participates in",
    description = "`search` matches the hackathon title. Newest first.",
    params(MyParticipationListQuery),
    responses(
        (status = 200, description = "Own participations", body = MyParticipationListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = %auth_user.user_id))]
pub async fn list_my_participations(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<MyParticipationListQuery>,
) -> Result<Json<MyParticipationListResponse>, AppError> {
    let params = query.page_params();
    let select = hackathon_title_filter(
        participant::Entity::find().filter(participant::Column::UserId.eq(auth_user.user_id)),
        participant::Column::HackathonId,
        query.search.as_deref(),
    );

    let total = select
        .clone()
        .paginate(&state.db, params.per_page())
        .num_items()
        .await?;

    let rows = select
        .order_by_desc(participant::Column::CreatedAt)
        .order_by_desc(participant::Column::Id)
        .offset(Some(params.offset()))
        .limit(Some(params.per_page()))
        .all(&state.db)
        .await?;

    Ok(Json(MyParticipationListResponse {
        data: my_participation_responses(&state.db, rows).await?,
        pagination: params.pagination(total),
    }))
}

#[utoipa::path(
    get,
    path = "/participations/{id}",
    tag = "Me",
    operation_id = "getMyParticipation",
    summary = "Get one of the caller's participations",
    params(("id" = Uuid, Path, description = "Participant ID")),
    responses(
        (status = 200, description = "Participation", body = MyParticipationResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Participation not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, id = %id))]
pub async fn get_my_participation(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MyParticipationResponse>, AppError> {
    let model = participant::Entity::find_by_id(id)
        .filter(participant::Column::UserId.eq(auth_user.user_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Participation not found".into()))?;

    my_participation_responses(&state.db, vec![model])
        .await?
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Participation not found".into()))
}

#[utoipa::path(
    delete,
    path = "/participations/{id}",
    tag = "Me",
    operation_id = "leaveHackathon",
    summary = "Leave a hackathon",
    description = "Removes the caller's participation. Clears the hackathon winner if it pointed here.",
    params(("id" = Uuid, Path, description = "Participant ID")),
    responses(
        (status = 204, description = "Participation removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Participation not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, id = %id))]
pub async fn delete_my_participation(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let model = participant::Entity::find_by_id(id)
        .filter(participant::Column::UserId.eq(auth_user.user_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Participation not found".into()))?;

    participation::remove_participant(&txn, &model).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/hosted-hackathons",
    tag = "Me",
    operation_id = "listHostedHackathons",
    summary = "List hackathons hosted by the caller",
    description = "Accepts the same filters as the public hackathon list.",
    params(HackathonListQuery),
    responses(
        (status = 200, description = "Hosted hackathons", body = HackathonListResponse),
        (status = 400, description = "Invalid filter (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = %auth_user.user_id))]
pub async fn list_hosted_hackathons(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<HackathonListQuery>,
) -> Result<Json<HackathonListResponse>, AppError> {
    let select = hackathon::Entity::find().filter(hackathon::Column::HostId.eq(auth_user.user_id));
    Ok(Json(paginate_hackathons(&state.db, select, &query).await?))
}

#[utoipa::path(
    get,
    path = "/participated-hackathons",
    tag = "Me",
    operation_id = "listParticipatedHackathons",
    summary = "List hackathons the caller participates in",
    description = "Accepts the same filters as the public hackathon list.",
    params(HackathonListQuery),
    responses(
        (status = 200, description = "Participated hackathons", body = HackathonListResponse),
        (status = 400, description = "Invalid filter (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = %auth_user.user_id))]
pub async fn list_participated_hackathons(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<HackathonListQuery>,
) -> Result<Json<HackathonListResponse>, AppError> {
    let select = hackathon::Entity::find().filter(
        hackathon::Column::Id.in_subquery(
            SeaQuery::select()
                .column(participant::Column::HackathonId)
                .from(participant::Entity)
                .and_where(participant::Column::UserId.eq(auth_user.user_id))
                .to_owned(),
        ),
    );
    Ok(Json(paginate_hackathons(&state.db, select, &query).await?))
}

async fn my_request_responses<C: ConnectionTrait>(
    db: &C,
    rows: Vec<participation_request::Model>,
) -> Result<Vec<MyRequestResponse>, AppError> {
    let briefs = hackathon_briefs(db, rows.iter().map(|r| r.hackathon_id)).await?;
    Ok(rows
        .into_iter()
        .filter_map(|r| {
            let hackathon = briefs.get(&r.hackathon_id)?.clone();
            Some(MyRequestResponse {
                id: r.id,
                hackathon,
                status: r.status,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
        })
        .collect())
}

async fn my_participation_responses<C: ConnectionTrait>(
    db: &C,
    rows: Vec<participant::Model>,
) -> Result<Vec<MyParticipationResponse>, AppError> {
    let briefs = hackathon_briefs(db, rows.iter().map(|p| p.hackathon_id)).await?;
    Ok(rows
        .into_iter()
        .filter_map(|p| {
            let hackathon = briefs.get(&p.hackathon_id)?.clone();
            Some(MyParticipationResponse {
                id: p.id,
                hackathon,
                created_at: p.created_at,
            })
        })
        .collect())
}
