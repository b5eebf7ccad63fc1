use axum::Json;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{participation_request, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::extractors::query::AppQuery;
use crate::models::participation_request::*;
use crate::models::shared::search_pattern;
use crate::permissions::{self, AccessContext};
use crate::state::AppState;
use crate::utils::hackathon::{find_hackathon, hackathon_host_of, user_summaries};
use crate::utils::participation::{self, find_request_for_update};

#[utoipa::path(
    get,
    path = "/",
    tag = "Participation Requests",
    operation_id = "listRequests",
    summary = "List participation requests of a hackathon",
    description = "Admins and the hackathon's host only. Filter by `status` (repeatable or comma separated) and search the requester's username, e-mail or name.",
    params(("id" = Uuid, Path, description = "Hackathon ID"), RequestListQuery),
    responses(
        (status = 200, description = "List of requests", body = RequestListResponse),
        (status = 400, description = "Invalid filter (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(hackathon_id = %hackathon_id))]
pub async fn list_requests(
    method: Method,
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppPath(hackathon_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<RequestListQuery>,
) -> Result<Json<RequestListResponse>, AppError> {
    let hackathon = find_hackathon(&state.db, hackathon_id).await?;
    permissions::request_collection().check(
        &AccessContext::new(&method, auth_user.as_ref()).with_hackathon_host(hackathon.host_id),
    )?;

    let params = query.page_params();
    let statuses = query.statuses()?;
    let order = query.created_order()?;

    let mut select = participation_request::Entity::find()
        .filter(participation_request::Column::HackathonId.eq(hackathon_id));

    if !statuses.is_empty() {
        select = select.filter(participation_request::Column::Status.is_in(statuses));
    }

    if let Some(pattern) = search_pattern(query.search.as_deref()) {
        let like = |col: user::Column| {
            Expr::expr(Func::lower(Expr::col(col)))
                .like(LikeExpr::new(pattern.clone()).escape('\\'))
        };
        select = select.filter(
            participation_request::Column::UserId.in_subquery(
                SeaQuery::select()
                    .column(user::Column::Id)
                    .from(user::Entity)
                    .cond_where(
                        Condition::any()
                            .add(like(user::Column::Username))
                            .add(like(user::Column::Email))
                            .add(like(user::Column::FirstName))
                            .add(like(user::Column::LastName)),
                    )
                    .to_owned(),
            ),
        );
    }

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

    Ok(Json(RequestListResponse {
        data: request_responses(&state.db, rows).await?,
        pagination: params.pagination(total),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Participation Requests",
    operation_id = "createRequest",
    summary = "Request to join a hackathon",
    description = "Files a pending request for the caller. Rejected when the caller already participates, hosts the hackathon, or has a pending or approved request.",
    params(("id" = Uuid, Path, description = "Hackathon ID")),
    responses(
        (status = 201, description = "Request created", body = RequestResponse),
        (status = 400, description = "Already a participant or own hackathon (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "A live request exists (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(hackathon_id = %hackathon_id))]
pub async fn create_request(
    method: Method,
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(hackathon_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let hackathon = find_hackathon(&txn, hackathon_id).await?;
    permissions::request_collection().check(
        &AccessContext::new(&method, Some(&auth_user)).with_hackathon_host(hackathon.host_id),
    )?;
    auth_user.ensure_account(&txn).await?;

    let model = participation::create_request(&txn, &hackathon, auth_user.user_id).await?;
    txn.commit().await?;

    tracing::info!(
        request_id = %model.id,
        user_id = %auth_user.user_id,
        "Participation request filed"
    );

    let response = single_response(&state.db, model).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/{request_id}",
    tag = "Participation Requests",
    operation_id = "getRequest",
    summary = "Get a participation request",
    params(
        ("id" = Uuid, Path, description = "Hackathon ID"),
        ("request_id" = Uuid, Path, description = "Request ID"),
    ),
    responses(
        (status = 200, description = "Request", body = RequestResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Request not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(hackathon_id = %hackathon_id, request_id = %request_id))]
pub async fn get_request(
    method: Method,
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath((hackathon_id, request_id)): AppPath<(Uuid, Uuid)>,
) -> Result<Json<RequestResponse>, AppError> {
    let model = participation_request::Entity::find_by_id(request_id)
        .filter(participation_request::Column::HackathonId.eq(hackathon_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Participation request not found".into()))?;

    let host_id = hackathon_host_of(&state.db, &model).await?;
    permissions::hackathon_staff()
        .check(&AccessContext::new(&method, Some(&auth_user)).with_hackathon_host(host_id))?;

    Ok(Json(single_response(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/{request_id}",
    tag = "Participation Requests",
    operation_id = "reviewRequest",
    summary = "Approve or reject a participation request",
    description = "Admins and the hackathon's host only. `approved` creates the participant; `rejected` removes it if an earlier approval created one. Repeating the current decision is a no-op. Any other status is rejected with `status: Invalid status.`",
    params(
        ("id" = Uuid, Path, description = "Hackathon ID"),
        ("request_id" = Uuid, Path, description = "Request ID"),
    ),
    request_body = UpdateRequestStatus,
    responses(
        (status = 200, description = "Request updated", body = RequestResponse),
        (status = 400, description = "Invalid status (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Request not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Another live request exists for the pair (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(hackathon_id = %hackathon_id, request_id = %request_id))]
pub async fn update_request(
    method: Method,
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath((hackathon_id, request_id)): AppPath<(Uuid, Uuid)>,
    AppJson(payload): AppJson<UpdateRequestStatus>,
) -> Result<Json<RequestResponse>, AppError> {
    let txn = state.db.begin().await?;
    let request = find_request_for_update(&txn, hackathon_id, request_id).await?;
    let host_id = hackathon_host_of(&txn, &request).await?;
    permissions::hackathon_staff()
        .check(&AccessContext::new(&method, Some(&auth_user)).with_hackathon_host(host_id))?;

    let status = payload.decision()?;
    let updated = participation::transition(&txn, request, status).await?;
    txn.commit().await?;

    Ok(Json(single_response(&state.db, updated).await?))
}

#[utoipa::path(
    delete,
    path = "/{request_id}",
    tag = "Participation Requests",
    operation_id = "deleteRequest",
    summary = "Delete a participation request",
    description = "Admins and the hackathon's host only. An existing participant is kept.",
    params(
        ("id" = Uuid, Path, description = "Hackathon ID"),
        ("request_id" = Uuid, Path, description = "Request ID"),
    ),
    responses(
        (status = 204, description = "Request deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Request not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(hackathon_id = %hackathon_id, request_id = %request_id))]
pub async fn delete_request(
    method: Method,
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath((hackathon_id, request_id)): AppPath<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let request = find_request_for_update(&txn, hackathon_id, request_id).await?;
    let host_id = hackathon_host_of(&txn, &request).await?;
    permissions::hackathon_staff()
        .check(&AccessContext::new(&method, Some(&auth_user)).with_hackathon_host(host_id))?;

    participation_request::Entity::delete_by_id(request.id)
        .exec(&txn)
        .await?;
    txn.commit().await?;

    tracing::info!(request_id = %request_id, "Participation request deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn single_response<C: ConnectionTrait>(
    db: &C,
    model: participation_request::Model,
) -> Result<RequestResponse, AppError> {
    request_responses(db, vec![model])
        .await?
        .pop()
        .ok_or_else(|| AppError::NotFound("Requesting user not found".into()))
}

async fn request_responses<C: ConnectionTrait>(
    db: &C,
    rows: Vec<participation_request::Model>,
) -> Result<Vec<RequestResponse>, AppError> {
    let users = user_summaries(db, rows.iter().map(|r| r.user_id)).await?;
    Ok(rows
        .into_iter()
        .filter_map(|r| {
            let user = users.get(&r.user_id)?.clone();
            Some(RequestResponse {
                id: r.id,
                hackathon_id: r.hackathon_id,
                user,
                status: r.status,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
        })
        .collect())
}
