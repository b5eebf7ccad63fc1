use axum::Json;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::category;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::category::*;
use crate::models::shared::search_pattern;
use crate::permissions::{self, AccessContext};
use crate::state::AppState;
use crate::utils::slug::slugify;

#[utoipa::path(
    get,
    path = "/",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List categories",
    description = "Public. Ordered by title; `search` matches a case-insensitive substring of the title.",
    params(CategoryListQuery),
    responses(
        (status = 200, description = "List of categories", body = CategoryListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_categories(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CategoryListQuery>,
) -> Result<Json<CategoryListResponse>, AppError> {
    let params = query.page_params();
    let mut select = category::Entity::find();

    if let Some(pattern) = search_pattern(query.search.as_deref()) {
        select = select.filter(
            Expr::expr(Func::lower(Expr::col(category::Column::Title)))
                .like(LikeExpr::new(pattern).escape('\\')),
        );
    }

    let total = select
        .clone()
        .paginate(&state.db, params.per_page())
        .num_items()
        .await?;

    let data = select
        .order_by_asc(category::Column::Title)
        .offset(Some(params.offset()))
        .limit(Some(params.per_page()))
        .all(&state.db)
        .await?
        .into_iter()
        .map(CategoryResponse::from)
        .collect();

    Ok(Json(CategoryListResponse {
        data,
        pagination: params.pagination(total),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Categories",
    operation_id = "createCategory",
    summary = "Create a category",
    description = "Admin only. The slug is derived from the title.",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Title or slug taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_category(
    method: Method,
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    permissions::category_write().check(&AccessContext::new(&method, Some(&auth_user)))?;
    validate_create_category(&payload)?;

    let title = payload.title.trim().to_string();
    let now = chrono::Utc::now();
    let new_category = category::ActiveModel {
        id: Set(Uuid::now_v7()),
        slug: Set(slugify(&title)),
        title: Set(title),
        created_at: Set(now),
        updated_at: Set(now),
    };

    match new_category.insert(&state.db).await {
        Ok(model) => {
            tracing::info!(category_id = %model.id, slug = %model.slug, "Category created");
            Ok((StatusCode::CREATED, Json(CategoryResponse::from(model))))
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
            AppError::Conflict("A category with this title already exists".into()),
        ),
        Err(e) => Err(e.into()),
    }
}
