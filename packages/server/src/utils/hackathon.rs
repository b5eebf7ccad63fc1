use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, LockType, Query as SeaQuery};
use sea_orm::*;
use uuid::Uuid;

use crate::entity::{category, hackathon, participant, participation_request, user};
use crate::error::AppError;
use crate::models::category::CategoryResponse;
use crate::models::hackathon::{
    HackathonBrief, HackathonListItem, HackathonListQuery, HackathonListResponse,
    HackathonResponse, HostSummary, WinnerSummary,
};
use crate::models::shared::search_pattern;
use crate::models::user::UserSummary;
use crate::permissions::HackathonScoped;

/// Look up a hackathon by ID, returning 404 if not found.
pub async fn find_hackathon<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<hackathon::Model, AppError> {
    hackathon::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))
}

pub async fn find_hackathon_for_update(
    txn: &DatabaseTransaction,
    id: Uuid,
) -> Result<hackathon::Model, AppError> {
    hackathon::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))
}

/// Resolve the host of the hackathon an object belongs to.
pub async fn hackathon_host_of<C, T>(db: &C, scoped: &T) -> Result<Uuid, AppError>
where
    C: ConnectionTrait,
    T: HackathonScoped,
{
    hackathon::Entity::find_by_id(scoped.hackathon_id())
        .select_only()
        .column(hackathon::Column::HostId)
        .into_tuple::<Uuid>()
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))
}

/// Apply the shared listing filters (`category`, `hackathon_status`,
/// `start_after`, `end_before`, `winner`, `search`).
pub fn apply_filters(
    mut select: Select<hackathon::Entity>,
    query: &HackathonListQuery,
    now: DateTime<Utc>,
) -> Select<hackathon::Entity> {
    if let Some(slug) = query.category.as_deref().map(str::trim)
        && !slug.is_empty()
    {
        select = select.filter(
            hackathon::Column::CategoryId.in_subquery(
                SeaQuery::select()
                    .column(category::Column::Id)
                    .from(category::Entity)
                    .and_where(category::Column::Slug.eq(slug))
                    .to_owned(),
            ),
        );
    }

    match query.hackathon_status.as_deref().map(str::trim) {
        Some("active") => {
            select = select
                .filter(hackathon::Column::StartDatetime.lte(now))
                .filter(hackathon::Column::EndDatetime.gte(now));
        }
        Some("past") => {
            select = select.filter(hackathon::Column::EndDatetime.lte(now));
        }
        _ => {}
    }

    if let Some(start_after) = query.start_after {
        select = select.filter(hackathon::Column::StartDatetime.gte(start_after));
    }
    if let Some(end_before) = query.end_before {
        select = select.filter(hackathon::Column::EndDatetime.lte(end_before));
    }

    if let Some(username) = query.winner.as_deref().map(str::trim)
        && !username.is_empty()
    {
        select = select.filter(
            hackathon::Column::WinnerId.in_subquery(
                SeaQuery::select()
                    .column(participant::Column::Id)
                    .from(participant::Entity)
                    .and_where(
                        participant::Column::UserId.in_subquery(
                            SeaQuery::select()
                                .column(user::Column::Id)
                                .from(user::Entity)
                                .and_where(user::Column::Username.eq(username))
                                .to_owned(),
                        ),
                    )
                    .to_owned(),
            ),
        );
    }

    if let Some(pattern) = search_pattern(query.search.as_deref()) {
        select = select.filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(hackathon::Column::Title)))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(hackathon::Column::Description)))
                        .like(LikeExpr::new(pattern).escape('\\')),
                ),
        );
    }

    select
}

/// Filter, order and paginate a hackathon selection into a list response.
pub async fn paginate_hackathons<C: ConnectionTrait>(
    db: &C,
    select: Select<hackathon::Entity>,
    query: &HackathonListQuery,
) -> Result<HackathonListResponse, AppError> {
    let params = query.page_params();
    let (column, order) = query.order()?;
    let select = apply_filters(select, query, Utc::now());

    let total = select
        .clone()
        .paginate(db, params.per_page())
        .num_items()
        .await?;

    let models = select
        .order_by(column, order)
        .order_by_asc(hackathon::Column::Id)
        .offset(Some(params.offset()))
        .limit(Some(params.per_page()))
        .all(db)
        .await?;

    Ok(HackathonListResponse {
        data: hackathon_items(db, models).await?,
        pagination: params.pagination(total),
    })
}

/// Build list items, loading hosts, categories and winners in batches.
pub async fn hackathon_items<C: ConnectionTrait>(
    db: &C,
    models: Vec<hackathon::Model>,
) -> Result<Vec<HackathonListItem>, AppError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let category_ids: HashSet<Uuid> = models.iter().filter_map(|h| h.category_id).collect();
    let categories: HashMap<Uuid, CategoryResponse> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        category::Entity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, CategoryResponse::from(c)))
            .collect()
    };

    let winner_ids: HashSet<Uuid> = models.iter().filter_map(|h| h.winner_id).collect();
    let winners: HashMap<Uuid, participant::Model> = if winner_ids.is_empty() {
        HashMap::new()
    } else {
        participant::Entity::find()
            .filter(participant::Column::Id.is_in(winner_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    let user_ids = models
        .iter()
        .map(|h| h.host_id)
        .chain(winners.values().map(|p| p.user_id));
    let users = user_summaries(db, user_ids).await?;

    let now = Utc::now();
    let mut items = Vec::with_capacity(models.len());
    for h in models {
        let host = users.get(&h.host_id).ok_or_else(|| {
            AppError::Internal(format!("Host {} of hackathon {} missing", h.host_id, h.id))
        })?;
        let winner = h
            .winner_id
            .and_then(|id| winners.get(&id))
            .and_then(|p| {
                users.get(&p.user_id).map(|u| WinnerSummary {
                    participant_id: p.id,
                    user_id: p.user_id,
                    username: u.username.clone(),
                })
            });

        items.push(HackathonListItem {
            id: h.id,
            title: h.title.clone(),
            host: HostSummary {
                id: host.id,
                username: host.username.clone(),
            },
            category: h.category_id.and_then(|id| categories.get(&id).cloned()),
            prize: h.prize,
            start_datetime: h.start_datetime,
            end_datetime: h.end_datetime,
            winner,
            image: h.image.clone(),
            is_active: h.is_active_at(now),
            created_at: h.created_at,
        });
    }
    Ok(items)
}

/// Detail view of a single hackathon.
pub async fn hackathon_response<C: ConnectionTrait>(
    db: &C,
    model: hackathon::Model,
) -> Result<HackathonResponse, AppError> {
    let description = model.description.clone();
    let updated_at = model.updated_at;
    let summary = hackathon_items(db, vec![model])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Hackathon summary not built".into()))?;

    Ok(HackathonResponse {
        summary,
        description,
        updated_at,
    })
}

pub async fn user_summaries<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, UserSummary>, AppError> {
    let ids: HashSet<Uuid> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect())
}

pub async fn hackathon_briefs<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, HackathonBrief>, AppError> {
    let ids: HashSet<Uuid> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(hackathon::Entity::find()
        .filter(hackathon::Column::Id.is_in(ids))
        .all(db)
        .await?
        .iter()
        .map(|h| (h.id, HackathonBrief::from(h)))
        .collect())
}

/// Delete hackathons together with their requests and participants.
pub async fn purge_hackathons(txn: &DatabaseTransaction, ids: Vec<Uuid>) -> Result<(), DbErr> {
    if ids.is_empty() {
        return Ok(());
    }
    participation_request::Entity::delete_many()
        .filter(participation_request::Column::HackathonId.is_in(ids.clone()))
        .exec(txn)
        .await?;
    participant::Entity::delete_many()
        .filter(participant::Column::HackathonId.is_in(ids.clone()))
        .exec(txn)
        .await?;
    hackathon::Entity::delete_many()
        .filter(hackathon::Column::Id.is_in(ids))
        .exec(txn)
        .await?;
    Ok(())
}
