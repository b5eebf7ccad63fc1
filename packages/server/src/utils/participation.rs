//! Participation request lifecycle.
//!
//! A request starts `pending` and is moved to `approved` or `rejected` by the
//! hackathon's host. Approval creates the (user, hackathon) participant row and
//! rejection of an approved request removes it again. Every function here runs
//! inside the caller's transaction so the status flip and its participant side
//! effect commit or roll back together. Callers lock the request row with
//! [`find_request_for_update`] first, which makes a racing second transition
//! observe the already-applied state and return without writing.

use chrono::Utc;
use common::ParticipationStatus;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::*;
use tracing::{debug, info};
use uuid::Uuid;

use crate::entity::{hackathon, participant, participation_request};
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ParticipationError {
    #[error("You are already a participant of this hackathon.")]
    AlreadyParticipant,
    #[error("You cannot request to join a hackathon you host.")]
    HostCannotRequest,
    #[error("You already have an active request for this hackathon.")]
    DuplicateRequest,
    #[error("You can delete only pending requests.")]
    NotPending,
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl From<ParticipationError> for AppError {
    fn from(err: ParticipationError) -> Self {
        match err {
            ParticipationError::AlreadyParticipant | ParticipationError::HostCannotRequest => {
                AppError::Validation(err.to_string())
            }
            ParticipationError::DuplicateRequest => AppError::Conflict(err.to_string()),
            ParticipationError::NotPending => AppError::Forbidden(err.to_string()),
            ParticipationError::Db(e) => e.into(),
        }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Lock a request of the given hackathon, returning 404 if it does not exist there.
pub async fn find_request_for_update(
    txn: &DatabaseTransaction,
    hackathon_id: Uuid,
    request_id: Uuid,
) -> Result<participation_request::Model, AppError> {
    participation_request::Entity::find_by_id(request_id)
        .filter(participation_request::Column::HackathonId.eq(hackathon_id))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Participation request not found".into()))
}

/// File a new pending request for `user_id`.
pub async fn create_request(
    txn: &DatabaseTransaction,
    hackathon: &hackathon::Model,
    user_id: Uuid,
) -> Result<participation_request::Model, ParticipationError> {
    if hackathon.host_id == user_id {
        return Err(ParticipationError::HostCannotRequest);
    }

    let already_participant = participant::Entity::find()
        .filter(participant::Column::UserId.eq(user_id))
        .filter(participant::Column::HackathonId.eq(hackathon.id))
        .one(txn)
        .await?
        .is_some();
    if already_participant {
        return Err(ParticipationError::AlreadyParticipant);
    }

    let live = participation_request::Entity::find()
        .filter(participation_request::Column::UserId.eq(user_id))
        .filter(participation_request::Column::HackathonId.eq(hackathon.id))
        .filter(participation_request::Column::Status.ne(ParticipationStatus::Rejected))
        .one(txn)
        .await?;
    if live.is_some() {
        return Err(ParticipationError::DuplicateRequest);
    }

    let now = Utc::now();
    let new_request = participation_request::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(user_id),
        hackathon_id: Set(hackathon.id),
        status: Set(ParticipationStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    };

    match new_request.insert(txn).await {
        Ok(model) => Ok(model),
        // A concurrent request for the same pair won the race.
        Err(e) if is_unique_violation(&e) => Err(ParticipationError::DuplicateRequest),
        Err(e) => Err(e.into()),
    }
}

/// Move a request to `status`, dispatching to [`approve`] or [`reject`].
pub async fn transition(
    txn: &DatabaseTransaction,
    request: participation_request::Model,
    status: ParticipationStatus,
) -> Result<participation_request::Model, ParticipationError> {
    match status {
        ParticipationStatus::Approved => approve(txn, request).await,
        ParticipationStatus::Rejected => reject(txn, request).await,
        ParticipationStatus::Pending => Ok(request),
    }
}

/// Approve a request and create its participant. No-op when already approved.
pub async fn approve(
    txn: &DatabaseTransaction,
    request: participation_request::Model,
) -> Result<participation_request::Model, ParticipationError> {
    if request.status.is_approved() {
        debug!(request_id = %request.id, "Request already approved");
        return Ok(request);
    }

    let (user_id, hackathon_id) = (request.user_id, request.hackathon_id);
    let now = Utc::now();

    let mut active: participation_request::ActiveModel = request.into();
    active.status = Set(ParticipationStatus::Approved);
    active.updated_at = Set(now);
    let updated = match active.update(txn).await {
        Ok(model) => model,
        // Reviving a rejected request while a newer one is live.
        Err(e) if is_unique_violation(&e) => return Err(ParticipationError::DuplicateRequest),
        Err(e) => return Err(e.into()),
    };

    let new_participant = participant::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(user_id),
        hackathon_id: Set(hackathon_id),
        created_at: Set(now),
        updated_at: Set(now),
    };

    // An existing participant row already satisfies the approval.
    let result = participant::Entity::insert(new_participant)
        .on_conflict(
            OnConflict::columns([
                participant::Column::UserId,
                participant::Column::HackathonId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(txn)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => {
            debug!(%user_id, %hackathon_id, "Participant already present");
        }
        Ok(_) => {}
        Err(e) => return Err(e.into()),
    }

    info!(request_id = %updated.id, %user_id, %hackathon_id, "Participation request approved");
    Ok(updated)
}

/// Reject a request, removing the participant an earlier approval created.
/// No-op when already rejected.
pub async fn reject(
    txn: &DatabaseTransaction,
    request: participation_request::Model,
) -> Result<participation_request::Model, ParticipationError> {
    if request.status.is_rejected() {
        debug!(request_id = %request.id, "Request already rejected");
        return Ok(request);
    }

    if request.status.is_approved() {
        let existing = participant::Entity::find()
            .filter(participant::Column::UserId.eq(request.user_id))
            .filter(participant::Column::HackathonId.eq(request.hackathon_id))
            .one(txn)
            .await?;
        if let Some(p) = existing {
            delete_participant_row(txn, &p).await?;
        }
    }

    let mut active: participation_request::ActiveModel = request.into();
    active.status = Set(ParticipationStatus::Rejected);
    active.updated_at = Set(Utc::now());
    let updated = active.update(txn).await?;

    info!(
        request_id = %updated.id,
        user_id = %updated.user_id,
        hackathon_id = %updated.hackathon_id,
        "Participation request rejected"
    );
    Ok(updated)
}

/// Remove a participant (host removal or the user leaving). The approved
/// request that admitted them is marked rejected so the pair can apply again.
pub async fn remove_participant(
    txn: &DatabaseTransaction,
    participant: &participant::Model,
) -> Result<(), ParticipationError> {
    delete_participant_row(txn, participant).await?;

    participation_request::Entity::update_many()
        .col_expr(
            participation_request::Column::Status,
            Expr::value(ParticipationStatus::Rejected),
        )
        .col_expr(
            participation_request::Column::UpdatedAt,
            Expr::value(Utc::now()),
        )
        .filter(participation_request::Column::UserId.eq(participant.user_id))
        .filter(participation_request::Column::HackathonId.eq(participant.hackathon_id))
        .filter(participation_request::Column::Status.eq(ParticipationStatus::Approved))
        .exec(txn)
        .await?;

    info!(
        participant_id = %participant.id,
        user_id = %participant.user_id,
        hackathon_id = %participant.hackathon_id,
        "Participant removed"
    );
    Ok(())
}

/// Delete one of the caller's own requests; only pending ones may go.
pub async fn delete_own_request(
    txn: &DatabaseTransaction,
    request: participation_request::Model,
) -> Result<(), ParticipationError> {
    if !request.status.is_pending() {
        return Err(ParticipationError::NotPending);
    }
    let id = request.id;
    let active: participation_request::ActiveModel = request.into();
    active.delete(txn).await?;
    info!(request_id = %id, "Pending request withdrawn");
    Ok(())
}

/// Clear any winner reference to the participant, then delete it.
async fn delete_participant_row(
    txn: &DatabaseTransaction,
    participant: &participant::Model,
) -> Result<(), DbErr> {
    lock_hackathons(txn, [participant.hackathon_id]).await?;
    clear_winner(txn, [participant.id]).await?;
    participant::Entity::delete_by_id(participant.id)
        .exec(txn)
        .await?;
    Ok(())
}

/// Lock hackathon rows `FOR UPDATE` before removing their participants.
///
/// Winner assignment holds the same lock while it checks membership, so a
/// winner committed first is seen (and cleared) here, and one committed after
/// sees the participant gone.
pub async fn lock_hackathons(
    txn: &DatabaseTransaction,
    hackathon_ids: impl IntoIterator<Item = Uuid>,
) -> Result<(), DbErr> {
    let ids: Vec<Uuid> = hackathon_ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(());
    }
    hackathon::Entity::find()
        .select_only()
        .column(hackathon::Column::Id)
        .filter(hackathon::Column::Id.is_in(ids))
        .order_by_asc(hackathon::Column::Id)
        .lock(LockType::Update)
        .into_tuple::<Uuid>()
        .all(txn)
        .await?;
    Ok(())
}

/// Null out `winner_id` on hackathons whose winner is one of `participant_ids`.
pub async fn clear_winner<C: ConnectionTrait>(
    db: &C,
    participant_ids: impl IntoIterator<Item = Uuid>,
) -> Result<(), DbErr> {
    let ids: Vec<Uuid> = participant_ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(());
    }
    hackathon::Entity::update_many()
        .col_expr(hackathon::Column::WinnerId, Expr::value(Option::<Uuid>::None))
        .col_expr(hackathon::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(hackathon::Column::WinnerId.is_in(ids))
        .exec(db)
        .await?;
    Ok(())
}
