use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{hackathon, participant, participation_request};

/// Partial unique index: one pending-or-approved request per (user, hackathon).
/// A rejected request never blocks a new one.
const LIVE_REQUEST_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS uniq_live_participation_request \
     ON participation_request (user_id, hackathon_id) WHERE status <> 'rejected'";

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't cover composite or partial indexes, so they
/// are created on startup. The unique ones back invariants of the
/// participation workflow and failing to create them is fatal.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("uniq_participant_user_hackathon")
        .table(participant::Entity)
        .col(participant::Column::UserId)
        .col(participant::Column::HackathonId)
        .to_string(PostgresQueryBuilder);
    db.execute_unprepared(&stmt).await?;
    info!("Ensured index uniq_participant_user_hackathon exists");

    db.execute_unprepared(LIVE_REQUEST_INDEX).await?;
    info!("Ensured index uniq_live_participation_request exists");

    // Lookups used by the request review screens and the hackathon listings.
    let optional = [
        (
            "idx_participation_request_hackathon_created",
            Index::create()
                .if_not_exists()
                .name("idx_participation_request_hackathon_created")
                .table(participation_request::Entity)
                .col(participation_request::Column::HackathonId)
                .col(participation_request::Column::CreatedAt)
                .to_string(PostgresQueryBuilder),
        ),
        (
            "idx_hackathon_host_start",
            Index::create()
                .if_not_exists()
                .name("idx_hackathon_host_start")
                .table(hackathon::Entity)
                .col(hackathon::Column::HostId)
                .col(hackathon::Column::StartDatetime)
                .to_string(PostgresQueryBuilder),
        ),
    ];

    for (name, stmt) in optional {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}
