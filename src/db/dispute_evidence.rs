use chrono::{DateTime, Utc};
use sea_orm::*;
use uuid::Uuid;

use crate::models::dispute_evidence::{self, SubmitEvidence};

/// Insert an evidence record. Evidence rows are never updated or deleted.
pub async fn insert_evidence<C: ConnectionTrait>(
    db: &C,
    dispute_id: Uuid,
    submitted_by: Uuid,
    input: SubmitEvidence,
    now: DateTime<Utc>,
) -> Result<dispute_evidence::Model, DbErr> {
    let new_evidence = dispute_evidence::ActiveModel {
        id: Set(Uuid::new_v4()),
        dispute_id: Set(dispute_id),
        submitted_by: Set(submitted_by),
        file_reference: Set(input.file_reference),
        description: Set(input.description),
        created_at: Set(now),
    };

    new_evidence.insert(db).await
}

/// Fetch the evidence trail of a dispute, oldest first.
pub async fn get_evidence_by_dispute<C: ConnectionTrait>(
    db: &C,
    dispute_id: Uuid,
) -> Result<Vec<dispute_evidence::Model>, DbErr> {
    dispute_evidence::Entity::find()
        .filter(dispute_evidence::Column::DisputeId.eq(dispute_id))
        .order_by_asc(dispute_evidence::Column::CreatedAt)
        .order_by_asc(dispute_evidence::Column::Id)
        .all(db)
        .await
}
