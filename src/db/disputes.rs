use chrono::{DateTime, Utc};
use sea_orm::*;
use uuid::Uuid;

use crate::models::disputes::{self, DisputeStatus, FileDispute};

/// Insert a new open dispute.
pub async fn insert_dispute<C: ConnectionTrait>(
    db: &C,
    created_by: Uuid,
    respondent_id: Option<Uuid>,
    input: FileDispute,
    now: DateTime<Utc>,
) -> Result<disputes::Model, DbErr> {
    let new_dispute = disputes::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(input.order_id),
        created_by: Set(created_by),
        respondent_id: Set(respondent_id),
        category: Set(input.category),
        description: Set(input.description),
        status: Set(DisputeStatus::Open),
        designer_response: Set(None),
        response_message: Set(None),
        resolution: Set(None),
        admin_notes: Set(String::new()),
        resolved_by: Set(None),
        version: Set(0),
        created_at: Set(now),
        updated_at: Set(None),
        resolved_at: Set(None),
    };

    new_dispute.insert(db).await
}

/// Fetch a single dispute by ID.
pub async fn get_dispute_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<disputes::Model>, DbErr> {
    disputes::Entity::find_by_id(id).one(db).await
}

/// Fetch the dispute attached to an order, whatever its status.
pub async fn get_dispute_by_order_id<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
) -> Result<Option<disputes::Model>, DbErr> {
    disputes::Entity::find()
        .filter(disputes::Column::OrderId.eq(order_id))
        .one(db)
        .await
}

/// Apply the `Set` fields of `changes` only if the dispute still has the
/// version `current` was read with.
pub async fn update_if_version<C: ConnectionTrait>(
    db: &C,
    current: &disputes::Model,
    mut changes: disputes::ActiveModel,
    now: DateTime<Utc>,
) -> Result<bool, DbErr> {
    changes.version = Set(current.version + 1);
    changes.updated_at = Set(Some(now));

    let result = disputes::Entity::update_many()
        .set(changes)
        .filter(disputes::Column::Id.eq(current.id))
        .filter(disputes::Column::Version.eq(current.version))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}
