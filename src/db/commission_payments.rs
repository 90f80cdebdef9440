use chrono::{DateTime, Utc};
use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::commission_payments::{self, PaymentStatus, SubmitCommissionPayment};

/// Insert a new pending commission payment.
pub async fn insert_payment<C: ConnectionTrait>(
    db: &C,
    designer_id: Uuid,
    input: SubmitCommissionPayment,
    now: DateTime<Utc>,
) -> Result<commission_payments::Model, DbErr> {
    let new_payment = commission_payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        designer_id: Set(designer_id),
        amount: Set(input.amount),
        status: Set(PaymentStatus::Pending),
        proof_reference: Set(input.proof_reference),
        reviewed_by: Set(None),
        created_at: Set(now),
        reviewed_at: Set(None),
    };

    new_payment.insert(db).await
}

/// Fetch a single payment by ID.
pub async fn get_payment_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<commission_payments::Model>, DbErr> {
    commission_payments::Entity::find_by_id(id).one(db).await
}

/// Fetch all payments recorded for a designer, oldest first.
pub async fn get_payments_by_designer<C: ConnectionTrait>(
    db: &C,
    designer_id: Uuid,
) -> Result<Vec<commission_payments::Model>, DbErr> {
    commission_payments::Entity::find()
        .filter(commission_payments::Column::DesignerId.eq(designer_id))
        .order_by_asc(commission_payments::Column::CreatedAt)
        .order_by_asc(commission_payments::Column::Id)
        .all(db)
        .await
}

/// Move a payment out of `pending`. Returns `false` if it was already reviewed.
pub async fn try_review<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    status: PaymentStatus,
    reviewer_id: Uuid,
    now: DateTime<Utc>,
) -> Result<bool, DbErr> {
    let result = commission_payments::Entity::update_many()
        .col_expr(commission_payments::Column::Status, Expr::value(status))
        .col_expr(
            commission_payments::Column::ReviewedBy,
            Expr::value(reviewer_id),
        )
        .col_expr(commission_payments::Column::ReviewedAt, Expr::value(now))
        .filter(commission_payments::Column::Id.eq(id))
        .filter(commission_payments::Column::Status.eq(PaymentStatus::Pending))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}
