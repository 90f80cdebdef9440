use chrono::{DateTime, Utc};
use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::orders::{self, AssignmentStatus, CreateOrder, OrderStatus};

/// The assignment fields, always written together so the order invariants
/// hold after every single statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentChange {
    pub assignment_status: AssignmentStatus,
    pub shortlist: Vec<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub assigned_designer_id: Option<Uuid>,
}

impl AssignmentChange {
    pub fn open() -> Self {
        Self {
            assignment_status: AssignmentStatus::Open,
            shortlist: Vec::new(),
            expires_at: None,
            assigned_designer_id: None,
        }
    }

    pub fn shortlisted(candidates: Vec<Uuid>, expires_at: DateTime<Utc>) -> Self {
        Self {
            assignment_status: AssignmentStatus::Shortlisted,
            shortlist: candidates,
            expires_at: Some(expires_at),
            assigned_designer_id: None,
        }
    }

    pub fn assigned(designer_id: Uuid) -> Self {
        Self {
            assignment_status: AssignmentStatus::Assigned,
            shortlist: Vec::new(),
            expires_at: None,
            assigned_designer_id: Some(designer_id),
        }
    }
}

/// Insert an order handed over by the ordering flow (`pending` / `open`).
pub async fn insert_order<C: ConnectionTrait>(
    db: &C,
    input: CreateOrder,
    now: DateTime<Utc>,
) -> Result<orders::Model, DbErr> {
    let new_order = orders::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(input.customer_id),
        title: Set(input.title),
        category: Set(input.category),
        style: Set(input.style),
        status: Set(OrderStatus::Pending),
        assignment_status: Set(AssignmentStatus::Open),
        shortlisted_designer_ids: Set(serde_json::json!([])),
        assignment_expires_at: Set(None),
        assigned_designer_id: Set(None),
        price: Set(input.price),
        delivery_fee: Set(input.delivery_fee),
        template_id: Set(input.template_id),
        customer_rating: Set(None),
        load_released: Set(false),
        version: Set(0),
        created_at: Set(now),
        updated_at: Set(None),
    };

    new_order.insert(db).await
}

/// Fetch a single order by ID.
pub async fn get_order_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<orders::Model>, DbErr> {
    orders::Entity::find_by_id(id).one(db).await
}

/// Fetch every order ever assigned to a designer, oldest first.
pub async fn get_orders_by_designer<C: ConnectionTrait>(
    db: &C,
    designer_id: Uuid,
) -> Result<Vec<orders::Model>, DbErr> {
    orders::Entity::find()
        .filter(orders::Column::AssignedDesignerId.eq(designer_id))
        .order_by_asc(orders::Column::CreatedAt)
        .order_by_asc(orders::Column::Id)
        .all(db)
        .await
}

/// Fetch all orders.
pub async fn get_all_orders<C: ConnectionTrait>(db: &C) -> Result<Vec<orders::Model>, DbErr> {
    orders::Entity::find().all(db).await
}

/// Conditionally rewrite the assignment fields of `current`.
///
/// The update only lands if the row still has the version and assignment
/// status that `current` was read with. Returns `false` when another writer
/// got there first.
pub async fn transition_assignment<C: ConnectionTrait>(
    db: &C,
    current: &orders::Model,
    change: AssignmentChange,
    now: DateTime<Utc>,
) -> Result<bool, DbErr> {
    let shortlist = serde_json::to_value(&change.shortlist)
        .map_err(|e| DbErr::Custom(format!("Failed to encode shortlist: {e}")))?;

    let result = orders::Entity::update_many()
        .col_expr(
            orders::Column::AssignmentStatus,
            Expr::value(change.assignment_status),
        )
        .col_expr(orders::Column::ShortlistedDesignerIds, Expr::value(shortlist))
        .col_expr(
            orders::Column::AssignmentExpiresAt,
            Expr::value(change.expires_at),
        )
        .col_expr(
            orders::Column::AssignedDesignerId,
            Expr::value(change.assigned_designer_id),
        )
        .col_expr(orders::Column::LoadReleased, Expr::value(false))
        .col_expr(orders::Column::Version, Expr::value(current.version + 1))
        .col_expr(orders::Column::UpdatedAt, Expr::value(now))
        .filter(orders::Column::Id.eq(current.id))
        .filter(orders::Column::Version.eq(current.version))
        .filter(orders::Column::AssignmentStatus.eq(current.assignment_status))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Conditionally move the production status of `current`, optionally marking
/// the designer's load as released.
pub async fn transition_status<C: ConnectionTrait>(
    db: &C,
    current: &orders::Model,
    status: OrderStatus,
    release_load: bool,
    now: DateTime<Utc>,
) -> Result<bool, DbErr> {
    let result = orders::Entity::update_many()
        .col_expr(orders::Column::Status, Expr::value(status))
        .col_expr(
            orders::Column::LoadReleased,
            Expr::value(current.load_released || release_load),
        )
        .col_expr(orders::Column::Version, Expr::value(current.version + 1))
        .col_expr(orders::Column::UpdatedAt, Expr::value(now))
        .filter(orders::Column::Id.eq(current.id))
        .filter(orders::Column::Version.eq(current.version))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Record the customer's rating once. Fails the compare-and-set if the order
/// moved or was already rated.
pub async fn record_rating<C: ConnectionTrait>(
    db: &C,
    current: &orders::Model,
    rating: i16,
    now: DateTime<Utc>,
) -> Result<bool, DbErr> {
    let result = orders::Entity::update_many()
        .col_expr(orders::Column::CustomerRating, Expr::value(rating))
        .col_expr(orders::Column::Version, Expr::value(current.version + 1))
        .col_expr(orders::Column::UpdatedAt, Expr::value(now))
        .filter(orders::Column::Id.eq(current.id))
        .filter(orders::Column::Version.eq(current.version))
        .filter(orders::Column::CustomerRating.is_null())
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}
