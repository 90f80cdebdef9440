use chrono::{DateTime, Utc};
use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::designers::{self, DesignerStatus, RegisterDesigner};

/// Insert a new designer profile with an empty load.
pub async fn insert_designer<C: ConnectionTrait>(
    db: &C,
    input: RegisterDesigner,
    now: DateTime<Utc>,
) -> Result<designers::Model, DbErr> {
    let specialties = serde_json::to_value(&input.specialties)
        .map_err(|e| DbErr::Custom(format!("Failed to encode specialties: {e}")))?;

    let new_designer = designers::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(input.user_id),
        display_name: Set(input.display_name),
        specialties: Set(specialties),
        skill_level: Set(input.skill_level),
        max_capacity: Set(input.max_capacity),
        current_load: Set(0),
        status: Set(DesignerStatus::Available),
        rating: Set(0.0),
        review_count: Set(0),
        bank_name: Set(None),
        account_number: Set(None),
        account_name: Set(None),
        created_at: Set(now),
        updated_at: Set(None),
    };

    new_designer.insert(db).await
}

/// Fetch a single designer by profile ID.
pub async fn get_designer_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<designers::Model>, DbErr> {
    designers::Entity::find_by_id(id).one(db).await
}

/// Fetch the designer profile owned by a user.
pub async fn get_designer_by_user_id<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Option<designers::Model>, DbErr> {
    designers::Entity::find()
        .filter(designers::Column::UserId.eq(user_id))
        .one(db)
        .await
}

/// Fetch designers in a given live status.
pub async fn get_designers_by_status<C: ConnectionTrait>(
    db: &C,
    status: DesignerStatus,
) -> Result<Vec<designers::Model>, DbErr> {
    designers::Entity::find()
        .filter(designers::Column::Status.eq(status))
        .all(db)
        .await
}

/// Fetch all designers.
pub async fn get_all_designers<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<designers::Model>, DbErr> {
    designers::Entity::find().all(db).await
}

/// Take one unit of capacity, conditioned on the load `current` was read with
/// and on there still being room at write time.
pub async fn try_increment_load<C: ConnectionTrait>(
    db: &C,
    current: &designers::Model,
    now: DateTime<Utc>,
) -> Result<bool, DbErr> {
    let result = designers::Entity::update_many()
        .col_expr(
            designers::Column::CurrentLoad,
            Expr::value(current.current_load + 1),
        )
        .col_expr(designers::Column::UpdatedAt, Expr::value(now))
        .filter(designers::Column::Id.eq(current.id))
        .filter(designers::Column::CurrentLoad.eq(current.current_load))
        .filter(designers::Column::MaxCapacity.gt(current.current_load))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Return one unit of capacity, conditioned on the load `current` was read with.
pub async fn try_decrement_load<C: ConnectionTrait>(
    db: &C,
    current: &designers::Model,
    now: DateTime<Utc>,
) -> Result<bool, DbErr> {
    let result = designers::Entity::update_many()
        .col_expr(
            designers::Column::CurrentLoad,
            Expr::value(current.current_load - 1),
        )
        .col_expr(designers::Column::UpdatedAt, Expr::value(now))
        .filter(designers::Column::Id.eq(current.id))
        .filter(designers::Column::CurrentLoad.eq(current.current_load))
        .filter(designers::Column::CurrentLoad.gt(0))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Change `max_capacity`, conditioned on the load not having moved since `current` was read.
pub async fn try_update_capacity<C: ConnectionTrait>(
    db: &C,
    current: &designers::Model,
    max_capacity: i32,
    now: DateTime<Utc>,
) -> Result<bool, DbErr> {
    let result = designers::Entity::update_many()
        .col_expr(designers::Column::MaxCapacity, Expr::value(max_capacity))
        .col_expr(designers::Column::UpdatedAt, Expr::value(now))
        .filter(designers::Column::Id.eq(current.id))
        .filter(designers::Column::CurrentLoad.eq(current.current_load))
        .filter(designers::Column::CurrentLoad.lte(max_capacity))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Update the live status of a designer.
pub async fn update_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    status: DesignerStatus,
    now: DateTime<Utc>,
) -> Result<u64, DbErr> {
    let result = designers::Entity::update_many()
        .col_expr(designers::Column::Status, Expr::value(status))
        .col_expr(designers::Column::UpdatedAt, Expr::value(now))
        .filter(designers::Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Fold one more review into the running average, conditioned on the review
/// count `current` was read with.
pub async fn try_record_review<C: ConnectionTrait>(
    db: &C,
    current: &designers::Model,
    rating: f64,
    now: DateTime<Utc>,
) -> Result<bool, DbErr> {
    let result = designers::Entity::update_many()
        .col_expr(designers::Column::Rating, Expr::value(rating))
        .col_expr(
            designers::Column::ReviewCount,
            Expr::value(current.review_count + 1),
        )
        .col_expr(designers::Column::UpdatedAt, Expr::value(now))
        .filter(designers::Column::Id.eq(current.id))
        .filter(designers::Column::ReviewCount.eq(current.review_count))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}
