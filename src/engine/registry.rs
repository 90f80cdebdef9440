use sea_orm::{SqlErr, TransactionTrait};
use uuid::Uuid;

use super::Engine;
use super::eligibility::rank_candidates;
use crate::db::MAX_CAS_ATTEMPTS;
use crate::db::designers as designer_db;
use crate::db::orders as order_db;
use crate::error::CoreError;
use crate::models::designers::{self, DesignerStatus, DesignerSummary, RegisterDesigner};
use crate::models::orders::{self, AssignmentStatus, CreateOrder, OrderStatus};

impl Engine {
    /// Accept an order from the ordering flow. It starts `pending` and `open`.
    pub async fn create_order(&self, input: CreateOrder) -> Result<orders::Model, CoreError> {
        if input.title.trim().is_empty() {
            return Err(CoreError::Validation("order title is required".to_string()));
        }
        if input.price.is_some_and(|p| p < 0) || input.delivery_fee.is_some_and(|f| f < 0) {
            return Err(CoreError::Validation(
                "price and delivery fee must not be negative".to_string(),
            ));
        }

        let order = order_db::insert_order(&self.db, input, self.now()).await?;
        tracing::info!(order_id = %order.id, customer_id = %order.customer_id, "order created");
        Ok(order)
    }

    pub async fn register_designer(
        &self,
        input: RegisterDesigner,
    ) -> Result<designers::Model, CoreError> {
        if input.display_name.trim().is_empty() {
            return Err(CoreError::Validation("display name is required".to_string()));
        }
        if input.max_capacity < 0 {
            return Err(CoreError::Validation(
                "max capacity must not be negative".to_string(),
            ));
        }

        let user_id = input.user_id;
        let designer = designer_db::insert_designer(&self.db, input, self.now())
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => CoreError::InvalidState(format!(
                    "user {user_id} already has a designer profile"
                )),
                _ => CoreError::Database(e),
            })?;

        tracing::info!(designer_id = %designer.id, %user_id, "designer registered");
        Ok(designer)
    }

    /// Set a designer's live status. Offline designers drop out of eligibility
    /// but keep the orders they already hold.
    pub async fn set_designer_status(
        &self,
        designer_id: Uuid,
        status: DesignerStatus,
    ) -> Result<designers::Model, CoreError> {
        let updated = designer_db::update_status(&self.db, designer_id, status, self.now()).await?;
        if updated == 0 {
            return Err(CoreError::not_found("Designer", designer_id));
        }

        tracing::info!(%designer_id, ?status, "designer status changed");
        self.get_designer(designer_id).await
    }

    /// Change how many orders a designer may hold. Never below the live load.
    pub async fn set_designer_capacity(
        &self,
        designer_id: Uuid,
        max_capacity: i32,
    ) -> Result<designers::Model, CoreError> {
        if max_capacity < 0 {
            return Err(CoreError::Validation(
                "max capacity must not be negative".to_string(),
            ));
        }

        for _ in 0..MAX_CAS_ATTEMPTS {
            let designer = self.get_designer(designer_id).await?;
            if max_capacity < designer.current_load {
                return Err(CoreError::Validation(format!(
                    "max capacity {max_capacity} is below the current load of {}",
                    designer.current_load
                )));
            }

            if designer_db::try_update_capacity(&self.db, &designer, max_capacity, self.now())
                .await?
            {
                tracing::info!(
                    %designer_id,
                    from = designer.max_capacity,
                    to = max_capacity,
                    "designer capacity changed"
                );
                return self.get_designer(designer_id).await;
            }
        }

        Err(CoreError::WriteConflict)
    }

    /// Ranked eligible designers for an order, without touching it.
    pub async fn recommended_designers(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<DesignerSummary>, CoreError> {
        let order = self.get_order(order_id).await?;
        let pool =
            designer_db::get_designers_by_status(&self.db, DesignerStatus::Available).await?;

        Ok(rank_candidates(&order, &pool, &self.settings.ranking)
            .into_iter()
            .cloned()
            .map(DesignerSummary::from)
            .collect())
    }

    /// The customer rates a delivered order once; the rating is folded into
    /// the designer's running average in the same transaction.
    pub async fn rate_order(
        &self,
        order_id: Uuid,
        customer_id: Uuid,
        rating: i16,
    ) -> Result<orders::Model, CoreError> {
        if !(1..=5).contains(&rating) {
            return Err(CoreError::Validation(
                "rating must be between 1 and 5".to_string(),
            ));
        }

        for _ in 0..MAX_CAS_ATTEMPTS {
            let txn = self.db.begin().await?;
            let now = self.now();

            let order = order_db::get_order_by_id(&txn, order_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Order", order_id))?;
            if order.customer_id != customer_id {
                return Err(CoreError::Forbidden(
                    "only the ordering customer can rate this order".to_string(),
                ));
            }
            if order.status != OrderStatus::Delivered {
                return Err(CoreError::InvalidState(format!(
                    "order {order_id} is {:?}, only delivered orders can be rated",
                    order.status
                )));
            }
            if order.customer_rating.is_some() {
                return Err(CoreError::InvalidState(format!(
                    "order {order_id} has already been rated"
                )));
            }
            let designer_id = match (order.assignment_status, order.assigned_designer_id) {
                (AssignmentStatus::Assigned, Some(id)) => id,
                _ => {
                    return Err(CoreError::InvalidState(format!(
                        "order {order_id} has no assigned designer"
                    )));
                }
            };

            if !order_db::record_rating(&txn, &order, rating, now).await? {
                txn.rollback().await?;
                continue;
            }

            let designer = designer_db::get_designer_by_id(&txn, designer_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Designer", designer_id))?;
            let n = f64::from(designer.review_count);
            let average = (designer.rating * n + f64::from(rating)) / (n + 1.0);

            if !designer_db::try_record_review(&txn, &designer, average, now).await? {
                txn.rollback().await?;
                continue;
            }
            txn.commit().await?;

            tracing::info!(%order_id, %designer_id, rating, average, "order rated");
            self.audit(
                customer_id,
                "order.rated",
                format!("rated {rating}/5"),
                Some(order_id),
            )
            .await;

            return self.get_order(order_id).await;
        }

        Err(CoreError::WriteConflict)
    }
}
