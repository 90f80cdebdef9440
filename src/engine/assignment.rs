use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, TransactionTrait};
use uuid::Uuid;

use super::Engine;
use crate::db::MAX_CAS_ATTEMPTS;
use crate::db::designers as designer_db;
use crate::db::orders::{self as order_db, AssignmentChange};
use crate::error::CoreError;
use crate::models::designers::{self, DesignerStatus};
use crate::models::notifications::NotificationKind;
use crate::models::orders::{self, AssignmentStatus, OrderStatus};
use crate::notify::Notification;

/// Take one unit of a designer's capacity, re-reading the live load on every attempt.
pub(crate) async fn reserve_capacity<C: ConnectionTrait>(
    conn: &C,
    designer_id: Uuid,
    now: DateTime<Utc>,
) -> Result<designers::Model, CoreError> {
    for _ in 0..MAX_CAS_ATTEMPTS {
        let designer = designer_db::get_designer_by_id(conn, designer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Designer", designer_id))?;

        if !designer.has_capacity() {
            return Err(CoreError::CapacityExceeded(designer_id));
        }
        if designer_db::try_increment_load(conn, &designer, now).await? {
            return Ok(designer);
        }
    }

    Err(CoreError::WriteConflict)
}

/// Give one unit of capacity back to a designer.
pub(crate) async fn release_capacity<C: ConnectionTrait>(
    conn: &C,
    designer_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), CoreError> {
    for _ in 0..MAX_CAS_ATTEMPTS {
        let designer = designer_db::get_designer_by_id(conn, designer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Designer", designer_id))?;

        if designer.current_load <= 0 {
            tracing::warn!(%designer_id, "release requested but load is already zero");
            return Ok(());
        }
        if designer_db::try_decrement_load(conn, &designer, now).await? {
            return Ok(());
        }
    }

    Err(CoreError::WriteConflict)
}

/// Who is moving an order's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusAuthority {
    /// Production progress and admin status updates. Never leaves a terminal status.
    Production,
    /// An admin settling a dispute, who may also refund a delivered order.
    DisputeResolution,
}

/// Move an order's production status, handing the designer slot back when
/// the order reaches `delivered` or `cancelled`. Returns `false` when the
/// order changed underneath the caller.
pub(crate) async fn apply_status_change<C: ConnectionTrait>(
    conn: &C,
    order: &orders::Model,
    status: OrderStatus,
    authority: StatusAuthority,
    now: DateTime<Utc>,
) -> Result<bool, CoreError> {
    let refund = authority == StatusAuthority::DisputeResolution
        && order.status == OrderStatus::Delivered
        && status == OrderStatus::Cancelled;
    if order.status.is_terminal() && !refund {
        return Err(CoreError::InvalidState(format!(
            "order {} is already {:?}",
            order.id, order.status
        )));
    }

    // A delivered order has already given its slot back, so a refund releases nothing.
    let release = status.is_terminal() && order.holds_designer_load();
    if release {
        if let Some(designer_id) = order.assigned_designer_id {
            release_capacity(conn, designer_id, now).await?;
        }
    }

    Ok(order_db::transition_status(conn, order, status, release, now).await?)
}

/// Whether `designer_id` may accept `order` right now.
fn ensure_offered(
    order: &orders::Model,
    designer_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), CoreError> {
    if order.status.is_terminal() {
        return Err(CoreError::InvalidState(format!(
            "order {} is {:?}",
            order.id, order.status
        )));
    }
    match order.assignment_status {
        AssignmentStatus::Assigned => Err(CoreError::AlreadyAssigned(order.id)),
        AssignmentStatus::Shortlisted
            if !order.is_offer_expired(now) && order.is_shortlisted(designer_id) =>
        {
            Ok(())
        }
        _ => Err(CoreError::NotOffered {
            order_id: order.id,
            designer_id,
        }),
    }
}

/// Hand `order` to `designer_id` inside the caller's transaction.
///
/// Returns the slot of whoever held the order and reserves one for the new
/// designer. Designer rows are always written in id order, so two crossing
/// reassignments lock them in the same sequence. Returns `None` when `order`
/// no longer matches the stored row; the caller must then roll back, which
/// also undoes the capacity changes.
pub async fn try_assign<C: ConnectionTrait>(
    conn: &C,
    order: &orders::Model,
    designer_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<designers::Model>, CoreError> {
    let previous = order
        .holds_designer_load()
        .then_some(order.assigned_designer_id)
        .flatten();

    let designer = match previous {
        Some(previous_id) if previous_id < designer_id => {
            release_capacity(conn, previous_id, now).await?;
            reserve_capacity(conn, designer_id, now).await?
        }
        Some(previous_id) => {
            let designer = reserve_capacity(conn, designer_id, now).await?;
            release_capacity(conn, previous_id, now).await?;
            designer
        }
        None => reserve_capacity(conn, designer_id, now).await?,
    };

    let assigned = order_db::transition_assignment(
        conn,
        order,
        AssignmentChange::assigned(designer_id),
        now,
    )
    .await?;

    Ok(assigned.then_some(designer))
}

impl Engine {
    /// A shortlisted (or manually offered) designer accepts the order.
    ///
    /// Capacity is re-checked at write time and the order transition is
    /// conditioned on the order still being shortlisted at the version we
    /// read, so of several simultaneous accepts exactly one wins. Losers get
    /// `AlreadyAssigned` and their capacity reservation is rolled back.
    pub async fn accept_offer(
        &self,
        order_id: Uuid,
        designer_id: Uuid,
    ) -> Result<orders::Model, CoreError> {
        let order = self.load_order_reclaiming(order_id).await?;
        ensure_offered(&order, designer_id, self.now())?;

        for _ in 0..MAX_CAS_ATTEMPTS {
            let txn = self.db.begin().await?;
            let now = self.now();

            let order = order_db::get_order_by_id(&txn, order_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Order", order_id))?;
            ensure_offered(&order, designer_id, now)?;

            let Some(designer) = try_assign(&txn, &order, designer_id, now).await? else {
                // Lost the race or the shortlist moved; undo the reservation and look again.
                txn.rollback().await?;
                continue;
            };
            txn.commit().await?;

            tracing::info!(
                %order_id,
                %designer_id,
                load = designer.current_load + 1,
                max_capacity = designer.max_capacity,
                "offer accepted"
            );

            self.notify(
                Notification::new(
                    order.customer_id,
                    NotificationKind::DesignerAssigned,
                    format!("{} has accepted \"{}\"", designer.display_name, order.title),
                )
                .with_email(serde_json::json!({
                    "template": "designer_assigned",
                    "order_id": order_id,
                    "designer_name": designer.display_name,
                })),
            )
            .await;
            self.audit(
                designer.user_id,
                "order.accepted",
                format!("designer {designer_id} accepted the offer"),
                Some(order_id),
            )
            .await;

            return self.get_order(order_id).await;
        }

        Err(CoreError::WriteConflict)
    }

    /// The customer skips the shortlist and offers the order to one designer.
    ///
    /// The offer uses the same window as a shortlist and resolves through
    /// [`Engine::accept_offer`] or [`Engine::decline`].
    pub async fn offer_to_designer(
        &self,
        order_id: Uuid,
        designer_id: Uuid,
    ) -> Result<orders::Model, CoreError> {
        for _ in 0..MAX_CAS_ATTEMPTS {
            let order = self.load_order_reclaiming(order_id).await?;
            if order.status.is_terminal() || order.assignment_status != AssignmentStatus::Open {
                return Err(CoreError::InvalidState(format!(
                    "order {order_id} is {:?}/{:?}, only open orders can be offered",
                    order.status, order.assignment_status
                )));
            }

            let designer = self.get_designer(designer_id).await?;
            if designer.status == DesignerStatus::Offline {
                return Err(CoreError::InvalidState(format!(
                    "designer {designer_id} is offline"
                )));
            }
            if !designer.has_capacity() {
                return Err(CoreError::CapacityExceeded(designer_id));
            }

            let now = self.now();
            let expires_at = now + self.settings.offer_window;
            let change = AssignmentChange::shortlisted(vec![designer_id], expires_at);
            if !order_db::transition_assignment(&self.db, &order, change, now).await? {
                continue;
            }

            tracing::info!(%order_id, %designer_id, %expires_at, "order offered directly");

            self.notify(
                Notification::new(
                    designer.user_id,
                    NotificationKind::AssignmentRequest,
                    format!("A customer picked you for \"{}\"", order.title),
                )
                .with_email(serde_json::json!({
                    "template": "assignment_request",
                    "order_id": order_id,
                    "order_title": order.title,
                    "expires_at": expires_at,
                })),
            )
            .await;

            return self.get_order(order_id).await;
        }

        Err(CoreError::WriteConflict)
    }

    /// Admin override: assign `designer_id` from any assignment state.
    ///
    /// Any stale shortlist is cleared. When the order was held by another
    /// designer, their load is returned and the new designer's taken inside
    /// one transaction, so a failure part-way leaves both counters untouched.
    pub async fn admin_assign(
        &self,
        order_id: Uuid,
        designer_id: Uuid,
        admin_id: Uuid,
    ) -> Result<orders::Model, CoreError> {
        for _ in 0..MAX_CAS_ATTEMPTS {
            let txn = self.db.begin().await?;
            let now = self.now();

            let order = order_db::get_order_by_id(&txn, order_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Order", order_id))?;
            if order.status.is_terminal() {
                return Err(CoreError::InvalidState(format!(
                    "order {order_id} is {:?} and cannot be reassigned",
                    order.status
                )));
            }
            if order.assignment_status == AssignmentStatus::Assigned
                && order.assigned_designer_id == Some(designer_id)
            {
                return Err(CoreError::InvalidState(format!(
                    "order {order_id} is already assigned to designer {designer_id}"
                )));
            }

            let previous = order
                .holds_designer_load()
                .then_some(order.assigned_designer_id)
                .flatten();
            let Some(designer) = try_assign(&txn, &order, designer_id, now).await? else {
                txn.rollback().await?;
                continue;
            };
            txn.commit().await?;

            tracing::info!(
                %order_id,
                %designer_id,
                previous_designer_id = ?previous,
                %admin_id,
                "order assigned by admin"
            );

            self.notify(Notification::new(
                designer.user_id,
                NotificationKind::AssignedByAdmin,
                format!("You have been assigned \"{}\"", order.title),
            ))
            .await;

            if let Some(previous_id) = previous {
                match designer_db::get_designer_by_id(&self.db, previous_id).await {
                    Ok(Some(prev)) => {
                        self.notify(Notification::new(
                            prev.user_id,
                            NotificationKind::AssignmentRevoked,
                            format!("\"{}\" has been reassigned to another designer", order.title),
                        ))
                        .await;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(%previous_id, error = %e, "could not look up previous designer");
                    }
                }
            }

            self.notify(Notification::new(
                order.customer_id,
                NotificationKind::DesignerAssigned,
                format!("{} is now working on \"{}\"", designer.display_name, order.title),
            ))
            .await;

            self.audit(
                admin_id,
                "order.admin_assigned",
                match previous {
                    Some(previous_id) => {
                        format!("reassigned from designer {previous_id} to {designer_id}")
                    }
                    None => format!("assigned to designer {designer_id}"),
                },
                Some(order_id),
            )
            .await;

            return self.get_order(order_id).await;
        }

        Err(CoreError::WriteConflict)
    }

    /// Record production progress. Delivered and cancelled orders release
    /// their designer's capacity exactly once.
    pub async fn advance_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
        actor_id: Uuid,
    ) -> Result<orders::Model, CoreError> {
        for _ in 0..MAX_CAS_ATTEMPTS {
            let txn = self.db.begin().await?;
            let now = self.now();

            let order = order_db::get_order_by_id(&txn, order_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Order", order_id))?;
            if order.status == status {
                return Ok(order);
            }

            if !apply_status_change(&txn, &order, status, StatusAuthority::Production, now).await? {
                txn.rollback().await?;
                continue;
            }
            txn.commit().await?;

            tracing::info!(%order_id, from = ?order.status, to = ?status, "order status changed");
            self.audit(
                actor_id,
                "order.status_changed",
                format!("{:?} -> {:?}", order.status, status),
                Some(order_id),
            )
            .await;

            return self.get_order(order_id).await;
        }

        Err(CoreError::WriteConflict)
    }
}
