use uuid::Uuid;

use super::Engine;
use super::eligibility::rank_candidates;
use crate::db::MAX_CAS_ATTEMPTS;
use crate::db::designers as designer_db;
use crate::db::orders::{self as order_db, AssignmentChange};
use crate::error::CoreError;
use crate::models::designers::DesignerStatus;
use crate::models::notifications::NotificationKind;
use crate::models::orders::{self, AssignmentStatus};
use crate::notify::Notification;

impl Engine {
    /// Offer an open order to the top-ranked eligible designers.
    ///
    /// No capacity is reserved here; a designer can sit on several shortlists
    /// at once and capacity is only taken on acceptance.
    pub async fn shortlist(&self, order_id: Uuid) -> Result<orders::Model, CoreError> {
        for _ in 0..MAX_CAS_ATTEMPTS {
            let order = self.load_order_reclaiming(order_id).await?;
            if order.status.is_terminal() {
                return Err(CoreError::InvalidState(format!(
                    "order {order_id} is {:?} and cannot be shortlisted",
                    order.status
                )));
            }
            if order.assignment_status != AssignmentStatus::Open {
                return Err(CoreError::InvalidState(format!(
                    "order {order_id} is {:?}, only open orders can be shortlisted",
                    order.assignment_status
                )));
            }

            let pool = designer_db::get_designers_by_status(&self.db, DesignerStatus::Available)
                .await?;
            let candidates: Vec<_> = rank_candidates(&order, &pool, &self.settings.ranking)
                .into_iter()
                .take(self.settings.shortlist_size)
                .cloned()
                .collect();

            if candidates.is_empty() {
                tracing::info!(%order_id, "no eligible designers for shortlist");
                return Err(CoreError::NoEligibleDesigners(order_id));
            }

            let now = self.now();
            let expires_at = now + self.settings.offer_window;
            let change = AssignmentChange::shortlisted(
                candidates.iter().map(|d| d.id).collect(),
                expires_at,
            );
            if !order_db::transition_assignment(&self.db, &order, change, now).await? {
                continue;
            }

            tracing::info!(
                %order_id,
                candidates = candidates.len(),
                %expires_at,
                "order shortlisted"
            );

            for designer in &candidates {
                self.notify(
                    Notification::new(
                        designer.user_id,
                        NotificationKind::AssignmentRequest,
                        format!("New order request: {}", order.title),
                    )
                    .with_email(serde_json::json!({
                        "template": "assignment_request",
                        "order_id": order_id,
                        "order_title": order.title,
                        "expires_at": expires_at,
                    })),
                )
                .await;
            }

            self.audit(
                order.customer_id,
                "order.shortlisted",
                format!("{} candidate(s), offer open until {expires_at}", candidates.len()),
                Some(order_id),
            )
            .await;

            return self.get_order(order_id).await;
        }

        Err(CoreError::WriteConflict)
    }

    /// A shortlisted designer turns the offer down.
    ///
    /// When the last candidate declines the order goes back to `open`.
    pub async fn decline(
        &self,
        order_id: Uuid,
        designer_id: Uuid,
    ) -> Result<orders::Model, CoreError> {
        for _ in 0..MAX_CAS_ATTEMPTS {
            let order = self.load_order_reclaiming(order_id).await?;
            if order.assignment_status != AssignmentStatus::Shortlisted
                || !order.is_shortlisted(designer_id)
            {
                return Err(CoreError::NotShortlisted {
                    order_id,
                    designer_id,
                });
            }

            let remaining: Vec<Uuid> = order
                .shortlist()
                .into_iter()
                .filter(|id| *id != designer_id)
                .collect();
            let exhausted = remaining.is_empty();

            let now = self.now();
            let change = match order.assignment_expires_at {
                Some(expires_at) if !exhausted => AssignmentChange::shortlisted(remaining, expires_at),
                _ => AssignmentChange::open(),
            };
            if !order_db::transition_assignment(&self.db, &order, change, now).await? {
                continue;
            }

            tracing::info!(%order_id, %designer_id, exhausted, "offer declined");

            if exhausted {
                self.notify(Notification::new(
                    order.customer_id,
                    NotificationKind::ShortlistExhausted,
                    format!(
                        "No designer has taken \"{}\" yet. You can pick a designer yourself or request a new shortlist.",
                        order.title
                    ),
                ))
                .await;
            }

            return self.get_order(order_id).await;
        }

        Err(CoreError::WriteConflict)
    }
}
