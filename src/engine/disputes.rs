//! Dispute workflow.
//!
//! A dispute moves `open -> response_required -> resolved | closed`. Only an
//! admin moves it to a terminal state, and may change the disputed order's
//! status as part of the same transaction.

use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{ActiveValue::Set, SqlErr, TransactionTrait};
use uuid::Uuid;

use super::Engine;
use super::assignment::{StatusAuthority, apply_status_change};
use crate::db::MAX_CAS_ATTEMPTS;
use crate::db::dispute_evidence as evidence_db;
use crate::db::disputes as dispute_db;
use crate::db::orders as order_db;
use crate::error::CoreError;
use crate::models::dispute_evidence::{self, SubmitEvidence};
use crate::models::disputes::{
    self, DisputeDetail, DisputeStatus, FileDispute, ResolveDispute, RespondToDispute,
};
use crate::models::notifications::NotificationKind;
use crate::notify::Notification;

fn note_line(now: DateTime<Utc>, actor_id: Uuid, note: &str) -> String {
    format!(
        "[{}] {actor_id}: {}\n",
        now.to_rfc3339_opts(SecondsFormat::Secs, true),
        note.trim()
    )
}

impl Engine {
    async fn load_dispute(&self, dispute_id: Uuid) -> Result<disputes::Model, CoreError> {
        dispute_db::get_dispute_by_id(&self.db, dispute_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Dispute", dispute_id))
    }

    /// The customer opens a dispute on a shipped or delivered order.
    pub async fn file_dispute(
        &self,
        customer_id: Uuid,
        input: FileDispute,
    ) -> Result<disputes::Model, CoreError> {
        if input.category.trim().is_empty() || input.description.trim().is_empty() {
            return Err(CoreError::Validation(
                "dispute category and description are required".to_string(),
            ));
        }

        let order_id = input.order_id;
        let order = self.get_order(order_id).await?;
        if order.customer_id != customer_id {
            return Err(CoreError::Forbidden(
                "only the ordering customer can dispute this order".to_string(),
            ));
        }
        if !order.status.is_disputable() {
            return Err(CoreError::InvalidState(format!(
                "order {order_id} is {:?}; disputes need a shipped or delivered order",
                order.status
            )));
        }
        if dispute_db::get_dispute_by_order_id(&self.db, order_id)
            .await?
            .is_some()
        {
            return Err(CoreError::DuplicateDispute(order_id));
        }

        let respondent = match order.assigned_designer_id {
            Some(designer_id) => Some(self.get_designer(designer_id).await?),
            None => None,
        };

        let dispute = dispute_db::insert_dispute(
            &self.db,
            customer_id,
            respondent.as_ref().map(|d| d.user_id),
            input,
            self.now(),
        )
        .await
        .map_err(|e| match e.sql_err() {
            // Lost a race with a concurrent filing; the unique index decides.
            Some(SqlErr::UniqueConstraintViolation(_)) => CoreError::DuplicateDispute(order_id),
            _ => CoreError::Database(e),
        })?;

        tracing::info!(dispute_id = %dispute.id, %order_id, "dispute filed");

        if let Some(designer) = &respondent {
            self.notify(
                Notification::new(
                    designer.user_id,
                    NotificationKind::DisputeOpened,
                    format!("A dispute was opened on \"{}\"", order.title),
                )
                .with_email(serde_json::json!({
                    "template": "dispute_opened",
                    "dispute_id": dispute.id,
                    "order_id": order_id,
                    "category": dispute.category,
                })),
            )
            .await;
        }
        self.audit(
            customer_id,
            "dispute.filed",
            format!("category {}", dispute.category),
            Some(dispute.id),
        )
        .await;

        Ok(dispute)
    }

    /// The designer answers an open dispute.
    pub async fn respond_to_dispute(
        &self,
        dispute_id: Uuid,
        user_id: Uuid,
        input: RespondToDispute,
    ) -> Result<disputes::Model, CoreError> {
        for _ in 0..MAX_CAS_ATTEMPTS {
            let dispute = self.load_dispute(dispute_id).await?;
            if dispute.respondent_id != Some(user_id) {
                return Err(CoreError::Forbidden(
                    "only the assigned designer can respond to this dispute".to_string(),
                ));
            }
            if dispute.status != DisputeStatus::Open {
                return Err(CoreError::InvalidState(format!(
                    "dispute {dispute_id} is {:?} and no longer awaits a response",
                    dispute.status
                )));
            }

            let changes = disputes::ActiveModel {
                status: Set(DisputeStatus::ResponseRequired),
                designer_response: Set(Some(input.response)),
                response_message: Set(input.message.clone()),
                ..Default::default()
            };
            if !dispute_db::update_if_version(&self.db, &dispute, changes, self.now()).await? {
                continue;
            }

            tracing::info!(%dispute_id, response = ?input.response, "dispute response recorded");
            self.notify(Notification::new(
                dispute.created_by,
                NotificationKind::DisputeResponse,
                format!("The designer responded to your dispute: {:?}", input.response),
            ))
            .await;

            return self.load_dispute(dispute_id).await;
        }

        Err(CoreError::WriteConflict)
    }

    /// Attach evidence. Only the two parties may, and only while the dispute is live.
    pub async fn add_evidence(
        &self,
        dispute_id: Uuid,
        user_id: Uuid,
        input: SubmitEvidence,
    ) -> Result<dispute_evidence::Model, CoreError> {
        if input.file_reference.trim().is_empty() {
            return Err(CoreError::Validation(
                "evidence needs a file reference".to_string(),
            ));
        }

        let dispute = self.load_dispute(dispute_id).await?;
        if !dispute.is_party(user_id) {
            return Err(CoreError::Forbidden(
                "only the parties to a dispute can submit evidence".to_string(),
            ));
        }
        if dispute.status.is_terminal() {
            return Err(CoreError::InvalidState(format!(
                "dispute {dispute_id} is {:?}",
                dispute.status
            )));
        }

        let evidence =
            evidence_db::insert_evidence(&self.db, dispute_id, user_id, input, self.now()).await?;
        tracing::info!(%dispute_id, evidence_id = %evidence.id, "evidence added");
        Ok(evidence)
    }

    pub async fn append_admin_note(
        &self,
        dispute_id: Uuid,
        admin_id: Uuid,
        note: &str,
    ) -> Result<disputes::Model, CoreError> {
        if note.trim().is_empty() {
            return Err(CoreError::Validation("note must not be empty".to_string()));
        }

        for _ in 0..MAX_CAS_ATTEMPTS {
            let dispute = self.load_dispute(dispute_id).await?;
            let now = self.now();

            let changes = disputes::ActiveModel {
                admin_notes: Set(format!(
                    "{}{}",
                    dispute.admin_notes,
                    note_line(now, admin_id, note)
                )),
                ..Default::default()
            };
            if dispute_db::update_if_version(&self.db, &dispute, changes, now).await? {
                return self.load_dispute(dispute_id).await;
            }
        }

        Err(CoreError::WriteConflict)
    }

    /// Close out a dispute, optionally moving the disputed order's status.
    ///
    /// Moving the order to `delivered` or `cancelled` releases the designer's
    /// capacity through the same path as a normal status change. A delivered
    /// order may be cancelled here as a refund.
    pub async fn resolve_dispute(
        &self,
        dispute_id: Uuid,
        admin_id: Uuid,
        input: ResolveDispute,
    ) -> Result<disputes::Model, CoreError> {
        if input.resolution.trim().is_empty() {
            return Err(CoreError::Validation("a resolution is required".to_string()));
        }
        let status = DisputeStatus::from(input.outcome);

        for _ in 0..MAX_CAS_ATTEMPTS {
            let txn = self.db.begin().await?;
            let now = self.now();

            let dispute = dispute_db::get_dispute_by_id(&txn, dispute_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Dispute", dispute_id))?;
            if dispute.status.is_terminal() {
                return Err(CoreError::InvalidState(format!(
                    "dispute {dispute_id} is already {:?}",
                    dispute.status
                )));
            }

            if let Some(order_status) = input.order_status {
                let order = order_db::get_order_by_id(&txn, dispute.order_id)
                    .await?
                    .ok_or_else(|| CoreError::not_found("Order", dispute.order_id))?;
                if order.status != order_status
                    && !apply_status_change(
                        &txn,
                        &order,
                        order_status,
                        StatusAuthority::DisputeResolution,
                        now,
                    )
                    .await?
                {
                    txn.rollback().await?;
                    continue;
                }
            }

            let mut notes = dispute.admin_notes.clone();
            if let Some(note) = input.note.as_deref().filter(|n| !n.trim().is_empty()) {
                notes.push_str(&note_line(now, admin_id, note));
            }
            let changes = disputes::ActiveModel {
                status: Set(status),
                resolution: Set(Some(input.resolution.clone())),
                admin_notes: Set(notes),
                resolved_by: Set(Some(admin_id)),
                resolved_at: Set(Some(now)),
                ..Default::default()
            };
            if !dispute_db::update_if_version(&txn, &dispute, changes, now).await? {
                txn.rollback().await?;
                continue;
            }
            txn.commit().await?;

            tracing::info!(
                %dispute_id,
                order_id = %dispute.order_id,
                ?status,
                order_status = ?input.order_status,
                "dispute resolved"
            );

            let message = format!("Your dispute was {:?}: {}", status, input.resolution);
            let parties = std::iter::once(dispute.created_by).chain(dispute.respondent_id);
            for recipient in parties {
                self.notify(Notification::new(
                    recipient,
                    NotificationKind::DisputeResolved,
                    message.clone(),
                ))
                .await;
            }
            self.audit(
                admin_id,
                "dispute.resolved",
                format!("{:?}: {}", status, input.resolution),
                Some(dispute_id),
            )
            .await;

            return self.load_dispute(dispute_id).await;
        }

        Err(CoreError::WriteConflict)
    }

    pub async fn get_dispute(&self, dispute_id: Uuid) -> Result<DisputeDetail, CoreError> {
        let dispute = self.load_dispute(dispute_id).await?;
        let evidence = evidence_db::get_evidence_by_dispute(&self.db, dispute_id).await?;
        Ok(DisputeDetail { dispute, evidence })
    }
}
