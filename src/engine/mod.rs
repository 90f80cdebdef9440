//! Order assignment and commission engine.
//!
//! `Engine` is the single writer of order assignment fields and designer
//! load. Its operations are spread over the submodules by concern:
//! shortlisting, assignment, the designer registry, the commission ledger
//! and the dispute workflow. Every state transition is a conditional update
//! on the fields it depends on, so concurrent callers race safely without
//! long-held locks.

pub mod assignment;
pub mod commission;
pub mod disputes;
pub mod eligibility;
pub mod registry;
pub mod shortlist;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::audit::{AuditEntry, AuditLog, DbAuditLog};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineSettings;
use crate::db::designers as designer_db;
use crate::db::orders::{self as order_db, AssignmentChange};
use crate::error::CoreError;
use crate::models::{designers, orders};
use crate::notify::{Notification, NotificationSink, OutboxNotifier};

pub struct Engine {
    db: DatabaseConnection,
    settings: EngineSettings,
    notifier: Arc<dyn NotificationSink>,
    audit: Arc<dyn AuditLog>,
    clock: Arc<dyn Clock>,
}

impl Engine {
    /// Engine backed by the outbox notifier, the database audit log and the system clock.
    pub fn new(db: DatabaseConnection, settings: EngineSettings) -> Self {
        Self {
            notifier: Arc::new(OutboxNotifier::new(db.clone())),
            audit: Arc::new(DbAuditLog::new(db.clone())),
            clock: Arc::new(SystemClock),
            db,
            settings,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_audit_log(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Hand a notification to the sink. Failures are logged, never returned.
    async fn notify(&self, notification: Notification) {
        let recipient_id = notification.recipient_id;
        let kind = notification.kind;
        if let Err(e) = self.notifier.notify(notification).await {
            tracing::warn!(%recipient_id, ?kind, error = %e, "notification dropped");
        }
    }

    async fn audit(
        &self,
        actor_id: Uuid,
        action: &str,
        details: String,
        resource_id: Option<Uuid>,
    ) {
        let entry = AuditEntry {
            actor_id,
            action: action.to_string(),
            details,
            resource_id,
        };
        if let Err(e) = self.audit.log_audit(entry).await {
            tracing::warn!(%actor_id, action, error = %e, "audit entry dropped");
        }
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<orders::Model, CoreError> {
        order_db::get_order_by_id(&self.db, order_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Order", order_id))
    }

    pub async fn get_designer(&self, designer_id: Uuid) -> Result<designers::Model, CoreError> {
        designer_db::get_designer_by_id(&self.db, designer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Designer", designer_id))
    }

    /// Read an order, first reverting it to `open` if its offer window has passed.
    async fn load_order_reclaiming(&self, order_id: Uuid) -> Result<orders::Model, CoreError> {
        let order = self.get_order(order_id).await?;
        let now = self.now();
        if !order.is_offer_expired(now) {
            return Ok(order);
        }

        if order_db::transition_assignment(&self.db, &order, AssignmentChange::open(), now).await? {
            tracing::info!(
                order_id = %order.id,
                expired_at = ?order.assignment_expires_at,
                "reclaimed expired shortlist"
            );
        }

        // Reverted by us or moved on by another writer; either way re-read.
        self.get_order(order_id).await
    }
}
