use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db::notifications as notification_db;
use crate::error::SinkError;
use crate::models::notifications::NotificationKind;

/// A message the engine is obliged to send. Transport is someone else's job.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub email_payload: Option<serde_json::Value>,
}

impl Notification {
    pub fn new(recipient_id: Uuid, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            recipient_id,
            kind,
            message: message.into(),
            email_payload: None,
        }
    }

    pub fn with_email(mut self, payload: serde_json::Value) -> Self {
        self.email_payload = Some(payload);
        self
    }
}

/// Fire-and-forget notification seam.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), SinkError>;
}

/// Writes notifications to the `notifications` outbox table.
#[derive(Clone)]
pub struct OutboxNotifier {
    db: DatabaseConnection,
}

impl OutboxNotifier {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationSink for OutboxNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), SinkError> {
        notification_db::insert_notification(&self.db, notification).await?;
        Ok(())
    }
}
