use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db::audit_logs as audit_db;
use crate::error::SinkError;

#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub actor_id: Uuid,
    pub action: String,
    pub details: String,
    pub resource_id: Option<Uuid>,
}

/// Append-only audit trail. Advisory: a failed write never fails the caller.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn log_audit(&self, entry: AuditEntry) -> Result<(), SinkError>;
}

#[derive(Clone)]
pub struct DbAuditLog {
    db: DatabaseConnection,
}

impl DbAuditLog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditLog for DbAuditLog {
    async fn log_audit(&self, entry: AuditEntry) -> Result<(), SinkError> {
        audit_db::insert_audit_log(&self.db, entry).await?;
        Ok(())
    }
}
