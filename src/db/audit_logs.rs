use sea_orm::*;
use uuid::Uuid;

use crate::audit::AuditEntry;
use crate::models::audit_logs;

/// Append an audit entry.
pub async fn insert_audit_log<C: ConnectionTrait>(
    db: &C,
    entry: AuditEntry,
) -> Result<audit_logs::Model, DbErr> {
    let row = audit_logs::ActiveModel {
        id: Set(Uuid::new_v4()),
        actor_id: Set(entry.actor_id),
        action: Set(entry.action),
        details: Set(entry.details),
        resource_id: Set(entry.resource_id),
        created_at: Set(chrono::Utc::now()),
    };

    row.insert(db).await
}

/// Fetch the audit trail for a resource, oldest first.
pub async fn get_audit_logs_by_resource<C: ConnectionTrait>(
    db: &C,
    resource_id: Uuid,
) -> Result<Vec<audit_logs::Model>, DbErr> {
    audit_logs::Entity::find()
        .filter(audit_logs::Column::ResourceId.eq(resource_id))
        .order_by_asc(audit_logs::Column::CreatedAt)
        .all(db)
        .await
}
