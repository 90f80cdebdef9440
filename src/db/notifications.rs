use sea_orm::*;
use uuid::Uuid;

use crate::models::notifications;
use crate::notify::Notification;

/// Append a notification to the outbox.
pub async fn insert_notification<C: ConnectionTrait>(
    db: &C,
    notification: Notification,
) -> Result<notifications::Model, DbErr> {
    let row = notifications::ActiveModel {
        id: Set(Uuid::new_v4()),
        recipient_id: Set(notification.recipient_id),
        kind: Set(notification.kind),
        message: Set(notification.message),
        email_payload: Set(notification.email_payload),
        created_at: Set(chrono::Utc::now()),
    };

    row.insert(db).await
}

/// Fetch the outbox rows addressed to a recipient, oldest first.
pub async fn get_notifications_by_recipient<C: ConnectionTrait>(
    db: &C,
    recipient_id: Uuid,
) -> Result<Vec<notifications::Model>, DbErr> {
    notifications::Entity::find()
        .filter(notifications::Column::RecipientId.eq(recipient_id))
        .order_by_asc(notifications::Column::CreatedAt)
        .all(db)
        .await
}
