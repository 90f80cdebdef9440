use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[sea_orm(string_value = "assignment_request")]
    AssignmentRequest,
    #[sea_orm(string_value = "designer_assigned")]
    DesignerAssigned,
    #[sea_orm(string_value = "assigned_by_admin")]
    AssignedByAdmin,
    #[sea_orm(string_value = "shortlist_exhausted")]
    ShortlistExhausted,
    #[sea_orm(string_value = "assignment_revoked")]
    AssignmentRevoked,
    #[sea_orm(string_value = "dispute_opened")]
    DisputeOpened,
    #[sea_orm(string_value = "dispute_response")]
    DisputeResponse,
    #[sea_orm(string_value = "dispute_resolved")]
    DisputeResolved,
    #[sea_orm(string_value = "commission_payment_reviewed")]
    CommissionPaymentReviewed,
}

/// Outbox row; an external worker drains it into email and in-app delivery.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub email_payload: Option<Json>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
