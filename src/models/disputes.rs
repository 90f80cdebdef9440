use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::orders::OrderStatus;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "response_required")]
    ResponseRequired,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl DisputeStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

/// The designer's answer to a filed dispute.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DesignerResponse {
    #[sea_orm(string_value = "accept")]
    Accept,
    #[sea_orm(string_value = "reject")]
    Reject,
    #[sea_orm(string_value = "counter")]
    Counter,
}

/// SeaORM entity for the `disputes` table. At most one row per order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "disputes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_id: Uuid,
    pub created_by: Uuid,
    pub respondent_id: Option<Uuid>,
    pub category: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: DisputeStatus,
    pub designer_response: Option<DesignerResponse>,
    #[sea_orm(column_type = "Text", nullable)]
    pub response_message: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub resolution: Option<String>,
    /// Timestamped admin entries, only ever appended to.
    #[sea_orm(column_type = "Text")]
    pub admin_notes: String,
    pub resolved_by: Option<Uuid>,
    pub version: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub resolved_at: Option<DateTimeUtc>,
}

impl Model {
    /// Creator and respondent are the only parties allowed to attach evidence.
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.created_by == user_id || self.respondent_id == Some(user_id)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Order,
    #[sea_orm(has_many = "super::dispute_evidence::Entity")]
    Evidence,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::dispute_evidence::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evidence.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct FileDispute {
    pub order_id: Uuid,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RespondToDispute {
    pub response: DesignerResponse,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddAdminNote {
    pub note: String,
}

/// Terminal state chosen by the admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeOutcome {
    Resolved,
    Closed,
}

impl From<DisputeOutcome> for DisputeStatus {
    fn from(outcome: DisputeOutcome) -> Self {
        match outcome {
            DisputeOutcome::Resolved => DisputeStatus::Resolved,
            DisputeOutcome::Closed => DisputeStatus::Closed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveDispute {
    pub outcome: DisputeOutcome,
    pub resolution: String,
    pub note: Option<String>,
    /// Optional out-of-band change to the disputed order, at the admin's discretion.
    pub order_status: Option<OrderStatus>,
}

/// A dispute together with its evidence trail.
#[derive(Debug, Clone, Serialize)]
pub struct DisputeDetail {
    pub dispute: Model,
    pub evidence: Vec<super::dispute_evidence::Model>,
}
