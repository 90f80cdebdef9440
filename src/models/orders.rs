use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Production lifecycle of an order, stored as a lowercase string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "reviewing")]
    Reviewing,
    #[sea_orm(string_value = "changes_requested")]
    ChangesRequested,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "sewing")]
    Sewing,
    #[sea_orm(string_value = "finishing")]
    Finishing,
    #[sea_orm(string_value = "ready_for_delivery")]
    ReadyForDelivery,
    #[sea_orm(string_value = "shipping")]
    Shipping,
    #[sea_orm(string_value = "in_transit")]
    InTransit,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// Statuses whose commission counts toward a designer's accrued total.
    pub fn is_billable(self) -> bool {
        matches!(
            self,
            Self::Confirmed
                | Self::Sewing
                | Self::Finishing
                | Self::ReadyForDelivery
                | Self::InTransit
                | Self::Delivered
        )
    }

    /// Once an order is delivered or cancelled its designer slot is returned.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Disputes can only be filed once the garment is on its way or has arrived.
    pub fn is_disputable(self) -> bool {
        matches!(self, Self::Shipping | Self::InTransit | Self::Delivered)
    }

    /// Position on the production line. `cancelled` is not on it.
    pub fn production_stage(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Reviewing | Self::ChangesRequested => Some(1),
            Self::Confirmed => Some(2),
            Self::Sewing => Some(3),
            Self::Finishing => Some(4),
            Self::ReadyForDelivery => Some(5),
            Self::Shipping => Some(6),
            Self::InTransit => Some(7),
            Self::Delivered => Some(8),
            Self::Cancelled => None,
        }
    }
}

/// Who (if anyone) is working the order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "shortlisted")]
    Shortlisted,
    #[sea_orm(string_value = "assigned")]
    Assigned,
}

/// SeaORM entity for the `orders` table.
///
/// `assigned_designer_id` is set iff `assignment_status` is `Assigned`, and
/// `shortlisted_designer_ids` is a non-empty JSON array iff it is `Shortlisted`.
/// Every engine write bumps `version`, which is what conditional updates compare on.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub title: String,
    pub category: Option<String>,
    pub style: Option<String>,
    pub status: OrderStatus,
    pub assignment_status: AssignmentStatus,
    pub shortlisted_designer_ids: Json,
    pub assignment_expires_at: Option<DateTimeUtc>,
    pub assigned_designer_id: Option<Uuid>,
    pub price: Option<i64>,
    pub delivery_fee: Option<i64>,
    pub template_id: Option<Uuid>,
    pub customer_rating: Option<i16>,
    pub load_released: bool,
    pub version: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl Model {
    /// Candidate designers in offer order. A malformed column reads as empty.
    pub fn shortlist(&self) -> Vec<Uuid> {
        serde_json::from_value(self.shortlisted_designer_ids.clone()).unwrap_or_default()
    }

    pub fn is_shortlisted(&self, designer_id: Uuid) -> bool {
        self.shortlist().contains(&designer_id)
    }

    /// A shortlist past its window is treated as open by every writer.
    pub fn is_offer_expired(&self, now: DateTimeUtc) -> bool {
        self.assignment_status == AssignmentStatus::Shortlisted
            && self.assignment_expires_at.is_some_and(|expires| now > expires)
    }

    /// Whether the assigned designer still carries this order in their load.
    pub fn holds_designer_load(&self) -> bool {
        self.assignment_status == AssignmentStatus::Assigned
            && self.assigned_designer_id.is_some()
            && !self.load_released
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::designers::Entity",
        from = "Column::AssignedDesignerId",
        to = "super::designers::Column::Id"
    )]
    AssignedDesigner,
    #[sea_orm(has_many = "super::disputes::Entity")]
    Disputes,
}

impl Related<super::designers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignedDesigner.def()
    }
}

impl Related<super::disputes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Disputes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Order as handed over by the ordering flow. New orders start `pending` / `open`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub customer_id: Uuid,
    pub title: String,
    pub category: Option<String>,
    pub style: Option<String>,
    pub price: Option<i64>,
    pub delivery_fee: Option<i64>,
    pub template_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfferToDesigner {
    pub designer_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminAssign {
    pub designer_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateOrder {
    pub rating: i16,
}
