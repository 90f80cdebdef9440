use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ordinal skill tier. Declaration order is the ranking order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    #[sea_orm(string_value = "beginner")]
    Beginner,
    #[sea_orm(string_value = "intermediate")]
    Intermediate,
    #[sea_orm(string_value = "advanced")]
    Advanced,
    #[sea_orm(string_value = "expert")]
    Expert,
}

/// Live availability of a designer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum DesignerStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "busy")]
    Busy,
    #[sea_orm(string_value = "offline")]
    Offline,
}

/// SeaORM entity for the `designer_profiles` table.
///
/// `0 <= current_load <= max_capacity` holds after every committed write;
/// only the assignment code moves `current_load`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "designer_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub display_name: String,
    pub specialties: Json,
    pub skill_level: SkillLevel,
    pub max_capacity: i32,
    pub current_load: i32,
    pub status: DesignerStatus,
    #[sea_orm(column_type = "Double")]
    pub rating: f64,
    pub review_count: i32,
    #[serde(skip_serializing)]
    pub bank_name: Option<String>,
    #[serde(skip_serializing)]
    pub account_number: Option<String>,
    #[serde(skip_serializing)]
    pub account_name: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl Model {
    /// Specialty tags as stored. A malformed column reads as no specialties.
    pub fn specialty_tags(&self) -> Vec<String> {
        serde_json::from_value(self.specialties.clone()).unwrap_or_default()
    }

    pub fn has_capacity(&self) -> bool {
        self.current_load < self.max_capacity
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
    #[sea_orm(has_many = "super::commission_payments::Entity")]
    CommissionPayments,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::commission_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CommissionPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterDesigner {
    pub user_id: Uuid,
    pub display_name: String,
    pub specialties: Vec<String>,
    pub skill_level: SkillLevel,
    pub max_capacity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDesignerStatus {
    pub status: DesignerStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDesignerCapacity {
    pub max_capacity: i32,
}

/// Public view used by the recommendation endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DesignerSummary {
    pub id: Uuid,
    pub display_name: String,
    pub specialties: Vec<String>,
    pub skill_level: SkillLevel,
    pub rating: f64,
    pub review_count: i32,
    pub current_load: i32,
    pub max_capacity: i32,
}

impl From<Model> for DesignerSummary {
    fn from(m: Model) -> Self {
        Self {
            specialties: m.specialty_tags(),
            id: m.id,
            display_name: m.display_name,
            skill_level: m.skill_level,
            rating: m.rating,
            review_count: m.review_count,
            current_load: m.current_load,
            max_capacity: m.max_capacity,
        }
    }
}
