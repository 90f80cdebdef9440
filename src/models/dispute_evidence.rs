use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `dispute_evidence` table. Rows are immutable once inserted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dispute_evidence")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dispute_id: Uuid,
    pub submitted_by: Uuid,
    pub file_reference: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::disputes::Entity",
        from = "Column::DisputeId",
        to = "super::disputes::Column::Id"
    )]
    Dispute,
}

impl Related<super::disputes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dispute.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitEvidence {
    pub file_reference: String,
    pub description: Option<String>,
}
