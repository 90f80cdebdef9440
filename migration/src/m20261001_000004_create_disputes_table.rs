use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `disputes` table and its columns.
#[derive(DeriveIden)]
enum Disputes {
    Table,
    Id,
    OrderId,
    CreatedBy,
    RespondentId,
    Category,
    Description,
    Status,
    DesignerResponse,
    ResponseMessage,
    Resolution,
    AdminNotes,
    ResolvedBy,
    Version,
    CreatedAt,
    UpdatedAt,
    ResolvedAt,
}

/// Identifiers for the `dispute_evidence` table and its columns.
#[derive(DeriveIden)]
enum DisputeEvidence {
    Table,
    Id,
    DisputeId,
    SubmittedBy,
    FileReference,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Disputes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Disputes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Disputes::OrderId).uuid().not_null())
                    .col(ColumnDef::new(Disputes::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(Disputes::RespondentId).uuid())
                    .col(ColumnDef::new(Disputes::Category).string().not_null())
                    .col(ColumnDef::new(Disputes::Description).text().not_null())
                    .col(
                        ColumnDef::new(Disputes::Status)
                            .string()
                            .not_null()
                            .default("open"),
                    )
                    .col(ColumnDef::new(Disputes::DesignerResponse).string())
                    .col(ColumnDef::new(Disputes::ResponseMessage).text())
                    .col(ColumnDef::new(Disputes::Resolution).text())
                    .col(
                        ColumnDef::new(Disputes::AdminNotes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Disputes::ResolvedBy).uuid())
                    .col(
                        ColumnDef::new(Disputes::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Disputes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Disputes::UpdatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Disputes::ResolvedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_disputes_order_id")
                            .from(Disputes::Table, Disputes::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One dispute per order, whatever its status.
        manager
            .create_index(
                Index::create()
                    .name("idx_disputes_order_unique")
                    .table(Disputes::Table)
                    .col(Disputes::OrderId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DisputeEvidence::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DisputeEvidence::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DisputeEvidence::DisputeId).uuid().not_null())
                    .col(ColumnDef::new(DisputeEvidence::SubmittedBy).uuid().not_null())
                    .col(ColumnDef::new(DisputeEvidence::FileReference).string().not_null())
                    .col(ColumnDef::new(DisputeEvidence::Description).text())
                    .col(
                        ColumnDef::new(DisputeEvidence::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dispute_evidence_dispute_id")
                            .from(DisputeEvidence::Table, DisputeEvidence::DisputeId)
                            .to(Disputes::Table, Disputes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DisputeEvidence::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Disputes::Table).to_owned())
            .await
    }
}
