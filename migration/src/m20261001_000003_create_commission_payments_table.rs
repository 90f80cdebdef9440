use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum CommissionPayments {
    Table,
    Id,
    DesignerId,
    Amount,
    Status,
    ProofReference,
    ReviewedBy,
    CreatedAt,
    ReviewedAt,
}

#[derive(DeriveIden)]
enum DesignerProfiles {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CommissionPayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CommissionPayments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CommissionPayments::DesignerId).uuid().not_null())
                    .col(
                        ColumnDef::new(CommissionPayments::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CommissionPayments::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(CommissionPayments::ProofReference).string())
                    .col(ColumnDef::new(CommissionPayments::ReviewedBy).uuid())
                    .col(
                        ColumnDef::new(CommissionPayments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CommissionPayments::ReviewedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_commission_payments_designer_id")
                            .from(CommissionPayments::Table, CommissionPayments::DesignerId)
                            .to(DesignerProfiles::Table, DesignerProfiles::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CommissionPayments::Table).to_owned())
            .await
    }
}
