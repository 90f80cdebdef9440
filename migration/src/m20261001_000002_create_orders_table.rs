use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `orders` table and its columns.
#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    CustomerId,
    Title,
    Category,
    Style,
    Status,
    AssignmentStatus,
    ShortlistedDesignerIds,
    AssignmentExpiresAt,
    AssignedDesignerId,
    Price,
    DeliveryFee,
    TemplateId,
    CustomerRating,
    LoadReleased,
    Version,
    CreatedAt,
    UpdatedAt,
}

/// Re-declare parent table identifiers for foreign-key references.
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
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Orders::Title).string().not_null())
                    .col(ColumnDef::new(Orders::Category).string())
                    .col(ColumnDef::new(Orders::Style).string())
                    .col(
                        ColumnDef::new(Orders::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Orders::AssignmentStatus)
                            .string()
                            .not_null()
                            .default("open"),
                    )
                    .col(ColumnDef::new(Orders::ShortlistedDesignerIds).json().not_null())
                    .col(ColumnDef::new(Orders::AssignmentExpiresAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Orders::AssignedDesignerId).uuid())
                    .col(ColumnDef::new(Orders::Price).big_integer())
                    .col(ColumnDef::new(Orders::DeliveryFee).big_integer())
                    .col(ColumnDef::new(Orders::TemplateId).uuid())
                    .col(ColumnDef::new(Orders::CustomerRating).small_integer())
                    .col(
                        ColumnDef::new(Orders::LoadReleased)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Orders::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_assigned_designer_id")
                            .from(Orders::Table, Orders::AssignedDesignerId)
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
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}
