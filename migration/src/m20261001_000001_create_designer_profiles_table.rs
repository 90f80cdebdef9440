use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `designer_profiles` table and its columns.
#[derive(DeriveIden)]
enum DesignerProfiles {
    Table,
    Id,
    UserId,
    DisplayName,
    Specialties,
    SkillLevel,
    MaxCapacity,
    CurrentLoad,
    Status,
    Rating,
    ReviewCount,
    BankName,
    AccountNumber,
    AccountName,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DesignerProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DesignerProfiles::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DesignerProfiles::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(DesignerProfiles::DisplayName).string().not_null())
                    .col(ColumnDef::new(DesignerProfiles::Specialties).json().not_null())
                    .col(ColumnDef::new(DesignerProfiles::SkillLevel).string().not_null())
                    .col(
                        ColumnDef::new(DesignerProfiles::MaxCapacity)
                            .integer()
                            .not_null()
                            .default(5),
                    )
                    .col(
                        ColumnDef::new(DesignerProfiles::CurrentLoad)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DesignerProfiles::Status)
                            .string()
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        ColumnDef::new(DesignerProfiles::Rating)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(DesignerProfiles::ReviewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(DesignerProfiles::BankName).string())
                    .col(ColumnDef::new(DesignerProfiles::AccountNumber).string())
                    .col(ColumnDef::new(DesignerProfiles::AccountName).string())
                    .col(
                        ColumnDef::new(DesignerProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DesignerProfiles::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DesignerProfiles::Table).to_owned())
            .await
    }
}
