use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Orders {
    Table,
    CustomerId,
    AssignedDesignerId,
    AssignmentStatus,
}

#[derive(DeriveIden)]
enum CommissionPayments {
    Table,
    DesignerId,
}

#[derive(DeriveIden)]
enum DisputeEvidence {
    Table,
    DisputeId,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    RecipientId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Commission ledger reads every order of a designer
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_assigned_designer_id")
                    .table(Orders::Table)
                    .col(Orders::AssignedDesignerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_customer_id")
                    .table(Orders::Table)
                    .col(Orders::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_assignment_status")
                    .table(Orders::Table)
                    .col(Orders::AssignmentStatus)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_commission_payments_designer_id")
                    .table(CommissionPayments::Table)
                    .col(CommissionPayments::DesignerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dispute_evidence_dispute_id")
                    .table(DisputeEvidence::Table)
                    .col(DisputeEvidence::DisputeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_recipient_id")
                    .table(Notifications::Table)
                    .col(Notifications::RecipientId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_orders_assigned_designer_id")
                    .table(Orders::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_orders_customer_id")
                    .table(Orders::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_orders_assignment_status")
                    .table(Orders::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_commission_payments_designer_id")
                    .table(CommissionPayments::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_dispute_evidence_dispute_id")
                    .table(DisputeEvidence::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_notifications_recipient_id")
                    .table(Notifications::Table)
                    .to_owned(),
            )
            .await
    }
}
