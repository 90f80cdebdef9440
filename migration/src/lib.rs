pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_designer_profiles_table;
mod m20261001_000002_create_orders_table;
mod m20261001_000003_create_commission_payments_table;
mod m20261001_000004_create_disputes_table;
mod m20261001_000005_create_notifications_table;
mod m20261001_000006_create_audit_logs_table;
mod m20261002_000001_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_designer_profiles_table::Migration),
            Box::new(m20261001_000002_create_orders_table::Migration),
            Box::new(m20261001_000003_create_commission_payments_table::Migration),
            Box::new(m20261001_000004_create_disputes_table::Migration),
            Box::new(m20261001_000005_create_notifications_table::Migration),
            Box::new(m20261001_000006_create_audit_logs_table::Migration),
            Box::new(m20261002_000001_add_indexes::Migration),
        ]
    }
}
