pub mod audit_logs;
pub mod commission_payments;
pub mod designers;
pub mod dispute_evidence;
pub mod disputes;
pub mod notifications;
pub mod orders;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

/// Create a SeaORM connection pool for `database_url`.
pub async fn create_pool(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(20)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Database::connect(options).await
}

/// Bounded attempts for compare-and-set loops before reporting a write conflict.
pub const MAX_CAS_ATTEMPTS: usize = 5;
