#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use couture_backend::clock::ManualClock;
use couture_backend::config::EngineSettings;
use couture_backend::engine::Engine;
use couture_backend::error::SinkError;
use couture_backend::models::designers::{self, RegisterDesigner, SkillLevel};
use couture_backend::models::notifications::NotificationKind;
use couture_backend::models::orders::{self, CreateOrder};
use couture_backend::notify::{Notification, NotificationSink};
use migration::{Migrator, MigratorTrait};

/// Records every notification instead of writing the outbox.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, recipient_id: Uuid) -> Vec<Notification> {
        self.sent()
            .into_iter()
            .filter(|n| n.recipient_id == recipient_id)
            .collect()
    }

    pub fn count_of(&self, kind: NotificationKind) -> usize {
        self.sent().iter().filter(|n| n.kind == kind).count()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), SinkError> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

/// A sink that always fails, to check failures never leak into operations.
pub struct FailingNotifier;

#[async_trait]
impl NotificationSink for FailingNotifier {
    async fn notify(&self, _notification: Notification) -> Result<(), SinkError> {
        Err(SinkError::Rejected("mail relay down".to_string()))
    }
}

pub struct Harness {
    pub engine: Arc<Engine>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

/// Fresh in-memory database with the schema applied.
pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn harness() -> Harness {
    harness_with(EngineSettings::default()).await
}

pub async fn harness_with(settings: EngineSettings) -> Harness {
    let db = test_db().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let clock = Arc::new(ManualClock::new(start_time()));
    let engine = Engine::new(db, settings)
        .with_notifier(notifier.clone())
        .with_clock(clock.clone());

    Harness {
        engine: Arc::new(engine),
        notifier,
        clock,
    }
}

pub async fn seed_designer(
    engine: &Engine,
    name: &str,
    specialties: &[&str],
    skill_level: SkillLevel,
    max_capacity: i32,
) -> designers::Model {
    engine
        .register_designer(RegisterDesigner {
            user_id: Uuid::new_v4(),
            display_name: name.to_string(),
            specialties: specialties.iter().map(|s| s.to_string()).collect(),
            skill_level,
            max_capacity,
        })
        .await
        .expect("Failed to register designer")
}

pub async fn seed_order(engine: &Engine, title: &str, category: Option<&str>) -> orders::Model {
    engine
        .create_order(CreateOrder {
            customer_id: Uuid::new_v4(),
            title: title.to_string(),
            category: category.map(str::to_string),
            style: None,
            price: Some(100_000),
            delivery_fee: None,
            template_id: None,
        })
        .await
        .expect("Failed to create order")
}

/// Order already assigned to `designer` through the normal offer/accept path.
pub async fn seed_assigned_order(engine: &Engine, designer: &designers::Model) -> orders::Model {
    let order = seed_order(engine, "Wedding gown", Some("bridal")).await;
    engine
        .offer_to_designer(order.id, designer.id)
        .await
        .expect("Failed to offer order");
    engine
        .accept_offer(order.id, designer.id)
        .await
        .expect("Failed to accept order")
}

/// Σ current_load must equal the number of assigned orders still holding load.
pub async fn assert_load_conserved(engine: &Engine) {
    use couture_backend::db::{designers as designer_db, orders as order_db};

    let designers = designer_db::get_all_designers(engine.db()).await.unwrap();
    let orders = order_db::get_all_orders(engine.db()).await.unwrap();

    let total_load: i32 = designers.iter().map(|d| d.current_load).sum();
    let holding = orders.iter().filter(|o| o.holds_designer_load()).count() as i32;
    assert_eq!(total_load, holding, "designer load drifted from assigned orders");

    for d in &designers {
        assert!(d.current_load >= 0 && d.current_load <= d.max_capacity);
    }
}
