mod common;

use std::sync::Arc;

use common::{seed_designer, seed_order, start_time, test_db};
use couture_backend::clock::ManualClock;
use couture_backend::config::EngineSettings;
use couture_backend::db::{audit_logs as audit_db, notifications as notification_db};
use couture_backend::engine::Engine;
use couture_backend::models::designers::SkillLevel;
use couture_backend::models::notifications::NotificationKind;

#[tokio::test]
async fn default_engine_writes_outbox_and_audit_rows() {
    let db = test_db().await;
    let engine = Engine::new(db, EngineSettings::default())
        .with_clock(Arc::new(ManualClock::new(start_time())));

    let d = seed_designer(&engine, "D", &["bridal"], SkillLevel::Expert, 2).await;
    let order = seed_order(&engine, "Gown", Some("bridal")).await;
    engine.shortlist(order.id).await.unwrap();

    let inbox = notification_db::get_notifications_by_recipient(engine.db(), d.user_id)
        .await
        .unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::AssignmentRequest);
    let payload = inbox[0].email_payload.as_ref().unwrap();
    assert_eq!(payload["template"], "assignment_request");
    assert_eq!(payload["order_id"], order.id.to_string());

    engine.accept_offer(order.id, d.id).await.unwrap();

    let customer_inbox =
        notification_db::get_notifications_by_recipient(engine.db(), order.customer_id)
            .await
            .unwrap();
    assert_eq!(customer_inbox[0].kind, NotificationKind::DesignerAssigned);

    let trail = audit_db::get_audit_logs_by_resource(engine.db(), order.id)
        .await
        .unwrap();
    let actions: Vec<_> = trail.iter().map(|e| e.action.as_str()).collect();
    assert!(actions.contains(&"order.shortlisted"));
    assert!(actions.contains(&"order.accepted"));
}
