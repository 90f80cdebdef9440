mod common;

use std::sync::Arc;

use common::{
    FailingNotifier, assert_load_conserved, harness, seed_assigned_order, seed_designer,
    seed_order, start_time, test_db,
};
use couture_backend::clock::ManualClock;
use couture_backend::config::EngineSettings;
use couture_backend::db::orders::{self as order_db, AssignmentChange};
use couture_backend::engine::Engine;
use couture_backend::engine::assignment::try_assign;
use couture_backend::error::CoreError;
use couture_backend::models::designers::{DesignerStatus, SkillLevel};
use couture_backend::models::notifications::NotificationKind;
use couture_backend::models::orders::{AssignmentStatus, OrderStatus};
use sea_orm::TransactionTrait;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accepts_have_exactly_one_winner() {
    let h = harness().await;
    let mut designers = Vec::new();
    for name in ["A", "B", "C"] {
        designers.push(seed_designer(&h.engine, name, &["bridal"], SkillLevel::Expert, 3).await);
    }
    let order = seed_order(&h.engine, "Gown", Some("bridal")).await;
    h.engine.shortlist(order.id).await.unwrap();

    let handles: Vec<_> = designers
        .iter()
        .map(|d| {
            let engine = Arc::clone(&h.engine);
            let (order_id, designer_id) = (order.id, d.id);
            tokio::spawn(async move { engine.accept_offer(order_id, designer_id).await })
        })
        .collect();

    let mut winners = 0;
    let mut losers = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(CoreError::AlreadyAssigned(id)) => {
                assert_eq!(id, order.id);
                losers += 1;
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(losers, 2);

    let assigned = h.engine.get_order(order.id).await.unwrap();
    assert_eq!(assigned.assignment_status, AssignmentStatus::Assigned);
    assert!(assigned.shortlist().is_empty());
    assert!(assigned.assignment_expires_at.is_none());

    let mut total_load = 0;
    for d in &designers {
        total_load += h.engine.get_designer(d.id).await.unwrap().current_load;
    }
    assert_eq!(total_load, 1);
    assert_load_conserved(&h.engine).await;
}

#[tokio::test]
async fn assignment_on_a_stale_order_is_rolled_back() {
    let h = harness().await;
    let d = seed_designer(&h.engine, "D", &["bridal"], SkillLevel::Expert, 2).await;
    let order = seed_order(&h.engine, "Gown", Some("bridal")).await;
    h.engine.shortlist(order.id).await.unwrap();

    // Another writer touches the order after our read.
    let stale = h.engine.get_order(order.id).await.unwrap();
    let expires = stale.assignment_expires_at.unwrap();
    assert!(
        order_db::transition_assignment(
            h.engine.db(),
            &stale,
            AssignmentChange::shortlisted(stale.shortlist(), expires),
            start_time(),
        )
        .await
        .unwrap()
    );

    let txn = h.engine.db().begin().await.unwrap();
    let assigned = try_assign(&txn, &stale, d.id, start_time()).await.unwrap();
    assert!(assigned.is_none());
    txn.rollback().await.unwrap();

    assert_eq!(h.engine.get_designer(d.id).await.unwrap().current_load, 0);
    let current = h.engine.get_order(order.id).await.unwrap();
    assert_eq!(current.assignment_status, AssignmentStatus::Shortlisted);
    assert_eq!(current.version, stale.version + 1);

    // The public path re-reads and goes through.
    let accepted = h.engine.accept_offer(order.id, d.id).await.unwrap();
    assert_eq!(accepted.assigned_designer_id, Some(d.id));
    assert_eq!(h.engine.get_designer(d.id).await.unwrap().current_load, 1);
    assert_load_conserved(&h.engine).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn crossing_admin_reassignments_both_complete() {
    let h = harness().await;
    let a = seed_designer(&h.engine, "A", &["bridal"], SkillLevel::Expert, 2).await;
    let b = seed_designer(&h.engine, "B", &["bridal"], SkillLevel::Expert, 2).await;
    let first = seed_assigned_order(&h.engine, &a).await;
    let second = seed_assigned_order(&h.engine, &b).await;
    let admin = uuid::Uuid::new_v4();

    let handles: Vec<_> = [(first.id, b.id), (second.id, a.id)]
        .into_iter()
        .map(|(order_id, designer_id)| {
            let engine = Arc::clone(&h.engine);
            tokio::spawn(async move { engine.admin_assign(order_id, designer_id, admin).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let first = h.engine.get_order(first.id).await.unwrap();
    let second = h.engine.get_order(second.id).await.unwrap();
    assert_eq!(first.assigned_designer_id, Some(b.id));
    assert_eq!(second.assigned_designer_id, Some(a.id));
    assert_eq!(h.engine.get_designer(a.id).await.unwrap().current_load, 1);
    assert_eq!(h.engine.get_designer(b.id).await.unwrap().current_load, 1);
    assert_load_conserved(&h.engine).await;
}

#[tokio::test]
async fn accept_notifies_customer_and_takes_capacity() {
    let h = harness().await;
    let d = seed_designer(&h.engine, "A", &["bridal"], SkillLevel::Expert, 2).await;
    let order = seed_order(&h.engine, "Gown", Some("bridal")).await;
    h.engine.shortlist(order.id).await.unwrap();

    let accepted = h.engine.accept_offer(order.id, d.id).await.unwrap();
    assert_eq!(accepted.assigned_designer_id, Some(d.id));
    assert!(!accepted.load_released);
    assert_eq!(h.engine.get_designer(d.id).await.unwrap().current_load, 1);

    let to_customer = h.notifier.sent_to(order.customer_id);
    assert_eq!(to_customer.len(), 1);
    assert_eq!(to_customer[0].kind, NotificationKind::DesignerAssigned);

    // A second accept of the same order reports the assignment.
    let err = h.engine.accept_offer(order.id, d.id).await.unwrap_err();
    assert!(matches!(err, CoreError::AlreadyAssigned(_)));
}

#[tokio::test]
async fn accept_requires_being_offered() {
    let h = harness().await;
    let a = seed_designer(&h.engine, "A", &["bridal"], SkillLevel::Expert, 2).await;
    let outsider = seed_designer(&h.engine, "Z", &["denim"], SkillLevel::Expert, 2).await;
    let order = seed_order(&h.engine, "Gown", Some("bridal")).await;

    let err = h.engine.accept_offer(order.id, a.id).await.unwrap_err();
    assert!(matches!(err, CoreError::NotOffered { .. }));

    h.engine.shortlist(order.id).await.unwrap();
    let err = h.engine.accept_offer(order.id, outsider.id).await.unwrap_err();
    assert!(matches!(err, CoreError::NotOffered { .. }));
}

#[tokio::test]
async fn capacity_is_rechecked_at_accept_time() {
    let h = harness().await;
    let d = seed_designer(&h.engine, "Solo", &["bridal"], SkillLevel::Expert, 1).await;
    let first = seed_order(&h.engine, "Gown one", Some("bridal")).await;
    let second = seed_order(&h.engine, "Gown two", Some("bridal")).await;

    // Shortlisting reserves nothing, so the designer sits on both lists.
    h.engine.shortlist(first.id).await.unwrap();
    h.engine.shortlist(second.id).await.unwrap();

    h.engine.accept_offer(first.id, d.id).await.unwrap();
    let err = h.engine.accept_offer(second.id, d.id).await.unwrap_err();
    assert!(matches!(err, CoreError::CapacityExceeded(id) if id == d.id));

    let second = h.engine.get_order(second.id).await.unwrap();
    assert_eq!(second.assignment_status, AssignmentStatus::Shortlisted);
    assert_eq!(h.engine.get_designer(d.id).await.unwrap().current_load, 1);
    assert_load_conserved(&h.engine).await;
}

#[tokio::test]
async fn manual_offer_checks_designer() {
    let h = harness().await;
    let full = seed_designer(&h.engine, "Full", &["bridal"], SkillLevel::Expert, 0).await;
    let offline = seed_designer(&h.engine, "Off", &["bridal"], SkillLevel::Expert, 2).await;
    h.engine
        .set_designer_status(offline.id, DesignerStatus::Offline)
        .await
        .unwrap();
    let picked = seed_designer(&h.engine, "Pick", &[], SkillLevel::Beginner, 1).await;
    let order = seed_order(&h.engine, "Gown", Some("bridal")).await;

    let err = h.engine.offer_to_designer(order.id, full.id).await.unwrap_err();
    assert!(matches!(err, CoreError::CapacityExceeded(_)));
    let err = h.engine.offer_to_designer(order.id, offline.id).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));

    // A manual pick skips specialty matching.
    let offered = h.engine.offer_to_designer(order.id, picked.id).await.unwrap();
    assert_eq!(offered.assignment_status, AssignmentStatus::Shortlisted);
    assert_eq!(offered.shortlist(), vec![picked.id]);
    assert_eq!(
        h.notifier.sent_to(picked.user_id)[0].kind,
        NotificationKind::AssignmentRequest
    );

    let err = h.engine.offer_to_designer(order.id, picked.id).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));

    h.engine.decline(order.id, picked.id).await.unwrap();
    let reopened = h.engine.get_order(order.id).await.unwrap();
    assert_eq!(reopened.assignment_status, AssignmentStatus::Open);
}

#[tokio::test]
async fn admin_reassignment_moves_exactly_one_unit() {
    let h = harness().await;
    let old = seed_designer(&h.engine, "Old", &["bridal"], SkillLevel::Expert, 2).await;
    let new = seed_designer(&h.engine, "New", &["bridal"], SkillLevel::Expert, 2).await;
    let order = seed_assigned_order(&h.engine, &old).await;
    let admin = uuid::Uuid::new_v4();

    let reassigned = h.engine.admin_assign(order.id, new.id, admin).await.unwrap();
    assert_eq!(reassigned.assigned_designer_id, Some(new.id));
    assert_eq!(h.engine.get_designer(old.id).await.unwrap().current_load, 0);
    assert_eq!(h.engine.get_designer(new.id).await.unwrap().current_load, 1);

    assert_eq!(
        h.notifier.sent_to(new.user_id).last().unwrap().kind,
        NotificationKind::AssignedByAdmin
    );
    assert_eq!(
        h.notifier.sent_to(old.user_id).last().unwrap().kind,
        NotificationKind::AssignmentRevoked
    );
    assert_eq!(
        h.notifier.sent_to(order.customer_id).last().unwrap().kind,
        NotificationKind::DesignerAssigned
    );
    assert_load_conserved(&h.engine).await;
}

#[tokio::test]
async fn admin_assign_clears_a_live_shortlist() {
    let h = harness().await;
    let a = seed_designer(&h.engine, "A", &["bridal"], SkillLevel::Expert, 2).await;
    let b = seed_designer(&h.engine, "B", &["denim"], SkillLevel::Expert, 2).await;
    let order = seed_order(&h.engine, "Gown", Some("bridal")).await;
    h.engine.shortlist(order.id).await.unwrap();

    let assigned = h
        .engine
        .admin_assign(order.id, b.id, uuid::Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(assigned.assignment_status, AssignmentStatus::Assigned);
    assert!(assigned.shortlist().is_empty());
    assert!(assigned.assignment_expires_at.is_none());

    let err = h.engine.accept_offer(order.id, a.id).await.unwrap_err();
    assert!(matches!(err, CoreError::AlreadyAssigned(_)));
    assert_load_conserved(&h.engine).await;
}

#[tokio::test]
async fn failed_admin_assign_rolls_back_both_designers() {
    let h = harness().await;
    let old = seed_designer(&h.engine, "Old", &["bridal"], SkillLevel::Expert, 2).await;
    let full = seed_designer(&h.engine, "Full", &["bridal"], SkillLevel::Expert, 0).await;
    let order = seed_assigned_order(&h.engine, &old).await;

    let err = h
        .engine
        .admin_assign(order.id, full.id, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::CapacityExceeded(_)));

    let unchanged = h.engine.get_order(order.id).await.unwrap();
    assert_eq!(unchanged.assigned_designer_id, Some(old.id));
    assert_eq!(h.engine.get_designer(old.id).await.unwrap().current_load, 1);
    assert_load_conserved(&h.engine).await;
}

#[tokio::test]
async fn admin_assign_rejects_noop_and_finished_orders() {
    let h = harness().await;
    let d = seed_designer(&h.engine, "D", &["bridal"], SkillLevel::Expert, 2).await;
    let other = seed_designer(&h.engine, "O", &["bridal"], SkillLevel::Expert, 2).await;
    let admin = uuid::Uuid::new_v4();
    let order = seed_assigned_order(&h.engine, &d).await;

    let err = h.engine.admin_assign(order.id, d.id, admin).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));

    h.engine
        .advance_order_status(order.id, OrderStatus::Cancelled, admin)
        .await
        .unwrap();
    let err = h.engine.admin_assign(order.id, other.id, admin).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
}

#[tokio::test]
async fn terminal_status_releases_load_once() {
    let h = harness().await;
    let d = seed_designer(&h.engine, "D", &["bridal"], SkillLevel::Expert, 2).await;
    let order = seed_assigned_order(&h.engine, &d).await;
    let actor = d.user_id;

    for status in [OrderStatus::Confirmed, OrderStatus::Sewing, OrderStatus::Shipping] {
        h.engine
            .advance_order_status(order.id, status, actor)
            .await
            .unwrap();
    }
    assert_eq!(h.engine.get_designer(d.id).await.unwrap().current_load, 1);

    let delivered = h
        .engine
        .advance_order_status(order.id, OrderStatus::Delivered, actor)
        .await
        .unwrap();
    assert!(delivered.load_released);
    assert_eq!(h.engine.get_designer(d.id).await.unwrap().current_load, 0);

    // Re-sending the same status is a no-op; leaving a terminal status is not allowed.
    h.engine
        .advance_order_status(order.id, OrderStatus::Delivered, actor)
        .await
        .unwrap();
    let err = h
        .engine
        .advance_order_status(order.id, OrderStatus::Cancelled, actor)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));

    assert_eq!(h.engine.get_designer(d.id).await.unwrap().current_load, 0);
    assert_load_conserved(&h.engine).await;
}

#[tokio::test]
async fn notification_failures_never_fail_operations() {
    let db = test_db().await;
    let engine = Engine::new(db, EngineSettings::default())
        .with_notifier(Arc::new(FailingNotifier))
        .with_clock(Arc::new(ManualClock::new(start_time())));

    let d = seed_designer(&engine, "D", &["bridal"], SkillLevel::Expert, 2).await;
    let order = seed_order(&engine, "Gown", Some("bridal")).await;

    engine.shortlist(order.id).await.unwrap();
    let accepted = engine.accept_offer(order.id, d.id).await.unwrap();
    assert_eq!(accepted.assigned_designer_id, Some(d.id));
}
