mod common;

use chrono::Duration;
use uuid::Uuid;

use common::{assert_load_conserved, harness, seed_assigned_order, seed_designer};
use couture_backend::error::CoreError;
use couture_backend::models::designers::SkillLevel;
use couture_backend::models::dispute_evidence::SubmitEvidence;
use couture_backend::models::disputes::{
    DesignerResponse, DisputeOutcome, DisputeStatus, FileDispute, ResolveDispute,
    RespondToDispute,
};
use couture_backend::models::notifications::NotificationKind;
use couture_backend::models::orders::OrderStatus;

fn complaint(order_id: Uuid) -> FileDispute {
    FileDispute {
        order_id,
        category: "quality".to_string(),
        description: "Seams came apart on first wear".to_string(),
    }
}

fn evidence(reference: &str) -> SubmitEvidence {
    SubmitEvidence {
        file_reference: reference.to_string(),
        description: None,
    }
}

#[tokio::test]
async fn full_dispute_lifecycle() {
    let h = harness().await;
    let d = seed_designer(&h.engine, "D", &["bridal"], SkillLevel::Expert, 2).await;
    let order = seed_assigned_order(&h.engine, &d).await;
    let admin = Uuid::new_v4();
    h.engine
        .advance_order_status(order.id, OrderStatus::Shipping, admin)
        .await
        .unwrap();

    let dispute = h
        .engine
        .file_dispute(order.customer_id, complaint(order.id))
        .await
        .unwrap();
    assert_eq!(dispute.status, DisputeStatus::Open);
    assert_eq!(dispute.respondent_id, Some(d.user_id));
    assert_eq!(
        h.notifier.sent_to(d.user_id).last().unwrap().kind,
        NotificationKind::DisputeOpened
    );

    h.engine
        .add_evidence(dispute.id, order.customer_id, evidence("uploads/seam.jpg"))
        .await
        .unwrap();
    h.engine
        .add_evidence(dispute.id, d.user_id, evidence("uploads/fitting.jpg"))
        .await
        .unwrap();

    let responded = h
        .engine
        .respond_to_dispute(
            dispute.id,
            d.user_id,
            RespondToDispute {
                response: DesignerResponse::Counter,
                message: Some("Happy to repair it".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(responded.status, DisputeStatus::ResponseRequired);
    assert_eq!(responded.designer_response, Some(DesignerResponse::Counter));

    let resolved = h
        .engine
        .resolve_dispute(
            dispute.id,
            admin,
            ResolveDispute {
                outcome: DisputeOutcome::Resolved,
                resolution: "Refund issued".to_string(),
                note: Some("Customer accepted refund".to_string()),
                order_status: Some(OrderStatus::Cancelled),
            },
        )
        .await
        .unwrap();
    assert_eq!(resolved.status, DisputeStatus::Resolved);
    assert_eq!(resolved.resolved_by, Some(admin));
    assert!(resolved.resolved_at.is_some());
    assert!(resolved.admin_notes.contains("Customer accepted refund"));

    // Cancelling through the dispute released the designer's slot.
    let order = h.engine.get_order(order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert!(order.load_released);
    assert_eq!(h.engine.get_designer(d.id).await.unwrap().current_load, 0);
    assert_load_conserved(&h.engine).await;

    assert_eq!(h.notifier.count_of(NotificationKind::DisputeResolved), 2);

    let detail = h.engine.get_dispute(dispute.id).await.unwrap();
    assert_eq!(detail.evidence.len(), 2);

    // Nothing more can be attached to a closed-out dispute.
    let err = h
        .engine
        .add_evidence(dispute.id, order.customer_id, evidence("uploads/late.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
    let err = h
        .engine
        .resolve_dispute(
            dispute.id,
            admin,
            ResolveDispute {
                outcome: DisputeOutcome::Closed,
                resolution: "again".to_string(),
                note: None,
                order_status: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
}

#[tokio::test]
async fn resolution_can_refund_a_delivered_order() {
    let h = harness().await;
    let d = seed_designer(&h.engine, "D", &["bridal"], SkillLevel::Expert, 2).await;
    let order = seed_assigned_order(&h.engine, &d).await;
    let admin = Uuid::new_v4();
    h.engine
        .advance_order_status(order.id, OrderStatus::Delivered, admin)
        .await
        .unwrap();
    assert_eq!(h.engine.get_designer(d.id).await.unwrap().current_load, 0);

    let dispute = h
        .engine
        .file_dispute(order.customer_id, complaint(order.id))
        .await
        .unwrap();

    // Delivered orders only leave `delivered` for a refund.
    let err = h
        .engine
        .resolve_dispute(
            dispute.id,
            admin,
            ResolveDispute {
                outcome: DisputeOutcome::Resolved,
                resolution: "Send back for repair".to_string(),
                note: None,
                order_status: Some(OrderStatus::Sewing),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));

    let resolved = h
        .engine
        .resolve_dispute(
            dispute.id,
            admin,
            ResolveDispute {
                outcome: DisputeOutcome::Resolved,
                resolution: "Refund issued".to_string(),
                note: None,
                order_status: Some(OrderStatus::Cancelled),
            },
        )
        .await
        .unwrap();
    assert_eq!(resolved.status, DisputeStatus::Resolved);

    let order = h.engine.get_order(order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert!(order.load_released);
    // The slot came back at delivery; the refund must not hand it back twice.
    assert_eq!(h.engine.get_designer(d.id).await.unwrap().current_load, 0);
    assert_load_conserved(&h.engine).await;

    // The production path still cannot leave a finished order.
    let err = h
        .engine
        .advance_order_status(order.id, OrderStatus::Delivered, admin)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
}

#[tokio::test]
async fn filing_requires_shipped_order_and_only_once() {
    let h = harness().await;
    let d = seed_designer(&h.engine, "D", &["bridal"], SkillLevel::Expert, 2).await;
    let order = seed_assigned_order(&h.engine, &d).await;

    let err = h
        .engine
        .file_dispute(order.customer_id, complaint(order.id))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));

    h.engine
        .advance_order_status(order.id, OrderStatus::Delivered, d.user_id)
        .await
        .unwrap();

    let err = h
        .engine
        .file_dispute(Uuid::new_v4(), complaint(order.id))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));

    let dispute = h
        .engine
        .file_dispute(order.customer_id, complaint(order.id))
        .await
        .unwrap();

    // Still a duplicate after the first dispute is closed.
    h.engine
        .resolve_dispute(
            dispute.id,
            Uuid::new_v4(),
            ResolveDispute {
                outcome: DisputeOutcome::Closed,
                resolution: "No fault found".to_string(),
                note: None,
                order_status: None,
            },
        )
        .await
        .unwrap();
    let err = h
        .engine
        .file_dispute(order.customer_id, complaint(order.id))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::DuplicateDispute(id) if id == order.id));
}

#[tokio::test]
async fn only_parties_act_on_a_dispute() {
    let h = harness().await;
    let d = seed_designer(&h.engine, "D", &["bridal"], SkillLevel::Expert, 2).await;
    let order = seed_assigned_order(&h.engine, &d).await;
    h.engine
        .advance_order_status(order.id, OrderStatus::InTransit, d.user_id)
        .await
        .unwrap();
    let dispute = h
        .engine
        .file_dispute(order.customer_id, complaint(order.id))
        .await
        .unwrap();
    let stranger = Uuid::new_v4();

    let err = h
        .engine
        .add_evidence(dispute.id, stranger, evidence("x.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));

    let err = h
        .engine
        .add_evidence(dispute.id, order.customer_id, evidence("  "))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    // The customer cannot answer on the designer's behalf.
    let err = h
        .engine
        .respond_to_dispute(
            dispute.id,
            order.customer_id,
            RespondToDispute {
                response: DesignerResponse::Accept,
                message: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));

    let respond = RespondToDispute {
        response: DesignerResponse::Reject,
        message: None,
    };
    h.engine
        .respond_to_dispute(dispute.id, d.user_id, respond.clone())
        .await
        .unwrap();
    let err = h
        .engine
        .respond_to_dispute(dispute.id, d.user_id, respond)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
}

#[tokio::test]
async fn admin_notes_accumulate_with_timestamps() {
    let h = harness().await;
    let d = seed_designer(&h.engine, "D", &["bridal"], SkillLevel::Expert, 2).await;
    let order = seed_assigned_order(&h.engine, &d).await;
    h.engine
        .advance_order_status(order.id, OrderStatus::Shipping, d.user_id)
        .await
        .unwrap();
    let dispute = h
        .engine
        .file_dispute(order.customer_id, complaint(order.id))
        .await
        .unwrap();
    let admin = Uuid::new_v4();

    h.engine
        .append_admin_note(dispute.id, admin, "Called the customer")
        .await
        .unwrap();
    h.clock.advance(Duration::minutes(30));
    let noted = h
        .engine
        .append_admin_note(dispute.id, admin, "Waiting on photos")
        .await
        .unwrap();

    let lines: Vec<&str> = noted.admin_notes.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        format!("[2026-03-02T09:00:00Z] {admin}: Called the customer")
    );
    assert_eq!(
        lines[1],
        format!("[2026-03-02T09:30:00Z] {admin}: Waiting on photos")
    );
    assert_eq!(noted.version, dispute.version + 2);

    let err = h
        .engine
        .append_admin_note(dispute.id, admin, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}
