mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};
use uuid::Uuid;

use common::{harness, seed_assigned_order, seed_designer};
use couture_backend::handlers;
use couture_backend::models::designers::SkillLevel;

macro_rules! app {
    ($engine:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::from($engine.clone()))
                .service(web::scope("/api").configure(handlers::init_routes)),
        )
        .await
    };
}

fn as_user(req: test::TestRequest, user_id: Uuid, role: &str) -> test::TestRequest {
    req.insert_header(("X-User-Id", user_id.to_string()))
        .insert_header(("X-User-Role", role))
}

#[actix_web::test]
async fn requests_without_identity_are_rejected() {
    let h = harness().await;
    let app = app!(h.engine);

    let req = test::TestRequest::get()
        .uri(&format!("/api/orders/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri(&format!("/api/orders/{}", Uuid::new_v4()))
        .insert_header(("X-User-Id", Uuid::new_v4().to_string()))
        .insert_header(("X-User-Role", "superuser"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn shortlist_and_accept_over_http() {
    let h = harness().await;
    let app = app!(h.engine);
    let designer = seed_designer(&h.engine, "Ada", &["bridal"], SkillLevel::Expert, 2).await;
    let rival = seed_designer(&h.engine, "Bo", &["bridal"], SkillLevel::Advanced, 2).await;
    let customer = Uuid::new_v4();

    let req = as_user(test::TestRequest::post().uri("/api/orders"), customer, "customer")
        .set_json(json!({ "title": "Wedding gown", "category": "bridal", "price": 100000 }))
        .to_request();
    let order: Value = test::call_and_read_body_json(&app, req).await;
    let order_id = order["id"].as_str().unwrap().to_string();
    assert_eq!(order["assignment_status"], "open");

    // Someone else's order cannot be shortlisted.
    let req = as_user(
        test::TestRequest::post().uri(&format!("/api/orders/{order_id}/shortlist")),
        Uuid::new_v4(),
        "customer",
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = as_user(
        test::TestRequest::post().uri(&format!("/api/orders/{order_id}/shortlist")),
        customer,
        "customer",
    )
    .to_request();
    let shortlisted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(shortlisted["assignment_status"], "shortlisted");

    let req = as_user(
        test::TestRequest::post().uri(&format!("/api/orders/{order_id}/accept")),
        designer.user_id,
        "designer",
    )
    .to_request();
    let accepted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(accepted["assigned_designer_id"], designer.id.to_string());

    let req = as_user(
        test::TestRequest::post().uri(&format!("/api/orders/{order_id}/accept")),
        rival.user_id,
        "designer",
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "already_assigned");
}

#[actix_web::test]
async fn admin_only_routes_and_error_mapping() {
    let h = harness().await;
    let app = app!(h.engine);
    let designer = seed_designer(&h.engine, "Ada", &["bridal"], SkillLevel::Expert, 0).await;
    let customer = Uuid::new_v4();

    let req = as_user(test::TestRequest::post().uri("/api/orders"), customer, "customer")
        .set_json(json!({ "title": "Gown" }))
        .to_request();
    let order: Value = test::call_and_read_body_json(&app, req).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let assign = json!({ "designer_id": designer.id });
    let req = as_user(
        test::TestRequest::post().uri(&format!("/api/orders/{order_id}/assign")),
        customer,
        "customer",
    )
    .set_json(&assign)
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = as_user(
        test::TestRequest::post().uri(&format!("/api/orders/{order_id}/assign")),
        Uuid::new_v4(),
        "admin",
    )
    .set_json(&assign)
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "capacity_exceeded");

    let req = as_user(
        test::TestRequest::get().uri(&format!("/api/orders/{}", Uuid::new_v4())),
        Uuid::new_v4(),
        "admin",
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn designers_see_their_own_commission() {
    let h = harness().await;
    let app = app!(h.engine);
    let designer = seed_designer(&h.engine, "Ada", &["bridal"], SkillLevel::Expert, 2).await;

    let req = as_user(
        test::TestRequest::get().uri(&format!("/api/designers/{}/commission", designer.id)),
        designer.user_id,
        "designer",
    )
    .to_request();
    let summary: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(summary["designer_id"], designer.id.to_string());
    assert_eq!(summary["lines"].as_array().unwrap().len(), 0);

    let req = as_user(
        test::TestRequest::get().uri(&format!("/api/designers/{}/commission", designer.id)),
        Uuid::new_v4(),
        "designer",
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn designers_only_move_production_forward() {
    let h = harness().await;
    let app = app!(h.engine);
    let designer = seed_designer(&h.engine, "Ada", &["bridal"], SkillLevel::Expert, 2).await;
    let order = seed_assigned_order(&h.engine, &designer).await;
    let uri = format!("/api/orders/{}/status", order.id);

    let req = as_user(test::TestRequest::put().uri(&uri), designer.user_id, "designer")
        .set_json(json!({ "status": "sewing" }))
        .to_request();
    let sewing: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(sewing["status"], "sewing");

    let req = as_user(test::TestRequest::put().uri(&uri), designer.user_id, "designer")
        .set_json(json!({ "status": "cancelled" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = as_user(test::TestRequest::put().uri(&uri), designer.user_id, "designer")
        .set_json(json!({ "status": "confirmed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // The slot is still held; only an admin may cancel.
    assert_eq!(h.engine.get_designer(designer.id).await.unwrap().current_load, 1);
    let req = as_user(test::TestRequest::put().uri(&uri), Uuid::new_v4(), "admin")
        .set_json(json!({ "status": "cancelled" }))
        .to_request();
    let cancelled: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(h.engine.get_designer(designer.id).await.unwrap().current_load, 0);
}
