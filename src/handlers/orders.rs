use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::authorization::{designer_for_caller, require_admin, verify_order_owner};
use crate::auth::middleware::{AuthenticatedCaller, Role};
use crate::engine::Engine;
use crate::error::CoreError;
use crate::models::orders::{AdminAssign, CreateOrder, OfferToDesigner, RateOrder, UpdateOrderStatus};

/// Body for order intake. The customer is always the caller.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub title: String,
    pub category: Option<String>,
    pub style: Option<String>,
    pub price: Option<i64>,
    pub delivery_fee: Option<i64>,
    pub template_id: Option<Uuid>,
}

/// POST /api/orders
pub async fn create_order(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, CoreError> {
    let body = body.into_inner();
    let order = engine
        .create_order(CreateOrder {
            customer_id: caller.user_id,
            title: body.title,
            category: body.category,
            style: body.style,
            price: body.price,
            delivery_fee: body.delivery_fee,
            template_id: body.template_id,
        })
        .await?;

    Ok(HttpResponse::Created().json(order))
}

/// GET /api/orders/{id}
///
/// Visible to the customer, the assigned or shortlisted designer, and admins.
pub async fn get_order(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let order = engine.get_order(path.into_inner()).await?;
    if caller.is_admin() || order.customer_id == caller.user_id {
        return Ok(HttpResponse::Ok().json(order));
    }

    let designer = designer_for_caller(&engine, &caller).await?;
    if order.assigned_designer_id == Some(designer.id) || order.is_shortlisted(designer.id) {
        Ok(HttpResponse::Ok().json(order))
    } else {
        Err(CoreError::Forbidden("You are not involved in this order".to_string()))
    }
}

/// POST /api/orders/{id}/shortlist
pub async fn shortlist(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let order = verify_order_owner(&engine, path.into_inner(), &caller).await?;
    let order = engine.shortlist(order.id).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// POST /api/orders/{id}/offer — the customer picks a designer directly.
pub async fn offer(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
    body: web::Json<OfferToDesigner>,
) -> Result<HttpResponse, CoreError> {
    let order = verify_order_owner(&engine, path.into_inner(), &caller).await?;
    let order = engine.offer_to_designer(order.id, body.designer_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// POST /api/orders/{id}/accept
pub async fn accept(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let designer = designer_for_caller(&engine, &caller).await?;
    let order = engine.accept_offer(path.into_inner(), designer.id).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// POST /api/orders/{id}/decline
pub async fn decline(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let designer = designer_for_caller(&engine, &caller).await?;
    let order = engine.decline(path.into_inner(), designer.id).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// POST /api/orders/{id}/assign — admin override.
pub async fn admin_assign(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
    body: web::Json<AdminAssign>,
) -> Result<HttpResponse, CoreError> {
    require_admin(&caller)?;
    let order = engine
        .admin_assign(path.into_inner(), body.designer_id, caller.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

/// PUT /api/orders/{id}/status
///
/// The assigned designer reports production progress and may not move it
/// backwards or cancel; admins may set any status.
pub async fn update_status(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderStatus>,
) -> Result<HttpResponse, CoreError> {
    let order_id = path.into_inner();
    if !caller.is_admin() {
        let designer = designer_for_caller(&engine, &caller).await?;
        let order = engine.get_order(order_id).await?;
        if order.assigned_designer_id != Some(designer.id) {
            return Err(CoreError::Forbidden(
                "Only the assigned designer can update this order".to_string(),
            ));
        }

        let Some(target) = body.status.production_stage() else {
            return Err(CoreError::Forbidden(
                "Only an admin can cancel an order".to_string(),
            ));
        };
        if order
            .status
            .production_stage()
            .is_some_and(|current| target < current)
        {
            return Err(CoreError::InvalidState(format!(
                "order {} cannot move back from {:?} to {:?}",
                order_id, order.status, body.status
            )));
        }
    }

    let order = engine
        .advance_order_status(order_id, body.status, caller.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

/// POST /api/orders/{id}/rating
pub async fn rate(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
    body: web::Json<RateOrder>,
) -> Result<HttpResponse, CoreError> {
    if caller.role != Role::Customer {
        return Err(CoreError::Forbidden("Only customers rate orders".to_string()));
    }
    let order = engine
        .rate_order(path.into_inner(), caller.user_id, body.rating)
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

/// GET /api/orders/{id}/recommended-designers
pub async fn recommended_designers(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let order = verify_order_owner(&engine, path.into_inner(), &caller).await?;
    let designers = engine.recommended_designers(order.id).await?;
    Ok(HttpResponse::Ok().json(designers))
}
