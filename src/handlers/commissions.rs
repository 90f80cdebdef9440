use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::auth::authorization::{require_admin, verify_designer_self};
use crate::auth::middleware::AuthenticatedCaller;
use crate::engine::Engine;
use crate::error::CoreError;
use crate::models::commission_payments::{ReviewCommissionPayment, SubmitCommissionPayment};

/// GET /api/designers/{id}/commission
pub async fn summary(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let designer = verify_designer_self(&engine, path.into_inner(), &caller).await?;
    let summary = engine.commission_summary(designer.id).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// POST /api/designers/{id}/commission-payments
pub async fn submit_payment(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
    body: web::Json<SubmitCommissionPayment>,
) -> Result<HttpResponse, CoreError> {
    let designer = verify_designer_self(&engine, path.into_inner(), &caller).await?;
    let payment = engine
        .submit_commission_payment(designer.id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(payment))
}

/// PUT /api/commission-payments/{id}/review
pub async fn review_payment(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
    body: web::Json<ReviewCommissionPayment>,
) -> Result<HttpResponse, CoreError> {
    require_admin(&caller)?;
    let payment = engine
        .review_commission_payment(path.into_inner(), caller.user_id, body.approve)
        .await?;
    Ok(HttpResponse::Ok().json(payment))
}
