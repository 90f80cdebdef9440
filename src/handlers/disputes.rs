use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::auth::authorization::require_admin;
use crate::auth::middleware::{AuthenticatedCaller, Role};
use crate::engine::Engine;
use crate::error::CoreError;
use crate::models::dispute_evidence::SubmitEvidence;
use crate::models::disputes::{AddAdminNote, FileDispute, ResolveDispute, RespondToDispute};

/// POST /api/disputes
pub async fn file(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    body: web::Json<FileDispute>,
) -> Result<HttpResponse, CoreError> {
    if caller.role != Role::Customer {
        return Err(CoreError::Forbidden("Only customers file disputes".to_string()));
    }
    let dispute = engine.file_dispute(caller.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(dispute))
}

/// GET /api/disputes/{id} — parties and admins only.
pub async fn get_dispute(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let detail = engine.get_dispute(path.into_inner()).await?;
    if !caller.is_admin() && !detail.dispute.is_party(caller.user_id) {
        return Err(CoreError::Forbidden(
            "You are not a party to this dispute".to_string(),
        ));
    }
    Ok(HttpResponse::Ok().json(detail))
}

/// POST /api/disputes/{id}/response
pub async fn respond(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
    body: web::Json<RespondToDispute>,
) -> Result<HttpResponse, CoreError> {
    let dispute = engine
        .respond_to_dispute(path.into_inner(), caller.user_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(dispute))
}

/// POST /api/disputes/{id}/evidence
pub async fn add_evidence(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
    body: web::Json<SubmitEvidence>,
) -> Result<HttpResponse, CoreError> {
    let evidence = engine
        .add_evidence(path.into_inner(), caller.user_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(evidence))
}

/// POST /api/disputes/{id}/notes
pub async fn add_note(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
    body: web::Json<AddAdminNote>,
) -> Result<HttpResponse, CoreError> {
    require_admin(&caller)?;
    let dispute = engine
        .append_admin_note(path.into_inner(), caller.user_id, &body.note)
        .await?;
    Ok(HttpResponse::Ok().json(dispute))
}

/// POST /api/disputes/{id}/resolve
pub async fn resolve(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
    body: web::Json<ResolveDispute>,
) -> Result<HttpResponse, CoreError> {
    require_admin(&caller)?;
    let dispute = engine
        .resolve_dispute(path.into_inner(), caller.user_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(dispute))
}
