use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::authorization::{require_role, verify_designer_self};
use crate::auth::middleware::{AuthenticatedCaller, Role};
use crate::engine::Engine;
use crate::error::CoreError;
use crate::models::designers::{
    DesignerSummary, RegisterDesigner, SkillLevel, UpdateDesignerCapacity, UpdateDesignerStatus,
};

#[derive(Debug, Deserialize)]
pub struct RegisterDesignerRequest {
    pub display_name: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub skill_level: SkillLevel,
    pub max_capacity: i32,
}

/// POST /api/designers — the caller creates their own designer profile.
pub async fn register(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    body: web::Json<RegisterDesignerRequest>,
) -> Result<HttpResponse, CoreError> {
    require_role(&caller, Role::Designer)?;
    let body = body.into_inner();
    let designer = engine
        .register_designer(RegisterDesigner {
            user_id: caller.user_id,
            display_name: body.display_name,
            specialties: body.specialties,
            skill_level: body.skill_level,
            max_capacity: body.max_capacity,
        })
        .await?;

    Ok(HttpResponse::Created().json(designer))
}

/// GET /api/designers/{id}
pub async fn get_designer(
    _caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let designer = engine.get_designer(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(DesignerSummary::from(designer)))
}

/// PUT /api/designers/{id}/status
pub async fn update_status(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateDesignerStatus>,
) -> Result<HttpResponse, CoreError> {
    let designer = verify_designer_self(&engine, path.into_inner(), &caller).await?;
    let designer = engine.set_designer_status(designer.id, body.status).await?;
    Ok(HttpResponse::Ok().json(designer))
}

/// PUT /api/designers/{id}/capacity
pub async fn update_capacity(
    caller: AuthenticatedCaller,
    engine: web::Data<Engine>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateDesignerCapacity>,
) -> Result<HttpResponse, CoreError> {
    let designer = verify_designer_self(&engine, path.into_inner(), &caller).await?;
    let designer = engine
        .set_designer_capacity(designer.id, body.max_capacity)
        .await?;
    Ok(HttpResponse::Ok().json(designer))
}
