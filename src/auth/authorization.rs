use uuid::Uuid;

use crate::auth::middleware::{AuthenticatedCaller, Role};
use crate::db::designers as designer_db;
use crate::engine::Engine;
use crate::error::CoreError;
use crate::models::{designers, orders};

pub fn require_admin(caller: &AuthenticatedCaller) -> Result<(), CoreError> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(CoreError::Forbidden("Admin role required".to_string()))
    }
}

pub fn require_role(caller: &AuthenticatedCaller, role: Role) -> Result<(), CoreError> {
    if caller.role == role {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!("{role:?} role required")))
    }
}

/// The order, if the caller placed it (or is an admin).
pub async fn verify_order_owner(
    engine: &Engine,
    order_id: Uuid,
    caller: &AuthenticatedCaller,
) -> Result<orders::Model, CoreError> {
    let order = engine.get_order(order_id).await?;
    if caller.is_admin() || order.customer_id == caller.user_id {
        Ok(order)
    } else {
        Err(CoreError::Forbidden("You did not place this order".to_string()))
    }
}

/// The designer profile that belongs to the calling user.
pub async fn designer_for_caller(
    engine: &Engine,
    caller: &AuthenticatedCaller,
) -> Result<designers::Model, CoreError> {
    require_role(caller, Role::Designer)?;
    designer_db::get_designer_by_user_id(engine.db(), caller.user_id)
        .await?
        .ok_or_else(|| CoreError::Forbidden("No designer profile for this user".to_string()))
}

/// The designer profile, if the caller owns it (or is an admin).
pub async fn verify_designer_self(
    engine: &Engine,
    designer_id: Uuid,
    caller: &AuthenticatedCaller,
) -> Result<designers::Model, CoreError> {
    let designer = engine.get_designer(designer_id).await?;
    if caller.is_admin() || designer.user_id == caller.user_id {
        Ok(designer)
    } else {
        Err(CoreError::Forbidden(
            "You can only manage your own designer profile".to_string(),
        ))
    }
}
