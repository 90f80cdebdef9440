use actix_web::{Error, FromRequest, HttpRequest, dev::Payload};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};
use std::str::FromStr;
use uuid::Uuid;

/// Header carrying the caller's user id, stamped by the upstream gateway.
pub const USER_ID_HEADER: &str = "X-User-Id";
/// Header carrying the caller's role, stamped by the upstream gateway.
pub const USER_ROLE_HEADER: &str = "X-User-Role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Designer,
    Admin,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "designer" => Ok(Self::Designer),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// The caller as identified by the gateway. Sessions and tokens are verified
/// upstream; this layer only reads the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedCaller {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthenticatedCaller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl FromRequest for AuthenticatedCaller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_caller(req))
    }
}

fn extract_caller(req: &HttpRequest) -> Result<AuthenticatedCaller, Error> {
    let header = |name: &'static str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| actix_web::error::ErrorUnauthorized(format!("Missing {name} header")))
    };

    let user_id = header(USER_ID_HEADER)?
        .trim()
        .parse::<Uuid>()
        .map_err(|e| actix_web::error::ErrorUnauthorized(format!("Invalid {USER_ID_HEADER}: {e}")))?;

    let role = header(USER_ROLE_HEADER)?
        .parse::<Role>()
        .map_err(actix_web::error::ErrorUnauthorized)?;

    Ok(AuthenticatedCaller { user_id, role })
}
