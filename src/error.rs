use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Every failure the assignment and commission engine can surface.
///
/// Precondition and exhaustion variants are expected outcomes and are never
/// retried by the engine; `Database` is fatal to the current operation.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    InvalidState(String),

    #[error("designer {designer_id} is not on the shortlist for order {order_id}")]
    NotShortlisted { order_id: Uuid, designer_id: Uuid },

    #[error("order {order_id} is not on offer to designer {designer_id}")]
    NotOffered { order_id: Uuid, designer_id: Uuid },

    #[error("order {0} has already been assigned")]
    AlreadyAssigned(Uuid),

    #[error("order {0} already has a dispute")]
    DuplicateDispute(Uuid),

    #[error("no eligible designers for order {0}")]
    NoEligibleDesigners(Uuid),

    #[error("designer {0} has no remaining capacity")]
    CapacityExceeded(Uuid),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("the record was modified concurrently, retry the request")]
    WriteConflict,

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidState(_) => "invalid_state",
            Self::NotShortlisted { .. } => "not_shortlisted",
            Self::NotOffered { .. } => "not_offered",
            Self::AlreadyAssigned(_) => "already_assigned",
            Self::DuplicateDispute(_) => "duplicate_dispute",
            Self::NoEligibleDesigners(_) => "no_eligible_designers",
            Self::CapacityExceeded(_) => "capacity_exceeded",
            Self::NotFound { .. } => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::Validation(_) => "validation",
            Self::WriteConflict => "write_conflict",
            Self::Database(_) => "database",
        }
    }
}

impl ResponseError for CoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidState(_) | Self::NotShortlisted { .. } | Self::NotOffered { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::AlreadyAssigned(_)
            | Self::DuplicateDispute(_)
            | Self::NoEligibleDesigners(_)
            | Self::CapacityExceeded(_)
            | Self::WriteConflict => StatusCode::CONFLICT,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Database(e) = self {
            tracing::error!(error = %e, "database failure");
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        }))
    }
}

/// Failure reported by a notification or audit collaborator. The engine logs
/// these and carries on.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("sink rejected the message: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
