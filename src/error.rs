use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::{
    auth::{guard::Forbidden, jwt::TokenError},
    store::{Reference, StoreError, UniqueField},
};

/// One failed input rule, reported in `400 {"errors": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub msg: &'static str,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("Forbidden")]
    Forbidden,

    /// Ownership check failed. Reported under `message`, unlike role checks.
    #[error("{0}")]
    NotOwner(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidCredentials | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::NotOwner(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::Validation(errors) => json!({ "errors": errors }),
            AppError::BadRequest(m) | AppError::NotOwner(m) | AppError::NotFound(m) => {
                json!({ "message": m })
            }
            AppError::Internal(details) => {
                error!(error = %details, "request failed");
                // Driver text can reveal schema details; only echo it in dev builds.
                if cfg!(debug_assertions) {
                    json!({ "error": "Server error", "details": details })
                } else {
                    json!({ "error": "Server error" })
                }
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(UniqueField::Email) => AppError::Conflict("Email already registered"),
            StoreError::Conflict(UniqueField::Username) => AppError::Conflict("Username already taken"),
            StoreError::Conflict(UniqueField::CategoryName) => {
                AppError::Conflict("Category already exists")
            }
            StoreError::MissingReference(Reference::User) => {
                AppError::Unauthenticated("User no longer exists")
            }
            StoreError::MissingReference(Reference::Post) => AppError::NotFound("Post not found"),
            StoreError::MissingReference(Reference::Category) => {
                AppError::BadRequest("Invalid category")
            }
            StoreError::Database(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection.body_text(), "request body rejected");
        let msg = match rejection {
            JsonRejection::JsonDataError(_) => "Invalid or missing field",
            JsonRejection::JsonSyntaxError(_) => "Malformed JSON",
            JsonRejection::MissingJsonContentType(_) => "Expected application/json",
            _ => "Unreadable request body",
        };
        AppError::Validation(vec![FieldError { field: "body", msg }])
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Sign(e) => AppError::Internal(e.to_string()),
            TokenError::Malformed | TokenError::BadSignature | TokenError::Expired => {
                AppError::Unauthenticated("Invalid or expired token")
            }
        }
    }
}

impl From<Forbidden> for AppError {
    fn from(_: Forbidden) -> Self {
        AppError::Forbidden
    }
}
