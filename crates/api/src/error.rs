use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chamba_core::error::CoreError;
use chamba_engine::EngineError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Extractors fail with [`CoreError`]; marketplace calls fail with
/// [`EngineError`]. Both render as `{ "error", "code" }` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `chamba_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed marketplace operation.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Engine(EngineError::Core(core)) => classify_core_error(core),
            AppError::Engine(EngineError::Database(err)) => classify_sqlx_error(err),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Map a domain error to an HTTP status, error code and message.
///
/// Every marketplace rejection keeps its own code so clients can tell an
/// `ALREADY_ACCEPTED` from a `REQUEST_CLOSED` without parsing messages.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::InvalidRating(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_RATING", err.to_string())
        }
        CoreError::InvalidCategory(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_CATEGORY", err.to_string())
        }
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::InvalidTransition { .. } => {
            (StatusCode::CONFLICT, "INVALID_TRANSITION", err.to_string())
        }
        CoreError::AlreadyAccepted { .. } => {
            (StatusCode::CONFLICT, "ALREADY_ACCEPTED", err.to_string())
        }
        CoreError::RequestClosed { .. } => {
            (StatusCode::CONFLICT, "REQUEST_CLOSED", err.to_string())
        }
        CoreError::DuplicateProposal { .. } => {
            (StatusCode::CONFLICT, "DUPLICATE_PROPOSAL", err.to_string())
        }
        CoreError::ConcurrentModification { .. } => (
            StatusCode::CONFLICT,
            "CONCURRENT_MODIFICATION",
            err.to_string(),
        ),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
