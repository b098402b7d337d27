//! Helpers that turn database results into uniform JSON error responses.
//!
//! For handlers returning `Result<HttpResponse>`:
//! ```ignore
//! let fixture = ok_or_return!(require_record(
//!     fixtures.get(fixture_id).await,
//!     "Fixture not found"
//! ));
//! ```

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;

/// Unwraps a `DbResult<T>`, returning `Ok(error_response)` from the handler on error.
#[macro_export]
macro_rules! ok_or_return {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(response) => return Ok(response),
        }
    };
}

/// Result type for database operations that return an HttpResponse on error
pub type DbResult<T> = Result<T, HttpResponse>;

/// `{success: false, message}` with the given status.
pub fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "success": false,
        "message": message
    }))
}

fn database_error(e: sqlx::Error) -> HttpResponse {
    tracing::error!("Database error: {}", e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
}

/// Unwrap an optional database result, returning NotFound if None.
pub fn require_record<T>(
    result: Result<Option<T>, sqlx::Error>,
    not_found_message: &str,
) -> DbResult<T> {
    match result {
        Ok(Some(record)) => Ok(record),
        Ok(None) => Err(error_response(StatusCode::NOT_FOUND, not_found_message)),
        Err(e) => Err(database_error(e)),
    }
}

/// Ensure a record does NOT exist, returning Conflict if it does.
pub fn ensure_not_exists<T>(
    result: Result<Option<T>, sqlx::Error>,
    conflict_message: &str,
) -> DbResult<()> {
    match result {
        Ok(Some(_)) => Err(error_response(StatusCode::CONFLICT, conflict_message)),
        Ok(None) => Ok(()),
        Err(e) => Err(database_error(e)),
    }
}

/// Unwrap a database result, returning InternalServerError on error.
pub fn db_result<T>(result: Result<T, sqlx::Error>) -> DbResult<T> {
    result.map_err(database_error)
}

/// Unique-constraint violation, e.g. a duplicate username.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
