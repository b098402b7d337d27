use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::helpers::{error_response, DbResult};
use crate::db::season_queries::resolve_season_id;
use crate::middleware::auth::Claims;

pub fn ok_data<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "data": data
    }))
}

pub fn caller_id(claims: &Claims) -> DbResult<Uuid> {
    claims.user_id().ok_or_else(|| {
        tracing::warn!("Token subject is not a user id: {}", claims.sub);
        error_response(StatusCode::UNAUTHORIZED, "Invalid token subject")
    })
}

/// The requested season, or the current one when none was given.
pub async fn season_or_current(pool: &PgPool, season_id: Option<Uuid>) -> DbResult<Uuid> {
    match resolve_season_id(pool, season_id).await {
        Ok(Some(id)) => Ok(id),
        Ok(None) => Err(error_response(StatusCode::NOT_FOUND, "No active season")),
        Err(e) => {
            tracing::error!("Failed to resolve season: {}", e);
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))
        }
    }
}
