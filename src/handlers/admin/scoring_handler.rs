use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Result};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::helpers::error_response;
use crate::handlers::helpers::ok_data;
use crate::models::fixture::ScoreUpdateRequest;
use crate::services::scoring_service::{ScoringError, ScoringService};
use crate::utils::validation::validation_error_response;

fn scoring_error_response(error: ScoringError) -> HttpResponse {
    match error {
        ScoringError::FixtureNotFound => error_response(StatusCode::NOT_FOUND, &error.to_string()),
        ScoringError::Postponed => error_response(StatusCode::BAD_REQUEST, &error.to_string()),
        ScoringError::Database(e) => {
            tracing::error!("Database error while scoring: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}

async fn apply(
    pool: &PgPool,
    fixture_id: Uuid,
    request: &ScoreUpdateRequest,
    simulated: bool,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }
    let service = ScoringService::new(pool.clone());
    match service.apply_score(fixture_id, request.scoreline(), simulated).await {
        Ok(outcome) => ok_data(outcome),
        Err(e) => scoring_error_response(e),
    }
}

pub async fn update_score(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    request: web::Json<ScoreUpdateRequest>,
) -> Result<HttpResponse> {
    Ok(apply(&pool, path.into_inner(), &request, false).await)
}

/// Same as a real score, but journaled as a simulation.
pub async fn simulate_score(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    request: web::Json<ScoreUpdateRequest>,
) -> Result<HttpResponse> {
    Ok(apply(&pool, path.into_inner(), &request, true).await)
}

pub async fn undo_score(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = ScoringService::new(pool.get_ref().clone());
    match service.undo_score(path.into_inner()).await {
        Ok(outcome) => Ok(ok_data(outcome)),
        Err(e) => Ok(scoring_error_response(e)),
    }
}

#[tracing::instrument(name = "Admin recalculate all points", skip(pool))]
pub async fn recalculate_all_points(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let service = ScoringService::new(pool.get_ref().clone());
    match service.recalculate_all().await {
        Ok(summary) => Ok(ok_data(summary)),
        Err(e) => Ok(scoring_error_response(e)),
    }
}
