use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Result};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::helpers::{ensure_not_exists, error_response, is_unique_violation, require_record};
use crate::db::season_queries::SeasonQueries;
use crate::handlers::helpers::ok_data;
use crate::models::season::{CloneFixturesQuery, CreateSeasonRequest};
use crate::ok_or_return;
use crate::services::season_service::{SeasonError, SeasonService};
use crate::utils::validation::validation_error_response;

fn season_error_response(error: SeasonError) -> HttpResponse {
    let status = match &error {
        SeasonError::NotFound | SeasonError::SourceNotFound => StatusCode::NOT_FOUND,
        SeasonError::NotDraft
        | SeasonError::HasFixtures(_)
        | SeasonError::SameSeason
        | SeasonError::NoSourceFixtures
        | SeasonError::KickoffOutOfRange => StatusCode::BAD_REQUEST,
        SeasonError::Database(e) => {
            tracing::error!("Database error in season admin: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    };
    error_response(status, &error.to_string())
}

#[tracing::instrument(name = "Admin create season", skip(pool, request), fields(name = %request.name))]
pub async fn create_season(
    pool: web::Data<PgPool>,
    request: web::Json<CreateSeasonRequest>,
) -> Result<HttpResponse> {
    if let Err(errors) = request.validate() {
        return Ok(validation_error_response(&errors));
    }
    let name = request.name.trim();
    let seasons = SeasonQueries::new(pool.get_ref().clone());

    ok_or_return!(ensure_not_exists(
        seasons.find_by_name(name).await,
        "A season with this name already exists"
    ));

    match seasons.create(name, request.start_date, request.end_date).await {
        Ok(season) => {
            tracing::info!("Created season {} ({})", season.name, season.id);
            Ok(HttpResponse::Created().json(json!({
                "success": true,
                "data": season
            })))
        }
        Err(e) if is_unique_violation(&e) => Ok(error_response(
            StatusCode::CONFLICT,
            "A season with this name already exists",
        )),
        Err(e) => {
            tracing::error!("Failed to create season: {}", e);
            Ok(error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))
        }
    }
}

pub async fn activate_season(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let seasons = SeasonQueries::new(pool.get_ref().clone());
    let season = ok_or_return!(require_record(
        seasons.activate(path.into_inner()).await,
        "Season not found"
    ));
    tracing::info!("Season {} is now current", season.name);
    Ok(ok_data(season))
}

pub async fn archive_season(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let seasons = SeasonQueries::new(pool.get_ref().clone());
    let season = ok_or_return!(require_record(
        seasons.archive(path.into_inner()).await,
        "Season not found"
    ));
    Ok(ok_data(season))
}

/// Only empty draft seasons can be deleted.
pub async fn delete_season(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match SeasonService::new(pool.get_ref().clone()).delete_draft(path.into_inner()).await {
        Ok(name) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": format!("Season {} deleted", name)
        }))),
        Err(e) => Ok(season_error_response(e)),
    }
}

pub async fn clone_fixtures(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    query: web::Query<CloneFixturesQuery>,
) -> Result<HttpResponse> {
    let service = SeasonService::new(pool.get_ref().clone());
    match service.clone_fixtures(path.into_inner(), query.source_season_id).await {
        Ok(summary) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": summary
        }))),
        Err(e) => Ok(season_error_response(e)),
    }
}
