use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Result};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::fixture_queries::FixtureQueries;
use crate::db::helpers::{db_result, error_response, require_record};
use crate::db::prediction_queries::PredictionQueries;
use crate::db::season_queries::SeasonQueries;
use crate::handlers::helpers::ok_data;
use crate::models::common::{Paginated, PaginationQuery};
use crate::models::fixture::{CreateFixtureRequest, UpdateFixtureRequest};
use crate::ok_or_return;
use crate::services::fixture_service::{FixtureError, FixtureService};
use crate::utils::validation::validation_error_response;

#[tracing::instrument(
    name = "Admin create fixture",
    skip(request, pool),
    fields(home = %request.home_team, away = %request.away_team)
)]
pub async fn create_fixture(
    pool: web::Data<PgPool>,
    request: web::Json<CreateFixtureRequest>,
) -> Result<HttpResponse> {
    if let Err(errors) = request.validate() {
        return Ok(validation_error_response(&errors));
    }
    if request.home_team.trim().eq_ignore_ascii_case(request.away_team.trim()) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            "Home and away team must differ",
        ));
    }

    let seasons = SeasonQueries::new(pool.get_ref().clone());
    let season_id = match request.season_id {
        Some(id) => ok_or_return!(require_record(seasons.get(id).await, "Season not found")).id,
        None => match ok_or_return!(db_result(seasons.current().await)) {
            Some(season) => season.id,
            None => {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    "No current season, pass season_id explicitly",
                ))
            }
        },
    };

    let fixtures = FixtureQueries::new(pool.get_ref().clone());
    let fixture = ok_or_return!(db_result(fixtures.create(season_id, &request).await));
    tracing::info!("Created fixture {} in season {}", fixture.id, season_id);

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": fixture
    })))
}

fn fixture_error_response(error: FixtureError) -> HttpResponse {
    let status = match &error {
        FixtureError::NotFound => StatusCode::NOT_FOUND,
        FixtureError::FinishViaScore | FixtureError::AlreadyFinished => StatusCode::BAD_REQUEST,
        FixtureError::DetailsFrozen | FixtureError::HasPredictions => StatusCode::CONFLICT,
        FixtureError::Database(e) => {
            tracing::error!("Database error while editing fixture: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    };
    error_response(status, &error.to_string())
}

/// Edit fixture details or status. Scores go through the score endpoint.
pub async fn update_fixture(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    request: web::Json<UpdateFixtureRequest>,
) -> Result<HttpResponse> {
    let fixture_id = path.into_inner();
    if let Err(errors) = request.validate() {
        return Ok(validation_error_response(&errors));
    }
    if request.is_empty() {
        return Ok(error_response(StatusCode::BAD_REQUEST, "Nothing to update"));
    }

    match FixtureService::new(pool.get_ref().clone()).update(fixture_id, &request).await {
        Ok(fixture) => Ok(ok_data(fixture)),
        Err(e) => Ok(fixture_error_response(e)),
    }
}

pub async fn delete_fixture(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match FixtureService::new(pool.get_ref().clone()).delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Fixture deleted"
        }))),
        Err(e) => Ok(fixture_error_response(e)),
    }
}

/// Every prediction on a fixture, regardless of its deadline.
pub async fn get_fixture_predictions(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse> {
    let fixture_id = path.into_inner();
    let fixtures = FixtureQueries::new(pool.get_ref().clone());
    ok_or_return!(require_record(fixtures.get(fixture_id).await, "Fixture not found"));

    let predictions = PredictionQueries::new(pool.get_ref().clone());
    let (rows, total) = ok_or_return!(db_result(
        predictions.for_fixture(fixture_id, query.limit(), query.offset()).await
    ));
    let items = rows.into_iter().map(|(_, prediction)| prediction).collect();
    Ok(ok_data(Paginated::new(items, &query, total)))
}
