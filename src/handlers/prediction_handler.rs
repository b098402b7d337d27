use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Result};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::game::GameSettings;
use crate::db::fixture_queries::FixtureQueries;
use crate::db::helpers::{db_result, error_response, require_record, DbResult};
use crate::db::prediction_queries::PredictionQueries;
use crate::db::stats_queries;
use crate::handlers::helpers::{caller_id, ok_data};
use crate::league::scoring::form_string;
use crate::middleware::auth::Claims;
use crate::models::common::{Paginated, PaginationQuery};
use crate::models::fixture::Fixture;
use crate::models::prediction::{DetailedPrediction, PredictionRequest};
use crate::ok_or_return;
use crate::services::prediction_service::{PredictionError, PredictionService};
use crate::utils::validation::validation_error_response;

const FORM_LENGTH: i64 = 5;

fn prediction_error_response(error: PredictionError) -> HttpResponse {
    let status = match &error {
        PredictionError::FixtureNotFound => StatusCode::NOT_FOUND,
        PredictionError::UserNotFound => StatusCode::UNAUTHORIZED,
        PredictionError::EmailNotVerified | PredictionError::Suspended => StatusCode::FORBIDDEN,
        PredictionError::NotScheduled
        | PredictionError::DeadlinePassed
        | PredictionError::NotNextFixture => StatusCode::BAD_REQUEST,
        PredictionError::Database(e) => {
            tracing::error!("Database error while saving prediction: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    };
    error_response(status, &error.to_string())
}

#[tracing::instrument(
    name = "Make prediction",
    skip(request, pool, game, claims),
    fields(username = %claims.username)
)]
pub async fn make_prediction(
    request: web::Json<PredictionRequest>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    if let Err(errors) = request.validate() {
        return Ok(validation_error_response(&errors));
    }
    let user_id = ok_or_return!(caller_id(&claims));

    let service = PredictionService::new(pool.get_ref().clone(), game.get_ref().clone());
    match service.submit(user_id, &request).await {
        Ok(prediction) => Ok(ok_data(prediction)),
        Err(e) => Ok(prediction_error_response(e)),
    }
}

pub async fn get_my_predictions(
    query: web::Query<PaginationQuery>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let user_id = ok_or_return!(caller_id(&claims));
    let predictions = PredictionQueries::new(pool.get_ref().clone());

    let (items, total) = ok_or_return!(db_result(
        predictions.for_user(user_id, query.limit(), query.offset()).await
    ));
    Ok(ok_data(Paginated::new(items, &query, total)))
}

/// Load a fixture whose predictions may be shown, i.e. one past its deadline.
async fn visible_fixture(
    fixture_id: Uuid,
    pool: &PgPool,
    game: &GameSettings,
) -> DbResult<Fixture> {
    let fixture = require_record(
        FixtureQueries::new(pool.clone()).get(fixture_id).await,
        "Fixture not found",
    )?;
    if !fixture.prediction_window(game.deadline_minutes).predictions_visible_at(Utc::now()) {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Predictions are hidden until the prediction deadline",
        ));
    }
    Ok(fixture)
}

pub async fn get_fixture_predictions(
    fixture_id: Uuid,
    query: web::Query<PaginationQuery>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    ok_or_return!(visible_fixture(fixture_id, &pool, &game).await);
    let predictions = PredictionQueries::new(pool.get_ref().clone());

    let (rows, total) = ok_or_return!(db_result(
        predictions.for_fixture(fixture_id, query.limit(), query.offset()).await
    ));
    let items = rows.into_iter().map(|(_, prediction)| prediction).collect();
    Ok(ok_data(Paginated::new(items, &query, total)))
}

/// Public predictions with each predictor's standing and recent form.
pub async fn get_fixture_predictions_detailed(
    fixture_id: Uuid,
    query: web::Query<PaginationQuery>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    let fixture = ok_or_return!(visible_fixture(fixture_id, &pool, &game).await);
    let predictions = PredictionQueries::new(pool.get_ref().clone());

    let (rows, total) = ok_or_return!(db_result(
        predictions.for_fixture(fixture_id, query.limit(), query.offset()).await
    ));
    let user_ids: Vec<Uuid> = rows.iter().map(|(user_id, _)| *user_id).collect();

    let stats = ok_or_return!(db_result(
        stats_queries::stats_for_users(&pool, fixture.season_id, &user_ids).await
    ));
    let mut form = ok_or_return!(db_result(
        predictions.recent_points(fixture.season_id, &user_ids, FORM_LENGTH).await
    ));

    let items: Vec<DetailedPrediction> = rows
        .into_iter()
        .map(|(user_id, prediction)| {
            let row = stats.iter().find(|s| s.user_id == user_id);
            let recent = form.remove(&user_id).unwrap_or_default();
            DetailedPrediction {
                prediction,
                user_position: row.and_then(|s| s.position),
                user_total_points: row.map_or(0, |s| s.total_points),
                user_avg_points: row.map_or(0.0, |s| s.avg_points_per_game),
                user_form: form_string(&recent),
            }
        })
        .collect();

    Ok(ok_data(Paginated::new(items, &query, total)))
}
