use actix_web::{get, post, web, HttpResponse, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::game::GameSettings;
use crate::handlers::prediction_handler;
use crate::middleware::auth::{AuthMiddleware, Claims};
use crate::models::common::PaginationQuery;
use crate::models::prediction::PredictionRequest;

/// Create or replace the caller's prediction for a fixture
#[post("", wrap = "AuthMiddleware")]
async fn make_prediction(
    request: web::Json<PredictionRequest>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    prediction_handler::make_prediction(request, pool, game, claims).await
}

#[get("/my", wrap = "AuthMiddleware")]
async fn my_predictions(
    query: web::Query<PaginationQuery>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    prediction_handler::get_my_predictions(query, pool, claims).await
}

#[get("/fixture/{fixture_id}")]
async fn fixture_predictions(
    path: web::Path<Uuid>,
    query: web::Query<PaginationQuery>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    let fixture_id = path.into_inner();
    prediction_handler::get_fixture_predictions(fixture_id, query, pool, game).await
}

#[get("/fixture/{fixture_id}/detailed")]
async fn fixture_predictions_detailed(
    path: web::Path<Uuid>,
    query: web::Query<PaginationQuery>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    let fixture_id = path.into_inner();
    prediction_handler::get_fixture_predictions_detailed(fixture_id, query, pool, game).await
}
