use actix_web::{get, web, HttpResponse, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::game::GameSettings;
use crate::handlers::fixture_handler;
use crate::models::common::LimitQuery;
use crate::models::fixture::FixtureListQuery;

#[get("")]
async fn list_fixtures(
    query: web::Query<FixtureListQuery>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    fixture_handler::list_fixtures(query, pool, game).await
}

#[get("/next")]
async fn next_fixture(
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    fixture_handler::get_next_fixture(pool, game).await
}

#[get("/upcoming")]
async fn upcoming_fixtures(
    query: web::Query<LimitQuery>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    fixture_handler::get_upcoming_fixtures(query, pool, game).await
}

#[get("/recent")]
async fn recent_results(
    query: web::Query<LimitQuery>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    fixture_handler::get_recent_results(query, pool, game).await
}

#[get("/{fixture_id}")]
async fn get_fixture(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    let fixture_id = path.into_inner();
    fixture_handler::get_fixture(fixture_id, pool, game).await
}
