use actix_web::{web, HttpResponse, Result};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::game::GameSettings;
use crate::db::fixture_queries::FixtureQueries;
use crate::db::helpers::{db_result, require_record};
use crate::handlers::helpers::{ok_data, season_or_current};
use crate::models::common::LimitQuery;
use crate::models::fixture::{FixtureListQuery, FixtureResponse};
use crate::ok_or_return;

const SHORT_LIST_DEFAULT: i64 = 5;
const SHORT_LIST_MAX: i64 = 20;

/// All fixtures of a season in kickoff order.
#[tracing::instrument(name = "List fixtures", skip(pool, game))]
pub async fn list_fixtures(
    query: web::Query<FixtureListQuery>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    let season_id = ok_or_return!(season_or_current(&pool, query.season_id).await);
    let fixtures = FixtureQueries::new(pool.get_ref().clone());
    let now = Utc::now();

    let rows = ok_or_return!(db_result(fixtures.list_for_season(season_id).await));
    let next = ok_or_return!(db_result(fixtures.next_fixture_id(season_id, now).await));

    let data: Vec<FixtureResponse> = rows
        .into_iter()
        .map(|row| row.into_response(now, &game, next))
        .collect();
    Ok(ok_data(data))
}

pub async fn get_next_fixture(
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    let season_id = ok_or_return!(season_or_current(&pool, None).await);
    let fixtures = FixtureQueries::new(pool.get_ref().clone());
    let now = Utc::now();

    let next_id = ok_or_return!(require_record(
        fixtures.next_fixture_id(season_id, now).await,
        "No upcoming fixture"
    ));
    let row = ok_or_return!(require_record(
        fixtures.get_listing(next_id).await,
        "No upcoming fixture"
    ));
    Ok(ok_data(row.into_response(now, &game, Some(next_id))))
}

pub async fn get_upcoming_fixtures(
    query: web::Query<LimitQuery>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    let season_id = ok_or_return!(season_or_current(&pool, None).await);
    let fixtures = FixtureQueries::new(pool.get_ref().clone());
    let now = Utc::now();
    let limit = query.limit_or(SHORT_LIST_DEFAULT, SHORT_LIST_MAX);

    let rows = ok_or_return!(db_result(fixtures.upcoming(season_id, now, limit).await));
    let next = rows.first().map(|row| row.fixture.id);

    let data: Vec<FixtureResponse> = rows
        .into_iter()
        .map(|row| row.into_response(now, &game, next))
        .collect();
    Ok(ok_data(data))
}

pub async fn get_recent_results(
    query: web::Query<LimitQuery>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    let season_id = ok_or_return!(season_or_current(&pool, None).await);
    let fixtures = FixtureQueries::new(pool.get_ref().clone());
    let now = Utc::now();
    let limit = query.limit_or(SHORT_LIST_DEFAULT, SHORT_LIST_MAX);

    let rows = ok_or_return!(db_result(fixtures.recent(season_id, limit).await));
    let data: Vec<FixtureResponse> = rows
        .into_iter()
        .map(|row| row.into_response(now, &game, None))
        .collect();
    Ok(ok_data(data))
}

pub async fn get_fixture(
    fixture_id: Uuid,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    let fixtures = FixtureQueries::new(pool.get_ref().clone());
    let now = Utc::now();

    let row = ok_or_return!(require_record(
        fixtures.get_listing(fixture_id).await,
        "Fixture not found"
    ));
    let next = ok_or_return!(db_result(fixtures.next_fixture_id(row.fixture.season_id, now).await));
    Ok(ok_data(row.into_response(now, &game, next)))
}
