use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Result};
use chrono::Utc;
use sqlx::PgPool;

use crate::db::helpers::{db_result, error_response};
use crate::handlers::helpers::{caller_id, ok_data, season_or_current};
use crate::middleware::auth::Claims;
use crate::models::common::{LimitQuery, Paginated};
use crate::models::leaderboard::{CountResponse, LeaderboardQuery, MiniLeagueFilter};
use crate::ok_or_return;
use crate::services::StandingsService;

const WINDOW_TABLE_DEFAULT: i64 = 10;
const WINDOW_TABLE_MAX: i64 = 20;

#[tracing::instrument(name = "Get leaderboard", skip(pool))]
pub async fn get_leaderboard(
    query: web::Query<LeaderboardQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let season_id = ok_or_return!(season_or_current(&pool, query.season_id).await);
    let standings = StandingsService::new(pool.get_ref().clone());

    let table = ok_or_return!(db_result(
        standings.leaderboard(season_id, query.mini_league_id).await
    ));
    Ok(ok_data(Paginated::from_vec(table, &query.pagination())))
}

/// Form table over the last few finished fixtures.
pub async fn get_top_performers(
    query: web::Query<LimitQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let season_id = ok_or_return!(season_or_current(&pool, None).await);
    let limit = query.limit_or(WINDOW_TABLE_DEFAULT, WINDOW_TABLE_MAX) as usize;
    let standings = StandingsService::new(pool.get_ref().clone());

    let table = ok_or_return!(db_result(standings.form_table(season_id, limit).await));
    Ok(ok_data(table))
}

pub async fn get_month_leaders(
    query: web::Query<LimitQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let season_id = ok_or_return!(season_or_current(&pool, None).await);
    let limit = query.limit_or(WINDOW_TABLE_DEFAULT, WINDOW_TABLE_MAX) as usize;
    let standings = StandingsService::new(pool.get_ref().clone());

    let table = ok_or_return!(db_result(
        standings.month_table(season_id, Utc::now(), limit).await
    ));
    Ok(ok_data(table))
}

pub async fn get_user_position(
    query: web::Query<MiniLeagueFilter>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let user_id = ok_or_return!(caller_id(&claims));
    let season_id = ok_or_return!(season_or_current(&pool, None).await);
    let standings = StandingsService::new(pool.get_ref().clone());

    match standings.user_entry(season_id, user_id, query.mini_league_id).await {
        Ok(Some(entry)) => Ok(ok_data(entry)),
        Ok(None) => Ok(error_response(
            StatusCode::NOT_FOUND,
            "No standing yet, make a prediction to join the leaderboard",
        )),
        Err(e) => {
            tracing::error!("Failed to load user position: {}", e);
            Ok(error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))
        }
    }
}

/// Users with at least one scored prediction.
pub async fn get_leaderboard_count(
    query: web::Query<MiniLeagueFilter>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let season_id = ok_or_return!(season_or_current(&pool, None).await);
    let standings = StandingsService::new(pool.get_ref().clone());

    let table = ok_or_return!(db_result(
        standings.leaderboard(season_id, query.mini_league_id).await
    ));
    let count = table.iter().filter(|entry| entry.stats.has_predictions()).count() as i64;
    Ok(ok_data(CountResponse { count }))
}
