use actix_web::{get, web, HttpResponse, Result};
use sqlx::PgPool;

use crate::handlers::leaderboard_handler;
use crate::middleware::auth::{AuthMiddleware, Claims};
use crate::models::common::LimitQuery;
use crate::models::leaderboard::{LeaderboardQuery, MiniLeagueFilter};

#[get("")]
async fn leaderboard(
    query: web::Query<LeaderboardQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    leaderboard_handler::get_leaderboard(query, pool).await
}

/// Best form over the last few finished fixtures
#[get("/top")]
async fn top_performers(
    query: web::Query<LimitQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    leaderboard_handler::get_top_performers(query, pool).await
}

#[get("/month")]
async fn month_leaders(
    query: web::Query<LimitQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    leaderboard_handler::get_month_leaders(query, pool).await
}

#[get("/user-position", wrap = "AuthMiddleware")]
async fn user_position(
    query: web::Query<MiniLeagueFilter>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    leaderboard_handler::get_user_position(query, pool, claims).await
}

#[get("/count")]
async fn leaderboard_count(
    query: web::Query<MiniLeagueFilter>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    leaderboard_handler::get_leaderboard_count(query, pool).await
}
