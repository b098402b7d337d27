use actix_web::{web, HttpResponse, Result};
use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::db::fixture_queries::fixture_counts;
use crate::db::helpers::db_result;
use crate::db::user_queries::UserQueries;
use crate::handlers::helpers::ok_data;
use crate::ok_or_return;

const ACTIVE_WINDOW_DAYS: i64 = 7;

#[derive(Serialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_fixtures: i64,
    pub total_predictions: i64,
    pub upcoming_fixtures: i64,
    pub completed_fixtures: i64,
    pub active_users_last_7_days: i64,
}

pub async fn get_stats(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let users = UserQueries::new(pool.get_ref().clone());
    let now = Utc::now();

    let total_users = ok_or_return!(db_result(users.total_users().await));
    let total_predictions = ok_or_return!(db_result(users.total_predictions().await));
    let active = ok_or_return!(db_result(
        users.active_since(now - Duration::days(ACTIVE_WINDOW_DAYS)).await
    ));
    let fixtures = ok_or_return!(db_result(fixture_counts(&pool, now).await));

    Ok(ok_data(AdminStats {
        total_users,
        total_fixtures: fixtures.total_fixtures,
        total_predictions,
        upcoming_fixtures: fixtures.upcoming_fixtures,
        completed_fixtures: fixtures.completed_fixtures,
        active_users_last_7_days: active,
    }))
}
