use actix_web::{web, HttpResponse, Result};
use sqlx::PgPool;

use crate::db::helpers::{db_result, require_record};
use crate::db::season_queries::SeasonQueries;
use crate::handlers::helpers::ok_data;
use crate::ok_or_return;

pub async fn list_seasons(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let seasons = SeasonQueries::new(pool.get_ref().clone());
    let data = ok_or_return!(db_result(seasons.list().await));
    Ok(ok_data(data))
}

/// The current season with its fixture, player and prediction counts.
pub async fn get_current_season(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let seasons = SeasonQueries::new(pool.get_ref().clone());
    let season = ok_or_return!(require_record(seasons.current().await, "No active season"));
    let data = ok_or_return!(db_result(seasons.with_counts(season).await));
    Ok(ok_data(data))
}
