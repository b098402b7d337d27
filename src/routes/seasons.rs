use actix_web::{get, web, HttpResponse, Result};
use sqlx::PgPool;

use crate::handlers::season_handler;

#[get("")]
async fn list_seasons(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    season_handler::list_seasons(pool).await
}

#[get("/current")]
async fn current_season(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    season_handler::get_current_season(pool).await
}
