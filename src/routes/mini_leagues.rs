use actix_web::{delete, get, post, web, HttpResponse, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::game::GameSettings;
use crate::handlers::mini_league_handler;
use crate::middleware::auth::Claims;
use crate::models::mini_league::CreateMiniLeagueRequest;

#[post("/create")]
async fn create_mini_league(
    request: web::Json<CreateMiniLeagueRequest>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    mini_league_handler::create_mini_league(request, pool, game, claims).await
}

#[post("/join/{code}")]
async fn join_mini_league(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let code = path.into_inner();
    mini_league_handler::join_mini_league(code, pool, game, claims).await
}

#[get("/my-leagues")]
async fn my_leagues(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    mini_league_handler::get_my_leagues(pool, claims).await
}

#[get("/{league_id}/members")]
async fn members(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let league_id = path.into_inner();
    mini_league_handler::get_members(league_id, pool, game, claims).await
}

#[delete("/{league_id}/leave")]
async fn leave_mini_league(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let league_id = path.into_inner();
    mini_league_handler::leave_mini_league(league_id, pool, game, claims).await
}

#[delete("/{league_id}")]
async fn delete_mini_league(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let league_id = path.into_inner();
    mini_league_handler::delete_mini_league(league_id, pool, game, claims).await
}
