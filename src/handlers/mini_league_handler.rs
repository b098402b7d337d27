use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Result};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::game::GameSettings;
use crate::db::helpers::{db_result, error_response};
use crate::db::mini_league_queries;
use crate::handlers::helpers::{caller_id, ok_data, season_or_current};
use crate::middleware::auth::Claims;
use crate::models::mini_league::{CreateMiniLeagueRequest, MiniLeagueMembersResponse};
use crate::ok_or_return;
use crate::services::mini_league_service::{MiniLeagueError, MiniLeagueService};
use crate::utils::validation::validation_error_response;

fn mini_league_error_response(error: MiniLeagueError) -> HttpResponse {
    let status = match &error {
        MiniLeagueError::NotFound => StatusCode::NOT_FOUND,
        MiniLeagueError::NotCreator => StatusCode::FORBIDDEN,
        MiniLeagueError::NoCurrentSeason
        | MiniLeagueError::MembershipLimit(_)
        | MiniLeagueError::Inactive
        | MiniLeagueError::Full
        | MiniLeagueError::AlreadyMember
        | MiniLeagueError::NotMember
        | MiniLeagueError::CreatorCannotLeave => StatusCode::BAD_REQUEST,
        MiniLeagueError::InviteCodeExhausted => StatusCode::INTERNAL_SERVER_ERROR,
        MiniLeagueError::Database(e) => {
            tracing::error!("Database error in mini league: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    };
    error_response(status, &error.to_string())
}

fn service(pool: &PgPool, game: &GameSettings) -> MiniLeagueService {
    MiniLeagueService::new(pool.clone(), game.clone())
}

#[tracing::instrument(
    name = "Create mini league",
    skip(request, pool, game, claims),
    fields(username = %claims.username)
)]
pub async fn create_mini_league(
    request: web::Json<CreateMiniLeagueRequest>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    if let Err(errors) = request.validate() {
        return Ok(validation_error_response(&errors));
    }
    let user_id = ok_or_return!(caller_id(&claims));

    match service(&pool, &game).create(user_id, &request).await {
        Ok(league) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": league
        }))),
        Err(e) => Ok(mini_league_error_response(e)),
    }
}

pub async fn join_mini_league(
    code: String,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let user_id = ok_or_return!(caller_id(&claims));

    match service(&pool, &game).join(user_id, &code).await {
        Ok(league) => Ok(ok_data(league)),
        Err(e) => Ok(mini_league_error_response(e)),
    }
}

pub async fn get_my_leagues(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let user_id = ok_or_return!(caller_id(&claims));
    let season_id = ok_or_return!(season_or_current(&pool, None).await);

    let leagues = ok_or_return!(db_result(
        mini_league_queries::leagues_for_user(&pool, user_id, season_id).await
    ));
    Ok(ok_data(leagues))
}

pub async fn get_members(
    league_id: Uuid,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let user_id = ok_or_return!(caller_id(&claims));

    match service(&pool, &game).ranked_members(user_id, league_id).await {
        Ok((league, members)) => Ok(ok_data(MiniLeagueMembersResponse { league, members })),
        Err(MiniLeagueError::NotMember) => Ok(error_response(
            StatusCode::FORBIDDEN,
            "Only members can view this mini league",
        )),
        Err(e) => Ok(mini_league_error_response(e)),
    }
}

pub async fn leave_mini_league(
    league_id: Uuid,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let user_id = ok_or_return!(caller_id(&claims));

    match service(&pool, &game).leave(user_id, league_id).await {
        Ok(outcome) => Ok(ok_data(outcome)),
        Err(e) => Ok(mini_league_error_response(e)),
    }
}

pub async fn delete_mini_league(
    league_id: Uuid,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let user_id = ok_or_return!(caller_id(&claims));

    match service(&pool, &game).delete(user_id, league_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Mini league deleted"
        }))),
        Err(e) => Ok(mini_league_error_response(e)),
    }
}
