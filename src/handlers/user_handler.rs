use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Result};
use chrono::{Duration, Utc};
use secrecy::ExposeSecret;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::game::GameSettings;
use crate::db::helpers::{db_result, error_response, require_record};
use crate::db::prediction_queries::PredictionQueries;
use crate::db::season_queries::SeasonQueries;
use crate::db::stats_queries;
use crate::db::user_queries::UserQueries;
use crate::handlers::helpers::{caller_id, ok_data};
use crate::middleware::auth::Claims;
use crate::models::common::{Paginated, PaginationQuery};
use crate::models::user::{
    ChangePasswordRequest, DeleteAccountRequest, MeResponse, PublicProfile, SeasonStatsSummary,
    UpdateProfileRequest, User, DELETE_CONFIRMATION,
};
use crate::ok_or_return;
use crate::services::account_service::{AccountError, AccountService};
use crate::utils::validation::{validate_password, validation_error_response};

fn account_error_response(error: AccountError) -> HttpResponse {
    let status = match &error {
        AccountError::NotFound => StatusCode::NOT_FOUND,
        AccountError::UsernameTaken | AccountError::EmailTaken => StatusCode::CONFLICT,
        AccountError::IncorrectCurrentPassword => StatusCode::BAD_REQUEST,
        AccountError::IncorrectPassword => StatusCode::UNAUTHORIZED,
        AccountError::Hash(e) => {
            tracing::error!("Password hashing failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
        AccountError::Database(e) => {
            tracing::error!("Account operation failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    };
    error_response(status, &error.to_string())
}

async fn current_season_summary(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<SeasonStatsSummary>, sqlx::Error> {
    let Some(season) = SeasonQueries::new(pool.clone()).current().await? else {
        return Ok(None);
    };
    let row = stats_queries::user_stats(pool, user_id, season.id).await?;
    Ok(row.map(|row| SeasonStatsSummary {
        season_id: season.id,
        position: row.position,
        stats: row.aggregate(),
    }))
}

pub async fn get_me(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let user_id = ok_or_return!(caller_id(&claims));
    let users = UserQueries::new(pool.get_ref().clone());

    let user = ok_or_return!(require_record(users.by_id(user_id).await, "User not found"));
    me_response(&pool, user).await
}

async fn me_response(pool: &PgPool, user: User) -> Result<HttpResponse> {
    let stats = ok_or_return!(db_result(current_season_summary(pool, user.id).await));

    Ok(ok_data(MeResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
        email_verified: user.email_verified,
        created_at: user.created_at,
        stats,
    }))
}

pub async fn update_me(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    let user_id = ok_or_return!(caller_id(&claims));
    if let Err(errors) = request.validate() {
        return Ok(validation_error_response(&errors));
    }
    if request.is_empty() {
        return Ok(error_response(StatusCode::BAD_REQUEST, "Nothing to update"));
    }

    match AccountService::new(pool.get_ref().clone()).update_profile(user_id, &request).await {
        Ok(user) => me_response(&pool, user).await,
        Err(e) => Ok(account_error_response(e)),
    }
}

pub async fn change_password(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
    request: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse> {
    let user_id = ok_or_return!(caller_id(&claims));
    if let Err(e) = validate_password(request.new_password.expose_secret()) {
        let mut errors = validator::ValidationErrors::new();
        errors.add("new_password", e);
        return Ok(validation_error_response(&errors));
    }

    let accounts = AccountService::new(pool.get_ref().clone());
    match accounts
        .change_password(user_id, &request.current_password, &request.new_password)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Password changed"
        }))),
        Err(e) => Ok(account_error_response(e)),
    }
}

pub async fn get_deletion_preview(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let user_id = ok_or_return!(caller_id(&claims));
    match AccountService::new(pool.get_ref().clone()).deletion_preview(user_id).await {
        Ok(preview) => Ok(ok_data(preview)),
        Err(e) => Ok(account_error_response(e)),
    }
}

/// Permanently delete the caller's account. Requires the literal
/// confirmation `DELETE` and the current password.
pub async fn delete_me(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
    request: web::Json<DeleteAccountRequest>,
) -> Result<HttpResponse> {
    let user_id = ok_or_return!(caller_id(&claims));
    if request.confirmation != DELETE_CONFIRMATION {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            "Type DELETE to confirm account deletion",
        ));
    }
    let Some(password) = request.password.as_ref() else {
        return Ok(error_response(StatusCode::BAD_REQUEST, "Password is required"));
    };

    match AccountService::new(pool.get_ref().clone()).delete_account(user_id, password).await {
        Ok(summary) => Ok(ok_data(summary)),
        Err(e) => Ok(account_error_response(e)),
    }
}

pub async fn get_public_profile(username: String, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let users = UserQueries::new(pool.get_ref().clone());

    let user = ok_or_return!(require_record(users.by_username(&username).await, "User not found"));
    let stats = ok_or_return!(db_result(current_season_summary(&pool, user.id).await));

    Ok(ok_data(PublicProfile {
        id: user.id,
        username: user.username,
        joined_at: user.created_at,
        stats,
    }))
}

/// A user's predictions, limited to fixtures whose prediction window has closed.
pub async fn get_user_predictions(
    username: String,
    query: web::Query<PaginationQuery>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    let users = UserQueries::new(pool.get_ref().clone());
    let user = ok_or_return!(require_record(users.by_username(&username).await, "User not found"));

    // Fixtures kicking off within the deadline lead have already closed.
    let cutoff = Utc::now() + Duration::minutes(game.deadline_minutes);
    let predictions = PredictionQueries::new(pool.get_ref().clone());
    let (items, total) = ok_or_return!(db_result(
        predictions
            .visible_for_user(user.id, cutoff, query.limit(), query.offset())
            .await
    ));
    Ok(ok_data(Paginated::new(items, &query, total)))
}
