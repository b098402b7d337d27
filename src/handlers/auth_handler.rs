// src/handlers/auth_handler.rs
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use secrecy::ExposeSecret;
use serde_json::json;
use sqlx::PgPool;

use crate::config::jwt::JwtSettings;
use crate::db::helpers::error_response;
use crate::db::user_queries::UserQueries;
use crate::middleware::auth::{encode_token, Claims};
use crate::models::auth::{LoginRequest, LoginResponse, VerifyEmailRequest};
use crate::models::user::UserStatus;
use crate::utils::email_token::hash_token;
use crate::utils::password::verify_password;

#[tracing::instrument(
    name = "Login user attempt",
    skip(login_form, pool, jwt_settings),
    fields(
        username = %login_form.username
    )
)]
pub async fn login_user(
    login_form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    jwt_settings: web::Data<JwtSettings>
) -> HttpResponse {
    let users = UserQueries::new(pool.get_ref().clone());

    // Return database error to user as 500
    let user = match users.by_username(login_form.username.trim()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::info!("User not found or invalid credentials");
            return HttpResponse::Unauthorized().finish();
        }
        Err(e) => {
            tracing::error!("Database error occurred: {:?}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    if !verify_password(login_form.password.expose_secret(), &user.password_hash) {
        tracing::info!("Invalid password");
        return HttpResponse::Unauthorized().finish();
    }

    if user.status != UserStatus::Active {
        tracing::info!("Suspended user {} tried to log in", user.username);
        return error_response(StatusCode::FORBIDDEN, "Account is suspended");
    }

    let claims = match Claims::new(&user, jwt_settings.expiration_hours) {
        Some(claims) => claims,
        None => {
            tracing::error!("Token expiry out of range");
            return HttpResponse::InternalServerError().finish();
        }
    };

    match encode_token(&claims, &jwt_settings) {
        Ok(token) => HttpResponse::Ok().json(LoginResponse { token }),
        Err(e) => {
            tracing::error!("Error generating JWT token: {:?}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[tracing::instrument(name = "Verify email", skip(request, pool))]
pub async fn verify_email(
    request: web::Json<VerifyEmailRequest>,
    pool: web::Data<PgPool>,
) -> HttpResponse {
    let users = UserQueries::new(pool.get_ref().clone());

    match users.verify_email(&hash_token(&request.token), Utc::now()).await {
        Ok(Some(user_id)) => {
            tracing::info!("Email verified for user {}", user_id);
            HttpResponse::Ok().json(json!({
                "success": true,
                "message": "Email verified"
            }))
        }
        Ok(None) => error_response(StatusCode::BAD_REQUEST, "Invalid or expired verification token"),
        Err(e) => {
            tracing::error!("Failed to verify email: {:?}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
