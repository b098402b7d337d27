use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use chrono::{Duration, Utc};
use secrecy::ExposeSecret;
use serde_json::json;
use sqlx::PgPool;
use validator::{Validate, ValidationErrors};

use crate::db::helpers::{error_response, is_unique_violation};
use crate::db::user_queries::{self, UserQueries};
use crate::models::user::{RegistrationRequest, RegistrationResponse, User};
use crate::utils::email_token::{generate_verification_token, hash_token, VERIFICATION_TOKEN_TTL_HOURS};
use crate::utils::password::hash_password;
use crate::utils::validation::{validate_password, validation_error_response};

#[tracing::instrument(
    name = "Adding a new user",
    // Don't show arguments
    skip(user_form, pool),
    fields(
        username = %user_form.username,
        email = %user_form.email
    )
)]
pub async fn register_user(
    user_form: web::Json<RegistrationRequest>,
    pool: web::Data<PgPool>
) -> HttpResponse {
    let mut errors = match user_form.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    if let Err(e) = validate_password(user_form.password.expose_secret()) {
        errors.add("password", e);
    }
    if !errors.errors().is_empty() {
        return validation_error_response(&errors);
    }

    let users = UserQueries::new(pool.get_ref().clone());
    match users.find_conflict(&user_form.username, &user_form.email).await {
        Ok(Some(_)) => {
            return error_response(
                StatusCode::CONFLICT,
                "Username or email already registered",
            )
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to check existing users: {:?}", e);
            return HttpResponse::InternalServerError().finish();
        }
    }

    let password_hash = match hash_password(user_form.password.expose_secret()) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("Failed to hash password: {:?}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    match insert_user(&user_form, &password_hash, &pool).await {
        Ok(user) => {
            let response = RegistrationResponse {
                user_id: user.id,
                username: user.username,
                email_verified: user.email_verified,
            };
            HttpResponse::Created().json(json!({
                "success": true,
                "data": response
            }))
        }
        // Lost a race against a concurrent registration
        Err(e) if is_unique_violation(&e) => error_response(
            StatusCode::CONFLICT,
            "Username or email already registered",
        ),
        Err(_) => HttpResponse::InternalServerError().finish(),
    }
}

/// Insert the user together with a pending email verification token.
pub async fn insert_user(
    user_form: &RegistrationRequest,
    password_hash: &str,
    pool: &PgPool
) -> Result<User, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let user = user_queries::insert_user(
        &mut tx,
        user_form.username.trim(),
        user_form.email.trim(),
        password_hash,
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to execute user insert query: {:?}", e);
        e
    })?;

    let token = generate_verification_token();
    let expires_at = Utc::now() + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS);
    user_queries::store_verification_token(&mut tx, user.id, &hash_token(&token), expires_at).await?;

    tx.commit().await?;

    // No mail delivery; the token is only logged
    tracing::debug!("Email verification token for {}: {}", user.username, token);
    Ok(user)
}
