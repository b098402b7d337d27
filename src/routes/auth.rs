use actix_web::{post, web, HttpRequest, HttpResponse};
use sqlx::PgPool;

use crate::config::jwt::JwtSettings;
use crate::handlers::auth_handler::{login_user, verify_email};
use crate::models::auth::{LoginRequest, VerifyEmailRequest};
use crate::utils::rate_limit::{client_key, too_many_attempts, AuthEndpoint, RateLimiter};

#[post("/login")]
async fn login(
    req: HttpRequest,
    login_form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    jwt_settings: web::Data<JwtSettings>,
    limiter: web::Data<RateLimiter>,
) -> HttpResponse {
    let client = client_key(&req);
    if let Err(retry_after) = limiter.check(AuthEndpoint::Login, &client) {
        tracing::warn!("Login rate limit hit for {}", client);
        return too_many_attempts(retry_after);
    }
    login_user(login_form, pool, jwt_settings).await
}

#[post("/verify-email")]
async fn verify(
    request: web::Json<VerifyEmailRequest>,
    pool: web::Data<PgPool>,
) -> HttpResponse {
    verify_email(request, pool).await
}
