use actix_web::{post, web, HttpRequest, HttpResponse};
use sqlx::PgPool;

use crate::handlers::registration_handler::register_user;
use crate::models::user::RegistrationRequest;
use crate::utils::rate_limit::{client_key, too_many_attempts, AuthEndpoint, RateLimiter};

#[post("/register")]
async fn register(
    req: HttpRequest,
    user_form: web::Json<RegistrationRequest>,
    pool: web::Data<PgPool>,
    limiter: web::Data<RateLimiter>,
) -> HttpResponse {
    let client = client_key(&req);
    if let Err(retry_after) = limiter.check(AuthEndpoint::Register, &client) {
        tracing::warn!("Registration rate limit hit for {}", client);
        return too_many_attempts(retry_after);
    }
    register_user(user_form, pool).await
}
