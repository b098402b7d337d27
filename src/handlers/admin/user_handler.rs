use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Result};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::helpers::{error_response, require_record};
use crate::db::user_queries::UserQueries;
use crate::handlers::helpers::{caller_id, ok_data};
use crate::middleware::auth::Claims;
use crate::models::user::{User, UserRole};
use crate::ok_or_return;

#[derive(Serialize)]
pub struct RoleChangeResponse {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
}

impl From<User> for RoleChangeResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

pub async fn make_admin(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let users = UserQueries::new(pool.get_ref().clone());
    let user = ok_or_return!(require_record(
        users.set_role(path.into_inner(), UserRole::Admin).await,
        "User not found"
    ));
    tracing::info!("Granted admin role to {}", user.username);
    Ok(ok_data(RoleChangeResponse::from(user)))
}

pub async fn remove_admin(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let target = path.into_inner();
    let caller = ok_or_return!(caller_id(&claims));
    if target == caller {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            "Admins cannot remove their own admin role",
        ));
    }

    let users = UserQueries::new(pool.get_ref().clone());
    let user = ok_or_return!(require_record(
        users.set_role(target, UserRole::User).await,
        "User not found"
    ));
    tracing::info!("Removed admin role from {}", user.username);
    Ok(ok_data(RoleChangeResponse::from(user)))
}
