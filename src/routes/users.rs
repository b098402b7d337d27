use actix_web::{delete, get, post, put, web, HttpResponse, Result};
use sqlx::PgPool;

use crate::config::game::GameSettings;
use crate::handlers::user_handler;
use crate::middleware::auth::{AuthMiddleware, Claims};
use crate::models::common::PaginationQuery;
use crate::models::user::{ChangePasswordRequest, DeleteAccountRequest, UpdateProfileRequest};

#[get("/me", wrap = "AuthMiddleware")]
async fn me(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    user_handler::get_me(pool, claims).await
}

#[put("/me", wrap = "AuthMiddleware")]
async fn update_me(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    user_handler::update_me(pool, claims, request).await
}

#[post("/me/change-password", wrap = "AuthMiddleware")]
async fn change_password(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
    request: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse> {
    user_handler::change_password(pool, claims, request).await
}

#[get("/me/deletion-preview", wrap = "AuthMiddleware")]
async fn deletion_preview(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    user_handler::get_deletion_preview(pool, claims).await
}

#[delete("/me", wrap = "AuthMiddleware")]
async fn delete_me(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
    request: web::Json<DeleteAccountRequest>,
) -> Result<HttpResponse> {
    user_handler::delete_me(pool, claims, request).await
}

#[get("/{username}")]
async fn public_profile(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let username = path.into_inner();
    user_handler::get_public_profile(username, pool).await
}

#[get("/{username}/predictions")]
async fn user_predictions(
    path: web::Path<String>,
    query: web::Query<PaginationQuery>,
    pool: web::Data<PgPool>,
    game: web::Data<GameSettings>,
) -> Result<HttpResponse> {
    let username = path.into_inner();
    user_handler::get_user_predictions(username, query, pool, game).await
}
