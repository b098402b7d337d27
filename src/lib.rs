use actix_web::{http, web, App, HttpServer};
use actix_web::dev::Server;
use tracing_actix_web::TracingLogger;
use sqlx::PgPool;
use std::net::TcpListener;
use actix_cors::Cors;

pub mod config;
mod routes;
mod handlers;
pub mod models;
pub mod utils;
pub mod middleware;
pub mod db;
pub mod league;
pub mod services;
pub mod telemetry;
use crate::routes::init_routes;
use crate::config::game::GameSettings;
use crate::config::jwt::JwtSettings;
use crate::config::rate_limit::RateLimitSettings;
use crate::utils::rate_limit::RateLimiter;

pub fn run(
    listener: TcpListener,
    db_pool: PgPool,
    jwt_settings: JwtSettings,
    game_settings: GameSettings,
    rate_limit_settings: RateLimitSettings,
) -> Result<Server, std::io::Error> {
    // Wrap using web::Data, which boils down to an Arc smart pointer
    let db_pool_data = web::Data::new(db_pool);
    let jwt_settings = web::Data::new(jwt_settings);
    let game_settings = web::Data::new(game_settings);
    // Shared by all workers so limits hold across them
    let rate_limiter = web::Data::new(RateLimiter::new(rate_limit_settings));

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:3001")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![
                http::header::AUTHORIZATION,
                http::header::ACCEPT,
                http::header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            // Get a pointer copy and attach it to the application state
            .app_data(db_pool_data.clone())
            .app_data(jwt_settings.clone())
            .app_data(game_settings.clone())
            .app_data(rate_limiter.clone())
            .configure(init_routes)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
