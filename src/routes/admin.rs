use actix_web::web;

use crate::handlers::admin::{
    fixture_handler,
    scoring_handler,
    season_handler,
    stats_handler,
    user_handler,
};
use crate::middleware::admin::AdminMiddleware;

pub fn init_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(AdminMiddleware)
            // Fixture management routes
            .service(
                web::resource("/fixtures")
                    .route(web::post().to(fixture_handler::create_fixture))
            )
            .service(
                web::resource("/fixtures/{id}")
                    .route(web::put().to(fixture_handler::update_fixture))
                    .route(web::delete().to(fixture_handler::delete_fixture))
            )
            .service(
                web::resource("/fixtures/{id}/score")
                    .route(web::put().to(scoring_handler::update_score))
            )
            .service(
                web::resource("/fixtures/{id}/predictions")
                    .route(web::get().to(fixture_handler::get_fixture_predictions))
            )

            // Scoring tools
            .service(
                web::resource("/test/simulate-score/{id}")
                    .route(web::post().to(scoring_handler::simulate_score))
            )
            .service(
                web::resource("/test/undo-score/{id}")
                    .route(web::post().to(scoring_handler::undo_score))
            )
            .service(
                web::resource("/recalculate-all-points")
                    .route(web::post().to(scoring_handler::recalculate_all_points))
            )

            // Season management routes
            .service(
                web::resource("/seasons")
                    .route(web::post().to(season_handler::create_season))
            )
            .service(
                web::resource("/seasons/{id}")
                    .route(web::delete().to(season_handler::delete_season))
            )
            .service(
                web::resource("/seasons/{id}/clone-fixtures")
                    .route(web::post().to(season_handler::clone_fixtures))
            )
            .service(
                web::resource("/seasons/{id}/activate")
                    .route(web::put().to(season_handler::activate_season))
            )
            .service(
                web::resource("/seasons/{id}/archive")
                    .route(web::put().to(season_handler::archive_season))
            )

            // User management routes
            .service(
                web::resource("/users/{id}/make-admin")
                    .route(web::post().to(user_handler::make_admin))
            )
            .service(
                web::resource("/users/{id}/remove-admin")
                    .route(web::post().to(user_handler::remove_admin))
            )

            .service(
                web::resource("/stats")
                    .route(web::get().to(stats_handler::get_stats))
            )
    );
}
