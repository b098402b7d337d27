use actix_web::web;

pub mod admin;
pub mod auth;
pub mod backend_health;
pub mod fixtures;
pub mod leaderboard;
pub mod mini_leagues;
pub mod predictions;
pub mod registration;
pub mod seasons;
pub mod users;

use crate::middleware::auth::AuthMiddleware;
use crate::routes::admin::init_admin_routes;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(backend_health::backend_health);

    cfg.service(
        web::scope("/auth")
            .service(registration::register)
            .service(auth::login)
            .service(auth::verify)
    );
    // Public reads; literal segments before `{fixture_id}`
    cfg.service(
        web::scope("/fixtures")
            .service(fixtures::list_fixtures)
            .service(fixtures::next_fixture)
            .service(fixtures::upcoming_fixtures)
            .service(fixtures::recent_results)
            .service(fixtures::get_fixture)
    );
    cfg.service(
        web::scope("/predictions")
            .service(predictions::make_prediction)
            .service(predictions::my_predictions)
            .service(predictions::fixture_predictions)
            .service(predictions::fixture_predictions_detailed)
    );
    cfg.service(
        web::scope("/leaderboard")
            .service(leaderboard::leaderboard)
            .service(leaderboard::top_performers)
            .service(leaderboard::month_leaders)
            .service(leaderboard::user_position)
            .service(leaderboard::leaderboard_count)
    );
    // Mini league routes (require authentication)
    cfg.service(
        web::scope("/mini-leagues")
            .wrap(AuthMiddleware)
            .service(mini_leagues::create_mini_league)
            .service(mini_leagues::join_mini_league)
            .service(mini_leagues::my_leagues)
            .service(mini_leagues::members)
            .service(mini_leagues::leave_mini_league)
            .service(mini_leagues::delete_mini_league)
    );
    cfg.service(
        web::scope("/seasons")
            .service(seasons::list_seasons)
            .service(seasons::current_season)
    );
    cfg.service(
        web::scope("/users")
            .service(users::me)
            .service(users::update_me)
            .service(users::change_password)
            .service(users::deletion_preview)
            .service(users::delete_me)
            .service(users::public_profile)
            .service(users::user_predictions)
    );

    init_admin_routes(cfg);
}
