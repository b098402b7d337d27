pub mod admin;
pub mod auth_handler;
pub mod backend_health_handler;
pub mod fixture_handler;
pub mod helpers;
pub mod leaderboard_handler;
pub mod mini_league_handler;
pub mod prediction_handler;
pub mod registration_handler;
pub mod season_handler;
pub mod user_handler;
