pub mod fixture_handler;
pub mod scoring_handler;
pub mod season_handler;
pub mod stats_handler;
pub mod user_handler;
