pub mod fixture_queries;
pub mod helpers;
pub mod mini_league_queries;
pub mod prediction_queries;
pub mod season_queries;
pub mod stats_queries;
pub mod user_queries;
