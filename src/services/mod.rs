pub mod account_service;
pub mod fixture_service;
pub mod mini_league_service;
pub mod prediction_service;
pub mod scoring_service;
pub mod season_service;
pub mod standings_service;

pub use account_service::AccountService;
pub use fixture_service::FixtureService;
pub use mini_league_service::MiniLeagueService;
pub use prediction_service::PredictionService;
pub use scoring_service::ScoringService;
pub use season_service::SeasonService;
pub use standings_service::StandingsService;
