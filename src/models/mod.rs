pub mod auth;
pub mod common;
pub mod fixture;
pub mod leaderboard;
pub mod mini_league;
pub mod prediction;
pub mod season;
pub mod user;
