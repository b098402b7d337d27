pub mod game;
pub mod jwt;
pub mod rate_limit;
pub mod settings;
