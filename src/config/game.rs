use serde::Deserialize;

/// Tunables for the prediction game.
#[derive(Debug, Clone, Deserialize)]
pub struct GameSettings {
    /// Minutes before kickoff at which predictions lock.
    pub deadline_minutes: i64,
    /// Only the next upcoming fixture can be predicted.
    pub next_fixture_only: bool,
    pub max_leagues_per_user: i64,
    pub default_mini_league_size: i32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            deadline_minutes: crate::league::deadline::DEFAULT_DEADLINE_MINUTES,
            next_fixture_only: true,
            max_leagues_per_user: 5,
            default_mini_league_size: 50,
        }
    }
}
