use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::league::deadline::PredictionWindow;
use crate::league::scoring::Scoreline;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "fixture_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FixtureStatus {
    Scheduled,
    Live,
    Finished,
    Postponed,
}

impl FixtureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixtureStatus::Scheduled => "scheduled",
            FixtureStatus::Live => "live",
            FixtureStatus::Finished => "finished",
            FixtureStatus::Postponed => "postponed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "competition_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Competition {
    Championship,
    FaCup,
    LeagueCup,
    Playoff,
}

#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct Fixture {
    pub id: Uuid,
    pub season_id: Uuid,
    pub home_team: String,
    pub away_team: String,
    pub competition: Competition,
    pub kickoff_time: DateTime<Utc>,
    pub original_kickoff_time: DateTime<Utc>,
    pub round: Option<String>,
    pub status: FixtureStatus,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Fixture {
    pub fn final_score(&self) -> Option<Scoreline> {
        match (self.status, self.home_score, self.away_score) {
            (FixtureStatus::Finished, Some(home), Some(away)) => Some(Scoreline::new(home, away)),
            _ => None,
        }
    }

    pub fn prediction_window(&self, lead_minutes: i64) -> PredictionWindow {
        PredictionWindow::new(self.kickoff_time, lead_minutes)
    }
}

/// Previous state of a fixture, recorded before its score changes.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct ScoreChange {
    pub id: Uuid,
    pub fixture_id: Uuid,
    pub previous_status: FixtureStatus,
    pub previous_home_score: Option<i32>,
    pub previous_away_score: Option<i32>,
    pub simulated: bool,
    pub created_at: DateTime<Utc>,
}

/// Fixture as returned by the public API.
#[derive(Debug, Serialize, Deserialize)]
pub struct FixtureResponse {
    pub id: Uuid,
    pub season_id: Uuid,
    pub season: String,
    pub home_team: String,
    pub away_team: String,
    pub competition: Competition,
    pub kickoff_time: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub seconds_until_deadline: i64,
    pub status: FixtureStatus,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub round: Option<String>,
    pub can_predict: bool,
    pub predictions_count: i64,
}

#[derive(Debug, Deserialize, Default)]
pub struct FixtureListQuery {
    pub season_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateFixtureRequest {
    #[validate(length(min = 1, max = 100, message = "Team name must be 1-100 characters"))]
    pub home_team: String,
    #[validate(length(min = 1, max = 100, message = "Team name must be 1-100 characters"))]
    pub away_team: String,
    pub competition: Competition,
    pub kickoff_time: DateTime<Utc>,
    pub season_id: Option<Uuid>,
    #[validate(length(max = 50))]
    pub round: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpdateFixtureRequest {
    #[validate(length(min = 1, max = 100))]
    pub home_team: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub away_team: Option<String>,
    pub competition: Option<Competition>,
    pub kickoff_time: Option<DateTime<Utc>>,
    pub status: Option<FixtureStatus>,
    #[validate(length(max = 50))]
    pub round: Option<String>,
}

impl UpdateFixtureRequest {
    /// True when anything other than the status is being changed.
    pub fn touches_details(&self) -> bool {
        self.home_team.is_some()
            || self.away_team.is_some()
            || self.competition.is_some()
            || self.kickoff_time.is_some()
            || self.round.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.touches_details() && self.status.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, Copy)]
pub struct ScoreUpdateRequest {
    #[validate(range(min = 0, max = 20, message = "Score must be between 0 and 20"))]
    pub home_score: i32,
    #[validate(range(min = 0, max = 20, message = "Score must be between 0 and 20"))]
    pub away_score: i32,
}

impl ScoreUpdateRequest {
    pub fn scoreline(&self) -> Scoreline {
        Scoreline::new(self.home_score, self.away_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_with_only_status_does_not_touch_details() {
        let request = UpdateFixtureRequest {
            status: Some(FixtureStatus::Postponed),
            ..Default::default()
        };
        assert!(!request.touches_details());
        assert!(!request.is_empty());
        assert!(UpdateFixtureRequest::default().is_empty());
    }

    #[test]
    fn score_update_rejects_out_of_range() {
        let request = ScoreUpdateRequest { home_score: 21, away_score: -1 };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("home_score"));
        assert!(fields.contains_key("away_score"));
    }
}
