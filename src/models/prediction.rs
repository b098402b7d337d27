use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::league::scoring::Scoreline;

#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct Prediction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub fixture_id: Uuid,
    pub home_prediction: i32,
    pub away_prediction: i32,
    pub points_earned: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Prediction {
    pub fn scoreline(&self) -> Scoreline {
        Scoreline::new(self.home_prediction, self.away_prediction)
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PredictionRequest {
    pub fixture_id: Uuid,
    #[validate(range(min = 0, max = 20, message = "Score must be between 0 and 20"))]
    pub home_prediction: i32,
    #[validate(range(min = 0, max = 20, message = "Score must be between 0 and 20"))]
    pub away_prediction: i32,
}

/// The caller's own prediction together with its fixture.
#[derive(Debug, FromRow, Serialize, Deserialize)]
pub struct MyPrediction {
    pub id: Uuid,
    pub fixture_id: Uuid,
    pub home_prediction: i32,
    pub away_prediction: i32,
    pub points_earned: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub fixture_home_team: String,
    pub fixture_away_team: String,
    pub fixture_kickoff: DateTime<Utc>,
    pub fixture_home_score: Option<i32>,
    pub fixture_away_score: Option<i32>,
}

/// Another user's prediction, visible once the deadline has passed.
#[derive(Debug, FromRow, Serialize, Deserialize)]
pub struct PublicPrediction {
    pub id: Uuid,
    pub username: String,
    pub home_prediction: i32,
    pub away_prediction: i32,
    pub points_earned: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Public prediction enriched with the predictor's season standing.
#[derive(Debug, Serialize, Deserialize)]
pub struct DetailedPrediction {
    #[serde(flatten)]
    pub prediction: PublicPrediction,
    pub user_position: Option<i32>,
    pub user_total_points: i32,
    pub user_avg_points: f64,
    /// Last five scored predictions, newest first: W (3), D (1), L (0).
    pub user_form: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_scores_must_be_in_range() {
        let ok = PredictionRequest { fixture_id: Uuid::new_v4(), home_prediction: 0, away_prediction: 20 };
        assert!(ok.validate().is_ok());

        let bad = PredictionRequest { fixture_id: Uuid::new_v4(), home_prediction: 21, away_prediction: 1 };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("home_prediction"));
        assert!(!errors.field_errors().contains_key("away_prediction"));
    }
}
