use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "season_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SeasonStatus {
    Draft,
    Active,
    Archived,
}

#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct Season {
    pub id: Uuid,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: SeasonStatus,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_season_dates", skip_on_field_errors = false))]
pub struct CreateSeasonRequest {
    #[validate(length(min = 1, max = 50, message = "Season name must be 1-50 characters"))]
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

fn validate_season_dates(request: &CreateSeasonRequest) -> Result<(), ValidationError> {
    if request.end_date <= request.start_date {
        let mut err = ValidationError::new("invalid_range");
        err.message = Some("Season must end after it starts".into());
        return Err(err);
    }
    Ok(())
}

/// Season with activity counts.
#[derive(Debug, Serialize, Deserialize)]
pub struct SeasonResponse {
    #[serde(flatten)]
    pub season: Season,
    pub fixture_count: i64,
    pub user_count: i64,
    pub prediction_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CloneFixturesQuery {
    pub source_season_id: Uuid,
}
