use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::game::GameSettings;
use crate::db::{fixture_queries, prediction_queries, stats_queries, user_queries};
use crate::models::fixture::FixtureStatus;
use crate::models::prediction::{Prediction, PredictionRequest};
use crate::models::user::UserStatus;

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("Fixture not found")]
    FixtureNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Please verify your email address before making predictions")]
    EmailNotVerified,

    #[error("Account is suspended")]
    Suspended,

    #[error("Predictions are only accepted for scheduled fixtures")]
    NotScheduled,

    #[error("Prediction deadline has passed")]
    DeadlinePassed,

    #[error("Predictions are only open for the next fixture")]
    NotNextFixture,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct PredictionService {
    pool: PgPool,
    game: GameSettings,
}

impl PredictionService {
    pub fn new(pool: PgPool, game: GameSettings) -> Self {
        Self { pool, game }
    }

    /// Create or replace the user's prediction for a fixture.
    ///
    /// The fixture row is share-locked for the whole transaction so the deadline and
    /// status checks cannot race a score being recorded.
    #[tracing::instrument(
        name = "Submit prediction",
        skip(self, request),
        fields(fixture_id = %request.fixture_id)
    )]
    pub async fn submit(
        &self,
        user_id: Uuid,
        request: &PredictionRequest,
    ) -> Result<Prediction, PredictionError> {
        let mut tx = self.pool.begin().await?;

        let (email_verified, status) = user_queries::account_state(&mut tx, user_id)
            .await?
            .ok_or(PredictionError::UserNotFound)?;
        if status != UserStatus::Active {
            return Err(PredictionError::Suspended);
        }
        if !email_verified {
            return Err(PredictionError::EmailNotVerified);
        }

        let fixture = fixture_queries::lock_fixture_for_share(&mut tx, request.fixture_id)
            .await?
            .ok_or(PredictionError::FixtureNotFound)?;

        let now = Utc::now();

        if fixture.status != FixtureStatus::Scheduled {
            return Err(PredictionError::NotScheduled);
        }
        if !fixture.prediction_window(self.game.deadline_minutes).is_open_at(now) {
            tracing::info!("Rejected late prediction for fixture {}", fixture.id);
            return Err(PredictionError::DeadlinePassed);
        }
        if self.game.next_fixture_only {
            let next = fixture_queries::next_scheduled_fixture_id(&mut tx, fixture.season_id, now).await?;
            if next != Some(fixture.id) {
                return Err(PredictionError::NotNextFixture);
            }
        }

        let prediction = prediction_queries::upsert_prediction(
            &mut tx,
            user_id,
            fixture.id,
            request.home_prediction,
            request.away_prediction,
        )
        .await?;
        stats_queries::ensure_stats_row(&mut tx, user_id, fixture.season_id).await?;

        tx.commit().await?;

        tracing::info!(
            "Prediction {}-{} saved for fixture {}",
            prediction.home_prediction, prediction.away_prediction, fixture.id
        );
        Ok(prediction)
    }
}
