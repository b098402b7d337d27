use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::db::{fixture_queries, prediction_queries, stats_queries};
use crate::league::aggregate::UserAggregate;
use crate::league::scoring::{calculate_points, Scoreline};
use crate::models::fixture::{Fixture, FixtureStatus};
use crate::services::standings_service::refresh_positions;

/// Advisory lock key serialising all score writers.
const SCORING_LOCK_KEY: i64 = 0x5C0E_11AE;

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Fixture not found")]
    FixtureNotFound,

    #[error("Cannot record a score for a postponed fixture")]
    Postponed,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Serialize)]
pub struct ScoreOutcome {
    pub fixture_id: Uuid,
    /// False when the request left the fixture as it was.
    pub changed: bool,
    pub status: FixtureStatus,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub predictions_scored: usize,
    pub users_updated: usize,
}

impl ScoreOutcome {
    fn unchanged(fixture: &Fixture) -> Self {
        Self {
            fixture_id: fixture.id,
            changed: false,
            status: fixture.status,
            home_score: fixture.home_score,
            away_score: fixture.away_score,
            predictions_scored: 0,
            users_updated: 0,
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct RecalculationSummary {
    pub fixtures_rescored: usize,
    pub predictions_rescored: usize,
    pub stale_points_cleared: u64,
    pub users_recomputed: usize,
    pub seasons: usize,
}

#[derive(Debug, Clone)]
pub struct ScoringService {
    pool: PgPool,
}

impl ScoringService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a final score and settle every prediction on the fixture.
    ///
    /// The previous state is journaled first so it can be restored by [`undo_score`].
    /// Re-applying the score the fixture already has is a no-op.
    ///
    /// [`undo_score`]: ScoringService::undo_score
    #[tracing::instrument(name = "Apply fixture score", skip(self, score), fields(score = %score))]
    pub async fn apply_score(
        &self,
        fixture_id: Uuid,
        score: Scoreline,
        simulated: bool,
    ) -> Result<ScoreOutcome, ScoringError> {
        let mut tx = self.pool.begin().await?;
        lock_scoring(&mut tx).await?;

        let fixture = fixture_queries::lock_fixture_for_update(&mut tx, fixture_id)
            .await?
            .ok_or(ScoringError::FixtureNotFound)?;

        if fixture.status == FixtureStatus::Postponed {
            return Err(ScoringError::Postponed);
        }

        if fixture.final_score() == Some(score) {
            tracing::info!("Fixture {} already finished {}, nothing to do", fixture_id, score);
            tx.commit().await?;
            return Ok(ScoreOutcome::unchanged(&fixture));
        }

        fixture_queries::record_score_change(&mut tx, &fixture, simulated).await?;
        fixture_queries::set_result(
            &mut tx,
            fixture_id,
            FixtureStatus::Finished,
            Some(score.home),
            Some(score.away),
        )
        .await?;

        let (predictions_scored, users_updated) =
            settle_fixture(&mut tx, fixture_id, fixture.season_id, Some(score)).await?;

        tx.commit().await?;

        tracing::info!(
            "Fixture {} scored {}: {} predictions, {} users updated",
            fixture_id, score, predictions_scored, users_updated
        );

        Ok(ScoreOutcome {
            fixture_id,
            changed: true,
            status: FixtureStatus::Finished,
            home_score: Some(score.home),
            away_score: Some(score.away),
            predictions_scored,
            users_updated,
        })
    }

    /// Restore the fixture to its state before the latest score change.
    ///
    /// Without a journal entry a finished fixture goes back to scheduled with no score.
    #[tracing::instrument(name = "Undo fixture score", skip(self))]
    pub async fn undo_score(&self, fixture_id: Uuid) -> Result<ScoreOutcome, ScoringError> {
        let mut tx = self.pool.begin().await?;
        lock_scoring(&mut tx).await?;

        let fixture = fixture_queries::lock_fixture_for_update(&mut tx, fixture_id)
            .await?
            .ok_or(ScoringError::FixtureNotFound)?;

        let (status, home_score, away_score) =
            match fixture_queries::pop_score_change(&mut tx, fixture_id).await? {
                Some(change) => (
                    change.previous_status,
                    change.previous_home_score,
                    change.previous_away_score,
                ),
                None if fixture.status == FixtureStatus::Finished => {
                    (FixtureStatus::Scheduled, None, None)
                }
                None => {
                    tx.commit().await?;
                    return Ok(ScoreOutcome::unchanged(&fixture));
                }
            };

        fixture_queries::set_result(&mut tx, fixture_id, status, home_score, away_score).await?;

        let restored = match (status, home_score, away_score) {
            (FixtureStatus::Finished, Some(home), Some(away)) => Some(Scoreline::new(home, away)),
            _ => None,
        };
        let (predictions_scored, users_updated) =
            settle_fixture(&mut tx, fixture_id, fixture.season_id, restored).await?;

        tx.commit().await?;

        tracing::info!("Fixture {} restored to {}", fixture_id, status.as_str());

        Ok(ScoreOutcome {
            fixture_id,
            changed: true,
            status,
            home_score,
            away_score,
            predictions_scored,
            users_updated,
        })
    }

    /// Rescore every finished fixture and rebuild every aggregate from scratch.
    #[tracing::instrument(name = "Recalculate all points", skip(self))]
    pub async fn recalculate_all(&self) -> Result<RecalculationSummary, ScoringError> {
        let mut tx = self.pool.begin().await?;
        lock_scoring(&mut tx).await?;

        let mut summary = RecalculationSummary::default();

        for fixture in fixture_queries::finished_fixtures(&mut tx).await? {
            if let Some(score) = fixture.final_score() {
                let (predictions, _) = rescore_predictions(&mut tx, fixture.id, Some(score)).await?;
                summary.predictions_rescored += predictions;
                summary.fixtures_rescored += 1;
            }
        }
        summary.stale_points_cleared = prediction_queries::clear_points_on_unfinished(&mut tx).await?;

        for season_id in stats_queries::seasons_with_activity(&mut tx).await? {
            let users = stats_queries::season_participants(&mut tx, season_id).await?;
            recompute_users(&mut tx, season_id, &users).await?;
            refresh_positions(&mut tx, season_id).await?;
            summary.users_recomputed += users.len();
            summary.seasons += 1;
        }

        tx.commit().await?;

        tracing::info!("Recalculated points: {:?}", summary);
        Ok(summary)
    }
}

async fn lock_scoring(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCORING_LOCK_KEY)
        .execute(conn)
        .await?;
    Ok(())
}

/// Rescore the fixture's predictions, then rebuild the aggregates and positions they feed.
async fn settle_fixture(
    conn: &mut PgConnection,
    fixture_id: Uuid,
    season_id: Uuid,
    result: Option<Scoreline>,
) -> Result<(usize, usize), sqlx::Error> {
    let (predictions, users) = rescore_predictions(conn, fixture_id, result).await?;
    recompute_users(conn, season_id, &users).await?;
    refresh_positions(conn, season_id).await?;
    Ok((predictions, users.len()))
}

/// Returns the number of predictions and the sorted ids of the users who made them.
async fn rescore_predictions(
    conn: &mut PgConnection,
    fixture_id: Uuid,
    result: Option<Scoreline>,
) -> Result<(usize, Vec<Uuid>), sqlx::Error> {
    let predictions = prediction_queries::predictions_for_fixture(conn, fixture_id).await?;

    match result {
        Some(actual) => {
            let ids: Vec<Uuid> = predictions.iter().map(|p| p.id).collect();
            let points: Vec<i32> = predictions
                .iter()
                .map(|p| calculate_points(p.scoreline(), actual))
                .collect();
            prediction_queries::store_points(conn, &ids, &points).await?;
        }
        None => prediction_queries::clear_points(conn, fixture_id).await?,
    }

    let mut users: Vec<Uuid> = predictions.iter().map(|p| p.user_id).collect();
    users.sort();
    users.dedup();
    Ok((predictions.len(), users))
}

async fn recompute_users(
    conn: &mut PgConnection,
    season_id: Uuid,
    user_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    for user_id in user_ids {
        let points = stats_queries::scored_points(conn, *user_id, season_id).await?;
        let aggregate = UserAggregate::from_points(points);
        stats_queries::upsert_stats(conn, *user_id, season_id, &aggregate).await?;
    }
    Ok(())
}
