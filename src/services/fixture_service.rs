use sqlx::PgPool;
use uuid::Uuid;

use crate::db::fixture_queries;
use crate::models::fixture::{Fixture, FixtureStatus, UpdateFixtureRequest};

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Fixture not found")]
    NotFound,

    #[error("Use the score endpoint to finish a fixture")]
    FinishViaScore,

    #[error("A finished fixture can only be reopened by undoing its score")]
    AlreadyFinished,

    #[error("Fixture details cannot change once predictions exist")]
    DetailsFrozen,

    #[error("Fixture has predictions and cannot be deleted")]
    HasPredictions,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Admin edits of existing fixtures.
///
/// Both operations hold the fixture row lock from the check to the write, so a
/// prediction or score being committed at the same time is either seen by the
/// check or waits for the edit.
#[derive(Debug, Clone)]
pub struct FixtureService {
    pool: PgPool,
}

impl FixtureService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(name = "Update fixture", skip(self, request))]
    pub async fn update(
        &self,
        fixture_id: Uuid,
        request: &UpdateFixtureRequest,
    ) -> Result<Fixture, FixtureError> {
        if request.status == Some(FixtureStatus::Finished) {
            return Err(FixtureError::FinishViaScore);
        }

        let mut tx = self.pool.begin().await?;
        let fixture = fixture_queries::lock_fixture_for_update(&mut tx, fixture_id)
            .await?
            .ok_or(FixtureError::NotFound)?;

        if request.status.is_some() && fixture.status == FixtureStatus::Finished {
            return Err(FixtureError::AlreadyFinished);
        }
        if request.touches_details() && fixture_queries::predictions_count(&mut tx, fixture_id).await? > 0 {
            return Err(FixtureError::DetailsFrozen);
        }

        // The guarded update re-checks both rules; with the row locked it only
        // misses if the row vanished.
        let updated = fixture_queries::update_fixture(&mut tx, fixture_id, request)
            .await?
            .ok_or(FixtureError::NotFound)?;
        tx.commit().await?;

        tracing::info!("Updated fixture {}", fixture_id);
        Ok(updated)
    }

    #[tracing::instrument(name = "Delete fixture", skip(self))]
    pub async fn delete(&self, fixture_id: Uuid) -> Result<(), FixtureError> {
        let mut tx = self.pool.begin().await?;
        fixture_queries::lock_fixture_for_update(&mut tx, fixture_id)
            .await?
            .ok_or(FixtureError::NotFound)?;

        if !fixture_queries::delete_unpredicted_fixture(&mut tx, fixture_id).await? {
            return Err(FixtureError::HasPredictions);
        }
        tx.commit().await?;

        tracing::info!("Deleted fixture {}", fixture_id);
        Ok(())
    }
}
