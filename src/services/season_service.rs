use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{fixture_queries, season_queries};
use crate::league::schedule::{season_year_gap, shift_by_years};
use crate::models::season::SeasonStatus;

#[derive(Debug, thiserror::Error)]
pub enum SeasonError {
    #[error("Season not found")]
    NotFound,

    #[error("Source season not found")]
    SourceNotFound,

    #[error("Only draft seasons can be changed this way")]
    NotDraft,

    #[error("Cannot delete a season with {0} fixtures")]
    HasFixtures(i64),

    #[error("A season cannot clone its own fixtures")]
    SameSeason,

    #[error("No fixtures found in the source season")]
    NoSourceFixtures,

    #[error("Kickoff time out of range after moving to the new season")]
    KickoffOutOfRange,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Serialize)]
pub struct CloneSummary {
    pub season_id: Uuid,
    pub source_season_id: Uuid,
    pub cloned: usize,
}

/// Draft season housekeeping: removal and seeding from an earlier season.
#[derive(Debug, Clone)]
pub struct SeasonService {
    pool: PgPool,
}

impl SeasonService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(name = "Delete season", skip(self))]
    pub async fn delete_draft(&self, season_id: Uuid) -> Result<String, SeasonError> {
        let mut tx = self.pool.begin().await?;
        let season = season_queries::lock_season(&mut tx, season_id)
            .await?
            .ok_or(SeasonError::NotFound)?;

        if season.status != SeasonStatus::Draft {
            return Err(SeasonError::NotDraft);
        }
        let fixtures = season_queries::fixture_count(&mut tx, season_id).await?;
        if fixtures > 0 {
            return Err(SeasonError::HasFixtures(fixtures));
        }
        if !season_queries::delete_empty_draft(&mut tx, season_id).await? {
            // A fixture was added between the count and the delete
            return Err(SeasonError::HasFixtures(1));
        }
        tx.commit().await?;

        tracing::info!("Deleted draft season {}", season.name);
        Ok(season.name)
    }

    /// Copy every fixture of `source_id` into the draft season `target_id`.
    ///
    /// Kickoffs move by the number of calendar years between the two season
    /// starts. Copies are scheduled and carry no score.
    #[tracing::instrument(name = "Clone season fixtures", skip(self))]
    pub async fn clone_fixtures(
        &self,
        target_id: Uuid,
        source_id: Uuid,
    ) -> Result<CloneSummary, SeasonError> {
        if target_id == source_id {
            return Err(SeasonError::SameSeason);
        }

        let mut tx = self.pool.begin().await?;
        let target = season_queries::lock_season(&mut tx, target_id)
            .await?
            .ok_or(SeasonError::NotFound)?;
        if target.status != SeasonStatus::Draft {
            return Err(SeasonError::NotDraft);
        }
        let source = season_queries::lock_season(&mut tx, source_id)
            .await?
            .ok_or(SeasonError::SourceNotFound)?;

        let fixtures = fixture_queries::fixtures_for_season(&mut tx, source.id).await?;
        if fixtures.is_empty() {
            return Err(SeasonError::NoSourceFixtures);
        }

        let years = season_year_gap(source.start_date, target.start_date);
        for fixture in &fixtures {
            let kickoff = shift_by_years(fixture.kickoff_time, years)
                .ok_or(SeasonError::KickoffOutOfRange)?;
            let original = shift_by_years(fixture.original_kickoff_time, years)
                .ok_or(SeasonError::KickoffOutOfRange)?;
            fixture_queries::insert_cloned_fixture(&mut tx, target.id, fixture, kickoff, original).await?;
        }
        tx.commit().await?;

        tracing::info!(
            "Cloned {} fixtures from {} into {}",
            fixtures.len(), source.name, target.name
        );
        Ok(CloneSummary {
            season_id: target.id,
            source_season_id: source.id,
            cloned: fixtures.len(),
        })
    }
}
