use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::season::{Season, SeasonResponse};

const SEASON_COLUMNS: &str =
    "id, name, start_date, end_date, status, is_current, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct SeasonCounts {
    fixture_count: i64,
    user_count: i64,
    prediction_count: i64,
}

#[derive(Debug, Clone)]
pub struct SeasonQueries {
    pool: PgPool,
}

impl SeasonQueries {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn current(&self) -> Result<Option<Season>, sqlx::Error> {
        current_season(&mut *self.pool.acquire().await?).await
    }

    pub async fn get(&self, season_id: Uuid) -> Result<Option<Season>, sqlx::Error> {
        sqlx::query_as::<_, Season>(&format!("SELECT {} FROM seasons WHERE id = $1", SEASON_COLUMNS))
            .bind(season_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM seasons WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list(&self) -> Result<Vec<Season>, sqlx::Error> {
        sqlx::query_as::<_, Season>(&format!(
            "SELECT {} FROM seasons ORDER BY start_date DESC",
            SEASON_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn with_counts(&self, season: Season) -> Result<SeasonResponse, sqlx::Error> {
        let counts = sqlx::query_as::<_, SeasonCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM fixtures WHERE season_id = $1) AS fixture_count,
                (SELECT COUNT(*) FROM user_stats WHERE season_id = $1) AS user_count,
                (SELECT COUNT(*) FROM predictions p
                    JOIN fixtures f ON f.id = p.fixture_id
                    WHERE f.season_id = $1) AS prediction_count
            "#,
        )
        .bind(season.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(SeasonResponse {
            season,
            fixture_count: counts.fixture_count,
            user_count: counts.user_count,
            prediction_count: counts.prediction_count,
        })
    }

    pub async fn create(
        &self,
        name: &str,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Season, sqlx::Error> {
        sqlx::query_as::<_, Season>(&format!(
            r#"
            INSERT INTO seasons (id, name, start_date, end_date, status, is_current)
            VALUES ($1, $2, $3, $4, 'draft', FALSE)
            RETURNING {}
            "#,
            SEASON_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await
    }

    /// Make `season_id` the current active season; the previous current season is archived.
    pub async fn activate(&self, season_id: Uuid) -> Result<Option<Season>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE seasons
            SET is_current = FALSE, status = 'archived', updated_at = NOW()
            WHERE is_current AND id <> $1
            "#,
        )
        .bind(season_id)
        .execute(&mut *tx)
        .await?;

        let season = sqlx::query_as::<_, Season>(&format!(
            r#"
            UPDATE seasons
            SET is_current = TRUE, status = 'active', updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SEASON_COLUMNS
        ))
        .bind(season_id)
        .fetch_optional(&mut *tx)
        .await?;

        if season.is_some() {
            tx.commit().await?;
        }
        Ok(season)
    }

    pub async fn archive(&self, season_id: Uuid) -> Result<Option<Season>, sqlx::Error> {
        sqlx::query_as::<_, Season>(&format!(
            r#"
            UPDATE seasons
            SET is_current = FALSE, status = 'archived', updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SEASON_COLUMNS
        ))
        .bind(season_id)
        .fetch_optional(&self.pool)
        .await
    }
}

pub async fn lock_season(conn: &mut PgConnection, season_id: Uuid) -> Result<Option<Season>, sqlx::Error> {
    sqlx::query_as::<_, Season>(&format!(
        "SELECT {} FROM seasons WHERE id = $1 FOR UPDATE",
        SEASON_COLUMNS
    ))
    .bind(season_id)
    .fetch_optional(conn)
    .await
}

pub async fn fixture_count(conn: &mut PgConnection, season_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM fixtures WHERE season_id = $1")
        .bind(season_id)
        .fetch_one(conn)
        .await
}

/// Delete a draft season without fixtures. Returns false when nothing was deleted.
pub async fn delete_empty_draft(conn: &mut PgConnection, season_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM seasons
        WHERE id = $1
          AND status = 'draft'
          AND NOT EXISTS (SELECT 1 FROM fixtures WHERE season_id = $1)
        "#,
    )
    .bind(season_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn current_season(conn: &mut PgConnection) -> Result<Option<Season>, sqlx::Error> {
    sqlx::query_as::<_, Season>(&format!(
        "SELECT {} FROM seasons WHERE is_current LIMIT 1",
        SEASON_COLUMNS
    ))
    .fetch_optional(conn)
    .await
}

/// Resolve an explicit season or fall back to the current one.
pub async fn resolve_season_id(
    pool: &PgPool,
    season_id: Option<Uuid>,
) -> Result<Option<Uuid>, sqlx::Error> {
    match season_id {
        Some(id) => Ok(Some(id)),
        None => sqlx::query_scalar::<_, Uuid>("SELECT id FROM seasons WHERE is_current LIMIT 1")
            .fetch_optional(pool)
            .await,
    }
}
