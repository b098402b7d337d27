use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::models::prediction::{MyPrediction, Prediction, PublicPrediction};

const PREDICTION_COLUMNS: &str =
    "id, user_id, fixture_id, home_prediction, away_prediction, points_earned, created_at, updated_at";

/// Insert or overwrite the caller's prediction. The last write wins.
pub async fn upsert_prediction(
    conn: &mut PgConnection,
    user_id: Uuid,
    fixture_id: Uuid,
    home_prediction: i32,
    away_prediction: i32,
) -> Result<Prediction, sqlx::Error> {
    sqlx::query_as::<_, Prediction>(&format!(
        r#"
        INSERT INTO predictions (id, user_id, fixture_id, home_prediction, away_prediction)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT ON CONSTRAINT unique_user_fixture_prediction DO UPDATE
        SET home_prediction = EXCLUDED.home_prediction,
            away_prediction = EXCLUDED.away_prediction,
            updated_at = NOW()
        RETURNING {}
        "#,
        PREDICTION_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(fixture_id)
    .bind(home_prediction)
    .bind(away_prediction)
    .fetch_one(conn)
    .await
}

pub async fn predictions_for_fixture(
    conn: &mut PgConnection,
    fixture_id: Uuid,
) -> Result<Vec<Prediction>, sqlx::Error> {
    sqlx::query_as::<_, Prediction>(&format!(
        "SELECT {} FROM predictions WHERE fixture_id = $1 ORDER BY id FOR UPDATE",
        PREDICTION_COLUMNS
    ))
    .bind(fixture_id)
    .fetch_all(conn)
    .await
}

/// Store freshly computed points, one entry per prediction id.
pub async fn store_points(
    conn: &mut PgConnection,
    prediction_ids: &[Uuid],
    points: &[i32],
) -> Result<(), sqlx::Error> {
    if prediction_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
        UPDATE predictions p
        SET points_earned = v.points
        FROM UNNEST($1::uuid[], $2::int4[]) AS v(id, points)
        WHERE p.id = v.id
        "#,
    )
    .bind(prediction_ids)
    .bind(points)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn clear_points(conn: &mut PgConnection, fixture_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE predictions SET points_earned = NULL WHERE fixture_id = $1")
        .bind(fixture_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Drop points left on fixtures that no longer have a result.
pub async fn clear_points_on_unfinished(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE predictions p
        SET points_earned = NULL
        FROM fixtures f
        WHERE f.id = p.fixture_id AND f.status <> 'finished' AND p.points_earned IS NOT NULL
        "#,
    )
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

#[derive(Debug, Clone)]
pub struct PredictionQueries {
    pool: PgPool,
}

impl PredictionQueries {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<MyPrediction>, i64), sqlx::Error> {
        let items = sqlx::query_as::<_, MyPrediction>(
            r#"
            SELECT p.id, p.fixture_id, p.home_prediction, p.away_prediction, p.points_earned,
                   p.created_at, p.updated_at,
                   f.home_team AS fixture_home_team,
                   f.away_team AS fixture_away_team,
                   f.kickoff_time AS fixture_kickoff,
                   f.home_score AS fixture_home_score,
                   f.away_score AS fixture_away_score
            FROM predictions p
            JOIN fixtures f ON f.id = p.fixture_id
            WHERE p.user_id = $1
            ORDER BY f.kickoff_time DESC, f.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM predictions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((items, total))
    }

    /// Predictions of `user_id` on fixtures kicking off no later than `kickoff_cutoff`.
    pub async fn visible_for_user(
        &self,
        user_id: Uuid,
        kickoff_cutoff: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<MyPrediction>, i64), sqlx::Error> {
        let items = sqlx::query_as::<_, MyPrediction>(
            r#"
            SELECT p.id, p.fixture_id, p.home_prediction, p.away_prediction, p.points_earned,
                   p.created_at, p.updated_at,
                   f.home_team AS fixture_home_team,
                   f.away_team AS fixture_away_team,
                   f.kickoff_time AS fixture_kickoff,
                   f.home_score AS fixture_home_score,
                   f.away_score AS fixture_away_score
            FROM predictions p
            JOIN fixtures f ON f.id = p.fixture_id
            WHERE p.user_id = $1 AND f.kickoff_time <= $2
            ORDER BY f.kickoff_time DESC, f.id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(kickoff_cutoff)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM predictions p
            JOIN fixtures f ON f.id = p.fixture_id
            WHERE p.user_id = $1 AND f.kickoff_time <= $2
            "#,
        )
        .bind(user_id)
        .bind(kickoff_cutoff)
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total))
    }

    pub async fn for_fixture(
        &self,
        fixture_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<(Uuid, PublicPrediction)>, i64), sqlx::Error> {
        let rows = sqlx::query_as::<_, PublicPredictionRow>(
            r#"
            SELECT p.id, p.user_id, u.username, p.home_prediction, p.away_prediction,
                   p.points_earned, p.created_at
            FROM predictions p
            JOIN users u ON u.id = p.user_id
            WHERE p.fixture_id = $1
            ORDER BY p.points_earned DESC NULLS LAST, p.created_at ASC, p.id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(fixture_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM predictions WHERE fixture_id = $1")
            .bind(fixture_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(PublicPredictionRow::split).collect(), total))
    }

    /// Last `limit` scored points per user in the season, newest first.
    pub async fn recent_points(
        &self,
        season_id: Uuid,
        user_ids: &[Uuid],
        limit: i64,
    ) -> Result<HashMap<Uuid, Vec<i32>>, sqlx::Error> {
        let rows = sqlx::query_as::<_, RecentPointsRow>(
            r#"
            SELECT user_id, points FROM (
                SELECT p.user_id, p.points_earned AS points, f.kickoff_time, f.id AS fixture_id,
                       ROW_NUMBER() OVER (
                           PARTITION BY p.user_id ORDER BY f.kickoff_time DESC, f.id DESC
                       ) AS rn
                FROM predictions p
                JOIN fixtures f ON f.id = p.fixture_id
                WHERE f.season_id = $1
                  AND f.status = 'finished'
                  AND p.points_earned IS NOT NULL
                  AND p.user_id = ANY($2)
            ) recent
            WHERE rn <= $3
            ORDER BY user_id, kickoff_time DESC, fixture_id DESC
            "#,
        )
        .bind(season_id)
        .bind(user_ids)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut by_user: HashMap<Uuid, Vec<i32>> = HashMap::new();
        for row in rows {
            by_user.entry(row.user_id).or_default().push(row.points);
        }
        Ok(by_user)
    }
}

#[derive(Debug, FromRow)]
struct RecentPointsRow {
    user_id: Uuid,
    points: i32,
}

#[derive(Debug, FromRow)]
struct PublicPredictionRow {
    id: Uuid,
    user_id: Uuid,
    username: String,
    home_prediction: i32,
    away_prediction: i32,
    points_earned: Option<i32>,
    created_at: DateTime<Utc>,
}

impl PublicPredictionRow {
    fn split(self) -> (Uuid, PublicPrediction) {
        (
            self.user_id,
            PublicPrediction {
                id: self.id,
                username: self.username,
                home_prediction: self.home_prediction,
                away_prediction: self.away_prediction,
                points_earned: self.points_earned,
                created_at: self.created_at,
            },
        )
    }
}
