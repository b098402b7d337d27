use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::league::aggregate::UserAggregate;
use crate::models::leaderboard::{ScoredPredictionRow, UserStatsRow};

/// Points of every scored prediction of the user in the season, oldest fixture first.
pub async fn scored_points(
    conn: &mut PgConnection,
    user_id: Uuid,
    season_id: Uuid,
) -> Result<Vec<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"
        SELECT p.points_earned
        FROM predictions p
        JOIN fixtures f ON f.id = p.fixture_id
        WHERE p.user_id = $1
          AND f.season_id = $2
          AND f.status = 'finished'
          AND p.points_earned IS NOT NULL
        ORDER BY f.kickoff_time ASC, f.id ASC
        "#,
    )
    .bind(user_id)
    .bind(season_id)
    .fetch_all(conn)
    .await
}

/// Zero row created the first time a user predicts in a season.
pub async fn ensure_stats_row(
    conn: &mut PgConnection,
    user_id: Uuid,
    season_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO user_stats (id, user_id, season_id)
        VALUES ($1, $2, $3)
        ON CONFLICT ON CONSTRAINT user_season_stats DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(season_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn upsert_stats(
    conn: &mut PgConnection,
    user_id: Uuid,
    season_id: Uuid,
    stats: &UserAggregate,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO user_stats (id, user_id, season_id, total_points, correct_scores,
                                correct_results, predictions_made, current_streak,
                                best_streak, avg_points_per_game)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT ON CONSTRAINT user_season_stats DO UPDATE
        SET total_points = EXCLUDED.total_points,
            correct_scores = EXCLUDED.correct_scores,
            correct_results = EXCLUDED.correct_results,
            predictions_made = EXCLUDED.predictions_made,
            current_streak = EXCLUDED.current_streak,
            best_streak = EXCLUDED.best_streak,
            avg_points_per_game = EXCLUDED.avg_points_per_game,
            updated_at = NOW()
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(season_id)
    .bind(stats.total_points)
    .bind(stats.correct_scores)
    .bind(stats.correct_results)
    .bind(stats.predictions_made)
    .bind(stats.current_streak)
    .bind(stats.best_streak)
    .bind(stats.avg_points_per_game)
    .execute(conn)
    .await?;
    Ok(())
}

/// Every user holding a stats row or a prediction in the season.
pub async fn season_participants(
    conn: &mut PgConnection,
    season_id: Uuid,
) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT user_id FROM user_stats WHERE season_id = $1
        UNION
        SELECT p.user_id FROM predictions p
        JOIN fixtures f ON f.id = p.fixture_id
        WHERE f.season_id = $1
        "#,
    )
    .bind(season_id)
    .fetch_all(conn)
    .await
}

pub async fn seasons_with_activity(conn: &mut PgConnection) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT season_id FROM user_stats
        UNION
        SELECT f.season_id FROM predictions p JOIN fixtures f ON f.id = p.fixture_id
        "#,
    )
    .fetch_all(conn)
    .await
}

pub async fn seasons_for_user(conn: &mut PgConnection, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>("SELECT season_id FROM user_stats WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(conn)
        .await
}

const STATS_SELECT: &str = r#"
    SELECT us.user_id, u.username, us.season_id, us.total_points, us.correct_scores,
           us.correct_results, us.predictions_made, us.current_streak, us.best_streak,
           us.avg_points_per_game, us.position, us.updated_at
    FROM user_stats us
    JOIN users u ON u.id = us.user_id
"#;

/// All stats rows of the season.
pub async fn season_stats(
    conn: &mut PgConnection,
    season_id: Uuid,
) -> Result<Vec<UserStatsRow>, sqlx::Error> {
    sqlx::query_as::<_, UserStatsRow>(&format!("{} WHERE us.season_id = $1", STATS_SELECT))
        .bind(season_id)
        .fetch_all(conn)
        .await
}

/// Members of a mini league with their season stats; members without a row count as zero.
pub async fn mini_league_stats(
    pool: &PgPool,
    season_id: Uuid,
    mini_league_id: Uuid,
) -> Result<Vec<UserStatsRow>, sqlx::Error> {
    sqlx::query_as::<_, UserStatsRow>(
        r#"
        SELECT m.user_id, u.username, $1::uuid AS season_id,
               COALESCE(us.total_points, 0) AS total_points,
               COALESCE(us.correct_scores, 0) AS correct_scores,
               COALESCE(us.correct_results, 0) AS correct_results,
               COALESCE(us.predictions_made, 0) AS predictions_made,
               COALESCE(us.current_streak, 0) AS current_streak,
               COALESCE(us.best_streak, 0) AS best_streak,
               COALESCE(us.avg_points_per_game, 0) AS avg_points_per_game,
               us.position,
               COALESCE(us.updated_at, m.joined_at) AS updated_at
        FROM mini_league_members m
        JOIN users u ON u.id = m.user_id
        LEFT JOIN user_stats us ON us.user_id = m.user_id AND us.season_id = $1
        WHERE m.mini_league_id = $2
        "#,
    )
    .bind(season_id)
    .bind(mini_league_id)
    .fetch_all(pool)
    .await
}

pub async fn user_stats(
    pool: &PgPool,
    user_id: Uuid,
    season_id: Uuid,
) -> Result<Option<UserStatsRow>, sqlx::Error> {
    sqlx::query_as::<_, UserStatsRow>(&format!(
        "{} WHERE us.user_id = $1 AND us.season_id = $2",
        STATS_SELECT
    ))
    .bind(user_id)
    .bind(season_id)
    .fetch_optional(pool)
    .await
}

pub async fn stats_for_users(
    pool: &PgPool,
    season_id: Uuid,
    user_ids: &[Uuid],
) -> Result<Vec<UserStatsRow>, sqlx::Error> {
    sqlx::query_as::<_, UserStatsRow>(&format!(
        "{} WHERE us.season_id = $1 AND us.user_id = ANY($2)",
        STATS_SELECT
    ))
    .bind(season_id)
    .bind(user_ids)
    .fetch_all(pool)
    .await
}

/// Persist positions for the season. Users missing from `user_ids` get no position.
pub async fn store_positions(
    conn: &mut PgConnection,
    season_id: Uuid,
    user_ids: &[Uuid],
    positions: &[i32],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE user_stats us
        SET position = v.position
        FROM (
            SELECT s.user_id, r.position
            FROM user_stats s
            LEFT JOIN UNNEST($2::uuid[], $3::int4[]) AS r(user_id, position)
                ON r.user_id = s.user_id
            WHERE s.season_id = $1
        ) v
        WHERE us.season_id = $1
          AND us.user_id = v.user_id
          AND us.position IS DISTINCT FROM v.position
        "#,
    )
    .bind(season_id)
    .bind(user_ids)
    .bind(positions)
    .execute(conn)
    .await?;
    Ok(())
}

/// Scored predictions on the season's `count` most recently finished fixtures, oldest first.
pub async fn points_on_last_fixtures(
    pool: &PgPool,
    season_id: Uuid,
    count: i64,
) -> Result<Vec<ScoredPredictionRow>, sqlx::Error> {
    sqlx::query_as::<_, ScoredPredictionRow>(
        r#"
        WITH window_fixtures AS (
            SELECT id, kickoff_time FROM fixtures
            WHERE season_id = $1 AND status = 'finished'
            ORDER BY kickoff_time DESC, id DESC
            LIMIT $2
        )
        SELECT p.user_id, u.username, p.points_earned AS points
        FROM predictions p
        JOIN window_fixtures wf ON wf.id = p.fixture_id
        JOIN users u ON u.id = p.user_id
        WHERE p.points_earned IS NOT NULL
        ORDER BY wf.kickoff_time ASC, wf.id ASC
        "#,
    )
    .bind(season_id)
    .bind(count)
    .fetch_all(pool)
    .await
}

/// Scored predictions on the season's finished fixtures kicking off in `[from, to)`, oldest first.
pub async fn points_between(
    pool: &PgPool,
    season_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<ScoredPredictionRow>, sqlx::Error> {
    sqlx::query_as::<_, ScoredPredictionRow>(
        r#"
        SELECT p.user_id, u.username, p.points_earned AS points
        FROM predictions p
        JOIN fixtures f ON f.id = p.fixture_id
        JOIN users u ON u.id = p.user_id
        WHERE f.season_id = $1
          AND f.status = 'finished'
          AND f.kickoff_time >= $2
          AND f.kickoff_time < $3
          AND p.points_earned IS NOT NULL
        ORDER BY f.kickoff_time ASC, f.id ASC
        "#,
    )
    .bind(season_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}
