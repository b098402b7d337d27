use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::config::game::GameSettings;
use crate::models::fixture::{
    CreateFixtureRequest, Fixture, FixtureResponse, FixtureStatus, ScoreChange,
    UpdateFixtureRequest,
};

const FIXTURE_COLUMNS: &str = "id, season_id, home_team, away_team, competition, kickoff_time, \
     original_kickoff_time, round, status, home_score, away_score, created_at, updated_at";

/// Fixture joined with its season name and prediction count.
#[derive(Debug, FromRow)]
pub struct FixtureListingRow {
    #[sqlx(flatten)]
    pub fixture: Fixture,
    pub season_name: String,
    pub predictions_count: i64,
}

impl FixtureListingRow {
    /// `next_fixture_id` is only consulted when predictions are limited to the next fixture.
    pub fn into_response(
        self,
        now: DateTime<Utc>,
        game: &GameSettings,
        next_fixture_id: Option<Uuid>,
    ) -> FixtureResponse {
        let window = self.fixture.prediction_window(game.deadline_minutes);
        let fixture = self.fixture;
        let can_predict = fixture.status == FixtureStatus::Scheduled
            && window.is_open_at(now)
            && (!game.next_fixture_only || next_fixture_id == Some(fixture.id));

        FixtureResponse {
            id: fixture.id,
            season_id: fixture.season_id,
            season: self.season_name,
            home_team: fixture.home_team,
            away_team: fixture.away_team,
            competition: fixture.competition,
            kickoff_time: fixture.kickoff_time,
            deadline: window.deadline,
            seconds_until_deadline: window.seconds_until_deadline(now),
            status: fixture.status,
            home_score: fixture.home_score,
            away_score: fixture.away_score,
            round: fixture.round,
            can_predict,
            predictions_count: self.predictions_count,
        }
    }
}

const LISTING_SELECT: &str = r#"
    SELECT f.id, f.season_id, f.home_team, f.away_team, f.competition, f.kickoff_time,
           f.original_kickoff_time, f.round, f.status, f.home_score, f.away_score,
           f.created_at, f.updated_at,
           s.name AS season_name,
           (SELECT COUNT(*) FROM predictions p WHERE p.fixture_id = f.id) AS predictions_count
    FROM fixtures f
    JOIN seasons s ON s.id = f.season_id
"#;

#[derive(Debug, Clone)]
pub struct FixtureQueries {
    pool: PgPool,
}

impl FixtureQueries {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, fixture_id: Uuid) -> Result<Option<Fixture>, sqlx::Error> {
        sqlx::query_as::<_, Fixture>(&format!("SELECT {} FROM fixtures WHERE id = $1", FIXTURE_COLUMNS))
            .bind(fixture_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_listing(&self, fixture_id: Uuid) -> Result<Option<FixtureListingRow>, sqlx::Error> {
        sqlx::query_as::<_, FixtureListingRow>(&format!("{} WHERE f.id = $1", LISTING_SELECT))
            .bind(fixture_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list_for_season(&self, season_id: Uuid) -> Result<Vec<FixtureListingRow>, sqlx::Error> {
        sqlx::query_as::<_, FixtureListingRow>(&format!(
            "{} WHERE f.season_id = $1 ORDER BY f.kickoff_time ASC, f.id ASC",
            LISTING_SELECT
        ))
        .bind(season_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn upcoming(
        &self,
        season_id: Uuid,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<FixtureListingRow>, sqlx::Error> {
        sqlx::query_as::<_, FixtureListingRow>(&format!(
            r#"{} WHERE f.season_id = $1 AND f.status = 'scheduled' AND f.kickoff_time > $2
               ORDER BY f.kickoff_time ASC, f.id ASC LIMIT $3"#,
            LISTING_SELECT
        ))
        .bind(season_id)
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn recent(&self, season_id: Uuid, limit: i64) -> Result<Vec<FixtureListingRow>, sqlx::Error> {
        sqlx::query_as::<_, FixtureListingRow>(&format!(
            r#"{} WHERE f.season_id = $1 AND f.status = 'finished'
               ORDER BY f.kickoff_time DESC, f.id DESC LIMIT $2"#,
            LISTING_SELECT
        ))
        .bind(season_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn next_fixture_id(
        &self,
        season_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        next_scheduled_fixture_id(&mut *self.pool.acquire().await?, season_id, now).await
    }

    pub async fn create(
        &self,
        season_id: Uuid,
        request: &CreateFixtureRequest,
    ) -> Result<Fixture, sqlx::Error> {
        sqlx::query_as::<_, Fixture>(&format!(
            r#"
            INSERT INTO fixtures (id, season_id, home_team, away_team, competition,
                                  kickoff_time, original_kickoff_time, round, status)
            VALUES ($1, $2, $3, $4, $5, $6, $6, $7, 'scheduled')
            RETURNING {}
            "#,
            FIXTURE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(season_id)
        .bind(request.home_team.trim())
        .bind(request.away_team.trim())
        .bind(request.competition)
        .bind(request.kickoff_time)
        .bind(request.round.as_deref())
        .fetch_one(&self.pool)
        .await
    }
}

pub async fn predictions_count(conn: &mut PgConnection, fixture_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM predictions WHERE fixture_id = $1")
        .bind(fixture_id)
        .fetch_one(conn)
        .await
}

/// Apply the fields present in `request`; absent fields keep their value.
///
/// The row is left alone (and `None` returned) when a status change targets a
/// finished fixture, or when details change on a fixture that has predictions.
pub async fn update_fixture(
    conn: &mut PgConnection,
    fixture_id: Uuid,
    request: &UpdateFixtureRequest,
) -> Result<Option<Fixture>, sqlx::Error> {
    sqlx::query_as::<_, Fixture>(&format!(
        r#"
        UPDATE fixtures SET
            home_team = COALESCE($2, home_team),
            away_team = COALESCE($3, away_team),
            competition = COALESCE($4, competition),
            kickoff_time = COALESCE($5, kickoff_time),
            status = COALESCE($6, status),
            round = COALESCE($7, round),
            updated_at = NOW()
        WHERE id = $1
          AND ($6::fixture_status IS NULL OR status <> 'finished')
          AND (NOT $8 OR NOT EXISTS (SELECT 1 FROM predictions WHERE fixture_id = $1))
        RETURNING {}
        "#,
        FIXTURE_COLUMNS
    ))
    .bind(fixture_id)
    .bind(request.home_team.as_deref().map(str::trim))
    .bind(request.away_team.as_deref().map(str::trim))
    .bind(request.competition)
    .bind(request.kickoff_time)
    .bind(request.status)
    .bind(request.round.as_deref())
    .bind(request.touches_details())
    .fetch_optional(conn)
    .await
}

/// Delete a fixture nobody has predicted. Returns false when nothing was deleted.
pub async fn delete_unpredicted_fixture(conn: &mut PgConnection, fixture_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM fixtures
        WHERE id = $1 AND NOT EXISTS (SELECT 1 FROM predictions WHERE fixture_id = $1)
        "#,
    )
    .bind(fixture_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fixtures_for_season(conn: &mut PgConnection, season_id: Uuid) -> Result<Vec<Fixture>, sqlx::Error> {
    sqlx::query_as::<_, Fixture>(&format!(
        "SELECT {} FROM fixtures WHERE season_id = $1 ORDER BY kickoff_time ASC, id ASC",
        FIXTURE_COLUMNS
    ))
    .bind(season_id)
    .fetch_all(conn)
    .await
}

/// Copy `template` into another season as an unplayed fixture.
pub async fn insert_cloned_fixture(
    conn: &mut PgConnection,
    season_id: Uuid,
    template: &Fixture,
    kickoff_time: DateTime<Utc>,
    original_kickoff_time: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO fixtures (id, season_id, home_team, away_team, competition,
                              kickoff_time, original_kickoff_time, round, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'scheduled')
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(season_id)
    .bind(&template.home_team)
    .bind(&template.away_team)
    .bind(template.competition)
    .bind(kickoff_time)
    .bind(original_kickoff_time)
    .bind(template.round.as_deref())
    .execute(conn)
    .await?;
    Ok(())
}

/// Lock the fixture row against concurrent score writers while a prediction is written.
pub async fn lock_fixture_for_share(
    conn: &mut PgConnection,
    fixture_id: Uuid,
) -> Result<Option<Fixture>, sqlx::Error> {
    sqlx::query_as::<_, Fixture>(&format!(
        "SELECT {} FROM fixtures WHERE id = $1 FOR SHARE",
        FIXTURE_COLUMNS
    ))
    .bind(fixture_id)
    .fetch_optional(conn)
    .await
}

pub async fn lock_fixture_for_update(
    conn: &mut PgConnection,
    fixture_id: Uuid,
) -> Result<Option<Fixture>, sqlx::Error> {
    sqlx::query_as::<_, Fixture>(&format!(
        "SELECT {} FROM fixtures WHERE id = $1 FOR UPDATE",
        FIXTURE_COLUMNS
    ))
    .bind(fixture_id)
    .fetch_optional(conn)
    .await
}

/// Earliest scheduled fixture of the season that has not kicked off yet.
pub async fn next_scheduled_fixture_id(
    conn: &mut PgConnection,
    season_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id FROM fixtures
        WHERE season_id = $1 AND status = 'scheduled' AND kickoff_time > $2
        ORDER BY kickoff_time ASC, id ASC
        LIMIT 1
        "#,
    )
    .bind(season_id)
    .bind(now)
    .fetch_optional(conn)
    .await
}

pub async fn set_result(
    conn: &mut PgConnection,
    fixture_id: Uuid,
    status: FixtureStatus,
    home_score: Option<i32>,
    away_score: Option<i32>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE fixtures
        SET status = $2, home_score = $3, away_score = $4, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(fixture_id)
    .bind(status)
    .bind(home_score)
    .bind(away_score)
    .execute(conn)
    .await?;
    Ok(())
}

/// Journal the fixture's current state so the next score change can be undone.
pub async fn record_score_change(
    conn: &mut PgConnection,
    fixture: &Fixture,
    simulated: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO fixture_score_changes
            (id, fixture_id, previous_status, previous_home_score, previous_away_score, simulated)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(fixture.id)
    .bind(fixture.status)
    .bind(fixture.home_score)
    .bind(fixture.away_score)
    .bind(simulated)
    .execute(conn)
    .await?;
    Ok(())
}

/// Remove and return the most recent journal entry of the fixture.
pub async fn pop_score_change(
    conn: &mut PgConnection,
    fixture_id: Uuid,
) -> Result<Option<ScoreChange>, sqlx::Error> {
    sqlx::query_as::<_, ScoreChange>(
        r#"
        DELETE FROM fixture_score_changes
        WHERE id = (
            SELECT id FROM fixture_score_changes
            WHERE fixture_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
        )
        RETURNING id, fixture_id, previous_status, previous_home_score, previous_away_score,
                  simulated, created_at
        "#,
    )
    .bind(fixture_id)
    .fetch_optional(conn)
    .await
}

pub async fn finished_fixtures(conn: &mut PgConnection) -> Result<Vec<Fixture>, sqlx::Error> {
    sqlx::query_as::<_, Fixture>(&format!(
        "SELECT {} FROM fixtures WHERE status = 'finished' ORDER BY kickoff_time ASC, id ASC FOR UPDATE",
        FIXTURE_COLUMNS
    ))
    .fetch_all(conn)
    .await
}

/// Headline counts for the admin dashboard.
#[derive(Debug, FromRow, serde::Serialize)]
pub struct FixtureCounts {
    pub total_fixtures: i64,
    pub upcoming_fixtures: i64,
    pub completed_fixtures: i64,
}

pub async fn fixture_counts(pool: &PgPool, now: DateTime<Utc>) -> Result<FixtureCounts, sqlx::Error> {
    sqlx::query_as::<_, FixtureCounts>(
        r#"
        SELECT
            COUNT(*) AS total_fixtures,
            COUNT(*) FILTER (WHERE status = 'scheduled' AND kickoff_time > $1) AS upcoming_fixtures,
            COUNT(*) FILTER (WHERE status = 'finished') AS completed_fixtures
        FROM fixtures
        "#,
    )
    .bind(now)
    .fetch_one(pool)
    .await
}
