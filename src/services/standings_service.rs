use std::collections::HashMap;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::db::stats_queries;
use crate::league::aggregate::UserAggregate;
use crate::league::standings::{rank_standings, RankedStanding, StandingRow};
use crate::models::leaderboard::{ScoredPredictionRow, UserStatsRow};

/// Number of finished fixtures that make up the form table.
pub const FORM_WINDOW_FIXTURES: i64 = 5;

#[derive(Debug, Clone)]
pub struct StandingsService {
    pool: PgPool,
}

impl StandingsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Season table, or the table of one mini league with positions relative to its members.
    pub async fn leaderboard(
        &self,
        season_id: Uuid,
        mini_league_id: Option<Uuid>,
    ) -> Result<Vec<RankedStanding>, sqlx::Error> {
        let rows = match mini_league_id {
            Some(league_id) => stats_queries::mini_league_stats(&self.pool, season_id, league_id).await?,
            None => {
                let mut conn = self.pool.acquire().await?;
                stats_queries::season_stats(&mut conn, season_id).await?
            }
        };
        Ok(rank_rows(rows))
    }

    pub async fn user_entry(
        &self,
        season_id: Uuid,
        user_id: Uuid,
        mini_league_id: Option<Uuid>,
    ) -> Result<Option<RankedStanding>, sqlx::Error> {
        let table = self.leaderboard(season_id, mini_league_id).await?;
        Ok(table.into_iter().find(|entry| entry.user_id == user_id))
    }

    /// Table over the last few finished fixtures of the season.
    pub async fn form_table(&self, season_id: Uuid, limit: usize) -> Result<Vec<RankedStanding>, sqlx::Error> {
        let rows = stats_queries::points_on_last_fixtures(&self.pool, season_id, FORM_WINDOW_FIXTURES).await?;
        let mut table = windowed_table(rows);
        table.truncate(limit);
        Ok(table)
    }

    /// Table over the fixtures finished in the calendar month of `now`.
    pub async fn month_table(
        &self,
        season_id: Uuid,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<RankedStanding>, sqlx::Error> {
        let (from, to) = month_bounds(now);
        let rows = stats_queries::points_between(&self.pool, season_id, from, to).await?;
        let mut table = windowed_table(rows);
        table.truncate(limit);
        Ok(table)
    }
}

fn rank_rows(rows: Vec<UserStatsRow>) -> Vec<RankedStanding> {
    rank_standings(rows.into_iter().map(UserStatsRow::into_standing).collect())
}

/// Rank users by an aggregate over a window of scored predictions.
///
/// `rows` must be ordered oldest fixture first so streaks come out right.
pub fn windowed_table(rows: Vec<ScoredPredictionRow>) -> Vec<RankedStanding> {
    let mut per_user: HashMap<Uuid, (String, Vec<i32>)> = HashMap::new();
    for row in rows {
        per_user
            .entry(row.user_id)
            .or_insert_with(|| (row.username, Vec::new()))
            .1
            .push(row.points);
    }

    let standings = per_user
        .into_iter()
        .map(|(user_id, (username, points))| StandingRow {
            user_id,
            username,
            stats: UserAggregate::from_points(points),
        })
        .collect();

    rank_standings(standings)
}

/// First instant of the month containing `now` and of the month after it.
pub fn month_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let first_day = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .unwrap_or_else(|| now.date_naive());
    let start = first_day.and_time(chrono::NaiveTime::MIN).and_utc();
    let end = start.checked_add_months(Months::new(1)).unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

/// Persist positions for the season from the current aggregates.
///
/// Only users with a scored prediction get a position; everyone else keeps NULL.
pub async fn refresh_positions(conn: &mut PgConnection, season_id: Uuid) -> Result<(), sqlx::Error> {
    let rows = stats_queries::season_stats(conn, season_id).await?;
    let ranked: Vec<RankedStanding> = rank_rows(rows)
        .into_iter()
        .filter(|entry| entry.stats.has_predictions())
        .collect();

    let user_ids: Vec<Uuid> = ranked.iter().map(|entry| entry.user_id).collect();
    let positions: Vec<i32> = ranked.iter().map(|entry| entry.position).collect();
    stats_queries::store_positions(conn, season_id, &user_ids, &positions).await
}
