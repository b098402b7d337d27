use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::league::aggregate::UserAggregate;
use crate::league::standings::StandingRow;
use crate::models::common::PaginationQuery;

/// One `user_stats` row joined with the username.
#[derive(Debug, FromRow, Clone)]
pub struct UserStatsRow {
    pub user_id: Uuid,
    pub username: String,
    pub season_id: Uuid,
    pub total_points: i32,
    pub correct_scores: i32,
    pub correct_results: i32,
    pub predictions_made: i32,
    pub current_streak: i32,
    pub best_streak: i32,
    pub avg_points_per_game: f64,
    pub position: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

impl UserStatsRow {
    pub fn aggregate(&self) -> UserAggregate {
        UserAggregate {
            total_points: self.total_points,
            correct_scores: self.correct_scores,
            correct_results: self.correct_results,
            predictions_made: self.predictions_made,
            current_streak: self.current_streak,
            best_streak: self.best_streak,
            avg_points_per_game: self.avg_points_per_game,
        }
    }

    pub fn into_standing(self) -> StandingRow {
        let stats = self.aggregate();
        StandingRow {
            user_id: self.user_id,
            username: self.username,
            stats,
        }
    }
}

/// Points earned by one user on one finished fixture, used to build windowed tables.
#[derive(Debug, FromRow, Clone)]
pub struct ScoredPredictionRow {
    pub user_id: Uuid,
    pub username: String,
    pub points: i32,
}

#[derive(Debug, Deserialize, Default)]
pub struct LeaderboardQuery {
    pub season_id: Option<Uuid>,
    pub mini_league_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl LeaderboardQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct MiniLeagueFilter {
    pub mini_league_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: i64,
}
