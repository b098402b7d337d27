use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::league::standings::RankedStanding;

#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct MiniLeague {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub invite_code: String,
    pub created_by: Uuid,
    pub season_id: Uuid,
    pub max_members: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateMiniLeagueRequest {
    #[validate(length(min = 1, max = 100, message = "League name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 2, max = 100, message = "A league holds between 2 and 100 members"))]
    pub max_members: Option<i32>,
}

/// A league as listed for one of its members.
#[derive(Debug, FromRow, Serialize, Deserialize)]
pub struct MiniLeagueSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub invite_code: String,
    pub created_by: Uuid,
    pub max_members: i32,
    pub member_count: i64,
    pub is_admin: bool,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MiniLeagueMembersResponse {
    pub league: MiniLeague,
    pub members: Vec<RankedStanding>,
}
