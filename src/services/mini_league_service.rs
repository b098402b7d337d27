use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::config::game::GameSettings;
use crate::db::{mini_league_queries, season_queries};
use crate::league::invite::{generate_invite_code, is_well_formed_invite_code, normalize_invite_code};
use crate::league::standings::RankedStanding;
use crate::models::mini_league::{CreateMiniLeagueRequest, MiniLeague};
use crate::services::standings_service::StandingsService;

const INVITE_CODE_ATTEMPTS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum MiniLeagueError {
    #[error("Mini league not found")]
    NotFound,

    #[error("No active season")]
    NoCurrentSeason,

    #[error("You can be a member of at most {0} mini leagues")]
    MembershipLimit(i64),

    #[error("This mini league is no longer active")]
    Inactive,

    #[error("This mini league is full")]
    Full,

    #[error("You are already a member of this mini league")]
    AlreadyMember,

    #[error("You are not a member of this mini league")]
    NotMember,

    #[error("Only the creator can delete this mini league")]
    NotCreator,

    #[error("The creator cannot leave while other members remain")]
    CreatorCannotLeave,

    #[error("Could not generate a unique invite code")]
    InviteCodeExhausted,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Serialize)]
pub struct LeaveOutcome {
    pub league_id: Uuid,
    pub league_deleted: bool,
}

#[derive(Debug, Clone)]
pub struct MiniLeagueService {
    pool: PgPool,
    game: GameSettings,
}

impl MiniLeagueService {
    pub fn new(pool: PgPool, game: GameSettings) -> Self {
        Self { pool, game }
    }

    #[tracing::instrument(name = "Create mini league", skip(self, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreateMiniLeagueRequest,
    ) -> Result<MiniLeague, MiniLeagueError> {
        let mut tx = self.pool.begin().await?;

        let season = season_queries::current_season(&mut tx)
            .await?
            .ok_or(MiniLeagueError::NoCurrentSeason)?;
        self.check_membership_limit(&mut tx, user_id, season.id).await?;

        let invite_code = unique_invite_code(&mut tx).await?;
        let league = mini_league_queries::insert_league(
            &mut tx,
            request.name.trim(),
            request.description.as_deref().map(str::trim),
            &invite_code,
            user_id,
            season.id,
            request.max_members.unwrap_or(self.game.default_mini_league_size),
        )
        .await?;
        mini_league_queries::add_member(&mut tx, league.id, user_id, true).await?;

        tx.commit().await?;

        tracing::info!("Mini league {} created with code {}", league.id, league.invite_code);
        Ok(league)
    }

    #[tracing::instrument(name = "Join mini league", skip(self))]
    pub async fn join(&self, user_id: Uuid, code: &str) -> Result<MiniLeague, MiniLeagueError> {
        let code = normalize_invite_code(code);
        if !is_well_formed_invite_code(&code) {
            return Err(MiniLeagueError::NotFound);
        }

        let mut tx = self.pool.begin().await?;

        let league = mini_league_queries::lock_league_by_code(&mut tx, &code)
            .await?
            .ok_or(MiniLeagueError::NotFound)?;
        if !league.is_active {
            return Err(MiniLeagueError::Inactive);
        }
        if mini_league_queries::is_member(&mut tx, league.id, user_id).await? {
            return Err(MiniLeagueError::AlreadyMember);
        }
        if mini_league_queries::member_count(&mut tx, league.id).await? >= league.max_members as i64 {
            return Err(MiniLeagueError::Full);
        }
        self.check_membership_limit(&mut tx, user_id, league.season_id).await?;

        mini_league_queries::add_member(&mut tx, league.id, user_id, false).await?;
        tx.commit().await?;

        Ok(league)
    }

    /// Leave a league. A creator may only leave an otherwise empty league, which is then deleted.
    #[tracing::instrument(name = "Leave mini league", skip(self))]
    pub async fn leave(&self, user_id: Uuid, league_id: Uuid) -> Result<LeaveOutcome, MiniLeagueError> {
        let mut tx = self.pool.begin().await?;

        let league = mini_league_queries::lock_league(&mut tx, league_id)
            .await?
            .ok_or(MiniLeagueError::NotFound)?;
        if !mini_league_queries::is_member(&mut tx, league_id, user_id).await? {
            return Err(MiniLeagueError::NotMember);
        }

        let league_deleted = if league.created_by == user_id {
            if mini_league_queries::member_count(&mut tx, league_id).await? > 1 {
                return Err(MiniLeagueError::CreatorCannotLeave);
            }
            mini_league_queries::delete_league(&mut tx, league_id).await?;
            true
        } else {
            mini_league_queries::remove_member(&mut tx, league_id, user_id).await?;
            false
        };

        tx.commit().await?;
        Ok(LeaveOutcome { league_id, league_deleted })
    }

    #[tracing::instrument(name = "Delete mini league", skip(self))]
    pub async fn delete(&self, user_id: Uuid, league_id: Uuid) -> Result<(), MiniLeagueError> {
        let mut tx = self.pool.begin().await?;

        let league = mini_league_queries::lock_league(&mut tx, league_id)
            .await?
            .ok_or(MiniLeagueError::NotFound)?;
        if league.created_by != user_id {
            return Err(MiniLeagueError::NotCreator);
        }
        mini_league_queries::delete_league(&mut tx, league_id).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Members ranked against each other. Only members may look.
    pub async fn ranked_members(
        &self,
        user_id: Uuid,
        league_id: Uuid,
    ) -> Result<(MiniLeague, Vec<RankedStanding>), MiniLeagueError> {
        let league = mini_league_queries::league_by_id(&self.pool, league_id)
            .await?
            .ok_or(MiniLeagueError::NotFound)?;

        let mut conn = self.pool.acquire().await?;
        if !mini_league_queries::is_member(&mut conn, league_id, user_id).await? {
            return Err(MiniLeagueError::NotMember);
        }
        drop(conn);

        let members = StandingsService::new(self.pool.clone())
            .leaderboard(league.season_id, Some(league.id))
            .await?;
        Ok((league, members))
    }

    async fn check_membership_limit(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        season_id: Uuid,
    ) -> Result<(), MiniLeagueError> {
        let memberships = mini_league_queries::membership_count(conn, user_id, season_id).await?;
        if memberships >= self.game.max_leagues_per_user {
            return Err(MiniLeagueError::MembershipLimit(self.game.max_leagues_per_user));
        }
        Ok(())
    }
}

async fn unique_invite_code(conn: &mut PgConnection) -> Result<String, MiniLeagueError> {
    for _ in 0..INVITE_CODE_ATTEMPTS {
        let code = generate_invite_code(&mut rand::thread_rng());
        if !mini_league_queries::invite_code_taken(conn, &code).await? {
            return Ok(code);
        }
    }
    Err(MiniLeagueError::InviteCodeExhausted)
}
