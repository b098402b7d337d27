use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{mini_league_queries, stats_queries, user_queries};
use crate::models::user::{
    DeletionPreview, DeletionSummary, OwnedLeaguePreview, UpdateProfileRequest, User,
};
use crate::services::standings_service::refresh_positions;
use crate::utils::email_token::{generate_verification_token, hash_token, VERIFICATION_TOKEN_TTL_HOURS};
use crate::utils::password::{hash_password, verify_password};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("User not found")]
    NotFound,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Current password is incorrect")]
    IncorrectCurrentPassword,

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Self-service account management for the signed-in user.
#[derive(Debug, Clone)]
pub struct AccountService {
    pool: PgPool,
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Change username and/or email. A new email needs verifying again.
    #[tracing::instrument(name = "Update profile", skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: &UpdateProfileRequest,
    ) -> Result<User, AccountError> {
        let mut tx = self.pool.begin().await?;
        let user = user_queries::lock_user(&mut tx, user_id)
            .await?
            .ok_or(AccountError::NotFound)?;

        let username = request
            .username
            .as_deref()
            .map(str::trim)
            .filter(|name| *name != user.username);
        let email = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.eq_ignore_ascii_case(&user.email));

        if let Some(name) = username {
            if user_queries::username_taken_by_other(&mut tx, user_id, name).await? {
                return Err(AccountError::UsernameTaken);
            }
        }
        if let Some(address) = email {
            if user_queries::email_taken_by_other(&mut tx, user_id, address).await? {
                return Err(AccountError::EmailTaken);
            }
        }
        if username.is_none() && email.is_none() {
            return Ok(user);
        }

        let updated = user_queries::update_profile(&mut tx, user_id, username, email)
            .await
            .map_err(|e| {
                // Lost a race against another rename or registration
                let constraint = e
                    .as_database_error()
                    .and_then(|db| db.constraint())
                    .map(str::to_owned);
                match constraint.as_deref() {
                    Some("users_username_key") => AccountError::UsernameTaken,
                    Some("users_email_key") => AccountError::EmailTaken,
                    _ => AccountError::Database(e),
                }
            })?;

        let token = email.map(|_| generate_verification_token());
        if let Some(token) = &token {
            let expires_at = Utc::now() + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS);
            user_queries::store_verification_token(&mut tx, user_id, &hash_token(token), expires_at).await?;
        }
        tx.commit().await?;

        if let Some(token) = token {
            tracing::debug!("Email verification token for {}: {}", updated.username, token);
        }
        tracing::info!("Updated profile of {}", updated.username);
        Ok(updated)
    }

    #[tracing::instrument(name = "Change password", skip(self, current, new))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current: &SecretString,
        new: &SecretString,
    ) -> Result<(), AccountError> {
        let mut tx = self.pool.begin().await?;
        let user = user_queries::lock_user(&mut tx, user_id)
            .await?
            .ok_or(AccountError::NotFound)?;

        if !verify_password(current.expose_secret(), &user.password_hash) {
            return Err(AccountError::IncorrectCurrentPassword);
        }
        let password_hash = hash_password(new.expose_secret())?;
        user_queries::set_password_hash(&mut tx, user_id, &password_hash).await?;
        tx.commit().await?;

        tracing::info!("Password changed for {}", user.username);
        Ok(())
    }

    /// What deleting the account would remove or hand over.
    pub async fn deletion_preview(&self, user_id: Uuid) -> Result<DeletionPreview, AccountError> {
        let mut conn = self.pool.acquire().await?;
        let user = user_queries::UserQueries::new(self.pool.clone())
            .by_id(user_id)
            .await?
            .ok_or(AccountError::NotFound)?;
        let footprint = user_queries::account_footprint(&mut conn, user_id).await?;
        let created_leagues = mini_league_queries::leagues_created_by(&mut conn, user_id)
            .await?
            .into_iter()
            .map(OwnedLeaguePreview::from)
            .collect();

        Ok(DeletionPreview {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            footprint,
            created_leagues,
        })
    }

    /// Delete the account after checking the password.
    ///
    /// Leagues the user created pass to their longest-standing other member,
    /// or are deleted when nobody else is in them. Positions of every season
    /// the user had stats in are recomputed without them.
    #[tracing::instrument(name = "Delete account", skip(self, password))]
    pub async fn delete_account(
        &self,
        user_id: Uuid,
        password: &SecretString,
    ) -> Result<DeletionSummary, AccountError> {
        let mut tx = self.pool.begin().await?;
        let user = user_queries::lock_user(&mut tx, user_id)
            .await?
            .ok_or(AccountError::NotFound)?;

        if !verify_password(password.expose_secret(), &user.password_hash) {
            return Err(AccountError::IncorrectPassword);
        }

        let footprint = user_queries::account_footprint(&mut tx, user_id).await?;

        let mut transferred = 0;
        let mut deleted = 0;
        for league in mini_league_queries::leagues_created_by(&mut tx, user_id).await? {
            mini_league_queries::lock_league(&mut tx, league.id).await?;
            match mini_league_queries::successor(&mut tx, league.id, user_id).await? {
                Some(new_owner) => {
                    mini_league_queries::transfer_ownership(&mut tx, league.id, new_owner).await?;
                    tracing::info!("Mini league {} passed to {}", league.name, new_owner);
                    transferred += 1;
                }
                None => {
                    mini_league_queries::delete_league(&mut tx, league.id).await?;
                    deleted += 1;
                }
            }
        }

        let seasons = stats_queries::seasons_for_user(&mut tx, user_id).await?;
        if !user_queries::delete_user(&mut tx, user_id).await? {
            return Err(AccountError::NotFound);
        }
        for season_id in seasons {
            refresh_positions(&mut tx, season_id).await?;
        }
        tx.commit().await?;

        tracing::info!("Deleted account {}", user.username);
        Ok(DeletionSummary {
            username: user.username,
            footprint,
            mini_leagues_transferred: transferred,
            mini_leagues_deleted: deleted,
        })
    }
}
