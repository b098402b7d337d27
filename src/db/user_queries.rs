use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::user::{AccountFootprint, User, UserRole, UserStatus};

const USER_COLUMNS: &str =
    "id, email, username, password_hash, role, status, email_verified, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct UserQueries {
    pool: PgPool,
}

impl UserQueries {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    /// Username or email already registered.
    pub async fn find_conflict(&self, username: &str, email: &str) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM users WHERE username = $1 OR LOWER(email) = LOWER($2) LIMIT 1",
        )
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn set_role(&self, user_id: Uuid, role: UserRole) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
    }

    /// Mark the owner of a valid, unexpired token as verified and consume the token.
    pub async fn verify_email(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            DELETE FROM email_verifications
            WHERE token_hash = $1 AND expires_at > $2
            RETURNING user_id
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(user_id) = user_id {
            sqlx::query("UPDATE users SET email_verified = TRUE, updated_at = NOW() WHERE id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(user_id)
    }

    pub async fn total_users(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
    }

    /// Users who created or changed a prediction since `since`.
    pub async fn active_since(&self, since: DateTime<Utc>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT user_id) FROM predictions WHERE updated_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn total_predictions(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM predictions")
            .fetch_one(&self.pool)
            .await
    }
}

pub async fn insert_user(
    conn: &mut PgConnection,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, username, email, password_hash, role, status, email_verified)
        VALUES ($1, $2, $3, $4, 'user', 'active', FALSE)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(conn)
    .await
}

/// Replace any pending verification token of the user.
pub async fn store_verification_token(
    conn: &mut PgConnection,
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO email_verifications (user_id, token_hash, expires_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE
        SET token_hash = EXCLUDED.token_hash, expires_at = EXCLUDED.expires_at, created_at = NOW()
        "#,
    )
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Verification flag and account status, read inside a write transaction.
pub async fn account_state(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Option<(bool, UserStatus)>, sqlx::Error> {
    sqlx::query_as::<_, (bool, UserStatus)>(
        "SELECT email_verified, status FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

/// Stored role and status, checked on every admin request.
pub async fn access_level(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<(UserRole, UserStatus)>, sqlx::Error> {
    sqlx::query_as::<_, (UserRole, UserStatus)>("SELECT role, status FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn lock_user(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1 FOR UPDATE", USER_COLUMNS))
        .bind(user_id)
        .fetch_optional(conn)
        .await
}

pub async fn username_taken_by_other(
    conn: &mut PgConnection,
    user_id: Uuid,
    username: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $2 AND id <> $1)")
        .bind(user_id)
        .bind(username)
        .fetch_one(conn)
        .await
}

pub async fn email_taken_by_other(
    conn: &mut PgConnection,
    user_id: Uuid,
    email: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($2) AND id <> $1)",
    )
    .bind(user_id)
    .bind(email)
    .fetch_one(conn)
    .await
}

/// Apply a profile change. A new email address drops the verified flag.
pub async fn update_profile(
    conn: &mut PgConnection,
    user_id: Uuid,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET username = COALESCE($2, username),
            email = COALESCE($3, email),
            email_verified = email_verified AND $3::text IS NULL,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(user_id)
    .bind(username)
    .bind(email)
    .fetch_one(conn)
    .await
}

pub async fn set_password_hash(
    conn: &mut PgConnection,
    user_id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(password_hash)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn account_footprint(conn: &mut PgConnection, user_id: Uuid) -> Result<AccountFootprint, sqlx::Error> {
    sqlx::query_as::<_, AccountFootprint>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM predictions WHERE user_id = $1) AS predictions,
            (SELECT COUNT(*) FROM user_stats WHERE user_id = $1) AS user_stats,
            (SELECT COUNT(*) FROM mini_league_members WHERE user_id = $1) AS mini_league_memberships
        "#,
    )
    .bind(user_id)
    .fetch_one(conn)
    .await
}

/// Removes the user; predictions, stats, memberships and tokens cascade.
pub async fn delete_user(conn: &mut PgConnection, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
