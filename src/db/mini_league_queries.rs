use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::mini_league::{MiniLeague, MiniLeagueSummary};
use crate::models::user::OwnedLeague;

const LEAGUE_COLUMNS: &str =
    "id, name, description, invite_code, created_by, season_id, max_members, is_active, created_at";

pub async fn league_by_id(pool: &PgPool, league_id: Uuid) -> Result<Option<MiniLeague>, sqlx::Error> {
    sqlx::query_as::<_, MiniLeague>(&format!("SELECT {} FROM mini_leagues WHERE id = $1", LEAGUE_COLUMNS))
        .bind(league_id)
        .fetch_optional(pool)
        .await
}

pub async fn lock_league(
    conn: &mut PgConnection,
    league_id: Uuid,
) -> Result<Option<MiniLeague>, sqlx::Error> {
    sqlx::query_as::<_, MiniLeague>(&format!(
        "SELECT {} FROM mini_leagues WHERE id = $1 FOR UPDATE",
        LEAGUE_COLUMNS
    ))
    .bind(league_id)
    .fetch_optional(conn)
    .await
}

pub async fn lock_league_by_code(
    conn: &mut PgConnection,
    invite_code: &str,
) -> Result<Option<MiniLeague>, sqlx::Error> {
    sqlx::query_as::<_, MiniLeague>(&format!(
        "SELECT {} FROM mini_leagues WHERE invite_code = $1 FOR UPDATE",
        LEAGUE_COLUMNS
    ))
    .bind(invite_code)
    .fetch_optional(conn)
    .await
}

pub async fn invite_code_taken(conn: &mut PgConnection, invite_code: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM mini_leagues WHERE invite_code = $1)")
        .bind(invite_code)
        .fetch_one(conn)
        .await
}

pub async fn insert_league(
    conn: &mut PgConnection,
    name: &str,
    description: Option<&str>,
    invite_code: &str,
    created_by: Uuid,
    season_id: Uuid,
    max_members: i32,
) -> Result<MiniLeague, sqlx::Error> {
    sqlx::query_as::<_, MiniLeague>(&format!(
        r#"
        INSERT INTO mini_leagues (id, name, description, invite_code, created_by, season_id, max_members)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {}
        "#,
        LEAGUE_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .bind(invite_code)
    .bind(created_by)
    .bind(season_id)
    .bind(max_members)
    .fetch_one(conn)
    .await
}

pub async fn delete_league(conn: &mut PgConnection, league_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM mini_leagues WHERE id = $1")
        .bind(league_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn add_member(
    conn: &mut PgConnection,
    league_id: Uuid,
    user_id: Uuid,
    is_admin: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO mini_league_members (mini_league_id, user_id, is_admin) VALUES ($1, $2, $3)",
    )
    .bind(league_id)
    .bind(user_id)
    .bind(is_admin)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn remove_member(conn: &mut PgConnection, league_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM mini_league_members WHERE mini_league_id = $1 AND user_id = $2")
        .bind(league_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn is_member(conn: &mut PgConnection, league_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM mini_league_members WHERE mini_league_id = $1 AND user_id = $2)",
    )
    .bind(league_id)
    .bind(user_id)
    .fetch_one(conn)
    .await
}

pub async fn member_count(conn: &mut PgConnection, league_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM mini_league_members WHERE mini_league_id = $1")
        .bind(league_id)
        .fetch_one(conn)
        .await
}

/// Active leagues of the season the user belongs to.
pub async fn membership_count(
    conn: &mut PgConnection,
    user_id: Uuid,
    season_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM mini_league_members m
        JOIN mini_leagues l ON l.id = m.mini_league_id
        WHERE m.user_id = $1 AND l.season_id = $2 AND l.is_active
        "#,
    )
    .bind(user_id)
    .bind(season_id)
    .fetch_one(conn)
    .await
}

pub async fn leagues_for_user(
    pool: &PgPool,
    user_id: Uuid,
    season_id: Uuid,
) -> Result<Vec<MiniLeagueSummary>, sqlx::Error> {
    sqlx::query_as::<_, MiniLeagueSummary>(
        r#"
        SELECT l.id, l.name, l.description, l.invite_code, l.created_by, l.max_members,
               (SELECT COUNT(*) FROM mini_league_members c WHERE c.mini_league_id = l.id) AS member_count,
               m.is_admin, m.joined_at
        FROM mini_league_members m
        JOIN mini_leagues l ON l.id = m.mini_league_id
        WHERE m.user_id = $1 AND l.season_id = $2 AND l.is_active
        ORDER BY m.joined_at ASC
        "#,
    )
    .bind(user_id)
    .bind(season_id)
    .fetch_all(pool)
    .await
}

/// Leagues the user created, across all seasons.
pub async fn leagues_created_by(conn: &mut PgConnection, user_id: Uuid) -> Result<Vec<OwnedLeague>, sqlx::Error> {
    sqlx::query_as::<_, OwnedLeague>(
        r#"
        SELECT l.id, l.name,
               (SELECT COUNT(*) FROM mini_league_members m WHERE m.mini_league_id = l.id) AS member_count
        FROM mini_leagues l
        WHERE l.created_by = $1
        ORDER BY l.created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}

/// Longest-standing member other than `leaving_user`.
pub async fn successor(
    conn: &mut PgConnection,
    league_id: Uuid,
    leaving_user: Uuid,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT user_id FROM mini_league_members
        WHERE mini_league_id = $1 AND user_id <> $2
        ORDER BY joined_at ASC, user_id ASC
        LIMIT 1
        "#,
    )
    .bind(league_id)
    .bind(leaving_user)
    .fetch_optional(conn)
    .await
}

pub async fn transfer_ownership(
    conn: &mut PgConnection,
    league_id: Uuid,
    new_owner: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE mini_leagues SET created_by = $2 WHERE id = $1")
        .bind(league_id)
        .bind(new_owner)
        .execute(&mut *conn)
        .await?;
    sqlx::query("UPDATE mini_league_members SET is_admin = TRUE WHERE mini_league_id = $1 AND user_id = $2")
        .bind(league_id)
        .bind(new_owner)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
