use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use secrecy::SecretString;
use validator::Validate;

use crate::league::aggregate::UserAggregate;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Suspended,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct RegistrationRequest {
    #[validate(custom = "crate::utils::validation::validate_username")]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(serialize_with = "serialize_secret_string", deserialize_with = "deserialize_secret_string")]
    pub password: SecretString,
}
impl std::fmt::Display for RegistrationRequest{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Username: {}, Email: {}", self.username, self.email)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub user_id: Uuid,
    pub username: String,
    pub email_verified: bool,
}

/// Profile as seen by the user themselves.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub stats: Option<SeasonStatsSummary>,
}

/// Public profile.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub joined_at: DateTime<Utc>,
    pub stats: Option<SeasonStatsSummary>,
}

/// Partial profile update; omitted fields stay as they are.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(custom = "crate::utils::validation::validate_username")]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(deserialize_with = "deserialize_secret_string")]
    pub current_password: SecretString,
    #[serde(deserialize_with = "deserialize_secret_string")]
    pub new_password: SecretString,
}

pub const DELETE_CONFIRMATION: &str = "DELETE";

#[derive(Deserialize)]
pub struct DeleteAccountRequest {
    #[serde(default)]
    pub confirmation: String,
    #[serde(default, deserialize_with = "deserialize_optional_secret_string")]
    pub password: Option<SecretString>,
}

/// Rows owned by a user that go away with the account.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, Copy, PartialEq, Eq)]
pub struct AccountFootprint {
    pub predictions: i64,
    pub user_stats: i64,
    pub mini_league_memberships: i64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct OwnedLeague {
    pub id: Uuid,
    pub name: String,
    pub member_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OwnedLeaguePreview {
    pub id: Uuid,
    pub name: String,
    pub member_count: i64,
    pub will_be_deleted: bool,
}

impl From<OwnedLeague> for OwnedLeaguePreview {
    fn from(league: OwnedLeague) -> Self {
        Self {
            will_be_deleted: league.member_count <= 1,
            id: league.id,
            name: league.name,
            member_count: league.member_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletionPreview {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub footprint: AccountFootprint,
    pub created_leagues: Vec<OwnedLeaguePreview>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletionSummary {
    pub username: String,
    #[serde(flatten)]
    pub footprint: AccountFootprint,
    pub mini_leagues_transferred: usize,
    pub mini_leagues_deleted: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SeasonStatsSummary {
    pub season_id: Uuid,
    pub position: Option<i32>,
    #[serde(flatten)]
    pub stats: UserAggregate,
}

pub fn serialize_secret_string<S>(_: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str("[REDACTED]")
}

pub fn deserialize_secret_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(SecretString::new(s.into_boxed_str()))
}

pub fn deserialize_optional_secret_string<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.map(|s| SecretString::new(s.into_boxed_str())))
}
