use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

pub const VERIFICATION_TOKEN_LENGTH: usize = 48;
pub const VERIFICATION_TOKEN_TTL_HOURS: i64 = 48;

/// Fresh random email verification token. Only its hash is stored.
pub fn generate_verification_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(VERIFICATION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Hex SHA-256 of the token, as kept in `email_verifications.token_hash`.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.trim().as_bytes()))
}
