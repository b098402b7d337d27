use serde::Deserialize;

/// Attempts allowed per client on the unauthenticated auth endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    pub login_max_attempts: usize,
    pub register_max_attempts: usize,
    pub window_seconds: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            login_max_attempts: 10,
            register_max_attempts: 5,
            window_seconds: 300,
        }
    }
}
