use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use serde_json::json;

use crate::config::rate_limit::RateLimitSettings;

// Sweep idle clients once the table grows past this
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEndpoint {
    Login,
    Register,
}

impl AuthEndpoint {
    fn as_str(&self) -> &'static str {
        match self {
            AuthEndpoint::Login => "login",
            AuthEndpoint::Register => "register",
        }
    }
}

/// Sliding-window attempt counter keyed by `endpoint:client`.
///
/// State is per process; a restart forgets every window.
#[derive(Debug)]
pub struct RateLimiter {
    settings: RateLimitSettings,
    attempts: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(settings: RateLimitSettings) -> Self {
        Self {
            settings,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    fn max_attempts(&self, endpoint: AuthEndpoint) -> usize {
        match endpoint {
            AuthEndpoint::Login => self.settings.login_max_attempts,
            AuthEndpoint::Register => self.settings.register_max_attempts,
        }
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.settings.window_seconds)
    }

    /// Record an attempt, or return the seconds to wait when the window is full.
    pub fn check(&self, endpoint: AuthEndpoint, client: &str) -> Result<(), u64> {
        self.check_at(endpoint, client, Instant::now())
    }

    fn check_at(&self, endpoint: AuthEndpoint, client: &str, now: Instant) -> Result<(), u64> {
        let window = self.window();
        let max_attempts = self.max_attempts(endpoint);
        // A poisoned lock only means another request panicked mid-update
        let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());

        if attempts.len() > SWEEP_THRESHOLD {
            attempts.retain(|_, seen| seen.back().is_some_and(|last| now.duration_since(*last) < window));
        }

        let seen = attempts
            .entry(format!("{}:{}", endpoint.as_str(), client))
            .or_default();
        while seen.front().is_some_and(|first| now.duration_since(*first) >= window) {
            seen.pop_front();
        }

        if seen.len() >= max_attempts {
            let wait = seen
                .front()
                .map(|first| window.saturating_sub(now.duration_since(*first)))
                .unwrap_or(window);
            let seconds = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
            return Err(seconds.max(1));
        }
        seen.push_back(now);
        Ok(())
    }
}

/// Client address, taken from `Forwarded`/`X-Forwarded-For` when present.
pub fn client_key(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

pub fn too_many_attempts(retry_after: u64) -> HttpResponse {
    HttpResponse::TooManyRequests()
        .insert_header((header::RETRY_AFTER, retry_after.to_string()))
        .json(json!({
            "success": false,
            "message": format!("Too many attempts. Please try again in {} seconds.", retry_after)
        }))
}
