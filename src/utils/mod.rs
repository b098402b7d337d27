pub mod email_token;
pub mod password;
pub mod rate_limit;
pub mod validation;
