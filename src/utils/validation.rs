use std::borrow::Cow;
use std::collections::BTreeMap;

use actix_web::HttpResponse;
use serde_json::json;
use validator::{ValidationError, ValidationErrors};

const RESERVED_USERNAMES: &[&str] = &["admin", "root", "system", "moderator"];
const PASSWORD_SPECIALS: &str = "!@#$%^&*()_+-=[]{};:'\",.<>?/\\|`~";

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if len < 3 {
        return Err(error("too_short", "Username must be at least 3 characters long"));
    }
    if len > 20 {
        return Err(error("too_long", "Username must be at most 20 characters long"));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(error(
            "invalid_characters",
            "Username can only contain letters, numbers, underscores, and hyphens",
        ));
    }
    if username.starts_with('_') || username.starts_with('-') {
        return Err(error("invalid_start", "Username cannot start with underscore or hyphen"));
    }
    if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
        return Err(error("reserved", "This username is reserved"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if len < 8 {
        return Err(error("too_short", "Password must be at least 8 characters long"));
    }
    if len > 128 {
        return Err(error("too_long", "Password must be at most 128 characters long"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(error("missing_uppercase", "Password must contain at least one uppercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(error("missing_lowercase", "Password must contain at least one lowercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(error("missing_digit", "Password must contain at least one number"));
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Err(error("missing_special", "Password must contain at least one special character"));
    }
    Ok(())
}

/// Flatten `ValidationErrors` into `{ field: [messages] }`.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid ({})", field, e.code),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// 422 response carrying field-level validation errors.
pub fn validation_error_response(errors: &ValidationErrors) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(json!({
        "success": false,
        "message": "Validation failed",
        "errors": field_messages(errors)
    }))
}
