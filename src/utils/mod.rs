pub mod decimal;
pub mod json;

use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Caller-supplied ids are kept verbatim; a random UUID string stands in when none is given.
pub fn resolve_id(candidate: Option<String>) -> AppResult<String> {
    match candidate {
        None => Ok(Uuid::new_v4().to_string()),
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(AppError::bad_request("id must not be empty"));
            }
            Ok(trimmed.to_string())
        }
    }
}

pub fn required_text(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Optional text from a create payload; blank strings are stored as NULL.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
