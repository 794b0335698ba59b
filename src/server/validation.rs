use chrono::{DateTime, Utc};

use crate::server::response::ApiError;
use crate::types::validate_bulk_count;

const MIN_USER_NAME_LEN: usize = 3;
const MAX_USER_NAME_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_LABEL_LEN: usize = 100;
const MAX_NICKNAME_LEN: usize = 50;
const MAX_MESSAGE_LEN: usize = 1000;

fn is_valid_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
}

pub fn validate_user_name(name: &str) -> Result<(), ApiError> {
    let len = name.chars().count();
    if !(MIN_USER_NAME_LEN..=MAX_USER_NAME_LEN).contains(&len) {
        return Err(ApiError::bad_request(format!(
            "User name must be between {MIN_USER_NAME_LEN} and {MAX_USER_NAME_LEN} characters"
        )));
    }
    if !name.chars().all(is_valid_name_char) {
        return Err(ApiError::bad_request(
            "User name can only contain alphanumeric characters, hyphens, underscores, and periods",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Non-blank free text of bounded length (store, role and employee names).
pub fn validate_label(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{field} cannot be empty")));
    }
    if value.chars().count() > MAX_LABEL_LEN {
        return Err(ApiError::bad_request(format!(
            "{field} cannot exceed {MAX_LABEL_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_date_order(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    start_field: &str,
    end_field: &str,
) -> Result<(), ApiError> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(ApiError::bad_request(format!(
                "{end_field} cannot be before {start_field}"
            )));
        }
    }
    Ok(())
}

pub fn validate_salary(salary: f64) -> Result<(), ApiError> {
    if !salary.is_finite() || salary < 0.0 {
        return Err(ApiError::bad_request("Salary must be a non-negative number"));
    }
    Ok(())
}

pub fn validate_role_level(level: i64) -> Result<(), ApiError> {
    if level < 0 {
        return Err(ApiError::bad_request("Role level cannot be negative"));
    }
    Ok(())
}

pub fn validate_chat_message(nickname: &str, message: &str) -> Result<(), ApiError> {
    let nickname_len = nickname.trim().chars().count();
    if nickname_len == 0 || nickname.chars().count() > MAX_NICKNAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Nickname must be between 1 and {MAX_NICKNAME_LEN} characters"
        )));
    }
    let message_len = message.trim().chars().count();
    if message_len == 0 || message.chars().count() > MAX_MESSAGE_LEN {
        return Err(ApiError::bad_request(format!(
            "Message must be between 1 and {MAX_MESSAGE_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_count(count: i64) -> Result<u32, ApiError> {
    validate_bulk_count(count).map_err(ApiError::bad_request)
}
