//! Input validation helpers
//!
//! Text limits mirror the VARCHAR(126)/(255) columns of the schema.

use std::sync::LazyLock;

use regex::Regex;
use shared::error::AppError;

/// Names, org names, reasons and other short text
pub const MAX_NAME_LEN: usize = 126;

pub const MAX_ADDRESS_LEN: usize = 255;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_param(format!("{field} must not be empty")).with_field(field));
    }
    validate_max_len(value, field, max_len)
}

/// Validate that a string is within the length limit.
pub fn validate_max_len(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::invalid_param(format!(
            "{field} is too long ({len} chars, max {max_len})"
        ))
        .with_field(field));
    }
    Ok(())
}

/// Mainland mobile number: `1` + carrier prefix + 8 digits
///
/// Accepted second/third digits: 3x, 50-53, 55-59, 71-73, 75-78, 8x, 9x.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^1(3[0-9]|5[0-35-9]|7[1-35-8]|8[0-9]|9[0-9])[0-9]{8}$").expect("hardcoded regex")
});

/// 18-digit resident identity number: 6-digit region, birth date, 3-digit
/// sequence, then a digit or `X` check character
static ID_CARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-9][0-9]{5}(18|19|20)[0-9]{2}(0[1-9]|1[0-2])([0-2][1-9]|10|20|30|31)[0-9]{3}[0-9Xx]$")
        .expect("hardcoded regex")
});

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

pub fn validate_phone(phone: &str, field: &str) -> Result<(), AppError> {
    if is_valid_phone(phone) {
        Ok(())
    } else {
        Err(AppError::invalid_param(format!("{field} is not a valid phone number")).with_field(field))
    }
}

pub fn is_valid_id_card(id: &str) -> bool {
    ID_CARD_RE.is_match(id)
}

pub fn validate_id_card(id: &str, field: &str) -> Result<(), AppError> {
    if is_valid_id_card(id) {
        Ok(())
    } else {
        Err(AppError::invalid_param(format!("{field} is not a valid identity number")).with_field(field))
    }
}
