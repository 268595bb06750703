use chrono::NaiveDate;

use super::error::AppError;

/// Longest single sit accepted, one full day
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

/// Parses a calendar day in `YYYY-MM-DD` form.
pub fn parse_day(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidRequest(format!("Invalid date: {} (expected YYYY-MM-DD)", raw)))
}

pub fn validate_duration(minutes: i64) -> Result<i64, AppError> {
    if (1..=MAX_DURATION_MINUTES).contains(&minutes) {
        Ok(minutes)
    } else {
        Err(AppError::InvalidRequest(format!(
            "Duration must be between 1 and {} minutes",
            MAX_DURATION_MINUTES
        )))
    }
}

/// Returns the trimmed value, or None when absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
