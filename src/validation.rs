// Validation utilities module
// Provides custom validation functions for domain-specific rules

use chrono::NaiveDate;
use validator::ValidationError;

/// Accepted gender values (case-sensitive, as stored)
pub const GENDERS: [&str; 3] = ["male", "female", "other"];

/// Validates that gender is one of the accepted values
pub fn validate_gender(gender: &str) -> Result<(), ValidationError> {
    if GENDERS.contains(&gender) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_gender"))
    }
}

/// Parses a calendar date in `YYYY-MM-DD` form
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_genders() {
        for g in GENDERS {
            assert!(validate_gender(g).is_ok());
        }
        assert!(validate_gender("Male").is_err());
        assert!(validate_gender("").is_err());
    }

    #[test]
    fn parses_iso_dates_only() {
        assert_eq!(
            parse_birth_date("1990-02-28"),
            NaiveDate::from_ymd_opt(1990, 2, 28)
        );
        assert!(parse_birth_date("28/02/1990").is_none());
        assert!(parse_birth_date("1990-02-30").is_none());
        assert!(parse_birth_date("").is_none());
    }
}
