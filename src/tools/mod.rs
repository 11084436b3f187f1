//! Journal Tools module
//!
//! MCP tool implementations for the wellness journal.

pub mod feedback;
pub mod journal;
pub mod meals;
pub mod missions;
pub mod profile;
pub mod reports;
pub mod status;

use chrono::NaiveDate;

/// Check a `YYYY-MM-DD` date and return it in canonical form
pub fn validate_date(date: &str) -> Result<String, String> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| format!("Invalid date '{}'. Use YYYY-MM-DD.", date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date() {
        assert_eq!(validate_date(" 2025-06-01 ").unwrap(), "2025-06-01");
        assert_eq!(validate_date("2025-6-1").unwrap(), "2025-06-01");
        assert!(validate_date("2025-02-30").is_err());
        assert!(validate_date("today").is_err());
    }
}
