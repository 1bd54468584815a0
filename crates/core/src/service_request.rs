//! Input validation for new service requests.

use crate::error::CoreError;
use crate::proposal::validate_price;

pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_DESCRIPTION_LEN: usize = 4000;
pub const MAX_ADDRESS_LEN: usize = 500;

/// Default page size for the open-request feed.
pub const DEFAULT_FEED_LIMIT: i64 = 20;

/// Maximum page size for request listings.
pub const MAX_LIST_LIMIT: i64 = 100;

fn validate_text(value: &str, field: &str, max_len: usize) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(CoreError::Validation(format!(
            "{field} must not exceed {max_len} characters"
        )));
    }
    Ok(())
}

/// Validate the free-text fields and price of a new request.
pub fn validate_request_fields(
    title: &str,
    description: &str,
    address_text: &str,
    estimated_price: Option<f64>,
) -> Result<(), CoreError> {
    validate_text(title, "Title", MAX_TITLE_LEN)?;
    validate_text(description, "Description", MAX_DESCRIPTION_LEN)?;
    validate_text(address_text, "Address", MAX_ADDRESS_LEN)?;
    if let Some(price) = estimated_price {
        validate_price(price, "Estimated price")?;
    }
    Ok(())
}

/// Clamp a caller-supplied page size to `1..=MAX_LIST_LIMIT`.
pub fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, MAX_LIST_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_request_fields() {
        assert!(validate_request_fields(
            "Fuga en el baño",
            "Gotea la llave del lavabo",
            "Calle 5 #12, Col. Centro",
            Some(400.0)
        )
        .is_ok());
    }

    #[test]
    fn blank_title_rejected() {
        assert!(validate_request_fields(" ", "desc", "addr", None).is_err());
    }

    #[test]
    fn long_description_rejected() {
        let desc = "d".repeat(MAX_DESCRIPTION_LEN + 1);
        assert!(validate_request_fields("t", &desc, "addr", None).is_err());
    }

    #[test]
    fn negative_estimate_rejected() {
        assert!(validate_request_fields("t", "d", "a", Some(-5.0)).is_err());
    }

    #[test]
    fn limit_clamping() {
        assert_eq!(clamp_limit(None, DEFAULT_FEED_LIMIT), 20);
        assert_eq!(clamp_limit(Some(0), DEFAULT_FEED_LIMIT), 1);
        assert_eq!(clamp_limit(Some(1000), DEFAULT_FEED_LIMIT), MAX_LIST_LIMIT);
    }
}
