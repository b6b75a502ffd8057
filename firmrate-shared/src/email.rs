/// Email address validation and normalization
///
/// Addresses are validated syntactically and normalized to lowercase
/// before they are stored or compared. Deliverability probing is left to
/// the SMTP relay; a bounced welcome mail surfaces in the logs.

use validator::ValidateEmail;

/// Error type for address validation
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// The address is not syntactically valid
    #[error("Invalid email address: {0}")]
    Invalid(String),

    /// The address exceeds the stored column width
    #[error("Email address too long")]
    TooLong,
}

/// Maximum stored address length
const MAX_EMAIL_CHARS: usize = 100;

/// Validates an address and returns its canonical (lowercased, trimmed) form
///
/// # Errors
///
/// Returns `EmailError::Invalid` for syntactically invalid input and
/// `EmailError::TooLong` past the column width.
///
/// # Example
///
/// ```
/// use firmrate_shared::email::normalize_email;
///
/// let canonical = normalize_email("  Jana.Novakova@Example.COM ").unwrap();
/// assert_eq!(canonical, "jana.novakova@example.com");
///
/// assert!(normalize_email("not-an-address").is_err());
/// ```
pub fn normalize_email(input: &str) -> Result<String, EmailError> {
    let trimmed = input.trim();

    if trimmed.chars().count() > MAX_EMAIL_CHARS {
        return Err(EmailError::TooLong);
    }

    if !trimmed.validate_email() {
        return Err(EmailError::Invalid(trimmed.to_string()));
    }

    Ok(trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_valid_addresses() {
        assert_eq!(
            normalize_email("user@example.com").unwrap(),
            "user@example.com"
        );
        assert_eq!(
            normalize_email("User.Name@EXAMPLE.com").unwrap(),
            "user.name@example.com"
        );
        assert_eq!(
            normalize_email("  padded@example.com  ").unwrap(),
            "padded@example.com"
        );
    }

    #[test]
    fn test_reject_invalid_addresses() {
        for bad in ["", "plain", "missing@tld@twice", "@example.com", "user@"] {
            assert!(normalize_email(bad).is_err(), "should reject {:?}", bad);
        }
    }

    #[test]
    fn test_reject_oversized_address() {
        let local = "a".repeat(95);
        let input = format!("{}@example.com", local);
        assert!(matches!(normalize_email(&input), Err(EmailError::TooLong)));
    }
}
