//! Ingestion column schema and field shape checks.

use once_cell::sync::Lazy;
use regex::Regex;

/// Number of data columns in an ingested sheet.
pub const COLUMN_COUNT: usize = 10;

/// Header row every uploaded sheet must carry, in this exact order.
pub const EXPECTED_HEADERS: [&str; COLUMN_COUNT] = [
    "FirstName", "LastName", "Company", "Address", "City", "Country", "Postal", "Phone", "Email",
    "Web",
];

/// Zero-based position of the email column.
pub const EMAIL_COLUMN: usize = 8;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("Invalid email regex")
});

/// Check the `user@domain.tld` shape. Case-sensitive: upper-case letters are
/// rejected, matching records ingested so far.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_email_pattern_compiles() {
        assert!(Regex::new(EMAIL_PATTERN.as_str()).is_ok());
    }

    #[test]
    fn test_accepts_simple_addresses() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co"));
        assert!(is_valid_email("a_b%c-d@sub-domain.example.org"));
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@example.c"));
        assert!(!is_valid_email("Ada@Example.com"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email(" ada@example.com"));
    }

    #[test]
    fn test_header_schema_shape() {
        assert_eq!(EXPECTED_HEADERS.len(), COLUMN_COUNT);
        assert_eq!(EXPECTED_HEADERS[EMAIL_COLUMN], "Email");
    }

    proptest! {
        #[test]
        fn prop_generated_addresses_match(
            user in "[a-z0-9._%+-]{1,12}",
            domain in "[a-z0-9-]{1,10}",
            tld in "[a-z]{2,6}",
        ) {
            let email = format!("{}@{}.{}", user, domain, tld);
            prop_assert!(is_valid_email(&email));
        }

        #[test]
        fn prop_no_at_sign_never_matches(value in "[a-zA-Z0-9.]{0,30}") {
            prop_assert!(!is_valid_email(&value));
        }
    }
}
