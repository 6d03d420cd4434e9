use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating subscriber email addresses (HTML5 email pattern).
    /// Deliberately stricter than a bare `@` check:
    /// - Valid: "a@example.com", "first.last+tag@sub.example.org"
    /// - Invalid: "@example.com", "a@", "a b@example.com", "a@no-tld@x"
    pub static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    )
    .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_regex_valid() {
        assert!(EMAIL_REGEX.is_match("a@example.com"));
        assert!(EMAIL_REGEX.is_match("first.last@example.com"));
        assert!(EMAIL_REGEX.is_match("user+tag@sub.example.org"));
        assert!(EMAIL_REGEX.is_match("UPPER@EXAMPLE.COM"));
        assert!(EMAIL_REGEX.is_match("x@localhost"));
    }

    #[test]
    fn test_email_regex_invalid() {
        assert!(!EMAIL_REGEX.is_match("")); // empty
        assert!(!EMAIL_REGEX.is_match("plainaddress")); // no @
        assert!(!EMAIL_REGEX.is_match("@example.com")); // no local part
        assert!(!EMAIL_REGEX.is_match("a@")); // no domain
        assert!(!EMAIL_REGEX.is_match("a b@example.com")); // space in local part
        assert!(!EMAIL_REGEX.is_match("a@example..com")); // empty label
        assert!(!EMAIL_REGEX.is_match("a@-example.com")); // label starts with hyphen
    }
}
