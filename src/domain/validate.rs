use lazy_static::lazy_static;
use regex::Regex;

const SPECIAL_CHARS: &str = "!@#$%^&*";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Password-shape rules alone, shared by signup and password change.
pub fn validate_password(password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let len = password.chars().count();
    if !(8..=16).contains(&len) {
        errors.push("Password must be between 8 and 16 characters".to_string());
    }
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_special = password.chars().any(|c| SPECIAL_CHARS.contains(c));
    if !has_upper || !has_special {
        errors.push(
            "Password must contain at least one uppercase letter and one special character"
                .to_string(),
        );
    }
    errors
}

/// Collects every violated rule so the caller sees the complete list in one
/// round trip, instead of failing on the first.
pub fn validate_user(name: &str, email: &str, password: &str, address: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let name_len = name.chars().count();
    if !(6..=20).contains(&name_len) {
        errors.push("Name must be between 6 and 20 characters".to_string());
    }
    if address.is_empty() || address.chars().count() > 400 {
        errors.push("Address must not exceed 400 characters".to_string());
    }
    errors.extend(validate_password(password));
    if !is_valid_email(email) {
        errors.push("Please enter a valid email address".to_string());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_user_produces_no_errors() {
        let errors = validate_user("Normal User", "user@example.com", "User123!", "789 User Road");
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn violations_are_collected_not_fail_fast() {
        // Short name and a weak password together must yield multiple
        // distinct messages in one pass.
        let errors = validate_user("ab", "user@example.com", "abc", "789 User Road");
        assert!(errors.len() >= 2, "expected several errors, got {errors:?}");
        assert!(errors.iter().any(|e| e.contains("Name")));
        assert!(errors.iter().any(|e| e.contains("between 8 and 16")));
        assert!(errors.iter().any(|e| e.contains("uppercase")));
    }

    #[test]
    fn password_length_bounds() {
        assert!(!validate_password("Abc!567").is_empty()); // 7 chars
        assert!(validate_password("Abc!5678").is_empty()); // 8 chars
        assert!(validate_password("Abcdefgh12345!16").is_empty()); // 16 chars
        assert!(!validate_password("Abcdefgh12345!x17").is_empty()); // 17 chars
    }

    #[test]
    fn password_needs_uppercase_and_special() {
        assert!(!validate_password("lowercase1!").is_empty());
        assert!(!validate_password("NoSpecial123").is_empty());
        assert!(validate_password("Upper&ok1").is_empty());
    }

    #[test]
    fn address_must_be_present_and_bounded() {
        let errors = validate_user("Normal User", "user@example.com", "User123!", "");
        assert!(errors.iter().any(|e| e.contains("Address")));
        let long = "x".repeat(401);
        let errors = validate_user("Normal User", "user@example.com", "User123!", &long);
        assert!(errors.iter().any(|e| e.contains("Address")));
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("spaces in@local.part"));
    }
}
