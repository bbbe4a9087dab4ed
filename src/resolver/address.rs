use once_cell::sync::Lazy;
use regex::Regex;

/// First thing that looks like `local@domain.tld` in free text.
static ADDRESS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

/// Extract a bare email address from a free-form header value.
///
/// Accepts a bare address (`user@domain.com`), an RFC 2822 display form
/// (`"Name" <user@domain.com>`), or free text containing an address.
/// First match wins:
///
/// 1. contains `@` and no `<` — the whole trimmed string is the address
/// 2. a `<...>` segment — its contents
/// 3. the first address-shaped substring
/// 4. the original string unchanged — degraded, not an error
///
/// Output is lower-cased and trimmed. Callers must treat a result
/// without `@` as unusable for alias/self-sent comparisons.
pub fn extract_address(value: &str) -> String {
    let trimmed = value.trim();

    if trimmed.contains('@') && !trimmed.contains('<') {
        return trimmed.to_lowercase();
    }

    if let Some(start) = trimmed.find('<') {
        if let Some(len) = trimmed[start + 1..].find('>') {
            return trimmed[start + 1..start + 1 + len].trim().to_lowercase();
        }
    }

    if let Some(m) = ADDRESS_PATTERN.find(trimmed) {
        return m.as_str().to_lowercase();
    }

    trimmed.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_address() {
        assert_eq!(extract_address("user@domain.com"), "user@domain.com");
    }

    #[test]
    fn test_display_form() {
        assert_eq!(
            extract_address("\"Test User\" <Test@Example.com>"),
            "test@example.com"
        );
    }

    #[test]
    fn test_display_form_unquoted() {
        assert_eq!(
            extract_address("Sergio Prado <sergio@external.com>"),
            "sergio@external.com"
        );
    }

    #[test]
    fn test_free_text_scan() {
        assert_eq!(
            extract_address("reply to hola@uncodie.com please"),
            "hola@uncodie.com"
        );
    }

    #[test]
    fn test_lowercases_and_trims() {
        assert_eq!(extract_address("  User@Domain.COM  "), "user@domain.com");
    }

    #[test]
    fn test_degraded_no_address() {
        // Not an error; callers must notice the missing '@'.
        assert_eq!(extract_address("undisclosed recipients"), "undisclosed recipients");
    }

    #[test]
    fn test_malformed_angle_falls_through_to_scan() {
        assert_eq!(extract_address("<oops user@domain.com"), "user@domain.com");
    }
}
