use chrono::{DateTime, FixedOffset, Utc};

/// Subjects are truncated before hashing to bound the influence of long
/// variable suffixes (ticket numbers, trailing whitespace).
const SUBJECT_PREFIX_LEN: usize = 50;

/// Parse a record date. Webhook payloads carry RFC 3339, SMTP/IMAP
/// sources RFC 2822, and some IMAP servers the INTERNALDATE format.
pub fn parse_date(date_str: &str) -> Option<DateTime<FixedOffset>> {
    let date_str = date_str.trim();
    DateTime::parse_from_rfc3339(date_str)
        .or_else(|_| DateTime::parse_from_rfc2822(date_str))
        .or_else(|_| DateTime::parse_from_str(date_str, "%d-%b-%Y %H:%M:%S %z"))
        .ok()
}

pub fn normalize_subject(subject: &str) -> String {
    subject
        .trim()
        .to_lowercase()
        .chars()
        .take(SUBJECT_PREFIX_LEN)
        .collect()
}

/// UTC day the message falls in, `YYYY-MM-DD`.
///
/// One fixed granularity for every producer: coarse enough to absorb
/// clock and recording skew between the sync, send and webhook
/// pipelines, fine enough to keep distinct same-pair messages on
/// different days apart. Computed in UTC so records carrying zone
/// offsets land in one canonical day.
pub fn day_window(date: &DateTime<FixedOffset>) -> String {
    date.with_timezone(&Utc).format("%Y-%m-%d").to_string()
}

/// Deterministic, order-sensitive 32-bit rolling hash, rendered as
/// lowercase hex of the magnitude. A dedup key, not a security token;
/// collision probability over the expected volume is what matters.
pub fn rolling_hash(data: &str) -> String {
    let mut hash: i32 = 0;
    for c in data.chars() {
        hash = hash.wrapping_mul(31).wrapping_add(c as i32);
    }
    format!("{:x}", hash.unsigned_abs())
}

/// Envelope identifier for a record without a trustworthy Message-ID.
///
/// `to` and `from` must already be extracted and normalized; the id is
/// `env-<hash>-<digits of day window>`.
pub fn envelope_id(to: &str, from: &str, subject: &str, date: &DateTime<FixedOffset>) -> String {
    let window = day_window(date);
    let data = format!("{}|{}|{}|{}", to, from, normalize_subject(subject), window);
    let digits: String = window.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("env-{}-{}", rolling_hash(&data), digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> DateTime<FixedOffset> {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2025-08-29T22:10:00Z").is_some());
        assert!(parse_date("Fri, 29 Aug 2025 22:10:00 +0000").is_some());
        assert!(parse_date("29-Aug-2025 22:10:00 +0000").is_some());
        assert!(parse_date("not-a-date").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_day_window_utc() {
        assert_eq!(day_window(&date("2025-08-29T22:10:00Z")), "2025-08-29");
        // A zone offset must not shift the canonical day.
        assert_eq!(day_window(&date("2025-08-30T01:10:00+05:00")), "2025-08-29");
    }

    #[test]
    fn test_rolling_hash_deterministic() {
        let a = rolling_hash("a@x.com|b@y.com|hello|2025-08-29");
        let b = rolling_hash("a@x.com|b@y.com|hello|2025-08-29");
        assert_eq!(a, b);
        assert_ne!(a, rolling_hash("a@x.com|b@y.com|hello|2025-08-30"));
    }

    #[test]
    fn test_rolling_hash_order_sensitive() {
        assert_ne!(rolling_hash("ab"), rolling_hash("ba"));
    }

    #[test]
    fn test_normalize_subject_truncates() {
        let long = format!("{}{}", "a".repeat(50), "variable suffix");
        assert_eq!(normalize_subject(&long), "a".repeat(50));
        assert_eq!(normalize_subject("  Hello  "), "hello");
    }

    #[test]
    fn test_envelope_id_shape() {
        let id = envelope_id(
            "hola@uncodie.com",
            "sergio@external.com",
            "info",
            &date("2025-08-29T22:10:00Z"),
        );
        assert!(id.starts_with("env-"));
        assert!(id.ends_with("-20250829"));
    }

    #[test]
    fn test_envelope_id_subject_suffix_past_truncation_ignored() {
        let d = date("2025-08-29T22:10:00Z");
        let base = "x".repeat(50);
        let a = envelope_id("a@x.com", "b@y.com", &format!("{}tail-one", base), &d);
        let b = envelope_id("a@x.com", "b@y.com", &format!("{}tail-two", base), &d);
        assert_eq!(a, b);
    }
}
