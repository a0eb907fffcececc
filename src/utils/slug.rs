//! Slug and order-number formats.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::config::{MAX_SLUG_LENGTH, MIN_SLUG_LENGTH};
use crate::errors::{AppError, AppResult};

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("slug pattern compiles"));

/// Tenant slugs: `[a-z0-9-]` within the allowed length.
pub fn ensure_slug(slug: &str) -> AppResult<()> {
    let len = slug.chars().count();
    if !(MIN_SLUG_LENGTH..=MAX_SLUG_LENGTH).contains(&len) {
        return Err(AppError::validation(format!(
            "Slug must be {}-{} characters",
            MIN_SLUG_LENGTH, MAX_SLUG_LENGTH
        )));
    }
    ensure_slug_format(slug)
}

/// Catalog slugs: same alphabet, any non-empty length.
pub fn ensure_slug_format(slug: &str) -> AppResult<()> {
    if !SLUG_PATTERN.is_match(slug) {
        return Err(AppError::validation(
            "Slug can only contain lowercase letters, numbers, and hyphens",
        ));
    }
    Ok(())
}

/// `ORD-<base36 millis>-<4 random chars>`
pub fn order_number(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().max(0) as u64;
    let random = Uuid::new_v4().simple().to_string();
    format!("ORD-{}-{}", to_base36(millis), random[..4].to_uppercase())
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_rules() {
        assert!(ensure_slug("acme").is_ok());
        assert!(ensure_slug("acme-supplies-2").is_ok());
        assert!(ensure_slug("Acme").is_err());
        assert!(ensure_slug("ac").is_err());
        assert!(ensure_slug("acme_supplies").is_err());
    }

    #[test]
    fn test_order_number_format() {
        let number = order_number(Utc::now());
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
    }
}
