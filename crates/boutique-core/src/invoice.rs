//! # Invoice Numbers
//!
//! Formatting and parsing of human-readable invoice numbers.
//!
//! ## Format
//! ```text
//!   DB2025 - 004
//!   ──┬─── ─ ─┬─
//!     │       └── sequence, zero-padded to 3 digits (grows past 999)
//!     └────────── store tag, year-scoped
//! ```
//!
//! Allocation itself is NOT done here: the sequence value comes from an
//! atomic counter in storage. This module only turns numbers into strings
//! and back.

use chrono::{DateTime, Datelike, Utc};

/// Minimum width of the numeric segment.
pub const SEQUENCE_WIDTH: usize = 3;

/// The store tag used when none is configured: `DB` + the current year.
///
/// ## Example
/// ```rust
/// use boutique_core::invoice::default_prefix;
/// use chrono::{TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();
/// assert_eq!(default_prefix(now), "DB2025");
/// ```
pub fn default_prefix(now: DateTime<Utc>) -> String {
    format!("DB{}", now.year())
}

/// Formats an invoice number from a tag and a sequence value.
///
/// ## Example
/// ```rust
/// use boutique_core::invoice::format_invoice_number;
///
/// assert_eq!(format_invoice_number("DB2025", 4), "DB2025-004");
/// assert_eq!(format_invoice_number("DB2025", 1234), "DB2025-1234");
/// ```
pub fn format_invoice_number(prefix: &str, sequence: i64) -> String {
    format!("{}-{:0width$}", prefix, sequence, width = SEQUENCE_WIDTH)
}

/// Extracts the trailing numeric segment of an invoice number.
///
/// Returns `None` when there is no `-` or the segment is not a number,
/// e.g. a hand-typed legacy invoice.
///
/// ## Example
/// ```rust
/// use boutique_core::invoice::parse_sequence;
///
/// assert_eq!(parse_sequence("DB2025-004"), Some(4));
/// assert_eq!(parse_sequence("DB2025"), None);
/// ```
pub fn parse_sequence(invoice_number: &str) -> Option<i64> {
    let (_, tail) = invoice_number.trim().rsplit_once('-')?;
    if tail.is_empty() || !tail.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_to_three_digits() {
        assert_eq!(format_invoice_number("DB2025", 1), "DB2025-001");
        assert_eq!(format_invoice_number("DB2025", 42), "DB2025-042");
        assert_eq!(format_invoice_number("DB2025", 999), "DB2025-999");
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_sequence("DB2025-001"), Some(1));
        assert_eq!(parse_sequence("DB2025-1000"), Some(1000));
        assert_eq!(parse_sequence("STORE-A-017"), Some(17));

        assert_eq!(parse_sequence("DB2025-"), None);
        assert_eq!(parse_sequence("DB2025-00x"), None);
    }
}
