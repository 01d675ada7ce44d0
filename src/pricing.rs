//! Price normalization for listing display prices.
//!
//! Listings carry human-entered price strings like `"₦5,000"` or `"N10,000"`.
//! The payment provider wants an integer amount in kobo (minor units). The
//! normalizer is total: any unparseable input degrades to a documented
//! fallback amount instead of failing the purchase.

/// Fallback amount in kobo when a price string cannot be parsed at all.
pub const FALLBACK_AMOUNT_KOBO: u64 = 500_000;

/// Substituted major-unit figure when a price string has no digits.
const FALLBACK_MAJOR_STR: &str = "5000";

/// Kobo per naira.
const MINOR_PER_MAJOR: u64 = 100;

/// Converts a display price string into a positive kobo amount.
///
/// Strips every non-digit character, substitutes `"5000"` when nothing is
/// left, then multiplies by 100. A zero result or an overflow falls back to
/// [`FALLBACK_AMOUNT_KOBO`]. Never returns zero and never errors.
pub fn normalize_display_price(display: Option<&str>) -> u64 {
    let Some(raw) = display else {
        return FALLBACK_AMOUNT_KOBO;
    };

    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let digits = if digits.is_empty() {
        FALLBACK_MAJOR_STR
    } else {
        digits.as_str()
    };

    match digits.parse::<u64>() {
        Ok(0) | Err(_) => FALLBACK_AMOUNT_KOBO,
        Ok(major) => major
            .checked_mul(MINOR_PER_MAJOR)
            .unwrap_or(FALLBACK_AMOUNT_KOBO),
    }
}

/// Renders a kobo amount as a display string, e.g. `500000` -> `"₦5,000"`.
///
/// Kobo remainders are dropped; listing prices are whole-naira figures.
pub fn format_kobo(amount: u64) -> String {
    let major = amount / MINOR_PER_MAJOR;
    let raw = major.to_string();

    let mut grouped = String::with_capacity(raw.len() + raw.len() / 3 + 1);
    for (idx, ch) in raw.chars().enumerate() {
        if idx > 0 && (raw.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("₦{}", grouped)
}
