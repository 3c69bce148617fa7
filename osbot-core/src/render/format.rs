//! Amount and relative time formatting.

use rust_decimal::Decimal;
use time::OffsetDateTime;

/// Largest scale the formatter expands; above it the raw quantity is shown.
pub const MAX_DECIMALS: u32 = 255;

/// Format an integer token amount with `decimals` places, e.g.
/// `("1500000", 6, "USDC")` -> `1.5 USDC`.
///
/// Trailing zeros are dropped, no grouping separators, no rounding.
/// A quantity that is not an integer, or a scale above
/// [`MAX_DECIMALS`], is shown as-is.
pub fn format_amount(quantity: &str, decimals: u32, symbol: &str) -> String {
    let quantity = quantity.trim();
    let number = decimal_amount(quantity, decimals)
        .map(|d| d.normalize().to_string())
        .or_else(|| shift_decimal_point(quantity, decimals))
        .unwrap_or_else(|| quantity.to_string());

    if symbol.is_empty() {
        number
    } else {
        format!("{number} {symbol}")
    }
}

fn decimal_amount(quantity: &str, decimals: u32) -> Option<Decimal> {
    let raw: i128 = quantity.parse().ok()?;
    Decimal::try_from_i128_with_scale(raw, decimals).ok()
}

/// Exact fallback for amounts beyond `Decimal`'s 96-bit mantissa or 28-digit
/// scale.
fn shift_decimal_point(quantity: &str, decimals: u32) -> Option<String> {
    if decimals > MAX_DECIMALS
        || quantity.is_empty()
        || !quantity.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let decimals = decimals as usize;
    let digits = format!("{quantity:0>width$}", width = decimals + 1);
    let (int_part, frac_part) = digits.split_at(digits.len() - decimals);

    let int_part = int_part.trim_start_matches('0');
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let frac_part = frac_part.trim_end_matches('0');

    Some(if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    })
}

const UNITS: [(&str, u64); 6] = [
    ("year", 365 * 24 * 60 * 60),
    ("month", 30 * 24 * 60 * 60),
    ("day", 24 * 60 * 60),
    ("hour", 60 * 60),
    ("minute", 60),
    ("second", 1),
];

/// Human relative time of a unix timestamp, e.g. `in 3 days` or
/// `5 minutes ago`, using the largest whole unit.
pub fn format_relative(timestamp: i64, now: OffsetDateTime) -> String {
    let delta = timestamp.saturating_sub(now.unix_timestamp());
    let magnitude = delta.unsigned_abs();

    if magnitude < 10 {
        return "just now".to_string();
    }

    let (unit, size) = UNITS
        .into_iter()
        .find(|(_, size)| magnitude >= *size)
        .unwrap_or(("second", 1));
    let count = magnitude / size;
    let plural = if count == 1 { "" } else { "s" };

    if delta > 0 {
        format!("in {count} {unit}{plural}")
    } else {
        format!("{count} {unit}{plural} ago")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("1000000000000000000", 18, "ETH"), "1 ETH");
        assert_eq!(format_amount("1500000", 6, "USDC"), "1.5 USDC");
        assert_eq!(format_amount("250000000000000000", 18, "WETH"), "0.25 WETH");
        assert_eq!(format_amount("1", 18, "ETH"), "0.000000000000000001 ETH");
        assert_eq!(format_amount("0", 18, "ETH"), "0 ETH");
        assert_eq!(format_amount("42", 0, ""), "42");
    }

    #[test]
    fn test_format_amount_beyond_decimal_range() {
        // 40 digits, wider than i128.
        assert_eq!(
            format_amount("1234567890123456789012345678901234567890", 18, "ETH"),
            "1234567890123456789012.34567890123456789 ETH"
        );
        // Scale above 28.
        assert_eq!(format_amount("15", 30, "X"), "0.000000000000000000000000000015 X");
    }

    #[test]
    fn test_format_amount_garbage_passthrough() {
        assert_eq!(format_amount("n/a", 18, "ETH"), "n/a ETH");
    }

    #[test]
    fn test_format_amount_absurd_scale_passthrough() {
        assert_eq!(format_amount("15", u32::MAX, "X"), "15 X");
        assert_eq!(format_amount("15", MAX_DECIMALS + 1, "X"), "15 X");
    }

    #[test]
    fn test_format_relative() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let ts = now.unix_timestamp();

        assert_eq!(format_relative(ts + 3 * 86_400, now), "in 3 days");
        assert_eq!(format_relative(ts - 3_600, now), "1 hour ago");
        assert_eq!(format_relative(ts + 90, now), "in 1 minute");
        assert_eq!(format_relative(ts + 45 * 86_400, now), "in 1 month");
        assert_eq!(format_relative(ts - 800 * 86_400, now), "2 years ago");
        assert_eq!(format_relative(ts + 3, now), "just now");
        assert_eq!(format_relative(ts + 30, now), "in 30 seconds");
    }

    #[test]
    fn test_format_relative_extreme_timestamps() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert!(format_relative(i64::MIN, now).ends_with("years ago"));
        assert!(format_relative(i64::MAX, now).starts_with("in "));
    }
}
