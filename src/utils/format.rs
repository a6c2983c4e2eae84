//! Display formatting for amounts and timestamps

use alloy_primitives::U256;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, NaiveDate, SecondsFormat};

use crate::constants::NATIVE_DECIMALS;

/// Fraction digits shown for ETH values and token amounts
pub const DISPLAY_FRACTION_DIGITS: i64 = 6;

fn to_decimal(raw: U256, decimals: u8) -> BigDecimal {
    let digits = BigInt::from_bytes_be(Sign::Plus, &raw.to_be_bytes_vec());
    BigDecimal::new(digits, decimals as i64)
}

/// Scale a smallest-unit amount by `decimals` and render it with a fixed
/// number of fraction digits (half-up rounding)
///
/// `format_units_fixed(1_000_000, 6, 6)` renders as `"1.000000"`.
pub fn format_units_fixed(raw: U256, decimals: u8, fraction_digits: i64) -> String {
    to_decimal(raw, decimals)
        .with_scale_round(fraction_digits, RoundingMode::HalfUp)
        .to_plain_string()
}

/// Wei rendered as ether with the shortest exact fraction (`"1.5"`, `"0.0"`)
pub fn format_ether(wei: U256) -> String {
    let text = to_decimal(wei, NATIVE_DECIMALS).normalized().to_plain_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

/// Unix seconds as an ISO-8601 UTC string with millisecond precision
pub fn iso_date_from_unix(seconds: u64) -> Option<String> {
    let seconds = i64::try_from(seconds).ok()?;
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Parse a strict `YYYY-MM-DD` date
pub fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    let bytes = input.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

/// Unix seconds of midnight UTC on `date`
pub fn midnight_utc_timestamp(date: NaiveDate) -> Option<u64> {
    let midnight = date.and_hms_opt(0, 0, 0)?.and_utc();
    u64::try_from(midnight.timestamp()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_units_fixed() {
        assert_eq!(
            format_units_fixed(U256::from(1_000_000u64), 6, DISPLAY_FRACTION_DIGITS),
            "1.000000"
        );
        assert_eq!(
            format_units_fixed(U256::from(1_234_567_891u64), 9, DISPLAY_FRACTION_DIGITS),
            "1.234568"
        );
        assert_eq!(
            format_units_fixed(U256::ZERO, 18, DISPLAY_FRACTION_DIGITS),
            "0.000000"
        );
        // values beyond 2^53 keep every integer digit
        let big = U256::from(123_456_789_012_345_678_901_234_567u128);
        assert_eq!(
            format_units_fixed(big, 18, DISPLAY_FRACTION_DIGITS),
            "123456789.012346"
        );
    }

    #[test]
    fn test_format_ether() {
        let one_and_half = U256::from(1_500_000_000_000_000_000u128);
        assert_eq!(format_ether(one_and_half), "1.5");
        assert_eq!(format_ether(U256::ZERO), "0.0");
        assert_eq!(format_ether(U256::from(2_000_000_000_000_000_000u128)), "2.0");
        assert_eq!(format_ether(U256::from(1u64)), "0.000000000000000001");
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(
            iso_date_from_unix(1_704_067_200).as_deref(),
            Some("2024-01-01T00:00:00.000Z")
        );
    }

    #[test]
    fn test_parse_calendar_date() {
        let date = parse_calendar_date("2024-03-15").unwrap();
        assert_eq!(midnight_utc_timestamp(date), Some(1_710_460_800));
        assert!(parse_calendar_date("2024-3-15").is_none());
        assert!(parse_calendar_date("2024-02-30").is_none());
        assert!(parse_calendar_date("15-03-2024").is_none());
        assert!(parse_calendar_date("").is_none());
    }
}
