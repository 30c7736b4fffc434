//! Conversion between base-unit integers and decimal display amounts.

use crate::error::{MarketError, Result};
use alloy_primitives::utils::{self, Unit};
use alloy_primitives::U256;

/// Decimal places of the chain's native currency
pub const NATIVE_DECIMALS: u8 = 18;

/// Format a base-unit amount as a decimal string.
///
/// Trailing zeros of the fractional part are removed but at least one
/// fractional digit is kept, so `10^18` renders as `"1.0"` and
/// `1.5 * 10^18` as `"1.5"`.
pub fn format_units(amount: U256, decimals: u8) -> Result<String> {
    let formatted = utils::format_units(amount, decimals)
        .map_err(|e| MarketError::InvalidAmount(e.to_string()))?;
    Ok(trim_fraction(&formatted))
}

/// Format a base-unit amount of the native currency.
pub fn format_ether(amount: U256) -> String {
    trim_fraction(&utils::format_ether(amount))
}

fn trim_fraction(formatted: &str) -> String {
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            let fraction = if fraction.is_empty() { "0" } else { fraction };
            format!("{}.{}", whole, fraction)
        }
        None => format!("{}.0", formatted),
    }
}

/// Parse a decimal string into base units.
///
/// Only unsigned decimals are accepted, and a fraction longer than
/// `decimals` is an error rather than being truncated.
pub fn parse_units(value: &str, decimals: u8) -> Result<U256> {
    let invalid = || MarketError::InvalidAmount(value.to_string());
    let trimmed = value.trim();

    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty())
        || !digits(whole)
        || !digits(fraction)
        || fraction.len() > decimals as usize
    {
        return Err(invalid());
    }

    let unit = Unit::new(decimals).ok_or_else(invalid)?;
    let parsed = utils::ParseUnits::parse_units(trimmed, unit).map_err(|_| invalid())?;
    Ok(parsed.get_absolute())
}

/// Parse a decimal string into base units of the native currency.
pub fn parse_ether(value: &str) -> Result<U256> {
    parse_units(value, NATIVE_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ether() {
        let amount = U256::from(1_500_000_000_000_000_000u128);
        assert_eq!(format_ether(amount), "1.5");
        assert_eq!(format_ether(U256::from(1_000_000_000_000_000_000u128)), "1.0");
        assert_eq!(format_ether(U256::ZERO), "0.0");
        assert_eq!(format_ether(U256::from(1u8)), "0.000000000000000001");
    }

    #[test]
    fn test_format_units_small_scale() {
        assert_eq!(format_units(U256::from(123_450u64), 4).unwrap(), "12.345");
        assert_eq!(format_units(U256::from(7u64), 0).unwrap(), "7.0");
        assert!(format_units(U256::from(7u64), 200).is_err());
    }

    #[test]
    fn test_parse_ether() {
        assert_eq!(
            parse_ether("1.5").unwrap(),
            U256::from(1_500_000_000_000_000_000u128)
        );
        assert_eq!(parse_ether("2").unwrap(), U256::from(2_000_000_000_000_000_000u128));
        assert_eq!(parse_ether(" .25 ").unwrap(), U256::from(250_000_000_000_000_000u128));
        assert_eq!(parse_units("2000", 0).unwrap(), U256::from(2000u64));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_ether("").is_err());
        assert!(parse_ether(".").is_err());
        assert!(parse_ether("abc").is_err());
        assert!(parse_ether("1.2.3").is_err());
        assert!(parse_ether("-1").is_err());
        assert!(parse_ether("0.0000000000000000001").is_err());
    }
}
