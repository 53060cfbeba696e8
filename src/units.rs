//! Fixed-point token amounts.
//!
//! Amounts cross the contract boundary as integers scaled by the token's
//! decimal count. Conversion to and from human decimal strings happens here
//! and nowhere else.

use serde::{
    Deserialize,
    Serialize,
};
use std::fmt;
use thiserror::Error;

#[derive(
    Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(pub u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    #[error("'{0}' is not a valid decimal amount")]
    InvalidNumber(String),
    #[error("'{input}' has more than {decimals} decimal places")]
    TooManyDecimals { input: String, decimals: u8 },
    #[error("'{0}' does not fit in the token's units")]
    Overflow(String),
}

fn pow10(decimals: u8) -> Result<u128, UnitsError> {
    10u128
        .checked_pow(decimals as u32)
        .ok_or_else(|| UnitsError::Overflow(format!("10^{decimals}")))
}

/// Parses a human decimal string (e.g. "12.5") into base units.
pub fn parse_units(input: &str, decimals: u8) -> Result<Amount, UnitsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') || trimmed.starts_with('+') {
        return Err(UnitsError::InvalidNumber(input.to_string()));
    }
    let (integral, fractional) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };
    if integral.is_empty() && fractional.is_empty() {
        return Err(UnitsError::InvalidNumber(input.to_string()));
    }
    if fractional.len() > decimals as usize {
        return Err(UnitsError::TooManyDecimals {
            input: input.to_string(),
            decimals,
        });
    }
    let parse_part = |part: &str| -> Result<u128, UnitsError> {
        if part.is_empty() {
            return Ok(0);
        }
        part.parse::<u128>()
            .map_err(|_| UnitsError::InvalidNumber(input.to_string()))
    };
    let integral = parse_part(integral)?;
    let mut fractional_units = parse_part(fractional)?;
    let scale = pow10(decimals)?;
    let pad = pow10((decimals as usize - fractional.len()) as u8)?;
    fractional_units = fractional_units
        .checked_mul(pad)
        .ok_or_else(|| UnitsError::Overflow(input.to_string()))?;
    let units = integral
        .checked_mul(scale)
        .and_then(|scaled| scaled.checked_add(fractional_units))
        .ok_or_else(|| UnitsError::Overflow(input.to_string()))?;
    Ok(Amount(units))
}

/// Formats base units as a human decimal string, trimming trailing zeros.
pub fn format_units(amount: Amount, decimals: u8) -> String {
    if decimals == 0 {
        return amount.0.to_string();
    }
    let scale = 10u128.saturating_pow(decimals as u32);
    let integral = amount.0 / scale;
    let fractional = amount.0 % scale;
    if fractional == 0 {
        return integral.to_string();
    }
    let fractional = format!("{:0width$}", fractional, width = decimals as usize);
    let fractional = fractional.trim_end_matches('0');
    format!("{integral}.{fractional}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_units__scales_by_decimals() {
        assert_eq!(parse_units("12.5", 9).unwrap(), Amount(12_500_000_000));
        assert_eq!(parse_units("0.000000001", 9).unwrap(), Amount(1));
        assert_eq!(parse_units("7", 0).unwrap(), Amount(7));
    }

    #[test]
    fn parse_units__rejects_garbage() {
        assert!(parse_units("", 9).is_err());
        assert!(parse_units("-5", 9).is_err());
        assert!(parse_units("1.2.3", 9).is_err());
        assert!(parse_units(".", 9).is_err());
        assert!(matches!(
            parse_units("0.0000000001", 9),
            Err(UnitsError::TooManyDecimals { .. })
        ));
    }

    #[test]
    fn format_units__round_trips_and_trims() {
        assert_eq!(format_units(Amount(12_500_000_000), 9), "12.5");
        assert_eq!(format_units(Amount(1), 9), "0.000000001");
        assert_eq!(format_units(Amount(3_000_000_000), 9), "3");
    }
}
