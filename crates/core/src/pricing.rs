//! Exact price arithmetic
//!
//! Reserves are `uint112` on-chain and routinely exceed 2^53, so nothing in
//! here goes through `f64`. Ratios and differences are computed by integer
//! long division in U512; a price can have up to 34 integer digits, more
//! than [`Decimal`] holds, so only base-unit amounts become [`Decimal`]s.

use alloy_primitives::{U256, U512};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{DexError, DexResult};

/// Fractional digits kept when dividing reserves.
pub const PRICE_DECIMAL_PLACES: u32 = 20;

/// Scale used for base-unit conversion of round-trip estimates.
pub const ETHER_DECIMALS: u8 = 18;

/// Fractional digits of a price difference.
pub const DIFFERENCE_DECIMAL_PLACES: u32 = 2;

/// A price as an exact decimal string, e.g. `"2"` or `"0.82667173691998644264"`.
///
/// Kept as text because a ratio of two `uint112`s can have far more
/// significant digits than [`Decimal`] holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price(String);

impl Price {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.chars().all(|c| matches!(c, '0' | '.' | '-'))
    }

    pub fn is_negative(&self) -> bool {
        self.0.starts_with('-') && !self.is_zero()
    }

    /// `(negative, digits without the point, fractional digit count)`
    fn fixed_point(&self) -> DexResult<(bool, U512, u32)> {
        let digits = self.0.strip_prefix('-').unwrap_or(&self.0);
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        let mantissa = U512::from_str(&format!("{}{}", int_part, frac_part))
            .map_err(|e| DexError::InvalidDecimal(format!("{}: {}", self.0, e)))?;
        let scale = u32::try_from(frac_part.len()).map_err(|_| DexError::InvalidDecimal(self.0.clone()))?;
        Ok((self.is_negative(), mantissa, scale))
    }
}

impl FromStr for Price {
    type Err = DexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('-').unwrap_or(s);
        let mut parts = digits.splitn(2, '.');
        let int_part = parts.next().unwrap_or_default();
        let frac_part = parts.next();

        let valid_int = !int_part.is_empty() && int_part.bytes().all(|b| b.is_ascii_digit());
        let valid_frac = frac_part.map_or(true, |f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()));

        if valid_int && valid_frac {
            Ok(Self(s.to_string()))
        } else {
            Err(DexError::InvalidDecimal(s.to_string()))
        }
    }
}

impl TryFrom<String> for Price {
    type Error = DexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `reserve0 / reserve1`, rounded half-up to `decimal_places` fractional
/// digits with trailing zeros stripped.
pub fn price_from_reserves(reserve0: U256, reserve1: U256, decimal_places: u32) -> DexResult<Price> {
    if reserve1.is_zero() {
        return Err(DexError::DivisionByZero("reserve1 is zero"));
    }

    let scale = U512::from(10u8)
        .checked_pow(U512::from(decimal_places))
        .ok_or(DexError::Overflow("price scale"))?;
    let numerator = U512::from(reserve0)
        .checked_mul(scale)
        .ok_or(DexError::Overflow("scaled reserve0"))?;
    let denominator = U512::from(reserve1);

    let mut quotient = numerator / denominator;
    let remainder = numerator % denominator;
    // remainder < denominator < 2^256, so doubling cannot overflow U512
    if remainder * U512::from(2u8) >= denominator {
        quotient += U512::from(1u8);
    }

    Ok(Price(format_fixed(&quotient.to_string(), decimal_places as usize)))
}

/// Percentage difference of two prices as a two-decimal string.
///
/// `((price_a - price_b) / price_b) * 100`, computed exactly and rounded half
/// away from zero. Positive means `price_a` is above `price_b`.
pub fn calculate_difference(price_a: &Price, price_b: &Price) -> DexResult<String> {
    let (negative_a, mantissa_a, scale_a) = price_a.fixed_point()?;
    let (negative_b, mantissa_b, scale_b) = price_b.fixed_point()?;
    if mantissa_b.is_zero() {
        return Err(DexError::DivisionByZero("reference price is zero"));
    }

    let scale = scale_a.max(scale_b);
    let a = shift_left(mantissa_a, scale - scale_a)?;
    let b = shift_left(mantissa_b, scale - scale_b)?;

    let (negative_delta, delta) = if negative_a != negative_b {
        (negative_a, a.checked_add(b).ok_or(DexError::Overflow("price difference"))?)
    } else if a >= b {
        (negative_a, a - b)
    } else {
        (!negative_a, b - a)
    };

    // percent with two fractional digits: delta * 100 * 10^2 / b
    let numerator = shift_left(delta, 2 + DIFFERENCE_DECIMAL_PLACES)?;
    let mut hundredths = numerator / b;
    let remainder = numerator % b;
    if remainder >= b - remainder {
        hundredths += U512::from(1u8);
    }

    let digits = format!("{:0>width$}", hundredths.to_string(), width = DIFFERENCE_DECIMAL_PLACES as usize + 1);
    let (int_part, frac_part) = digits.split_at(digits.len() - DIFFERENCE_DECIMAL_PLACES as usize);
    let sign = if negative_delta != negative_b && !hundredths.is_zero() { "-" } else { "" };
    Ok(format!("{}{}.{}", sign, int_part, frac_part))
}

/// A [`calculate_difference`] result as a [`Decimal`], saturating at
/// `Decimal::MAX` / `Decimal::MIN` for differences beyond its range.
pub fn parse_difference(difference: &str) -> DexResult<Decimal> {
    match Decimal::from_str(difference) {
        Ok(value) => Ok(value),
        Err(_) => {
            let value: Price = difference.parse()?;
            Ok(if value.is_negative() { Decimal::MIN } else { Decimal::MAX })
        }
    }
}

fn shift_left(value: U512, places: u32) -> DexResult<U512> {
    U512::from(10u8)
        .checked_pow(U512::from(places))
        .and_then(|scale| value.checked_mul(scale))
        .ok_or(DexError::Overflow("decimal scale"))
}

/// Exact conversion of a base-unit amount to a human-scale decimal.
pub fn from_base_units(amount: U256, decimals: u8) -> DexResult<Decimal> {
    let divisor = U256::from(10u8)
        .checked_pow(U256::from(decimals))
        .ok_or(DexError::Overflow("decimal scale"))?;
    let whole = amount / divisor;
    let fraction = amount % divisor;

    let text = if decimals == 0 {
        whole.to_string()
    } else {
        format!("{}.{:0>width$}", whole, fraction.to_string(), width = decimals as usize)
    };

    Decimal::from_str(&text)
        .map(|d| d.normalize())
        .map_err(|e| DexError::InvalidDecimal(format!("{}: {}", text, e)))
}

/// Base units for a human-scale amount; fractional base units are truncated.
pub fn to_base_units(amount: Decimal, decimals: u8) -> DexResult<U256> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DexError::InvalidDecimal(format!("negative amount {}", amount)));
    }

    let mantissa = u128::try_from(amount.mantissa())
        .map_err(|_| DexError::InvalidDecimal(amount.to_string()))?;
    let mantissa = U256::from(mantissa);
    let scale = amount.scale();
    let decimals = u32::from(decimals);

    let ten = U256::from(10u8);
    if decimals >= scale {
        let factor = ten
            .checked_pow(U256::from(decimals - scale))
            .ok_or(DexError::Overflow("decimal scale"))?;
        mantissa.checked_mul(factor).ok_or(DexError::Overflow("base units"))
    } else {
        Ok(mantissa / ten.pow(U256::from(scale - decimals)))
    }
}

fn format_fixed(digits: &str, decimal_places: usize) -> String {
    if decimal_places == 0 {
        return digits.to_string();
    }

    let padded = format!("{:0>width$}", digits, width = decimal_places + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - decimal_places);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}
