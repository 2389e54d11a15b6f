//! Conversion between share values written in a radix (2 to 36) and exact integers.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::{AuditError, Result};

pub const MIN_BASE: u32 = 2;
pub const MAX_BASE: u32 = 36;

fn check_base(base: u32) -> Result<()> {
    if (MIN_BASE..=MAX_BASE).contains(&base) {
        Ok(())
    } else {
        Err(AuditError::InvalidBase(base))
    }
}

/// Decodes `value` as a base-`base` numeral.
///
/// Digits are `0-9` followed by the letters `a-z` (case-insensitive), so only
/// the first `base` symbols of that alphabet are accepted.
pub fn decode(value: &str, base: u32) -> Result<BigUint> {
    check_base(base)?;
    if value.is_empty() {
        return Err(AuditError::EmptyValue);
    }

    let mut acc = BigUint::zero();
    for digit in value.chars() {
        let d = digit
            .to_digit(base)
            .ok_or(AuditError::InvalidDigit { digit, base })?;
        acc = acc * base + d;
    }
    Ok(acc)
}

/// Inverse of [`decode`], lowercase digits, no leading zeros.
pub fn encode(value: &BigUint, base: u32) -> Result<String> {
    check_base(base)?;
    Ok(value.to_str_radix(base))
}
