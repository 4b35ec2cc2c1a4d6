//! Byte counts as typed on the command line and shown in summaries.

use crate::error::{Result, TidemarkError};

/// Binary units, smallest first. Each step is a factor of 1024.
const UNITS: [char; 5] = ['B', 'K', 'M', 'G', 'T'];

/// Parse a byte count such as `4096`, `64K`, `1M` or `2GiB`.
///
/// The number must be a whole count. The unit is one letter out of
/// `B K M G T` (any case, binary multiples), optionally followed by `B` or
/// `iB`.
pub fn parse_size(input: &str) -> Result<u64> {
    let text = input.trim();
    let invalid = |reason: &str| TidemarkError::InvalidSize(input.to_string(), reason.to_string());

    let digits_end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, unit) = text.split_at(digits_end);
    if digits.is_empty() {
        return Err(invalid("Expected a whole number of bytes"));
    }

    let count: u64 = digits.parse().map_err(|_| invalid("Number is too large"))?;
    let shift = unit_shift(unit).ok_or_else(|| invalid("Unknown unit, expected B, K, M, G or T"))?;

    count
        .checked_mul(1u64 << shift)
        .ok_or_else(|| invalid("Size does not fit in 64 bits"))
}

/// Power-of-two exponent for a unit suffix, `None` if it is not one.
fn unit_shift(unit: &str) -> Option<u32> {
    let mut chars = unit.chars();
    let Some(letter) = chars.next() else {
        return Some(0);
    };
    let index = UNITS
        .iter()
        .position(|u| u.eq_ignore_ascii_case(&letter))?;

    let rest = chars.as_str();
    let tail_ok = rest.is_empty()
        || (index > 0 && (rest.eq_ignore_ascii_case("b") || rest.eq_ignore_ascii_case("ib")));
    tail_ok.then_some(index as u32 * 10)
}

/// Render a byte count with the largest binary unit it reaches.
pub fn format_size(bytes: u64) -> String {
    let magnitude = (u64::BITS - bytes.leading_zeros()).saturating_sub(1) / 10;
    let index = magnitude.min(UNITS.len() as u32 - 1) as usize;

    if index == 0 {
        return format!("{bytes} B");
    }
    let scaled = bytes as f64 / (1u64 << (index * 10)) as f64;
    format!("{scaled:.1} {}iB", UNITS[index])
}
