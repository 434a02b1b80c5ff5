//! NHS number checksum validation.
//!
//! An NHS number is ten digits, the last being an error-detecting checksum:
//! each of the first nine digits is multiplied by (11 minus its 1-based
//! position), the products are summed and the remainder mod 11 is subtracted
//! from 11. A check value of 11 means the final digit must be 0; a check
//! value of 10 means the number is invalid outright.

use crate::error::{PandaError, Result};

/// Validate an NHS number's format and checksum.
///
/// Returns `Err(Format)` when the input is not exactly ten ASCII digits —
/// no trimming or reformatting is attempted here. On well-formed input,
/// returns whether the checksum holds.
pub fn is_valid_nhs_number(candidate: &str) -> Result<bool> {
    if candidate.len() != 10 || !candidate.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PandaError::Format(format!(
            "The NHS number should be 10 digits with no alpha characters, got: {candidate:?}"
        )));
    }

    let digits: Vec<u32> = candidate.bytes().map(|b| u32::from(b - b'0')).collect();
    let total: u32 = digits[..9]
        .iter()
        .enumerate()
        .map(|(i, d)| d * (10 - i as u32))
        .sum();

    let check = 11 - (total % 11);
    Ok(match check {
        11 => digits[9] == 0,
        10 => false,
        c => c == digits[9],
    })
}
