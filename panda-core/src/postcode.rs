//! UK postcode validation and normalization.
//!
//! Accepts varying whitespace and hyphen layouts and produces the canonical
//! "OUTWARD INWARD" form, e.g. `"TR7-2SS"` -> `"TR7 2SS"`. The inward code
//! is always a digit followed by two letters; the outward code is one or two
//! letters, a digit, then an optional digit or letter.

use crate::error::{PandaError, Result};

/// Normalize a UK postcode to canonical form, rejecting malformed input.
pub fn normalize_postcode(raw: &str) -> Result<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if !(5..=7).contains(&compact.len()) || !compact.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(malformed(raw));
    }

    let (outward, inward) = compact.split_at(compact.len() - 3);
    if !inward_valid(inward.as_bytes()) || !outward_valid(outward.as_bytes()) {
        return Err(malformed(raw));
    }

    Ok(format!("{outward} {inward}"))
}

fn inward_valid(iw: &[u8]) -> bool {
    iw[0].is_ascii_digit() && iw[1].is_ascii_alphabetic() && iw[2].is_ascii_alphabetic()
}

fn outward_valid(ow: &[u8]) -> bool {
    match ow.len() {
        // A9
        2 => ow[0].is_ascii_alphabetic() && ow[1].is_ascii_digit(),
        // AA9, A99 or A9A
        3 => {
            ow[0].is_ascii_alphabetic()
                && ((ow[1].is_ascii_alphabetic() && ow[2].is_ascii_digit())
                    || (ow[1].is_ascii_digit() && ow[2].is_ascii_alphanumeric()))
        }
        // AA99 or AA9A
        4 => {
            ow[0].is_ascii_alphabetic()
                && ow[1].is_ascii_alphabetic()
                && ow[2].is_ascii_digit()
                && ow[3].is_ascii_alphanumeric()
        }
        _ => false,
    }
}

fn malformed(raw: &str) -> PandaError {
    PandaError::Format(format!("Not a valid UK postcode: {raw:?}"))
}
