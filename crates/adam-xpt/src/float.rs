//! IBM mainframe floating point conversion.
//!
//! XPT stores numerics as IBM System/360 hexadecimal doubles: one sign bit,
//! a 7-bit excess-64 base-16 exponent and a 56-bit fraction. Missing values
//! are encoded by a code byte followed by zero bytes.

use crate::types::MissingValue;

const FRACTION_MASK: u64 = 0x00ff_ffff_ffff_ffff;
const FRACTION_BITS: i32 = 56;
const EXPONENT_BIAS: i32 = 64;

/// Convert an 8-byte IBM double to IEEE 754.
#[must_use]
pub fn ibm_to_ieee(bytes: [u8; 8]) -> f64 {
    let ibm = u64::from_be_bytes(bytes);
    let fraction = ibm & FRACTION_MASK;
    let negative = ibm >> 63 == 1;
    if fraction == 0 {
        return if negative { -0.0 } else { 0.0 };
    }
    let exponent = ((ibm >> 56) & 0x7f) as i32;
    // fraction * 2^-56 * 16^(exponent - 64), both factors exact powers of two
    let magnitude = (fraction as f64) * 2f64.powi(4 * (exponent - EXPONENT_BIAS) - FRACTION_BITS);
    if negative { -magnitude } else { magnitude }
}

/// Convert an IEEE 754 double to an 8-byte IBM double.
///
/// Values too large for the IBM range saturate to the largest representable
/// magnitude; values too small underflow to zero. NaN and infinities have no
/// IBM encoding and are written as the standard missing value.
#[must_use]
pub fn ieee_to_ibm(value: f64) -> [u8; 8] {
    if !value.is_finite() {
        return encode_missing(MissingValue::Standard);
    }
    if value == 0.0 {
        return [0u8; 8];
    }

    let sign: u64 = if value.is_sign_negative() { 0x80 } else { 0 };
    let mut fraction = value.abs();
    let mut exponent = EXPONENT_BIAS;
    while fraction >= 1.0 {
        fraction /= 16.0;
        exponent += 1;
    }
    while fraction < 0.0625 {
        fraction *= 16.0;
        exponent -= 1;
    }

    if exponent > 127 {
        return ((sign | 0x7f) << 56 | FRACTION_MASK).to_be_bytes();
    }
    if exponent < 0 {
        return [0u8; 8];
    }

    let mut mantissa = (fraction * 2f64.powi(FRACTION_BITS)).round() as u64;
    if mantissa > FRACTION_MASK {
        mantissa >>= 4;
        exponent += 1;
    }
    ((sign | exponent as u64) << 56 | mantissa).to_be_bytes()
}

/// Detect a SAS missing value encoding.
///
/// Returns the missing kind when the first byte is a missing code (`.`, `_`,
/// `A`-`Z`) and every remaining byte is zero.
#[must_use]
pub fn is_missing(bytes: &[u8]) -> Option<MissingValue> {
    let (first, rest) = bytes.split_first()?;
    if rest.iter().any(|&b| b != 0) {
        return None;
    }
    MissingValue::from_code(*first)
}

/// Encode a missing value as 8 XPT bytes.
#[must_use]
pub fn encode_missing(missing: MissingValue) -> [u8; 8] {
    let mut bytes = [0u8; 8];
    bytes[0] = missing.code();
    bytes
}
