//! Single hex digit encoding used by the dual RGB serial protocol.

use crate::prelude::*;

/// Encode `value` as one upper case ASCII hex digit.
///
/// ```rust
/// assert_eq!(bl_devices::hex::encode_nibble(11).unwrap(), b'B');
/// assert!(bl_devices::hex::encode_nibble(16).is_err());
/// ```
pub fn encode_nibble(value: usize) -> Result<u8> {
    match value {
        0..=9 => Ok(b'0' + value as u8),
        10..=15 => Ok(b'A' + (value - 10) as u8),
        _ => Err(Error::InvalidNibble(value)),
    }
}

/// Decode an ASCII hex digit produced by [`encode_nibble`].
pub fn decode_nibble(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_nibble_round_trips() {
        for value in 0..=15usize {
            let digit = encode_nibble(value).expect("in range");
            assert_eq!(decode_nibble(digit), Some(value as u8));
        }
    }

    #[test]
    fn digits_and_letters() {
        assert_eq!(encode_nibble(0).expect("in range"), b'0');
        assert_eq!(encode_nibble(9).expect("in range"), b'9');
        assert_eq!(encode_nibble(10).expect("in range"), b'A');
        assert_eq!(encode_nibble(15).expect("in range"), b'F');
    }

    #[test]
    fn out_of_range_values_are_errors() {
        for value in [16usize, 32, 255, usize::MAX] {
            assert!(matches!(encode_nibble(value), Err(Error::InvalidNibble(v)) if v == value));
        }
        assert_eq!(decode_nibble(b'a'), None);
        assert_eq!(decode_nibble(b'G'), None);
    }
}
