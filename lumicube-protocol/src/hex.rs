//! ASCII hex encoding used on the wire
//!
//! Every payload byte travels as two uppercase hex digits, high nibble
//! first. Control octets (`K`, `N`, `S`) are never valid hex digits, which
//! keeps them unambiguous inside a frame.

/// Errors from hex decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HexError {
    /// Character outside `[0-9A-F]`
    InvalidHexDigit,
}

/// Convert a nibble (0-15) to its uppercase hex digit
#[inline]
pub const fn nibble_to_digit(nibble: u8) -> u8 {
    let n = nibble & 0x0F;
    if n < 10 {
        b'0' + n
    } else {
        b'A' + (n - 10)
    }
}

/// Convert an uppercase hex digit to its nibble value
#[inline]
pub const fn digit_to_nibble(digit: u8) -> Result<u8, HexError> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => Err(HexError::InvalidHexDigit),
    }
}

/// Encode a byte as two hex digits
#[inline]
pub const fn encode_byte(byte: u8) -> [u8; 2] {
    [nibble_to_digit(byte >> 4), nibble_to_digit(byte)]
}

/// Decode two hex digits into a byte
#[inline]
pub fn decode_pair(high: u8, low: u8) -> Result<u8, HexError> {
    Ok((digit_to_nibble(high)? << 4) | digit_to_nibble(low)?)
}

/// Incremental decoder for a stream of hex digits
///
/// Holds the high nibble between calls so bytes can be fed one at a time
/// straight from the UART.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexPairDecoder {
    high: Option<u8>,
}

impl HexPairDecoder {
    /// Create an empty decoder
    pub const fn new() -> Self {
        Self { high: None }
    }

    /// Discard a half-received pair
    pub fn reset(&mut self) {
        self.high = None;
    }

    /// Feed one digit
    ///
    /// Returns `Ok(Some(byte))` when a pair is complete. On error the
    /// partial pair is discarded.
    pub fn feed(&mut self, digit: u8) -> Result<Option<u8>, HexError> {
        let nibble = match digit_to_nibble(digit) {
            Ok(n) => n,
            Err(e) => {
                self.high = None;
                return Err(e);
            }
        };

        match self.high.take() {
            None => {
                self.high = Some(nibble);
                Ok(None)
            }
            Some(high) => Ok(Some((high << 4) | nibble)),
        }
    }
}
