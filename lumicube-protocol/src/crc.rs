//! CRC16 checksums for frame payloads
//!
//! Two polynomial variants appear across protocol revisions and they are
//! not interchangeable: a frame checked with one fails with the other.
//! Both start from `0xFFFF` and have no final XOR.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Initial CRC register value
pub const CRC_INIT: u16 = 0xFFFF;

/// CRC16 polynomial variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CrcVariant {
    /// Reflected CCITT (polynomial 0x8408, LSB first)
    Ccitt,
    /// XMODEM (polynomial 0x1021, MSB first)
    #[default]
    Xmodem,
}

impl CrcVariant {
    /// Fold one byte into a CRC value
    #[inline]
    pub fn update(self, crc: u16, byte: u8) -> u16 {
        match self {
            CrcVariant::Ccitt => ccitt_update(crc, byte),
            CrcVariant::Xmodem => xmodem_update(crc, byte),
        }
    }

    /// Compute the checksum of a whole buffer starting from [`CRC_INIT`]
    pub fn checksum(self, bytes: &[u8]) -> u16 {
        bytes.iter().fold(CRC_INIT, |crc, &b| self.update(crc, b))
    }
}

/// Reflected CCITT update step
pub fn ccitt_update(crc: u16, byte: u8) -> u16 {
    let mut crc = crc ^ byte as u16;
    for _ in 0..8 {
        if crc & 0x0001 != 0 {
            crc = (crc >> 1) ^ 0x8408;
        } else {
            crc >>= 1;
        }
    }
    crc
}

/// XMODEM update step
pub fn xmodem_update(crc: u16, byte: u8) -> u16 {
    let mut crc = crc ^ ((byte as u16) << 8);
    for _ in 0..8 {
        if crc & 0x8000 != 0 {
            crc = (crc << 1) ^ 0x1021;
        } else {
            crc <<= 1;
        }
    }
    crc
}

/// Running CRC accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc16 {
    variant: CrcVariant,
    value: u16,
}

impl Crc16 {
    /// Create an accumulator at [`CRC_INIT`]
    pub const fn new(variant: CrcVariant) -> Self {
        Self {
            variant,
            value: CRC_INIT,
        }
    }

    /// Fold one byte into the accumulator
    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.value = self.variant.update(self.value, byte);
    }

    /// Current CRC value
    pub fn value(&self) -> u16 {
        self.value
    }

    /// Variant used by this accumulator
    pub fn variant(&self) -> CrcVariant {
        self.variant
    }

    /// Restart from [`CRC_INIT`]
    pub fn reset(&mut self) {
        self.value = CRC_INIT;
    }
}
