//! Non-volatile configuration storage
//!
//! The cube keeps a handful of small values across power cycles: the
//! operating mode, selected effect and playlist, the scrolling text and the
//! device address. Implementations map each [`StorageKey`] to an EEPROM
//! cell or a flash key/value record.

/// Storage keys for persisted configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Operating mode selected over the serial link
    OperatingMode = 0,
    /// Effect index used in effect mode
    Effect = 1,
    /// Playlist index used in playlist mode
    Playlist = 2,
    /// Raw text shown by text effects
    EffectText = 3,
    /// 64-bit device address
    DeviceAddress = 4,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::OperatingMode),
            1 => Some(StorageKey::Effect),
            2 => Some(StorageKey::Playlist),
            3 => Some(StorageKey::EffectText),
            4 => Some(StorageKey::DeviceAddress),
            _ => None,
        }
    }
}

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Underlying memory operation failed
    Storage,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
}

/// Key/value configuration storage
///
/// Reads and writes are synchronous: the render loop is single threaded
/// and persistence only happens between frames.
pub trait ConfigStorage {
    /// Read a value by key into the provided buffer
    ///
    /// Returns the number of bytes read.
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value by key
    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: StorageKey) -> bool {
        let mut empty = [0u8; 0];
        !matches!(self.read(key, &mut empty), Err(StorageError::NotFound))
    }
}

/// Flash map records are keyed by the single byte [`StorageKey::as_u8`]
#[cfg(feature = "sequential-storage")]
mod flash_key {
    use sequential_storage::map::{Key, SerializationError};

    use super::StorageKey;

    impl Key for StorageKey {
        fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
            let slot = buffer.first_mut().ok_or(SerializationError::BufferTooSmall)?;
            *slot = self.as_u8();
            Ok(1)
        }

        fn deserialize_from(buffer: &[u8]) -> Result<(Self, usize), SerializationError> {
            let &byte = buffer.first().ok_or(SerializationError::BufferTooSmall)?;
            let key = StorageKey::from_u8(byte).ok_or(SerializationError::InvalidFormat)?;
            Ok((key, 1))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_flash_key_is_one_byte() {
            for value in 0..=4u8 {
                let key = StorageKey::from_u8(value).unwrap();
                let mut buffer = [0xAAu8; 4];
                assert!(matches!(key.serialize_into(&mut buffer), Ok(1)));
                assert_eq!(buffer, [value, 0xAA, 0xAA, 0xAA]);
                assert!(matches!(StorageKey::deserialize_from(&buffer), Ok((k, 1)) if k == key));
            }
        }

        #[test]
        fn test_flash_key_rejects_bad_buffers() {
            assert!(matches!(
                StorageKey::OperatingMode.serialize_into(&mut []),
                Err(SerializationError::BufferTooSmall)
            ));
            assert!(matches!(
                StorageKey::deserialize_from(&[]),
                Err(SerializationError::BufferTooSmall)
            ));
            assert!(matches!(
                StorageKey::deserialize_from(&[5]),
                Err(SerializationError::InvalidFormat)
            ));
        }
    }
}
