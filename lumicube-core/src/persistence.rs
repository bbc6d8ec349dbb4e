//! Configuration persistence
//!
//! Single values are stored as postcard encodings under their
//! [`StorageKey`]. Effect text is stored as raw bytes.

use heapless::Vec;
use lumicube_hal::{ConfigStorage, StorageError, StorageKey};

use crate::state::Mode;

/// Maximum effect text length
pub const MAX_TEXT_LEN: usize = 32;

/// Largest postcard encoding of a stored value (u64 varint)
const MAX_VALUE_SIZE: usize = 10;

/// Persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistenceError {
    /// Storage operation failed
    Storage(StorageError),
    /// Serialization failed
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Stored value decodes but is out of range
    InvalidValue,
}

impl From<StorageError> for PersistenceError {
    fn from(e: StorageError) -> Self {
        PersistenceError::Storage(e)
    }
}

/// Typed access to the configuration store
pub struct Persistence<S> {
    storage: S,
}

impl<S: ConfigStorage> Persistence<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn load_u8(&mut self, key: StorageKey) -> Result<u8, PersistenceError> {
        let mut buffer = [0u8; MAX_VALUE_SIZE];
        let len = self.storage.read(key, &mut buffer)?;
        postcard::from_bytes(&buffer[..len]).map_err(|_| PersistenceError::Deserialize)
    }

    fn save_u8(&mut self, key: StorageKey, value: u8) -> Result<(), PersistenceError> {
        let mut buffer = [0u8; MAX_VALUE_SIZE];
        let bytes =
            postcard::to_slice(&value, &mut buffer).map_err(|_| PersistenceError::Serialize)?;
        self.storage.write(key, bytes)?;
        Ok(())
    }

    pub fn read_mode(&mut self) -> Result<Mode, PersistenceError> {
        let raw = self.load_u8(StorageKey::OperatingMode)?;
        Mode::from_u8(raw).ok_or(PersistenceError::InvalidValue)
    }

    pub fn store_mode(&mut self, mode: Mode) -> Result<(), PersistenceError> {
        self.save_u8(StorageKey::OperatingMode, mode.as_u8())
    }

    pub fn read_effect(&mut self) -> Result<u8, PersistenceError> {
        self.load_u8(StorageKey::Effect)
    }

    pub fn store_effect(&mut self, effect: u8) -> Result<(), PersistenceError> {
        self.save_u8(StorageKey::Effect, effect)
    }

    pub fn read_playlist(&mut self) -> Result<u8, PersistenceError> {
        self.load_u8(StorageKey::Playlist)
    }

    pub fn store_playlist(&mut self, playlist: u8) -> Result<(), PersistenceError> {
        self.save_u8(StorageKey::Playlist, playlist)
    }

    pub fn read_address(&mut self) -> Result<u64, PersistenceError> {
        let mut buffer = [0u8; MAX_VALUE_SIZE];
        let len = self.storage.read(StorageKey::DeviceAddress, &mut buffer)?;
        postcard::from_bytes(&buffer[..len]).map_err(|_| PersistenceError::Deserialize)
    }

    pub fn store_address(&mut self, address: u64) -> Result<(), PersistenceError> {
        let mut buffer = [0u8; MAX_VALUE_SIZE];
        let bytes =
            postcard::to_slice(&address, &mut buffer).map_err(|_| PersistenceError::Serialize)?;
        self.storage.write(StorageKey::DeviceAddress, bytes)?;
        Ok(())
    }

    /// Read the effect text
    ///
    /// A missing record reads as empty text.
    pub fn read_text(&mut self) -> Result<Vec<u8, MAX_TEXT_LEN>, PersistenceError> {
        let mut buffer = [0u8; MAX_TEXT_LEN];
        let len = match self.storage.read(StorageKey::EffectText, &mut buffer) {
            Ok(len) => len,
            Err(StorageError::NotFound) => 0,
            Err(e) => return Err(e.into()),
        };
        Vec::from_slice(&buffer[..len]).map_err(|_| PersistenceError::Deserialize)
    }

    /// Store the effect text, truncated to [`MAX_TEXT_LEN`]
    pub fn store_text(&mut self, text: &[u8]) -> Result<(), PersistenceError> {
        let len = text.len().min(MAX_TEXT_LEN);
        self.storage.write(StorageKey::EffectText, &text[..len])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockStorage;

    #[test]
    fn test_missing_values_are_not_found() {
        let mut persistence = Persistence::new(MockStorage::new());
        assert_eq!(
            persistence.read_mode(),
            Err(PersistenceError::Storage(StorageError::NotFound))
        );
        assert_eq!(persistence.read_text().map(|t| t.len()), Ok(0));
    }

    #[test]
    fn test_values_survive_roundtrip() {
        let mut persistence = Persistence::new(MockStorage::new());
        persistence.store_mode(Mode::Playlist).unwrap();
        persistence.store_effect(7).unwrap();
        persistence.store_playlist(2).unwrap();
        persistence.store_address(0xFEED_0000_BEEF).unwrap();
        persistence.store_text(b"hello").unwrap();

        assert_eq!(persistence.read_mode(), Ok(Mode::Playlist));
        assert_eq!(persistence.read_effect(), Ok(7));
        assert_eq!(persistence.read_playlist(), Ok(2));
        assert_eq!(persistence.read_address(), Ok(0xFEED_0000_BEEF));
        assert_eq!(&persistence.read_text().unwrap()[..], b"hello");
    }

    #[test]
    fn test_out_of_range_mode_rejected() {
        let mut persistence = Persistence::new(MockStorage::new());
        persistence
            .storage_mut()
            .write(StorageKey::OperatingMode, &[9])
            .unwrap();
        assert_eq!(persistence.read_mode(), Err(PersistenceError::InvalidValue));
    }

    #[test]
    fn test_failing_storage_surfaces_error() {
        let mut storage = MockStorage::new();
        storage.fail_writes = true;
        let mut persistence = Persistence::new(storage);
        assert_eq!(
            persistence.store_effect(1),
            Err(PersistenceError::Storage(StorageError::Storage))
        );
    }
}
