//! Bounds-checked reader over a packet payload

/// Errors from cursor reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CursorError {
    /// Read past the end of the payload
    Exhausted,
}

/// Read offset into a payload
///
/// Multi-byte values are little-endian. A failed read leaves the offset
/// where it was.
#[derive(Debug, Clone)]
pub struct MessageCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MessageCursor<'a> {
    /// Start reading at the first byte of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether any byte is left
    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Current read offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Take the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CursorError> {
        if len > self.remaining() {
            return Err(CursorError::Exhausted);
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CursorError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Step over `len` bytes
    pub fn skip(&mut self, len: usize) -> Result<(), CursorError> {
        self.read_bytes(len).map(|_| ())
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8, CursorError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a little-endian `u16`
    pub fn read_u16(&mut self) -> Result<u16, CursorError> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Read a little-endian `u32`
    pub fn read_u32(&mut self) -> Result<u32, CursorError> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Read a little-endian `i32`
    pub fn read_i32(&mut self) -> Result<i32, CursorError> {
        self.read_array().map(i32::from_le_bytes)
    }

    /// Read a little-endian `u64`
    pub fn read_u64(&mut self) -> Result<u64, CursorError> {
        self.read_array().map(u64::from_le_bytes)
    }
}
