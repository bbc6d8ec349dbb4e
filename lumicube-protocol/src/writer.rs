//! Two-pass response writer
//!
//! Responses are length prefixed, but the device has no room to buffer a
//! whole variable-length response. Handlers therefore run twice: once in
//! [`ExecMode::SizeOnly`] to count the payload bytes, then in
//! [`ExecMode::Apply`] with the length known up front, streaming hex pairs
//! straight into the sink.

use crate::crc::{Crc16, CrcVariant};
use crate::frame::{PACKET_BEGIN, STX};
use crate::hex::encode_byte;
use crate::packet::PacketHeader;
use crate::zcl::{MAX_LONG_OCTET_STRING_LEN, MAX_OCTET_STRING_LEN};

/// Destination for encoded response bytes
pub trait ByteSink {
    /// Emit raw bytes
    fn put(&mut self, bytes: &[u8]);
}

/// Bytes that do not fit are dropped
impl<const N: usize> ByteSink for heapless::Vec<u8, N> {
    fn put(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if self.push(b).is_err() {
                return;
            }
        }
    }
}

/// Execution mode threaded through every command handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExecMode {
    /// Count response bytes, emit nothing, mutate nothing
    SizeOnly,
    /// Emit response bytes and apply side effects
    Apply,
}

impl ExecMode {
    /// True when side effects should happen
    #[inline]
    pub fn is_apply(self) -> bool {
        matches!(self, ExecMode::Apply)
    }
}

/// Hex/CRC framed response writer
pub struct ResponseWriter<'s, S: ByteSink> {
    mode: ExecMode,
    crc: Crc16,
    sink: &'s mut S,
    length: usize,
}

impl<'s, S: ByteSink> ResponseWriter<'s, S> {
    /// Create a writer for one pass
    pub fn new(mode: ExecMode, variant: CrcVariant, sink: &'s mut S) -> Self {
        Self {
            mode,
            crc: Crc16::new(variant),
            sink,
            length: 0,
        }
    }

    /// Mode of this pass
    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    /// Payload bytes counted or emitted so far
    pub fn length(&self) -> usize {
        self.length
    }

    /// Emit the frame start and the payload length
    ///
    /// The length is not part of the payload and is not covered by the CRC.
    pub fn begin(&mut self, payload_len: u16) {
        if !self.mode.is_apply() {
            return;
        }
        self.sink.put(&[STX, PACKET_BEGIN]);
        for b in payload_len.to_le_bytes() {
            self.sink.put(&encode_byte(b));
        }
    }

    /// Append one payload byte
    pub fn put_u8(&mut self, byte: u8) {
        self.length += 1;
        if self.mode.is_apply() {
            self.crc.update(byte);
            self.sink.put(&encode_byte(byte));
        }
    }

    /// Append payload bytes
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.put_u8(b);
        }
    }

    pub fn put_u16(&mut self, value: u16) {
        self.put_bytes(&value.to_le_bytes());
    }

    pub fn put_u32(&mut self, value: u32) {
        self.put_bytes(&value.to_le_bytes());
    }

    pub fn put_i32(&mut self, value: i32) {
        self.put_bytes(&value.to_le_bytes());
    }

    pub fn put_u64(&mut self, value: u64) {
        self.put_bytes(&value.to_le_bytes());
    }

    /// Append an octet string with a one byte length prefix
    ///
    /// Strings longer than [`MAX_OCTET_STRING_LEN`] bytes are truncated.
    pub fn put_short_string(&mut self, bytes: &[u8]) {
        let len = bytes.len().min(MAX_OCTET_STRING_LEN);
        self.put_u8(len as u8);
        self.put_bytes(&bytes[..len]);
    }

    /// Append a long octet string with a two byte length prefix
    pub fn put_long_string(&mut self, bytes: &[u8]) {
        let len = bytes.len().min(MAX_LONG_OCTET_STRING_LEN);
        self.put_u16(len as u16);
        self.put_bytes(&bytes[..len]);
    }

    /// Append a 17 byte ZCL header
    pub fn put_header(&mut self, header: &PacketHeader) {
        self.put_bytes(&header.to_bytes());
    }

    /// Close the frame
    ///
    /// Emits the CRC trailer in apply mode and returns the payload length.
    pub fn finish(self) -> usize {
        if self.mode.is_apply() {
            for b in self.crc.value().to_le_bytes() {
                self.sink.put(&encode_byte(b));
            }
        }
        self.length
    }
}
