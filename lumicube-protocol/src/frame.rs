//! Frame encoding and decoding for the serial link.
//!
//! Frame format (every payload byte is sent as two uppercase hex digits):
//! - STX (1 byte): `'S'`
//! - BEGIN (1 byte): `'0'` marks a data packet
//! - LENGTH (2 hex pairs): payload length, u16 little-endian
//! - PAYLOAD (LENGTH hex pairs)
//! - CRC (2 hex pairs): CRC16 of the payload bytes, u16 little-endian
//!
//! Outside a frame the peer may send the single octets ACK (`'K'`) and NAK
//! (`'N'`), or the identity query `"ATI"`.

use heapless::Vec;

use crate::crc::CrcVariant;
use crate::hex::{HexError, HexPairDecoder};
use crate::writer::{ByteSink, ExecMode, ResponseWriter};

/// Frame received intact
pub const ACK: u8 = b'K';
/// Request resend
pub const NAK: u8 = b'N';
/// Begin new frame
pub const STX: u8 = b'S';
/// Packet type byte following STX
pub const PACKET_BEGIN: u8 = b'0';

/// Payload accumulation capacity in bytes
pub const RECEIVE_CAPACITY: usize = 32;

/// Device identification query
pub const IDENTITY_QUERY: &[u8; 3] = b"ATI";

/// Errors that can occur while receiving a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload longer than the receive buffer
    Overflow,
    /// Non-hex character inside the frame
    InvalidHexDigit,
    /// STX followed by something other than the packet begin byte
    NotAPacket,
    /// Payload CRC does not match the trailer
    CrcMismatch,
}

impl FrameError {
    /// Control octet to send back to the peer
    ///
    /// Transport faults are acknowledged so the sender stops retransmitting
    /// a frame that can never be received.
    pub fn reply(self) -> u8 {
        match self {
            FrameError::Overflow | FrameError::InvalidHexDigit => ACK,
            FrameError::NotAPacket | FrameError::CrcMismatch => NAK,
        }
    }

    /// Whether the receiver is latched and must be reset by the caller
    pub fn needs_reset(self) -> bool {
        matches!(self, FrameError::Overflow | FrameError::InvalidHexDigit)
    }
}

impl From<HexError> for FrameError {
    fn from(_: HexError) -> Self {
        FrameError::InvalidHexDigit
    }
}

/// A validated frame payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Payload bytes, CRC already checked
    pub payload: Vec<u8, RECEIVE_CAPACITY>,
}

impl Frame {
    /// Create a frame from payload bytes
    pub fn new(payload: &[u8]) -> Result<Self, FrameError> {
        let mut vec = Vec::new();
        vec.extend_from_slice(payload)
            .map_err(|_| FrameError::Overflow)?;
        Ok(Self { payload: vec })
    }

    /// Encode this frame in wire format
    pub fn encode_to<S: ByteSink>(&self, variant: CrcVariant, sink: &mut S) {
        let mut writer = ResponseWriter::new(ExecMode::Apply, variant, sink);
        writer.begin(self.payload.len() as u16);
        writer.put_bytes(&self.payload);
        writer.finish();
    }
}

/// Something the receiver recognised in the byte stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// Complete frame with a valid CRC
    Frame(Frame),
    /// Peer acknowledged our last frame
    Ack,
    /// Peer asked for a resend
    Nak,
    /// Identity query
    IdentityProbe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxState {
    /// Between frames
    Idle,
    /// Got STX, waiting for BEGIN
    WaitingForBegin,
    /// Reading the length field
    ReadingLength,
    /// Reading payload pairs
    ReadingPayload,
    /// Reading the CRC trailer
    ReadingCrc,
    /// Latched after a transport fault until `reset()`
    Fault,
}

/// State machine assembling frames from the serial byte stream
#[derive(Debug, Clone)]
pub struct FrameReceiver {
    state: RxState,
    variant: CrcVariant,
    hex: HexPairDecoder,
    field: [u8; 2],
    field_len: usize,
    length: usize,
    payload: Vec<u8, RECEIVE_CAPACITY>,
    probe: usize,
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new(CrcVariant::default())
    }
}

impl FrameReceiver {
    /// Create a receiver checking frames with the given CRC variant
    pub fn new(variant: CrcVariant) -> Self {
        Self {
            state: RxState::Idle,
            variant,
            hex: HexPairDecoder::new(),
            field: [0; 2],
            field_len: 0,
            length: 0,
            payload: Vec::new(),
            probe: 0,
        }
    }

    /// Discard any partial frame and clear a latched fault
    pub fn reset(&mut self) {
        self.state = RxState::Idle;
        self.clear_partial();
        self.probe = 0;
    }

    /// Whether a transport fault is latched
    pub fn is_faulted(&self) -> bool {
        self.state == RxState::Fault
    }

    /// Whether a frame is partially received
    pub fn in_frame(&self) -> bool {
        !matches!(self.state, RxState::Idle | RxState::Fault)
    }

    fn clear_partial(&mut self) {
        self.hex.reset();
        self.field_len = 0;
        self.length = 0;
        self.payload.clear();
    }

    fn fault(&mut self, err: FrameError) -> FrameError {
        self.clear_partial();
        self.state = RxState::Fault;
        err
    }

    /// Feed a single byte to the receiver
    ///
    /// Returns `Ok(Some(_))` when something complete was recognised,
    /// `Ok(None)` when more bytes are needed, or `Err` on a fault. See
    /// [`FrameError::reply`] for the octet to answer with.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Received>, FrameError> {
        if self.state == RxState::Fault {
            return Ok(None);
        }

        if byte == STX {
            self.clear_partial();
            self.probe = 0;
            self.state = RxState::WaitingForBegin;
            return Ok(None);
        }

        match self.state {
            RxState::Idle => Ok(self.feed_idle(byte)),
            RxState::WaitingForBegin => {
                if byte == PACKET_BEGIN {
                    self.state = RxState::ReadingLength;
                    Ok(None)
                } else {
                    self.state = RxState::Idle;
                    Err(FrameError::NotAPacket)
                }
            }
            RxState::ReadingLength => {
                let Some(b) = self.decode(byte)? else {
                    return Ok(None);
                };
                if let Some(length) = self.push_field(b) {
                    self.length = length as usize;
                    self.state = if self.length == 0 {
                        RxState::ReadingCrc
                    } else {
                        RxState::ReadingPayload
                    };
                }
                Ok(None)
            }
            RxState::ReadingPayload => {
                let Some(b) = self.decode(byte)? else {
                    return Ok(None);
                };
                if self.payload.push(b).is_err() {
                    return Err(self.fault(FrameError::Overflow));
                }
                if self.payload.len() == self.length {
                    self.state = RxState::ReadingCrc;
                }
                Ok(None)
            }
            RxState::ReadingCrc => {
                let Some(b) = self.decode(byte)? else {
                    return Ok(None);
                };
                let Some(received) = self.push_field(b) else {
                    return Ok(None);
                };

                let expected = self.variant.checksum(&self.payload);
                let payload = core::mem::take(&mut self.payload);
                self.clear_partial();
                self.state = RxState::Idle;

                if received != expected {
                    return Err(FrameError::CrcMismatch);
                }
                Ok(Some(Received::Frame(Frame { payload })))
            }
            RxState::Fault => Ok(None),
        }
    }

    /// Feed multiple bytes to the receiver
    ///
    /// Returns the first event found. Remaining bytes are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Received>, FrameError> {
        for &byte in bytes {
            if let Some(event) = self.feed(byte)? {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    fn feed_idle(&mut self, byte: u8) -> Option<Received> {
        match byte {
            ACK => {
                self.probe = 0;
                Some(Received::Ack)
            }
            NAK => {
                self.probe = 0;
                Some(Received::Nak)
            }
            _ if byte == IDENTITY_QUERY[self.probe] => {
                self.probe += 1;
                if self.probe == IDENTITY_QUERY.len() {
                    self.probe = 0;
                    Some(Received::IdentityProbe)
                } else {
                    None
                }
            }
            _ => {
                self.probe = usize::from(byte == IDENTITY_QUERY[0]);
                None
            }
        }
    }

    fn decode(&mut self, byte: u8) -> Result<Option<u8>, FrameError> {
        match self.hex.feed(byte) {
            Ok(b) => Ok(b),
            Err(e) => Err(self.fault(e.into())),
        }
    }

    /// Collect a two byte little-endian field
    fn push_field(&mut self, byte: u8) -> Option<u16> {
        self.field[self.field_len] = byte;
        self.field_len += 1;
        if self.field_len < 2 {
            return None;
        }
        self.field_len = 0;
        Some(u16::from_le_bytes(self.field))
    }
}
