//! ZCL packet header
//!
//! Every frame payload starts with a fixed 17 byte header:
//!
//! ```text
//! ┌─────────┬─────────┬──────────┬─────────┬─────────┬───────┬─────┬─────────┐
//! │ CHANNEL │ ADDRESS │ ENDPOINT │ PROFILE │ CLUSTER │ FLAGS │ TID │ COMMAND │
//! │ 1B      │ 8B      │ 1B       │ 2B      │ 2B      │ 1B    │ 1B  │ 1B      │
//! └─────────┴─────────┴──────────┴─────────┴─────────┴───────┴─────┴─────────┘
//! ```
//!
//! Attribute data follows the header up to the end of the payload.

use crate::cursor::{CursorError, MessageCursor};

/// Header length in bytes
pub const PACKET_HEADER_LEN: usize = 17;

/// The only channel carrying ZCL traffic
pub const ZCL_CHANNEL: u8 = 1;

/// Flags bit: manufacturer-specific command
pub const FLAG_MANUFACTURER_SPECIFIC: u8 = 0x01;

/// Flags bit: sender does not want a default response
pub const FLAG_DISABLE_DEFAULT_RESPONSE: u8 = 0x10;

/// Errors from packet parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Payload shorter than the header
    TooShort,
}

impl From<CursorError> for PacketError {
    fn from(_: CursorError) -> Self {
        PacketError::TooShort
    }
}

/// Decoded ZCL header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketHeader {
    /// Link channel, only [`ZCL_CHANNEL`] is served
    pub channel: u8,
    /// Target device, 0 for broadcast
    pub address: u64,
    pub endpoint: u8,
    pub profile: u16,
    pub cluster: u16,
    /// Frame control bits, see the `FLAG_*` constants
    pub flags: u8,
    /// Echoed back in the response
    pub transaction_id: u8,
    /// Raw command id, see [`crate::zcl::CommandId`]
    pub command: u8,
}

impl PacketHeader {
    /// Whether the command is manufacturer specific
    pub fn manufacturer_specific(&self) -> bool {
        self.flags & FLAG_MANUFACTURER_SPECIFIC != 0
    }

    /// Whether the sender asked for no default response
    pub fn disable_default_response(&self) -> bool {
        self.flags & FLAG_DISABLE_DEFAULT_RESPONSE != 0
    }

    /// Header for a response to this packet
    pub fn response(&self, address: u64, command: u8) -> Self {
        Self {
            channel: ZCL_CHANNEL,
            address,
            endpoint: self.endpoint,
            profile: self.profile,
            cluster: self.cluster,
            flags: 0,
            transaction_id: self.transaction_id,
            command,
        }
    }

    /// Read a header from the cursor
    pub fn read(cursor: &mut MessageCursor<'_>) -> Result<Self, PacketError> {
        if cursor.remaining() < PACKET_HEADER_LEN {
            return Err(PacketError::TooShort);
        }
        Ok(Self {
            channel: cursor.read_u8()?,
            address: cursor.read_u64()?,
            endpoint: cursor.read_u8()?,
            profile: cursor.read_u16()?,
            cluster: cursor.read_u16()?,
            flags: cursor.read_u8()?,
            transaction_id: cursor.read_u8()?,
            command: cursor.read_u8()?,
        })
    }

    /// Encode in wire order
    pub fn to_bytes(&self) -> [u8; PACKET_HEADER_LEN] {
        let mut out = [0u8; PACKET_HEADER_LEN];
        out[0] = self.channel;
        out[1..9].copy_from_slice(&self.address.to_le_bytes());
        out[9] = self.endpoint;
        out[10..12].copy_from_slice(&self.profile.to_le_bytes());
        out[12..14].copy_from_slice(&self.cluster.to_le_bytes());
        out[14] = self.flags;
        out[15] = self.transaction_id;
        out[16] = self.command;
        out
    }
}

/// A received packet: header plus attribute data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    pub header: PacketHeader,
    /// Attribute data after the header
    pub payload: &'a [u8],
}

impl<'a> Packet<'a> {
    /// Split a frame payload into header and attribute data
    pub fn parse(frame: &'a [u8]) -> Result<Self, PacketError> {
        let mut cursor = MessageCursor::new(frame);
        let header = PacketHeader::read(&mut cursor)?;
        Ok(Self {
            header,
            payload: &frame[PACKET_HEADER_LEN..],
        })
    }

    /// Cursor over the attribute data
    pub fn cursor(&self) -> MessageCursor<'a> {
        MessageCursor::new(self.payload)
    }
}
