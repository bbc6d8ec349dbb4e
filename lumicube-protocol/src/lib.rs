//! Lumicube serial command protocol
//!
//! This crate implements the wire side of the cube's ZCL-style command
//! dialect: hex/CRC framing, packet headers, typed payload reads, and the
//! two-pass response writer. It knows nothing about the device state the
//! commands act on.
//!
//! # Protocol Overview
//!
//! Frames travel as printable ASCII:
//! ```text
//! ┌─────┬───────┬────────────┬───────────────────┬────────────┐
//! │ STX │ BEGIN │ LENGTH     │ PAYLOAD           │ CRC16      │
//! │ 'S' │ '0'   │ 2 hex pair │ LENGTH hex pairs  │ 2 hex pair │
//! └─────┴───────┴────────────┴───────────────────┴────────────┘
//! ```
//!
//! The receiver answers each frame with ACK (`'K'`) or NAK (`'N'`). The
//! payload carries a 17 byte ZCL header and attribute data.

#![no_std]
#![deny(unsafe_code)]

pub mod crc;
pub mod cursor;
pub mod frame;
pub mod hex;
pub mod identity;
pub mod packet;
pub mod writer;
pub mod zcl;

pub use crc::{Crc16, CrcVariant, CRC_INIT};
pub use cursor::{CursorError, MessageCursor};
pub use frame::{
    Frame, FrameError, FrameReceiver, Received, ACK, IDENTITY_QUERY, NAK, PACKET_BEGIN,
    RECEIVE_CAPACITY, STX,
};
pub use hex::HexError;
pub use identity::write_identity;
pub use packet::{
    Packet, PacketError, PacketHeader, FLAG_DISABLE_DEFAULT_RESPONSE, FLAG_MANUFACTURER_SPECIFIC,
    PACKET_HEADER_LEN, ZCL_CHANNEL,
};
pub use writer::{ByteSink, ExecMode, ResponseWriter};
pub use zcl::{
    CommandId, DataType, Status, MAX_LONG_OCTET_STRING_LEN, MAX_OCTET_STRING_LEN,
};
