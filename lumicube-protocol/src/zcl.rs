//! ZCL command, status and data type identifiers

use crate::cursor::{CursorError, MessageCursor};

/// General command ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CommandId {
    ReadAttributes = 0x00,
    ReadAttributesResponse = 0x01,
    WriteAttributes = 0x02,
    WriteAttributesResponse = 0x04,
    ReportAttributes = 0x0A,
    /// Answer to a command that has no specific response
    DefaultResponse = 0x0B,
}

impl CommandId {
    /// Map a raw command id, `None` for commands this device does not know
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(CommandId::ReadAttributes),
            0x01 => Some(CommandId::ReadAttributesResponse),
            0x02 => Some(CommandId::WriteAttributes),
            0x04 => Some(CommandId::WriteAttributesResponse),
            0x0A => Some(CommandId::ReportAttributes),
            0x0B => Some(CommandId::DefaultResponse),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Status codes reported per attribute or per command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Status {
    Success = 0x00,
    Failure = 0x01,
    UnsupportedClusterCommand = 0x81,
    UnsupportedGeneralCommand = 0x82,
    UnsupportedAttribute = 0x86,
    InvalidValue = 0x87,
    ReadOnly = 0x88,
    InvalidDataType = 0x8D,
    WriteOnly = 0x8F,
}

impl Status {
    /// Wire value of the status
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Longest octet string, 0xFF marks an invalid string
pub const MAX_OCTET_STRING_LEN: usize = u8::MAX as usize - 1;
/// Longest long octet string, 0xFFFF marks an invalid string
pub const MAX_LONG_OCTET_STRING_LEN: usize = u16::MAX as usize - 1;

/// Attribute data type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DataType {
    Boolean = 0x10,
    Uint8 = 0x20,
    Int32 = 0x2B,
    Enum8 = 0x30,
    OctetString = 0x41,
    LongOctetString = 0x43,
    UtcTime = 0xE2,
    IeeeAddress = 0xF0,
}

impl DataType {
    /// Map a type tag, `None` for types without a known width
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x10 => Some(DataType::Boolean),
            0x20 => Some(DataType::Uint8),
            0x2B => Some(DataType::Int32),
            0x30 => Some(DataType::Enum8),
            0x41 => Some(DataType::OctetString),
            0x43 => Some(DataType::LongOctetString),
            0xE2 => Some(DataType::UtcTime),
            0xF0 => Some(DataType::IeeeAddress),
            _ => None,
        }
    }

    /// Tag byte written before a value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Encoded width of fixed size types, `None` for strings
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            DataType::Boolean | DataType::Uint8 | DataType::Enum8 => Some(1),
            DataType::Int32 | DataType::UtcTime => Some(4),
            DataType::IeeeAddress => Some(8),
            DataType::OctetString | DataType::LongOctetString => None,
        }
    }

    /// Step over one value of this type
    ///
    /// A string length of all ones marks an invalid string and is
    /// followed by no data, the same as an empty one.
    pub fn skip(self, cursor: &mut MessageCursor<'_>) -> Result<(), CursorError> {
        let len = match self {
            DataType::OctetString => match cursor.read_u8()? {
                u8::MAX => 0,
                len => len as usize,
            },
            DataType::LongOctetString => match cursor.read_u16()? {
                u16::MAX => 0,
                len => len as usize,
            },
            fixed => fixed.fixed_width().unwrap_or(0),
        };
        cursor.skip(len)
    }
}
