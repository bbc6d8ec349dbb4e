//! Typed attribute values

use lumicube_protocol::{
    ByteSink, CursorError, DataType, MessageCursor, ResponseWriter, MAX_OCTET_STRING_LEN,
};

use crate::effect::NameSource;
use crate::playlist::PlaylistEntry;

/// A value read from or written to an attribute
#[derive(Clone, Copy)]
pub enum AttributeValue<'v> {
    Boolean(bool),
    Uint8(u8),
    Int32(i32),
    Enum8(u8),
    /// Seconds since 2000-01-01
    UtcTime(u32),
    IeeeAddress(u64),
    OctetString(&'v [u8]),
    LongOctetString(&'v [u8]),
    /// JSON array of names, sent as a long octet string
    NameList(&'v dyn NameSource),
    /// Effect ids of playlist entries, sent as an octet string
    EffectIds(&'v [PlaylistEntry]),
}

impl<'v> AttributeValue<'v> {
    pub fn data_type(&self) -> DataType {
        match self {
            AttributeValue::Boolean(_) => DataType::Boolean,
            AttributeValue::Uint8(_) => DataType::Uint8,
            AttributeValue::Int32(_) => DataType::Int32,
            AttributeValue::Enum8(_) => DataType::Enum8,
            AttributeValue::UtcTime(_) => DataType::UtcTime,
            AttributeValue::IeeeAddress(_) => DataType::IeeeAddress,
            AttributeValue::OctetString(_) | AttributeValue::EffectIds(_) => DataType::OctetString,
            AttributeValue::LongOctetString(_) | AttributeValue::NameList(_) => {
                DataType::LongOctetString
            }
        }
    }

    /// Read one value of the given type
    ///
    /// A string length of all ones is the ZCL invalid marker and reads as
    /// an empty string.
    pub fn decode(data_type: DataType, cursor: &mut MessageCursor<'v>) -> Result<Self, CursorError> {
        Ok(match data_type {
            DataType::Boolean => AttributeValue::Boolean(cursor.read_u8()? != 0),
            DataType::Uint8 => AttributeValue::Uint8(cursor.read_u8()?),
            DataType::Int32 => AttributeValue::Int32(cursor.read_i32()?),
            DataType::Enum8 => AttributeValue::Enum8(cursor.read_u8()?),
            DataType::UtcTime => AttributeValue::UtcTime(cursor.read_u32()?),
            DataType::IeeeAddress => AttributeValue::IeeeAddress(cursor.read_u64()?),
            DataType::OctetString => {
                let len = match cursor.read_u8()? {
                    u8::MAX => 0,
                    len => len as usize,
                };
                AttributeValue::OctetString(cursor.read_bytes(len)?)
            }
            DataType::LongOctetString => {
                let len = match cursor.read_u16()? {
                    u16::MAX => 0,
                    len => len as usize,
                };
                AttributeValue::LongOctetString(cursor.read_bytes(len)?)
            }
        })
    }

    /// Append the value, without its type tag
    pub fn encode<S: ByteSink>(&self, writer: &mut ResponseWriter<'_, S>) {
        match *self {
            AttributeValue::Boolean(b) => writer.put_u8(b as u8),
            AttributeValue::Uint8(v) | AttributeValue::Enum8(v) => writer.put_u8(v),
            AttributeValue::Int32(v) => writer.put_i32(v),
            AttributeValue::UtcTime(v) => writer.put_u32(v),
            AttributeValue::IeeeAddress(v) => writer.put_u64(v),
            AttributeValue::OctetString(bytes) => writer.put_short_string(bytes),
            AttributeValue::LongOctetString(bytes) => writer.put_long_string(bytes),
            AttributeValue::NameList(names) => {
                // Bounded when the device context is built
                let len = u16::try_from(name_list_len(names)).unwrap_or(u16::MAX);
                writer.put_u16(len);
                writer.put_u8(b'[');
                for i in 0..names.name_count() {
                    if i > 0 {
                        writer.put_u8(b',');
                    }
                    writer.put_u8(b'"');
                    writer.put_bytes(names.name(i).as_bytes());
                    writer.put_u8(b'"');
                }
                writer.put_u8(b']');
            }
            AttributeValue::EffectIds(entries) => {
                let len = entries.len().min(MAX_OCTET_STRING_LEN);
                writer.put_u8(len as u8);
                for entry in &entries[..len] {
                    writer.put_u8(entry.effect);
                }
            }
        }
    }
}

/// Length of the JSON array produced for a name list
pub(crate) fn name_list_len(names: &dyn NameSource) -> usize {
    let count = names.name_count();
    let quoted: usize = (0..count).map(|i| names.name(i).len() + 2).sum();
    2 + quoted + count.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;
    use lumicube_protocol::{CrcVariant, ExecMode};

    struct Names(&'static [&'static str]);

    impl NameSource for Names {
        fn name_count(&self) -> usize {
            self.0.len()
        }

        fn name(&self, index: usize) -> &str {
            self.0[index]
        }
    }

    /// Payload bytes produced by encoding a value
    fn payload(value: AttributeValue<'_>) -> Vec<u8, 64> {
        let mut sink: Vec<u8, 160> = Vec::new();
        let mut writer = ResponseWriter::new(ExecMode::Apply, CrcVariant::Xmodem, &mut sink);
        value.encode(&mut writer);
        let len = writer.finish();
        sink[..len * 2]
            .chunks(2)
            .map(|p| lumicube_protocol::hex::decode_pair(p[0], p[1]).unwrap())
            .collect()
    }

    #[test]
    fn test_name_list_json() {
        let names = Names(&["sine", "heart"]);
        let bytes = payload(AttributeValue::NameList(&names));
        assert_eq!(&bytes[..2], &[16, 0]);
        assert_eq!(&bytes[2..], b"[\"sine\",\"heart\"]");
    }

    #[test]
    fn test_empty_name_list() {
        let names = Names(&[]);
        let bytes = payload(AttributeValue::NameList(&names));
        assert_eq!(&bytes[..], &[2, 0, b'[', b']']);
    }

    #[test]
    fn test_effect_ids() {
        let entries = [PlaylistEntry::new(4, 1), PlaylistEntry::new(2, 1)];
        assert_eq!(&payload(AttributeValue::EffectIds(&entries))[..], &[2, 4, 2]);
    }

    #[test]
    fn test_decode_fixed_and_strings() {
        let data = [0x03, b'h', b'e', b'y', 0xFF, 0x2A, 0x00, 0x00, 0x00];
        let mut cursor = MessageCursor::new(&data);
        match AttributeValue::decode(DataType::OctetString, &mut cursor).unwrap() {
            AttributeValue::OctetString(s) => assert_eq!(s, b"hey"),
            _ => panic!("wrong variant"),
        }
        match AttributeValue::decode(DataType::OctetString, &mut cursor).unwrap() {
            AttributeValue::OctetString(s) => assert!(s.is_empty()),
            _ => panic!("wrong variant"),
        }
        match AttributeValue::decode(DataType::UtcTime, &mut cursor).unwrap() {
            AttributeValue::UtcTime(t) => assert_eq!(t, 42),
            _ => panic!("wrong variant"),
        }
        assert!(AttributeValue::decode(DataType::Uint8, &mut cursor).is_err());
    }

    #[test]
    fn test_data_type_tags() {
        let names = Names(&[]);
        assert_eq!(AttributeValue::NameList(&names).data_type(), DataType::LongOctetString);
        assert_eq!(AttributeValue::EffectIds(&[]).data_type(), DataType::OctetString);
        assert_eq!(AttributeValue::Enum8(1).data_type(), DataType::Enum8);
    }
}
