//! Attribute catalogue
//!
//! Every attribute the device serves, keyed by (cluster, attribute id),
//! with the data type and access it is declared with.

use lumicube_protocol::DataType;

/// General device information
pub const CLUSTER_BASIC: u16 = 0x0000;
/// Wall clock reports
pub const CLUSTER_TIME: u16 = 0x000A;
/// Cube specific attributes
pub const CLUSTER_CUBE: u16 = 0x0500;

/// Time and zone attribute carried by time cluster reports
pub const ATTR_TIME_AND_ZONE: u16 = 0x0403;

/// Seconds between the Unix epoch and 2000-01-01
pub const ZIGBEE_TIME_OFFSET: u32 = 946_684_800;

/// Attribute access rights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

impl Access {
    pub fn readable(self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    pub fn writable(self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }
}

/// Served attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Attribute {
    DeviceEnabled,
    AlarmMask,
    OperatingMode,
    EffectText,
    Playlist,
    Timezone,
    Time,
    EffectNames,
    PlaylistNames,
    PlaylistEffects,
    Effect,
    HwVersion,
    SwVersion,
    DeviceAddress,
    PlaylistPosition,
}

/// Catalogue row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AttributeDef {
    pub cluster: u16,
    pub id: u16,
    pub attribute: Attribute,
    pub data_type: DataType,
    pub access: Access,
}

const fn def(
    cluster: u16,
    id: u16,
    attribute: Attribute,
    data_type: DataType,
    access: Access,
) -> AttributeDef {
    AttributeDef {
        cluster,
        id,
        attribute,
        data_type,
        access,
    }
}

pub static ATTRIBUTES: [AttributeDef; 15] = [
    def(CLUSTER_BASIC, 0x0012, Attribute::DeviceEnabled, DataType::Boolean, Access::ReadWrite),
    def(CLUSTER_BASIC, 0x0013, Attribute::AlarmMask, DataType::Boolean, Access::ReadWrite),
    def(CLUSTER_CUBE, 0x0001, Attribute::OperatingMode, DataType::Enum8, Access::ReadWrite),
    def(CLUSTER_CUBE, 0x0002, Attribute::EffectText, DataType::OctetString, Access::Write),
    def(CLUSTER_CUBE, 0x0003, Attribute::Playlist, DataType::Uint8, Access::ReadWrite),
    def(CLUSTER_CUBE, 0x0004, Attribute::Timezone, DataType::Int32, Access::ReadWrite),
    def(CLUSTER_CUBE, 0x0005, Attribute::Time, DataType::UtcTime, Access::ReadWrite),
    def(CLUSTER_CUBE, 0x0006, Attribute::EffectNames, DataType::LongOctetString, Access::Read),
    def(CLUSTER_CUBE, 0x0007, Attribute::PlaylistNames, DataType::LongOctetString, Access::Read),
    def(CLUSTER_CUBE, 0x0008, Attribute::PlaylistEffects, DataType::OctetString, Access::Read),
    def(CLUSTER_CUBE, 0x0009, Attribute::Effect, DataType::Uint8, Access::ReadWrite),
    def(CLUSTER_CUBE, 0x0010, Attribute::HwVersion, DataType::OctetString, Access::Read),
    def(CLUSTER_CUBE, 0x0011, Attribute::SwVersion, DataType::OctetString, Access::Read),
    def(CLUSTER_CUBE, 0x0012, Attribute::DeviceAddress, DataType::IeeeAddress, Access::ReadWrite),
    def(CLUSTER_CUBE, 0x0013, Attribute::PlaylistPosition, DataType::Uint8, Access::Read),
];

/// Whether read and write commands are served for a cluster
pub fn is_served_cluster(cluster: u16) -> bool {
    matches!(cluster, CLUSTER_BASIC | CLUSTER_CUBE)
}

pub fn lookup(cluster: u16, id: u16) -> Option<&'static AttributeDef> {
    ATTRIBUTES
        .iter()
        .find(|d| d.cluster == cluster && d.id == id)
}
