//! Device configuration
//!
//! Static identity and addressing parameters. A board crate can override
//! them, for example from a postcard blob in flash.

use heapless::String;
use lumicube_protocol::CrcVariant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum identity prefix length
pub const MAX_IDENTITY_LEN: usize = 32;

/// Maximum version label length
pub const MAX_VERSION_LEN: usize = 16;

/// Application profile id
pub const DEFAULT_PROFILE: u16 = 1024;

/// Endpoint serving the cube and basic clusters
pub const DEFAULT_ENDPOINT: u8 = 70;

/// Endpoint receiving time reports
pub const DEFAULT_CONFIG_ENDPOINT: u8 = 1;

/// Address used until one is written over the link
pub const FACTORY_ADDRESS: u64 = 0x0123_4567_89AB_CDEF;

/// Device configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// Profile id accepted by the dispatcher
    pub profile: u16,
    /// Endpoint for read and write commands
    pub endpoint: u8,
    /// Endpoint for time reports
    pub config_endpoint: u8,
    /// CRC used for both directions
    pub crc_variant: CrcVariant,
    /// Prefix of the identity probe reply
    pub identity_prefix: String<MAX_IDENTITY_LEN>,
    pub hw_version: String<MAX_VERSION_LEN>,
    pub sw_version: String<MAX_VERSION_LEN>,
    /// Address used when none is stored
    pub factory_address: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            profile: DEFAULT_PROFILE,
            endpoint: DEFAULT_ENDPOINT,
            config_endpoint: DEFAULT_CONFIG_ENDPOINT,
            crc_variant: CrcVariant::Xmodem,
            identity_prefix: label("C2IS,elovalo,v1.5,"),
            hw_version: label("EV-1-C2"),
            sw_version: label("0.2012.11.15"),
            factory_address: FACTORY_ADDRESS,
        }
    }
}

/// Build a label, truncating at capacity
pub fn label<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
