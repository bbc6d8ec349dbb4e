//! Board-agnostic core logic for the LED cube firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Device configuration and the persisted settings
//! - Operating mode state machine with deferred storage sync
//! - Effect registry and playlist selection
//! - Double-buffered, bit-packed voxel frame buffer
//! - ZCL attribute registry and command dispatcher
//! - Render scheduler tying serial input and drawing together
//!
//! Collaborators (serial port, storage, clock, ticks, power) come in
//! through the traits of `lumicube-hal`. Effects are supplied by the board
//! crate through [`effect::Effect`].

#![no_std]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to every module
mod fmt;

pub mod config;
pub mod device;
pub mod effect;
pub mod framebuffer;
pub mod persistence;
pub mod playlist;
pub mod scheduler;
pub mod state;
pub mod zcl;

#[cfg(test)]
mod test_support;

pub use config::DeviceConfig;
pub use device::DeviceContext;
pub use effect::{Effect, EffectContext, EffectDescriptor, EffectEntry, EffectRegistry};
pub use framebuffer::{FlipPolicy, FrameBuffer, VoxelError};
pub use persistence::{Persistence, PersistenceError};
pub use playlist::{CatalogError, PlaylistCatalog, PlaylistEntry, PlaylistSelector, SelectError};
pub use scheduler::{RenderScheduler, Tick};
pub use state::{DeviceState, DirtyFlags, Mode, PowerAction};
pub use zcl::DispatchOutcome;
