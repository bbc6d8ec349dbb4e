//! Device mode state machine
//!
//! The mode decides what the render loop does each tick. Configuration
//! changes are tracked with dirty flags and picked up by the next storage
//! sync.

pub mod dirty;
pub mod machine;

pub use dirty::DirtyFlags;
pub use machine::{DeviceState, Mode, PowerAction};
