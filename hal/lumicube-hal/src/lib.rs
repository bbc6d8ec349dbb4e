//! Lumicube Hardware Abstraction Layer
//!
//! This crate defines the collaborator traits the cube firmware core
//! consumes. Board crates implement them on top of their UART, EEPROM or
//! flash, RTC and power switching hardware. The core never touches a
//! peripheral directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  lumicube-core (dispatcher, scheduler)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumicube-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  board crate (AVR, RP2040, simulator)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`storage::ConfigStorage`] - Non-volatile configuration values
//! - [`clock::RealTimeClock`] - Wall clock and timezone
//! - [`clock::TickSource`] - Effect tick counter
//! - [`power::PowerControl`] - Display power switching and idle waits

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod power;
pub mod storage;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use clock::{RealTimeClock, TickSource};
pub use power::PowerControl;
pub use storage::{ConfigStorage, StorageError, StorageKey};
pub use uart::{Uart, UartRx, UartTx};
