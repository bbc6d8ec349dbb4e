//! State machine definition

use super::dirty::DirtyFlags;

/// Operating modes
///
/// The discriminants are the values carried by the operating-mode
/// attribute and stored in non-volatile memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    /// Display powered down
    Sleep = 0,
    /// Display on, nothing drawn
    #[default]
    Idle = 1,
    /// Cycling through the active playlist
    Playlist = 2,
    /// Running a single effect
    Effect = 3,
}

impl Mode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Mode::Sleep),
            1 => Some(Mode::Idle),
            2 => Some(Mode::Playlist),
            3 => Some(Mode::Effect),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether effects are being rendered
    pub fn is_rendering(self) -> bool {
        matches!(self, Mode::Playlist | Mode::Effect)
    }

    /// Power hook to fire when moving from this mode to `next`
    pub fn transition(self, next: Mode) -> PowerAction {
        match (self, next) {
            (Mode::Sleep, Mode::Sleep) => PowerAction::None,
            (Mode::Sleep, _) => PowerAction::Start,
            (_, Mode::Sleep) => PowerAction::Shutdown,
            _ => PowerAction::None,
        }
    }
}

/// Display power change caused by a mode transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerAction {
    None,
    /// Leaving sleep
    Start,
    /// Entering sleep
    Shutdown,
}

/// Runtime device state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    pub mode: Mode,
    /// Index into the effect registry
    pub effect: u8,
    /// Index into the playlist catalog
    pub playlist: u8,
    pub dirty: DirtyFlags,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceState {
    /// Fresh state: idle, everything pending a sync
    pub const fn new() -> Self {
        Self {
            mode: Mode::Idle,
            effect: 0,
            playlist: 0,
            dirty: DirtyFlags::all(),
        }
    }

    /// Switch mode, returning the power hook to fire
    ///
    /// Returns `None` when the mode is unchanged.
    pub fn enter(&mut self, next: Mode) -> Option<PowerAction> {
        if self.mode == next {
            return None;
        }
        let action = self.mode.transition(next);
        self.mode = next;
        Some(action)
    }
}
