//! Pending persistence sync markers

use core::ops::BitOr;

/// Set of configuration aspects changed since the last storage sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirtyFlags(u8);

impl DirtyFlags {
    pub const MODE: Self = Self(1 << 0);
    pub const PLAYLIST: Self = Self(1 << 1);
    pub const EFFECT: Self = Self(1 << 2);
    pub const TEXT: Self = Self(1 << 3);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(Self::MODE.0 | Self::PLAYLIST.0 | Self::EFFECT.0 | Self::TEXT.0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every flag in `other` is set
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any flag in `other` is set
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn mark(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Flags are only ever cleared together, after a sync
    pub fn clear_all(&mut self) {
        self.0 = 0;
    }
}

impl BitOr for DirtyFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
