//! Time keeping abstractions
//!
//! Two independent clocks exist on the cube: the battery backed wall clock
//! that the host sets over the serial link, and the fast tick counter that
//! paces effects.

/// Wall clock with a configurable timezone
pub trait RealTimeClock {
    /// Current time in seconds since the Unix epoch
    fn now(&self) -> u32;

    /// Set the current time in seconds since the Unix epoch
    fn set_time(&mut self, unix_s: u32);

    /// Timezone offset from UTC in seconds
    fn timezone(&self) -> i32;

    /// Set the timezone offset from UTC in seconds
    ///
    /// Implementations persist the offset themselves.
    fn set_timezone(&mut self, offset_s: i32);
}

/// Monotonic effect tick counter
///
/// Counts ticks since the last [`TickSource::reset`]. The counter saturates
/// at `u16::MAX` instead of wrapping; the scheduler restarts the effect when
/// it gets there.
pub trait TickSource {
    /// Ticks elapsed since the last reset
    fn ticks(&self) -> u16;

    /// Restart counting from zero
    fn reset(&mut self);
}
