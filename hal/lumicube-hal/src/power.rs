//! Display power control

/// Power switching for the LED drivers
///
/// `start` and `shutdown` are called exactly once per transition out of and
/// into sleep mode.
pub trait PowerControl {
    /// Power up the LED drivers and start display refresh
    fn start(&mut self);

    /// Stop display refresh and power down the LED drivers
    fn shutdown(&mut self);

    /// Enter a low-power wait until the next interrupt
    ///
    /// Any received serial byte must wake the CPU. The default does not
    /// sleep at all.
    fn wait_for_interrupt(&mut self) {}
}
