//! UART serial communication abstractions
//!
//! The receive side is polled from the render loop: a non-blocking single
//! byte read and a cheap "anything pending" query used before idling.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Take the next received byte if one is already queued
    ///
    /// Returns `Ok(None)` immediately when the receive queue is empty.
    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Check whether received bytes are waiting in the queue
    fn has_pending(&self) -> bool;
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single peripheral.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}
