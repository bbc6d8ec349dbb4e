//! Render scheduler
//!
//! The cooperative main loop. Each [`RenderScheduler::step`] drains pending
//! serial input through the frame receiver and dispatcher, applies stored
//! configuration that changed, and then lets the active effect draw if the
//! previous frame was consumed and the effect's minimum interval passed.
//! Dispatch and drawing never overlap since both run inside the same step.

use lumicube_hal::{ConfigStorage, PowerControl, RealTimeClock, TickSource, Uart, UartTx};
use lumicube_protocol::{write_identity, ByteSink, FrameReceiver, Received, ACK};

use crate::device::DeviceContext;
use crate::effect::EffectContext;
use crate::framebuffer::FrameBuffer;
use crate::state::Mode;

/// Serial bytes handled per step
pub const SERIAL_BUDGET: usize = 64;

/// What a step did with the effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// Sleep or idle mode, nothing rendered
    Idle,
    /// Previous frame not shown yet
    FramePending,
    /// Minimum interval since the last draw not reached
    Throttled,
    /// Effect drew a frame
    Drew,
    /// Effect has no draw step
    Static,
}

/// Streams response bytes straight to the serial port
struct SerialSink<'u, U> {
    uart: &'u mut U,
}

impl<U: UartTx> ByteSink for SerialSink<'_, U> {
    fn put(&mut self, bytes: &[u8]) {
        if self.uart.write_blocking(bytes).is_err() {
            warn!("Serial write failed");
        }
    }
}

pub struct RenderScheduler<'a, S, C, P, U, T> {
    device: DeviceContext<'a, S, C, P>,
    receiver: FrameReceiver,
    frame: FrameBuffer,
    serial: U,
    ticks: T,
    /// Earliest tick at which the effect may draw again
    next_draw_at: u16,
}

impl<'a, S, C, P, U, T> RenderScheduler<'a, S, C, P, U, T>
where
    S: ConfigStorage,
    C: RealTimeClock,
    P: PowerControl,
    U: Uart,
    T: TickSource,
{
    pub fn new(device: DeviceContext<'a, S, C, P>, serial: U, ticks: T) -> Self {
        Self {
            receiver: FrameReceiver::new(device.config().crc_variant),
            device,
            frame: FrameBuffer::new(),
            serial,
            ticks,
            next_draw_at: 0,
        }
    }

    pub fn device(&self) -> &DeviceContext<'a, S, C, P> {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut DeviceContext<'a, S, C, P> {
        &mut self.device
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Display path access, used to swap in finished frames
    pub fn frame_buffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.frame
    }

    pub fn serial_mut(&mut self) -> &mut U {
        &mut self.serial
    }

    pub fn ticks_mut(&mut self) -> &mut T {
        &mut self.ticks
    }

    pub fn next_draw_at(&self) -> u16 {
        self.next_draw_at
    }

    /// Boot the device and step forever
    pub fn run(&mut self) -> ! {
        self.device.boot();
        loop {
            self.step();
        }
    }

    /// One loop iteration
    pub fn step(&mut self) -> Tick {
        self.process_serial();
        self.device.sync_from_storage();

        let mode = self.device.mode();
        if self.device.needs_init && mode.is_rendering() {
            self.init_current_effect();
        }

        match mode {
            Mode::Sleep | Mode::Idle => {
                self.idle();
                Tick::Idle
            }
            Mode::Playlist => {
                if self.ticks.ticks() > self.device.selector.duration() {
                    self.device.advance_playlist();
                    self.init_current_effect();
                }
                self.render()
            }
            Mode::Effect => self.render(),
        }
    }

    /// Feed pending serial bytes to the receiver and react to what it
    /// recognises
    pub fn process_serial(&mut self) {
        for _ in 0..SERIAL_BUDGET {
            let byte = match self.serial.try_read_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => return,
                Err(_) => {
                    warn!("Serial read failed");
                    return;
                }
            };

            match self.receiver.feed(byte) {
                Ok(None) => {}
                Ok(Some(received)) => self.handle_received(received),
                Err(e) => {
                    warn!("Frame rejected: {:?}", e);
                    self.send(&[e.reply()]);
                    if e.needs_reset() {
                        self.receiver.reset();
                    }
                }
            }
        }
    }

    fn handle_received(&mut self, received: Received) {
        match received {
            Received::Frame(frame) => {
                self.send(&[ACK]);
                let mut sink = SerialSink {
                    uart: &mut self.serial,
                };
                let outcome = self.device.dispatch(&frame.payload, &mut sink);
                trace!("Dispatch outcome {:?}", outcome);
                self.flush();
            }
            Received::Ack => trace!("Peer acknowledged"),
            Received::Nak => debug!("Peer requested a resend, nothing to resend"),
            Received::IdentityProbe => {
                let mut sink = SerialSink {
                    uart: &mut self.serial,
                };
                write_identity(
                    &mut sink,
                    self.device.config.identity_prefix.as_bytes(),
                    self.device.address,
                );
                self.flush();
            }
        }
    }

    fn send(&mut self, bytes: &[u8]) {
        if self.serial.write_blocking(bytes).is_err() {
            warn!("Serial write failed");
        }
    }

    fn flush(&mut self) {
        if self.serial.flush().is_err() {
            warn!("Serial flush failed");
        }
    }

    /// Low power wait, skipped while input is queued
    fn idle(&mut self) {
        if !self.serial.has_pending() {
            self.device.power.wait_for_interrupt();
        }
    }

    /// Restart the active effect
    ///
    /// The frame painted by init is moved to the front, the tick counter
    /// restarts and the next draw is allowed at once.
    pub fn init_current_effect(&mut self) {
        self.device.needs_init = false;
        self.frame.allow_flip(false);
        self.frame.restore_roles();

        let index = self.device.state.effect;
        let custom_data = self.device.selector.custom_data();
        match self.device.effects.get_mut(index) {
            Some(entry) => {
                let mut cx = EffectContext {
                    frame: &mut self.frame,
                    ticks: 0,
                    custom_data,
                    text: &self.device.text,
                };
                entry.effect.init(&mut cx);
                self.frame.commit_initial_frame(entry.descriptor.flip);
                debug!("Initialised effect {}", entry.descriptor.name);
            }
            None => error!("Effect {} is not registered", index),
        }

        self.ticks.reset();
        self.next_draw_at = 0;
    }

    fn render(&mut self) -> Tick {
        if self.frame.may_flip() {
            return Tick::FramePending;
        }
        let mut ticks = self.ticks.ticks();
        if ticks < self.next_draw_at {
            return Tick::Throttled;
        }
        if ticks == u16::MAX {
            // Durations can no longer be compared, start over
            debug!("Tick counter exhausted");
            self.init_current_effect();
            ticks = self.ticks.ticks();
        }

        let index = self.device.state.effect;
        let custom_data = self.device.selector.custom_data();
        let Some(entry) = self.device.effects.get_mut(index) else {
            error!("Effect {} is not registered", index);
            return Tick::Idle;
        };

        let tick = if entry.effect.animated() {
            let mut cx = EffectContext {
                frame: &mut self.frame,
                ticks,
                custom_data,
                text: &self.device.text,
            };
            entry.effect.draw(&mut cx);
            self.frame.allow_flip(true);
            Tick::Drew
        } else {
            Tick::Static
        };

        self.next_draw_at = ticks.saturating_add(entry.descriptor.minimum_ticks);
        tick
    }
}
