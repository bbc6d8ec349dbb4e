//! Effect plugin boundary
//!
//! Visual effects live outside the core. Each one implements [`Effect`]
//! and is listed once in an [`EffectRegistry`] together with its
//! [`EffectDescriptor`]. The registry index is the effect id used on the
//! wire and in playlists.

use crate::framebuffer::FrameBuffer;

pub use crate::framebuffer::FlipPolicy;

/// Static description of an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EffectDescriptor {
    /// Name reported in the effect name list
    pub name: &'static str,
    pub flip: FlipPolicy,
    /// Minimum ticks between two draws
    pub minimum_ticks: u16,
    /// Restart the effect when the effect text changes
    pub dynamic_text: bool,
}

impl EffectDescriptor {
    pub const fn new(name: &'static str, flip: FlipPolicy, minimum_ticks: u16) -> Self {
        Self {
            name,
            flip,
            minimum_ticks,
            dynamic_text: false,
        }
    }

    pub const fn with_dynamic_text(mut self) -> Self {
        self.dynamic_text = true;
        self
    }
}

/// What an effect sees while it runs
pub struct EffectContext<'f> {
    /// Writes go to the back buffer, reads come from the front
    pub frame: &'f mut FrameBuffer,
    /// Ticks since the effect was initialised
    pub ticks: u16,
    /// Data attached to the playing playlist entry
    pub custom_data: Option<&'static [u8]>,
    /// Current effect text
    pub text: &'f [u8],
}

/// A visual effect
pub trait Effect {
    /// Whether the effect draws frames after init
    ///
    /// Static effects only paint once, in [`Effect::init`].
    fn animated(&self) -> bool {
        true
    }

    /// Prepare state and optionally paint the first frame
    fn init(&mut self, _cx: &mut EffectContext<'_>) {}

    /// Paint one frame
    fn draw(&mut self, _cx: &mut EffectContext<'_>) {}
}

/// Registry slot
pub struct EffectEntry<'a> {
    pub descriptor: EffectDescriptor,
    pub effect: &'a mut dyn Effect,
}

impl<'a> EffectEntry<'a> {
    pub fn new(descriptor: EffectDescriptor, effect: &'a mut dyn Effect) -> Self {
        Self { descriptor, effect }
    }
}

/// Ordered list of names that can be reported as a JSON array
pub trait NameSource {
    fn name_count(&self) -> usize;
    fn name(&self, index: usize) -> &str;
}

/// Immutable effect table supplied by the board crate
pub struct EffectRegistry<'a> {
    entries: &'a mut [EffectEntry<'a>],
}

impl<'a> EffectRegistry<'a> {
    pub fn new(entries: &'a mut [EffectEntry<'a>]) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn descriptor(&self, index: u8) -> Option<&EffectDescriptor> {
        self.entries.get(index as usize).map(|e| &e.descriptor)
    }

    pub fn get_mut(&mut self, index: u8) -> Option<&mut EffectEntry<'a>> {
        self.entries.get_mut(index as usize)
    }
}

impl NameSource for EffectRegistry<'_> {
    fn name_count(&self) -> usize {
        self.entries.len()
    }

    fn name(&self, index: usize) -> &str {
        self.entries.get(index).map_or("", |e| e.descriptor.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CountingEffect, EffectCounters};

    #[test]
    fn test_registry_lookup() {
        let counters = EffectCounters::default();
        let mut a = CountingEffect::new(0, &counters);
        let mut b = CountingEffect::still(1, &counters);
        let mut entries = [
            EffectEntry::new(EffectDescriptor::new("sine", FlipPolicy::Flip, 10), &mut a),
            EffectEntry::new(
                EffectDescriptor::new("text", FlipPolicy::NoFlip, 5).with_dynamic_text(),
                &mut b,
            ),
        ];
        let mut registry = EffectRegistry::new(&mut entries);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.name(1), "text");
        assert!(registry.descriptor(1).unwrap().dynamic_text);
        assert!(registry.descriptor(2).is_none());
        assert!(!registry.get_mut(1).unwrap().effect.animated());
    }
}
