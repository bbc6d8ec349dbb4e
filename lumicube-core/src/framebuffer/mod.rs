//! Double-buffered voxel store
//!
//! Effects draw into the back buffer while the display shows the front
//! buffer. Swapping exchanges the two roles without copying. The display
//! path may only swap once the render loop has finished a frame and set the
//! may-flip gate, so a half drawn frame is never shown.

pub mod packing;

pub use packing::{VoxelError, BUFFER_BYTES, MAX_INTENSITY, SIZE_X, SIZE_Y, SIZE_Z};

/// How an effect uses the two buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlipPolicy {
    /// Draw into the back buffer, show it after a swap
    #[default]
    Flip,
    /// Front and back are the same arena; drawing is visible immediately
    NoFlip,
}

/// Two bit-packed voxel arenas with swappable roles
pub struct FrameBuffer {
    arenas: [[u8; BUFFER_BYTES]; 2],
    front: usize,
    back: usize,
    may_flip: bool,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            arenas: [[0; BUFFER_BYTES]; 2],
            front: 0,
            back: 1,
            may_flip: false,
        }
    }

    /// Write a voxel into the back buffer
    pub fn set(&mut self, x: usize, y: usize, z: usize, intensity: u16) -> Result<(), VoxelError> {
        packing::encode(&mut self.arenas[self.back], x, y, z, intensity)
    }

    /// Read a voxel from the front buffer
    pub fn get(&self, x: usize, y: usize, z: usize) -> Result<u16, VoxelError> {
        packing::decode(&self.arenas[self.front], x, y, z)
    }

    /// Read a voxel from the front buffer, wrapping coordinates around
    /// each axis
    pub fn get_wrapping(&self, x: i16, y: i16, z: i16) -> u16 {
        let x = x.rem_euclid(SIZE_X as i16) as usize;
        let y = y.rem_euclid(SIZE_Y as i16) as usize;
        let z = z.rem_euclid(SIZE_Z as i16) as usize;
        packing::decode(&self.arenas[self.front], x, y, z).unwrap_or(0)
    }

    /// Zero the back buffer
    pub fn clear(&mut self) {
        self.arenas[self.back] = [0; BUFFER_BYTES];
    }

    /// Set every voxel of the back buffer
    pub fn fill(&mut self, intensity: u16) -> Result<(), VoxelError> {
        if intensity > MAX_INTENSITY {
            return Err(VoxelError::IntensityOutOfRange);
        }
        // Three bytes hold two voxels
        let [a, b] = (intensity << 4).to_be_bytes();
        let pattern = [a, b | (intensity >> 8) as u8, intensity as u8];
        for chunk in self.arenas[self.back].chunks_exact_mut(3) {
            chunk.copy_from_slice(&pattern);
        }
        Ok(())
    }

    /// Open or close the may-flip gate
    pub fn allow_flip(&mut self, allow: bool) {
        self.may_flip = allow;
    }

    /// Whether a finished frame is waiting to be shown
    pub fn may_flip(&self) -> bool {
        self.may_flip
    }

    /// Show the back buffer
    ///
    /// Called from the display path. Succeeds only while the gate is open
    /// and closes it again. With aliased roles the exchange changes
    /// nothing.
    pub fn swap(&mut self) -> bool {
        if !self.may_flip {
            return false;
        }
        core::mem::swap(&mut self.front, &mut self.back);
        self.may_flip = false;
        true
    }

    /// Point front and back at different arenas again
    pub fn restore_roles(&mut self) {
        self.back = 1 - self.front;
    }

    /// Put the frame drawn by an effect's init in front
    ///
    /// Under [`FlipPolicy::NoFlip`] the back role is then aliased to the
    /// front arena.
    pub fn commit_initial_frame(&mut self, policy: FlipPolicy) {
        core::mem::swap(&mut self.front, &mut self.back);
        if policy == FlipPolicy::NoFlip {
            self.back = self.front;
        }
    }

    /// Whether front and back share one arena
    pub fn is_aliased(&self) -> bool {
        self.front == self.back
    }

    /// Raw front buffer for the display driver
    pub fn front_bytes(&self) -> &[u8; BUFFER_BYTES] {
        &self.arenas[self.front]
    }
}
