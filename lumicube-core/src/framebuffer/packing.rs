//! Bit-packed voxel addressing
//!
//! Voxels are 12 bits deep, so two voxels share three bytes. The bit
//! position of voxel (x, y, z) is `12 * (x | y << 3 | z << 6)`. A voxel at
//! a byte-aligned position occupies the top 12 bits of its two byte
//! window, otherwise the bottom 12 bits.

/// Cube edge length along X
pub const SIZE_X: usize = 8;
/// Cube edge length along Y
pub const SIZE_Y: usize = 8;
/// Cube edge length along Z
pub const SIZE_Z: usize = 8;

/// Bits per voxel
pub const DEPTH_BITS: usize = 12;

/// Largest voxel intensity
pub const MAX_INTENSITY: u16 = (1 << DEPTH_BITS) - 1;

/// Voxel count
pub const VOXELS: usize = SIZE_X * SIZE_Y * SIZE_Z;

/// Bytes per buffer
pub const BUFFER_BYTES: usize = VOXELS * DEPTH_BITS / 8;

const X_SHIFT: usize = 0;
const Y_SHIFT: usize = 3;
const Z_SHIFT: usize = 6;

// The interleaving relies on power-of-two edges and on the last voxel's
// two byte window ending inside the buffer.
const _: () = {
    assert!(SIZE_X == 1 << (Y_SHIFT - X_SHIFT));
    assert!(SIZE_Y == 1 << (Z_SHIFT - Y_SHIFT));
    assert!(SIZE_Z.is_power_of_two());
    assert!(DEPTH_BITS == 12);
    assert!((DEPTH_BITS * (VOXELS - 1)) / 8 + 1 < BUFFER_BYTES);
};

/// Errors from voxel access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoxelError {
    /// Coordinate outside the cube
    OutOfBounds,
    /// Intensity above [`MAX_INTENSITY`]
    IntensityOutOfRange,
}

/// Bit position of a voxel within a buffer
pub fn bit_position(x: usize, y: usize, z: usize) -> Result<usize, VoxelError> {
    if x >= SIZE_X || y >= SIZE_Y || z >= SIZE_Z {
        return Err(VoxelError::OutOfBounds);
    }
    Ok(DEPTH_BITS * (x << X_SHIFT | y << Y_SHIFT | z << Z_SHIFT))
}

/// Write one voxel into a buffer
pub fn encode(
    buf: &mut [u8; BUFFER_BYTES],
    x: usize,
    y: usize,
    z: usize,
    intensity: u16,
) -> Result<(), VoxelError> {
    if intensity > MAX_INTENSITY {
        return Err(VoxelError::IntensityOutOfRange);
    }
    let bit = bit_position(x, y, z)?;
    let n = bit >> 3;

    let raw = u16::from_be_bytes([buf[n], buf[n + 1]]);
    let raw = if bit & 0x7 != 0 {
        (raw & 0xF000) | intensity
    } else {
        (raw & 0x000F) | (intensity << 4)
    };

    let [high, low] = raw.to_be_bytes();
    buf[n] = high;
    buf[n + 1] = low;
    Ok(())
}

/// Read one voxel from a buffer
pub fn decode(buf: &[u8; BUFFER_BYTES], x: usize, y: usize, z: usize) -> Result<u16, VoxelError> {
    let bit = bit_position(x, y, z)?;
    let n = bit >> 3;

    let raw = u16::from_be_bytes([buf[n], buf[n + 1]]);
    Ok(if bit & 0x7 != 0 { raw & 0x0FFF } else { raw >> 4 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_buffer_size() {
        assert_eq!(BUFFER_BYTES, 768);
    }

    #[test]
    fn test_known_layout() {
        let mut buf = [0u8; BUFFER_BYTES];
        encode(&mut buf, 0, 0, 0, 0xABC).unwrap();
        encode(&mut buf, 1, 0, 0, 0x123).unwrap();
        assert_eq!(&buf[..3], &[0xAB, 0xC1, 0x23]);
    }

    #[test]
    fn test_last_voxel_in_range() {
        let bit = bit_position(SIZE_X - 1, SIZE_Y - 1, SIZE_Z - 1).unwrap();
        assert!((bit >> 3) + 1 < BUFFER_BYTES);
    }

    #[test]
    fn test_out_of_bounds() {
        assert_eq!(bit_position(8, 0, 0), Err(VoxelError::OutOfBounds));
        assert_eq!(bit_position(0, 0, 8), Err(VoxelError::OutOfBounds));
        let mut buf = [0u8; BUFFER_BYTES];
        assert_eq!(
            encode(&mut buf, 0, 0, 0, MAX_INTENSITY + 1),
            Err(VoxelError::IntensityOutOfRange)
        );
    }

    proptest! {
        #[test]
        fn prop_voxel_writes_are_isolated(
            x in 0..SIZE_X, y in 0..SIZE_Y, z in 0..SIZE_Z,
            value in 0..=MAX_INTENSITY,
            background in 0..=MAX_INTENSITY,
        ) {
            let mut buf = [0u8; BUFFER_BYTES];
            for vz in 0..SIZE_Z {
                for vy in 0..SIZE_Y {
                    for vx in 0..SIZE_X {
                        encode(&mut buf, vx, vy, vz, background).unwrap();
                    }
                }
            }

            encode(&mut buf, x, y, z, value).unwrap();
            prop_assert_eq!(decode(&buf, x, y, z).unwrap(), value);

            // Neighbours sharing a byte are untouched
            for nx in [x.wrapping_sub(1), x + 1] {
                if nx < SIZE_X {
                    prop_assert_eq!(decode(&buf, nx, y, z).unwrap(), background);
                }
            }
        }
    }
}
