//! Loading of the raw sample stream into a dense 3-D array.
//!
//! Samples are little-endian signed 16-bit integers in X-major order; the
//! loaded array has shape `(size_x, size_y, size_z)`. The loader runs only on
//! the self-contained output path — the detached path leaves the samples in
//! the original file and records the byte offset instead.

use std::io::Read;

use ndarray::Array3;

use crate::container::VolumeDescriptor;
use crate::error::{Error, Result};

/// Sentinel written to samples that interpolate outside the source extent.
pub const FILL_VALUE: i16 = -32768;

/// Decode a raw byte stream into a volume with the descriptor's shape.
///
/// The byte count must equal exactly `2 * size_x * size_y * size_z`;
/// anything else is a [`Error::SizeMismatch`].
pub fn volume_from_bytes(bytes: &[u8], desc: &VolumeDescriptor) -> Result<Array3<i16>> {
    let expected = desc.sample_count();
    if bytes.len() != expected * 2 {
        return Err(Error::SizeMismatch {
            expected,
            actual: bytes.len() / 2,
        });
    }
    let samples: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect();
    Array3::from_shape_vec((desc.size_x, desc.size_y, desc.size_z), samples).map_err(|_| {
        Error::SizeMismatch {
            expected,
            actual: bytes.len() / 2,
        }
    })
}

/// Read all remaining bytes from `reader` and decode them as the volume.
///
/// The reader must already be positioned at `desc.raw_data_offset`.
pub fn read_volume<R: Read>(reader: &mut R, desc: &VolumeDescriptor) -> Result<Array3<i16>> {
    let mut bytes = Vec::with_capacity(desc.sample_count() * 2);
    reader.read_to_end(&mut bytes)?;
    volume_from_bytes(&bytes, desc)
}
