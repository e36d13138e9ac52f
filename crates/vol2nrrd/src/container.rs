//! Strict sequential parser for the `.vol` container layout.
//!
//! The container is a hand-rolled chunked format with no self-describing
//! schema: a version tag, a Shift-JIS XML metadata block, an array tag, and
//! three signed 32-bit inclusive bounding-box pairs, followed immediately by
//! the raw sample stream. Chunk order and literal tag values are part of the
//! contract, so the parser fails closed on any deviation — there is no
//! resynchronization.

use std::io::Read;

use encoding_rs::SHIFT_JIS;

use crate::chunk::ChunkReader;
use crate::error::{Error, Result};

/// Literal tag of the first chunk.
pub const VERSION_TAG: &str = "JmVolumeVersion=1";

/// Literal tag of the chunk preceding the bounding boxes.
pub const ARRAY_TAG: &str = "CArray3D";

/// Shape of the voxel grid and the location of its sample stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeDescriptor {
    /// Voxel count along X, `x_max - x_min + 1`.
    pub size_x: usize,
    /// Voxel count along Y, `y_max - y_min + 1`.
    pub size_y: usize,
    /// Voxel count along Z, `z_max - z_min + 1`.
    pub size_z: usize,
    /// Byte offset into the source stream where sample data begins.
    pub raw_data_offset: u64,
}

impl VolumeDescriptor {
    /// Total number of `i16` samples the descriptor implies.
    pub fn sample_count(&self) -> usize {
        self.size_x * self.size_y * self.size_z
    }
}

/// Everything the container header carries besides the sample stream.
#[derive(Debug, Clone)]
pub struct Container {
    /// Grid shape and sample-stream offset.
    pub descriptor: VolumeDescriptor,
    /// The embedded metadata text, decoded from Shift-JIS, unmodified.
    pub metadata_xml: String,
}

/// Read one length-prefixed chunk and require its bytes to equal `tag`.
fn expect_tag<R: Read>(reader: &mut ChunkReader<R>, tag: &'static str) -> Result<()> {
    let len = reader.read_u32_le()? as usize;
    let data = reader.read_bytes(len)?;
    if data != tag.as_bytes() {
        return Err(Error::BadMagic {
            expected: tag,
            found: String::from_utf8_lossy(&data).into_owned(),
        });
    }
    Ok(())
}

/// Derive an axis size from an inclusive bounding-box pair.
fn axis_size(axis: char, (min, max): (i32, i32)) -> Result<usize> {
    let size = i64::from(max) - i64::from(min) + 1;
    if size < 1 {
        return Err(Error::InvalidBounds { axis, min, max });
    }
    Ok(size as usize)
}

/// Parse the container header, leaving `reader` positioned at the first
/// sample byte.
///
/// On success, `descriptor.raw_data_offset` equals `reader.position()`.
pub fn parse_container<R: Read>(reader: &mut ChunkReader<R>) -> Result<Container> {
    expect_tag(reader, VERSION_TAG)?;

    let len = reader.read_u32_le()? as usize;
    let raw = reader.read_bytes(len)?;
    // The metadata block is Shift-JIS, a fixed fact of the format.
    let (text, _, had_errors) = SHIFT_JIS.decode(&raw);
    if had_errors {
        return Err(Error::BadTextEncoding);
    }
    let metadata_xml = text.into_owned();

    expect_tag(reader, ARRAY_TAG)?;

    let size_x = axis_size('X', reader.read_i32_le_pair()?)?;
    let size_y = axis_size('Y', reader.read_i32_le_pair()?)?;
    let size_z = axis_size('Z', reader.read_i32_le_pair()?)?;
    let raw_data_offset = reader.position();

    Ok(Container {
        descriptor: VolumeDescriptor {
            size_x,
            size_y,
            size_z,
            raw_data_offset,
        },
        metadata_xml,
    })
}
