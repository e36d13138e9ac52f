//! Low-level cursor over the container byte stream.
//!
//! The `.vol` container is a sequence of little-endian fixed-width integers
//! and length-prefixed byte blocks. [`ChunkReader`] wraps any [`Read`] source,
//! tracks the absolute byte offset, and converts short reads into
//! [`Error::TruncatedInput`]. The offset after the last header field is reused
//! verbatim as the `byte skip` value of a detached NRRD header.

use std::io::Read;

use crate::error::{Error, Result};

/// A reading cursor over a `.vol` byte stream.
pub struct ChunkReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> ChunkReader<R> {
    /// Wrap a byte source, starting at offset 0.
    pub fn new(inner: R) -> Self {
        ChunkReader { inner, offset: 0 }
    }

    /// Absolute byte offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.offset
    }

    /// Consume the reader, returning the wrapped source.
    ///
    /// The source is left positioned at [`position`](Self::position).
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::TruncatedInput
            } else {
                Error::Io(e)
            }
        })?;
        self.offset += buf.len() as u64;
        Ok(())
    }

    /// Read a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Read two little-endian `i32` values (an inclusive bounding-box pair).
    pub fn read_i32_le_pair(&mut self) -> Result<(i32, i32)> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        let lo = i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let hi = i32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        Ok((lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_u32_le_known_bytes() {
        let data = [0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut r = ChunkReader::new(&data[..]);
        assert_eq!(r.read_u32_le().unwrap(), 1);
        assert_eq!(r.read_u32_le().unwrap(), u32::MAX);
    }

    #[test]
    fn read_u32_le_truncated() {
        let data = [0x01, 0x00];
        let mut r = ChunkReader::new(&data[..]);
        assert!(matches!(r.read_u32_le(), Err(Error::TruncatedInput)));
    }

    #[test]
    fn read_bytes_exact() {
        let data = b"abcdef";
        let mut r = ChunkReader::new(&data[..]);
        assert_eq!(r.read_bytes(4).unwrap(), b"abcd");
        assert_eq!(r.read_bytes(2).unwrap(), b"ef");
    }

    #[test]
    fn read_bytes_truncated() {
        let data = b"abc";
        let mut r = ChunkReader::new(&data[..]);
        assert!(matches!(r.read_bytes(4), Err(Error::TruncatedInput)));
    }

    #[test]
    fn read_bytes_zero_length() {
        let data = b"";
        let mut r = ChunkReader::new(&data[..]);
        assert_eq!(r.read_bytes(0).unwrap(), Vec::<u8>::new());
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn read_i32_le_pair_known_bytes() {
        // (-1, 256)
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x01, 0x00, 0x00];
        let mut r = ChunkReader::new(&data[..]);
        assert_eq!(r.read_i32_le_pair().unwrap(), (-1, 256));
    }

    #[test]
    fn read_i32_le_pair_truncated() {
        let data = [0u8; 7];
        let mut r = ChunkReader::new(&data[..]);
        assert!(matches!(r.read_i32_le_pair(), Err(Error::TruncatedInput)));
    }

    #[test]
    fn position_tracks_consumed_bytes() {
        let data = [0u8; 16];
        let mut r = ChunkReader::new(&data[..]);
        assert_eq!(r.position(), 0);
        r.read_u32_le().unwrap();
        assert_eq!(r.position(), 4);
        r.read_bytes(3).unwrap();
        assert_eq!(r.position(), 7);
        r.read_i32_le_pair().unwrap();
        assert_eq!(r.position(), 15);
    }

    #[test]
    fn position_unchanged_after_failed_read() {
        // read_exact on a short source leaves the cursor offset untouched
        // from the caller's perspective: the parse is fatal either way,
        // but the recorded offset must never include a partial field.
        let data = [0u8; 2];
        let mut r = ChunkReader::new(&data[..]);
        let _ = r.read_u32_le();
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn into_inner_returns_source() {
        let data = b"abcd";
        let mut r = ChunkReader::new(&data[..]);
        r.read_bytes(2).unwrap();
        let rest = r.into_inner();
        assert_eq!(rest, &b"cd"[..]);
    }
}
