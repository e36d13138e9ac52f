//! NRRD header assembly and the two output strategies.
//!
//! The detached `.nhdr` is a small text header that points back at the
//! original `.vol` file through a byte offset, so no sample data is copied.
//! The self-contained `.nrrd` embeds the (possibly resampled) volume as a
//! gzip stream after the header. Field order in both is a fixed contract,
//! and sizes are emitted fastest-axis-first, i.e. `(Z, Y, X)` — reversed
//! from the internal `(X, Y, Z)` convention.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::Array3;

use crate::container::VolumeDescriptor;
use crate::error::Result;
use crate::geometry::DirectionFrame;

/// NRRD magic line.
pub const MAGIC: &str = "NRRD0004";

/// Format a direction or origin component the way the header expects:
/// zeros as `0`, other integral values with one decimal, the rest plain.
fn fmt_component(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// Format a 3-vector without interior spaces, `(a,b,c)`.
fn fmt_vector(v: [f64; 3]) -> String {
    format!(
        "({},{},{})",
        fmt_component(v[0]),
        fmt_component(v[1]),
        fmt_component(v[2])
    )
}

/// Header fields shared by both strategies, through the `kinds` line.
fn header_common(sizes_zyx: [usize; 3], frame: &DirectionFrame) -> String {
    let mut h = String::new();
    h.push_str(MAGIC);
    h.push('\n');
    h.push_str("# Complete NRRD file format specification at:\n");
    h.push_str("# http://teem.sourceforge.net/nrrd/format.html\n");
    h.push_str("type: signed short\n");
    h.push_str("dimension: 3\n");
    h.push_str(&format!("space: {}\n", frame.space));
    h.push_str(&format!(
        "sizes: {} {} {}\n",
        sizes_zyx[0], sizes_zyx[1], sizes_zyx[2]
    ));
    h.push_str(&format!(
        "space directions: {} {} {}\n",
        fmt_vector(frame.directions[0]),
        fmt_vector(frame.directions[1]),
        fmt_vector(frame.directions[2])
    ));
    h.push_str("kinds: domain domain domain\n");
    h
}

/// Render a detached header referencing `data_file` at the descriptor's
/// recorded byte offset. The volume itself is never touched.
pub fn detached_header(
    desc: &VolumeDescriptor,
    frame: &DirectionFrame,
    data_file: &str,
) -> String {
    let mut h = header_common([desc.size_z, desc.size_y, desc.size_x], frame);
    h.push_str("endian: little\n");
    h.push_str("encoding: raw\n");
    h.push_str(&format!("space origin: {}\n", fmt_vector(frame.origin)));
    h.push_str(&format!("byte skip: {}\n", desc.raw_data_offset));
    h.push_str(&format!("data file: {}\n", data_file));
    h
}

/// Render a complete self-contained file: header, blank separator line, then
/// the volume as a gzip stream of little-endian samples in C order.
pub fn attached_file_bytes(volume: &Array3<i16>, frame: &DirectionFrame) -> Result<Vec<u8>> {
    let (nx, ny, nz) = volume.dim();
    let mut h = header_common([nz, ny, nx], frame);
    h.push_str("endian: little\n");
    h.push_str("encoding: gzip\n");
    h.push_str(&format!("space origin: {}\n", fmt_vector(frame.origin)));
    h.push('\n');

    let mut raw = Vec::with_capacity(volume.len() * 2);
    for &s in volume.iter() {
        raw.extend_from_slice(&s.to_le_bytes());
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    let compressed = encoder.finish()?;

    let mut out = h.into_bytes();
    out.extend_from_slice(&compressed);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{direction_frame, RotationPolicy};
    use crate::metadata::ScanGeometry;
    use std::io::Read;

    fn geom(sx: f64, sy: f64, sz: f64, angle: f64) -> ScanGeometry {
        ScanGeometry {
            spacing_x: sx,
            spacing_y: sy,
            spacing_z: sz,
            rotation_angle_deg: angle,
        }
    }

    fn desc() -> VolumeDescriptor {
        VolumeDescriptor {
            size_x: 64,
            size_y: 64,
            size_z: 32,
            raw_data_offset: 173,
        }
    }

    #[test]
    fn detached_header_field_order_and_values() {
        let g = geom(0.3, 0.3, 0.5, 0.0);
        let frame = direction_frame(&g, RotationPolicy::None).unwrap();
        let header = detached_header(&desc(), &frame, "scan.vol");
        let expected = "\
NRRD0004
# Complete NRRD file format specification at:
# http://teem.sourceforge.net/nrrd/format.html
type: signed short
dimension: 3
space: left-posterior-superior
sizes: 32 64 64
space directions: (0,0,0.5) (0.3,0,0) (0,0.3,0)
kinds: domain domain domain
endian: little
encoding: raw
space origin: (0,0,0)
byte skip: 173
data file: scan.vol
";
        assert_eq!(header, expected);
    }

    #[test]
    fn sizes_are_reversed_from_internal_order() {
        let g = geom(0.1, 0.2, 0.3, 0.0);
        let frame = direction_frame(&g, RotationPolicy::None).unwrap();
        let d = VolumeDescriptor {
            size_x: 10,
            size_y: 20,
            size_z: 30,
            raw_data_offset: 0,
        };
        let header = detached_header(&d, &frame, "a.vol");
        assert!(header.contains("sizes: 30 20 10\n"));
    }

    #[test]
    fn integral_spacing_keeps_one_decimal() {
        let g = geom(1.0, 2.0, 3.0, 0.0);
        let frame = direction_frame(&g, RotationPolicy::None).unwrap();
        let header = detached_header(&desc(), &frame, "a.vol");
        assert!(header.contains("space directions: (0,0,3.0) (1.0,0,0) (0,2.0,0)\n"));
    }

    #[test]
    fn attached_header_uses_rotated_frame() {
        let g = geom(0.3, 0.3, 0.5, 15.0);
        let frame = direction_frame(&g, RotationPolicy::InPlane { angle_deg: 15.0 }).unwrap();
        let volume = Array3::<i16>::zeros((64, 64, 32));
        let bytes = attached_file_bytes(&volume, &frame).unwrap();
        let text = String::from_utf8_lossy(&bytes[..400]);
        assert!(text.starts_with("NRRD0004\n"));
        assert!(text.contains("sizes: 32 64 64\n"));
        assert!(text.contains("space directions: (0,0,0.5) (0,0.3,0) (0.3,0,0)\n"));
        assert!(text.contains("encoding: gzip\n"));
        assert!(text.contains("endian: little\n"));
    }

    #[test]
    fn attached_payload_round_trips_through_gzip() {
        let g = geom(0.3, 0.3, 0.5, 0.0);
        let frame = direction_frame(&g, RotationPolicy::None).unwrap();
        let mut volume = Array3::<i16>::zeros((2, 3, 4));
        for (idx, s) in volume.iter_mut().enumerate() {
            *s = idx as i16 - 12;
        }
        let bytes = attached_file_bytes(&volume, &frame).unwrap();

        // The payload starts after the blank line that ends the header.
        let split = bytes.windows(2).position(|w| w == b"\n\n").unwrap() + 2;
        let mut decoder = flate2::read::GzDecoder::new(&bytes[split..]);
        let mut raw = Vec::new();
        decoder.read_to_end(&mut raw).unwrap();

        let expected: Vec<u8> = volume.iter().flat_map(|s| s.to_le_bytes()).collect();
        assert_eq!(raw, expected);
        assert_eq!(raw.len(), 2 * 2 * 3 * 4);
    }

    #[test]
    fn fmt_component_variants() {
        assert_eq!(fmt_component(0.0), "0");
        assert_eq!(fmt_component(0.3), "0.3");
        assert_eq!(fmt_component(1.0), "1.0");
        assert_eq!(fmt_component(-0.5), "-0.5");
        assert_eq!(fmt_component(-2.0), "-2.0");
    }

    #[test]
    fn fmt_vector_has_no_spaces() {
        assert_eq!(fmt_vector([0.0, 0.0, 0.5]), "(0,0,0.5)");
        assert_eq!(fmt_vector([0.3, 0.0, 0.0]), "(0.3,0,0)");
    }
}
