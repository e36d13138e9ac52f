//! End-to-end conversion pipeline.
//!
//! A single run owns its descriptor, geometry, and (optionally) volume
//! exclusively; the input file is opened once, read sequentially, and closed
//! on every exit path by scope. Any parse failure aborts the run — the
//! layout is fixed, so a mismatch means a corrupt file or an unsupported
//! variant, never something worth retrying.

use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::chunk::ChunkReader;
use crate::container::parse_container;
use crate::error::Result;
use crate::geometry::{direction_frame, RotationPolicy};
use crate::metadata::{self, parse_scan_geometry};
use crate::nrrd;
use crate::rotate::apply_rotation;
use crate::volume::read_volume;

/// Which output artifact to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Self-contained iff the scan carries a nonzero rotation angle.
    Auto,
    /// Force the self-contained gzip `.nrrd`.
    Nrrd,
    /// Force the detached `.nhdr` referencing the original file.
    Nhdr,
}

impl OutputKind {
    /// Parse a CLI extension choice.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(OutputKind::Auto),
            "nrrd" => Some(OutputKind::Nrrd),
            "nhdr" => Some(OutputKind::Nhdr),
            _ => None,
        }
    }
}

/// What a completed conversion produced.
#[derive(Debug)]
pub struct Conversion {
    /// Path of the emitted header or self-contained file.
    pub output: PathBuf,
    /// Path of the pretty-printed metadata side artifact, if requested.
    pub side_artifact: Option<PathBuf>,
    /// The rotation angle that was resampled in, when the rotation stage ran.
    pub applied_rotation_deg: Option<f64>,
}

fn side_artifact_path(input: &Path) -> PathBuf {
    let mut os = input.as_os_str().to_os_string();
    os.push(".header.xml");
    PathBuf::from(os)
}

/// Convert one `.vol` file, writing the chosen artifact beside the input.
///
/// With `extract_header`, the verbatim metadata text is additionally
/// pretty-printed to `<input>.header.xml`. Nothing is written until all
/// in-memory computation for the corresponding artifact has succeeded.
pub fn convert(input: &Path, kind: OutputKind, extract_header: bool) -> Result<Conversion> {
    let file = File::open(input)?;
    let mut reader = ChunkReader::new(BufReader::new(file));
    let container = parse_container(&mut reader)?;
    let geom = parse_scan_geometry(&container.metadata_xml)?;
    let policy = RotationPolicy::from_geometry(&geom);

    let self_contained = match kind {
        OutputKind::Auto => policy.is_active(),
        OutputKind::Nrrd => true,
        OutputKind::Nhdr => false,
    };
    let output = input.with_extension(if self_contained { "nrrd" } else { "nhdr" });

    let side = if extract_header {
        Some((
            side_artifact_path(input),
            metadata::pretty_print(&container.metadata_xml)?,
        ))
    } else {
        None
    };

    let applied_rotation_deg;
    if self_contained {
        // Frame first: an anisotropic-rotation failure must abort before the
        // full-volume read.
        let frame = direction_frame(&geom, policy)?;
        let mut data_reader = reader.into_inner();
        let volume = read_volume(&mut data_reader, &container.descriptor)?;
        let volume = apply_rotation(volume, policy);
        applied_rotation_deg = policy.is_active().then_some(geom.rotation_angle_deg);
        let bytes = nrrd::attached_file_bytes(&volume, &frame)?;
        fs::write(&output, bytes)?;
    } else {
        // Detached output always describes the stored, unrotated samples.
        let frame = direction_frame(&geom, RotationPolicy::None)?;
        applied_rotation_deg = None;
        let data_file = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let header = nrrd::detached_header(&container.descriptor, &frame, &data_file);
        fs::write(&output, header)?;
    }

    let side_artifact = match side {
        Some((path, text)) => {
            fs::write(&path, text)?;
            Some(path)
        }
        None => None,
    };

    Ok(Conversion {
        output,
        side_artifact,
        applied_rotation_deg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_kind_parse() {
        assert_eq!(OutputKind::parse("auto"), Some(OutputKind::Auto));
        assert_eq!(OutputKind::parse("nrrd"), Some(OutputKind::Nrrd));
        assert_eq!(OutputKind::parse("nhdr"), Some(OutputKind::Nhdr));
        assert_eq!(OutputKind::parse("NRRD"), None);
        assert_eq!(OutputKind::parse(""), None);
    }

    #[test]
    fn side_artifact_appends_to_full_name() {
        let p = side_artifact_path(Path::new("/data/scan.vol"));
        assert_eq!(p, Path::new("/data/scan.vol.header.xml"));
    }

    #[test]
    fn missing_input_is_io_error() {
        let err = convert(
            Path::new("/nonexistent/scan.vol"),
            OutputKind::Auto,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }
}
