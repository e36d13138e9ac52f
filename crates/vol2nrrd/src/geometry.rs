//! Output coordinate frame construction.
//!
//! The emitted header axes follow the NRRD fastest-axis-first convention, so
//! the first direction row belongs to physical Z. When the scan requests an
//! in-plane rotation, the rotation stage's axis-0 flip swaps the roles of the
//! two in-plane axes; the frame must track the data, not the nominal labels,
//! so the rotated variant permutes the X and Y rows. Both the rotation stage
//! and this builder consume the same [`RotationPolicy`] so the swap is decided
//! in exactly one place.

use crate::error::{Error, Result};
use crate::metadata::ScanGeometry;

/// Coordinate-space label emitted in every header.
pub const SPACE: &str = "left-posterior-superior";

/// Whether and how the volume is resampled before emission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationPolicy {
    /// No resampling; the unrotated frame applies.
    None,
    /// In-plane rotation by the given signed angle, followed by the axis-0
    /// flip; the rotated frame applies.
    InPlane {
        /// Rotation angle in degrees.
        angle_deg: f64,
    },
}

impl RotationPolicy {
    /// Derive the policy from parsed scan geometry: any nonzero angle
    /// activates rotation.
    pub fn from_geometry(geom: &ScanGeometry) -> Self {
        if geom.has_rotation() {
            RotationPolicy::InPlane {
                angle_deg: geom.rotation_angle_deg,
            }
        } else {
            RotationPolicy::None
        }
    }

    /// Returns `true` if the resampler will run.
    pub fn is_active(&self) -> bool {
        matches!(self, RotationPolicy::InPlane { .. })
    }
}

/// Per-axis physical displacement vectors plus origin and space label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionFrame {
    /// Row i is the physical displacement per unit step along output axis i.
    pub directions: [[f64; 3]; 3],
    /// Physical position of the first voxel.
    pub origin: [f64; 3],
    /// Coordinate-space label.
    pub space: &'static str,
}

/// Build the direction frame matching `policy`.
///
/// The rotated variant requires equal X/Y spacing; unequal spacings fail
/// with [`Error::UnsupportedAnisotropicRotation`].
pub fn direction_frame(geom: &ScanGeometry, policy: RotationPolicy) -> Result<DirectionFrame> {
    let directions = match policy {
        RotationPolicy::None => [
            [0.0, 0.0, geom.spacing_z],
            [geom.spacing_x, 0.0, 0.0],
            [0.0, geom.spacing_y, 0.0],
        ],
        RotationPolicy::InPlane { .. } => {
            if geom.spacing_x != geom.spacing_y {
                return Err(Error::UnsupportedAnisotropicRotation {
                    spacing_x: geom.spacing_x,
                    spacing_y: geom.spacing_y,
                });
            }
            [
                [0.0, 0.0, geom.spacing_z],
                [0.0, geom.spacing_y, 0.0],
                [geom.spacing_x, 0.0, 0.0],
            ]
        }
    };
    Ok(DirectionFrame {
        directions,
        origin: [0.0, 0.0, 0.0],
        space: SPACE,
    })
}
