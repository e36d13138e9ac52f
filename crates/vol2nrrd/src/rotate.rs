//! In-plane resampling of the loaded volume.
//!
//! The anti-aliasing acquisition stores slices rotated by a known angle; the
//! converter undoes this by rotating every slice in the (axis 0, axis 1)
//! plane with bilinear interpolation and then reversing axis 0. The order is
//! contractual: rotate first, then flip. Swapping them changes the output
//! orientation, which is why the emitted direction frame permutes the
//! in-plane axes (see `geometry`).

use ndarray::{Array3, Axis};

use crate::geometry::RotationPolicy;
use crate::volume::FILL_VALUE;

/// Rotate the volume in the (axis 0, axis 1) plane by `angle_deg` around the
/// slice center.
///
/// Output shape equals input shape; order-1 (bilinear) interpolation; any
/// sample whose source coordinate has neighbors outside the input extent
/// takes [`FILL_VALUE`] for those neighbors. Positive angles rotate from
/// axis 0 toward axis 1.
pub fn rotate_in_plane(volume: &Array3<i16>, angle_deg: f64) -> Array3<i16> {
    let (nx, ny, nz) = volume.dim();
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let ci = (nx as f64 - 1.0) / 2.0;
    let cj = (ny as f64 - 1.0) / 2.0;

    let sample = |ii: isize, jj: isize, k: usize| -> f64 {
        if ii >= 0 && (ii as usize) < nx && jj >= 0 && (jj as usize) < ny {
            f64::from(volume[[ii as usize, jj as usize, k]])
        } else {
            f64::from(FILL_VALUE)
        }
    };

    let mut out = Array3::from_elem((nx, ny, nz), FILL_VALUE);
    for i in 0..nx {
        let di = i as f64 - ci;
        for j in 0..ny {
            let dj = j as f64 - cj;
            // Inverse mapping: output offsets to source coordinates.
            let si = cos * di + sin * dj + ci;
            let sj = -sin * di + cos * dj + cj;
            let i0 = si.floor();
            let j0 = sj.floor();
            let fi = si - i0;
            let fj = sj - j0;
            let (i0, j0) = (i0 as isize, j0 as isize);
            for k in 0..nz {
                let v = sample(i0, j0, k) * (1.0 - fi) * (1.0 - fj)
                    + sample(i0 + 1, j0, k) * fi * (1.0 - fj)
                    + sample(i0, j0 + 1, k) * (1.0 - fi) * fj
                    + sample(i0 + 1, j0 + 1, k) * fi * fj;
                out[[i, j, k]] = v.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
            }
        }
    }
    out
}

/// Apply the rotation policy: a no-op for [`RotationPolicy::None`], otherwise
/// rotate in-plane and reverse axis 0.
pub fn apply_rotation(volume: Array3<i16>, policy: RotationPolicy) -> Array3<i16> {
    match policy {
        RotationPolicy::None => volume,
        RotationPolicy::InPlane { angle_deg } => {
            let mut rotated = rotate_in_plane(&volume, angle_deg);
            rotated.invert_axis(Axis(0));
            rotated
        }
    }
}
