//! Central finite differences.
//!
//! All derivatives are evaluated on interior cells only; guard cells of the
//! result are zero. z is periodic.

use crate::field::{Field3D, Region, YDirection};
use crate::fv::to_aligned;

/// Parallel gradient `∂f/∂y / √g22`, second-order central.
///
/// Differenced in field-aligned y direction and mapped back.
pub fn grad_par(f: &Field3D) -> Field3D {
    let fa = to_aligned(f);
    let mesh = fa.mesh().clone();
    let coords = mesh.coordinates();
    let mut result = Field3D::zero_from(&fa);

    for (x, y, z) in Region::NoBoundary.indices(&mesh) {
        let scale = 2.0 * coords.dy[(x, y)] * coords.g_22[(x, y)].sqrt();
        result[(x, y, z)] = (fa[(x, y + 1, z)] - fa[(x, y - 1, z)]) / scale;
    }

    match f.direction() {
        YDirection::Standard => result.from_field_aligned(),
        YDirection::Aligned => result,
    }
}

/// Radial derivative `∂f/∂x`, second-order central.
pub fn ddx(f: &Field3D) -> Field3D {
    let mesh = f.mesh().clone();
    let coords = mesh.coordinates();
    let mut result = Field3D::zero_from(f);

    for (x, y, z) in Region::NoBoundary.indices(&mesh) {
        result[(x, y, z)] = (f[(x + 1, y, z)] - f[(x - 1, y, z)]) / (2.0 * coords.dx[(x, y)]);
    }
    result
}

/// Binormal derivative `∂f/∂z`, second-order central, periodic.
pub fn ddz(f: &Field3D) -> Field3D {
    let mesh = f.mesh().clone();
    let coords = mesh.coordinates();
    let nz = mesh.nz;
    let mut result = Field3D::zero_from(f);

    for (x, y, z) in Region::NoBoundary.indices(&mesh) {
        let zp = (z + 1) % nz;
        let zm = (z + nz - 1) % nz;
        result[(x, y, z)] = (f[(x, y, zp)] - f[(x, y, zm)]) / (2.0 * coords.dz[(x, y)]);
    }
    result
}

/// Fourth derivative in z, five-point central, periodic.
pub fn d4dz4(f: &Field3D) -> Field3D {
    let mesh = f.mesh().clone();
    let coords = mesh.coordinates();
    let nz = mesh.nz;
    let mut result = Field3D::zero_from(f);

    for (x, y, z) in Region::NoBoundary.indices(&mesh) {
        let at = |offset: isize| {
            let k = (z as isize + offset).rem_euclid(nz as isize) as usize;
            f[(x, y, k)]
        };
        let dz = coords.dz[(x, y)];
        result[(x, y, z)] =
            (at(2) - 4.0 * at(1) + 6.0 * at(0) - 4.0 * at(-1) + at(-2)) / dz.powi(4);
    }
    result
}
