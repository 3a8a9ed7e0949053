//! Perpendicular diffusion in index space.

use crate::field::Field3D;
use crate::fv::zero_y_guards;

/// Conservative X-Z diffusion `∇·(a ∇f)` in index space (unit spacing, no
/// metric).
///
/// Face coefficients are the mean of `a` in the two cells. The two x faces on
/// physical domain edges carry flux only when `xflux` is set; faces towards
/// another x partition always do. Guard cells of the result are zero.
///
/// # Panics
/// If `a` and `f` are not compatible.
pub fn div_perp_lap_fv_index(a: &Field3D, f: &Field3D, xflux: bool) -> Field3D {
    a.assert_compatible(f, "div_perp_lap_fv_index");
    let mesh = f.mesh().clone();
    assert!(mesh.mxg() >= 1, "div_perp_lap_fv_index needs x guard cells");
    let nz = mesh.nz;
    let mut result = Field3D::zero_from(f);

    // Faces between x and x + 1
    for x in mesh.xstart - 1..=mesh.xend {
        let physical_edge =
            (x == mesh.xstart - 1 && mesh.first_x()) || (x == mesh.xend && mesh.last_x());
        if physical_edge && !xflux {
            continue;
        }
        for y in mesh.y_interior() {
            for z in 0..nz {
                let gradient = f[(x + 1, y, z)] - f[(x, y, z)];
                let coefficient = 0.5 * (a[(x + 1, y, z)] + a[(x, y, z)]);
                let flux = coefficient * gradient;
                result[(x, y, z)] += flux;
                result[(x + 1, y, z)] -= flux;
            }
        }
    }

    // Faces between z and z + 1
    for x in mesh.x_interior() {
        for y in mesh.y_interior() {
            for z in 0..nz {
                let zp = (z + 1) % nz;
                let gradient = f[(x, y, zp)] - f[(x, y, z)];
                let coefficient = 0.5 * (a[(x, y, zp)] + a[(x, y, z)]);
                let flux = coefficient * gradient;
                result[(x, y, z)] += flux;
                result[(x, y, zp)] -= flux;
            }
        }
    }

    // x guards hold partial sums that belong to neighbouring partitions
    for x in (0..mesh.xstart).chain(mesh.xend + 1..mesh.nx) {
        for y in 0..mesh.ny {
            for z in 0..nz {
                result[(x, y, z)] = 0.0;
            }
        }
    }
    zero_y_guards(&mut result);
    result
}
