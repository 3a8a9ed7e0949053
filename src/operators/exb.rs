//! ExB advection with a corner-interpolated stream function.
//!
//! Cell layout in the X-Z plane for cell (x, z):
//!
//! ```text
//!    fmp --- vU --- fpp
//!     |              |
//!    vL      n      vR    -> X
//!     |              |
//!    fmm --- vD --- fpm
//! ```
//!
//! The stream function `f` is averaged onto the four corners, face velocities
//! follow from its differences along each face, and `n` is reconstructed at
//! the faces with the MC limiter. Each cell only emits fluxes through faces
//! where flow leaves it; inflow is emitted by the upwind neighbour, so every
//! face flux is counted exactly once.

use crate::field::{Field3D, YDirection};
use crate::fv::{CellEdges, MC, Stencil1D, to_aligned, zero_y_guards};

/// Divergence of `n` advected by the ExB velocity of stream function `f`.
///
/// - `bndry_flux`: allow flux through the physical x edges, using the
///   reconstructed value for outflow and the face mean for inflow
/// - `poloidal`: include the y flux driven by `∂f/∂x` through `J g^23`
/// - `positive`: fall back to first order in any cell whose reconstruction
///   produces a negative face value
///
/// Guard cells of the result are zero.
///
/// # Panics
/// If `n` and `f` are not compatible, or the mesh has fewer than one x guard
/// cell.
pub fn div_n_bxgrad_f_b_xppm(
    n: &Field3D,
    f: &Field3D,
    bndry_flux: bool,
    poloidal: bool,
    positive: bool,
) -> Field3D {
    n.assert_compatible(f, "div_n_bxgrad_f_b_xppm");
    let mesh = n.mesh().clone();
    assert!(mesh.mxg() >= 1, "div_n_bxgrad_f_b_xppm needs x guard cells");
    let coords = mesh.coordinates();
    let nz = mesh.nz;

    let mut result = Field3D::zero_from(n);

    let reconstruct = |c: f64, m: f64, p: f64| {
        let mut s = Stencil1D::new(c, m, p);
        MC.reconstruct(&mut s);
        if positive && (s.left < 0.0 || s.right < 0.0) {
            s.left = s.c;
            s.right = s.c;
        }
        s
    };

    for x in mesh.x_interior() {
        for y in mesh.y_interior() {
            let j = coords.j[(x, y)];
            let dx = coords.dx[(x, y)];
            let dz = coords.dz[(x, y)];
            let vol = dx * j;
            let vol_m = coords.dx[(x - 1, y)] * coords.j[(x - 1, y)];
            let vol_p = coords.dx[(x + 1, y)] * coords.j[(x + 1, y)];

            for z in 0..nz {
                let zp = (z + 1) % nz;
                let zm = (z + nz - 1) % nz;

                // Stream function on the corners
                let fmm = 0.25 * (f[(x, y, z)] + f[(x - 1, y, z)] + f[(x, y, zm)] + f[(x - 1, y, zm)]);
                let fmp = 0.25 * (f[(x, y, z)] + f[(x, y, zp)] + f[(x - 1, y, z)] + f[(x - 1, y, zp)]);
                let fpp = 0.25 * (f[(x, y, z)] + f[(x, y, zp)] + f[(x + 1, y, z)] + f[(x + 1, y, zp)]);
                let fpm = 0.25 * (f[(x, y, z)] + f[(x + 1, y, z)] + f[(x, y, zm)] + f[(x + 1, y, zm)]);

                // Face velocities
                let v_up = j * (fmp - fpp) / dx;
                let v_down = j * (fmm - fpm) / dx;
                let v_right = 0.5 * (j + coords.j[(x + 1, y)]) * (fpp - fpm) / dz;
                let v_left = 0.5 * (j + coords.j[(x - 1, y)]) * (fmp - fmm) / dz;

                // X direction
                let s = reconstruct(n[(x, y, z)], n[(x - 1, y, z)], n[(x + 1, y, z)]);

                let right_flux = if x == mesh.xend && mesh.last_x() {
                    if !bndry_flux {
                        None
                    } else if v_right > 0.0 {
                        Some(v_right * s.right)
                    } else {
                        Some(v_right * 0.5 * (n[(x + 1, y, z)] + n[(x, y, z)]))
                    }
                } else {
                    (v_right > 0.0).then_some(v_right * s.right)
                };
                if let Some(flux) = right_flux {
                    result[(x, y, z)] += flux / vol;
                    result[(x + 1, y, z)] -= flux / vol_p;
                }

                let left_flux = if x == mesh.xstart && mesh.first_x() {
                    if !bndry_flux {
                        None
                    } else if v_left < 0.0 {
                        Some(v_left * s.left)
                    } else {
                        Some(v_left * 0.5 * (n[(x - 1, y, z)] + n[(x, y, z)]))
                    }
                } else {
                    (v_left < 0.0).then_some(v_left * s.left)
                };
                if let Some(flux) = left_flux {
                    result[(x, y, z)] -= flux / vol;
                    result[(x - 1, y, z)] += flux / vol_m;
                }

                // Z direction
                let s = reconstruct(n[(x, y, z)], n[(x, y, zm)], n[(x, y, zp)]);
                if v_up > 0.0 {
                    let flux = v_up * s.right / (j * dz);
                    result[(x, y, z)] += flux;
                    result[(x, y, zp)] -= flux;
                }
                if v_down < 0.0 {
                    let flux = v_down * s.left / (j * dz);
                    result[(x, y, z)] -= flux;
                    result[(x, y, zm)] += flux;
                }
            }
        }
    }

    // Contributions to x guards belong to neighbouring partitions or leave
    // through the physical edge
    for x in (0..mesh.xstart).chain(mesh.xend + 1..mesh.nx) {
        for y in 0..mesh.ny {
            for z in 0..nz {
                result[(x, y, z)] = 0.0;
            }
        }
    }

    if poloidal {
        result += poloidal_flux(n, f);
    }

    zero_y_guards(&mut result);
    result
}

/// Y advection by the poloidal component of the ExB drift.
///
/// Face velocity `¼(∂f/∂x_y + ∂f/∂x_nb)(J g23_y + J g23_nb)`, upwinded face
/// value, no flux through non-periodic domain edges.
fn poloidal_flux(n_in: &Field3D, f_in: &Field3D) -> Field3D {
    let mesh = n_in.mesh().clone();
    let mut dfdx = super::ddx(f_in);
    mesh.communicate(&mut dfdx);

    let n = to_aligned(n_in);
    let dfdx = to_aligned(&dfdx);
    let coords = mesh.coordinates();
    let jg23 = |x: usize, y: usize| coords.j[(x, y)] * coords.g23[(x, y)];

    let mut result = Field3D::zero_from(&n);

    for x in mesh.x_interior() {
        let line = mesh.line(x);
        for y in mesh.y_interior() {
            let vol = coords.parallel_volume(x, y);
            let upper_open = !(line.last_y && !line.periodic_y && y == mesh.yend);
            let lower_open = !(line.first_y && !line.periodic_y && y == mesh.ystart);

            for z in 0..mesh.nz {
                let mut rate = 0.0;
                if upper_open {
                    let v = 0.25 * (dfdx[(x, y, z)] + dfdx[(x, y + 1, z)]) * (jg23(x, y) + jg23(x, y + 1));
                    let nf = if v > 0.0 { n[(x, y, z)] } else { n[(x, y + 1, z)] };
                    rate += v * nf;
                }
                if lower_open {
                    let v = 0.25 * (dfdx[(x, y, z)] + dfdx[(x, y - 1, z)]) * (jg23(x, y) + jg23(x, y - 1));
                    let nf = if v > 0.0 { n[(x, y - 1, z)] } else { n[(x, y, z)] };
                    rate -= v * nf;
                }
                result[(x, y, z)] = rate / vol;
            }
        }
    }

    match n_in.direction() {
        YDirection::Standard => result.from_field_aligned(),
        YDirection::Aligned => result,
    }
}
