//! Conservative parallel flux divergence.
//!
//! For every interior x-line, every cell in the [`LineRange`] and every z:
//! 1. reconstruct the advected field (and, for momentum, the velocity) at the
//!    cell's two y faces
//! 2. evaluate the upper and lower face fluxes
//! 3. add each flux to this cell and subtract it from the neighbour sharing
//!    the face, scaled by the geometric [`FluxFactors`]
//!
//! Fields are mapped to field-aligned y direction first and the result is
//! mapped back, so y neighbours are neighbours along the magnetic field.
//!
//! Scaled by cell volume `J·dy`, the two contributions of one face evaluation
//! cancel exactly, so the only net source of the volume integral is the flux
//! through domain edges.

use super::boundary::LineRange;
use super::flux::{
    Advection, BoundaryFluxMode, FaceSpeeds, FluxKernel, MomentumAdvection, lower_edge_flux,
    lower_face_flux, upper_edge_flux, upper_face_flux,
};
use super::stencil::{CellEdges, MC, Stencil1D};
use super::{for_each_line, to_aligned, zero_y_guards};
use crate::field::{Field3D, YDirection};
use crate::mesh::Coordinates;

// =============================================================================
// Geometric factors
// =============================================================================

/// Factors converting a face flux into a rate of change in each adjacent cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluxFactors {
    /// Upper face, this cell
    pub rc: f64,
    /// Upper face, cell above
    pub rp: f64,
    /// Lower face, this cell
    pub lc: f64,
    /// Lower face, cell below
    pub lm: f64,
}

impl FluxFactors {
    /// Factors for cell (x, y).
    ///
    /// `common = (J_y + J_nb) / (√g22_y + √g22_nb)` on each face, divided by
    /// the volume `dy·J` of the cell receiving the contribution.
    #[inline]
    pub fn at(coords: &Coordinates, x: usize, y: usize) -> Self {
        let j = &coords.j;
        let g22 = &coords.g_22;
        let dy = &coords.dy;

        let vol_c = dy[(x, y)] * j[(x, y)];

        let common_r = (j[(x, y)] + j[(x, y + 1)]) / (g22[(x, y)].sqrt() + g22[(x, y + 1)].sqrt());
        let common_l = (j[(x, y)] + j[(x, y - 1)]) / (g22[(x, y)].sqrt() + g22[(x, y - 1)].sqrt());

        Self {
            rc: common_r / vol_c,
            rp: common_r / (dy[(x, y + 1)] * j[(x, y + 1)]),
            lc: common_l / vol_c,
            lm: common_l / (dy[(x, y - 1)] * j[(x, y - 1)]),
        }
    }
}

// =============================================================================
// Public operators
// =============================================================================

/// Parallel divergence of the advective flux `f · v`, MC reconstruction.
///
/// `wave_speed` must be non-negative. Edge faces use `mode`; the usual choice
/// is [`BoundaryFluxMode::FixedFlux`].
///
/// # Panics
/// If the fields are not compatible or the mesh has fewer than two y guard
/// cells.
pub fn div_par(f: &Field3D, v: &Field3D, wave_speed: &Field3D, mode: BoundaryFluxMode) -> Field3D {
    div_par_with(&MC, f, v, wave_speed, mode)
}

/// [`div_par`] with an explicit reconstruction scheme.
pub fn div_par_with<E: CellEdges>(
    edges: &E,
    f: &Field3D,
    v: &Field3D,
    wave_speed: &Field3D,
    mode: BoundaryFluxMode,
) -> Field3D {
    accumulate(Advection, edges, f, v, wave_speed, mode)
}

/// Parallel divergence of the momentum flux `f · v · v`, MC reconstruction.
///
/// Both `f` and `v` are reconstructed at faces.
///
/// # Panics
/// If the fields are not compatible or the mesh has fewer than two y guard
/// cells.
pub fn div_par_fvv(
    f: &Field3D,
    v: &Field3D,
    wave_speed: &Field3D,
    mode: BoundaryFluxMode,
) -> Field3D {
    div_par_fvv_with(&MC, f, v, wave_speed, mode)
}

/// [`div_par_fvv`] with an explicit reconstruction scheme.
pub fn div_par_fvv_with<E: CellEdges>(
    edges: &E,
    f: &Field3D,
    v: &Field3D,
    wave_speed: &Field3D,
    mode: BoundaryFluxMode,
) -> Field3D {
    accumulate(MomentumAdvection, edges, f, v, wave_speed, mode)
}

// =============================================================================
// Accumulator
// =============================================================================

fn accumulate<K: FluxKernel, E: CellEdges>(
    kernel: K,
    edges: &E,
    f_in: &Field3D,
    v_in: &Field3D,
    wave_speed_in: &Field3D,
    mode: BoundaryFluxMode,
) -> Field3D {
    f_in.assert_compatible(v_in, "div_par");
    f_in.assert_compatible(wave_speed_in, "div_par");

    let f = to_aligned(f_in);
    let v = to_aligned(v_in);
    let a = to_aligned(wave_speed_in);

    let mesh = f.mesh().clone();
    let coords = mesh.coordinates();
    let nz = mesh.nz;

    let mut result = Field3D::zero_from(&f);

    for_each_line(&mut result, |x, slab| {
        let range = LineRange::for_line(&mesh, x);
        let at = |y: usize, z: usize| y * nz + z;

        for y in range.cells() {
            let factors = FluxFactors::at(coords, x, y);

            for z in 0..nz {
                let mut s = Stencil1D::new(f[(x, y, z)], f[(x, y - 1, z)], f[(x, y + 1, z)]);
                edges.reconstruct(&mut s);

                let mut sv = Stencil1D::new(v[(x, y, z)], v[(x, y - 1, z)], v[(x, y + 1, z)]);
                if kernel.needs_velocity_edges() {
                    edges.reconstruct(&mut sv);
                }

                let a_c = a[(x, y, z)];

                // Upper face (y + 1/2)
                let upper = FaceSpeeds::new(sv.c, sv.p, a_c, a[(x, y + 1, z)]);
                let q = kernel.carried(s.right, sv.right);
                let flux = if range.is_upper_edge(&mesh, y) {
                    let q_mid = kernel.edge_carried(0.5 * (s.c + s.p), upper.vpar);
                    upper_edge_flux(mode, q, q_mid, upper.vpar, a_c)
                } else {
                    upper_face_flux(q, upper)
                };
                slab[at(y, z)] += flux * factors.rc;
                slab[at(y + 1, z)] -= flux * factors.rp;

                // Lower face (y - 1/2)
                let lower = FaceSpeeds::new(sv.c, sv.m, a_c, a[(x, y - 1, z)]);
                let q = kernel.carried(s.left, sv.left);
                let flux = if range.is_lower_edge(&mesh, y) {
                    let q_mid = kernel.edge_carried(0.5 * (s.c + s.m), lower.vpar);
                    lower_edge_flux(mode, q, q_mid, lower.vpar, a_c)
                } else {
                    lower_face_flux(q, lower)
                };
                slab[at(y, z)] -= flux * factors.lc;
                slab[at(y - 1, z)] += flux * factors.lm;
            }
        }
    });

    zero_y_guards(&mut result);

    match f_in.direction() {
        YDirection::Standard => result.from_field_aligned(),
        YDirection::Aligned => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Region;
    use crate::fv::Upwind;
    use crate::mesh::{CellMetric, Coordinates, MeshBuilder};

    const TOL: f64 = 1e-12;

    fn open_mesh() -> std::sync::Arc<crate::mesh::Mesh> {
        MeshBuilder::new(2, 8, 3).with_spacing(1.0, 0.5, 1.0).build()
    }

    #[test]
    fn test_zero_flow_gives_zero_divergence() {
        let mesh = open_mesh();
        let n = Field3D::filled(&mesh, 1.0);
        let v = Field3D::new(&mesh);
        let a = Field3D::filled(&mesh, 1.0);

        for mode in [BoundaryFluxMode::FixedFlux, BoundaryFluxMode::FluxCorrection] {
            let d = div_par(&n, &v, &a, mode);
            assert!(d.data().iter().all(|&x| x == 0.0));
            let d = div_par_fvv(&n, &v, &a, mode);
            assert!(d.data().iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn test_uniform_flow_interior_is_zero() {
        // Constant f and v: interior faces carry equal flux in and out
        let mesh = MeshBuilder::new(1, 8, 1).periodic_y().build();
        let mut n = Field3D::filled(&mesh, 2.0);
        let mut v = Field3D::filled(&mesh, 0.3);
        let a = Field3D::filled(&mesh, 1.0);
        mesh.communicate(&mut n);
        mesh.communicate(&mut v);

        let d = div_par(&n, &v, &a, BoundaryFluxMode::FixedFlux);
        assert!(d.max_abs(Region::NoBoundary) < TOL);
    }

    #[test]
    fn test_supersonic_upwind_with_fixed_flux_edges() {
        // Open line, supersonic flow towards the upper edge, first-order faces
        let mesh = MeshBuilder::new(1, 4, 1).build();
        let n = Field3D::from_fn(&mesh, |_, y, _| y as f64);
        let v = Field3D::filled(&mesh, 2.0);
        let a = Field3D::filled(&mesh, 0.5);

        let d = div_par_with(&Upwind, &n, &v, &a, BoundaryFluxMode::FixedFlux);

        // Interior faces carry n_y * v from the upwind cell; the edges carry
        // the face mid-point value: 0.5 * (2 + 1) * 2 in, 0.5 * (5 + 6) * 2 out
        let expected = [(2, 4.0 - 3.0), (3, 6.0 - 4.0), (4, 8.0 - 6.0), (5, 11.0 - 8.0)];
        for (y, value) in expected {
            assert!((d[(2, y, 0)] - value).abs() < TOL, "y = {}", y);
        }
        assert!((d.sum(Region::NoBoundary) - (11.0 - 3.0)).abs() < TOL);
    }

    #[test]
    fn test_guard_cells_zeroed() {
        let mesh = MeshBuilder::new(1, 4, 1).periodic_y().build();
        let n = Field3D::from_fn(&mesh, |_, y, _| 1.0 + y as f64);
        let v = Field3D::filled(&mesh, 0.5);
        let a = Field3D::filled(&mesh, 1.0);
        let d = div_par(&n, &v, &a, BoundaryFluxMode::FixedFlux);
        for y in [0, 1, 6, 7] {
            assert_eq!(d[(2, y, 0)], 0.0);
        }
    }

    #[test]
    fn test_volume_weighted_factors_balance() {
        let mesh = MeshBuilder::new(1, 4, 1)
            .with_coordinates(Coordinates::from_fn(5, 8, |_, y| CellMetric {
                j: 1.0 + 0.1 * y as f64,
                g_22: 2.0 + 0.3 * y as f64,
                dy: 0.5 + 0.05 * y as f64,
                ..CellMetric::default()
            }))
            .build();
        let coords = mesh.coordinates();
        for y in 2..=5 {
            let here = FluxFactors::at(coords, 2, y);
            let above = FluxFactors::at(coords, 2, y + 1);
            // Upper face of y is the lower face of y + 1
            let vol = |y| coords.parallel_volume(2, y);
            assert!((here.rc * vol(y) - here.rp * vol(y + 1)).abs() < TOL);
            assert!((here.rc * vol(y) - above.lc * vol(y + 1)).abs() < TOL);
            assert!((here.rc - above.lm).abs() < TOL);
        }
    }

    #[test]
    fn test_aligned_input_returns_aligned() {
        let mesh = open_mesh();
        let n = Field3D::filled(&mesh, 1.0).to_field_aligned();
        let v = Field3D::filled(&mesh, 0.1).to_field_aligned();
        let a = Field3D::filled(&mesh, 1.0).to_field_aligned();
        let d = div_par_with(&Upwind, &n, &v, &a, BoundaryFluxMode::FixedFlux);
        assert_eq!(d.direction(), YDirection::Aligned);
    }

    #[test]
    #[should_panic(expected = "incompatible fields")]
    fn test_incompatible_inputs_panic() {
        let mesh = open_mesh();
        let other = open_mesh();
        let n = Field3D::filled(&mesh, 1.0);
        let v = Field3D::new(&other);
        let _ = div_par(&n, &v, &n, BoundaryFluxMode::FixedFlux);
    }
}
