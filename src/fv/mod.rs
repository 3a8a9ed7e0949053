//! Finite-volume parallel flux engine.
//!
//! - [`stencil`]: three-point reconstruction ([`MC`] by default)
//! - [`flux`]: wave-speed limited face fluxes and boundary flux modes
//! - [`boundary`]: per-line iteration ranges and domain-edge detection
//! - [`div_par`](mod@div_par): conservative divergence of `f·v` and `f·v·v`
//! - [`diffusion`]: parallel diffusion `∇·(K ∇_∥ f)`

pub mod boundary;
pub mod diffusion;
pub mod div_par;
pub mod flux;
pub mod stencil;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub use boundary::LineRange;
pub use diffusion::div_par_k_grad_par;
pub use div_par::{FluxFactors, div_par, div_par_fvv, div_par_fvv_with, div_par_with};
pub use flux::{Advection, BoundaryFluxMode, FaceSpeeds, FluxKernel, MomentumAdvection};
pub use stencil::{CellEdges, Fromm, MC, MinMod, StandardCellEdges, Stencil1D, Upwind};

use crate::field::{Field3D, YDirection};

/// Field-aligned copy of `f` (a plain copy if it is already aligned).
pub(crate) fn to_aligned(f: &Field3D) -> Field3D {
    match f.direction() {
        YDirection::Standard => f.to_field_aligned(),
        YDirection::Aligned => f.clone(),
    }
}

/// Run `line` on the (y, z) slab of every interior x index of `result`.
///
/// Slabs are indexed `y * nz + z`. With the `parallel` feature the x-lines
/// run concurrently; each closure call owns its slab exclusively.
pub(crate) fn for_each_line<F>(result: &mut Field3D, line: F)
where
    F: Fn(usize, &mut [f64]) + Send + Sync,
{
    let mesh = result.mesh().clone();
    let slab_len = mesh.ny * mesh.nz;
    let interior = mesh.x_interior();

    #[cfg(feature = "parallel")]
    result
        .data_mut()
        .par_chunks_mut(slab_len)
        .enumerate()
        .filter(|(x, _)| interior.contains(x))
        .for_each(|(x, slab)| line(x, slab));

    #[cfg(not(feature = "parallel"))]
    result
        .data_mut()
        .chunks_mut(slab_len)
        .enumerate()
        .filter(|(x, _)| interior.contains(x))
        .for_each(|(x, slab)| line(x, slab));
}

/// Zero the y guard cells of every x index.
pub(crate) fn zero_y_guards(f: &mut Field3D) {
    let mesh = f.mesh().clone();
    for x in 0..mesh.nx {
        for y in (0..mesh.ystart).chain(mesh.yend + 1..mesh.ny) {
            for z in 0..mesh.nz {
                f[(x, y, z)] = 0.0;
            }
        }
    }
}
