//! Parallel diffusion in conservative form.

use super::boundary::LineRange;
use super::{for_each_line, to_aligned};
use crate::field::{Field3D, YDirection};

/// Finite-volume `∇·(b K b·∇f)` along the magnetic field.
///
/// For each interior cell the flux through the upper face is
/// `K_f · J_f · 2(f_{y+1} − f_y) / (dy_y + dy_{y+1}) / g22_f`, where `_f`
/// denotes the mean of the two cells sharing the face; it is divided by the
/// cell volume `dy·J` and added. The lower face is treated the same way and
/// subtracted. Each face is computed identically from both sides.
///
/// Faces on a non-periodic domain edge carry flux only when `bndry_flux` is
/// set, in which case the y guard cells act as the boundary value.
///
/// # Panics
/// If `k` and `f` are not compatible.
pub fn div_par_k_grad_par(k: &Field3D, f: &Field3D, bndry_flux: bool) -> Field3D {
    k.assert_compatible(f, "div_par_k_grad_par");

    let k_al = to_aligned(k);
    let f_al = to_aligned(f);
    let mesh = f_al.mesh().clone();
    let coords = mesh.coordinates();
    let nz = mesh.nz;

    let mut result = Field3D::zero_from(&f_al);

    for_each_line(&mut result, |x, slab| {
        let range = LineRange::for_line(&mesh, x);

        for y in mesh.y_interior() {
            let vol = coords.parallel_volume(x, y);

            // Face geometry between y and y + dir
            let face = |nb: usize| {
                let j = 0.5 * (coords.j[(x, y)] + coords.j[(x, nb)]);
                let g = 0.5 * (coords.g_22[(x, y)] + coords.g_22[(x, nb)]);
                let dy = coords.dy[(x, y)] + coords.dy[(x, nb)];
                (j, g, dy)
            };

            let upper = (bndry_flux || !range.is_upper_edge(&mesh, y)).then(|| face(y + 1));
            let lower = (bndry_flux || !range.is_lower_edge(&mesh, y)).then(|| face(y - 1));

            for z in 0..nz {
                let fc = f_al[(x, y, z)];
                let kc = k_al[(x, y, z)];
                let mut rate = 0.0;

                if let Some((j, g, dy)) = upper {
                    let c = 0.5 * (kc + k_al[(x, y + 1, z)]);
                    let gradient = 2.0 * (f_al[(x, y + 1, z)] - fc) / dy;
                    rate += c * j * gradient / g / vol;
                }
                if let Some((j, g, dy)) = lower {
                    let c = 0.5 * (kc + k_al[(x, y - 1, z)]);
                    let gradient = 2.0 * (fc - f_al[(x, y - 1, z)]) / dy;
                    rate -= c * j * gradient / g / vol;
                }

                slab[y * nz + z] = rate;
            }
        }
    });

    match f.direction() {
        YDirection::Standard => result.from_field_aligned(),
        YDirection::Aligned => result,
    }
}
