//! Global properties of the parallel flux divergence.
//!
//! Checks conservation on periodic lines with varying geometry, mirror
//! symmetry, the wave-speed independence of fixed boundary fluxes, and
//! agreement between a y-partitioned domain and a single domain.

use std::f64::consts::PI;
use std::sync::Arc;

use plasma_fv::mesh::CellMetric;
use plasma_fv::{
    BoundaryFluxMode, Coordinates, Field2D, Field3D, Mesh, MeshBuilder, Region, div_par,
    div_par_fvv,
};

const TOL: f64 = 1e-12;
const NY: usize = 16;

/// Geometry periodic in the interior y index, so guard cells are consistent
/// with the wrapped interior.
fn periodic_metric(ny_interior: usize, myg: usize) -> impl Fn(usize, usize) -> CellMetric {
    move |x, y| {
        let theta = 2.0 * PI * (y as f64 - myg as f64) / ny_interior as f64;
        CellMetric {
            j: 1.0 + 0.3 * theta.sin() + 0.05 * x as f64,
            g_22: 1.5 + 0.4 * theta.cos(),
            dy: 0.2 + 0.05 * (2.0 * theta).cos(),
            ..CellMetric::default()
        }
    }
}

fn periodic_mesh() -> Arc<Mesh> {
    let (nx, ny) = (1 + 4, NY + 4);
    MeshBuilder::new(1, NY, 3)
        .periodic_y()
        .with_coordinates(Coordinates::from_fn(nx, ny, periodic_metric(NY, 2)))
        .build()
}

/// Σ div·J·dy over the interior.
fn volume_integral(div: &Field3D) -> f64 {
    let coords = div.mesh().coordinates();
    Region::NoBoundary
        .indices(div.mesh())
        .map(|(x, y, z)| div[(x, y, z)] * coords.parallel_volume(x, y))
        .sum()
}

fn communicated(mesh: &Arc<Mesh>, f: impl Fn(usize, usize, usize) -> f64) -> Field3D {
    let mut field = Field3D::from_fn(mesh, f);
    mesh.communicate(&mut field);
    field
}

#[test]
fn test_periodic_line_conserves() {
    let mesh = periodic_mesh();
    let n = communicated(&mesh, |_, y, z| {
        2.0 + (0.7 * y as f64).sin() + 0.1 * z as f64
    });
    let v = communicated(&mesh, |_, y, _| 0.8 * (0.4 * y as f64).cos());
    let a = Field3D::filled(&mesh, 1.2);

    let div = div_par(&n, &v, &a, BoundaryFluxMode::FixedFlux);
    let scale = div.max_abs(Region::NoBoundary).max(1.0);
    assert!(volume_integral(&div).abs() < TOL * scale * NY as f64);

    let fvv = div_par_fvv(&n, &v, &a, BoundaryFluxMode::FluxCorrection);
    let scale = fvv.max_abs(Region::NoBoundary).max(1.0);
    assert!(volume_integral(&fvv).abs() < TOL * scale * NY as f64);
}

#[test]
fn test_fixed_flux_total_independent_of_wave_speed() {
    // Open line: interior faces telescope, leaving only the edge fluxes
    let mesh = MeshBuilder::new(1, NY, 1).build();
    let n = Field3D::from_fn(&mesh, |_, y, _| 1.0 + 0.1 * y as f64);
    let v = Field3D::from_fn(&mesh, |_, y, _| 0.2 + 0.05 * y as f64);

    let slow = div_par(
        &n,
        &v,
        &Field3D::filled(&mesh, 0.5),
        BoundaryFluxMode::FixedFlux,
    );
    let fast = div_par(
        &n,
        &v,
        &Field3D::filled(&mesh, 3.0),
        BoundaryFluxMode::FixedFlux,
    );
    assert!((volume_integral(&slow) - volume_integral(&fast)).abs() < 1e-10);

    // Edge flux uses the face average of f and v
    let (lo, hi) = (mesh.ystart, mesh.yend);
    let face = |a: usize, b: usize| 0.25 * (n[(2, a, 0)] + n[(2, b, 0)]) * (v[(2, a, 0)] + v[(2, b, 0)]);
    let expected = face(hi, hi + 1) - face(lo - 1, lo);
    assert!((volume_integral(&slow) - expected).abs() < 1e-10);
}

#[test]
fn test_mirror_symmetry() {
    let mesh = MeshBuilder::new(1, NY, 1).build();
    let ny = mesh.ny;
    let mirror = |y: usize| ny - 1 - y;

    let n_fn = |y: usize| 1.0 + 0.5 * (0.6 * y as f64).sin() + 0.02 * (y * y) as f64;
    let v_fn = |y: usize| 0.3 + 0.4 * (0.9 * y as f64).cos();

    let n = Field3D::from_fn(&mesh, |_, y, _| n_fn(y));
    let v = Field3D::from_fn(&mesh, |_, y, _| v_fn(y));
    let n_m = Field3D::from_fn(&mesh, |_, y, _| n_fn(mirror(y)));
    let v_m = Field3D::from_fn(&mesh, |_, y, _| -v_fn(mirror(y)));
    let a = Field3D::filled(&mesh, 0.9);

    let div = div_par(&n, &v, &a, BoundaryFluxMode::FixedFlux);
    let div_m = div_par(&n_m, &v_m, &a, BoundaryFluxMode::FixedFlux);
    let fvv = div_par_fvv(&n, &v, &a, BoundaryFluxMode::FixedFlux);
    let fvv_m = div_par_fvv(&n_m, &v_m, &a, BoundaryFluxMode::FixedFlux);

    for y in mesh.y_interior() {
        // Scalar divergence is unchanged; momentum flux divergence flips sign
        assert!((div[(2, y, 0)] - div_m[(2, mirror(y), 0)]).abs() < TOL);
        assert!((fvv[(2, y, 0)] + fvv_m[(2, mirror(y), 0)]).abs() < TOL);
    }
}

#[test]
fn test_partitions_match_single_domain() {
    let nz = 2;
    let f_fn = |gy: usize, z: usize| 1.5 + (0.8 * gy as f64).sin() + 0.1 * z as f64;
    let v_fn = |gy: usize| 0.4 * (0.5 * gy as f64).cos() - 0.1;

    // Global interior index of local y on a partition starting at `offset`
    let global = |y: usize, offset: usize| (y as i64 - 2 + offset as i64).rem_euclid(NY as i64) as usize;

    let full = MeshBuilder::new(1, NY, nz).periodic_y().build();
    let n = Field3D::from_fn(&full, |_, y, z| f_fn(global(y, 0), z));
    let v = Field3D::from_fn(&full, |_, y, _| v_fn(global(y, 0)));
    let a = Field3D::filled(&full, 0.7);
    let reference = div_par(&n, &v, &a, BoundaryFluxMode::FixedFlux);

    let half = NY / 2;
    for (offset, first, last) in [(0, true, false), (half, false, true)] {
        let part = MeshBuilder::new(1, half, nz)
            .periodic_y()
            .with_y_partition(first, last)
            .build();
        // Guards filled from the neighbouring partition
        let n_p = Field3D::from_fn(&part, |_, y, z| f_fn(global(y, offset), z));
        let v_p = Field3D::from_fn(&part, |_, y, _| v_fn(global(y, offset)));
        let a_p = Field3D::filled(&part, 0.7);
        let div = div_par(&n_p, &v_p, &a_p, BoundaryFluxMode::FixedFlux);

        for y in part.y_interior() {
            for z in 0..nz {
                let expected = reference[(2, global(y, offset) + 2, z)];
                assert!(
                    (div[(2, y, z)] - expected).abs() < TOL,
                    "partition at {} differs at y = {}",
                    offset,
                    y
                );
            }
        }
    }
}

#[test]
fn test_shifted_metric_leaves_z_uniform_flux_unchanged() {
    let zshift = Field2D::from_fn(5, NY + 4, |x, y| 0.1 * x as f64 + 0.37 * y as f64);
    let shifted = MeshBuilder::new(1, NY, 8).with_zshift(zshift).build();
    let plain = MeshBuilder::new(1, NY, 8).build();

    let profile = |y: usize| 1.0 + 0.2 * y as f64;
    let flow = |y: usize| 0.5 - 0.03 * y as f64;

    let on = |mesh: &Arc<Mesh>| {
        div_par(
            &Field3D::from_fn(mesh, |_, y, _| profile(y)),
            &Field3D::from_fn(mesh, |_, y, _| flow(y)),
            &Field3D::filled(mesh, 1.0),
            BoundaryFluxMode::FixedFlux,
        )
    };
    let a = on(&shifted);
    let b = on(&plain);
    for (x, y, z) in Region::NoBoundary.indices(&plain) {
        assert!((a[(x, y, z)] - b[(x, y, z)]).abs() < 1e-10);
    }
}
