//! Geometric factors of a field-aligned coordinate system.
//!
//! All quantities are axisymmetric (functions of x and y only) and stored as
//! [`Field2D`] including guard cells, so stencils that reach into guard cells
//! read consistent geometry.

use crate::field::Field2D;

/// Metric data for a single cell, used to build [`Coordinates`] pointwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellMetric {
    /// Jacobian J
    pub j: f64,
    /// Covariant metric component g_22
    pub g_22: f64,
    /// Contravariant metric component g^23
    pub g23: f64,
    /// Radial grid spacing
    pub dx: f64,
    /// Parallel grid spacing
    pub dy: f64,
    /// Binormal grid spacing
    pub dz: f64,
}

impl Default for CellMetric {
    fn default() -> Self {
        Self {
            j: 1.0,
            g_22: 1.0,
            g23: 0.0,
            dx: 1.0,
            dy: 1.0,
            dz: 1.0,
        }
    }
}

/// Per-cell geometric factors.
#[derive(Clone, Debug)]
pub struct Coordinates {
    /// Jacobian
    pub j: Field2D,
    /// Covariant g_22 (parallel length element squared)
    pub g_22: Field2D,
    /// Contravariant g^23, couples radial gradients to poloidal drifts
    pub g23: Field2D,
    /// Radial spacing
    pub dx: Field2D,
    /// Parallel spacing
    pub dy: Field2D,
    /// Binormal spacing
    pub dz: Field2D,
}

impl Coordinates {
    /// Orthogonal unit-Jacobian geometry with uniform spacing.
    pub fn uniform(nx: usize, ny: usize, dx: f64, dy: f64, dz: f64) -> Self {
        Self::from_fn(nx, ny, |_, _| CellMetric {
            dx,
            dy,
            dz,
            ..CellMetric::default()
        })
    }

    /// Build geometry by evaluating `metric(x, y)` at every cell, guards included.
    pub fn from_fn<F>(nx: usize, ny: usize, metric: F) -> Self
    where
        F: Fn(usize, usize) -> CellMetric,
    {
        let cells: Vec<CellMetric> = (0..nx)
            .flat_map(|x| (0..ny).map(move |y| (x, y)))
            .map(|(x, y)| metric(x, y))
            .collect();

        let pick = |get: fn(&CellMetric) -> f64| {
            Field2D::from_vec(nx, ny, cells.iter().map(get).collect())
        };

        Self {
            j: pick(|c| c.j),
            g_22: pick(|c| c.g_22),
            g23: pick(|c| c.g23),
            dx: pick(|c| c.dx),
            dy: pick(|c| c.dy),
            dz: pick(|c| c.dz),
        }
    }

    /// (nx, ny) shape of the geometry arrays.
    pub fn shape(&self) -> (usize, usize) {
        self.j.shape()
    }

    /// Cell volume factor J·dy used to weight parallel divergences.
    #[inline]
    pub fn parallel_volume(&self, x: usize, y: usize) -> f64 {
        self.j[(x, y)] * self.dy[(x, y)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_coordinates() {
        let c = Coordinates::uniform(3, 4, 0.1, 0.2, 0.3);
        assert_eq!(c.shape(), (3, 4));
        assert!((c.j[(1, 2)] - 1.0).abs() < 1e-14);
        assert!((c.dy[(2, 3)] - 0.2).abs() < 1e-14);
        assert!(c.g23[(0, 0)].abs() < 1e-14);
    }

    #[test]
    fn test_from_fn_ordering() {
        let c = Coordinates::from_fn(2, 3, |x, y| CellMetric {
            j: (10 * x + y) as f64,
            ..CellMetric::default()
        });
        assert!((c.j[(1, 2)] - 12.0).abs() < 1e-14);
        assert!((c.parallel_volume(1, 1) - 11.0).abs() < 1e-14);
    }
}
