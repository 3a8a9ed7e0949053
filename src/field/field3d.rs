//! Scalar field on a 3D structured mesh.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

use super::region::Region;
use crate::error::{Error, Result};
use crate::mesh::Mesh;

/// Which y direction a field's y index follows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum YDirection {
    /// Natural mesh y direction
    #[default]
    Standard,
    /// Neighbouring y cells lie on the same magnetic field line
    Aligned,
}

/// Dense scalar field over (x, y, z) including guard cells.
///
/// Fields are compatible when they share the same mesh (by identity) and
/// the same [`YDirection`]. Operations combining incompatible fields panic.
#[derive(Clone)]
pub struct Field3D {
    mesh: Arc<Mesh>,
    direction: YDirection,
    data: Vec<f64>,
}

impl fmt::Debug for Field3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field3D")
            .field("shape", &(self.mesh.nx, self.mesh.ny, self.mesh.nz))
            .field("direction", &self.direction)
            .finish()
    }
}

impl Field3D {
    /// Zero field on `mesh`.
    pub fn new(mesh: &Arc<Mesh>) -> Self {
        Self::filled(mesh, 0.0)
    }

    /// Constant field on `mesh`.
    pub fn filled(mesh: &Arc<Mesh>, value: f64) -> Self {
        Self {
            mesh: Arc::clone(mesh),
            direction: YDirection::Standard,
            data: vec![value; mesh.len3d()],
        }
    }

    /// Field from a function of (x, y, z), guard cells included.
    pub fn from_fn<F: Fn(usize, usize, usize) -> f64>(mesh: &Arc<Mesh>, f: F) -> Self {
        let mut data = Vec::with_capacity(mesh.len3d());
        for x in 0..mesh.nx {
            for y in 0..mesh.ny {
                for z in 0..mesh.nz {
                    data.push(f(x, y, z));
                }
            }
        }
        Self {
            mesh: Arc::clone(mesh),
            direction: YDirection::Standard,
            data,
        }
    }

    /// Zero field with the same mesh and direction as `other`.
    pub fn zero_from(other: &Field3D) -> Self {
        Self {
            mesh: Arc::clone(&other.mesh),
            direction: other.direction,
            data: vec![0.0; other.data.len()],
        }
    }

    /// The mesh this field lives on.
    #[inline]
    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    /// Current y direction.
    #[inline]
    pub fn direction(&self) -> YDirection {
        self.direction
    }

    pub(crate) fn set_direction(&mut self, direction: YDirection) {
        self.direction = direction;
    }

    /// Raw data in (x, y, z) row-major order.
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable raw data in (x, y, z) row-major order.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Whether `other` can be combined with this field.
    #[inline]
    pub fn is_compatible(&self, other: &Field3D) -> bool {
        Arc::ptr_eq(&self.mesh, &other.mesh) && self.direction == other.direction
    }

    /// Assert compatibility, naming the operation on failure.
    #[inline]
    pub(crate) fn assert_compatible(&self, other: &Field3D, operation: &str) {
        assert!(
            self.is_compatible(other),
            "{}: incompatible fields (different mesh or y direction)",
            operation
        );
    }

    /// Apply `f` to every value.
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            mesh: Arc::clone(&self.mesh),
            direction: self.direction,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combine two compatible fields pointwise.
    pub fn zip_map<F: Fn(f64, f64) -> f64>(&self, other: &Field3D, f: F) -> Self {
        self.assert_compatible(other, "zip_map");
        Self {
            mesh: Arc::clone(&self.mesh),
            direction: self.direction,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    /// Multiply in place: self <- c * self
    pub fn scale(&mut self, c: f64) {
        for v in &mut self.data {
            *v *= c;
        }
    }

    /// Add scaled field in place: self <- self + c * other
    pub fn axpy(&mut self, c: f64, other: &Field3D) {
        self.assert_compatible(other, "axpy");
        for (v, &o) in self.data.iter_mut().zip(&other.data) {
            *v += c * o;
        }
    }

    /// Set every value to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Copy of this field in field-aligned y direction.
    pub fn to_field_aligned(&self) -> Field3D {
        self.mesh.transform().to_field_aligned(self)
    }

    /// Copy of this field in standard y direction.
    pub fn from_field_aligned(&self) -> Field3D {
        self.mesh.transform().from_field_aligned(self)
    }

    /// Sum of values over a region.
    pub fn sum(&self, region: Region) -> f64 {
        region
            .indices(&self.mesh)
            .map(|(x, y, z)| self[(x, y, z)])
            .sum()
    }

    /// Largest absolute value over a region.
    pub fn max_abs(&self, region: Region) -> f64 {
        region
            .indices(&self.mesh)
            .map(|(x, y, z)| self[(x, y, z)].abs())
            .fold(0.0, f64::max)
    }

    /// Check that every value in `region` is finite.
    ///
    /// # Errors
    /// [`Error::NonFinite`] naming the first offending cell.
    pub fn check_finite(&self, name: &str, region: Region) -> Result<()> {
        match region
            .indices(&self.mesh)
            .find(|&(x, y, z)| !self[(x, y, z)].is_finite())
        {
            Some((x, y, z)) => Err(Error::NonFinite {
                name: name.to_string(),
                region,
                x,
                y,
                z,
            }),
            None => Ok(()),
        }
    }
}

impl Index<(usize, usize, usize)> for Field3D {
    type Output = f64;
    #[inline]
    fn index(&self, (x, y, z): (usize, usize, usize)) -> &f64 {
        &self.data[self.mesh.index3d(x, y, z)]
    }
}

impl IndexMut<(usize, usize, usize)> for Field3D {
    #[inline]
    fn index_mut(&mut self, (x, y, z): (usize, usize, usize)) -> &mut f64 {
        let i = self.mesh.index3d(x, y, z);
        &mut self.data[i]
    }
}
