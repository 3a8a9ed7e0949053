//! Axisymmetric (x, y) field used for geometry.

use std::ops::{Index, IndexMut};

/// Dense 2D array over (x, y), guard cells included.
#[derive(Clone, Debug, PartialEq)]
pub struct Field2D {
    nx: usize,
    ny: usize,
    data: Vec<f64>,
}

impl Field2D {
    /// Field filled with a constant.
    pub fn filled(nx: usize, ny: usize, value: f64) -> Self {
        Self {
            nx,
            ny,
            data: vec![value; nx * ny],
        }
    }

    /// Field from a function of (x, y).
    pub fn from_fn<F: Fn(usize, usize) -> f64>(nx: usize, ny: usize, f: F) -> Self {
        let data = (0..nx)
            .flat_map(|x| (0..ny).map(move |y| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self { nx, ny, data }
    }

    /// Field from x-major data.
    ///
    /// # Panics
    /// If `data.len() != nx * ny`.
    pub fn from_vec(nx: usize, ny: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), nx * ny, "Field2D data length mismatch");
        Self { nx, ny, data }
    }

    /// (nx, ny)
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Raw data, x-major.
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Apply `f` to every value.
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            nx: self.nx,
            ny: self.ny,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }
}

impl Index<(usize, usize)> for Field2D {
    type Output = f64;
    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &f64 {
        &self.data[x * self.ny + y]
    }
}

impl IndexMut<(usize, usize)> for Field2D {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut f64 {
        &mut self.data[x * self.ny + y]
    }
}
