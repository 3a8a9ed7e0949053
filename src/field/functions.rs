//! Pointwise functions of fields.

use super::{Field3D, Region};

/// Lower bound: `max(value, min)`.
#[inline]
pub fn floor_value(value: f64, min: f64) -> f64 {
    if value < min { min } else { value }
}

/// Restrict `value` to `[lo, hi]`.
///
/// Values already in range are returned unchanged, and the map is monotone.
#[inline]
pub fn clamp_value(value: f64, lo: f64, hi: f64) -> f64 {
    if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

/// Pointwise lower bound of a field.
pub fn floor(f: &Field3D, min: f64) -> Field3D {
    f.map(|v| floor_value(v, min))
}

/// Pointwise restriction of a field to `[lo, hi]`.
pub fn clamp(f: &Field3D, lo: f64, hi: f64) -> Field3D {
    f.map(|v| clamp_value(v, lo, hi))
}

impl Field3D {
    /// Pointwise square root.
    pub fn sqrt(&self) -> Field3D {
        self.map(f64::sqrt)
    }

    /// Pointwise exponential.
    pub fn exp(&self) -> Field3D {
        self.map(f64::exp)
    }

    /// Pointwise natural logarithm.
    pub fn ln(&self) -> Field3D {
        self.map(f64::ln)
    }
}

/// Average a function of two fields over each cell in y.
///
/// Uses Simpson's rule with the cell centre and the two y faces, where face
/// values are the mean of the neighbouring centres:
/// `(4 f(c) + f(½(c + m)) + f(½(c + p))) / 6`.
/// Cells outside `region` are zero. `region` must not include y guard cells.
pub fn cell_average<F>(f: F, a: &Field3D, b: &Field3D, region: Region) -> Field3D
where
    F: Fn(f64, f64) -> f64,
{
    a.assert_compatible(b, "cell_average");
    let mut out = Field3D::zero_from(a);
    let mesh = a.mesh().clone();
    for (x, y, z) in region.indices(&mesh) {
        let centre = f(a[(x, y, z)], b[(x, y, z)]);
        let lower = f(
            0.5 * (a[(x, y, z)] + a[(x, y - 1, z)]),
            0.5 * (b[(x, y, z)] + b[(x, y - 1, z)]),
        );
        let upper = f(
            0.5 * (a[(x, y, z)] + a[(x, y + 1, z)]),
            0.5 * (b[(x, y, z)] + b[(x, y + 1, z)]),
        );
        out[(x, y, z)] = (4.0 * centre + lower + upper) / 6.0;
    }
    out
}
