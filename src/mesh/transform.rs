//! Parallel transforms between standard and field-aligned y direction.
//!
//! Parallel differencing needs neighbouring y cells to lie on the same field
//! line. On a field-aligned grid this holds already ([`StandardTransform::Identity`]).
//! With a shifted metric each (x, y) z-line is rotated toroidally by an angle
//! `zShift(x, y)`; the rotation is applied spectrally in z.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::coordinates::Coordinates;
use crate::field::{Field2D, Field3D, YDirection};

/// Transform selected by the mesh.
#[derive(Clone, Debug)]
pub enum StandardTransform {
    /// Grid is already field-aligned; only the direction tag changes.
    Identity,
    /// Toroidal shift by zShift(x, y).
    Shifted(ShiftedMetric),
}

impl StandardTransform {
    /// Name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            StandardTransform::Identity => "identity",
            StandardTransform::Shifted(_) => "shifted-metric",
        }
    }

    /// Map a field from standard to field-aligned y direction.
    ///
    /// # Panics
    /// If the field is already field-aligned.
    pub fn to_field_aligned(&self, f: &Field3D) -> Field3D {
        assert_eq!(
            f.direction(),
            YDirection::Standard,
            "to_field_aligned called on an aligned field"
        );
        let mut out = f.clone();
        if let StandardTransform::Shifted(shift) = self {
            shift.shift_all(&mut out, -1.0);
        }
        out.set_direction(YDirection::Aligned);
        out
    }

    /// Map a field from field-aligned back to standard y direction.
    ///
    /// # Panics
    /// If the field is not field-aligned.
    pub fn from_field_aligned(&self, f: &Field3D) -> Field3D {
        assert_eq!(
            f.direction(),
            YDirection::Aligned,
            "from_field_aligned called on a standard field"
        );
        let mut out = f.clone();
        if let StandardTransform::Shifted(shift) = self {
            shift.shift_all(&mut out, 1.0);
        }
        out.set_direction(YDirection::Standard);
        out
    }
}

/// Shifted-metric transform using FFTs in z.
#[derive(Clone)]
pub struct ShiftedMetric {
    zshift: Field2D,
    zlength: Field2D,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for ShiftedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShiftedMetric")
            .field("shape", &self.zshift.shape())
            .field("nz", &self.forward.len())
            .finish()
    }
}

impl ShiftedMetric {
    /// Create the transform for a mesh with `nz` binormal points.
    pub fn new(zshift: Field2D, coordinates: &Coordinates, nz: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let zlength = coordinates.dz.map(|dz| dz * nz as f64);
        Self {
            zshift,
            zlength,
            forward: planner.plan_fft_forward(nz),
            inverse: planner.plan_fft_inverse(nz),
        }
    }

    /// Toroidal shift angle at (x, y).
    pub fn zshift(&self, x: usize, y: usize) -> f64 {
        self.zshift[(x, y)]
    }

    fn shift_all(&self, f: &mut Field3D, sign: f64) {
        let mesh = f.mesh().clone();
        let nz = mesh.nz;
        let mut buffer = vec![Complex::new(0.0, 0.0); nz];
        for x in 0..mesh.nx {
            for y in 0..mesh.ny {
                let start = mesh.index3d(x, y, 0);
                let line = &mut f.data_mut()[start..start + nz];
                self.shift_line(
                    line,
                    &mut buffer,
                    sign * self.zshift[(x, y)],
                    self.zlength[(x, y)],
                );
            }
        }
    }

    /// Rotate one z-line: out(z) = in(z - angle).
    fn shift_line(&self, line: &mut [f64], buffer: &mut [Complex<f64>], angle: f64, zlength: f64) {
        let nz = line.len();
        if nz < 2 || angle == 0.0 {
            return;
        }
        for (b, &v) in buffer.iter_mut().zip(line.iter()) {
            *b = Complex::new(v, 0.0);
        }
        self.forward.process(buffer);

        for (m, coeff) in buffer.iter_mut().enumerate() {
            if 2 * m == nz {
                // Nyquist mode has no direction; leave it unshifted so the
                // transform stays real and invertible
                continue;
            }
            // Signed mode number
            let mode = if m < nz / 2 + 1 {
                m as f64
            } else {
                m as f64 - nz as f64
            };
            let kwave = 2.0 * PI * mode / zlength;
            *coeff *= Complex::from_polar(1.0, -kwave * angle);
        }

        self.inverse.process(buffer);
        let norm = 1.0 / nz as f64;
        for (v, b) in line.iter_mut().zip(buffer.iter()) {
            *v = b.re * norm;
        }
    }
}
