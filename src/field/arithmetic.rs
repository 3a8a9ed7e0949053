//! Element-wise arithmetic on fields.
//!
//! - `Field3D op Field3D` for compatible fields (panics otherwise)
//! - `Field3D op f64` and `f64 op Field3D`
//! - `Field3D * Field2D` and `Field3D / Field2D`, broadcasting over z
//!
//! Owned and borrowed operands are both accepted; owned left operands are
//! updated in place.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use super::{Field2D, Field3D};

macro_rules! field_binop {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:tt) => {
        impl $assign_trait<&Field3D> for Field3D {
            fn $assign_method(&mut self, rhs: &Field3D) {
                self.assert_compatible(rhs, stringify!($method));
                for (a, &b) in self.data_mut().iter_mut().zip(rhs.data()) {
                    *a = *a $op b;
                }
            }
        }

        impl $assign_trait<Field3D> for Field3D {
            fn $assign_method(&mut self, rhs: Field3D) {
                <Self as $assign_trait<&Field3D>>::$assign_method(self, &rhs);
            }
        }

        impl $assign_trait<f64> for Field3D {
            fn $assign_method(&mut self, rhs: f64) {
                for a in self.data_mut() {
                    *a = *a $op rhs;
                }
            }
        }

        impl $trait<&Field3D> for &Field3D {
            type Output = Field3D;
            fn $method(self, rhs: &Field3D) -> Field3D {
                let mut out = self.clone();
                <Field3D as $assign_trait<&Field3D>>::$assign_method(&mut out, rhs);
                out
            }
        }

        impl $trait<Field3D> for &Field3D {
            type Output = Field3D;
            fn $method(self, rhs: Field3D) -> Field3D {
                self $op &rhs
            }
        }

        impl $trait<&Field3D> for Field3D {
            type Output = Field3D;
            fn $method(mut self, rhs: &Field3D) -> Field3D {
                <Field3D as $assign_trait<&Field3D>>::$assign_method(&mut self, rhs);
                self
            }
        }

        impl $trait<Field3D> for Field3D {
            type Output = Field3D;
            fn $method(self, rhs: Field3D) -> Field3D {
                self $op &rhs
            }
        }

        impl $trait<f64> for &Field3D {
            type Output = Field3D;
            fn $method(self, rhs: f64) -> Field3D {
                self.map(|a| a $op rhs)
            }
        }

        impl $trait<f64> for Field3D {
            type Output = Field3D;
            fn $method(mut self, rhs: f64) -> Field3D {
                <Field3D as $assign_trait<f64>>::$assign_method(&mut self, rhs);
                self
            }
        }

        impl $trait<&Field3D> for f64 {
            type Output = Field3D;
            fn $method(self, rhs: &Field3D) -> Field3D {
                rhs.map(|b| self $op b)
            }
        }

        impl $trait<Field3D> for f64 {
            type Output = Field3D;
            fn $method(self, rhs: Field3D) -> Field3D {
                self $op &rhs
            }
        }
    };
}

field_binop!(Add, add, AddAssign, add_assign, +);
field_binop!(Sub, sub, SubAssign, sub_assign, -);
field_binop!(Mul, mul, MulAssign, mul_assign, *);
field_binop!(Div, div, DivAssign, div_assign, /);

impl Neg for &Field3D {
    type Output = Field3D;
    fn neg(self) -> Field3D {
        self.map(|a| -a)
    }
}

impl Neg for Field3D {
    type Output = Field3D;
    fn neg(mut self) -> Field3D {
        for a in self.data_mut() {
            *a = -*a;
        }
        self
    }
}

// =============================================================================
// Axisymmetric broadcasting
// =============================================================================

impl Field3D {
    fn broadcast_2d<F: Fn(f64, f64) -> f64>(&mut self, rhs: &Field2D, f: F) {
        let mesh = self.mesh().clone();
        assert_eq!(
            rhs.shape(),
            (mesh.nx, mesh.ny),
            "Field2D shape does not match mesh"
        );
        let nz = mesh.nz;
        for x in 0..mesh.nx {
            for y in 0..mesh.ny {
                let g = rhs[(x, y)];
                let start = mesh.index3d(x, y, 0);
                for v in &mut self.data_mut()[start..start + nz] {
                    *v = f(*v, g);
                }
            }
        }
    }
}

impl Mul<&Field2D> for &Field3D {
    type Output = Field3D;
    fn mul(self, rhs: &Field2D) -> Field3D {
        let mut out = self.clone();
        out.broadcast_2d(rhs, |a, g| a * g);
        out
    }
}

impl Mul<&Field2D> for Field3D {
    type Output = Field3D;
    fn mul(mut self, rhs: &Field2D) -> Field3D {
        self.broadcast_2d(rhs, |a, g| a * g);
        self
    }
}

impl Div<&Field2D> for &Field3D {
    type Output = Field3D;
    fn div(self, rhs: &Field2D) -> Field3D {
        let mut out = self.clone();
        out.broadcast_2d(rhs, |a, g| a / g);
        out
    }
}

impl Div<&Field2D> for Field3D {
    type Output = Field3D;
    fn div(mut self, rhs: &Field2D) -> Field3D {
        self.broadcast_2d(rhs, |a, g| a / g);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshBuilder;

    const TOL: f64 = 1e-14;

    #[test]
    fn test_field_field_ops() {
        let mesh = MeshBuilder::new(1, 1, 2).build();
        let a = Field3D::filled(&mesh, 6.0);
        let b = Field3D::filled(&mesh, 2.0);

        let sum = &a + &b;
        let quot = &a / &b;
        let expr = (&a - &b) * 0.5 + 1.0;
        assert!(sum.data().iter().all(|&v| (v - 8.0).abs() < TOL));
        assert!(quot.data().iter().all(|&v| (v - 3.0).abs() < TOL));
        assert!(expr.data().iter().all(|&v| (v - 3.0).abs() < TOL));
    }

    #[test]
    fn test_scalar_left_and_neg() {
        let mesh = MeshBuilder::new(1, 1, 1).build();
        let a = Field3D::filled(&mesh, 4.0);
        let r = 1.0 / &a;
        let n = -(2.0 - a);
        assert!(r.data().iter().all(|&v| (v - 0.25).abs() < TOL));
        assert!(n.data().iter().all(|&v| (v - 2.0).abs() < TOL));
    }

    #[test]
    fn test_assign_ops() {
        let mesh = MeshBuilder::new(1, 1, 1).build();
        let mut a = Field3D::filled(&mesh, 1.0);
        a += &Field3D::filled(&mesh, 2.0);
        a *= 3.0;
        a -= Field3D::filled(&mesh, 1.0);
        assert!(a.data().iter().all(|&v| (v - 8.0).abs() < TOL));
    }

    #[test]
    fn test_broadcast_2d() {
        let mesh = MeshBuilder::new(1, 1, 3).build();
        let f = Field3D::filled(&mesh, 2.0);
        let g = Field2D::from_fn(mesh.nx, mesh.ny, |x, y| (x + y) as f64);
        let out = &f * &g;
        for z in 0..3 {
            assert!((out[(2, 1, z)] - 6.0).abs() < TOL);
        }
    }

    #[test]
    #[should_panic(expected = "incompatible fields")]
    fn test_mismatched_mesh_panics() {
        let a = Field3D::new(&MeshBuilder::new(1, 1, 1).build());
        let b = Field3D::new(&MeshBuilder::new(1, 1, 1).build());
        let _ = &a + &b;
    }
}
