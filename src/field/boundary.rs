//! Guard-cell boundary conditions at physical domain edges.
//!
//! Applied after [`Mesh::communicate`](crate::mesh::Mesh) so that every guard
//! cell read by a stencil holds a defined value:
//! - y guards of non-periodic lines at the lower/upper domain edge
//! - x guards of the first/last x partition

use serde::Deserialize;

use super::Field3D;

/// Boundary condition used to fill guard cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BoundaryCondition {
    /// Zero gradient: guards copy the adjacent interior value.
    #[default]
    Neumann,
    /// Fixed value on the cell face between interior and guard.
    Dirichlet(f64),
}

impl BoundaryCondition {
    /// Guard value given the adjacent interior value.
    #[inline]
    fn guard_value(&self, interior: f64) -> f64 {
        match *self {
            BoundaryCondition::Neumann => interior,
            BoundaryCondition::Dirichlet(face) => 2.0 * face - interior,
        }
    }

    /// Fill guard cells at physical edges of `f`.
    pub fn apply(&self, f: &mut Field3D) {
        let mesh = f.mesh().clone();
        let nz = mesh.nz;

        // Parallel boundaries
        for x in 0..mesh.nx {
            let line = mesh.line(x);
            if line.periodic_y {
                continue;
            }
            for z in 0..nz {
                if line.first_y {
                    let v = self.guard_value(f[(x, mesh.ystart, z)]);
                    for y in 0..mesh.ystart {
                        f[(x, y, z)] = v;
                    }
                }
                if line.last_y {
                    let v = self.guard_value(f[(x, mesh.yend, z)]);
                    for y in mesh.yend + 1..mesh.ny {
                        f[(x, y, z)] = v;
                    }
                }
            }
        }

        // Radial boundaries
        for y in 0..mesh.ny {
            for z in 0..nz {
                if mesh.first_x() {
                    let v = self.guard_value(f[(mesh.xstart, y, z)]);
                    for x in 0..mesh.xstart {
                        f[(x, y, z)] = v;
                    }
                }
                if mesh.last_x() {
                    let v = self.guard_value(f[(mesh.xend, y, z)]);
                    for x in mesh.xend + 1..mesh.nx {
                        f[(x, y, z)] = v;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshBuilder;

    #[test]
    fn test_neumann_copies_edge() {
        let mesh = MeshBuilder::new(2, 3, 1).build();
        let mut f = Field3D::from_fn(&mesh, |x, y, _| (10 * x + y) as f64);
        BoundaryCondition::Neumann.apply(&mut f);
        assert_eq!(f[(2, 0, 0)], 22.0);
        assert_eq!(f[(2, 6, 0)], 24.0);
        assert_eq!(f[(0, 3, 0)], 23.0);
        assert_eq!(f[(5, 3, 0)], 33.0);
    }

    #[test]
    fn test_dirichlet_face_value() {
        let mesh = MeshBuilder::new(1, 2, 1).build();
        let mut f = Field3D::filled(&mesh, 3.0);
        BoundaryCondition::Dirichlet(1.0).apply(&mut f);
        // Face average between interior and first guard equals the set value
        let face = 0.5 * (f[(2, 1, 0)] + f[(2, 2, 0)]);
        assert!((face - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_periodic_lines_skipped() {
        let mesh = MeshBuilder::new(1, 2, 1).periodic_y().build();
        let mut f = Field3D::from_fn(&mesh, |_, y, _| y as f64);
        BoundaryCondition::Neumann.apply(&mut f);
        assert_eq!(f[(2, 0, 0)], 0.0);
    }

    #[test]
    fn test_deserialize() {
        let bc: BoundaryCondition =
            serde_json::from_str(r#"{"type": "dirichlet", "value": 0.5}"#).unwrap();
        assert_eq!(bc, BoundaryCondition::Dirichlet(0.5));
        let bc: BoundaryCondition = serde_json::from_str(r#"{"type": "neumann"}"#).unwrap();
        assert_eq!(bc, BoundaryCondition::Neumann);
    }
}
