//! Per-line iteration range in the parallel direction.
//!
//! Fluxes are evaluated one cell into the y guard cells wherever the line
//! continues into another partition or wraps periodically. Both partitions
//! sharing an internal face then compute identical fluxes through it without
//! a flux exchange. Only a genuine non-periodic domain edge stops the range at
//! the interior cell; the face on the edge is then treated by the boundary
//! flux mode.

use std::ops::RangeInclusive;

use crate::mesh::Mesh;

/// Iteration range and true-edge flags of one x-line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineRange {
    /// x index of the line
    pub x: usize,
    /// First y index to evaluate
    pub ys: usize,
    /// Last y index to evaluate
    pub ye: usize,
    /// The lower face of `ystart` is a domain edge
    pub lower_edge: bool,
    /// The upper face of `yend` is a domain edge
    pub upper_edge: bool,
}

impl LineRange {
    /// Range for line `x` of `mesh`.
    ///
    /// # Panics
    /// If the mesh has fewer than two y guard cells; evaluating a guard cell
    /// reads one further cell beyond it.
    pub fn for_line(mesh: &Mesh, x: usize) -> Self {
        assert!(
            mesh.myg() >= 2,
            "parallel flux stencils need at least two y guard cells, mesh has {}",
            mesh.myg()
        );
        let line = mesh.line(x);
        let lower_edge = line.first_y && !line.periodic_y;
        let upper_edge = line.last_y && !line.periodic_y;
        Self {
            x,
            ys: if lower_edge { mesh.ystart } else { mesh.ystart - 1 },
            ye: if upper_edge { mesh.yend } else { mesh.yend + 1 },
            lower_edge,
            upper_edge,
        }
    }

    /// y indices to evaluate.
    #[inline]
    pub fn cells(&self) -> RangeInclusive<usize> {
        self.ys..=self.ye
    }

    /// Whether the upper face of cell `y` lies on the domain edge.
    #[inline]
    pub fn is_upper_edge(&self, mesh: &Mesh, y: usize) -> bool {
        self.upper_edge && y == mesh.yend
    }

    /// Whether the lower face of cell `y` lies on the domain edge.
    #[inline]
    pub fn is_lower_edge(&self, mesh: &Mesh, y: usize) -> bool {
        self.lower_edge && y == mesh.ystart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshBuilder;

    #[test]
    fn test_open_line_stops_at_interior() {
        let mesh = MeshBuilder::new(1, 4, 1).build();
        let r = LineRange::for_line(&mesh, 2);
        assert_eq!(r.cells(), 2..=5);
        assert!(r.is_upper_edge(&mesh, 5));
        assert!(r.is_lower_edge(&mesh, 2));
        assert!(!r.is_upper_edge(&mesh, 4));
    }

    #[test]
    fn test_periodic_line_includes_guards() {
        let mesh = MeshBuilder::new(1, 4, 1).periodic_y().build();
        let r = LineRange::for_line(&mesh, 2);
        assert_eq!(r.cells(), 1..=6);
        assert!(!r.is_upper_edge(&mesh, 5));
        assert!(!r.is_lower_edge(&mesh, 2));
    }

    #[test]
    fn test_internal_partition_edges() {
        // Middle partition: neither y edge is a domain edge
        let mesh = MeshBuilder::new(1, 4, 1)
            .with_y_partition(false, false)
            .build();
        let r = LineRange::for_line(&mesh, 2);
        assert_eq!(r.cells(), 1..=6);

        // Lower partition: only the lower edge is physical
        let mesh = MeshBuilder::new(1, 4, 1)
            .with_y_partition(true, false)
            .build();
        let r = LineRange::for_line(&mesh, 2);
        assert_eq!(r.cells(), 2..=6);
        assert!(r.lower_edge && !r.upper_edge);
    }

    #[test]
    fn test_separatrix_splits_lines() {
        let mesh = MeshBuilder::new(3, 4, 1).with_separatrix(3).build();
        assert_eq!(LineRange::for_line(&mesh, 2).cells(), 1..=6);
        assert_eq!(LineRange::for_line(&mesh, 3).cells(), 2..=5);
    }

    #[test]
    #[should_panic(expected = "two y guard cells")]
    fn test_single_guard_rejected() {
        let mesh = MeshBuilder::new(1, 4, 1).with_guards(1, 1).build();
        let _ = LineRange::for_line(&mesh, 1);
    }
}
