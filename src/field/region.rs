//! Named index regions of a mesh.

use crate::mesh::Mesh;

/// Subset of mesh cells to iterate over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    /// Every cell, guards included
    All,
    /// Interior cells only
    NoBoundary,
    /// Interior in x, all y
    NoX,
    /// Interior in y, all x
    NoY,
}

impl Region {
    /// Iterate (x, y, z) over the region, x outermost.
    pub fn indices(self, mesh: &Mesh) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let (xs, xe, ys, ye) = match self {
            Region::All => (0, mesh.nx - 1, 0, mesh.ny - 1),
            Region::NoBoundary => (mesh.xstart, mesh.xend, mesh.ystart, mesh.yend),
            Region::NoX => (mesh.xstart, mesh.xend, 0, mesh.ny - 1),
            Region::NoY => (0, mesh.nx - 1, mesh.ystart, mesh.yend),
        };
        let nz = mesh.nz;
        (xs..=xe).flat_map(move |x| (ys..=ye).flat_map(move |y| (0..nz).map(move |z| (x, y, z))))
    }

    /// Number of cells in the region.
    pub fn count(self, mesh: &Mesh) -> usize {
        self.indices(mesh).count()
    }
}
