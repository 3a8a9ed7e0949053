//! Structured field-aligned mesh with guard cells.
//!
//! Index convention follows the usual flux-coordinate layout:
//! - `x`: radial (flux surface label), `mxg` guard cells on each side
//! - `y`: parallel (along the magnetic field), `myg` guard cells on each side
//! - `z`: binormal/toroidal, periodic, no guard cells
//!
//! A mesh describes one partition of a possibly larger domain. Each x-line
//! carries flags saying whether its first/last interior y cell is adjacent to
//! the global domain edge, and whether the line is periodic in y.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use super::coordinates::Coordinates;
use super::transform::{ShiftedMetric, StandardTransform};
use crate::field::Field2D;

/// Topology of one x-line in the parallel (y) direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineTopology {
    /// The first interior y cell is at the lower domain edge.
    pub first_y: bool,
    /// The last interior y cell is at the upper domain edge.
    pub last_y: bool,
    /// The line closes on itself in y.
    pub periodic_y: bool,
}

/// Structured 3D mesh with per-line boundary flags and geometry.
pub struct Mesh {
    /// Total number of x points, including guard cells
    pub nx: usize,
    /// Total number of y points, including guard cells
    pub ny: usize,
    /// Number of z points (periodic)
    pub nz: usize,
    /// First interior x index
    pub xstart: usize,
    /// Last interior x index
    pub xend: usize,
    /// First interior y index
    pub ystart: usize,
    /// Last interior y index
    pub yend: usize,
    first_x: bool,
    last_x: bool,
    lines: Vec<LineTopology>,
    coordinates: Coordinates,
    transform: StandardTransform,
}

impl fmt::Debug for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("nx", &self.nx)
            .field("ny", &self.ny)
            .field("nz", &self.nz)
            .field("first_x", &self.first_x)
            .field("last_x", &self.last_x)
            .field("transform", &self.transform.name())
            .finish()
    }
}

impl Mesh {
    /// Number of x guard cells on each side.
    #[inline]
    pub fn mxg(&self) -> usize {
        self.xstart
    }

    /// Number of y guard cells on each side.
    #[inline]
    pub fn myg(&self) -> usize {
        self.ystart
    }

    /// Total number of points in a 3D field on this mesh.
    #[inline]
    pub fn len3d(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Flat index of (x, y, z) in a 3D field.
    #[inline]
    pub fn index3d(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.ny + y) * self.nz + z
    }

    /// Whether this partition contains the inner x boundary.
    #[inline]
    pub fn first_x(&self) -> bool {
        self.first_x
    }

    /// Whether this partition contains the outer x boundary.
    #[inline]
    pub fn last_x(&self) -> bool {
        self.last_x
    }

    /// Topology flags of x-line `x`.
    #[inline]
    pub fn line(&self, x: usize) -> LineTopology {
        self.lines[x]
    }

    /// Whether the lower y edge of line `x` lies in this partition.
    #[inline]
    pub fn first_y(&self, x: usize) -> bool {
        self.lines[x].first_y
    }

    /// Whether the upper y edge of line `x` lies in this partition.
    #[inline]
    pub fn last_y(&self, x: usize) -> bool {
        self.lines[x].last_y
    }

    /// Whether line `x` is periodic in y.
    #[inline]
    pub fn periodic_y(&self, x: usize) -> bool {
        self.lines[x].periodic_y
    }

    /// Interior x indices.
    #[inline]
    pub fn x_interior(&self) -> RangeInclusive<usize> {
        self.xstart..=self.xend
    }

    /// Interior y indices.
    #[inline]
    pub fn y_interior(&self) -> RangeInclusive<usize> {
        self.ystart..=self.yend
    }

    /// Geometric factors.
    #[inline]
    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    /// Transform between standard and field-aligned y direction.
    #[inline]
    pub fn transform(&self) -> &StandardTransform {
        &self.transform
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`Mesh`].
///
/// # Example
/// ```
/// use plasma_fv::mesh::MeshBuilder;
///
/// // 4 radial surfaces, 16 parallel cells, 8 binormal points,
/// // closed field lines inside x index 3 (separatrix)
/// let mesh = MeshBuilder::new(4, 16, 8)
///     .with_separatrix(3)
///     .with_spacing(0.1, 0.5, 0.25)
///     .build();
///
/// assert!(mesh.periodic_y(2));
/// assert!(!mesh.periodic_y(4));
/// ```
#[derive(Clone, Debug)]
pub struct MeshBuilder {
    nx_interior: usize,
    ny_interior: usize,
    nz: usize,
    mxg: usize,
    myg: usize,
    first_x: bool,
    last_x: bool,
    first_y: bool,
    last_y: bool,
    periodic_below: usize,
    dx: f64,
    dy: f64,
    dz: f64,
    coordinates: Option<Coordinates>,
    zshift: Option<Field2D>,
}

impl MeshBuilder {
    /// Start a mesh with the given number of interior points.
    ///
    /// Defaults: two guard cells in x and y, a single partition owning both
    /// y edges, no periodic lines, unit spacings.
    pub fn new(nx_interior: usize, ny_interior: usize, nz: usize) -> Self {
        Self {
            nx_interior,
            ny_interior,
            nz,
            mxg: 2,
            myg: 2,
            first_x: true,
            last_x: true,
            first_y: true,
            last_y: true,
            periodic_below: 0,
            dx: 1.0,
            dy: 1.0,
            dz: 1.0,
            coordinates: None,
            zshift: None,
        }
    }

    /// Set the number of guard cells in x and y.
    pub fn with_guards(mut self, mxg: usize, myg: usize) -> Self {
        self.mxg = mxg;
        self.myg = myg;
        self
    }

    /// Make every x-line periodic in y.
    pub fn periodic_y(mut self) -> Self {
        self.periodic_below = usize::MAX;
        self
    }

    /// Lines with total x index below `ixseps` are periodic (closed field lines).
    pub fn with_separatrix(mut self, ixseps: usize) -> Self {
        self.periodic_below = ixseps;
        self
    }

    /// Describe this mesh as one y-partition of a larger domain.
    ///
    /// `first_y` / `last_y` say whether the partition touches the lower /
    /// upper y edge of the global domain.
    pub fn with_y_partition(mut self, first_y: bool, last_y: bool) -> Self {
        self.first_y = first_y;
        self.last_y = last_y;
        self
    }

    /// Describe this mesh as one x-partition of a larger domain.
    pub fn with_x_partition(mut self, first_x: bool, last_x: bool) -> Self {
        self.first_x = first_x;
        self.last_x = last_x;
        self
    }

    /// Uniform grid spacings.
    pub fn with_spacing(mut self, dx: f64, dy: f64, dz: f64) -> Self {
        self.dx = dx;
        self.dy = dy;
        self.dz = dz;
        self
    }

    /// Use explicit geometric factors. Overrides [`with_spacing`](Self::with_spacing).
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Use a shifted-metric parallel transform with the given toroidal shift angle.
    pub fn with_zshift(mut self, zshift: Field2D) -> Self {
        self.zshift = Some(zshift);
        self
    }

    /// Build the mesh.
    ///
    /// # Panics
    /// If the interior is empty or geometry arrays do not match the mesh size.
    pub fn build(self) -> Arc<Mesh> {
        assert!(
            self.nx_interior > 0 && self.ny_interior > 0 && self.nz > 0,
            "Mesh needs at least one interior point in every direction"
        );

        let nx = self.nx_interior + 2 * self.mxg;
        let ny = self.ny_interior + 2 * self.myg;

        let coordinates = self
            .coordinates
            .unwrap_or_else(|| Coordinates::uniform(nx, ny, self.dx, self.dy, self.dz));
        assert_eq!(
            coordinates.shape(),
            (nx, ny),
            "Coordinates shape does not match mesh"
        );

        let lines = (0..nx)
            .map(|x| {
                let periodic_y = x < self.periodic_below;
                LineTopology {
                    first_y: self.first_y,
                    last_y: self.last_y,
                    periodic_y,
                }
            })
            .collect();

        let transform = match self.zshift {
            Some(zshift) => {
                assert_eq!(zshift.shape(), (nx, ny), "zShift shape does not match mesh");
                StandardTransform::Shifted(ShiftedMetric::new(zshift, &coordinates, self.nz))
            }
            None => StandardTransform::Identity,
        };

        Arc::new(Mesh {
            nx,
            ny,
            nz: self.nz,
            xstart: self.mxg,
            xend: self.mxg + self.nx_interior - 1,
            ystart: self.myg,
            yend: self.myg + self.ny_interior - 1,
            first_x: self.first_x,
            last_x: self.last_x,
            lines,
            coordinates,
            transform,
        })
    }
}
