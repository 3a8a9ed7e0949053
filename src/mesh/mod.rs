//! Mesh representation.
//!
//! - [`Mesh`], [`MeshBuilder`]: structured x-y-z mesh with guard cells and
//!   per-line boundary/periodicity flags
//! - [`Coordinates`]: Jacobian, metric and spacings
//! - [`StandardTransform`]: standard <-> field-aligned y direction
//! - `Mesh::communicate`: serial guard-cell exchange

mod communicate;
mod coordinates;
mod structured;
mod transform;

pub use coordinates::{CellMetric, Coordinates};
pub use structured::{LineTopology, Mesh, MeshBuilder};
pub use transform::{ShiftedMetric, StandardTransform};
