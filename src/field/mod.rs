//! Fields on the structured mesh.
//!
//! - [`Field3D`]: dense (x, y, z) scalar field tagged with its mesh and
//!   y direction
//! - [`Field2D`]: axisymmetric (x, y) geometry data
//! - [`Region`]: named index subsets
//! - [`BoundaryCondition`]: guard-cell fill at physical edges
//! - pointwise helpers: [`floor`], [`clamp`], [`cell_average`]

mod arithmetic;
mod boundary;
mod field2d;
mod field3d;
mod functions;
mod region;

pub use boundary::BoundaryCondition;
pub use field2d::Field2D;
pub use field3d::{Field3D, YDirection};
pub use functions::{cell_average, clamp, clamp_value, floor, floor_value};
pub use region::Region;
