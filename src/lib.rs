//! # plasma-fv
//!
//! Finite-volume parallel transport for multi-species plasma fluid models on
//! field-aligned structured meshes.
//!
//! This crate provides:
//! - Fields on a guard-celled x-y-z mesh with a shifted-metric parallel transform
//! - Conservative parallel flux divergence with limiter reconstruction and
//!   wave-speed upwinding (`div_par`, `div_par_fvv`)
//! - Parallel and perpendicular diffusion, ExB advection, central differences
//! - Species density and parallel momentum evolution components
//! - Fixed-fraction impurity radiation
//! - A component pipeline over a typed shared state, JSON options, and
//!   explicit time integration (SSP-RK3)

pub mod component;
pub mod constants;
pub mod error;
pub mod field;
pub mod fv;
pub mod mesh;
pub mod operators;
pub mod options;
pub mod output;
pub mod species;
pub mod state;
pub mod time;

pub use component::{Access, Component, ComponentRegistry, Pipeline};
pub use error::{Error, Result};
pub use field::{BoundaryCondition, Field2D, Field3D, Region, YDirection};
pub use fv::{BoundaryFluxMode, CellEdges, MC, StandardCellEdges, div_par, div_par_fvv};
pub use mesh::{Coordinates, Mesh, MeshBuilder};
pub use options::{ConfigError, Options, Units};
pub use output::Dump;
pub use species::{EvolveDensity, EvolveMomentum, FixedFractionRadiation};
pub use state::{Quantity, SimulationState, SpeciesState, StateKey};
pub use time::{Simulation, SolverConfig, StandardIntegrator, Variables};
