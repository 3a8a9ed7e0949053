//! Time integration.
//!
//! - [`integrator`]: explicit schemes over any [`Integrable`] state
//! - [`Variables`]: the named set of evolving fields, and the [`Solver`]
//!   registration seam used by components
//! - [`Simulation`]: a component pipeline advanced in time

pub mod integrator;
mod simulation;
mod variables;

pub use integrator::{
    BoxedIntegratorInfo, ForwardEuler, Integrable, IntegratorInfo, SSPRK3, StandardIntegrator,
    TimeIntegrator, create_integrator_info,
};
pub use simulation::{Simulation, SolverConfig};
pub use variables::{Solver, Variables};
