//! Physics components and their assembly into a right-hand-side pipeline.
//!
//! A component evolves or diagnoses part of the plasma. Each right-hand-side
//! evaluation runs in two phases over all components, in configuration order:
//!
//! 1. `transform`: read evolving variables, publish quantities into the shared
//!    [`SimulationState`]
//! 2. `finally`: read the completed state, write time derivatives
//!
//! Components declare the state keys they own through [`Access`]; the
//! [`Pipeline`] rejects two owners of the same key at construction.

mod pipeline;
mod registry;

pub use pipeline::Pipeline;
pub use registry::{ComponentConstructor, ComponentRegistry};

use crate::error::Result;
use crate::output::Dump;
use crate::state::{SimulationState, StateKey};
use crate::time::Variables;

/// State keys a component touches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Access {
    /// Keys read in `finally` (or `transform`)
    pub reads: Vec<StateKey>,
    /// Keys this component sets; at most one writer per key
    pub writes: Vec<StateKey>,
    /// Keys this component adds to; any number of contributors
    pub accumulates: Vec<StateKey>,
}

impl Access {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(mut self, key: StateKey) -> Self {
        self.reads.push(key);
        self
    }

    pub fn write(mut self, key: StateKey) -> Self {
        self.writes.push(key);
        self
    }

    pub fn accumulate(mut self, key: StateKey) -> Self {
        self.accumulates.push(key);
        self
    }
}

/// A physics component.
pub trait Component: Send {
    /// Instance name (usually the species name).
    fn name(&self) -> &str;

    /// State keys read and written.
    fn access(&self) -> Access;

    /// Publish quantities derived from the evolving variables.
    fn transform(&mut self, variables: &Variables, state: &mut SimulationState) -> Result<()>;

    /// Compute time derivatives from the completed state.
    ///
    /// `ddt` holds one entry per registered variable, zero on entry.
    fn finally(&mut self, _state: &SimulationState, _ddt: &mut Variables) -> Result<()> {
        Ok(())
    }

    /// Register diagnostic output.
    fn output_vars(&self, _dump: &mut Dump) {}

    /// Register quantities needed to restart that are not evolving variables.
    fn restart_vars(&self, _dump: &mut Dump) {}
}
