//! Ordered list of components evaluated as one right-hand side.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Component, ComponentRegistry};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::options::Options;
use crate::output::Dump;
use crate::state::{SimulationState, StateKey};
use crate::time::{Integrable, Solver, Variables};

/// Components in evaluation order.
pub struct Pipeline {
    components: Vec<Box<dyn Component>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.components.iter().map(|c| c.name()))
            .finish()
    }
}

impl Pipeline {
    /// Assemble a pipeline from already constructed components.
    ///
    /// # Errors
    /// [`Error::DuplicateWriter`] if two components write the same state key.
    pub fn new(components: Vec<Box<dyn Component>>) -> Result<Self> {
        let mut owners: BTreeMap<StateKey, String> = BTreeMap::new();
        for component in &components {
            for key in component.access().writes {
                if let Some(first) = owners.get(&key) {
                    return Err(Error::DuplicateWriter {
                        key,
                        first: first.clone(),
                        second: component.name().to_string(),
                    });
                }
                owners.insert(key, component.name().to_string());
            }
        }
        tracing::info!(
            components = components.len(),
            owned_keys = owners.len(),
            "Assembled component pipeline"
        );
        Ok(Self { components })
    }

    /// Create the components named in the `components` option, in order.
    ///
    /// # Errors
    /// Configuration and construction errors, and [`Error::DuplicateWriter`].
    pub fn from_options(
        options: &Options,
        mesh: &Arc<Mesh>,
        registry: &ComponentRegistry,
        solver: &mut dyn Solver,
    ) -> Result<Self> {
        let mut components = Vec::new();
        for name in options.component_names()? {
            components.extend(registry.create(&name, options, mesh, solver)?);
        }
        Self::new(components)
    }

    /// Component names in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|c| c.name())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Evaluate the time derivative of `variables` at `time`.
    ///
    /// `background` supplies quantities no component computes (potential,
    /// temperatures of unevolved species); it is copied into a fresh state
    /// before every evaluation.
    pub fn evaluate(
        &mut self,
        variables: &Variables,
        background: &SimulationState,
        time: f64,
    ) -> Result<Variables> {
        let mut state = background.clone();
        state.time = time;

        for component in &mut self.components {
            let span = tracing::trace_span!("transform", component = component.name());
            let _enter = span.enter();
            component.transform(variables, &mut state)?;
        }

        let mut ddt = variables.zeros_like();
        for component in &mut self.components {
            let span = tracing::trace_span!("finally", component = component.name());
            let _enter = span.enter();
            component.finally(&state, &mut ddt)?;
        }
        Ok(ddt)
    }

    /// Collect diagnostic output from every component.
    pub fn output_vars(&self, dump: &mut Dump) {
        for component in &self.components {
            component.output_vars(dump);
        }
    }

    /// Collect restart quantities from every component.
    pub fn restart_vars(&self, dump: &mut Dump) {
        for component in &self.components {
            component.restart_vars(dump);
        }
    }
}
