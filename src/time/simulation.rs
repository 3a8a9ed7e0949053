//! Pipeline + evolving variables + integrator.

use std::sync::Arc;

use serde::Deserialize;

use super::integrator::{IntegratorInfo, StandardIntegrator, TimeIntegrator};
use super::variables::Variables;
use crate::component::{ComponentRegistry, Pipeline};
use crate::error::Result;
use crate::mesh::Mesh;
use crate::options::Options;
use crate::output::Dump;
use crate::state::SimulationState;

/// Options of section `solver`.
#[derive(Clone, Debug, Deserialize)]
pub struct SolverConfig {
    /// Time integration scheme
    #[serde(default)]
    pub integrator: StandardIntegrator,

    /// Time step (normalised)
    #[serde(default = "default_timestep")]
    pub timestep: f64,

    /// Steps between progress messages
    #[serde(default = "default_log_interval")]
    pub log_interval: usize,
}

fn default_timestep() -> f64 {
    1e-3
}

fn default_log_interval() -> usize {
    100
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            integrator: StandardIntegrator::default(),
            timestep: default_timestep(),
            log_interval: default_log_interval(),
        }
    }
}

/// A runnable model: components, their evolving variables and a background
/// state for quantities no component evolves.
#[derive(Debug)]
pub struct Simulation {
    mesh: Arc<Mesh>,
    pipeline: Pipeline,
    variables: Variables,
    background: SimulationState,
    config: SolverConfig,
    time: f64,
    steps: usize,
}

impl Simulation {
    /// Build from options with the built-in components.
    pub fn from_options(options: &Options, mesh: &Arc<Mesh>) -> Result<Self> {
        Self::with_registry(options, mesh, &ComponentRegistry::with_builtin())
    }

    /// Build from options with a custom registry.
    pub fn with_registry(
        options: &Options,
        mesh: &Arc<Mesh>,
        registry: &ComponentRegistry,
    ) -> Result<Self> {
        let config: SolverConfig = options.section("solver")?;
        let mut variables = Variables::new();
        let pipeline = Pipeline::from_options(options, mesh, registry, &mut variables)?;
        tracing::info!(
            integrator = config.integrator.name(),
            timestep = config.timestep,
            variables = variables.len(),
            "Simulation ready"
        );
        Ok(Self {
            mesh: mesh.clone(),
            pipeline,
            variables,
            background: SimulationState::default(),
            config,
            time: 0.0,
            steps: 0,
        })
    }

    /// Override the integrator.
    pub fn with_integrator(mut self, integrator: StandardIntegrator) -> Self {
        self.config.integrator = integrator;
        self
    }

    /// Background quantities copied into every evaluation.
    pub fn background_mut(&mut self) -> &mut SimulationState {
        &mut self.background
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Time derivative at the current state.
    pub fn rhs(&mut self) -> Result<Variables> {
        self.pipeline
            .evaluate(&self.variables, &self.background, self.time)
    }

    /// Advance by one step of size `dt`.
    pub fn step(&mut self, dt: f64) -> Result<()> {
        let Self {
            pipeline,
            variables,
            background,
            config,
            time,
            ..
        } = self;
        config
            .integrator
            .step(variables, dt, *time, |vars: &Variables, t| {
                pipeline.evaluate(vars, background, t)
            })?;
        self.time += dt;
        self.steps += 1;
        Ok(())
    }

    /// Advance `n_steps` steps of the configured time step.
    pub fn run(&mut self, n_steps: usize) -> Result<()> {
        let dt = self.config.timestep;
        let interval = self.config.log_interval.max(1);
        for i in 1..=n_steps {
            self.step(dt)?;
            if i % interval == 0 || i == n_steps {
                tracing::info!(step = self.steps, time = self.time, "Step complete");
            }
        }
        Ok(())
    }

    /// Output at the current time: every evolving variable plus component
    /// diagnostics.
    ///
    /// The pipeline is evaluated first so that derived fields held by
    /// components describe the current variables, not the last integrator
    /// stage.
    pub fn output(&mut self) -> Result<Dump> {
        self.refresh()?;
        let mut dump = Dump::new(self.time);
        for (name, field) in self.variables.iter() {
            dump.add_repeat(name, field.clone());
        }
        self.pipeline.output_vars(&mut dump);
        Ok(dump)
    }

    /// Restart data at the current time.
    pub fn restart(&mut self) -> Result<Dump> {
        self.refresh()?;
        let mut dump = Dump::new(self.time);
        for (name, field) in self.variables.iter() {
            dump.add_once(name, field.clone());
        }
        self.pipeline.restart_vars(&mut dump);
        Ok(dump)
    }

    fn refresh(&mut self) -> Result<()> {
        self.pipeline
            .evaluate(&self.variables, &self.background, self.time)
            .map(|_| ())
    }
}
