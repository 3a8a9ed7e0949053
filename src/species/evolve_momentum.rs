//! Species parallel momentum evolution.
//!
//! Evolves `NV<name>`. Publishes the momentum and the parallel velocity
//! `NV / (AA N)`, which requires the species density and atomic mass to be
//! published first (typically by [`EvolveDensity`](super::EvolveDensity)).

use std::sync::Arc;

use serde::Deserialize;

use super::wave_speed;
use crate::component::{Access, Component};
use crate::error::Result;
use crate::field::{BoundaryCondition, Field3D, Region};
use crate::fv::{BoundaryFluxMode, StandardCellEdges, div_par_fvv_with};
use crate::mesh::Mesh;
use crate::operators::{div_n_bxgrad_f_b_xppm, grad_par};
use crate::options::Options;
use crate::output::Dump;
use crate::state::{Quantity, SimulationState, StateKey};
use crate::time::{Solver, Variables};

/// Options of section `<name>`.
#[derive(Clone, Debug, Deserialize)]
pub struct MomentumConfig {
    /// Allow flows through radial boundaries
    #[serde(default = "default_true")]
    pub bndry_flux: bool,

    /// Include poloidal ExB flow
    #[serde(default = "default_true")]
    pub poloidal_flows: bool,

    /// Output ddt(NV)
    #[serde(default)]
    pub diagnose: bool,

    /// Fail the evaluation if ddt(NV) is not finite
    #[serde(default)]
    pub check_finite: bool,

    /// Face reconstruction of the parallel advection
    #[serde(default)]
    pub limiter: StandardCellEdges,

    /// Guard-cell condition at physical edges
    #[serde(default)]
    pub boundary: BoundaryCondition,
}

fn default_true() -> bool {
    true
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            bndry_flux: true,
            poloidal_flows: true,
            diagnose: false,
            check_finite: false,
            limiter: StandardCellEdges::default(),
            boundary: BoundaryCondition::default(),
        }
    }
}

/// Evolves the parallel momentum of one species.
#[derive(Debug)]
pub struct EvolveMomentum {
    name: String,
    config: MomentumConfig,
    mesh: Arc<Mesh>,
    ddt_momentum: Field3D,
}

impl EvolveMomentum {
    /// Read options for species `name` and register `NV<name>`, initialised
    /// from `NV<name>.initial`.
    pub fn new(
        name: &str,
        options: &Options,
        mesh: &Arc<Mesh>,
        solver: &mut dyn Solver,
    ) -> Result<Self> {
        let config: MomentumConfig = options.section(name)?;
        tracing::debug!(name, ?config, "Momentum options");

        let variable = format!("NV{}", name);
        solver.add(&variable, options.initial_profile(&variable, mesh)?)?;

        Ok(Self {
            name: name.to_string(),
            config,
            mesh: mesh.clone(),
            ddt_momentum: Field3D::new(mesh),
        })
    }

    pub fn config(&self) -> &MomentumConfig {
        &self.config
    }

    fn variable_name(&self) -> String {
        format!("NV{}", self.name)
    }
}

impl Component for EvolveMomentum {
    fn name(&self) -> &str {
        &self.name
    }

    fn access(&self) -> Access {
        let key = |q| StateKey::species(&self.name, q);
        Access::new()
            .write(key(Quantity::Momentum))
            .write(key(Quantity::Velocity))
            .read(key(Quantity::Density))
            .read(key(Quantity::AtomicMass))
            .read(key(Quantity::Temperature))
            .read(key(Quantity::Pressure))
            .read(key(Quantity::MomentumSource))
            .read(StateKey::Phi)
            .read(StateKey::SoundSpeed)
    }

    fn transform(&mut self, variables: &Variables, state: &mut SimulationState) -> Result<()> {
        let mut nv = variables.require(&self.variable_name())?.clone();
        self.mesh.communicate(&mut nv);
        self.config.boundary.apply(&mut nv);

        let n = state.require_field(&self.name, &self.name, Quantity::Density)?;
        let atomic_mass = state.require_atomic_mass(&self.name, &self.name)?;
        let velocity = &nv / (n * atomic_mass);

        let species = state.species_mut(&self.name);
        species.velocity = Some(velocity);
        species.momentum = Some(nv);
        Ok(())
    }

    fn finally(&mut self, state: &SimulationState, ddt: &mut Variables) -> Result<()> {
        let config = &self.config;
        let nv = state.require_field(&self.name, &self.name, Quantity::Momentum)?;

        let mut dnv = match state.fields.phi.as_ref() {
            Some(phi) => -div_n_bxgrad_f_b_xppm(
                nv,
                phi,
                config.bndry_flux,
                config.poloidal_flows,
                true,
            ),
            None => Field3D::zero_from(nv),
        };

        let n = state.require_field(&self.name, &self.name, Quantity::Density)?;
        let v = state.require_field(&self.name, &self.name, Quantity::Velocity)?;
        let a = wave_speed(state, &self.name)?;
        dnv -= div_par_fvv_with(
            &config.limiter,
            n,
            v,
            &a,
            BoundaryFluxMode::FluxCorrection,
        );

        if let Some(species) = state.species(&self.name) {
            if let Some(p) = species.pressure.as_ref() {
                dnv -= grad_par(p);
            }
            if let Some(source) = species.momentum_source.as_ref() {
                dnv += source;
            }
        }

        if config.check_finite {
            dnv.check_finite(&format!("ddt(NV{})", self.name), Region::NoBoundary)?;
        }

        if config.diagnose {
            self.ddt_momentum = dnv.clone();
        }
        ddt.set(&self.variable_name(), dnv)
    }

    fn output_vars(&self, dump: &mut Dump) {
        if self.config.diagnose {
            dump.add_repeat(&format!("ddt(NV{})", self.name), self.ddt_momentum.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fv::div_par_fvv;
    use crate::mesh::MeshBuilder;
    use crate::time::Integrable;

    const TOL: f64 = 1e-12;

    fn setup(mesh: &Arc<Mesh>, nv: f64) -> (EvolveMomentum, Variables) {
        let mut options = Options::new();
        options.set("NVd+", "initial", nv);
        let mut vars = Variables::new();
        let component = EvolveMomentum::new("d+", &options, mesh, &mut vars).unwrap();
        (component, vars)
    }

    #[test]
    fn test_velocity_from_momentum() {
        let mesh = MeshBuilder::new(1, 3, 2).build();
        let (mut component, vars) = setup(&mesh, 3.0);

        let mut state = SimulationState::new(0.0);
        let species = state.species_mut("d+");
        species.density = Some(Field3D::filled(&mesh, 0.5));
        species.atomic_mass = Some(2.0);

        component.transform(&vars, &mut state).unwrap();
        let species = state.species("d+").unwrap();
        assert!((species.velocity.as_ref().unwrap()[(2, 3, 1)] - 3.0).abs() < TOL);
        assert_eq!(species.momentum.as_ref().unwrap()[(2, 3, 1)], 3.0);
    }

    #[test]
    fn test_missing_density() {
        let mesh = MeshBuilder::new(1, 3, 1).build();
        let (mut component, vars) = setup(&mesh, 1.0);
        let mut state = SimulationState::new(0.0);
        match component.transform(&vars, &mut state) {
            Err(Error::MissingState { component, key }) => {
                assert_eq!(component, "d+");
                assert_eq!(key, StateKey::species("d+", Quantity::Density));
            }
            other => panic!("expected MissingState, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_atomic_mass() {
        let mesh = MeshBuilder::new(1, 3, 1).build();
        let (mut component, vars) = setup(&mesh, 1.0);
        let mut state = SimulationState::new(0.0);
        state.species_mut("d+").density = Some(Field3D::filled(&mesh, 1.0));
        assert!(matches!(
            component.transform(&vars, &mut state),
            Err(Error::MissingState { .. })
        ));
    }

    #[test]
    fn test_pressure_gradient_and_source() {
        // Zero flow: only -grad_par(P) and the momentum source remain
        let mesh = MeshBuilder::new(1, 4, 1).build();
        let (mut component, vars) = setup(&mesh, 0.0);

        let mut state = SimulationState::new(0.0);
        let species = state.species_mut("d+");
        species.density = Some(Field3D::filled(&mesh, 1.0));
        species.atomic_mass = Some(1.0);
        species.temperature = Some(Field3D::filled(&mesh, 1.0));
        species.pressure = Some(Field3D::from_fn(&mesh, |_, y, _| 2.0 * y as f64));
        species.momentum_source = Some(Field3D::filled(&mesh, 0.5));
        component.transform(&vars, &mut state).unwrap();

        let mut ddt = vars.zeros_like();
        component.finally(&state, &mut ddt).unwrap();
        let d = ddt.require("NVd+").unwrap();
        for y in mesh.y_interior() {
            assert!((d[(2, y, 0)] - (0.5 - 2.0)).abs() < TOL, "y = {}: {}", y, d[(2, y, 0)]);
        }
    }

    #[test]
    fn test_missing_temperature_without_sound_speed() {
        let mesh = MeshBuilder::new(1, 3, 1).build();
        let (mut component, vars) = setup(&mesh, 0.0);
        let mut state = SimulationState::new(0.0);
        let species = state.species_mut("d+");
        species.density = Some(Field3D::filled(&mesh, 1.0));
        species.atomic_mass = Some(1.0);
        component.transform(&vars, &mut state).unwrap();

        let mut ddt = vars.zeros_like();
        assert!(matches!(
            component.finally(&state, &mut ddt),
            Err(Error::MissingState { .. })
        ));

        state.sound_speed = Some(Field3D::filled(&mesh, 1.0));
        assert!(component.finally(&state, &mut ddt).is_ok());
    }

    #[test]
    fn test_exb_advection_of_momentum() {
        let mesh = MeshBuilder::new(3, 4, 4).build();
        let mut options = Options::new();
        options.set_initial_profile(
            "NVd+",
            Field3D::from_fn(&mesh, |x, y, z| {
                0.2 + 0.05 * y as f64 + 0.1 * (z as f64).sin() + 0.02 * x as f64
            }),
        );
        let mut vars = Variables::new();
        let mut component = EvolveMomentum::new("d+", &options, &mesh, &mut vars).unwrap();

        let phi = Field3D::from_fn(&mesh, |x, _, z| 0.5 * x as f64 + 0.3 * (1.3 * z as f64).cos());
        let mut state = SimulationState::new(0.0);
        state.fields.phi = Some(phi.clone());
        let species = state.species_mut("d+");
        species.density = Some(Field3D::filled(&mesh, 1.0));
        species.atomic_mass = Some(1.0);
        species.temperature = Some(Field3D::filled(&mesh, 1.0));
        component.transform(&vars, &mut state).unwrap();

        let mut ddt = vars.zeros_like();
        component.finally(&state, &mut ddt).unwrap();
        let d = ddt.require("NVd+").unwrap();

        let species = state.species("d+").unwrap();
        let nv = species.momentum.as_ref().unwrap();
        let v = species.velocity.as_ref().unwrap();
        let n = species.density.as_ref().unwrap();
        let exb = div_n_bxgrad_f_b_xppm(nv, &phi, true, true, true);
        assert!(exb.max_abs(Region::NoBoundary) > 1e-6);
        let expected = -exb
            - div_par_fvv(n, v, &Field3D::filled(&mesh, 1.0), BoundaryFluxMode::FluxCorrection);

        let scale = expected.max_abs(Region::NoBoundary);
        for (x, y, z) in Region::NoBoundary.indices(&mesh) {
            assert!(
                (d[(x, y, z)] - expected[(x, y, z)]).abs() <= TOL * scale,
                "({}, {}, {})",
                x,
                y,
                z
            );
        }
    }

    #[test]
    fn test_limiter_option() {
        let options = Options::from_json_str(r#"{"d+": {"limiter": "min_mod"}}"#).unwrap();
        let config: MomentumConfig = options.section("d+").unwrap();
        assert_eq!(config.limiter, StandardCellEdges::MinMod);
        assert_eq!(MomentumConfig::default().limiter, StandardCellEdges::MC);
    }
}
