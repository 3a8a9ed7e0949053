//! Species density evolution.
//!
//! Evolves `N<name>` (or `logN<name>`) with:
//! - ExB advection when the potential is set
//! - parallel advection by the species velocity
//! - low-density parallel and perpendicular diffusion
//! - optional Z hyper-diffusion
//! - configured and state-supplied particle sources

use std::sync::Arc;

use serde::Deserialize;

use super::wave_speed;
use crate::component::{Access, Component};
use crate::constants::ELECTRON_PROTON_MASS_RATIO;
use crate::error::Result;
use crate::field::{BoundaryCondition, Field2D, Field3D, Region, clamp, floor};
use crate::fv::{BoundaryFluxMode, StandardCellEdges, div_par_k_grad_par, div_par_with};
use crate::mesh::Mesh;
use crate::operators::{d4dz4, div_n_bxgrad_f_b_xppm, div_perp_lap_fv_index};
use crate::options::Options;
use crate::output::Dump;
use crate::state::{Quantity, SimulationState, StateKey};
use crate::time::{Solver, Variables};

// =============================================================================
// Configuration
// =============================================================================

/// Z hyper-diffusion switch or coefficient.
///
/// Accepts `true`/`false` or a number. `true` means coefficient 1; `false`
/// and non-positive numbers disable the term.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HyperZ {
    Switch(bool),
    Coefficient(f64),
}

impl Default for HyperZ {
    fn default() -> Self {
        HyperZ::Coefficient(-1.0)
    }
}

impl HyperZ {
    /// Active coefficient, if any.
    pub fn coefficient(&self) -> Option<f64> {
        match *self {
            HyperZ::Switch(true) => Some(1.0),
            HyperZ::Switch(false) => None,
            HyperZ::Coefficient(c) if c > 0.0 => Some(c),
            HyperZ::Coefficient(_) => None,
        }
    }
}

/// Options of section `<name>`.
#[derive(Clone, Debug, Deserialize)]
pub struct DensityConfig {
    /// Allow flows through radial boundaries
    #[serde(default = "default_true")]
    pub bndry_flux: bool,

    /// Include poloidal ExB flow
    #[serde(default = "default_true")]
    pub poloidal_flows: bool,

    /// Minimum density used where density is divided by
    #[serde(default = "default_density_floor")]
    pub density_floor: f64,

    /// Parallel diffusion at low density
    #[serde(default = "default_true")]
    pub low_n_diffuse: bool,

    /// Perpendicular diffusion at low density
    #[serde(default)]
    pub low_n_diffuse_perp: bool,

    /// Hyper-diffusion in Z
    #[serde(default)]
    pub hyper_z: HyperZ,

    /// Evolve the logarithm of density
    #[serde(default)]
    pub evolve_log: bool,

    /// Particle charge, electrons = -1
    #[serde(default = "default_charge")]
    pub charge: f64,

    /// Particle atomic mass, proton = 1
    #[serde(default = "default_atomic_mass", rename = "AA")]
    pub atomic_mass: f64,

    /// Output additional diagnostics
    #[serde(default)]
    pub diagnose: bool,

    /// Fail the evaluation if ddt(N) is not finite
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

fn default_density_floor() -> f64 {
    1e-5
}

fn default_charge() -> f64 {
    -1.0
}

fn default_atomic_mass() -> f64 {
    ELECTRON_PROTON_MASS_RATIO
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            bndry_flux: true,
            poloidal_flows: true,
            density_floor: default_density_floor(),
            low_n_diffuse: true,
            low_n_diffuse_perp: false,
            hyper_z: HyperZ::default(),
            evolve_log: false,
            charge: default_charge(),
            atomic_mass: default_atomic_mass(),
            diagnose: false,
            check_finite: false,
            limiter: StandardCellEdges::default(),
            boundary: BoundaryCondition::default(),
        }
    }
}

// =============================================================================
// Component
// =============================================================================

/// Evolves the density of one species.
#[derive(Debug)]
pub struct EvolveDensity {
    name: String,
    config: DensityConfig,
    mesh: Arc<Mesh>,
    /// Normalised particle source from `N<name>.source`
    source: Field3D,
    /// Density at the last transform
    density: Field3D,
    /// Last ddt(N), kept for diagnostics
    ddt_density: Field3D,
    /// Last total particle source, kept for diagnostics
    total_source: Field3D,
}

impl EvolveDensity {
    /// Read options for species `name` and register the evolving variable.
    ///
    /// The initial value comes from `N<name>.initial`; with `evolve_log` its
    /// logarithm (after flooring at `density_floor`) is registered as
    /// `logN<name>`.
    pub fn new(
        name: &str,
        options: &Options,
        mesh: &Arc<Mesh>,
        solver: &mut dyn Solver,
    ) -> Result<Self> {
        let config: DensityConfig = options.section(name)?;
        tracing::debug!(name, ?config, "Density options");

        let density_name = format!("N{}", name);
        let initial = options.initial_profile(&density_name, mesh)?;
        if config.evolve_log {
            solver.add(
                &format!("logN{}", name),
                floor(&initial, config.density_floor).ln(),
            )?;
        } else {
            solver.add(&density_name, initial.clone())?;
        }

        let units = options.units()?;
        let source = options.field(&density_name, "source", mesh, 0.0)?
            / (units.inv_meters_cubed * units.frequency());

        Ok(Self {
            name: name.to_string(),
            config,
            mesh: mesh.clone(),
            source,
            ddt_density: Field3D::new(mesh),
            total_source: Field3D::new(mesh),
            density: initial,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &DensityConfig {
        &self.config
    }

    fn variable_name(&self) -> String {
        if self.config.evolve_log {
            format!("logN{}", self.name)
        } else {
            format!("N{}", self.name)
        }
    }

    /// `dy² g_22 ln(floor / clamp(N, 1e-6 floor, floor))`
    fn low_n_coefficient(&self, n: &Field3D) -> Field3D {
        let coords = self.mesh.coordinates();
        let floor_n = self.config.density_floor;
        let metric = Field2D::from_fn(self.mesh.nx, self.mesh.ny, |x, y| {
            coords.dy[(x, y)].powi(2) * coords.g_22[(x, y)]
        });
        (floor_n / clamp(n, 1e-6 * floor_n, floor_n)).ln() * &metric
    }
}

impl Component for EvolveDensity {
    fn name(&self) -> &str {
        &self.name
    }

    fn access(&self) -> Access {
        let key = |q| StateKey::species(&self.name, q);
        let mut access = Access::new()
            .write(key(Quantity::Density))
            .write(key(Quantity::AtomicMass))
            .read(key(Quantity::Velocity))
            .read(key(Quantity::Temperature))
            .read(key(Quantity::DensitySource))
            .read(StateKey::Phi)
            .read(StateKey::SoundSpeed);
        if self.config.charge != 0.0 {
            access = access.write(key(Quantity::Charge));
        }
        access
    }

    fn transform(&mut self, variables: &Variables, state: &mut SimulationState) -> Result<()> {
        let mut n = if self.config.evolve_log {
            variables.require(&self.variable_name())?.exp()
        } else {
            variables.require(&self.variable_name())?.clone()
        };
        self.mesh.communicate(&mut n);
        self.config.boundary.apply(&mut n);

        let species = state.species_mut(&self.name);
        species.density = Some(n.clone());
        species.atomic_mass = Some(self.config.atomic_mass);
        if self.config.charge != 0.0 {
            species.charge = Some(self.config.charge);
        }
        self.density = n;
        Ok(())
    }

    fn finally(&mut self, state: &SimulationState, ddt: &mut Variables) -> Result<()> {
        let config = &self.config;
        let n = state
            .require_field(&self.name, &self.name, Quantity::Density)?
            .clone();
        let phi = state.fields.phi.as_ref();

        let mut dn = match phi {
            Some(phi) => -div_n_bxgrad_f_b_xppm(
                &n,
                phi,
                config.bndry_flux,
                config.poloidal_flows,
                true,
            ),
            None => Field3D::zero_from(&n),
        };

        if let Some(v) = state.species(&self.name).and_then(|s| s.velocity.as_ref()) {
            let mut a = wave_speed(state, &self.name)?;
            if phi.is_some() {
                // Electrostatic waves: electron sound speed
                a.scale(ELECTRON_PROTON_MASS_RATIO.sqrt());
            }
            dn -= div_par_with(&config.limiter, &n, v, &a, BoundaryFluxMode::FixedFlux);
        }

        if config.low_n_diffuse {
            dn += div_par_k_grad_par(&self.low_n_coefficient(&n), &n, true);
        }

        if config.low_n_diffuse_perp {
            let floor_n = config.density_floor;
            let a = floor_n / floor(&n, 1e-3 * floor_n);
            dn += div_perp_lap_fv_index(&a, &n, config.bndry_flux);
        }

        if let Some(coefficient) = config.hyper_z.coefficient() {
            let coords = self.mesh.coordinates();
            let dz4 = coords.dz.map(|dz| dz.powi(4));
            dn -= coefficient * (d4dz4(&n) * &dz4);
        }

        let mut sn = self.source.clone();
        if let Some(s) = state
            .species(&self.name)
            .and_then(|s| s.density_source.as_ref())
        {
            sn += s;
        }
        dn += &sn;

        if config.check_finite {
            dn.check_finite(&format!("ddt(N{})", self.name), Region::NoBoundary)?;
        }

        if config.evolve_log {
            let dlogn = &dn / &floor(&n, config.density_floor);
            ddt.set(&self.variable_name(), dlogn)?;
        } else {
            ddt.set(&self.variable_name(), dn.clone())?;
        }

        if config.diagnose {
            self.ddt_density = dn;
            self.total_source = sn;
        }
        Ok(())
    }

    fn output_vars(&self, dump: &mut Dump) {
        if self.config.evolve_log {
            dump.add_repeat(&format!("N{}", self.name), self.density.clone());
        }
        if self.config.diagnose {
            dump.add_repeat(&format!("ddt(N{})", self.name), self.ddt_density.clone());
            dump.add_repeat(&format!("SN{}", self.name), self.total_source.clone());
        }
    }

    fn restart_vars(&self, dump: &mut Dump) {
        if self.config.evolve_log {
            dump.add_once(&format!("N{}", self.name), self.density.clone());
        }
    }
}
