//! Species evolution and radiation components.
//!
//! - [`EvolveDensity`]: `N` (or `log N`) of one species
//! - [`EvolveMomentum`]: parallel momentum `NV` of one species
//! - [`FixedFractionRadiation`]: impurity radiation at a fixed fraction of the
//!   electron density

mod evolve_density;
mod evolve_momentum;
mod fixed_fraction_radiation;

pub use evolve_density::{DensityConfig, EvolveDensity, HyperZ};
pub use evolve_momentum::{EvolveMomentum, MomentumConfig};
pub use fixed_fraction_radiation::{
    AdasFit, Argon, Carbon, CoolingCurve, FixedFractionRadiation, HutchinsonCarbon, Neon,
    Nitrogen, RadiationConfig,
};

use crate::error::Result;
use crate::field::Field3D;
use crate::state::{Quantity, SimulationState};

/// Characteristic speed for numerical dissipation of species `name`.
///
/// The shared `sound_speed` if set, else `sqrt(T)` of the species.
///
/// # Errors
/// [`Error::MissingState`](crate::error::Error::MissingState) if neither is
/// available.
pub fn wave_speed(state: &SimulationState, name: &str) -> Result<Field3D> {
    match state.sound_speed.as_ref() {
        Some(c) => Ok(c.clone()),
        None => Ok(state
            .require_field(name, name, Quantity::Temperature)?
            .sqrt()),
    }
}
