//! Shared simulation state exchanged between components.
//!
//! Each right-hand-side evaluation starts from an empty [`SimulationState`]
//! (apart from externally supplied background fields). Components publish
//! quantities during `transform` and read them during `finally`. A `None`
//! entry means "not computed this step".

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::field::Field3D;

// =============================================================================
// Keys
// =============================================================================

/// Per-species quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quantity {
    /// Number density
    Density,
    /// Parallel flow velocity
    Velocity,
    /// Parallel momentum density
    Momentum,
    /// Temperature
    Temperature,
    /// Pressure
    Pressure,
    /// Atomic mass in proton masses
    AtomicMass,
    /// Charge in units of the elementary charge
    Charge,
    /// Particle source
    DensitySource,
    /// Parallel momentum source
    MomentumSource,
    /// Energy source
    EnergySource,
}

impl Quantity {
    /// Name used in keys and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Quantity::Density => "density",
            Quantity::Velocity => "velocity",
            Quantity::Momentum => "momentum",
            Quantity::Temperature => "temperature",
            Quantity::Pressure => "pressure",
            Quantity::AtomicMass => "AA",
            Quantity::Charge => "charge",
            Quantity::DensitySource => "density_source",
            Quantity::MomentumSource => "momentum_source",
            Quantity::EnergySource => "energy_source",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of one entry in the simulation state.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateKey {
    /// `species.<name>.<quantity>`
    Species { name: String, quantity: Quantity },
    /// `fields.phi`
    Phi,
    /// `sound_speed`
    SoundSpeed,
}

impl StateKey {
    /// Key of a species quantity.
    pub fn species(name: impl Into<String>, quantity: Quantity) -> Self {
        StateKey::Species {
            name: name.into(),
            quantity,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateKey::Species { name, quantity } => write!(f, "species.{}.{}", name, quantity),
            StateKey::Phi => f.write_str("fields.phi"),
            StateKey::SoundSpeed => f.write_str("sound_speed"),
        }
    }
}

// =============================================================================
// State containers
// =============================================================================

/// Quantities of one species.
#[derive(Clone, Debug, Default)]
pub struct SpeciesState {
    pub density: Option<Field3D>,
    pub velocity: Option<Field3D>,
    pub momentum: Option<Field3D>,
    pub temperature: Option<Field3D>,
    pub pressure: Option<Field3D>,
    pub density_source: Option<Field3D>,
    pub momentum_source: Option<Field3D>,
    pub energy_source: Option<Field3D>,
    /// Atomic mass in proton masses
    pub atomic_mass: Option<f64>,
    /// Charge in units of the elementary charge
    pub charge: Option<f64>,
}

impl SpeciesState {
    /// Field quantity by key, if it is a field and set.
    pub fn field(&self, quantity: Quantity) -> Option<&Field3D> {
        match quantity {
            Quantity::Density => self.density.as_ref(),
            Quantity::Velocity => self.velocity.as_ref(),
            Quantity::Momentum => self.momentum.as_ref(),
            Quantity::Temperature => self.temperature.as_ref(),
            Quantity::Pressure => self.pressure.as_ref(),
            Quantity::DensitySource => self.density_source.as_ref(),
            Quantity::MomentumSource => self.momentum_source.as_ref(),
            Quantity::EnergySource => self.energy_source.as_ref(),
            Quantity::AtomicMass | Quantity::Charge => None,
        }
    }

    /// Whether a quantity is set.
    pub fn is_set(&self, quantity: Quantity) -> bool {
        match quantity {
            Quantity::AtomicMass => self.atomic_mass.is_some(),
            Quantity::Charge => self.charge.is_some(),
            q => self.field(q).is_some(),
        }
    }
}

/// Electromagnetic fields.
#[derive(Clone, Debug, Default)]
pub struct FieldsState {
    /// Electrostatic potential
    pub phi: Option<Field3D>,
}

/// Complete state passed through the component pipeline.
#[derive(Clone, Debug, Default)]
pub struct SimulationState {
    /// Simulation time of this evaluation
    pub time: f64,
    /// Species by name
    pub species: BTreeMap<String, SpeciesState>,
    /// Electromagnetic fields
    pub fields: FieldsState,
    /// Characteristic speed used for numerical dissipation
    pub sound_speed: Option<Field3D>,
}

impl SimulationState {
    /// Empty state at `time`.
    pub fn new(time: f64) -> Self {
        Self {
            time,
            ..Self::default()
        }
    }

    /// Species entry, created empty if absent.
    pub fn species_mut(&mut self, name: &str) -> &mut SpeciesState {
        self.species.entry(name.to_string()).or_default()
    }

    /// Species entry, if present.
    pub fn species(&self, name: &str) -> Option<&SpeciesState> {
        self.species.get(name)
    }

    /// Whether `key` is set.
    pub fn is_set(&self, key: &StateKey) -> bool {
        match key {
            StateKey::Species { name, quantity } => self
                .species
                .get(name)
                .is_some_and(|s| s.is_set(*quantity)),
            StateKey::Phi => self.fields.phi.is_some(),
            StateKey::SoundSpeed => self.sound_speed.is_some(),
        }
    }

    /// Field of a species quantity, or [`Error::MissingState`] naming `component`.
    pub fn require_field(&self, component: &str, name: &str, quantity: Quantity) -> Result<&Field3D> {
        self.species
            .get(name)
            .and_then(|s| s.field(quantity))
            .ok_or_else(|| Error::missing(component, StateKey::species(name, quantity)))
    }

    /// Atomic mass of a species, or [`Error::MissingState`] naming `component`.
    pub fn require_atomic_mass(&self, component: &str, name: &str) -> Result<f64> {
        self.species
            .get(name)
            .and_then(|s| s.atomic_mass)
            .ok_or_else(|| Error::missing(component, StateKey::species(name, Quantity::AtomicMass)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshBuilder;

    #[test]
    fn test_key_display() {
        assert_eq!(
            StateKey::species("d+", Quantity::Density).to_string(),
            "species.d+.density"
        );
        assert_eq!(StateKey::species("e", Quantity::AtomicMass).to_string(), "species.e.AA");
        assert_eq!(StateKey::Phi.to_string(), "fields.phi");
    }

    #[test]
    fn test_is_set_and_require() {
        let mesh = MeshBuilder::new(1, 1, 1).build();
        let mut state = SimulationState::new(0.0);
        let key = StateKey::species("e", Quantity::Density);
        assert!(!state.is_set(&key));
        assert!(state.require_field("test", "e", Quantity::Density).is_err());

        state.species_mut("e").density = Some(Field3D::filled(&mesh, 1.0));
        assert!(state.is_set(&key));
        assert!(state.require_field("test", "e", Quantity::Density).is_ok());

        match state.require_atomic_mass("test", "e") {
            Err(Error::MissingState { component, key }) => {
                assert_eq!(component, "test");
                assert_eq!(key, StateKey::species("e", Quantity::AtomicMass));
            }
            other => panic!("expected MissingState, got {:?}", other),
        }
    }
}
