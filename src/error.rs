//! Error types for component assembly and right-hand-side evaluation.
//!
//! Incompatible field shapes are not represented here: they indicate a
//! programming error in the caller and are reported by panicking.

use thiserror::Error;

use crate::field::Region;
use crate::options::ConfigError;
use crate::state::StateKey;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or evaluating a model.
#[derive(Error, Debug)]
pub enum Error {
    /// No constructor registered under the requested component type.
    #[error("Unknown component type '{type_name}' (requested by '{name}')")]
    UnknownComponent { type_name: String, name: String },

    /// Two components declared themselves the owner of the same state key.
    #[error("State key {key} written by both '{first}' and '{second}'")]
    DuplicateWriter {
        key: StateKey,
        first: String,
        second: String,
    },

    /// A required input was absent from the simulation state.
    #[error("Component '{component}' requires {key}, which is not set")]
    MissingState { component: String, key: StateKey },

    /// An evolving variable was registered twice with the solver.
    #[error("Evolving variable '{name}' is already registered")]
    DuplicateVariable { name: String },

    /// A component addressed an evolving variable that was never registered.
    #[error("Evolving variable '{name}' is not registered")]
    UnknownVariable { name: String },

    /// A time derivative or published quantity contains NaN or Inf.
    #[error("Non-finite value in {name} ({region:?}) at ({x}, {y}, {z})")]
    NonFinite {
        name: String,
        region: Region,
        x: usize,
        y: usize,
        z: usize,
    },

    /// Invalid or unreadable configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Create a missing-state error.
    pub fn missing(component: impl Into<String>, key: StateKey) -> Self {
        Self::MissingState {
            component: component.into(),
            key,
        }
    }
}
