//! Hierarchical configuration.
//!
//! Options are a JSON tree of sections. Each component reads its own section
//! into a typed struct whose fields carry serde defaults, so an absent section
//! or key always resolves to the documented default:
//!
//! ```json
//! {
//!   "components": ["d+", "e"],
//!   "units": { "inv_meters_cubed": 1e19, "seconds": 1e-6, "eV": 50.0 },
//!   "d+": { "type": "evolve_density", "charge": 1.0, "AA": 2.0 },
//!   "Nd+": { "source": 1e20, "initial": 1.0 }
//! }
//! ```
//!
//! Spatially varying inputs (initial profiles, sources) can be supplied as
//! fields with [`Options::set_profile`]; otherwise the scalar in the tree is
//! used as a uniform field.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::field::Field3D;
use crate::mesh::Mesh;

// =============================================================================
// Errors
// =============================================================================

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Options file could not be read.
    #[error("I/O error reading options: {0}")]
    Io(#[from] std::io::Error),

    /// Options text is not valid JSON.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A section does not match the expected structure.
    #[error("Invalid section '{section}': {reason}")]
    InvalidSection { section: String, reason: String },

    /// A value is present but unusable.
    #[error("Invalid value '{key}': {value} - {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

// =============================================================================
// Units
// =============================================================================

/// Normalisation factors. Every quantity defaults to 1 (already normalised).
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Units {
    /// Density normalisation [m^-3]
    #[serde(default = "unit")]
    pub inv_meters_cubed: f64,
    /// Time normalisation [s]
    #[serde(default = "unit")]
    pub seconds: f64,
    /// Temperature normalisation [eV]
    #[serde(default = "unit", rename = "eV")]
    pub ev: f64,
    /// Length normalisation [m]
    #[serde(default = "unit")]
    pub meters: f64,
    /// Magnetic field normalisation [T]
    #[serde(default = "unit", rename = "Tesla")]
    pub tesla: f64,
}

fn unit() -> f64 {
    1.0
}

impl Default for Units {
    fn default() -> Self {
        Self {
            inv_meters_cubed: 1.0,
            seconds: 1.0,
            ev: 1.0,
            meters: 1.0,
            tesla: 1.0,
        }
    }
}

impl Units {
    /// Reference frequency `1 / seconds`.
    pub fn frequency(&self) -> f64 {
        1.0 / self.seconds
    }
}

// =============================================================================
// Options
// =============================================================================

/// Options tree plus programmatically supplied field profiles.
#[derive(Clone, Debug)]
pub struct Options {
    root: Value,
    profiles: HashMap<(String, String), Field3D>,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Options {
    /// Empty options; every section resolves to defaults.
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
            profiles: HashMap::new(),
        }
    }

    /// Parse options from JSON text.
    ///
    /// # Errors
    /// [`ConfigError::Parse`] for malformed JSON, [`ConfigError::InvalidSection`]
    /// if the top level is not an object.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_json::from_str(text)?;
        if !root.is_object() {
            return Err(ConfigError::InvalidSection {
                section: "<root>".to_string(),
                reason: "top level must be an object".to_string(),
            });
        }
        Ok(Self {
            root,
            profiles: HashMap::new(),
        })
    }

    /// Read options from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), "Reading options");
        Self::from_json_str(&text)
    }

    /// Set `section.key` to `value`, creating the section if needed.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<Value>) -> &mut Self {
        if let Value::Object(root) = &mut self.root {
            let entry = root
                .entry(section.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(map) = entry {
                map.insert(key.to_string(), value.into());
            }
        }
        self
    }

    /// Raw value of `section.key`, if present.
    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.root.get(section).and_then(|s| s.get(key))
    }

    /// Whether a section exists.
    pub fn has_section(&self, section: &str) -> bool {
        self.root.get(section).is_some()
    }

    /// Deserialize a section, applying serde defaults for absent keys.
    ///
    /// Unknown keys are ignored.
    ///
    /// # Errors
    /// [`ConfigError::InvalidSection`] if a present key has the wrong type.
    pub fn section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError> {
        let value = self
            .root
            .get(section)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidSection {
            section: section.to_string(),
            reason: e.to_string(),
        })
    }

    /// Registry types of component `name`.
    ///
    /// The `type` key of section `name` may be a single type, a
    /// comma-separated list or an array. Without it the type is `name`.
    pub fn component_types(&self, name: &str) -> Result<Vec<String>, ConfigError> {
        match self.get(name, "type") {
            None => Ok(vec![name.to_string()]),
            Some(value) => string_list(&format!("{}.type", name), value),
        }
    }

    /// Component names listed under the top-level `components` key.
    ///
    /// Accepts an array of strings or a single comma-separated string.
    pub fn component_names(&self) -> Result<Vec<String>, ConfigError> {
        match self.root.get("components") {
            None => Ok(Vec::new()),
            Some(value) => string_list("components", value),
        }
    }

    /// Normalisation factors from the `units` section.
    pub fn units(&self) -> Result<Units, ConfigError> {
        self.section("units")
    }

    /// Supply a spatially varying value for `section.key`.
    pub fn set_profile(&mut self, section: &str, key: &str, field: Field3D) -> &mut Self {
        self.profiles
            .insert((section.to_string(), key.to_string()), field);
        self
    }

    /// Field value of `section.key`.
    ///
    /// Uses a profile set with [`set_profile`](Self::set_profile) if present,
    /// else the scalar in the tree as a uniform field, else `default`.
    ///
    /// # Errors
    /// [`ConfigError::InvalidValue`] if the tree value is not a number, or the
    /// profile lives on another mesh.
    pub fn field(
        &self,
        section: &str,
        key: &str,
        mesh: &Arc<Mesh>,
        default: f64,
    ) -> Result<Field3D, ConfigError> {
        if let Some(profile) = self.profiles.get(&(section.to_string(), key.to_string())) {
            if !Arc::ptr_eq(profile.mesh(), mesh) {
                return Err(ConfigError::InvalidValue {
                    key: format!("{}.{}", section, key),
                    value: "<field>".to_string(),
                    reason: "profile is defined on a different mesh".to_string(),
                });
            }
            return Ok(profile.clone());
        }
        match self.get(section, key) {
            None => Ok(Field3D::filled(mesh, default)),
            Some(value) => value
                .as_f64()
                .map(|v| Field3D::filled(mesh, v))
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: format!("{}.{}", section, key),
                    value: value.to_string(),
                    reason: "expected a number".to_string(),
                }),
        }
    }

    /// Initial profile of evolving variable `name` (`<name>.initial`, default 0).
    pub fn initial_profile(&self, name: &str, mesh: &Arc<Mesh>) -> Result<Field3D, ConfigError> {
        self.field(name, "initial", mesh, 0.0)
    }

    /// Shorthand for `set_profile(name, "initial", field)`.
    pub fn set_initial_profile(&mut self, name: &str, field: Field3D) -> &mut Self {
        self.set_profile(name, "initial", field)
    }
}

/// A comma-separated string or an array of strings.
fn string_list(key: &str, value: &Value) -> Result<Vec<String>, ConfigError> {
    let invalid = |value: &Value, reason: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    match value {
        Value::String(list) => Ok(list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(item, "expected a string"))
            })
            .collect(),
        other => Err(invalid(other, "expected a list of names")),
    }
}
