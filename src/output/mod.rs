//! Diagnostic output registry.
//!
//! Components register the fields they want written through
//! `Component::output_vars`. Variables are either written once (restart
//! quantities, geometry) or every output step, and carry free-form attributes
//! such as `units`, `conversion` and `long_name`.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::field::Field3D;

/// Whether a variable is written once or every output step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Once,
    Repeat,
}

/// One registered output variable.
#[derive(Clone, Debug)]
pub struct DumpVariable {
    pub field: Field3D,
    pub frequency: Frequency,
    pub attributes: BTreeMap<String, Value>,
}

/// Collection of output variables for one output step.
#[derive(Clone, Debug, Default)]
pub struct Dump {
    time: f64,
    variables: BTreeMap<String, DumpVariable>,
}

#[derive(Serialize)]
struct VariableRecord<'a> {
    frequency: Frequency,
    shape: [usize; 3],
    attributes: &'a BTreeMap<String, Value>,
    data: &'a [f64],
}

#[derive(Serialize)]
struct DumpRecord<'a> {
    time: f64,
    variables: BTreeMap<&'a str, VariableRecord<'a>>,
}

impl Dump {
    /// Empty dump at output time `time`.
    pub fn new(time: f64) -> Self {
        Self {
            time,
            variables: BTreeMap::new(),
        }
    }

    /// Output time.
    pub fn time(&self) -> f64 {
        self.time
    }

    fn insert(&mut self, name: &str, field: Field3D, frequency: Frequency) {
        if self.variables.contains_key(name) {
            tracing::warn!(name, "Replacing existing output variable");
        }
        self.variables.insert(
            name.to_string(),
            DumpVariable {
                field,
                frequency,
                attributes: BTreeMap::new(),
            },
        );
    }

    /// Register a variable written every output step.
    pub fn add_repeat(&mut self, name: &str, field: Field3D) {
        self.insert(name, field, Frequency::Repeat);
    }

    /// Register a variable written once.
    pub fn add_once(&mut self, name: &str, field: Field3D) {
        self.insert(name, field, Frequency::Once);
    }

    /// Merge attributes into a registered variable. Unknown names are ignored
    /// with a warning.
    pub fn set_attributes<I, K>(&mut self, name: &str, attributes: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        match self.variables.get_mut(name) {
            Some(variable) => {
                variable
                    .attributes
                    .extend(attributes.into_iter().map(|(k, v)| (k.into(), v)));
            }
            None => tracing::warn!(name, "Attributes set on unregistered output variable"),
        }
    }

    /// Registered variable by name.
    pub fn get(&self, name: &str) -> Option<&DumpVariable> {
        self.variables.get(name)
    }

    /// Names of all registered variables, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Number of registered variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Write the dump as a JSON document.
    pub fn write_json<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        let record = DumpRecord {
            time: self.time,
            variables: self
                .variables
                .iter()
                .map(|(name, v)| {
                    let mesh = v.field.mesh();
                    (
                        name.as_str(),
                        VariableRecord {
                            frequency: v.frequency,
                            shape: [mesh.nx, mesh.ny, mesh.nz],
                            attributes: &v.attributes,
                            data: v.field.data(),
                        },
                    )
                })
                .collect(),
        };
        serde_json::to_writer(writer, &record)
    }
}
