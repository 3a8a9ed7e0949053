//! Named set of evolving fields.

use std::collections::BTreeMap;

use super::integrator::Integrable;
use crate::error::{Error, Result};
use crate::field::Field3D;

/// Registration seam between components and the time integrator.
///
/// Components call [`add`](Solver::add) at construction for every conserved
/// quantity they evolve.
pub trait Solver {
    /// Register evolving variable `name` with its initial value.
    ///
    /// # Errors
    /// [`Error::DuplicateVariable`] if `name` is already registered.
    fn add(&mut self, name: &str, initial: Field3D) -> Result<()>;
}

/// Evolving fields by name.
///
/// The same type holds the state and its time derivative; the pipeline
/// creates the derivative with [`Integrable::zeros_like`] so both share the
/// same set of names.
#[derive(Clone, Debug, Default)]
pub struct Variables {
    fields: BTreeMap<String, Field3D>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field by name.
    pub fn get(&self, name: &str) -> Option<&Field3D> {
        self.fields.get(name)
    }

    /// Field by name, or [`Error::UnknownVariable`].
    pub fn require(&self, name: &str) -> Result<&Field3D> {
        self.fields.get(name).ok_or_else(|| Error::UnknownVariable {
            name: name.to_string(),
        })
    }

    /// Replace the value of a registered variable.
    ///
    /// # Errors
    /// [`Error::UnknownVariable`] if `name` was never registered.
    pub fn set(&mut self, name: &str, value: Field3D) -> Result<()> {
        match self.fields.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::UnknownVariable {
                name: name.to_string(),
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field3D)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Solver for Variables {
    fn add(&mut self, name: &str, initial: Field3D) -> Result<()> {
        if self.fields.contains_key(name) {
            return Err(Error::DuplicateVariable {
                name: name.to_string(),
            });
        }
        tracing::debug!(name, "Registered evolving variable");
        self.fields.insert(name.to_string(), initial);
        Ok(())
    }
}

impl Integrable for Variables {
    fn scale(&mut self, c: f64) {
        for field in self.fields.values_mut() {
            field.scale(c);
        }
    }

    /// # Panics
    /// If `other` does not hold exactly the same variable names.
    fn axpy(&mut self, c: f64, other: &Self) {
        assert!(
            self.fields.keys().eq(other.fields.keys()),
            "axpy on variable sets with different names"
        );
        for (field, o) in self.fields.values_mut().zip(other.fields.values()) {
            field.axpy(c, o);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshBuilder;

    #[test]
    fn test_add_and_duplicate() {
        let mesh = MeshBuilder::new(1, 1, 1).build();
        let mut vars = Variables::new();
        vars.add("Ne", Field3D::filled(&mesh, 1.0)).unwrap();
        assert!(matches!(
            vars.add("Ne", Field3D::filled(&mesh, 2.0)),
            Err(Error::DuplicateVariable { .. })
        ));
        assert_eq!(vars.require("Ne").unwrap()[(2, 2, 0)], 1.0);
        assert!(matches!(
            vars.require("NVe"),
            Err(Error::UnknownVariable { .. })
        ));
    }

    #[test]
    fn test_integrable_ops() {
        let mesh = MeshBuilder::new(1, 1, 1).build();
        let mut vars = Variables::new();
        vars.add("a", Field3D::filled(&mesh, 1.0)).unwrap();
        vars.add("b", Field3D::filled(&mesh, 2.0)).unwrap();

        let zeros = vars.zeros_like();
        assert_eq!(zeros.require("b").unwrap()[(2, 2, 0)], 0.0);

        let other = vars.clone();
        vars.scale(2.0);
        vars.axpy(0.5, &other);
        assert_eq!(vars.require("a").unwrap()[(2, 2, 0)], 2.5);
        assert_eq!(vars.require("b").unwrap()[(2, 2, 0)], 5.0);
    }

    #[test]
    #[should_panic(expected = "different names")]
    fn test_axpy_rejects_mismatched_names() {
        let mesh = MeshBuilder::new(1, 1, 1).build();
        let mut a = Variables::new();
        a.add("Ne", Field3D::filled(&mesh, 1.0)).unwrap();
        let mut b = Variables::new();
        b.add("Nd+", Field3D::filled(&mesh, 1.0)).unwrap();
        a.axpy(1.0, &b);
    }

    #[test]
    fn test_set_unknown() {
        let mesh = MeshBuilder::new(1, 1, 1).build();
        let mut vars = Variables::new();
        assert!(vars.set("Ne", Field3D::new(&mesh)).is_err());
    }
}
