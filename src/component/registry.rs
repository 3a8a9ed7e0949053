//! Component factory keyed by type name.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::Component;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::options::Options;
use crate::species::{
    Argon, Carbon, EvolveDensity, EvolveMomentum, FixedFractionRadiation, HutchinsonCarbon, Neon,
    Nitrogen,
};
use crate::time::Solver;

/// Builds a component from its instance name, options, mesh and solver.
pub type ComponentConstructor = Box<
    dyn Fn(&str, &Options, &Arc<Mesh>, &mut dyn Solver) -> Result<Box<dyn Component>> + Send + Sync,
>;

/// Maps component type names to constructors.
#[derive(Default)]
pub struct ComponentRegistry {
    constructors: BTreeMap<String, ComponentConstructor>,
}

impl ComponentRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in component:
    /// - `evolve_density`, `evolve_momentum`
    /// - `fixed_fraction_hutchinson_carbon`, `fixed_fraction_carbon`,
    ///   `fixed_fraction_nitrogen`, `fixed_fraction_neon`, `fixed_fraction_argon`
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("evolve_density", |name, options, mesh, solver| {
            Ok(Box::new(EvolveDensity::new(name, options, mesh, solver)?))
        });
        registry.register("evolve_momentum", |name, options, mesh, solver| {
            Ok(Box::new(EvolveMomentum::new(name, options, mesh, solver)?))
        });
        registry.register("fixed_fraction_hutchinson_carbon", |name, options, _, _| {
            Ok(Box::new(FixedFractionRadiation::new(name, options, HutchinsonCarbon)?))
        });
        registry.register("fixed_fraction_carbon", |name, options, _, _| {
            Ok(Box::new(FixedFractionRadiation::new(name, options, Carbon)?))
        });
        registry.register("fixed_fraction_nitrogen", |name, options, _, _| {
            Ok(Box::new(FixedFractionRadiation::new(name, options, Nitrogen)?))
        });
        registry.register("fixed_fraction_neon", |name, options, _, _| {
            Ok(Box::new(FixedFractionRadiation::new(name, options, Neon)?))
        });
        registry.register("fixed_fraction_argon", |name, options, _, _| {
            Ok(Box::new(FixedFractionRadiation::new(name, options, Argon)?))
        });
        registry
    }

    /// Register a constructor, replacing any previous one of the same type.
    pub fn register<F>(&mut self, type_name: &str, constructor: F)
    where
        F: Fn(&str, &Options, &Arc<Mesh>, &mut dyn Solver) -> Result<Box<dyn Component>>
            + Send
            + Sync
            + 'static,
    {
        if self
            .constructors
            .insert(type_name.to_string(), Box::new(constructor))
            .is_some()
        {
            tracing::warn!(type_name, "Replacing registered component type");
        }
    }

    /// Whether `type_name` is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Create every component listed for `name`: one per entry of the `type`
    /// key of section `name`, or a single component of type `name`.
    pub fn create(
        &self,
        name: &str,
        options: &Options,
        mesh: &Arc<Mesh>,
        solver: &mut dyn Solver,
    ) -> Result<Vec<Box<dyn Component>>> {
        options
            .component_types(name)?
            .iter()
            .map(|type_name| self.create_type(type_name, name, options, mesh, solver))
            .collect()
    }

    /// Create component `name` of type `type_name`.
    ///
    /// # Errors
    /// [`Error::UnknownComponent`] if the type is not registered, or any error
    /// from the constructor.
    pub fn create_type(
        &self,
        type_name: &str,
        name: &str,
        options: &Options,
        mesh: &Arc<Mesh>,
        solver: &mut dyn Solver,
    ) -> Result<Box<dyn Component>> {
        let constructor =
            self.constructors
                .get(type_name)
                .ok_or_else(|| Error::UnknownComponent {
                    type_name: type_name.to_string(),
                    name: name.to_string(),
                })?;
        tracing::info!(name, type_name, "Creating component");
        constructor(name, options, mesh, solver)
    }
}
