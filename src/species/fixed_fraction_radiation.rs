//! Impurity radiation at a fixed fraction of the electron density.
//!
//! The impurity density is `fraction * Ne`; the radiated power density is
//! `Ne * Ni * L(Te)` with `L` a cooling curve in W m^3. The loss is removed
//! from the electron energy source.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::json;

use crate::component::{Access, Component};
use crate::constants::ELEMENTARY_CHARGE;
use crate::error::Result;
use crate::field::{Field3D, Region, cell_average};
use crate::options::Options;
use crate::output::Dump;
use crate::state::{Quantity, SimulationState, StateKey};
use crate::time::Variables;

const ELECTRONS: &str = "e";

// =============================================================================
// Cooling curves
// =============================================================================

/// Radiation cooling curve.
pub trait CoolingCurve: Send + Sync {
    /// Cooling rate [W m^3] at electron temperature `te` [eV].
    fn curve(&self, te: f64) -> f64;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Carbon in coronal equilibrium.
///
/// I. H. Hutchinson, Nucl. Fusion 34 (10) 1337-1348 (1994).
#[derive(Clone, Copy, Debug, Default)]
pub struct HutchinsonCarbon;

impl CoolingCurve for HutchinsonCarbon {
    fn curve(&self, te: f64) -> f64 {
        if te < 0.0 {
            return 0.0;
        }
        let t = te / 10.0;
        2e-31 * t.powi(3) / (1.0 + t.powf(4.5))
    }

    fn name(&self) -> &'static str {
        "hutchinson_carbon"
    }
}

/// Polynomial fit of `ln L` in `ln Te`, constant outside the fitted range.
///
/// Fits to ADAS data at `N = 1e20 m^-3`, `tau = 0.5 ms`, representative of a
/// tokamak scrape-off layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdasFit {
    /// Lower end of the fitted range [eV]
    pub t_min: f64,
    /// Upper end of the fitted range [eV]
    pub t_max: f64,
    /// Coefficients of `ln(Te)^0 .. ln(Te)^10`
    pub coefficients: [f64; 11],
    /// Value below `t_min`
    pub below: f64,
    /// Value above `t_max`
    pub above: f64,
}

impl AdasFit {
    /// Evaluate the fit at `te` [eV].
    pub fn evaluate(&self, te: f64) -> f64 {
        if te < self.t_min {
            self.below
        } else if te > self.t_max {
            self.above
        } else {
            let log_t = te.ln();
            let log_l = self
                .coefficients
                .iter()
                .rev()
                .fold(0.0, |acc, &c| acc * log_t + c);
            log_l.exp()
        }
    }
}

const ARGON_FIT: AdasFit = AdasFit {
    t_min: 1.5,
    t_max: 1500.0,
    coefficients: [
        -8.45410692e+01,
        1.57727040e+01,
        -1.54264860e+01,
        1.49409902e+01,
        -1.04815113e+01,
        5.00924595e+00,
        -1.60029106e+00,
        3.29455609e-01,
        -4.14036827e-02,
        2.87063206e-03,
        -8.38888002e-05,
    ],
    below: 1.95353412e-35,
    above: 1.22649600e-32,
};

const NEON_FIT: AdasFit = AdasFit {
    t_min: 2.0,
    t_max: 1000.0,
    coefficients: [
        -8.21475117e+01,
        1.28929854e+01,
        -4.74266289e+01,
        7.45222324e+01,
        -5.75710722e+01,
        2.57375965e+01,
        -7.12758563e+00,
        1.24287546e+00,
        -1.32943407e-01,
        7.97368445e-03,
        -2.05487897e-04,
    ],
    below: 6.35304113e-36,
    above: 1.17894628e-32,
};

const NITROGEN_FIT: AdasFit = AdasFit {
    t_min: 2.0,
    t_max: 500.0,
    coefficients: [
        -5.01649969e+01,
        -1.35749724e+02,
        2.73509608e+02,
        -2.92109992e+02,
        1.90120639e+02,
        -7.95164871e+01,
        2.17762218e+01,
        -3.88334992e+00,
        4.34730098e-01,
        -2.77683605e-02,
        7.72720422e-04,
    ],
    below: 4.34835380e-34,
    above: 8.11096182e-33,
};

const CARBON_FIT: AdasFit = AdasFit {
    t_min: 1.0,
    t_max: 500.0,
    coefficients: [
        -7.87837896e+01,
        1.55326376e+00,
        1.65898194e+01,
        -3.23804546e+01,
        3.12784663e+01,
        -1.74826039e+01,
        5.91393245e+00,
        -1.22974105e+00,
        1.54004499e-01,
        -1.06797106e-02,
        3.15657594e-04,
    ],
    below: 6.00623928e-35,
    above: 4.53057707e-33,
};

macro_rules! adas_curve {
    ($(#[$doc:meta])* $name:ident, $fit:expr, $label:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $name;

        impl CoolingCurve for $name {
            fn curve(&self, te: f64) -> f64 {
                $fit.evaluate(te)
            }

            fn name(&self) -> &'static str {
                $label
            }
        }
    };
}

adas_curve!(
    /// Argon, ADAS fit on [1.5, 1500] eV.
    Argon, ARGON_FIT, "argon"
);
adas_curve!(
    /// Neon, ADAS fit on [2, 1000] eV.
    Neon, NEON_FIT, "neon"
);
adas_curve!(
    /// Nitrogen, ADAS fit on [2, 500] eV.
    Nitrogen, NITROGEN_FIT, "nitrogen"
);
adas_curve!(
    /// Carbon, ADAS fit on [1, 500] eV.
    Carbon, CARBON_FIT, "carbon"
);

// =============================================================================
// Component
// =============================================================================

/// Options of section `<name>`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RadiationConfig {
    /// Impurity density as a fraction of the electron density
    #[serde(default)]
    pub fraction: f64,

    /// Output the radiation diagnostic `R<name>`
    #[serde(default)]
    pub diagnose: bool,
}

/// Fixed-fraction impurity radiation with cooling curve `C`.
///
/// Reads electron density and temperature, subtracts the radiated power from
/// the electron energy source.
#[derive(Debug)]
pub struct FixedFractionRadiation<C: CoolingCurve> {
    name: String,
    cooling: C,
    config: RadiationConfig,
    /// Temperature normalisation [eV]
    tnorm: f64,
    /// Density normalisation [m^-3]
    nnorm: f64,
    /// Frequency normalisation [s^-1]
    freq_norm: f64,
    /// Last computed radiation (normalised), for output
    radiation: Option<Field3D>,
}

impl<C: CoolingCurve> FixedFractionRadiation<C> {
    pub fn new(name: &str, options: &Options, cooling: C) -> Result<Self> {
        let config: RadiationConfig = options.section(name)?;
        let units = options.units()?;
        tracing::debug!(
            name,
            curve = cooling.name(),
            fraction = config.fraction,
            "Fixed fraction radiation"
        );
        Ok(Self {
            name: name.to_string(),
            cooling,
            config,
            tnorm: units.ev,
            nnorm: units.inv_meters_cubed,
            freq_norm: units.frequency(),
            radiation: None,
        })
    }

    /// Last computed radiation, if any.
    pub fn radiation(&self) -> Option<&Field3D> {
        self.radiation.as_ref()
    }

    /// Normalised radiated power density.
    fn power(&self, ne: &Field3D, te: &Field3D) -> Field3D {
        let fraction = self.config.fraction;
        let scale = self.nnorm / (ELEMENTARY_CHARGE * self.tnorm * self.freq_norm);
        cell_average(
            |ne, te| {
                if ne < 0.0 || te < 0.0 {
                    return 0.0;
                }
                let ni = fraction * ne;
                // Cooling in W m^3; qe converts W to eV/s
                ne * ni * self.cooling.curve(te * self.tnorm) * scale
            },
            ne,
            te,
            Region::NoBoundary,
        )
    }
}

impl<C: CoolingCurve> Component for FixedFractionRadiation<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn access(&self) -> Access {
        Access::new()
            .read(StateKey::species(ELECTRONS, Quantity::Density))
            .read(StateKey::species(ELECTRONS, Quantity::Temperature))
            .accumulate(StateKey::species(ELECTRONS, Quantity::EnergySource))
    }

    fn transform(&mut self, _variables: &Variables, state: &mut SimulationState) -> Result<()> {
        let radiation = {
            let ne = state.require_field(&self.name, ELECTRONS, Quantity::Density)?;
            let te = state.require_field(&self.name, ELECTRONS, Quantity::Temperature)?;
            self.power(ne, te)
        };

        let electrons = state.species_mut(ELECTRONS);
        electrons.energy_source = Some(match electrons.energy_source.take() {
            Some(source) => source - &radiation,
            None => -&radiation,
        });
        self.radiation = Some(radiation);
        Ok(())
    }

    fn output_vars(&self, dump: &mut Dump) {
        if !self.config.diagnose {
            return;
        }
        if let Some(radiation) = &self.radiation {
            let key = format!("R{}", self.name);
            dump.add_repeat(&key, radiation.clone());
            let attributes: BTreeMap<&str, _> = BTreeMap::from([
                ("time_dimension", json!("t")),
                ("units", json!("W / m^3")),
                (
                    "conversion",
                    json!(ELEMENTARY_CHARGE * self.tnorm * self.nnorm * self.freq_norm),
                ),
                ("long_name", json!(format!("Radiation cooling {}", self.name))),
                ("source", json!("fixed_fraction_radiation")),
            ]);
            dump.set_attributes(&key, attributes);
        }
    }
}
