//! Physical constants in SI units.

/// Electron mass (kg).
pub const ELECTRON_MASS: f64 = 9.109_383_701_5e-31;

/// Proton mass (kg).
pub const PROTON_MASS: f64 = 1.672_621_923_69e-27;

/// Elementary charge (C).
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;

/// Electron to proton mass ratio.
pub const ELECTRON_PROTON_MASS_RATIO: f64 = ELECTRON_MASS / PROTON_MASS;
