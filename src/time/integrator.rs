//! Explicit time integration of evolving plasma fields.
//!
//! - [`Integrable`]: vector-space operations on a state
//! - [`TimeIntegrator`]: advance a state by one step with a fallible RHS
//! - [`SSPRK3`], [`ForwardEuler`], [`StandardIntegrator`]: explicit schemes
//!
//! # Example
//! ```
//! use plasma_fv::field::Field3D;
//! use plasma_fv::mesh::MeshBuilder;
//! use plasma_fv::time::{Integrable, TimeIntegrator, SSPRK3};
//!
//! let mesh = MeshBuilder::new(2, 2, 1).build();
//! let mut n = Field3D::filled(&mesh, 1.0);
//!
//! // dn/dt = -n
//! SSPRK3
//!     .step(&mut n, 0.01, 0.0, |state: &Field3D, _t| {
//!         let mut rhs = state.clone();
//!         rhs.scale(-1.0);
//!         Ok::<_, std::convert::Infallible>(rhs)
//!     })
//!     .unwrap();
//! assert!(n[(2, 2, 0)] < 1.0);
//! ```

use serde::Deserialize;

use crate::field::Field3D;

// =============================================================================
// Integrable state
// =============================================================================

/// Solution types that can be time-integrated.
///
/// - `scale`: `x <- c * x`
/// - `axpy`: `x <- x + c * y`
pub trait Integrable: Clone + Send + Sized {
    /// `self <- c * self`
    fn scale(&mut self, c: f64);

    /// `self <- self + c * other`
    fn axpy(&mut self, c: f64, other: &Self);

    /// Zero-initialized solution with the same shape.
    fn zeros_like(&self) -> Self {
        let mut result = self.clone();
        result.scale(0.0);
        result
    }
}

impl Integrable for Field3D {
    fn scale(&mut self, c: f64) {
        Field3D::scale(self, c);
    }

    fn axpy(&mut self, c: f64, other: &Self) {
        Field3D::axpy(self, c, other);
    }
}

// =============================================================================
// Scheme metadata
// =============================================================================

/// Properties of a scheme that do not depend on the state type.
pub trait IntegratorInfo: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Order of accuracy.
    fn order(&self) -> usize;

    /// Number of RHS evaluations per step.
    fn n_stages(&self) -> usize;

    /// Whether the integrator is strong stability preserving.
    fn is_ssp(&self) -> bool;

    /// Times at which the RHS is evaluated relative to the current time.
    fn stage_times(&self, dt: f64) -> Vec<f64>;
}

// =============================================================================
// Stepping
// =============================================================================

/// Explicit time integrators.
///
/// The RHS receives a stage state and time and returns the time derivative,
/// or an error that aborts the step. On error `state` is left unchanged.
pub trait TimeIntegrator<S: Integrable>: IntegratorInfo {
    /// Advance `state` from `t` to `t + dt`.
    fn step<F, E>(&self, state: &mut S, dt: f64, t: f64, rhs: F) -> Result<(), E>
    where
        F: FnMut(&S, f64) -> Result<S, E>;
}

// =============================================================================
// SSP-RK3
// =============================================================================

/// Strong Stability Preserving Runge-Kutta 3rd order (Shu-Osher form).
///
/// ```text
/// u1 = u + dt * L(u, t)
/// u2 = 3/4 * u + 1/4 * u1 + 1/4 * dt * L(u1, t + dt)
/// u_new = 1/3 * u + 2/3 * u2 + 2/3 * dt * L(u2, t + dt/2)
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SSPRK3;

impl IntegratorInfo for SSPRK3 {
    fn name(&self) -> &'static str {
        "ssp-rk3"
    }

    fn order(&self) -> usize {
        3
    }

    fn n_stages(&self) -> usize {
        3
    }

    fn is_ssp(&self) -> bool {
        true
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        vec![0.0, dt, 0.5 * dt]
    }
}

impl<S: Integrable> TimeIntegrator<S> for SSPRK3 {
    fn step<F, E>(&self, state: &mut S, dt: f64, t: f64, mut rhs: F) -> Result<(), E>
    where
        F: FnMut(&S, f64) -> Result<S, E>,
    {
        let l_u = rhs(state, t)?;
        let mut u1 = state.clone();
        u1.axpy(dt, &l_u);

        let l_u1 = rhs(&u1, t + dt)?;
        let mut u2 = state.clone();
        u2.scale(0.75);
        u2.axpy(0.25, &u1);
        u2.axpy(0.25 * dt, &l_u1);

        let l_u2 = rhs(&u2, t + 0.5 * dt)?;
        state.scale(1.0 / 3.0);
        state.axpy(2.0 / 3.0, &u2);
        state.axpy(2.0 / 3.0 * dt, &l_u2);
        Ok(())
    }
}

// =============================================================================
// Forward Euler
// =============================================================================

/// Forward Euler (1st order).
///
/// ```text
/// u_new = u + dt * L(u, t)
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardEuler;

impl IntegratorInfo for ForwardEuler {
    fn name(&self) -> &'static str {
        "forward-euler"
    }

    fn order(&self) -> usize {
        1
    }

    fn n_stages(&self) -> usize {
        1
    }

    fn is_ssp(&self) -> bool {
        true
    }

    fn stage_times(&self, _dt: f64) -> Vec<f64> {
        vec![0.0]
    }
}

impl<S: Integrable> TimeIntegrator<S> for ForwardEuler {
    fn step<F, E>(&self, state: &mut S, dt: f64, t: f64, mut rhs: F) -> Result<(), E>
    where
        F: FnMut(&S, f64) -> Result<S, E>,
    {
        let l_u = rhs(state, t)?;
        state.axpy(dt, &l_u);
        Ok(())
    }
}

// =============================================================================
// Standard Integrator Enum
// =============================================================================

/// Built-in integrators, selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum StandardIntegrator {
    #[default]
    #[serde(rename = "ssp_rk3")]
    SSPRK3,
    #[serde(rename = "forward_euler")]
    ForwardEuler,
}

impl IntegratorInfo for StandardIntegrator {
    fn name(&self) -> &'static str {
        match self {
            StandardIntegrator::SSPRK3 => SSPRK3.name(),
            StandardIntegrator::ForwardEuler => ForwardEuler.name(),
        }
    }

    fn order(&self) -> usize {
        match self {
            StandardIntegrator::SSPRK3 => 3,
            StandardIntegrator::ForwardEuler => 1,
        }
    }

    fn n_stages(&self) -> usize {
        match self {
            StandardIntegrator::SSPRK3 => 3,
            StandardIntegrator::ForwardEuler => 1,
        }
    }

    fn is_ssp(&self) -> bool {
        true
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        match self {
            StandardIntegrator::SSPRK3 => SSPRK3.stage_times(dt),
            StandardIntegrator::ForwardEuler => ForwardEuler.stage_times(dt),
        }
    }
}

impl<S: Integrable> TimeIntegrator<S> for StandardIntegrator {
    fn step<F, E>(&self, state: &mut S, dt: f64, t: f64, rhs: F) -> Result<(), E>
    where
        F: FnMut(&S, f64) -> Result<S, E>,
    {
        match self {
            StandardIntegrator::SSPRK3 => SSPRK3.step(state, dt, t, rhs),
            StandardIntegrator::ForwardEuler => ForwardEuler.step(state, dt, t, rhs),
        }
    }
}

/// Boxed integrator info.
///
/// `TimeIntegrator` itself is not dyn-compatible because `step` is generic;
/// use [`StandardIntegrator`] for runtime selection.
pub type BoxedIntegratorInfo = Box<dyn IntegratorInfo>;

/// Boxed info for a standard integrator.
pub fn create_integrator_info(integrator: StandardIntegrator) -> BoxedIntegratorInfo {
    match integrator {
        StandardIntegrator::SSPRK3 => Box::new(SSPRK3),
        StandardIntegrator::ForwardEuler => Box::new(ForwardEuler),
    }
}
