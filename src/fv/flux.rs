//! Wave-speed limited face fluxes.
//!
//! Each cell computes the flux through its own upper and lower faces from its
//! reconstructed face values. A face between cells `j` and `j+1` is therefore
//! visited twice: once as the upper face of `j` (using `j`'s reconstruction)
//! and once as the lower face of `j+1`. Each visit splits the flux by the sign
//! of the characteristics:
//!
//! | regime              | upper face of `j`            | lower face of `j+1`          |
//! |---------------------|------------------------------|------------------------------|
//! | `vpar > amax`       | `q · vpar`                   | `0`                          |
//! | `vpar < -amax`      | `0`                          | `q · vpar`                   |
//! | otherwise           | `q · ½(vpar + amax)`         | `q · ½(vpar − amax)`         |
//!
//! where `vpar` is the mean of the two cell-centre velocities, `amax` the
//! larger of the two wave speeds, and `q` the carried quantity at the face as
//! defined by a [`FluxKernel`].

// =============================================================================
// Boundary flux mode
// =============================================================================

/// Flux through a face that lies on a non-periodic domain edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryFluxMode {
    /// Flux from the face mid-point value and the mean velocity only.
    #[default]
    FixedFlux,
    /// Reconstructed flux plus a wave-speed weighted correction towards the
    /// mid-point value.
    FluxCorrection,
}

impl From<bool> for BoundaryFluxMode {
    /// `true` selects [`FixedFlux`](BoundaryFluxMode::FixedFlux).
    fn from(fixflux: bool) -> Self {
        if fixflux {
            BoundaryFluxMode::FixedFlux
        } else {
            BoundaryFluxMode::FluxCorrection
        }
    }
}

// =============================================================================
// Flux kernel
// =============================================================================

/// What a face flux carries, given reconstructed face values.
///
/// # Extending
///
/// Kernels are zero-sized types; the accumulator is generic over them so the
/// per-face call is monomorphised.
pub trait FluxKernel: Send + Sync {
    /// Carried quantity from the reconstructed advected value `f` and the
    /// reconstructed velocity `v` on the same face.
    fn carried(&self, f: f64, v: f64) -> f64;

    /// Carried quantity at a domain edge from the face mid-point value of the
    /// advected field and the mean velocity.
    fn edge_carried(&self, f_mid: f64, vpar: f64) -> f64;

    /// Whether [`carried`](Self::carried) uses the velocity reconstruction.
    fn needs_velocity_edges(&self) -> bool;

    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;
}

/// Advection of `f` by `v`: flux `f · v`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Advection;

impl FluxKernel for Advection {
    #[inline(always)]
    fn carried(&self, f: f64, _v: f64) -> f64 {
        f
    }

    #[inline(always)]
    fn edge_carried(&self, f_mid: f64, _vpar: f64) -> f64 {
        f_mid
    }

    fn needs_velocity_edges(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "advection"
    }
}

/// Momentum advection: flux `f · v · v`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MomentumAdvection;

impl FluxKernel for MomentumAdvection {
    #[inline(always)]
    fn carried(&self, f: f64, v: f64) -> f64 {
        f * v
    }

    #[inline(always)]
    fn edge_carried(&self, f_mid: f64, vpar: f64) -> f64 {
        f_mid * vpar
    }

    fn needs_velocity_edges(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "momentum-advection"
    }
}

// =============================================================================
// Face fluxes
// =============================================================================

/// Face-centred velocity and wave speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceSpeeds {
    /// Mean of the two cell-centre velocities
    pub vpar: f64,
    /// Larger of the two wave speeds
    pub amax: f64,
}

impl FaceSpeeds {
    /// Face speeds from the values in the two cells sharing the face.
    #[inline(always)]
    pub fn new(v_c: f64, v_nb: f64, a_c: f64, a_nb: f64) -> Self {
        Self {
            vpar: 0.5 * (v_c + v_nb),
            amax: a_c.max(a_nb),
        }
    }
}

/// Flux through the upper face of a cell carrying `q`.
#[inline(always)]
pub fn upper_face_flux(q: f64, speeds: FaceSpeeds) -> f64 {
    let FaceSpeeds { vpar, amax } = speeds;
    if vpar > amax {
        // Supersonic outflow
        q * vpar
    } else if vpar < -amax {
        // Supersonic inflow, supplied by the neighbour
        0.0
    } else {
        q * 0.5 * (vpar + amax)
    }
}

/// Flux through the lower face of a cell carrying `q`.
#[inline(always)]
pub fn lower_face_flux(q: f64, speeds: FaceSpeeds) -> f64 {
    let FaceSpeeds { vpar, amax } = speeds;
    if vpar < -amax {
        q * vpar
    } else if vpar > amax {
        0.0
    } else {
        q * 0.5 * (vpar - amax)
    }
}

/// Flux through the upper face of the last cell before a domain edge.
///
/// `q` is the reconstructed carried quantity, `q_mid` the carried quantity at
/// the face mid-point and `a_c` the wave speed in the cell.
#[inline]
pub fn upper_edge_flux(mode: BoundaryFluxMode, q: f64, q_mid: f64, vpar: f64, a_c: f64) -> f64 {
    match mode {
        BoundaryFluxMode::FixedFlux => q_mid * vpar,
        BoundaryFluxMode::FluxCorrection => q * vpar + a_c * (q - q_mid),
    }
}

/// Flux through the lower face of the first cell after a domain edge.
#[inline]
pub fn lower_edge_flux(mode: BoundaryFluxMode, q: f64, q_mid: f64, vpar: f64, a_c: f64) -> f64 {
    match mode {
        BoundaryFluxMode::FixedFlux => q_mid * vpar,
        BoundaryFluxMode::FluxCorrection => q * vpar - a_c * (q - q_mid),
    }
}
