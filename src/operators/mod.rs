//! Finite-difference and finite-volume operators used by the species drivers.
//!
//! - [`grad_par`], [`ddx`], [`ddz`], [`d4dz4`]: central differences
//! - [`div_perp_lap_fv_index`]: index-space perpendicular diffusion
//! - [`div_n_bxgrad_f_b_xppm`]: ExB advection

mod derivatives;
mod exb;
mod perp;

pub use derivatives::{d4dz4, ddx, ddz, grad_par};
pub use exb::div_n_bxgrad_f_b_xppm;
pub use perp::div_perp_lap_fv_index;
