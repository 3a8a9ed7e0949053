//! Three-point stencils and face reconstruction.
//!
//! A [`Stencil1D`] holds the cell-centre value `c` and its neighbours `m`
//! (index − 1) and `p` (index + 1). A [`CellEdges`] scheme fills the
//! reconstructed values at the left (`left`, towards `m`) and right
//! (`right`, towards `p`) faces.
//!
//! All schemes are mirror symmetric: swapping `m` and `p` swaps `left` and
//! `right`.
//!
//! # Example
//! ```
//! use plasma_fv::fv::{CellEdges, MC, Stencil1D};
//!
//! let mut s = Stencil1D::new(1.0, 0.0, 2.0);
//! MC.reconstruct(&mut s);
//! assert!((s.left - 0.5).abs() < 1e-14);
//! assert!((s.right - 1.5).abs() < 1e-14);
//! ```

// =============================================================================
// Stencil
// =============================================================================

/// Centre value, neighbours and reconstructed face values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stencil1D {
    /// Cell centre
    pub c: f64,
    /// Lower neighbour
    pub m: f64,
    /// Upper neighbour
    pub p: f64,
    /// Reconstructed value at the lower face
    pub left: f64,
    /// Reconstructed value at the upper face
    pub right: f64,
}

impl Stencil1D {
    /// Stencil with faces not yet reconstructed.
    #[inline]
    pub fn new(c: f64, m: f64, p: f64) -> Self {
        Self {
            c,
            m,
            p,
            left: c,
            right: c,
        }
    }

    /// Stencil with `m` and `p` (and the faces) swapped.
    #[inline]
    pub fn mirrored(&self) -> Self {
        Self {
            c: self.c,
            m: self.p,
            p: self.m,
            left: self.right,
            right: self.left,
        }
    }
}

// =============================================================================
// Limiter functions
// =============================================================================

/// Minmod of two values.
#[inline]
pub fn minmod2(a: f64, b: f64) -> f64 {
    if a > 0.0 && b > 0.0 {
        a.min(b)
    } else if a < 0.0 && b < 0.0 {
        a.max(b)
    } else {
        0.0
    }
}

/// Minmod of three values: the smallest magnitude if all share a sign, else 0.
#[inline]
pub fn minmod3(a: f64, b: f64, c: f64) -> f64 {
    if a > 0.0 && b > 0.0 && c > 0.0 {
        a.min(b).min(c)
    } else if a < 0.0 && b < 0.0 && c < 0.0 {
        a.max(b).max(c)
    } else {
        0.0
    }
}

// =============================================================================
// Reconstruction Trait
// =============================================================================

/// Reconstruction of face values from a three-point stencil.
///
/// # Extending
///
/// 1. Create a (usually zero-sized) struct
/// 2. Implement `CellEdges` for it
/// 3. Optionally add it to [`StandardCellEdges`] for runtime selection
pub trait CellEdges: Send + Sync {
    /// Fill `s.left` and `s.right` from `s.c`, `s.m`, `s.p`.
    fn reconstruct(&self, s: &mut Stencil1D);

    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Formal order of accuracy in smooth regions.
    fn order(&self) -> usize {
        2
    }
}

/// First-order upwind: both faces take the centre value.
#[derive(Clone, Copy, Debug, Default)]
pub struct Upwind;

impl CellEdges for Upwind {
    #[inline]
    fn reconstruct(&self, s: &mut Stencil1D) {
        s.left = s.c;
        s.right = s.c;
    }

    fn name(&self) -> &'static str {
        "upwind"
    }

    fn order(&self) -> usize {
        1
    }
}

/// Fromm's method: unlimited central slope.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fromm;

impl CellEdges for Fromm {
    #[inline]
    fn reconstruct(&self, s: &mut Stencil1D) {
        s.left = s.c - 0.25 * (s.p - s.m);
        s.right = s.c + 0.25 * (s.p - s.m);
    }

    fn name(&self) -> &'static str {
        "fromm"
    }
}

/// Minmod-limited slope.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinMod;

impl CellEdges for MinMod {
    #[inline]
    fn reconstruct(&self, s: &mut Stencil1D) {
        let slope = minmod2(s.p - s.c, s.c - s.m);
        s.left = s.c - 0.5 * slope;
        s.right = s.c + 0.5 * slope;
    }

    fn name(&self) -> &'static str {
        "minmod"
    }
}

/// Monotonized central limiter.
///
/// `slope = minmod(2(p − c), (p − m)/2, 2(c − m))`. Second order in smooth
/// regions, first order at extrema.
#[derive(Clone, Copy, Debug, Default)]
pub struct MC;

impl CellEdges for MC {
    #[inline]
    fn reconstruct(&self, s: &mut Stencil1D) {
        let slope = minmod3(2.0 * (s.p - s.c), 0.5 * (s.p - s.m), 2.0 * (s.c - s.m));
        s.left = s.c - 0.5 * slope;
        s.right = s.c + 0.5 * slope;
    }

    fn name(&self) -> &'static str {
        "mc"
    }
}

// =============================================================================
// Standard Enum (Zero-Cost Dispatch)
// =============================================================================

/// Enum wrapper for the built-in reconstruction schemes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardCellEdges {
    /// First order
    Upwind,
    /// Unlimited central slope
    Fromm,
    /// Minmod limiter
    MinMod,
    /// Monotonized central limiter
    #[default]
    #[serde(rename = "mc")]
    MC,
}

impl CellEdges for StandardCellEdges {
    #[inline]
    fn reconstruct(&self, s: &mut Stencil1D) {
        match self {
            StandardCellEdges::Upwind => Upwind.reconstruct(s),
            StandardCellEdges::Fromm => Fromm.reconstruct(s),
            StandardCellEdges::MinMod => MinMod.reconstruct(s),
            StandardCellEdges::MC => MC.reconstruct(s),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            StandardCellEdges::Upwind => Upwind.name(),
            StandardCellEdges::Fromm => Fromm.name(),
            StandardCellEdges::MinMod => MinMod.name(),
            StandardCellEdges::MC => MC.name(),
        }
    }

    fn order(&self) -> usize {
        match self {
            StandardCellEdges::Upwind => 1,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-14;

    fn all_schemes() -> [StandardCellEdges; 4] {
        [
            StandardCellEdges::Upwind,
            StandardCellEdges::Fromm,
            StandardCellEdges::MinMod,
            StandardCellEdges::MC,
        ]
    }

    #[test]
    fn test_constant_stencil_is_exact() {
        for scheme in all_schemes() {
            let mut s = Stencil1D::new(3.0, 3.0, 3.0);
            scheme.reconstruct(&mut s);
            assert!((s.left - 3.0).abs() < TOL, "{}", scheme.name());
            assert!((s.right - 3.0).abs() < TOL, "{}", scheme.name());
        }
    }

    #[test]
    fn test_linear_profile_second_order() {
        // Second-order schemes reproduce linear data at faces
        for scheme in [StandardCellEdges::Fromm, StandardCellEdges::MinMod, StandardCellEdges::MC] {
            let mut s = Stencil1D::new(2.0, 1.0, 3.0);
            scheme.reconstruct(&mut s);
            assert!((s.left - 1.5).abs() < TOL, "{}", scheme.name());
            assert!((s.right - 2.5).abs() < TOL, "{}", scheme.name());
        }
    }

    #[test]
    fn test_mc_flat_at_extremum() {
        let mut s = Stencil1D::new(2.0, 1.0, 1.5);
        MC.reconstruct(&mut s);
        assert_eq!(s.left, 2.0);
        assert_eq!(s.right, 2.0);
    }

    #[test]
    fn test_mc_limits_steep_gradient() {
        // Central slope (p - m)/2 = 5 exceeds 2(c - m) = 2
        let mut s = Stencil1D::new(1.0, 0.0, 10.0);
        MC.reconstruct(&mut s);
        assert!((s.left - 0.0).abs() < TOL);
        assert!((s.right - 2.0).abs() < TOL);
    }

    #[test]
    fn test_mirror_symmetry() {
        let samples = [
            (1.0, 0.0, 10.0),
            (0.3, -0.2, 0.9),
            (5.0, 4.0, 1.0),
            (-1.0, 2.0, -3.0),
            (0.0, 0.0, 1.0),
        ];
        for scheme in all_schemes() {
            for &(c, m, p) in &samples {
                let mut s = Stencil1D::new(c, m, p);
                scheme.reconstruct(&mut s);
                let mut mirror = Stencil1D::new(c, p, m);
                scheme.reconstruct(&mut mirror);
                assert_eq!(s.mirrored(), mirror, "{} at {:?}", scheme.name(), (c, m, p));
            }
        }
    }

    #[test]
    fn test_deserialize_scheme() {
        let kind: StandardCellEdges = serde_json::from_str("\"min_mod\"").unwrap();
        assert_eq!(kind, StandardCellEdges::MinMod);
        let kind: StandardCellEdges = serde_json::from_str("\"mc\"").unwrap();
        assert_eq!(kind, StandardCellEdges::MC);
    }
}
