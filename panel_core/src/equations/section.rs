//! # Sandwich Section Formulas
//!
//! Geometric and stiffness properties of a three-layer sandwich cross-section:
//! two thin steel skins bonded to a soft core.
//!
//! ```text
//!   ────────────────────────  outer skin, t1   z_out = +(dc/2 + t1/2)
//!   ░░░░░░░░░░░░░░░░░░░░░░░░
//!   ░░░░░░░ core, dc ░░░░░░░  z = 0 at core mid-depth
//!   ░░░░░░░░░░░░░░░░░░░░░░░░
//!   ────────────────────────  inner skin, t2   z_in = -(dc/2 + t2/2)
//!   |<-------- b --------->|
//! ```
//!
//! ## Notation
//!
//! - `b` = Panel width
//! - `dc` = Core thickness
//! - `t1`, `t2` = Outer and inner skin thickness
//! - `Ef`, `Ec`, `Gc` = Skin modulus, core modulus, core shear modulus
//!
//! ## References
//!
//! - EN 14509:2013 Annex E, Sandwich panel design
//! - Davies (ed.), Lightweight Sandwich Construction, ch. 3

/// Density of the steel skins (kg/m³)
pub const STEEL_DENSITY: f64 = 7850.0;

/// Standard gravity (m/s²)
pub const GRAVITY: f64 = 9.81;

/// Second moment of area of a rectangle about its own centroid
///
/// # Formula
/// I = b × d³ / 12
#[inline]
pub fn rectangular_moment_of_inertia(b: f64, d: f64) -> f64 {
    b * d.powi(3) / 12.0
}

/// Parallel axis theorem
///
/// # Formula
/// I = I_own + A × d²
#[inline]
pub fn parallel_axis(i_own: f64, area: f64, offset: f64) -> f64 {
    i_own + area * offset * offset
}

/// Skin centroid positions `(z_out, z_in)` measured from core mid-depth
#[inline]
pub fn skin_centroids(core: f64, skin_out: f64, skin_in: f64) -> (f64, f64) {
    (core / 2.0 + skin_out / 2.0, -(core / 2.0 + skin_in / 2.0))
}

/// Neutral axis of the skins alone, weighted by skin area
///
/// The soft core is ignored when locating the axis. Returns 0 when both skins
/// have zero area.
pub fn skin_neutral_axis(area_out: f64, z_out: f64, area_in: f64, z_in: f64) -> f64 {
    let total = area_out + area_in;
    if total > 0.0 {
        (area_out * z_out + area_in * z_in) / total
    } else {
        0.0
    }
}

/// Face wrinkling stress of a skin on an elastic core
///
/// # Formula
/// σw = 0.5 × √(Ef × Ec × Gc)
///
/// A negative shear modulus is treated as zero.
#[inline]
pub fn wrinkling_stress(ef: f64, ec: f64, gc: f64) -> f64 {
    0.5 * (ef * ec * gc.max(0.0)).sqrt()
}

/// Panel self weight as an area load (kPa)
///
/// # Formula
/// g = (ρc × dc + ρs × (t1 + t2)) × g₀ / 10⁶
///
/// Thicknesses in mm, core density in kg/m³.
pub fn self_weight_kpa(core_density: f64, core: f64, skin_out: f64, skin_in: f64) -> f64 {
    let mass_per_area = core_density * core / 1000.0 + STEEL_DENSITY * (skin_out + skin_in) / 1000.0;
    mass_per_area * GRAVITY / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_skins_centre_neutral_axis() {
        let (z_out, z_in) = skin_centroids(50.0, 0.5, 0.5);
        assert!((z_out - 25.25).abs() < 1e-12);
        assert!((z_in + 25.25).abs() < 1e-12);
        let z_na = skin_neutral_axis(500.0, z_out, 500.0, z_in);
        assert!(z_na.abs() < 1e-12);
    }

    #[test]
    fn test_unequal_skins_shift_axis_outward() {
        let (z_out, z_in) = skin_centroids(50.0, 0.6, 0.4);
        let z_na = skin_neutral_axis(600.0, z_out, 400.0, z_in);
        assert!(z_na > 0.0);
    }

    #[test]
    fn test_no_skins_neutral_axis_is_zero() {
        assert_eq!(skin_neutral_axis(0.0, 25.0, 0.0, -25.0), 0.0);
    }

    #[test]
    fn test_wrinkling_stress() {
        let sigma = wrinkling_stress(210000.0, 4.0, 3.5);
        assert!((sigma - 0.5 * (2.94e6_f64).sqrt()).abs() < 1e-9);
        assert_eq!(wrinkling_stress(210000.0, 4.0, -1.0), 0.0);
    }

    #[test]
    fn test_self_weight() {
        // 42 kg/m³ × 0.05 m + 7850 × 0.0009 m = 9.165 kg/m²
        let g = self_weight_kpa(42.0, 50.0, 0.45, 0.45);
        assert!((g - 9.165 * 9.81 / 1000.0).abs() < 1e-12);
    }
}
