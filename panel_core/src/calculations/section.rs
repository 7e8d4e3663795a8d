//! # Sandwich Section Properties
//!
//! Derives the bending and shear stiffness of a sandwich panel strip from its
//! layer thicknesses and materials.
//!
//! ## Example
//!
//! ```rust
//! use panel_core::calculations::section::{PanelGeometry, SectionProperties};
//!
//! let geometry = PanelGeometry::default();
//! let section = SectionProperties::from_geometry(&geometry);
//!
//! // Symmetric skins put the neutral axis at core mid-depth
//! assert!(section.neutral_axis_mm.abs() < 1e-9);
//! assert!(section.ei_nmm2 > 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::section::{
    parallel_axis, rectangular_moment_of_inertia, self_weight_kpa, skin_centroids,
    skin_neutral_axis,
};
use crate::materials::{CoreMaterial, SkinSteel};

// =============================================================================
// GEOMETRY
// =============================================================================

/// Cross-section geometry and layer materials of one panel strip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelGeometry {
    /// Core thickness dc (mm)
    pub core_thickness_mm: f64,
    /// Outer (exposed) skin thickness t1 (mm)
    pub skin_outer_mm: f64,
    /// Inner skin thickness t2 (mm)
    pub skin_inner_mm: f64,
    /// Panel width b (mm)
    pub width_mm: f64,
    /// Skin material
    pub skin: SkinSteel,
    /// Core material
    pub core: CoreMaterial,
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self {
            core_thickness_mm: 50.0,
            skin_outer_mm: 0.45,
            skin_inner_mm: 0.45,
            width_mm: 1000.0,
            skin: SkinSteel::default(),
            core: CoreMaterial::default(),
        }
    }
}

// =============================================================================
// SECTION PROPERTIES
// =============================================================================

/// Derived stiffness properties of the sandwich section
///
/// All lengths in mm, stiffnesses in N·mm² (EI) and N (GA).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    /// Outer skin centroid from core mid-depth
    pub z_outer_mm: f64,
    /// Inner skin centroid from core mid-depth (negative)
    pub z_inner_mm: f64,
    /// Distance between skin centroids
    pub eccentricity_mm: f64,
    /// Outer skin area
    pub area_outer_mm2: f64,
    /// Inner skin area
    pub area_inner_mm2: f64,
    /// Core area
    pub area_core_mm2: f64,
    /// Neutral axis from core mid-depth
    pub neutral_axis_mm: f64,
    /// Flexural stiffness EI
    pub ei_nmm2: f64,
    /// Shear stiffness GA
    pub ga_n: f64,
    /// Equivalent second moment of area in skin material, EI / Ef
    pub i_eq_mm4: f64,
    /// Largest distance from the neutral axis to a skin centroid
    pub z_max_mm: f64,
    /// Self weight (kPa)
    pub self_weight_kpa: f64,
}

impl SectionProperties {
    /// Compute section properties. Negative thicknesses are treated as zero.
    pub fn from_geometry(geometry: &PanelGeometry) -> Self {
        let b = geometry.width_mm.max(0.0);
        let dc = geometry.core_thickness_mm.max(0.0);
        let t1 = geometry.skin_outer_mm.max(0.0);
        let t2 = geometry.skin_inner_mm.max(0.0);
        let ef = geometry.skin.modulus_mpa;
        let ec = geometry.core.modulus_mpa;

        let (z_out, z_in) = skin_centroids(dc, t1, t2);
        let area_out = b * t1;
        let area_in = b * t2;
        let area_core = b * dc;

        let z_na = skin_neutral_axis(area_out, z_out, area_in, z_in);

        let skins = parallel_axis(rectangular_moment_of_inertia(b, t1), area_out, z_out - z_na)
            + parallel_axis(rectangular_moment_of_inertia(b, t2), area_in, z_in - z_na);
        let core = parallel_axis(rectangular_moment_of_inertia(b, dc), area_core, z_na);
        let ei = ef * skins + ec * core;

        let i_eq = if ef > 0.0 { ei / ef } else { 0.0 };
        let z_max = (z_out - z_na).abs().max((z_in - z_na).abs());

        Self {
            z_outer_mm: z_out,
            z_inner_mm: z_in,
            eccentricity_mm: z_out - z_in,
            area_outer_mm2: area_out,
            area_inner_mm2: area_in,
            area_core_mm2: area_core,
            neutral_axis_mm: z_na,
            ei_nmm2: ei,
            ga_n: geometry.core.shear_modulus_mpa * area_core,
            i_eq_mm4: i_eq,
            z_max_mm: z_max,
            self_weight_kpa: self_weight_kpa(geometry.core.density_kg_m3, dc, t1, t2),
        }
    }

    /// Skin stress (MPa) at the extreme skin for a bending moment (N·mm)
    pub fn skin_stress(&self, moment_nmm: f64) -> f64 {
        moment_nmm.abs() * self.z_max_mm / self.i_eq_mm4.max(1e-9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        ((a - b) / b).abs() < tol
    }

    #[test]
    fn test_default_section() {
        let section = SectionProperties::from_geometry(&PanelGeometry::default());

        assert!(approx_eq(section.eccentricity_mm, 50.45, 1e-12));
        assert!(approx_eq(section.area_core_mm2, 50_000.0, 1e-12));
        assert!(approx_eq(section.ga_n, 175_000.0, 1e-12));

        // Skins dominate: Ef × 2 × A × (e/2)²
        let sandwich = 210_000.0 * 2.0 * 450.0 * (50.45_f64 / 2.0).powi(2);
        assert!(approx_eq(section.ei_nmm2, sandwich, 0.01));
        assert!(approx_eq(section.z_max_mm, 25.225, 1e-9));
    }

    #[test]
    fn test_ei_composition() {
        let geometry = PanelGeometry {
            core_thickness_mm: 80.0,
            skin_outer_mm: 0.6,
            skin_inner_mm: 0.4,
            width_mm: 1150.0,
            ..Default::default()
        };
        let s = SectionProperties::from_geometry(&geometry);

        let b = 1150.0;
        let (z1, z2) = (40.3, -40.2);
        let (a1, a2, ac) = (b * 0.6, b * 0.4, b * 80.0);
        let z_na = (a1 * z1 + a2 * z2) / (a1 + a2);
        let expected = 210_000.0
            * (b * 0.6_f64.powi(3) / 12.0 + a1 * (z1 - z_na).powi(2)
                + b * 0.4_f64.powi(3) / 12.0 + a2 * (z2 - z_na).powi(2))
            + 4.0 * (b * 80.0_f64.powi(3) / 12.0 + ac * z_na * z_na);

        assert!(approx_eq(s.neutral_axis_mm, z_na, 1e-12));
        assert!(approx_eq(s.ei_nmm2, expected, 1e-12));
        assert!(approx_eq(s.i_eq_mm4, expected / 210_000.0, 1e-12));
        // Thin skin is farther from the shifted axis
        assert!(approx_eq(s.z_max_mm, (z2 - z_na).abs(), 1e-12));
    }

    #[test]
    fn test_negative_thickness_clamped() {
        let geometry = PanelGeometry {
            skin_outer_mm: -1.0,
            ..Default::default()
        };
        let s = SectionProperties::from_geometry(&geometry);
        assert_eq!(s.area_outer_mm2, 0.0);
        assert!(s.ei_nmm2.is_finite());
    }

    #[test]
    fn test_skin_stress() {
        let s = SectionProperties::from_geometry(&PanelGeometry::default());
        let stress = s.skin_stress(-1.0e6);
        assert!(approx_eq(stress, 1.0e6 * s.z_max_mm / s.i_eq_mm4, 1e-12));
    }
}
