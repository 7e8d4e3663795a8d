//! # Panel Materials
//!
//! Material properties for the two layers of a sandwich panel and the partial
//! safety factors applied to their resistances.
//!
//! ## Material Types
//!
//! - **Skin steel**: Thin cold-formed steel sheet, linear elastic up to yield
//! - **Core**: Rigid foam or mineral wool, carries shear and local bearing
//!
//! ## Example
//!
//! ```rust
//! use panel_core::materials::{CoreMaterial, MaterialFactors, SkinSteel};
//!
//! let skin = SkinSteel::default();
//! let factors = MaterialFactors::default();
//! let design_yield = skin.yield_strength_mpa / factors.yield_strength;
//! assert!((design_yield - 280.0 / 1.1).abs() < 1e-9);
//!
//! let core = CoreMaterial::default();
//! assert_eq!(core.shear_modulus_mpa, 3.5);
//! ```

use serde::{Deserialize, Serialize};

/// Steel skin properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinSteel {
    /// Elastic modulus Ef (MPa)
    pub modulus_mpa: f64,
    /// Yield strength fy (MPa)
    pub yield_strength_mpa: f64,
}

impl Default for SkinSteel {
    fn default() -> Self {
        Self {
            modulus_mpa: 210_000.0,
            yield_strength_mpa: 280.0,
        }
    }
}

/// Core layer properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreMaterial {
    /// Elastic modulus Ec (MPa)
    pub modulus_mpa: f64,
    /// Shear modulus Gc (MPa)
    pub shear_modulus_mpa: f64,
    /// Shear strength fCv (MPa)
    pub shear_strength_mpa: f64,
    /// Compressive (crushing) strength fCc (MPa)
    pub crush_strength_mpa: f64,
    /// Density (kg/m³)
    pub density_kg_m3: f64,
}

impl Default for CoreMaterial {
    fn default() -> Self {
        Self {
            modulus_mpa: 4.0,
            shear_modulus_mpa: 3.5,
            shear_strength_mpa: 0.12,
            crush_strength_mpa: 0.10,
            density_kg_m3: 42.0,
        }
    }
}

/// Material partial safety factors γM
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialFactors {
    /// Face wrinkling
    pub wrinkling: f64,
    /// Skin yield
    pub yield_strength: f64,
    /// Core shear and core crushing at supports
    pub core_shear: f64,
    /// Fastener pull-out
    pub fastener: f64,
}

impl Default for MaterialFactors {
    fn default() -> Self {
        Self {
            wrinkling: 1.2,
            yield_strength: 1.1,
            core_shear: 1.25,
            fastener: 1.33,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let core: CoreMaterial = serde_json::from_str(r#"{"density_kg_m3": 110.0}"#).unwrap();
        assert_eq!(core.density_kg_m3, 110.0);
        assert_eq!(core.shear_modulus_mpa, 3.5);
        assert_eq!(core.crush_strength_mpa, 0.10);
    }

    #[test]
    fn test_default_factors() {
        let f = MaterialFactors::default();
        assert_eq!(f.wrinkling, 1.2);
        assert_eq!(f.fastener, 1.33);
    }
}
