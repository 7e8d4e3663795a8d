//! Long-term core creep
//!
//! Creep of the core under sustained load is modelled by dividing the
//! short-term stiffnesses by `1 + φ`:
//!
//! ```text
//! GA_long = GA / max(1 + φs, 1e-6)
//! EI_long = EI / max(1 + φb, 1e-6)
//! ```
//!
//! The extra deflection `w_long - w_short` is added to the service deflection.

use serde::{Deserialize, Serialize};

/// Which service loads produce creep deflection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CreepMode {
    /// Every service load creeps (cold-storage walls)
    All,
    /// Only dead load and permanent point loads creep (ceilings)
    SustainedOnly,
    /// No creep
    #[default]
    None,
}

impl CreepMode {
    /// Human-readable description of which loads creep
    pub fn description(&self) -> &'static str {
        match self {
            CreepMode::All => "all service loads",
            CreepMode::SustainedOnly => "sustained loads only (dead + permanent point loads)",
            CreepMode::None => "none",
        }
    }
}

/// Creep coefficients as configured
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreepFactors {
    /// Shear creep coefficient φs
    pub shear: f64,
    /// Bending creep coefficient φb
    pub bending: f64,
}

impl Default for CreepFactors {
    fn default() -> Self {
        Self {
            shear: 2.4,
            bending: 0.0,
        }
    }
}

/// Creep actually applied to an analysis, with reduced stiffnesses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreepModel {
    pub mode: CreepMode,
    /// Effective φs (zero when mode is `None`)
    pub phi_shear: f64,
    /// Effective φb (zero when mode is `None`)
    pub phi_bending: f64,
    /// Long-term flexural stiffness (N·mm²)
    pub ei_long: f64,
    /// Long-term shear stiffness (N)
    pub ga_long: f64,
}

impl CreepModel {
    /// Reduce short-term stiffnesses for the given mode
    pub fn new(mode: CreepMode, factors: CreepFactors, ei: f64, ga: f64) -> Self {
        let (phi_shear, phi_bending) = match mode {
            CreepMode::None => (0.0, 0.0),
            _ => (factors.shear, factors.bending),
        };
        Self {
            mode,
            phi_shear,
            phi_bending,
            ei_long: ei / (1.0 + phi_bending).max(1e-6),
            ga_long: ga / (1.0 + phi_shear).max(1e-6),
        }
    }

    /// Returns true if any creep deflection is computed
    pub fn is_active(&self) -> bool {
        self.mode != CreepMode::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_creep_keeps_stiffness() {
        let c = CreepModel::new(CreepMode::None, CreepFactors::default(), 1.2e11, 1.75e5);
        assert_eq!(c.phi_shear, 0.0);
        assert_eq!(c.ei_long, 1.2e11);
        assert_eq!(c.ga_long, 1.75e5);
    }

    #[test]
    fn test_shear_creep_reduces_ga() {
        let c = CreepModel::new(CreepMode::SustainedOnly, CreepFactors::default(), 1.2e11, 1.75e5);
        assert!((c.ga_long - 1.75e5 / 3.4).abs() < 1e-9);
        assert_eq!(c.ei_long, 1.2e11);
    }

    #[test]
    fn test_degenerate_factor_is_floored() {
        let factors = CreepFactors { shear: -1.0, bending: 0.0 };
        let c = CreepModel::new(CreepMode::All, factors, 1.0, 1.0);
        assert!((c.ga_long - 1.0e6).abs() < 1e-3);
    }
}
