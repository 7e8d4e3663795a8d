//! Thermal bowing of sandwich panels
//!
//! A temperature difference between the skins makes the panel bow. On a
//! continuous beam the bowing is restrained and produces a bending moment that
//! acts together with the mechanical loads.
//!
//! ```text
//! ΔT = T_out - T_in
//! Mt = -EI × α × ΔT / e
//! ```
//!
//! The moment is independent of the wind load case.

use serde::{Deserialize, Serialize};

/// Linear thermal expansion coefficient of steel (1/K)
pub const STEEL_THERMAL_EXPANSION: f64 = 1.2e-5;

/// Temperature difference and the resulting thermal moments
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalAction {
    /// Outer minus inner skin temperature (K)
    pub delta_t: f64,
    /// Moment per kelvin (N·mm/K)
    pub unit_moment: f64,
    /// Factored thermal moment (N·mm)
    pub moment_uls: f64,
    /// Service thermal moment (N·mm)
    pub moment_sls: f64,
}

impl ThermalAction {
    /// Compute thermal moments from skin temperatures
    ///
    /// Gives zero moments when the eccentricity is not positive.
    pub fn new(
        temp_outer: f64,
        temp_inner: f64,
        ei: f64,
        eccentricity: f64,
        alpha: f64,
        gamma_thermal: f64,
    ) -> Self {
        let delta_t = temp_outer - temp_inner;
        let unit_moment = if eccentricity > 0.0 {
            -ei * alpha / eccentricity
        } else {
            0.0
        };
        Self {
            delta_t,
            unit_moment,
            moment_uls: unit_moment * delta_t * gamma_thermal,
            moment_sls: unit_moment * delta_t,
        }
    }

    /// Returns true if there is a thermal moment to analyse
    pub fn is_active(&self) -> bool {
        self.moment_sls != 0.0 || self.moment_uls != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thermal_moment() {
        let t = ThermalAction::new(65.0, 25.0, 1.2e11, 50.45, STEEL_THERMAL_EXPANSION, 1.5);
        let unit = -1.2e11 * 1.2e-5 / 50.45;
        assert!((t.unit_moment - unit).abs() < 1e-6);
        assert!((t.moment_sls - unit * 40.0).abs() < 1e-3);
        assert!((t.moment_uls - unit * 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_delta_is_inactive() {
        let t = ThermalAction::new(20.0, 20.0, 1.2e11, 50.0, STEEL_THERMAL_EXPANSION, 1.5);
        assert_eq!(t.moment_uls, 0.0);
        assert!(!t.is_active());
    }

    #[test]
    fn test_no_eccentricity() {
        let t = ThermalAction::new(65.0, 25.0, 1.2e11, 0.0, STEEL_THERMAL_EXPANSION, 1.5);
        assert_eq!(t.unit_moment, 0.0);
    }
}
