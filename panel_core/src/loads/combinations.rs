//! Wind pressure / suction load cases
//!
//! Every panel is checked for two mechanical load cases that differ only in
//! the direction of the wind:
//!
//! - **pressure**: +|w|, full γG and γQ, live load and variable point loads act
//! - **suction**: -|w|, favourable permanent load (0.9 γG), no variable loads
//!
//! ## Case Loads
//!
//! ```text
//! Ceiling:  q_SLS = g + q_live + w
//!           q_ULS = γG g + γQ q_live + γW w
//! Wall:     q_SLS = w
//!           q_ULS = γW w
//! ```
//!
//! Loads are area loads (kPa) converted to line loads on the panel width.

use serde::{Deserialize, Serialize};

use super::load_types::{AppliedPointLoad, PointLoadKind, UsageClass};
use crate::units::{KiloPascals, Millimeters, NewtonsPerMm};

/// Partial load factors γF
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialFactors {
    /// Permanent load γG
    pub gamma_g: f64,
    /// Variable load γQ
    pub gamma_q: f64,
    /// Wind γW
    pub gamma_wind: f64,
    /// Temperature γT
    pub gamma_thermal: f64,
    /// Reduction applied to γG when permanent load is favourable (suction)
    pub favourable_permanent: f64,
}

impl Default for PartialFactors {
    fn default() -> Self {
        Self {
            gamma_g: 1.35,
            gamma_q: 1.5,
            gamma_wind: 2.1,
            gamma_thermal: 1.5,
            favourable_permanent: 0.9,
        }
    }
}

/// Wind direction of a load case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindDirection {
    /// Wind pushes on the outer skin (acts with gravity)
    #[default]
    Pressure,
    /// Wind pulls on the outer skin (acts against gravity)
    Suction,
}

impl WindDirection {
    /// Sign applied to the wind magnitude
    pub fn sign(&self) -> f64 {
        match self {
            WindDirection::Pressure => 1.0,
            WindDirection::Suction => -1.0,
        }
    }

    /// Short identifier used in labels and errors
    pub fn code(&self) -> &'static str {
        match self {
            WindDirection::Pressure => "pressure",
            WindDirection::Suction => "suction",
        }
    }
}

/// Characteristic area loads acting on the panel (kPa)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AreaLoads {
    /// Dead load g
    pub dead_kpa: f64,
    /// Live load
    pub live_kpa: f64,
    /// Wind magnitude |w|
    pub wind_kpa: f64,
}

/// One mechanical load case with its service and ultimate line loads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCase {
    pub direction: WindDirection,
    /// Signed wind load (kPa)
    pub wind_kpa: f64,
    /// Factor on permanent loads
    pub gamma_g: f64,
    /// Factor on variable loads (zero drops them from the ULS case)
    pub gamma_q: f64,
    /// Live load included in the service case
    pub include_live_service: bool,
    /// Variable point loads included
    pub include_variable_points: bool,
    /// Service area load (kPa)
    pub q_sls_kpa: f64,
    /// Ultimate area load (kPa)
    pub q_uls_kpa: f64,
    /// Service line load (N/mm)
    pub q_sls_line: f64,
    /// Ultimate line load (N/mm)
    pub q_uls_line: f64,
}

impl LoadCase {
    /// Build a case for the given wind direction
    pub fn new(
        direction: WindDirection,
        loads: &AreaLoads,
        usage: UsageClass,
        factors: &PartialFactors,
        width_mm: f64,
    ) -> Self {
        let (gamma_g, gamma_q, include_live_service, include_variable_points) = match direction {
            WindDirection::Pressure => (factors.gamma_g, factors.gamma_q, true, true),
            WindDirection::Suction => (factors.favourable_permanent * factors.gamma_g, 0.0, false, false),
        };
        let wind_kpa = loads.wind_kpa.abs() * direction.sign();

        let (q_sls_kpa, q_uls_kpa) = if usage.carries_gravity() {
            let live_sls = if include_live_service { loads.live_kpa } else { 0.0 };
            let live_uls = if gamma_q > 0.0 { loads.live_kpa } else { 0.0 };
            (
                loads.dead_kpa + live_sls + wind_kpa,
                gamma_g * loads.dead_kpa + gamma_q * live_uls + factors.gamma_wind * wind_kpa,
            )
        } else {
            (wind_kpa, factors.gamma_wind * wind_kpa)
        };

        let width = Millimeters(width_mm);
        let line = |kpa: f64| NewtonsPerMm::from_area_load(KiloPascals(kpa), width).value();
        Self {
            direction,
            wind_kpa,
            gamma_g,
            gamma_q,
            include_live_service,
            include_variable_points,
            q_sls_kpa,
            q_uls_kpa,
            q_sls_line: line(q_sls_kpa),
            q_uls_line: line(q_uls_kpa),
        }
    }

    /// Case label
    pub fn name(&self) -> &'static str {
        self.direction.code()
    }

    /// Point loads factored for this ULS case
    pub fn factored_point_loads(&self, loads: &[AppliedPointLoad]) -> Vec<AppliedPointLoad> {
        loads
            .iter()
            .filter(|pl| self.includes(pl))
            .map(|pl| match pl.kind {
                PointLoadKind::Permanent => pl.scaled(self.gamma_g),
                PointLoadKind::Variable => pl.scaled(self.gamma_q),
            })
            .collect()
    }

    /// Point loads acting in this service case (unfactored)
    pub fn service_point_loads(&self, loads: &[AppliedPointLoad]) -> Vec<AppliedPointLoad> {
        loads.iter().filter(|pl| self.includes(pl)).copied().collect()
    }

    fn includes(&self, load: &AppliedPointLoad) -> bool {
        self.include_variable_points || load.kind != PointLoadKind::Variable
    }
}

/// The pressure and suction cases, in that order
pub fn wind_load_cases(
    loads: &AreaLoads,
    usage: UsageClass,
    factors: &PartialFactors,
    width_mm: f64,
) -> Vec<LoadCase> {
    [WindDirection::Pressure, WindDirection::Suction]
        .into_iter()
        .map(|direction| LoadCase::new(direction, loads, usage, factors, width_mm))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOADS: AreaLoads = AreaLoads {
        dead_kpa: 0.1,
        live_kpa: 0.25,
        wind_kpa: 0.8,
    };

    #[test]
    fn test_ceiling_pressure_case() {
        let case = LoadCase::new(
            WindDirection::Pressure,
            &LOADS,
            UsageClass::Ceiling,
            &PartialFactors::default(),
            1000.0,
        );
        assert!((case.q_sls_kpa - (0.1 + 0.25 + 0.8)).abs() < 1e-12);
        assert!((case.q_uls_kpa - (1.35 * 0.1 + 1.5 * 0.25 + 2.1 * 0.8)).abs() < 1e-12);
        assert!((case.q_uls_line - case.q_uls_kpa).abs() < 1e-12);
    }

    #[test]
    fn test_ceiling_suction_case() {
        let case = LoadCase::new(
            WindDirection::Suction,
            &LOADS,
            UsageClass::Ceiling,
            &PartialFactors::default(),
            1150.0,
        );
        assert_eq!(case.gamma_q, 0.0);
        assert!((case.q_sls_kpa - (0.1 - 0.8)).abs() < 1e-12);
        assert!((case.q_uls_kpa - (0.9 * 1.35 * 0.1 - 2.1 * 0.8)).abs() < 1e-12);
        assert!((case.q_sls_line - case.q_sls_kpa * 1.15).abs() < 1e-12);
    }

    #[test]
    fn test_wall_cases_are_wind_only() {
        let cases = wind_load_cases(&LOADS, UsageClass::ExternalWall, &PartialFactors::default(), 1000.0);
        assert_eq!(cases.len(), 2);
        assert!((cases[0].q_sls_kpa - 0.8).abs() < 1e-12);
        assert!((cases[1].q_uls_kpa + 2.1 * 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_suction_drops_variable_point_loads() {
        let loads = [
            AppliedPointLoad { x_mm: 1500.0, force_n: 300.0, kind: PointLoadKind::Permanent },
            AppliedPointLoad { x_mm: 2000.0, force_n: 1000.0, kind: PointLoadKind::Variable },
        ];
        let cases = wind_load_cases(&LOADS, UsageClass::Ceiling, &PartialFactors::default(), 1000.0);

        let pressure = cases[0].factored_point_loads(&loads);
        assert_eq!(pressure.len(), 2);
        assert!((pressure[0].force_n - 405.0).abs() < 1e-9);
        assert!((pressure[1].force_n - 1500.0).abs() < 1e-9);

        let suction = cases[1].factored_point_loads(&loads);
        assert_eq!(suction.len(), 1);
        assert!((suction[0].force_n - 300.0 * 1.215).abs() < 1e-9);
        assert_eq!(cases[1].service_point_loads(&loads).len(), 1);
    }
}
