//! Loads acting on sandwich panels
//!
//! This module turns the configured loads into everything the beam solver
//! needs: the pressure/suction load cases, factored point loads, the thermal
//! bowing moment and the creep-reduced long-term stiffnesses.
//!
//! # Overview
//!
//! - [`UsageClass`] - Ceiling, external wall, internal wall (normal/cold store)
//! - [`LoadCase`] - One wind direction with service and ultimate line loads
//! - [`ThermalAction`] - Moment from the skin temperature difference
//! - [`CreepModel`] - Long-term stiffness reduction
//! - [`LoadModel`] - All of the above, derived once per analysis
//!
//! # Example
//!
//! ```
//! use panel_core::calculations::panel::PanelInput;
//! use panel_core::calculations::section::SectionProperties;
//! use panel_core::loads::LoadModel;
//!
//! let model = PanelInput::default().sanitized().unwrap();
//! let section = SectionProperties::from_geometry(&model.geometry);
//! let loads = LoadModel::derive(&model, &section);
//!
//! assert_eq!(loads.cases.len(), 2);
//! assert!(loads.cases[1].wind_kpa < 0.0);
//! ```

pub mod combinations;
pub mod creep;
pub mod load_types;
pub mod thermal;

pub use combinations::{wind_load_cases, AreaLoads, LoadCase, PartialFactors, WindDirection};
pub use creep::{CreepFactors, CreepMode, CreepModel};
pub use load_types::{AppliedPointLoad, InternalWallType, PointLoad, PointLoadKind, UsageClass};
pub use thermal::{ThermalAction, STEEL_THERMAL_EXPANSION};

use serde::{Deserialize, Serialize};

use crate::calculations::panel::PanelModel;
use crate::calculations::section::SectionProperties;
use crate::units::{KiloPascals, Millimeters, NewtonsPerMm};

/// Source of the ceiling dead load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeadLoadMode {
    /// Panel self weight from layer densities
    #[default]
    SelfWeight,
    /// User-entered value
    Manual,
}

/// Configured area loads and temperatures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadInput {
    pub dead_load_mode: DeadLoadMode,
    /// Dead load used in manual mode (kPa)
    pub dead_load_manual_kpa: f64,
    /// Ceiling live load (kPa)
    pub live_load_kpa: f64,
    /// Wind magnitude (kPa); the sign is ignored
    pub wind_kpa: f64,
    /// Wind direction whose loads are reported as the design case
    pub wind_direction: WindDirection,
    /// Outer skin temperature (°C)
    pub temp_outer_c: f64,
    /// Inner skin temperature (°C)
    pub temp_inner_c: f64,
}

impl Default for LoadInput {
    fn default() -> Self {
        Self {
            dead_load_mode: DeadLoadMode::SelfWeight,
            dead_load_manual_kpa: 0.0,
            live_load_kpa: 0.25,
            wind_kpa: 0.8,
            wind_direction: WindDirection::Pressure,
            temp_outer_c: 65.0,
            temp_inner_c: 25.0,
        }
    }
}

/// Every load effect of one analysis, derived from the sanitized input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadModel {
    /// Characteristic area loads (dead and live are zero for walls)
    pub area: AreaLoads,
    /// Pressure and suction cases
    pub cases: Vec<LoadCase>,
    /// Index into `cases` of the reported design case
    pub design_case: usize,
    pub thermal: ThermalAction,
    pub creep: CreepModel,
    /// Characteristic point loads (empty for walls)
    pub point_loads: Vec<AppliedPointLoad>,
    /// Dead load as a line load (N/mm)
    pub dead_line: f64,
}

impl LoadModel {
    /// Derive loads for a sanitized panel
    pub fn derive(model: &PanelModel, section: &SectionProperties) -> Self {
        let usage = model.usage;
        let input = &model.loads;

        let (dead_kpa, live_kpa) = if usage.carries_gravity() {
            let dead = match input.dead_load_mode {
                DeadLoadMode::SelfWeight => section.self_weight_kpa,
                DeadLoadMode::Manual => input.dead_load_manual_kpa,
            };
            (dead, input.live_load_kpa)
        } else {
            (0.0, 0.0)
        };
        let area = AreaLoads {
            dead_kpa,
            live_kpa,
            wind_kpa: input.wind_kpa.abs(),
        };

        let width = model.geometry.width_mm;
        let cases = wind_load_cases(&area, usage, &model.factors, width);
        let design_case = cases
            .iter()
            .position(|c| c.direction == input.wind_direction)
            .unwrap_or(0);

        let thermal = ThermalAction::new(
            input.temp_outer_c,
            input.temp_inner_c,
            section.ei_nmm2,
            section.eccentricity_mm,
            model.thermal_expansion,
            model.factors.gamma_thermal,
        );
        let creep = CreepModel::new(usage.creep_mode(), model.creep, section.ei_nmm2, section.ga_n);

        let point_loads = if usage.carries_gravity() {
            model.point_loads.clone()
        } else {
            Vec::new()
        };

        Self {
            area,
            cases,
            design_case,
            thermal,
            creep,
            point_loads,
            dead_line: NewtonsPerMm::from_area_load(KiloPascals(dead_kpa), Millimeters(width)).value(),
        }
    }

    /// The case reported as the displayed line load
    pub fn design_case(&self) -> &LoadCase {
        &self.cases[self.design_case]
    }

    /// Permanent point loads (the sustained part that creeps)
    pub fn permanent_point_loads(&self) -> Vec<AppliedPointLoad> {
        self.point_loads
            .iter()
            .filter(|pl| pl.kind == PointLoadKind::Permanent)
            .copied()
            .collect()
    }

    /// Returns true if there is any sustained load to creep under
    pub fn has_sustained_load(&self) -> bool {
        self.area.dead_kpa.abs() > 1e-12
            || self.point_loads.iter().any(|pl| pl.kind == PointLoadKind::Permanent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::panel::PanelInput;

    fn derive(input: &PanelInput) -> LoadModel {
        let model = input.sanitized().unwrap();
        let section = SectionProperties::from_geometry(&model.geometry);
        LoadModel::derive(&model, &section)
    }

    #[test]
    fn test_walls_ignore_gravity_and_point_loads() {
        let input = PanelInput {
            usage: UsageClass::ExternalWall,
            ..Default::default()
        };
        let loads = derive(&input);
        assert_eq!(loads.area.dead_kpa, 0.0);
        assert_eq!(loads.area.live_kpa, 0.0);
        assert!(loads.point_loads.is_empty());
        assert_eq!(loads.creep.mode, CreepMode::None);
    }

    #[test]
    fn test_ceiling_self_weight() {
        let input = PanelInput {
            usage: UsageClass::Ceiling,
            ..Default::default()
        };
        let loads = derive(&input);
        let expected = 9.165 * 9.81 / 1000.0;
        assert!((loads.area.dead_kpa - expected).abs() < 1e-12);
        assert!((loads.dead_line - expected).abs() < 1e-12);
        assert_eq!(loads.point_loads.len(), 2);
        assert!(loads.has_sustained_load());
    }

    #[test]
    fn test_manual_dead_load() {
        let mut input = PanelInput {
            usage: UsageClass::Ceiling,
            ..Default::default()
        };
        input.loads.dead_load_mode = DeadLoadMode::Manual;
        input.loads.dead_load_manual_kpa = 0.4;
        assert!((derive(&input).area.dead_kpa - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_design_case_follows_wind_direction() {
        let mut input = PanelInput::default();
        input.loads.wind_direction = WindDirection::Suction;
        let loads = derive(&input);
        assert_eq!(loads.design_case().direction, WindDirection::Suction);
        assert!(loads.design_case().q_sls_kpa < 0.0);
    }
}
