//! Panel usage classes and point-load definitions
//!
//! The usage class decides which loads a panel carries (ceilings carry gravity,
//! walls only wind), how creep is applied, and the recommended deflection
//! limit.

use serde::{Deserialize, Serialize};

use super::creep::CreepMode;

/// Service condition of an internal wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InternalWallType {
    /// Ordinary partition
    #[default]
    Normal,
    /// Cold-store wall: long-term core creep under all service loads
    ColdStorage,
}

/// Panel usage class
///
/// # Example
/// ```
/// use panel_core::loads::{UsageClass, InternalWallType};
///
/// assert!(UsageClass::Ceiling.carries_gravity());
/// assert!(UsageClass::ExternalWall.is_wall());
/// assert_eq!(UsageClass::InternalWall(InternalWallType::Normal).recommended_deflection_limit(), 200.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UsageClass {
    /// Horizontal ceiling panel hung from supports
    Ceiling,
    /// Facade wall panel exposed to outdoor climate
    #[default]
    ExternalWall,
    /// Internal partition or cold-store wall
    InternalWall(InternalWallType),
}

impl UsageClass {
    /// All usage classes for selection lists
    pub const ALL: [UsageClass; 4] = [
        UsageClass::ExternalWall,
        UsageClass::InternalWall(InternalWallType::Normal),
        UsageClass::InternalWall(InternalWallType::ColdStorage),
        UsageClass::Ceiling,
    ];

    /// Returns true for wall panels (external or internal)
    pub fn is_wall(&self) -> bool {
        !self.carries_gravity()
    }

    /// Returns true if dead, live and point loads act on the panel
    pub fn carries_gravity(&self) -> bool {
        matches!(self, UsageClass::Ceiling)
    }

    /// Recommended deflection limit denominator (L / n)
    pub fn recommended_deflection_limit(&self) -> f64 {
        match self {
            UsageClass::ExternalWall => 150.0,
            UsageClass::InternalWall(_) | UsageClass::Ceiling => 200.0,
        }
    }

    /// Which service loads creep under this usage
    pub fn creep_mode(&self) -> CreepMode {
        match self {
            UsageClass::InternalWall(InternalWallType::ColdStorage) => CreepMode::All,
            UsageClass::Ceiling => CreepMode::SustainedOnly,
            _ => CreepMode::None,
        }
    }

    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            UsageClass::Ceiling => "Ceiling",
            UsageClass::ExternalWall => "External wall",
            UsageClass::InternalWall(InternalWallType::Normal) => "Internal wall",
            UsageClass::InternalWall(InternalWallType::ColdStorage) => "Cold-storage wall",
        }
    }
}

impl std::fmt::Display for UsageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Duration class of a point load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PointLoadKind {
    /// Permanent (hung services, lamps): factored by γG, creeps
    #[default]
    Permanent,
    /// Variable (maintenance loads): factored by γQ, dropped in suction
    Variable,
}

/// A concentrated load as entered by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    /// Distance from the left end of the panel (m)
    pub position_m: f64,
    /// Magnitude (kN), positive downward
    pub magnitude_kn: f64,
    /// Duration class
    #[serde(default)]
    pub kind: PointLoadKind,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PointLoad {
    /// Create a permanent point load
    pub fn permanent(position_m: f64, magnitude_kn: f64) -> Self {
        Self {
            position_m,
            magnitude_kn,
            kind: PointLoadKind::Permanent,
            label: None,
        }
    }

    /// Create a variable point load
    pub fn variable(position_m: f64, magnitude_kn: f64) -> Self {
        Self {
            kind: PointLoadKind::Variable,
            ..Self::permanent(position_m, magnitude_kn)
        }
    }

    /// Attach a description (builder pattern)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A point load in solver units, measured along the whole panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedPointLoad {
    /// Distance from the left end (mm)
    pub x_mm: f64,
    /// Force (N), positive downward
    pub force_n: f64,
    /// Duration class
    pub kind: PointLoadKind,
}

impl AppliedPointLoad {
    /// Same load scaled by a factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            force_n: self.force_n * factor,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_serialization() {
        let json = serde_json::to_string(&UsageClass::InternalWall(InternalWallType::ColdStorage)).unwrap();
        assert_eq!(json, r#"{"internal_wall":"cold_storage"}"#);
        let ceiling: UsageClass = serde_json::from_str(r#""ceiling""#).unwrap();
        assert_eq!(ceiling, UsageClass::Ceiling);
    }

    #[test]
    fn test_creep_mode_by_usage() {
        assert_eq!(UsageClass::Ceiling.creep_mode(), CreepMode::SustainedOnly);
        assert_eq!(
            UsageClass::InternalWall(InternalWallType::ColdStorage).creep_mode(),
            CreepMode::All
        );
        assert_eq!(UsageClass::ExternalWall.creep_mode(), CreepMode::None);
    }

    #[test]
    fn test_point_load_defaults_to_permanent() {
        let load: PointLoad = serde_json::from_str(r#"{"position_m": 1.5, "magnitude_kn": 0.3}"#).unwrap();
        assert_eq!(load.kind, PointLoadKind::Permanent);
        assert!(load.label.is_none());
    }
}
