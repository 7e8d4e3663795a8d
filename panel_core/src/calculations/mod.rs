//! # Structural Calculations
//!
//! The panel analysis pipeline. Each stage is a pure function of the stages
//! before it:
//!
//! - [`section`] - Sandwich section stiffness and self weight
//! - [`continuous_beam`] - Timoshenko stiffness solver for the span layout
//! - [`redistribution`] - Hinge insertion at over-stressed supports
//! - [`envelope`] - Governing forces and deflections over all load cases
//! - [`capacity`] - Resistances, utilisation ratios and advisories
//! - [`panel`] - `PanelInput` → `PanelResult`, tying the stages together
//!
//! Inputs and results are JSON-serializable.

pub mod capacity;
pub mod continuous_beam;
pub mod envelope;
pub mod panel;
pub mod redistribution;
pub mod section;

use serde::{Deserialize, Serialize};

pub use capacity::{CapacityResult, CheckStatus};
pub use panel::{analyze, PanelInput, PanelResult};

/// Enum wrapper for all calculation types.
///
/// Project files store items through this wrapper so new calculation kinds
/// can be added without changing the file layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationItem {
    /// Multi-span sandwich panel
    Panel(PanelInput),
}

impl CalculationItem {
    /// Get the user-provided label for this calculation
    pub fn label(&self) -> &str {
        match self {
            CalculationItem::Panel(p) => &p.label,
        }
    }

    /// Get the calculation type as a string
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculationItem::Panel(_) => "Panel",
        }
    }

    /// Run the calculation
    pub fn run(&self) -> crate::errors::CalcResult<PanelResult> {
        match self {
            CalculationItem::Panel(p) => analyze(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_tagged_json() {
        let item = CalculationItem::Panel(PanelInput {
            label: "W-1".to_string(),
            ..Default::default()
        });
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"type\":\"Panel\""));

        let back: CalculationItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.label(), "W-1");
        assert_eq!(back.calc_type(), "Panel");
    }
}
