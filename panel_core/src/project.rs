//! # Project Data Structures
//!
//! A `Project` groups the panel calculations of one job. Projects serialize
//! to `.spf` files as human-readable JSON (see [`crate::file_io`]).
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (schema version, engineer, job info, timestamps)
//! ├── settings: ProjectSettings (defaults for new panels)
//! └── items: HashMap<Uuid, CalculationItem>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use panel_core::calculations::CalculationItem;
//! use panel_core::project::Project;
//!
//! let mut project = Project::new("Jane Engineer", "26-042", "Cold Store Ltd");
//! let input = project.settings.new_panel("Ceiling C-1");
//! let id = project.add_item(CalculationItem::Panel(input));
//!
//! assert!(project.get_item(&id).is_some());
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! assert!(json.contains("Ceiling C-1"));
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::{CalculationItem, PanelInput, PanelResult};
use crate::errors::CalcResult;
use crate::loads::{PartialFactors, UsageClass};
use crate::materials::MaterialFactors;

/// Current schema version for .spf files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub meta: ProjectMetadata,
    #[serde(default)]
    pub settings: ProjectSettings,
    /// All calculation items, keyed by UUID
    pub items: HashMap<Uuid, CalculationItem>,
}

impl Project {
    /// Create a new empty project.
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: ProjectSettings::default(),
            items: HashMap::new(),
        }
    }

    /// Add a calculation item, returning its new UUID.
    pub fn add_item(&mut self, item: CalculationItem) -> Uuid {
        let id = Uuid::new_v4();
        self.items.insert(id, item);
        self.touch();
        id
    }

    /// Remove a calculation item by UUID.
    pub fn remove_item(&mut self, id: &Uuid) -> Option<CalculationItem> {
        let item = self.items.remove(id);
        if item.is_some() {
            self.touch();
        }
        item
    }

    pub fn get_item(&self, id: &Uuid) -> Option<&CalculationItem> {
        self.items.get(id)
    }

    /// Mutable access; marks the project as modified when the item exists.
    pub fn get_item_mut(&mut self, id: &Uuid) -> Option<&mut CalculationItem> {
        if self.items.contains_key(id) {
            self.touch();
        }
        self.items.get_mut(id)
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Items sorted by label, then id, for stable listings
    pub fn sorted_items(&self) -> Vec<(&Uuid, &CalculationItem)> {
        let mut items: Vec<_> = self.items.iter().collect();
        items.sort_by(|(ia, a), (ib, b)| a.label().cmp(b.label()).then(ia.cmp(ib)));
        items
    }

    /// Run every calculation, in [`Project::sorted_items`] order.
    ///
    /// A failing item does not stop the others.
    pub fn analyze_all(&self) -> Vec<(Uuid, CalcResult<PanelResult>)> {
        self.sorted_items()
            .into_iter()
            .map(|(id, item)| (*id, item.run()))
            .collect()
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    /// Name of the responsible engineer
    pub engineer: String,
    /// Job/project number
    pub job_id: String,
    pub client: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Defaults applied to panels created in this project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Design standard the factors refer to
    pub standard: String,
    pub default_usage: UsageClass,
    pub factors: PartialFactors,
    pub material_factors: MaterialFactors,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        ProjectSettings {
            standard: "EN 14509".to_string(),
            default_usage: UsageClass::default(),
            factors: PartialFactors::default(),
            material_factors: MaterialFactors::default(),
        }
    }
}

impl ProjectSettings {
    /// A default panel input carrying the project's usage and factors
    pub fn new_panel(&self, label: impl Into<String>) -> PanelInput {
        PanelInput {
            label: label.into(),
            usage: self.default_usage,
            factors: self.factors,
            material_factors: self.material_factors,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_creation() {
        let project = Project::new("John Doe", "26-001", "Acme Corp");
        assert_eq!(project.meta.engineer, "John Doe");
        assert_eq!(project.meta.job_id, "26-001");
        assert_eq!(project.meta.version, SCHEMA_VERSION);
        assert_eq!(project.settings.standard, "EN 14509");
    }

    #[test]
    fn test_project_serialization() {
        let project = Project::new("Jane Engineer", "26-042", "Test Client");
        let json = serde_json::to_string_pretty(&project).unwrap();
        assert!(json.contains("Jane Engineer"));

        let roundtrip: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.meta.job_id, "26-042");
        assert_eq!(roundtrip.settings, project.settings);
    }

    #[test]
    fn test_add_remove_item() {
        let mut project = Project::new("Engineer", "26-001", "Client");
        let id = project.add_item(CalculationItem::Panel(project.settings.new_panel("W-1")));
        assert_eq!(project.item_count(), 1);
        assert_eq!(project.get_item(&id).map(|i| i.label()), Some("W-1"));

        assert!(project.remove_item(&id).is_some());
        assert!(project.remove_item(&id).is_none());
        assert_eq!(project.item_count(), 0);
    }

    #[test]
    fn test_settings_flow_into_new_panels() {
        let mut project = Project::default();
        project.settings.default_usage = UsageClass::Ceiling;
        project.settings.factors.gamma_wind = 1.5;

        let panel = project.settings.new_panel("C-1");
        assert_eq!(panel.usage, UsageClass::Ceiling);
        assert_eq!(panel.factors.gamma_wind, 1.5);
    }

    #[test]
    fn test_analyze_all_keeps_going_after_failure() {
        let mut project = Project::default();
        project.add_item(CalculationItem::Panel(project.settings.new_panel("A good")));
        project.add_item(CalculationItem::Panel(PanelInput {
            label: "B broken".to_string(),
            spans_m: vec![],
            ..Default::default()
        }));

        let results = project.analyze_all();
        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
    }
}
