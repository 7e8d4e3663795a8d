//! # panel_core - Sandwich Panel Analysis Engine
//!
//! `panel_core` computes the structural response of multi-span sandwich
//! panels (walls and ceilings with steel skins and a foam or mineral-wool
//! core) under gravity, wind and skin temperature difference, and checks the
//! result against the panel's resistances.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: `analyze` is a pure function of its input
//! - **JSON-First**: All inputs and results implement Serialize/Deserialize
//! - **Sanitize once**: Bad input values are defaulted at the boundary; only
//!   an unusable span layout or a singular stiffness system is an error
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use panel_core::{analyze, PanelInput};
//!
//! let result = analyze(&PanelInput::default()).unwrap();
//! for advice in &result.summary.advisories {
//!     println!("{advice}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Section, solver, redistribution, envelope, capacity
//! - [`loads`] - Usage classes, load cases, thermal action, creep
//! - [`equations`] - Closed-form element and section formulas
//! - [`materials`] - Skin and core materials, partial factors
//! - [`project`] - Project container and metadata
//! - [`file_io`] - Project files with atomic saves and locking
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod equations;
pub mod errors;
pub mod file_io;
pub mod loads;
pub mod materials;
pub mod project;
pub mod units;

pub use calculations::{analyze, CalculationItem, PanelInput, PanelResult};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_project, save_project, FileLock};
pub use project::{Project, ProjectMetadata, ProjectSettings};
