//! # Error Types
//!
//! Structured error types for panel_core. Most invalid inputs are sanitised at
//! the input boundary (see [`crate::calculations::panel`]), so the variants
//! here cover what cannot be repaired locally: an unusable span layout, an
//! ill-conditioned stiffness system, and project file problems.
//!
//! ## Example
//!
//! ```rust
//! use panel_core::errors::{CalcError, CalcResult};
//!
//! fn validate_width(width_mm: f64) -> CalcResult<()> {
//!     if width_mm <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "panel_width_mm",
//!             width_mm.to_string(),
//!             "Panel width must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for panel_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid and cannot be defaulted
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// The reduced stiffness system is singular or nearly so.
    ///
    /// Raised when the largest pivot candidate at an elimination step falls
    /// below the solver threshold. Usually means the model is a mechanism.
    #[error("Ill-conditioned model in '{case}': pivot {pivot:e} at step {pivot_index}")]
    IllConditioned {
        case: String,
        pivot_index: usize,
        pivot: f64,
    },

    /// Calculation failed for a reason other than conditioning
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create an IllConditioned error
    pub fn ill_conditioned(case: impl Into<String>, pivot_index: usize, pivot: f64) -> Self {
        CalcError::IllConditioned {
            case: case.into(),
            pivot_index,
            pivot,
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Attach a load-case label to an IllConditioned error raised deep in the solver
    pub fn in_case(self, case: &str) -> Self {
        match self {
            CalcError::IllConditioned {
                pivot_index, pivot, ..
            } => CalcError::IllConditioned {
                case: case.to_string(),
                pivot_index,
                pivot,
            },
            other => other,
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::IllConditioned { .. } => "ILL_CONDITIONED",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("spans", "[]", "At least one span is required");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("test").error_code(), "MISSING_FIELD");
        assert_eq!(
            CalcError::ill_conditioned("suction", 3, 1e-15).error_code(),
            "ILL_CONDITIONED"
        );
    }

    #[test]
    fn test_in_case_relabels_only_conditioning_errors() {
        let err = CalcError::ill_conditioned("", 2, 0.0).in_case("pressure");
        assert!(matches!(err, CalcError::IllConditioned { ref case, .. } if case == "pressure"));

        let other = CalcError::missing_field("x").in_case("pressure");
        assert_eq!(other, CalcError::missing_field("x"));
    }

    #[test]
    fn test_only_locks_are_recoverable() {
        assert!(CalcError::file_locked("a.spf", "me", "now").is_recoverable());
        assert!(!CalcError::ill_conditioned("c", 0, 0.0).is_recoverable());
    }
}
