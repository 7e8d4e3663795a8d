//! # Structural Mechanics Equations
//!
//! Closed-form formulas used by the panel analysis, kept in one place so they
//! can be checked against references independently of the solver.
//!
//! ## Modules
//!
//! - [`beam`] - Timoshenko element stiffness, shape functions, equivalent loads
//! - [`section`] - Sandwich section geometry, wrinkling stress, self weight
//!
//! ## Sign Conventions
//!
//! - **Loads**: Positive downward (gravity direction)
//! - **Moment**: Positive causes tension on the inner skin (sagging)
//! - **Shear**: Positive when left side moves up relative to right
//! - **Deflection**: Positive downward
//! - **Reactions**: Positive upward (resisting gravity)

pub mod beam;
pub mod section;

pub use beam::{
    consistent_point_load,
    consistent_uniform_load,
    fixed_fixed_point_deflection,
    fixed_fixed_uniform_deflection,
    interpolate_displacement,
    shape_functions,
    shear_flexibility,
    thermal_end_moments,
    timoshenko_stiffness,
};

pub use section::{
    parallel_axis,
    rectangular_moment_of_inertia,
    self_weight_kpa,
    skin_centroids,
    skin_neutral_axis,
    wrinkling_stress,
    GRAVITY,
    STEEL_DENSITY,
};
