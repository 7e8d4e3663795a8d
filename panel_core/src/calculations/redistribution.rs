//! # Support Moment Redistribution
//!
//! At ultimate limit state an over-stressed interior support of a sandwich
//! panel wrinkles locally and stops carrying moment. This is modelled by
//! inserting a hinge at each interior node whose combined mechanical and
//! thermal support moment exceeds the bending resistance, then re-solving.
//!
//! ## Procedure
//!
//! 1. Solve the mechanical ULS case with no hinges
//! 2. For each unhinged interior node take the average of the left and right
//!    element end moments (mechanical + elastic thermal)
//! 3. Flag the node if `|Mi| > trigger × M_Rd`
//! 4. Re-solve with the new hinges; stop when nothing new is flagged or the
//!    iteration cap is reached
//!
//! Hinges are never removed. The thermal solution is elastic and is not
//! itself re-solved with hinges.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calculations::continuous_beam::{BeamLoads, BeamSolution, ContinuousBeamSolver};
use crate::errors::CalcResult;

/// Redistribution controls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedistributionSettings {
    /// Allow hinge insertion
    pub enabled: bool,
    /// Maximum number of re-solves after hinges were added
    pub max_iterations: usize,
    /// Hinge forms when |M| exceeds this multiple of M_Rd
    pub trigger_ratio: f64,
}

impl Default for RedistributionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_iterations: 4,
            trigger_ratio: 1.0,
        }
    }
}

/// Converged state of one ULS case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedistributionOutcome {
    /// Hinge flag per node
    pub hinges: Vec<bool>,
    /// Mechanical ULS solution for `hinges`
    pub solution: BeamSolution,
    /// Number of re-solves performed after the initial solve
    pub iterations: usize,
}

impl RedistributionOutcome {
    /// Nodes carrying a hinge
    pub fn hinge_nodes(&self) -> Vec<usize> {
        self.hinges
            .iter()
            .enumerate()
            .filter_map(|(i, h)| h.then_some(i))
            .collect()
    }
}

/// Redistribute from the all-elastic state
pub fn redistribute(
    solver: &ContinuousBeamSolver,
    loads: &BeamLoads,
    thermal: &BeamSolution,
    moment_resistance: f64,
    settings: &RedistributionSettings,
) -> CalcResult<RedistributionOutcome> {
    let hinges = vec![false; solver.model().node_count()];
    redistribute_from(solver, loads, thermal, moment_resistance, settings, hinges)
}

/// Redistribute starting from an existing hinge set
///
/// Running this on the hinge set returned by a converged [`redistribute`]
/// gives back the same hinges and solution.
pub fn redistribute_from(
    solver: &ContinuousBeamSolver,
    loads: &BeamLoads,
    thermal: &BeamSolution,
    moment_resistance: f64,
    settings: &RedistributionSettings,
    initial_hinges: Vec<bool>,
) -> CalcResult<RedistributionOutcome> {
    let node_count = solver.model().node_count();
    let mut hinges = initial_hinges;
    hinges.resize(node_count, false);

    let mut solution = solver.solve(loads, &hinges)?;
    let mut iterations = 0;

    if !settings.enabled || moment_resistance <= 0.0 {
        return Ok(RedistributionOutcome {
            hinges,
            solution,
            iterations,
        });
    }

    let limit = settings.trigger_ratio * moment_resistance;

    while iterations < settings.max_iterations {
        let mut changed = false;
        for node in 1..node_count.saturating_sub(1) {
            if hinges[node] {
                continue;
            }
            let m = averaged_support_moment(&solution, thermal, node);
            if m.abs() > limit {
                debug!(node, moment = m, limit, "support moment exceeds resistance, inserting hinge");
                hinges[node] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
        solution = solver.solve(loads, &hinges)?;
        iterations += 1;
    }

    if hinges.iter().any(|h| *h) {
        info!(iterations, hinges = ?hinges, "moment redistribution active");
    }

    Ok(RedistributionOutcome {
        hinges,
        solution,
        iterations,
    })
}

/// Mean of the left and right support moments at a node, thermal included
///
/// A side without an element contributes zero.
pub fn averaged_support_moment(mechanical: &BeamSolution, thermal: &BeamSolution, node: usize) -> f64 {
    let left = mechanical.moment_left_of(node).unwrap_or(0.0) + thermal.moment_left_of(node).unwrap_or(0.0);
    let right = mechanical.moment_right_of(node).unwrap_or(0.0) + thermal.moment_right_of(node).unwrap_or(0.0);
    0.5 * (left + right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::continuous_beam::{BeamModel, SectionStiffness};

    const EI: f64 = 1.2e11;

    fn setup(spans: &[f64]) -> BeamModel {
        BeamModel::new(spans)
    }

    #[test]
    fn test_no_hinge_below_resistance() {
        let model = setup(&[3000.0, 3000.0]);
        let solver = ContinuousBeamSolver::new(&model, SectionStiffness::new(EI, f64::INFINITY, 1.0));
        let thermal = solver.solve(&BeamLoads::thermal(0.0), &[false; 3]).unwrap();

        // Support moment is 1.125e6 N·mm
        let out = redistribute(&solver, &BeamLoads::uniform(1.0), &thermal, 2.0e6, &RedistributionSettings::default()).unwrap();
        assert!(out.hinge_nodes().is_empty());
        assert_eq!(out.iterations, 0);
    }

    #[test]
    fn test_hinge_inserted_above_resistance() {
        let model = setup(&[3000.0, 3000.0]);
        let solver = ContinuousBeamSolver::new(&model, SectionStiffness::new(EI, f64::INFINITY, 1.0));
        let thermal = solver.solve(&BeamLoads::thermal(0.0), &[false; 3]).unwrap();

        let out = redistribute(&solver, &BeamLoads::uniform(1.0), &thermal, 1.0e6, &RedistributionSettings::default()).unwrap();
        assert_eq!(out.hinge_nodes(), vec![1]);
        assert_eq!(out.iterations, 1);
        assert!(out.solution.moment_left_of(1).unwrap().abs() < 1e-3);
    }

    #[test]
    fn test_disabled_or_zero_resistance_skips() {
        let model = setup(&[3000.0, 3000.0]);
        let solver = ContinuousBeamSolver::new(&model, SectionStiffness::new(EI, f64::INFINITY, 1.0));
        let thermal = solver.solve(&BeamLoads::thermal(0.0), &[false; 3]).unwrap();
        let loads = BeamLoads::uniform(1.0);

        let disabled = RedistributionSettings {
            enabled: false,
            ..Default::default()
        };
        let out = redistribute(&solver, &loads, &thermal, 1.0, &disabled).unwrap();
        assert!(out.hinge_nodes().is_empty());

        let out = redistribute(&solver, &loads, &thermal, 0.0, &RedistributionSettings::default()).unwrap();
        assert!(out.hinge_nodes().is_empty());
    }

    #[test]
    fn test_hinges_cascade_then_converge() {
        let model = setup(&[3000.0, 3000.0, 3000.0, 3000.0]);
        let solver = ContinuousBeamSolver::new(&model, SectionStiffness::new(EI, 1.75e5, 1.0));
        let thermal = solver.solve(&BeamLoads::thermal(-2.0e5), &[false; 5]).unwrap();
        let loads = BeamLoads::uniform(1.0);

        // Outer supports yield first; the centre support picks up their moment
        let out = redistribute(&solver, &loads, &thermal, 6.0e5, &RedistributionSettings::default()).unwrap();
        assert_eq!(out.hinge_nodes(), vec![1, 2, 3]);
        assert_eq!(out.iterations, 2);
    }

    #[test]
    fn test_rerun_on_converged_set_is_idempotent() {
        let model = setup(&[3000.0, 3000.0, 3000.0, 3000.0]);
        let solver = ContinuousBeamSolver::new(&model, SectionStiffness::new(EI, 1.75e5, 1.0));
        let thermal = solver.solve(&BeamLoads::thermal(-2.0e5), &[false; 5]).unwrap();
        let loads = BeamLoads::uniform(1.0);
        let settings = RedistributionSettings::default();

        let first = redistribute(&solver, &loads, &thermal, 6.0e5, &settings).unwrap();
        assert!(first.iterations < settings.max_iterations);

        let again = redistribute_from(&solver, &loads, &thermal, 6.0e5, &settings, first.hinges.clone()).unwrap();
        assert_eq!(again.hinges, first.hinges);
        assert_eq!(again.solution, first.solution);
        assert_eq!(again.iterations, 0);
    }

    #[test]
    fn test_thermal_moment_counts_toward_trigger() {
        let model = setup(&[3000.0, 3000.0]);
        let solver = ContinuousBeamSolver::new(&model, SectionStiffness::new(EI, f64::INFINITY, 1.0));
        let mechanical = solver.solve(&BeamLoads::uniform(1.0), &[false; 3]).unwrap();
        let thermal = solver.solve(&BeamLoads::thermal(1.0e6), &[false; 3]).unwrap();

        // -0.125 qL² from the load, -1.5 Mt of restraint moment from bowing
        let m = averaged_support_moment(&mechanical, &thermal, 1);
        assert!((m + 1.125e6 + 1.5e6).abs() < 1.0);

        let out = redistribute(&solver, &BeamLoads::uniform(1.0), &thermal, 2.0e6, &RedistributionSettings::default()).unwrap();
        assert_eq!(out.hinge_nodes(), vec![1]);
    }
}
