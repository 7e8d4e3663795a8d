//! # Response Envelope
//!
//! Samples internal forces and deflections along every span and keeps, at
//! each sample, the load case with the largest magnitude.
//!
//! ## Sampling
//!
//! Each span gets 41 evenly spaced samples (40 steps). Every point-load
//! position adds two more samples, just before and just after the load, so
//! shear jumps and moment kinks are captured exactly. At equal positions the
//! order is before, grid, after; grid samples count a coincident load as
//! passed.
//!
//! ## Superposition
//!
//! ```text
//! V(x) = V_start - q x - ΣP + V_T,start
//! M(x) = M_start + V_start x - q x²/2 - ΣP (x - a) + M_T,start + V_T,start x
//! w(x) = w_mech,short + w_thermal + (w_long - w_short)
//! ```
//!
//! Mechanical forces come from the redistributed ULS solution, thermal forces
//! from the elastic ULS thermal solution, deflections from service solutions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::continuous_beam::{
    BeamElement, BeamModel, BeamSolution, SampleSide, POSITION_TOLERANCE,
};
use crate::loads::CreepMode;

/// Number of grid steps per span
pub const STEPS_PER_SPAN: usize = 40;

/// Solutions of one load case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSolutions {
    /// Case label
    pub name: String,
    /// Mechanical ULS solution after redistribution
    pub uls: BeamSolution,
    /// Mechanical service solution, short-term stiffness
    pub sls_short: BeamSolution,
    /// Mechanical service solution, long-term stiffness (creep mode `All`)
    pub sls_long: Option<BeamSolution>,
}

/// Case-independent solutions shared by every case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedSolutions {
    pub thermal_uls: BeamSolution,
    pub thermal_sls: BeamSolution,
    /// Sustained-load solutions `(short, long)` (creep mode `SustainedOnly`)
    pub sustained: Option<(BeamSolution, BeamSolution)>,
}

/// Where a sample sits relative to a coincident point load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SampleKind {
    /// Just before a point load
    Before,
    /// Regular grid position
    Grid,
    /// Just after a point load
    After,
}

impl SampleKind {
    fn side(self) -> SampleSide {
        match self {
            SampleKind::Before => SampleSide::Before,
            SampleKind::Grid | SampleKind::After => SampleSide::After,
        }
    }
}

/// Envelope values at one position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeSample {
    pub span: usize,
    pub kind: SampleKind,
    /// Position from the left end (mm)
    pub x_mm: f64,
    /// Governing moment (N·mm)
    pub moment_nmm: f64,
    /// Governing shear (N)
    pub shear_n: f64,
    /// Governing total deflection (mm, positive downward)
    pub deflection_mm: f64,
    /// Mechanical short-term part of the governing deflection
    pub deflection_mechanical_mm: f64,
    /// Thermal part of the governing deflection
    pub deflection_thermal_mm: f64,
    /// Creep part of the governing deflection
    pub deflection_creep_mm: f64,
    /// Allowable deflection of this span (mm)
    pub limit_mm: f64,
    /// Index of the case governing the moment
    pub moment_case: usize,
    /// Index of the case governing the shear
    pub shear_case: usize,
    /// Index of the case governing the deflection
    pub deflection_case: usize,
}

/// Deflection check of one span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanDeflection {
    pub span: usize,
    pub length_mm: f64,
    /// Largest |w| in the span (mm)
    pub max_deflection_mm: f64,
    /// L / denominator (mm)
    pub limit_mm: f64,
    /// max_deflection / limit
    pub ratio: f64,
}

/// Envelope over all load cases
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub samples: Vec<EnvelopeSample>,
    /// Largest |support moment| per node over all cases (N·mm)
    pub support_moments: Vec<f64>,
    pub spans: Vec<SpanDeflection>,
    /// Largest sagging moment (N·mm, ≥ 0)
    pub max_sagging_nmm: f64,
    /// Largest hogging moment (N·mm, ≤ 0)
    pub max_hogging_nmm: f64,
    /// Largest |M| over the samples (N·mm)
    pub max_moment_abs: f64,
    /// Largest |V| over the samples (N)
    pub max_shear_abs: f64,
    /// Largest |M| at a support (N·mm)
    pub max_support_moment: f64,
    /// Largest |w| anywhere (mm)
    pub max_deflection_abs: f64,
    /// Deflection of the span with the worst ratio (mm)
    pub governing_deflection_mm: f64,
    /// Limit of the span with the worst ratio (mm)
    pub deflection_limit_mm: f64,
    /// Worst span deflection ratio
    pub deflection_ratio: f64,
}

impl ResponseEnvelope {
    /// Build the envelope
    ///
    /// `limit_denominator` is the n of the L/n deflection limit.
    pub fn build(
        model: &BeamModel,
        cases: &[CaseSolutions],
        shared: &SharedSolutions,
        creep_mode: CreepMode,
        limit_denominator: f64,
    ) -> Self {
        let mut envelope = ResponseEnvelope {
            support_moments: support_moment_envelope(model, cases, &shared.thermal_uls),
            ..Default::default()
        };

        for element in &model.elements {
            let limit = element.length_mm / limit_denominator;
            let mut span_max = 0.0_f64;

            for (x, kind) in sample_positions(element, cases) {
                let sample = evaluate(element, x, kind, cases, shared, creep_mode, limit);
                span_max = span_max.max(sample.deflection_mm.abs());
                envelope.samples.push(sample);
            }

            envelope.spans.push(SpanDeflection {
                span: element.span,
                length_mm: element.length_mm,
                max_deflection_mm: span_max,
                limit_mm: limit,
                ratio: if limit > 0.0 { span_max / limit } else { 0.0 },
            });
        }

        envelope.summarize(model, limit_denominator);
        debug!(
            samples = envelope.samples.len(),
            max_moment = envelope.max_moment_abs,
            deflection_ratio = envelope.deflection_ratio,
            "envelope built"
        );
        envelope
    }

    fn summarize(&mut self, model: &BeamModel, limit_denominator: f64) {
        for s in &self.samples {
            self.max_sagging_nmm = self.max_sagging_nmm.max(s.moment_nmm);
            self.max_hogging_nmm = self.max_hogging_nmm.min(s.moment_nmm);
            self.max_moment_abs = self.max_moment_abs.max(s.moment_nmm.abs());
            self.max_shear_abs = self.max_shear_abs.max(s.shear_n.abs());
            self.max_deflection_abs = self.max_deflection_abs.max(s.deflection_mm.abs());
        }
        self.max_support_moment = self.support_moments.iter().copied().fold(0.0, f64::max);

        let worst = self
            .spans
            .iter()
            .filter(|s| s.limit_mm > 0.0)
            .fold(None::<&SpanDeflection>, |best, s| match best {
                Some(b) if b.ratio >= s.ratio => Some(b),
                _ => Some(s),
            });

        match worst {
            Some(span) if span.ratio > 0.0 => {
                self.governing_deflection_mm = span.max_deflection_mm;
                self.deflection_limit_mm = span.limit_mm;
                self.deflection_ratio = span.ratio;
            }
            _ => {
                let longest = model.elements.iter().map(|e| e.length_mm).fold(0.0, f64::max);
                self.governing_deflection_mm = self.max_deflection_abs;
                self.deflection_limit_mm = longest / limit_denominator;
                self.deflection_ratio = 0.0;
            }
        }
    }

    /// Samples of one span
    pub fn span_samples(&self, span: usize) -> impl Iterator<Item = &EnvelopeSample> {
        self.samples.iter().filter(move |s| s.span == span)
    }
}

/// Grid positions plus before/after positions at every point load of the
/// element in any case, sorted by position then kind
fn sample_positions(element: &BeamElement, cases: &[CaseSolutions]) -> Vec<(f64, SampleKind)> {
    let l = element.length_mm;
    let mut positions: Vec<(f64, SampleKind)> = (0..=STEPS_PER_SPAN)
        .map(|i| (l * i as f64 / STEPS_PER_SPAN as f64, SampleKind::Grid))
        .collect();

    let mut load_offsets: Vec<f64> = Vec::new();
    for case in cases {
        if let Some(e) = case.uls.element(element.span) {
            for p in &e.point_loads {
                if !load_offsets.iter().any(|a| (a - p.a_mm).abs() <= POSITION_TOLERANCE) {
                    load_offsets.push(p.a_mm);
                }
            }
        }
    }
    for a in load_offsets {
        positions.push((a, SampleKind::Before));
        positions.push((a, SampleKind::After));
    }

    positions.sort_by(|(xa, ka), (xb, kb)| xa.total_cmp(xb).then(ka.cmp(kb)));
    positions
}

fn deflection_of(solution: &BeamSolution, span: usize, x: f64) -> f64 {
    solution.element(span).map(|e| e.deflection_at(x)).unwrap_or(0.0)
}

fn evaluate(
    element: &BeamElement,
    x: f64,
    kind: SampleKind,
    cases: &[CaseSolutions],
    shared: &SharedSolutions,
    creep_mode: CreepMode,
    limit: f64,
) -> EnvelopeSample {
    let span = element.span;
    let side = kind.side();

    let (v_t, m_t) = shared
        .thermal_uls
        .element(span)
        .map(|t| (t.shear_at(x, side), t.moment_at(x, side)))
        .unwrap_or((0.0, 0.0));
    let w_thermal = deflection_of(&shared.thermal_sls, span, x);

    let sustained_creep = match (&shared.sustained, creep_mode) {
        (Some((short, long)), CreepMode::SustainedOnly) => {
            deflection_of(long, span, x) - deflection_of(short, span, x)
        }
        _ => 0.0,
    };

    let mut sample = EnvelopeSample {
        span,
        kind,
        x_mm: element.x0_mm + x,
        moment_nmm: 0.0,
        shear_n: 0.0,
        deflection_mm: 0.0,
        deflection_mechanical_mm: 0.0,
        deflection_thermal_mm: 0.0,
        deflection_creep_mm: 0.0,
        limit_mm: limit,
        moment_case: 0,
        shear_case: 0,
        deflection_case: 0,
    };
    let (mut best_m, mut best_v, mut best_w) = (f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);

    for (index, case) in cases.iter().enumerate() {
        let (v, m) = case
            .uls
            .element(span)
            .map(|e| (e.shear_at(x, side), e.moment_at(x, side)))
            .unwrap_or((0.0, 0.0));
        let (v, m) = (v + v_t, m + m_t);

        if m.abs() > best_m {
            best_m = m.abs();
            sample.moment_nmm = m;
            sample.moment_case = index;
        }
        if v.abs() > best_v {
            best_v = v.abs();
            sample.shear_n = v;
            sample.shear_case = index;
        }

        let w_mech = deflection_of(&case.sls_short, span, x);
        let w_creep = match (creep_mode, &case.sls_long) {
            (CreepMode::All, Some(long)) => deflection_of(long, span, x) - w_mech,
            (CreepMode::SustainedOnly, _) => sustained_creep,
            _ => 0.0,
        };
        let w = w_mech + w_thermal + w_creep;

        if w.abs() > best_w {
            best_w = w.abs();
            sample.deflection_mm = w;
            sample.deflection_mechanical_mm = w_mech;
            sample.deflection_thermal_mm = w_thermal;
            sample.deflection_creep_mm = w_creep;
            sample.deflection_case = index;
        }
    }

    sample
}

/// Largest |support moment| per node, mechanical ULS plus thermal ULS
pub fn support_moment_envelope(model: &BeamModel, cases: &[CaseSolutions], thermal: &BeamSolution) -> Vec<f64> {
    (0..model.node_count())
        .map(|node| {
            cases
                .iter()
                .map(|case| {
                    let left = case
                        .uls
                        .moment_left_of(node)
                        .map(|m| (m + thermal.moment_left_of(node).unwrap_or(0.0)).abs())
                        .unwrap_or(0.0);
                    let right = case
                        .uls
                        .moment_right_of(node)
                        .map(|m| (m + thermal.moment_right_of(node).unwrap_or(0.0)).abs())
                        .unwrap_or(0.0);
                    left.max(right)
                })
                .fold(0.0, f64::max)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::continuous_beam::{BeamLoads, ContinuousBeamSolver, SectionStiffness};
    use crate::loads::{AppliedPointLoad, PointLoadKind};

    const EI: f64 = 1.2e11;

    fn single_case(model: &BeamModel, loads: &BeamLoads) -> (Vec<CaseSolutions>, SharedSolutions) {
        let solver = ContinuousBeamSolver::new(model, SectionStiffness::new(EI, 1.75e5, 1.0));
        let hinges = vec![false; model.node_count()];
        let sol = solver.solve(loads, &hinges).unwrap();
        let zero = solver.solve(&BeamLoads::default(), &hinges).unwrap();
        (
            vec![CaseSolutions {
                name: "pressure".to_string(),
                uls: sol.clone(),
                sls_short: sol,
                sls_long: None,
            }],
            SharedSolutions {
                thermal_uls: zero.clone(),
                thermal_sls: zero,
                sustained: None,
            },
        )
    }

    #[test]
    fn test_grid_sample_count() {
        let model = BeamModel::new(&[3000.0, 2000.0]);
        let (cases, shared) = single_case(&model, &BeamLoads::uniform(1.0));
        let env = ResponseEnvelope::build(&model, &cases, &shared, CreepMode::None, 150.0);

        assert_eq!(env.samples.len(), 2 * (STEPS_PER_SPAN + 1));
        assert_eq!(env.spans.len(), 2);
        assert!((env.spans[0].limit_mm - 20.0).abs() < 1e-12);
        let last = env.span_samples(1).last().unwrap();
        assert!((last.x_mm - 5000.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_load_samples_ordered() {
        let model = BeamModel::new(&[3000.0]);
        let loads = BeamLoads::default().with_point_loads(vec![AppliedPointLoad {
            x_mm: 1500.0,
            force_n: 1000.0,
            kind: PointLoadKind::Permanent,
        }]);
        let (cases, shared) = single_case(&model, &loads);
        let env = ResponseEnvelope::build(&model, &cases, &shared, CreepMode::None, 150.0);

        let at_load: Vec<&EnvelopeSample> = env
            .samples
            .iter()
            .filter(|s| (s.x_mm - 1500.0).abs() < 1e-9)
            .collect();
        let kinds: Vec<SampleKind> = at_load.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SampleKind::Before, SampleKind::Grid, SampleKind::After]);

        assert!((at_load[0].shear_n - 500.0).abs() < 1e-9);
        assert!((at_load[1].shear_n + 500.0).abs() < 1e-9);
        assert!((at_load[0].shear_n - at_load[2].shear_n - 1000.0).abs() < 1e-9);
        assert!((env.max_sagging_nmm - 1000.0 * 3000.0 / 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_support_moment_envelope_two_span() {
        let model = BeamModel::new(&[3000.0, 3000.0]);
        let (cases, shared) = single_case(&model, &BeamLoads::uniform(1.0));
        let env = ResponseEnvelope::build(&model, &cases, &shared, CreepMode::None, 150.0);

        assert_eq!(env.support_moments.len(), 3);
        assert!(env.support_moments[0] < 1e-6);
        assert!(env.support_moments[1] > 0.0);
        assert!((env.max_support_moment - env.support_moments[1]).abs() < 1e-12);
        assert!(env.max_hogging_nmm < 0.0);
    }

    #[test]
    fn test_worst_span_governs_deflection() {
        let model = BeamModel::new(&[4000.0, 2000.0]);
        let (cases, shared) = single_case(&model, &BeamLoads::uniform(1.0));
        let env = ResponseEnvelope::build(&model, &cases, &shared, CreepMode::None, 200.0);

        assert!(env.spans[0].ratio > env.spans[1].ratio);
        assert!((env.deflection_limit_mm - 20.0).abs() < 1e-12);
        assert!((env.deflection_ratio - env.spans[0].ratio).abs() < 1e-12);
    }
}
