//! # Sandwich Panel Analysis
//!
//! Complete analysis of a multi-span sandwich panel: section properties,
//! load cases, continuous-beam solves with support redistribution, the
//! response envelope and all capacity checks.
//!
//! ## Pipeline
//!
//! ```text
//! PanelInput ─sanitized()→ PanelModel
//!   → SectionProperties → LoadModel
//!   → thermal ULS/SLS solves (elastic)
//!   → per case: ULS redistribution, SLS short (and long) solves
//!   → ResponseEnvelope → CapacityResult → PanelResult
//! ```
//!
//! ## Example
//!
//! ```rust
//! use panel_core::calculations::panel::{analyze, PanelInput};
//! use panel_core::loads::UsageClass;
//!
//! let input = PanelInput {
//!     label: "W-1".to_string(),
//!     usage: UsageClass::ExternalWall,
//!     spans_m: vec![3.0, 3.0],
//!     ..Default::default()
//! };
//!
//! let result = analyze(&input).unwrap();
//! println!("Max moment: {:.2} kN·m", result.summary.max_moment_knm);
//! println!("Status: {:?}", result.summary.status);
//! ```
//!
//! ## JSON Example
//!
//! Every field is optional; omitted fields take their defaults.
//!
//! ```json
//! {
//!   "label": "C-1",
//!   "usage": "ceiling",
//!   "geometry": { "core_thickness_mm": 100.0, "skin_outer_mm": 0.5 },
//!   "spans_m": [4.0, 4.0],
//!   "point_loads": [
//!     { "position_m": 2.0, "magnitude_kn": 0.5, "kind": "permanent" }
//!   ],
//!   "loads": { "wind_kpa": 0.6, "live_load_kpa": 0.25 }
//! }
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculations::capacity::{
    check, CapacityInput, CapacityRatios, CheckStatus, FastenerConfig, Resistances, SupportCheck,
    DEFAULT_BEARING_WIDTH_MM,
};
use crate::calculations::continuous_beam::{BeamLoads, BeamModel, ContinuousBeamSolver, SectionStiffness};
use crate::calculations::envelope::{CaseSolutions, ResponseEnvelope, SharedSolutions};
use crate::calculations::redistribution::{redistribute, RedistributionSettings};
use crate::calculations::section::{PanelGeometry, SectionProperties};
use crate::errors::{CalcError, CalcResult};
use crate::loads::{
    AppliedPointLoad, CreepFactors, CreepMode, LoadInput, LoadModel, PartialFactors, PointLoad,
    UsageClass, WindDirection, STEEL_THERMAL_EXPANSION,
};
use crate::materials::{CoreMaterial, MaterialFactors, SkinSteel};
use crate::units::{KiloNewtonMeters, KiloNewtons, Meters, Millimeters, NewtonMillimeters, Newtons};

// =============================================================================
// INPUT
// =============================================================================

/// Input parameters for a panel analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelInput {
    /// User label (e.g., "W-1", "Cold room ceiling")
    pub label: String,
    pub usage: UsageClass,
    pub geometry: PanelGeometry,
    /// Span lengths, left to right (m)
    pub spans_m: Vec<f64>,
    /// Bearing width per support (mm), one more than spans
    pub bearing_widths_mm: Vec<f64>,
    /// Concentrated loads (ceilings only)
    pub point_loads: Vec<PointLoad>,
    pub loads: LoadInput,
    pub factors: PartialFactors,
    pub material_factors: MaterialFactors,
    pub creep: CreepFactors,
    pub fasteners: FastenerConfig,
    /// Deflection limit denominator n of L/n; the usage class default when unset
    pub deflection_limit: Option<f64>,
    /// Shear correction factor κ
    pub shear_correction: f64,
    /// Skin thermal expansion α (1/K)
    pub thermal_expansion: f64,
    pub redistribution: RedistributionSettings,
}

impl Default for PanelInput {
    fn default() -> Self {
        Self {
            label: String::new(),
            usage: UsageClass::default(),
            geometry: PanelGeometry::default(),
            spans_m: vec![3.0, 3.0],
            bearing_widths_mm: vec![DEFAULT_BEARING_WIDTH_MM; 3],
            point_loads: vec![PointLoad::permanent(1.5, 0.3), PointLoad::permanent(4.5, 0.3)],
            loads: LoadInput::default(),
            factors: PartialFactors::default(),
            material_factors: MaterialFactors::default(),
            creep: CreepFactors::default(),
            fasteners: FastenerConfig::default(),
            deflection_limit: None,
            shear_correction: 1.0,
            thermal_expansion: STEEL_THERMAL_EXPANSION,
            redistribution: RedistributionSettings::default(),
        }
    }
}

/// Sanitized input in solver units
///
/// Produced only by [`PanelInput::sanitized`]; all values are finite and
/// within range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelModel {
    pub label: String,
    pub usage: UsageClass,
    pub geometry: PanelGeometry,
    /// Span lengths (mm); unmeshable spans are kept as 0
    pub spans_mm: Vec<f64>,
    /// Bearing width per support (mm)
    pub bearing_widths_mm: Vec<f64>,
    /// Point loads within the panel length
    pub point_loads: Vec<AppliedPointLoad>,
    pub loads: LoadInput,
    pub factors: PartialFactors,
    pub material_factors: MaterialFactors,
    pub creep: CreepFactors,
    pub fasteners: FastenerConfig,
    /// n of the L/n deflection limit
    pub deflection_denominator: f64,
    pub kappa: f64,
    pub thermal_expansion: f64,
    pub redistribution: RedistributionSettings,
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}

fn sanitize_geometry(g: &PanelGeometry) -> PanelGeometry {
    let d = PanelGeometry::default();
    let skin = SkinSteel::default();
    let core = CoreMaterial::default();
    PanelGeometry {
        core_thickness_mm: finite_or(g.core_thickness_mm, d.core_thickness_mm).max(0.0),
        skin_outer_mm: finite_or(g.skin_outer_mm, d.skin_outer_mm).max(0.0),
        skin_inner_mm: finite_or(g.skin_inner_mm, d.skin_inner_mm).max(0.0),
        width_mm: positive_or(g.width_mm, d.width_mm),
        skin: SkinSteel {
            modulus_mpa: finite_or(g.skin.modulus_mpa, skin.modulus_mpa),
            yield_strength_mpa: finite_or(g.skin.yield_strength_mpa, skin.yield_strength_mpa),
        },
        core: CoreMaterial {
            modulus_mpa: finite_or(g.core.modulus_mpa, core.modulus_mpa),
            shear_modulus_mpa: finite_or(g.core.shear_modulus_mpa, core.shear_modulus_mpa),
            shear_strength_mpa: positive_or(g.core.shear_strength_mpa, core.shear_strength_mpa),
            crush_strength_mpa: positive_or(g.core.crush_strength_mpa, core.crush_strength_mpa),
            density_kg_m3: finite_or(g.core.density_kg_m3, core.density_kg_m3).max(0.0),
        },
    }
}

fn sanitize_loads(l: &LoadInput) -> LoadInput {
    let d = LoadInput::default();
    LoadInput {
        dead_load_manual_kpa: finite_or(l.dead_load_manual_kpa, d.dead_load_manual_kpa),
        live_load_kpa: finite_or(l.live_load_kpa, d.live_load_kpa),
        wind_kpa: finite_or(l.wind_kpa, d.wind_kpa),
        temp_outer_c: finite_or(l.temp_outer_c, d.temp_outer_c),
        temp_inner_c: finite_or(l.temp_inner_c, d.temp_inner_c),
        ..*l
    }
}

fn sanitize_factors(f: &PartialFactors) -> PartialFactors {
    let d = PartialFactors::default();
    PartialFactors {
        gamma_g: finite_or(f.gamma_g, d.gamma_g),
        gamma_q: finite_or(f.gamma_q, d.gamma_q),
        gamma_wind: finite_or(f.gamma_wind, d.gamma_wind),
        gamma_thermal: finite_or(f.gamma_thermal, d.gamma_thermal),
        favourable_permanent: finite_or(f.favourable_permanent, d.favourable_permanent),
    }
}

fn sanitize_material_factors(f: &MaterialFactors) -> MaterialFactors {
    let d = MaterialFactors::default();
    MaterialFactors {
        wrinkling: positive_or(f.wrinkling, d.wrinkling),
        yield_strength: positive_or(f.yield_strength, d.yield_strength),
        core_shear: positive_or(f.core_shear, d.core_shear),
        fastener: positive_or(f.fastener, d.fastener),
    }
}

impl PanelInput {
    /// Default all unusable values and convert to solver units
    ///
    /// # Errors
    ///
    /// [`CalcError::InvalidInput`] when no span is positive and finite.
    pub fn sanitized(&self) -> CalcResult<PanelModel> {
        if self.spans_m.is_empty() {
            return Err(CalcError::invalid_input("spans_m", "[]", "At least one span is required"));
        }

        let spans_mm: Vec<f64> = self
            .spans_m
            .iter()
            .map(|&s| {
                if s.is_finite() && s > 0.0 {
                    Millimeters::from(Meters(s)).value()
                } else {
                    warn!(span_m = s, "span is not positive, it will not be meshed");
                    0.0
                }
            })
            .collect();
        let total_mm: f64 = spans_mm.iter().sum();
        if total_mm <= 0.0 {
            return Err(CalcError::invalid_input(
                "spans_m",
                format!("{:?}", self.spans_m),
                "No span has a positive length",
            ));
        }

        let bearing_widths_mm = (0..=spans_mm.len())
            .map(|i| positive_or(self.bearing_widths_mm.get(i).copied().unwrap_or(f64::NAN), DEFAULT_BEARING_WIDTH_MM))
            .collect();

        let total_m = Meters::from(Millimeters(total_mm)).value();
        let point_loads = self
            .point_loads
            .iter()
            .filter_map(|pl| {
                let usable = pl.position_m.is_finite()
                    && pl.magnitude_kn.is_finite()
                    && (0.0..=total_m).contains(&pl.position_m);
                if !usable {
                    warn!(
                        position_m = pl.position_m,
                        magnitude_kn = pl.magnitude_kn,
                        "point load discarded"
                    );
                    return None;
                }
                Some(AppliedPointLoad {
                    x_mm: Millimeters::from(Meters(pl.position_m)).value(),
                    force_n: Newtons::from(KiloNewtons(pl.magnitude_kn)).value(),
                    kind: pl.kind,
                })
            })
            .collect();

        let creep_default = CreepFactors::default();
        let fastener_default = FastenerConfig::default();
        let deflection_denominator = self
            .deflection_limit
            .filter(|n| n.is_finite() && *n > 0.0)
            .unwrap_or_else(|| self.usage.recommended_deflection_limit());

        Ok(PanelModel {
            label: self.label.clone(),
            usage: self.usage,
            geometry: sanitize_geometry(&self.geometry),
            spans_mm,
            bearing_widths_mm,
            point_loads,
            loads: sanitize_loads(&self.loads),
            factors: sanitize_factors(&self.factors),
            material_factors: sanitize_material_factors(&self.material_factors),
            creep: CreepFactors {
                shear: finite_or(self.creep.shear, creep_default.shear),
                bending: finite_or(self.creep.bending, creep_default.bending),
            },
            fasteners: FastenerConfig {
                strength_kn: finite_or(self.fasteners.strength_kn, fastener_default.strength_kn),
                spacing_mm: finite_or(self.fasteners.spacing_mm, fastener_default.spacing_mm),
            },
            deflection_denominator,
            kappa: positive_or(self.shear_correction, 1.0),
            thermal_expansion: finite_or(self.thermal_expansion, STEEL_THERMAL_EXPANSION),
            redistribution: RedistributionSettings {
                trigger_ratio: positive_or(self.redistribution.trigger_ratio, 1.0),
                ..self.redistribution
            },
        })
    }
}

// =============================================================================
// RESULT
// =============================================================================

/// One plotted position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultSample {
    pub span: usize,
    pub x_m: f64,
    pub moment_knm: f64,
    pub shear_kn: f64,
    pub deflection_mm: f64,
    pub deflection_mechanical_mm: f64,
    pub deflection_thermal_mm: f64,
    pub deflection_creep_mm: f64,
    pub limit_mm: f64,
    pub limit_neg_mm: f64,
}

/// Per-case solve summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    pub name: String,
    pub q_sls_kpa: f64,
    pub q_uls_kpa: f64,
    pub hinge_nodes: Vec<usize>,
    pub redistribution_iterations: usize,
    /// Σ reactions of the ULS solve (N)
    pub uls_total_reaction_n: f64,
}

/// Headline results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSummary {
    pub moment_resistance_knm: f64,
    pub shear_resistance_kn: f64,
    pub worst_crushing_resistance_kn: f64,
    pub worst_uplift_resistance_kn: f64,
    pub deflection_denominator: f64,
    pub deflection_limit_mm: f64,
    pub max_sagging_knm: f64,
    pub max_hogging_knm: f64,
    pub max_moment_knm: f64,
    pub max_support_moment_knm: f64,
    pub max_shear_kn: f64,
    pub max_reaction_kn: f64,
    pub max_uplift_kn: f64,
    pub max_deflection_mm: f64,
    pub span_stress_mpa: f64,
    pub support_stress_mpa: f64,
    pub stress_limit_mpa: f64,
    pub ratios: CapacityRatios,
    pub status: CheckStatus,
    pub advisories: Vec<String>,
    /// Nodes hinged in any case
    pub hinge_nodes: Vec<usize>,
    pub support_positions_m: Vec<f64>,
}

/// Section values for reporting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionReport {
    pub ei_nmm2: f64,
    pub ga_n: f64,
    pub ei_long_nmm2: f64,
    pub ga_long_n: f64,
    pub eccentricity_mm: f64,
    pub neutral_axis_mm: f64,
    pub i_eq_mm4: f64,
    pub z_max_mm: f64,
    pub self_weight_kpa: f64,
    pub wrinkling_stress_mpa: f64,
    pub design_wrinkling_mpa: f64,
    pub design_yield_mpa: f64,
}

/// Load values for reporting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub dead_kpa: f64,
    pub live_kpa: f64,
    pub wind_kpa: f64,
    pub design_case: WindDirection,
    pub q_sls_kpa: f64,
    pub q_uls_kpa: f64,
    pub q_sls_line_n_mm: f64,
    pub q_uls_line_n_mm: f64,
    pub delta_t: f64,
    pub thermal_moment_uls_knm: f64,
    pub creep_mode: CreepMode,
    pub phi_shear: f64,
    pub phi_bending: f64,
}

/// Complete analysis output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelResult {
    pub label: String,
    pub usage: UsageClass,
    pub samples: Vec<ResultSample>,
    pub supports: Vec<SupportCheck>,
    pub cases: Vec<CaseReport>,
    pub summary: PanelSummary,
    pub section: SectionReport,
    pub loads: LoadReport,
}

impl PanelResult {
    /// Returns true if every check passes
    pub fn passes(&self) -> bool {
        self.summary.status == CheckStatus::Pass
    }
}

fn knm(nmm: f64) -> f64 {
    KiloNewtonMeters::from(NewtonMillimeters(nmm)).value()
}

fn kn(n: f64) -> f64 {
    KiloNewtons::from(Newtons(n)).value()
}

// =============================================================================
// ANALYSIS
// =============================================================================

/// Analyze a panel
///
/// # Errors
///
/// - [`CalcError::InvalidInput`] for a span layout with no meshable span
/// - [`CalcError::IllConditioned`] when a stiffness system is singular; the
///   error names the case being solved
pub fn analyze(input: &PanelInput) -> CalcResult<PanelResult> {
    let model = input.sanitized()?;
    info!(
        label = %model.label,
        usage = %model.usage,
        spans = model.spans_mm.len(),
        "analyzing panel"
    );

    let section = SectionProperties::from_geometry(&model.geometry);
    let loads = LoadModel::derive(&model, &section);
    let beam = BeamModel::new(&model.spans_mm);

    let short = ContinuousBeamSolver::new(
        &beam,
        SectionStiffness::new(section.ei_nmm2, section.ga_n, model.kappa),
    );
    let long = ContinuousBeamSolver::new(
        &beam,
        SectionStiffness::new(loads.creep.ei_long, loads.creep.ga_long, model.kappa),
    );
    let elastic = vec![false; beam.node_count()];

    let thermal_uls = short
        .solve(&BeamLoads::thermal(loads.thermal.moment_uls), &elastic)
        .map_err(|e| e.in_case("thermal ULS"))?;
    let thermal_sls = short
        .solve(&BeamLoads::thermal(loads.thermal.moment_sls), &elastic)
        .map_err(|e| e.in_case("thermal SLS"))?;

    let sustained = if loads.creep.mode == CreepMode::SustainedOnly && loads.has_sustained_load() {
        let sustained_loads = BeamLoads::uniform(loads.dead_line).with_point_loads(loads.permanent_point_loads());
        let s_short = short
            .solve(&sustained_loads, &elastic)
            .map_err(|e| e.in_case("sustained"))?;
        let s_long = long
            .solve(&sustained_loads, &elastic)
            .map_err(|e| e.in_case("sustained long-term"))?;
        Some((s_short, s_long))
    } else {
        None
    };

    let resistances = Resistances::new(&section, &model.geometry, &model.material_factors);

    let mut cases = Vec::with_capacity(loads.cases.len());
    let mut reports = Vec::with_capacity(loads.cases.len());
    let mut all_hinges = BTreeSet::new();

    for case in &loads.cases {
        let uls_loads = BeamLoads::uniform(case.q_uls_line)
            .with_point_loads(case.factored_point_loads(&loads.point_loads));
        let outcome = redistribute(
            &short,
            &uls_loads,
            &thermal_uls,
            resistances.moment_nmm,
            &model.redistribution,
        )
        .map_err(|e| e.in_case(case.name()))?;

        let sls_loads = BeamLoads::uniform(case.q_sls_line)
            .with_point_loads(case.service_point_loads(&loads.point_loads));
        let sls_short = short
            .solve(&sls_loads, &elastic)
            .map_err(|e| e.in_case(case.name()))?;
        let sls_long = if loads.creep.mode == CreepMode::All {
            Some(long.solve(&sls_loads, &elastic).map_err(|e| e.in_case(case.name()))?)
        } else {
            None
        };

        let hinge_nodes = outcome.hinge_nodes();
        all_hinges.extend(hinge_nodes.iter().copied());
        reports.push(CaseReport {
            name: case.name().to_string(),
            q_sls_kpa: case.q_sls_kpa,
            q_uls_kpa: case.q_uls_kpa,
            hinge_nodes,
            redistribution_iterations: outcome.iterations,
            uls_total_reaction_n: outcome.solution.total_reaction(),
        });
        cases.push(CaseSolutions {
            name: case.name().to_string(),
            uls: outcome.solution,
            sls_short,
            sls_long,
        });
    }

    let shared = SharedSolutions {
        thermal_uls,
        thermal_sls,
        sustained,
    };
    let envelope = ResponseEnvelope::build(
        &beam,
        &cases,
        &shared,
        loads.creep.mode,
        model.deflection_denominator,
    );

    let hinge_nodes: Vec<usize> = all_hinges.into_iter().collect();
    let capacity = check(&CapacityInput {
        model: &beam,
        section: &section,
        geometry: &model.geometry,
        resistances: &resistances,
        factors: &model.material_factors,
        usage: model.usage,
        fasteners: &model.fasteners,
        bearing_widths_mm: &model.bearing_widths_mm,
        cases: &cases,
        thermal_uls: &shared.thermal_uls,
        envelope: &envelope,
        creep: &loads.creep,
        hinge_nodes: &hinge_nodes,
    });

    info!(
        status = ?capacity.status,
        max_ratio = capacity.ratios.max(),
        hinges = hinge_nodes.len(),
        "panel analysis complete"
    );

    let samples = envelope
        .samples
        .iter()
        .map(|s| ResultSample {
            span: s.span,
            x_m: Meters::from(Millimeters(s.x_mm)).value(),
            moment_knm: knm(s.moment_nmm),
            shear_kn: kn(s.shear_n),
            deflection_mm: s.deflection_mm,
            deflection_mechanical_mm: s.deflection_mechanical_mm,
            deflection_thermal_mm: s.deflection_thermal_mm,
            deflection_creep_mm: s.deflection_creep_mm,
            limit_mm: s.limit_mm,
            limit_neg_mm: -s.limit_mm,
        })
        .collect();

    let design = loads.design_case();
    Ok(PanelResult {
        label: model.label.clone(),
        usage: model.usage,
        samples,
        cases: reports,
        summary: PanelSummary {
            moment_resistance_knm: knm(resistances.moment_nmm),
            shear_resistance_kn: kn(resistances.shear_n),
            worst_crushing_resistance_kn: kn(capacity.worst_crushing_resistance_n),
            worst_uplift_resistance_kn: kn(capacity.worst_uplift_resistance_n),
            deflection_denominator: model.deflection_denominator,
            deflection_limit_mm: envelope.deflection_limit_mm,
            max_sagging_knm: knm(envelope.max_sagging_nmm),
            max_hogging_knm: knm(envelope.max_hogging_nmm),
            max_moment_knm: knm(envelope.max_moment_abs),
            max_support_moment_knm: knm(envelope.max_support_moment),
            max_shear_kn: kn(envelope.max_shear_abs),
            max_reaction_kn: kn(capacity.max_reaction_n),
            max_uplift_kn: kn(capacity.max_uplift_n),
            max_deflection_mm: envelope.governing_deflection_mm,
            span_stress_mpa: capacity.span_stress_mpa,
            support_stress_mpa: capacity.support_stress_mpa,
            stress_limit_mpa: resistances.stress_limit_mpa,
            ratios: capacity.ratios,
            status: capacity.status,
            advisories: capacity.advisories,
            hinge_nodes,
            support_positions_m: beam.support_positions_m(),
        },
        supports: capacity.supports,
        section: SectionReport {
            ei_nmm2: section.ei_nmm2,
            ga_n: section.ga_n,
            ei_long_nmm2: loads.creep.ei_long,
            ga_long_n: loads.creep.ga_long,
            eccentricity_mm: section.eccentricity_mm,
            neutral_axis_mm: section.neutral_axis_mm,
            i_eq_mm4: section.i_eq_mm4,
            z_max_mm: section.z_max_mm,
            self_weight_kpa: section.self_weight_kpa,
            wrinkling_stress_mpa: resistances.wrinkling_stress_mpa,
            design_wrinkling_mpa: resistances.design_wrinkling_mpa,
            design_yield_mpa: resistances.design_yield_mpa,
        },
        loads: LoadReport {
            dead_kpa: loads.area.dead_kpa,
            live_kpa: loads.area.live_kpa,
            wind_kpa: loads.area.wind_kpa,
            design_case: design.direction,
            q_sls_kpa: design.q_sls_kpa,
            q_uls_kpa: design.q_uls_kpa,
            q_sls_line_n_mm: design.q_sls_line,
            q_uls_line_n_mm: design.q_uls_line,
            delta_t: loads.thermal.delta_t,
            thermal_moment_uls_knm: knm(loads.thermal.moment_uls),
            creep_mode: loads.creep.mode,
            phi_shear: loads.creep.phi_shear,
            phi_bending: loads.creep.phi_bending,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::PointLoadKind;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_default_input_json_roundtrip() {
        let input = PanelInput::default();
        let json = serde_json::to_string(&input).unwrap();
        let back: PanelInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input, back);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let input: PanelInput = serde_json::from_str(r#"{"usage": "ceiling", "spans_m": [4.0]}"#).unwrap();
        assert_eq!(input.usage, UsageClass::Ceiling);
        assert_eq!(input.spans_m, vec![4.0]);
        assert_eq!(input.geometry.core_thickness_mm, 50.0);
        assert_eq!(input.loads.wind_kpa, 0.8);
    }

    #[test]
    fn test_sanitize_converts_units() {
        let model = PanelInput::default().sanitized().unwrap();
        assert_eq!(model.spans_mm, vec![3000.0, 3000.0]);
        assert_eq!(model.point_loads.len(), 2);
        assert!(approx_eq(model.point_loads[0].x_mm, 1500.0, 1e-9));
        assert!(approx_eq(model.point_loads[0].force_n, 300.0, 1e-9));
        assert_eq!(model.point_loads[0].kind, PointLoadKind::Permanent);
        assert_eq!(model.deflection_denominator, 150.0);
    }

    #[test]
    fn test_sanitize_filters_point_loads() {
        let input = PanelInput {
            point_loads: vec![
                PointLoad::permanent(-0.5, 1.0),
                PointLoad::permanent(6.5, 1.0),
                PointLoad::variable(f64::NAN, 1.0),
                PointLoad::variable(2.0, f64::INFINITY),
                PointLoad::variable(6.0, 1.0),
            ],
            ..Default::default()
        };
        let model = input.sanitized().unwrap();
        assert_eq!(model.point_loads.len(), 1);
        assert!(approx_eq(model.point_loads[0].x_mm, 6000.0, 1e-9));
    }

    #[test]
    fn test_sanitize_defaults_bad_values() {
        let mut input = PanelInput {
            bearing_widths_mm: vec![80.0, -1.0],
            deflection_limit: Some(f64::NAN),
            shear_correction: 0.0,
            ..Default::default()
        };
        input.geometry.skin_outer_mm = -0.3;
        input.geometry.core_thickness_mm = f64::NAN;
        input.loads.wind_kpa = f64::INFINITY;

        let model = input.sanitized().unwrap();
        assert_eq!(model.bearing_widths_mm, vec![80.0, 60.0, 60.0]);
        assert_eq!(model.deflection_denominator, 150.0);
        assert_eq!(model.kappa, 1.0);
        assert_eq!(model.geometry.skin_outer_mm, 0.0);
        assert_eq!(model.geometry.core_thickness_mm, 50.0);
        assert_eq!(model.loads.wind_kpa, 0.8);
    }

    #[test]
    fn test_unmeshable_layout_rejected() {
        let empty = PanelInput {
            spans_m: vec![],
            ..Default::default()
        };
        assert_eq!(empty.sanitized().unwrap_err().error_code(), "INVALID_INPUT");

        let zero = PanelInput {
            spans_m: vec![0.0, -2.0, f64::NAN],
            ..Default::default()
        };
        assert!(matches!(analyze(&zero), Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_zero_span_is_skipped() {
        let input = PanelInput {
            spans_m: vec![3.0, 0.0, 3.0],
            point_loads: vec![],
            ..Default::default()
        };
        let result = analyze(&input).unwrap();
        assert_eq!(result.supports.len(), 4);
        assert_eq!(result.summary.support_positions_m, vec![0.0, 3.0, 3.0, 6.0]);
        assert!(result.samples.iter().all(|s| s.span != 1));
    }

    #[test]
    fn test_default_wall_analysis() {
        let result = analyze(&PanelInput::default()).unwrap();

        assert_eq!(result.cases.len(), 2);
        assert_eq!(result.cases[0].name, "pressure");
        assert_eq!(result.supports.len(), 3);
        assert_eq!(result.samples.len(), 2 * 41);
        assert!(result.summary.max_moment_knm > 0.0);
        assert!(result.summary.moment_resistance_knm > 0.0);
        assert!(approx_eq(result.loads.delta_t, 40.0, 1e-12));
        assert_eq!(result.loads.creep_mode, CreepMode::None);
        assert!(!result.summary.advisories.is_empty());
    }

    #[test]
    fn test_ceiling_samples_bracket_point_loads() {
        let input = PanelInput {
            usage: UsageClass::Ceiling,
            ..Default::default()
        };
        let result = analyze(&input).unwrap();

        // Two point loads at mid-span add a before and after sample each
        assert_eq!(result.samples.len(), 2 * 41 + 4);
        assert_eq!(result.loads.creep_mode, CreepMode::SustainedOnly);
        assert!(result.samples.iter().any(|s| s.deflection_creep_mm.abs() > 0.0));
        assert!(result.summary.advisories.iter().any(|a| a.contains("creep")));
    }

    #[test]
    fn test_zero_stiffness_is_ill_conditioned() {
        let mut input = PanelInput::default();
        input.geometry.skin.modulus_mpa = 0.0;
        input.geometry.core.modulus_mpa = 0.0;

        let err = analyze(&input).unwrap_err();
        match err {
            CalcError::IllConditioned { case, .. } => assert_eq!(case, "thermal ULS"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
