//! # Capacity Checks
//!
//! Compares the enveloped response with the panel resistances.
//!
//! ## Resistances
//!
//! ```text
//! σ_w   = 0.5 √(Ef Ec Gc)                 face wrinkling
//! σ_lim = min(σ_w / γM,w , fy / γM,y)
//! M_Rd  = σ_lim I_eq / z_max
//! V_Rd  = fCv A_c / γM,s
//! F_Rd  = fCc b w_bearing / γM,s          crushing at one support
//! T_Rd  = n N_screw / γM,screw            pull-out at one support (walls)
//! ```
//!
//! Any ratio above 1.0 fails the panel. Ratios that cannot be evaluated are
//! reported as [`RATIO_SENTINEL`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::continuous_beam::{BeamModel, BeamSolution};
use crate::calculations::envelope::{CaseSolutions, ResponseEnvelope};
use crate::calculations::section::{PanelGeometry, SectionProperties};
use crate::equations::section::wrinkling_stress;
use crate::loads::{CreepMode, CreepModel, UsageClass};
use crate::materials::MaterialFactors;

/// Ratio reported when a resistance is zero or a ratio is not finite
pub const RATIO_SENTINEL: f64 = 999.0;

/// Bearing width used when none is configured (mm)
pub const DEFAULT_BEARING_WIDTH_MM: f64 = 60.0;

/// Support fastening against uplift
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FastenerConfig {
    /// Characteristic pull-out strength of one fastener (kN)
    pub strength_kn: f64,
    /// Fastener spacing across the panel width (mm)
    pub spacing_mm: f64,
}

impl Default for FastenerConfig {
    fn default() -> Self {
        Self {
            strength_kn: 2.0,
            spacing_mm: 1000.0,
        }
    }
}

impl FastenerConfig {
    /// Fasteners per support across `width_mm`
    pub fn count(&self, width_mm: f64) -> usize {
        if self.spacing_mm > 0.0 {
            (width_mm / self.spacing_mm).round().max(1.0) as usize
        } else {
            1
        }
    }

    /// Design pull-out resistance of one support (N)
    pub fn resistance(&self, width_mm: f64, gamma: f64) -> f64 {
        if self.strength_kn > 0.0 {
            self.strength_kn * 1000.0 * self.count(width_mm) as f64 / gamma.max(1e-9)
        } else {
            0.0
        }
    }
}

/// Pass / fail state of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail,
    NotApplicable,
}

impl CheckStatus {
    fn from_ratio(ratio: f64) -> Self {
        if ratio <= 1.0 {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        }
    }
}

/// Section resistances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resistances {
    /// Characteristic wrinkling stress σ_w (MPa)
    pub wrinkling_stress_mpa: f64,
    /// σ_w / γM,w (MPa)
    pub design_wrinkling_mpa: f64,
    /// fy / γM,y (MPa)
    pub design_yield_mpa: f64,
    /// Governing skin stress σ_lim (MPa)
    pub stress_limit_mpa: f64,
    /// Bending resistance M_Rd (N·mm)
    pub moment_nmm: f64,
    /// Core shear resistance V_Rd (N)
    pub shear_n: f64,
}

impl Resistances {
    pub fn new(section: &SectionProperties, geometry: &PanelGeometry, factors: &MaterialFactors) -> Self {
        let sigma_w = wrinkling_stress(
            geometry.skin.modulus_mpa,
            geometry.core.modulus_mpa,
            geometry.core.shear_modulus_mpa,
        );
        let design_wrinkling = sigma_w / factors.wrinkling;
        let design_yield = geometry.skin.yield_strength_mpa / factors.yield_strength;
        let stress_limit = design_wrinkling.min(design_yield);

        Self {
            wrinkling_stress_mpa: sigma_w,
            design_wrinkling_mpa: design_wrinkling,
            design_yield_mpa: design_yield,
            stress_limit_mpa: stress_limit,
            moment_nmm: stress_limit * section.i_eq_mm4 / section.z_max_mm.max(1e-9),
            shear_n: geometry.core.shear_strength_mpa * section.area_core_mm2 / factors.core_shear,
        }
    }
}

/// Crushing and uplift check of one support
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportCheck {
    pub index: usize,
    /// Support position (m)
    pub x_m: f64,
    pub bearing_width_mm: f64,
    /// Largest compressive ULS reaction (N)
    pub reaction_n: f64,
    /// Crushing resistance F_Rd (N)
    pub crushing_resistance_n: f64,
    pub crushing_ratio: f64,
    pub crushing_status: CheckStatus,
    /// Bearing width that would give a ratio of 1.0 (mm)
    pub required_width_mm: f64,
    /// Largest tensile ULS reaction (N)
    pub uplift_n: f64,
    /// Pull-out resistance T_Rd (N)
    pub uplift_resistance_n: f64,
    pub uplift_ratio: f64,
    pub uplift_status: CheckStatus,
}

/// Utilisation per failure mode
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CapacityRatios {
    pub bending: f64,
    pub support: f64,
    pub shear: f64,
    pub crushing: f64,
    pub deflection: f64,
    pub uplift: f64,
}

impl CapacityRatios {
    /// Largest ratio
    pub fn max(&self) -> f64 {
        [self.bending, self.support, self.shear, self.crushing, self.deflection, self.uplift]
            .into_iter()
            .fold(0.0, f64::max)
    }

    fn clamped(self) -> Self {
        Self {
            bending: finite_ratio(self.bending),
            support: finite_ratio(self.support),
            shear: finite_ratio(self.shear),
            crushing: finite_ratio(self.crushing),
            deflection: finite_ratio(self.deflection),
            uplift: finite_ratio(self.uplift),
        }
    }
}

/// Everything the capacity check needs
#[derive(Debug, Clone, Copy)]
pub struct CapacityInput<'a> {
    pub model: &'a BeamModel,
    pub section: &'a SectionProperties,
    pub geometry: &'a PanelGeometry,
    pub resistances: &'a Resistances,
    pub factors: &'a MaterialFactors,
    pub usage: UsageClass,
    pub fasteners: &'a FastenerConfig,
    pub bearing_widths_mm: &'a [f64],
    pub cases: &'a [CaseSolutions],
    pub thermal_uls: &'a BeamSolution,
    pub envelope: &'a ResponseEnvelope,
    pub creep: &'a CreepModel,
    /// Nodes hinged in any case
    pub hinge_nodes: &'a [usize],
}

/// Outcome of all checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityResult {
    pub resistances: Resistances,
    pub supports: Vec<SupportCheck>,
    pub ratios: CapacityRatios,
    /// Skin stress from the largest span moment (MPa)
    pub span_stress_mpa: f64,
    /// Skin stress from the largest support moment (MPa)
    pub support_stress_mpa: f64,
    /// Largest compressive reaction (N)
    pub max_reaction_n: f64,
    /// Largest tensile reaction (N)
    pub max_uplift_n: f64,
    /// F_Rd of the support with the highest crushing ratio (N)
    pub worst_crushing_resistance_n: f64,
    /// T_Rd of the support with the highest uplift ratio (N)
    pub worst_uplift_resistance_n: f64,
    pub uplift_checked: bool,
    pub status: CheckStatus,
    pub advisories: Vec<String>,
}

impl CapacityResult {
    /// Returns true if every check passes
    pub fn passes(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

fn finite_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() {
        ratio
    } else {
        RATIO_SENTINEL
    }
}

/// Run all checks
pub fn check(input: &CapacityInput) -> CapacityResult {
    let width = input.geometry.width_mm;
    let crush_strength = input.geometry.core.crush_strength_mpa;
    let gamma_bearing = input.factors.core_shear;

    let uplift_resistance = input.fasteners.resistance(width, input.factors.fastener);
    let uplift_checked = !matches!(input.usage, UsageClass::Ceiling) && uplift_resistance > 0.0;

    let supports: Vec<SupportCheck> = input
        .model
        .nodes
        .iter()
        .map(|node| {
            let i = node.index;
            let bearing = input
                .bearing_widths_mm
                .get(i)
                .copied()
                .filter(|w| w.is_finite() && *w > 0.0)
                .unwrap_or(DEFAULT_BEARING_WIDTH_MM);

            let thermal = input.thermal_uls.reactions.get(i).copied().unwrap_or(0.0);
            let (compression, tension) = input
                .cases
                .iter()
                .map(|case| case.uls.reactions.get(i).copied().unwrap_or(0.0) + thermal)
                .fold((0.0_f64, 0.0_f64), |(c, t), r| (c.max(r), t.max(-r)));

            let crushing_resistance = crush_strength * width * bearing / gamma_bearing;
            let crushing_ratio = if crushing_resistance > 0.0 {
                finite_ratio(compression / crushing_resistance)
            } else {
                RATIO_SENTINEL
            };
            let required_width = if crush_strength > 0.0 && width > 0.0 {
                compression * gamma_bearing / (crush_strength * width)
            } else {
                0.0
            };

            let (uplift_ratio, uplift_status) = if uplift_checked {
                let ratio = finite_ratio(tension / uplift_resistance);
                (ratio, CheckStatus::from_ratio(ratio))
            } else {
                (0.0, CheckStatus::NotApplicable)
            };

            SupportCheck {
                index: i,
                x_m: node.x_mm / 1000.0,
                bearing_width_mm: bearing,
                reaction_n: compression,
                crushing_resistance_n: crushing_resistance,
                crushing_ratio,
                crushing_status: CheckStatus::from_ratio(crushing_ratio),
                required_width_mm: required_width,
                uplift_n: tension,
                uplift_resistance_n: uplift_resistance,
                uplift_ratio,
                uplift_status,
            }
        })
        .collect();

    let max_reaction = supports.iter().map(|s| s.reaction_n).fold(0.0, f64::max);
    let max_uplift = supports.iter().map(|s| s.uplift_n).fold(0.0, f64::max);
    let worst_crushing = first_max_by(&supports, |s| s.crushing_ratio);
    let worst_uplift = first_max_by(&supports, |s| s.uplift_ratio);

    let resistances = *input.resistances;
    let sigma_lim = resistances.stress_limit_mpa;
    let span_stress = input.section.skin_stress(input.envelope.max_moment_abs);
    let support_stress = input.section.skin_stress(input.envelope.max_support_moment);

    let ratios = CapacityRatios {
        bending: if sigma_lim > 0.0 { span_stress / sigma_lim } else { 0.0 },
        support: if sigma_lim > 0.0 { support_stress / sigma_lim } else { 0.0 },
        shear: if resistances.shear_n > 0.0 {
            input.envelope.max_shear_abs / resistances.shear_n
        } else {
            0.0
        },
        crushing: worst_crushing.map(|s| s.crushing_ratio).unwrap_or(0.0),
        deflection: input.envelope.deflection_ratio,
        uplift: if uplift_checked {
            worst_uplift.map(|s| s.uplift_ratio).unwrap_or(0.0)
        } else {
            0.0
        },
    }
    .clamped();

    let status = CheckStatus::from_ratio(ratios.max());
    let advisories = advisories(input, &ratios, &supports, uplift_checked);

    debug!(?status, max_ratio = ratios.max(), "capacity checked");

    CapacityResult {
        resistances,
        worst_crushing_resistance_n: worst_crushing.map(|s| s.crushing_resistance_n).unwrap_or(0.0),
        worst_uplift_resistance_n: worst_uplift.map(|s| s.uplift_resistance_n).unwrap_or(0.0),
        supports,
        ratios,
        span_stress_mpa: span_stress,
        support_stress_mpa: support_stress,
        max_reaction_n: max_reaction,
        max_uplift_n: max_uplift,
        uplift_checked,
        status,
        advisories,
    }
}

fn first_max_by<F: Fn(&SupportCheck) -> f64>(supports: &[SupportCheck], key: F) -> Option<&SupportCheck> {
    supports.iter().fold(None, |best: Option<&SupportCheck>, s| match best {
        Some(b) if key(b) >= key(s) => Some(b),
        _ => Some(s),
    })
}

fn advisories(
    input: &CapacityInput,
    ratios: &CapacityRatios,
    supports: &[SupportCheck],
    uplift_checked: bool,
) -> Vec<String> {
    let mut advice = Vec::new();

    if !input.hinge_nodes.is_empty() {
        let nodes: Vec<String> = input.hinge_nodes.iter().map(|n| n.to_string()).collect();
        advice.push(format!(
            "Moment redistribution active (hinge) at supports: {} (ULS).",
            nodes.join(", ")
        ));
    }

    let creep = input.creep;
    if creep.mode != CreepMode::None {
        let phi = if creep.phi_bending > 0.0 {
            format!("φ = {}, φb = {}", creep.phi_shear, creep.phi_bending)
        } else {
            format!("φ = {}", creep.phi_shear)
        };
        advice.push(format!(
            "SLS includes core creep ({}). Mode: {}.",
            phi,
            creep.mode.description()
        ));
    }

    if ratios.bending > 1.0 {
        advice.push("Risk of skin wrinkling or yielding: increase skin thickness or reduce the span.".to_string());
    }
    if ratios.support > 1.0 {
        advice.push("High skin stress at supports: increase skin thickness or bearing width.".to_string());
    }
    if ratios.shear > 1.0 {
        advice.push("Shear force too high: increase core shear strength or panel thickness.".to_string());
    }
    for s in supports {
        if s.crushing_status == CheckStatus::Fail {
            advice.push(format!(
                "Support {} is overloaded in crushing. Increase the bearing width to > {}mm.",
                s.index,
                s.required_width_mm.ceil()
            ));
        }
        if uplift_checked && s.uplift_status == CheckStatus::Fail {
            advice.push(format!(
                "Support {} fails in uplift. Add fasteners, reduce their spacing or use stronger fasteners.",
                s.index
            ));
        }
    }
    if ratios.deflection > 1.0 {
        advice.push("Deflection too large: increase panel thickness.".to_string());
    }
    if uplift_checked && ratios.uplift > 1.0 {
        advice.push("Uplift connection insufficient: check fasteners and their layout.".to_string());
    }
    if advice.is_empty() {
        advice.push("Design OK.".to_string());
    }

    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::continuous_beam::{BeamLoads, ContinuousBeamSolver, SectionStiffness};
    use crate::calculations::envelope::SharedSolutions;
    use crate::loads::CreepFactors;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    struct Fixture {
        model: BeamModel,
        section: SectionProperties,
        geometry: PanelGeometry,
        resistances: Resistances,
        cases: Vec<CaseSolutions>,
        shared: SharedSolutions,
        envelope: ResponseEnvelope,
    }

    fn fixture(line_load: f64) -> Fixture {
        let geometry = PanelGeometry::default();
        let section = SectionProperties::from_geometry(&geometry);
        let resistances = Resistances::new(&section, &geometry, &MaterialFactors::default());
        let model = BeamModel::new(&[3000.0, 3000.0]);
        let solver = ContinuousBeamSolver::new(&model, SectionStiffness::new(section.ei_nmm2, section.ga_n, 1.0));
        let hinges = [false; 3];
        let sol = solver.solve(&BeamLoads::uniform(line_load), &hinges).unwrap();
        let zero = solver.solve(&BeamLoads::default(), &hinges).unwrap();
        let cases = vec![CaseSolutions {
            name: "pressure".to_string(),
            uls: sol.clone(),
            sls_short: sol,
            sls_long: None,
        }];
        let shared = SharedSolutions {
            thermal_uls: zero.clone(),
            thermal_sls: zero,
            sustained: None,
        };
        let envelope = ResponseEnvelope::build(&model, &cases, &shared, CreepMode::None, 150.0);
        Fixture {
            model,
            section,
            geometry,
            resistances,
            cases,
            shared,
            envelope,
        }
    }

    fn run(f: &Fixture, usage: UsageClass, creep: &CreepModel, hinges: &[usize]) -> CapacityResult {
        check(&CapacityInput {
            model: &f.model,
            section: &f.section,
            geometry: &f.geometry,
            resistances: &f.resistances,
            factors: &MaterialFactors::default(),
            usage,
            fasteners: &FastenerConfig::default(),
            bearing_widths_mm: &[60.0, 60.0, 60.0],
            cases: &f.cases,
            thermal_uls: &f.shared.thermal_uls,
            envelope: &f.envelope,
            creep,
            hinge_nodes: hinges,
        })
    }

    #[test]
    fn test_default_resistances() {
        let geometry = PanelGeometry::default();
        let section = SectionProperties::from_geometry(&geometry);
        let r = Resistances::new(&section, &geometry, &MaterialFactors::default());

        // Yield governs over wrinkling for the default materials
        assert!(approx_eq(r.stress_limit_mpa, 280.0 / 1.1, 1e-9));
        assert!(r.design_wrinkling_mpa > r.design_yield_mpa);
        assert!(approx_eq(r.shear_n, 0.12 * 1000.0 * 50.0 / 1.25, 1e-9));
        assert!(approx_eq(
            r.moment_nmm,
            r.stress_limit_mpa * section.i_eq_mm4 / section.z_max_mm,
            1e-6
        ));
    }

    #[test]
    fn test_fastener_resistance() {
        let f = FastenerConfig::default();
        assert_eq!(f.count(1000.0), 1);
        assert_eq!(f.count(1150.0), 1);
        assert_eq!(f.count(2600.0), 3);
        assert!(approx_eq(f.resistance(1000.0, 1.33), 2000.0 / 1.33, 1e-9));

        let no_spacing = FastenerConfig {
            spacing_mm: 0.0,
            ..Default::default()
        };
        assert_eq!(no_spacing.count(5000.0), 1);
    }

    #[test]
    fn test_light_load_passes() {
        let f = fixture(0.5);
        let creep = CreepModel::new(CreepMode::None, CreepFactors::default(), 1.0, 1.0);
        let result = run(&f, UsageClass::ExternalWall, &creep, &[]);

        assert!(result.passes());
        assert_eq!(result.advisories, vec!["Design OK.".to_string()]);
        assert_eq!(result.supports.len(), 3);
        assert!(approx_eq(result.supports[1].crushing_resistance_n, 4800.0, 1e-9));
        assert_eq!(result.supports[1].uplift_status, CheckStatus::Pass);
    }

    #[test]
    fn test_crushing_failure_reports_required_width() {
        let f = fixture(2.0);
        let creep = CreepModel::new(CreepMode::None, CreepFactors::default(), 1.0, 1.0);
        let result = run(&f, UsageClass::Ceiling, &creep, &[]);

        let centre = &result.supports[1];
        assert!(centre.reaction_n > centre.crushing_resistance_n);
        assert_eq!(centre.crushing_status, CheckStatus::Fail);
        assert!(approx_eq(centre.required_width_mm * centre.crushing_resistance_n / 60.0, centre.reaction_n, 1e-6));
        assert_eq!(centre.uplift_status, CheckStatus::NotApplicable);
        assert_eq!(result.status, CheckStatus::Fail);

        let expected = format!(
            "Support 1 is overloaded in crushing. Increase the bearing width to > {}mm.",
            centre.required_width_mm.ceil()
        );
        assert!(result.advisories.contains(&expected));
        assert!(!result.advisories.contains(&"Design OK.".to_string()));
    }

    #[test]
    fn test_notes_come_first() {
        let f = fixture(0.5);
        let creep = CreepModel::new(CreepMode::SustainedOnly, CreepFactors::default(), 1.0, 1.0);
        let result = run(&f, UsageClass::Ceiling, &creep, &[1]);

        assert!(result.advisories[0].contains("supports: 1"));
        assert!(result.advisories[1].contains("φ = 2.4"));
        assert_eq!(result.advisories.len(), 2);
    }

    #[test]
    fn test_suction_reactions_check_uplift() {
        let f = fixture(-2.0);
        let creep = CreepModel::new(CreepMode::None, CreepFactors::default(), 1.0, 1.0);
        let result = run(&f, UsageClass::ExternalWall, &creep, &[]);

        assert!(result.uplift_checked);
        assert!(result.max_reaction_n < 1e-9);
        assert!(result.max_uplift_n > 0.0);
        assert_eq!(result.supports[1].uplift_status, CheckStatus::Fail);
        assert!(result.advisories.iter().any(|a| a.starts_with("Support 1 fails in uplift")));
    }
}
