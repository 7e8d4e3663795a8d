//! # Continuous Beam Analysis
//!
//! Multi-span panel analysis by the direct stiffness method with two-node
//! Timoshenko elements, so core shear deformation is included.
//!
//! ## Model
//!
//! - N spans create N+1 nodes (support locations), numbered left to right
//! - Every support restrains vertical displacement; rotations are free
//! - Spans of zero length are not meshed
//! - A hinge at an interior node gives the left and right elements their own
//!   rotation there, releasing the support moment
//!
//! ## Sign Conventions
//!
//! - Nodal DOFs: v positive upward, θ counter-clockwise
//! - Loads: positive downward
//! - Reactions: positive upward
//! - Internal moment: positive sagging; internal shear: positive when the left
//!   side moves up
//!
//! ## Example
//!
//! ```rust
//! use panel_core::calculations::continuous_beam::{
//!     BeamLoads, BeamModel, ContinuousBeamSolver, SectionStiffness,
//! };
//!
//! // Two 3 m spans under 1 N/mm
//! let model = BeamModel::new(&[3000.0, 3000.0]);
//! let stiffness = SectionStiffness::new(1.2e11, f64::INFINITY, 1.0);
//! let solver = ContinuousBeamSolver::new(&model, stiffness);
//!
//! let solution = solver.solve(&BeamLoads::uniform(1.0), &[false; 3]).unwrap();
//! assert!((solution.reactions[1] - 3750.0).abs() < 1e-6);
//! ```

use nalgebra::{DMatrix, DVector, Matrix4, Vector4};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::equations::beam::{
    consistent_point_load, consistent_uniform_load, fixed_fixed_point_deflection,
    fixed_fixed_uniform_deflection, interpolate_displacement, shear_flexibility,
    thermal_end_moments, timoshenko_stiffness,
};
use crate::errors::{CalcError, CalcResult};
use crate::loads::AppliedPointLoad;

/// Smallest pivot accepted by the elimination
pub const PIVOT_TOLERANCE: f64 = 1e-12;

/// Tolerance for matching positions along the beam (mm)
pub const POSITION_TOLERANCE: f64 = 1e-9;

// =============================================================================
// BEAM MODEL
// =============================================================================

/// A support location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamNode {
    pub index: usize,
    /// Distance from the left end (mm)
    pub x_mm: f64,
}

/// A meshed span between two supports
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamElement {
    /// Index of the span this element meshes
    pub span: usize,
    pub start_node: usize,
    pub end_node: usize,
    /// Start position (mm)
    pub x0_mm: f64,
    /// Length (mm)
    pub length_mm: f64,
}

impl BeamElement {
    /// End position (mm)
    pub fn x1_mm(&self) -> f64 {
        self.x0_mm + self.length_mm
    }

    /// Returns true if the global position lies on this element
    pub fn contains(&self, x_mm: f64) -> bool {
        x_mm >= self.x0_mm - POSITION_TOLERANCE && x_mm <= self.x1_mm() + POSITION_TOLERANCE
    }
}

/// Node and element arenas of a continuous panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamModel {
    pub nodes: Vec<BeamNode>,
    pub elements: Vec<BeamElement>,
}

impl BeamModel {
    /// Build the mesh from span lengths (mm). Spans that are not positive and
    /// finite get no element; their end nodes coincide.
    pub fn new(spans_mm: &[f64]) -> Self {
        let mut nodes = vec![BeamNode { index: 0, x_mm: 0.0 }];
        let mut elements = Vec::new();
        let mut x = 0.0;

        for (span, &length) in spans_mm.iter().enumerate() {
            let meshed = length.is_finite() && length > 0.0;
            if meshed {
                elements.push(BeamElement {
                    span,
                    start_node: span,
                    end_node: span + 1,
                    x0_mm: x,
                    length_mm: length,
                });
                x += length;
            }
            nodes.push(BeamNode { index: span + 1, x_mm: x });
        }

        Self { nodes, elements }
    }

    /// Number of nodes (span count + 1)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total meshed length (mm)
    pub fn total_length_mm(&self) -> f64 {
        self.elements.iter().map(|e| e.length_mm).sum()
    }

    /// Returns true for nodes other than the two ends
    pub fn is_interior(&self, node: usize) -> bool {
        node > 0 && node + 1 < self.nodes.len()
    }

    /// Element meshing a span, if the span was meshed
    pub fn element_for_span(&self, span: usize) -> Option<&BeamElement> {
        self.elements.iter().find(|e| e.span == span)
    }

    /// Element ending at a node
    pub fn left_element(&self, node: usize) -> Option<&BeamElement> {
        self.elements.iter().find(|e| e.end_node == node)
    }

    /// Element starting at a node
    pub fn right_element(&self, node: usize) -> Option<&BeamElement> {
        self.elements.iter().find(|e| e.start_node == node)
    }

    /// Support positions (m)
    pub fn support_positions_m(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.x_mm / 1000.0).collect()
    }
}

// =============================================================================
// DOF TABLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum RotationDof {
    Shared(usize),
    Split { left: usize, right: usize },
}

/// Global DOF numbering for one hinge configuration
///
/// Every node has a vertical DOF (constrained) and either one rotation or,
/// at a hinged interior node with elements on both sides, separate left and
/// right rotations. The rotation of a node with no element attached is
/// constrained so the system stays regular.
#[derive(Debug, Clone, PartialEq)]
pub struct DofTable {
    vertical: Vec<usize>,
    rotation: Vec<RotationDof>,
    free: Vec<bool>,
}

impl DofTable {
    /// Number the DOFs of a model. `hinges` is indexed by node; missing
    /// entries count as no hinge.
    pub fn build(model: &BeamModel, hinges: &[bool]) -> Self {
        let mut vertical = Vec::with_capacity(model.node_count());
        let mut rotation = Vec::with_capacity(model.node_count());
        let mut free = Vec::new();

        for node in 0..model.node_count() {
            vertical.push(free.len());
            free.push(false);

            let has_left = model.left_element(node).is_some();
            let has_right = model.right_element(node).is_some();
            let hinged = hinges.get(node).copied().unwrap_or(false);

            if hinged && model.is_interior(node) && has_left && has_right {
                rotation.push(RotationDof::Split {
                    left: free.len(),
                    right: free.len() + 1,
                });
                free.push(true);
                free.push(true);
            } else {
                rotation.push(RotationDof::Shared(free.len()));
                free.push(has_left || has_right);
            }
        }

        Self {
            vertical,
            rotation,
            free,
        }
    }

    /// Total number of DOFs
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Returns true if the table has no DOFs
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Indices of unconstrained DOFs in ascending order
    pub fn free_dofs(&self) -> Vec<usize> {
        (0..self.free.len()).filter(|&d| self.free[d]).collect()
    }

    /// Vertical DOF of a node
    pub fn vertical(&self, node: usize) -> usize {
        self.vertical[node]
    }

    /// Returns true if the node's rotation is split by a hinge
    pub fn is_split(&self, node: usize) -> bool {
        matches!(self.rotation[node], RotationDof::Split { .. })
    }

    /// Global DOFs `[v1, θ1, v2, θ2]` of an element
    pub fn element_dofs(&self, element: &BeamElement) -> [usize; 4] {
        let theta_start = match self.rotation[element.start_node] {
            RotationDof::Shared(d) => d,
            RotationDof::Split { right, .. } => right,
        };
        let theta_end = match self.rotation[element.end_node] {
            RotationDof::Shared(d) => d,
            RotationDof::Split { left, .. } => left,
        };
        [
            self.vertical[element.start_node],
            theta_start,
            self.vertical[element.end_node],
            theta_end,
        ]
    }
}

// =============================================================================
// LOADS AND STIFFNESS
// =============================================================================

/// Flexural and shear stiffness of the panel section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionStiffness {
    /// EI (N·mm²)
    pub ei: f64,
    /// GA (N)
    pub ga: f64,
    /// Shear correction factor κ
    pub kappa: f64,
}

impl SectionStiffness {
    pub fn new(ei: f64, ga: f64, kappa: f64) -> Self {
        Self { ei, ga, kappa }
    }

    /// Effective shear stiffness κGA with GA floored at 1e-9
    pub fn kga(&self) -> f64 {
        self.kappa * self.ga.max(1e-9)
    }

    /// Shear flexibility factor ψ of an element of length l
    pub fn psi(&self, l: f64) -> f64 {
        shear_flexibility(self.ei, self.ga, self.kappa, l)
    }
}

/// Loads applied in one solve
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BeamLoads {
    /// Uniform line load on every span (N/mm, positive downward)
    pub line_load: f64,
    /// Uniform thermal bending moment (N·mm)
    pub thermal_moment: f64,
    /// Point loads along the beam
    pub point_loads: Vec<AppliedPointLoad>,
}

impl BeamLoads {
    /// Uniform load only
    pub fn uniform(line_load: f64) -> Self {
        Self {
            line_load,
            ..Default::default()
        }
    }

    /// Thermal moment only
    pub fn thermal(moment: f64) -> Self {
        Self {
            thermal_moment: moment,
            ..Default::default()
        }
    }

    /// Add point loads (builder pattern)
    pub fn with_point_loads(mut self, point_loads: Vec<AppliedPointLoad>) -> Self {
        self.point_loads = point_loads;
        self
    }

    /// Total downward load on the meshed length (N)
    pub fn total_load(&self, model: &BeamModel) -> f64 {
        self.line_load * model.total_length_mm()
            + self.point_loads.iter().map(|p| p.force_n).sum::<f64>()
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Which side of a point load a section lies on when it coincides with one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleSide {
    /// Just left of the load: the load has not been passed
    Before,
    /// Just right of the load: the load has been passed
    After,
}

/// A point load in element coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalPointLoad {
    /// Offset from the element start (mm)
    pub a_mm: f64,
    /// Force (N), positive downward
    pub force_n: f64,
}

/// Internal forces at the element ends
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EndForces {
    /// Shear just right of the start node (N)
    pub shear_start: f64,
    /// Moment at the start node (N·mm, sagging positive)
    pub moment_start: f64,
    /// Shear just left of the end node (N)
    pub shear_end: f64,
    /// Moment at the end node (N·mm, sagging positive)
    pub moment_end: f64,
}

/// Solved state of one element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementResult {
    /// Span index
    pub span: usize,
    pub x0_mm: f64,
    pub length_mm: f64,
    /// Global DOF indices `[v1, θ1, v2, θ2]`
    pub dofs: [usize; 4],
    /// Local displacements `[v1, θ1, v2, θ2]`
    pub displacements: [f64; 4],
    pub end_forces: EndForces,
    /// Line load carried (N/mm)
    pub line_load: f64,
    /// Point loads assigned to this element
    pub point_loads: Vec<LocalPointLoad>,
    pub ei: f64,
    pub kga: f64,
    pub psi: f64,
}

impl ElementResult {
    fn passed(a: f64, x: f64, side: SampleSide) -> bool {
        match side {
            SampleSide::Before => a < x - POSITION_TOLERANCE,
            SampleSide::After => a <= x + POSITION_TOLERANCE,
        }
    }

    /// Internal shear at local position x (N)
    pub fn shear_at(&self, x: f64, side: SampleSide) -> f64 {
        let passed: f64 = self
            .point_loads
            .iter()
            .filter(|p| Self::passed(p.a_mm, x, side))
            .map(|p| p.force_n)
            .sum();
        self.end_forces.shear_start - self.line_load * x - passed
    }

    /// Internal moment at local position x (N·mm, sagging positive)
    pub fn moment_at(&self, x: f64, side: SampleSide) -> f64 {
        let passed: f64 = self
            .point_loads
            .iter()
            .filter(|p| Self::passed(p.a_mm, x, side))
            .map(|p| p.force_n * (x - p.a_mm))
            .sum();
        self.end_forces.moment_start + self.end_forces.shear_start * x
            - self.line_load * x * x / 2.0
            - passed
    }

    /// Deflection at local position x (mm, positive downward)
    ///
    /// Shape-function interpolation of the nodal DOFs plus the clamped-element
    /// deflection of the element's own loads.
    pub fn deflection_at(&self, x: f64) -> f64 {
        let l = self.length_mm;
        let x = x.clamp(0.0, l);
        let homogeneous = interpolate_displacement(l, self.psi, x, &self.displacements);

        let mut particular = if self.line_load != 0.0 {
            fixed_fixed_uniform_deflection(self.line_load, l, x, self.ei, self.kga)
        } else {
            0.0
        };
        for p in &self.point_loads {
            particular += fixed_fixed_point_deflection(p.force_n, p.a_mm, l, x, self.ei, self.kga);
        }

        particular - homogeneous
    }
}

/// Result of one linear solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamSolution {
    /// Global displacement vector
    pub displacements: Vec<f64>,
    /// Vertical reaction per node (N, positive upward)
    pub reactions: Vec<f64>,
    /// Per meshed element, in span order
    pub elements: Vec<ElementResult>,
    /// Hinge configuration solved for
    pub hinges: Vec<bool>,
}

impl BeamSolution {
    /// Element result for a span
    pub fn element(&self, span: usize) -> Option<&ElementResult> {
        self.elements.iter().find(|e| e.span == span)
    }

    /// Moment at the end of the element left of a node
    pub fn moment_left_of(&self, node: usize) -> Option<f64> {
        node.checked_sub(1)
            .and_then(|span| self.element(span))
            .map(|e| e.end_forces.moment_end)
    }

    /// Moment at the start of the element right of a node
    pub fn moment_right_of(&self, node: usize) -> Option<f64> {
        self.element(node).map(|e| e.end_forces.moment_start)
    }

    /// Sum of all reactions (N)
    pub fn total_reaction(&self) -> f64 {
        self.reactions.iter().sum()
    }
}

// =============================================================================
// SOLVER
// =============================================================================

/// Linear solver for one model and one section stiffness
#[derive(Debug, Clone, Copy)]
pub struct ContinuousBeamSolver<'a> {
    model: &'a BeamModel,
    stiffness: SectionStiffness,
}

impl<'a> ContinuousBeamSolver<'a> {
    pub fn new(model: &'a BeamModel, stiffness: SectionStiffness) -> Self {
        Self { model, stiffness }
    }

    pub fn model(&self) -> &BeamModel {
        self.model
    }

    pub fn stiffness(&self) -> SectionStiffness {
        self.stiffness
    }

    /// Solve for one load set and hinge configuration
    ///
    /// # Errors
    ///
    /// [`CalcError::IllConditioned`] when the reduced stiffness matrix is
    /// singular (for example zero flexural stiffness). The case label is left
    /// empty; callers attach it with [`CalcError::in_case`].
    pub fn solve(&self, loads: &BeamLoads, hinges: &[bool]) -> CalcResult<BeamSolution> {
        let model = self.model;
        let dofs = DofTable::build(model, hinges);
        let n = dofs.len();

        let assigned = self.assign_point_loads(&loads.point_loads);

        let mut k_global = DMatrix::<f64>::zeros(n, n);
        let mut f_global = DVector::<f64>::zeros(n);
        let mut element_data = Vec::with_capacity(model.elements.len());

        for (element, point_loads) in model.elements.iter().zip(assigned) {
            let l = element.length_mm;
            let psi = self.stiffness.psi(l);
            let k_rows = timoshenko_stiffness(self.stiffness.ei, psi, l);
            let k_e = Matrix4::from_fn(|r, c| k_rows[r][c]);

            let mut f_e = Vector4::from(consistent_uniform_load(loads.line_load, l));
            for p in &point_loads {
                f_e += Vector4::from(consistent_point_load(p.force_n, p.a_mm, l, psi));
            }
            f_e += Vector4::from(thermal_end_moments(loads.thermal_moment));

            let map = dofs.element_dofs(element);
            for r in 0..4 {
                f_global[map[r]] += f_e[r];
                for c in 0..4 {
                    k_global[(map[r], map[c])] += k_e[(r, c)];
                }
            }

            element_data.push((element, map, psi, k_e, f_e, point_loads));
        }

        let free = dofs.free_dofs();
        debug!(
            elements = model.elements.len(),
            free_dofs = free.len(),
            hinges = hinges.iter().filter(|h| **h).count(),
            "solving continuous beam"
        );

        let mut d = DVector::<f64>::zeros(n);
        if !free.is_empty() {
            let k_ff = DMatrix::from_fn(free.len(), free.len(), |r, c| k_global[(free[r], free[c])]);
            let f_f = DVector::from_fn(free.len(), |r, _| f_global[free[r]]);
            let d_f = gaussian_elimination(k_ff, f_f)?;
            for (i, &dof) in free.iter().enumerate() {
                d[dof] = d_f[i];
            }
        }

        let residual = &k_global * &d - &f_global;
        let reactions = (0..model.node_count())
            .map(|node| residual[dofs.vertical(node)])
            .collect();

        let kga = self.stiffness.kga();
        let elements = element_data
            .into_iter()
            .map(|(element, map, psi, k_e, f_e, point_loads)| {
                let d_e = Vector4::new(d[map[0]], d[map[1]], d[map[2]], d[map[3]]);
                let p = k_e * d_e - f_e;
                ElementResult {
                    span: element.span,
                    x0_mm: element.x0_mm,
                    length_mm: element.length_mm,
                    dofs: map,
                    displacements: [d_e[0], d_e[1], d_e[2], d_e[3]],
                    end_forces: EndForces {
                        shear_start: p[0],
                        moment_start: -p[1],
                        shear_end: -p[2],
                        moment_end: p[3],
                    },
                    line_load: loads.line_load,
                    point_loads,
                    ei: self.stiffness.ei,
                    kga,
                    psi,
                }
            })
            .collect();

        Ok(BeamSolution {
            displacements: d.iter().copied().collect(),
            reactions,
            elements,
            hinges: (0..model.node_count())
                .map(|i| dofs.is_split(i))
                .collect(),
        })
    }

    /// Give each point load to the first element containing it
    fn assign_point_loads(&self, point_loads: &[AppliedPointLoad]) -> Vec<Vec<LocalPointLoad>> {
        let mut assigned = vec![Vec::new(); self.model.elements.len()];
        for load in point_loads {
            match self.model.elements.iter().position(|e| e.contains(load.x_mm)) {
                Some(i) => {
                    let element = &self.model.elements[i];
                    assigned[i].push(LocalPointLoad {
                        a_mm: (load.x_mm - element.x0_mm).clamp(0.0, element.length_mm),
                        force_n: load.force_n,
                    });
                }
                None => warn!(x_mm = load.x_mm, "point load outside the meshed length ignored"),
            }
        }
        for loads in &mut assigned {
            loads.sort_by(|a, b| a.a_mm.total_cmp(&b.a_mm));
        }
        assigned
    }
}

/// Solve `a·x = b` by Gaussian elimination with partial pivoting
///
/// Fails with [`CalcError::IllConditioned`] when the largest available pivot
/// is smaller than [`PIVOT_TOLERANCE`] (or not a number).
pub fn gaussian_elimination(mut a: DMatrix<f64>, mut b: DVector<f64>) -> CalcResult<DVector<f64>> {
    let n = b.len();

    for k in 0..n {
        let (pivot_row, pivot) = (k..n)
            .map(|r| (r, a[(r, k)]))
            .fold((k, 0.0_f64), |best, (r, v)| if v.abs() > best.1.abs() { (r, v) } else { best });

        if !(pivot.abs() >= PIVOT_TOLERANCE) {
            return Err(CalcError::ill_conditioned("", k, pivot.abs()));
        }

        if pivot_row != k {
            a.swap_rows(k, pivot_row);
            b.swap_rows(k, pivot_row);
        }

        for r in (k + 1)..n {
            let factor = a[(r, k)] / a[(k, k)];
            if factor == 0.0 {
                continue;
            }
            for c in k..n {
                a[(r, c)] -= factor * a[(k, c)];
            }
            b[r] -= factor * b[k];
        }
    }

    let mut x = DVector::<f64>::zeros(n);
    for k in (0..n).rev() {
        let mut sum = b[k];
        for c in (k + 1)..n {
            sum -= a[(k, c)] * x[c];
        }
        x[k] = sum / a[(k, k)];
    }
    Ok(x)
}
