//! # Timoshenko Beam Element Formulas
//!
//! Closed-form element quantities for a two-node shear-flexible beam element.
//! Every formula reduces to its Euler-Bernoulli counterpart as the shear
//! flexibility factor ψ goes to zero.
//!
//! ## Notation
//!
//! - `L` = Element length
//! - `x` = Position from the element's start node
//! - `a` = Point-load offset from the start node, `b = L - a`
//! - `ξ` = x / L
//! - `EI` = Flexural stiffness
//! - `κGA` = Effective shear stiffness
//! - `ψ` = 12·EI / (κGA·L²)
//!
//! ## Sign Conventions
//!
//! - Element DOFs `[v1, θ1, v2, θ2]`: v positive upward, θ counter-clockwise
//! - Applied loads: positive downward
//! - Equivalent nodal loads: in DOF directions (so downward loads are negative)
//! - Particular deflections: positive downward
//!
//! ## References
//!
//! - Przemieniecki, Theory of Matrix Structural Analysis, §5.6
//! - Friedman & Kosmatka (1993), An improved two-node Timoshenko beam element

// =============================================================================
// STIFFNESS
// =============================================================================

/// Shear flexibility factor ψ = 12·EI / (κ·GA·L²)
///
/// `GA` is floored at 1e-9 so a core without shear stiffness does not divide
/// by zero. An infinite `κ·GA` gives ψ = 0 (Euler-Bernoulli).
#[inline]
pub fn shear_flexibility(ei: f64, ga: f64, kappa: f64, l: f64) -> f64 {
    let kga = kappa * ga.max(1e-9);
    12.0 * ei / (kga * l * l)
}

/// Timoshenko element stiffness matrix as row-major 4×4 array
///
/// ```text
///            EI      ⎡ 12     6L        -12    6L       ⎤
/// k = ─────────────  ⎢ 6L     (4+ψ)L²   -6L    (2-ψ)L²  ⎥
///      L³ (1 + ψ)    ⎢ -12    -6L       12     -6L      ⎥
///                    ⎣ 6L     (2-ψ)L²   -6L    (4+ψ)L²  ⎦
/// ```
pub fn timoshenko_stiffness(ei: f64, psi: f64, l: f64) -> [[f64; 4]; 4] {
    let fac = ei / (l.powi(3) * (1.0 + psi));
    let l2 = l * l;
    [
        [fac * 12.0, fac * 6.0 * l, fac * -12.0, fac * 6.0 * l],
        [fac * 6.0 * l, fac * (4.0 + psi) * l2, fac * -6.0 * l, fac * (2.0 - psi) * l2],
        [fac * -12.0, fac * -6.0 * l, fac * 12.0, fac * -6.0 * l],
        [fac * 6.0 * l, fac * (2.0 - psi) * l2, fac * -6.0 * l, fac * (4.0 + psi) * l2],
    ]
}

// =============================================================================
// SHAPE FUNCTIONS
// =============================================================================

/// Displacement shape functions `[N1, N2, N3, N4]` at position x
///
/// ```text
/// N1 = [1 - 3ξ² + 2ξ³ + ψ(1 - ξ)] / (1+ψ)
/// N2 = L [ξ - 2ξ² + ξ³ + ψ/2 (ξ - ξ²)] / (1+ψ)
/// N3 = [3ξ² - 2ξ³ + ψξ] / (1+ψ)
/// N4 = L [-ξ² + ξ³ - ψ/2 (ξ - ξ²)] / (1+ψ)
/// ```
///
/// With ψ = 0 these are the cubic Hermite functions. They are exact
/// solutions of the unloaded Timoshenko beam, so interpolating nodal DOFs with
/// them gives the exact homogeneous deflection inside the element.
pub fn shape_functions(l: f64, psi: f64, x: f64) -> [f64; 4] {
    let xi = x / l;
    let xi2 = xi * xi;
    let xi3 = xi2 * xi;
    let scale = 1.0 / (1.0 + psi);
    let bubble = 0.5 * psi * (xi - xi2);
    [
        scale * (1.0 - 3.0 * xi2 + 2.0 * xi3 + psi * (1.0 - xi)),
        scale * l * (xi - 2.0 * xi2 + xi3 + bubble),
        scale * (3.0 * xi2 - 2.0 * xi3 + psi * xi),
        scale * l * (-xi2 + xi3 - bubble),
    ]
}

/// Interpolated upward displacement from element DOFs `[v1, θ1, v2, θ2]`
#[inline]
pub fn interpolate_displacement(l: f64, psi: f64, x: f64, dofs: &[f64; 4]) -> f64 {
    let n = shape_functions(l, psi, x);
    n.iter().zip(dofs.iter()).map(|(ni, di)| ni * di).sum()
}

// =============================================================================
// EQUIVALENT NODAL LOADS
// =============================================================================

/// Equivalent nodal loads for a uniform load q (positive downward)
///
/// # Formula
/// f = [-qL/2, -qL²/12, -qL/2, +qL²/12]
///
/// Independent of ψ: the shear terms integrate to zero over the element.
#[inline]
pub fn consistent_uniform_load(q: f64, l: f64) -> [f64; 4] {
    [-q * l / 2.0, -q * l * l / 12.0, -q * l / 2.0, q * l * l / 12.0]
}

/// Equivalent nodal loads for a point load P (positive downward) at offset a
///
/// Work-equivalent loads `-P·Nᵢ(a)`. For ψ = 0:
///
/// ```text
/// F1 = -P b²(3a + b)/L³     M1 = -P a b²/L²
/// F2 = -P a²(a + 3b)/L³     M2 = +P a² b/L²
/// ```
///
/// The offset is clamped into `[0, L]`.
pub fn consistent_point_load(p: f64, a: f64, l: f64, psi: f64) -> [f64; 4] {
    let a = a.clamp(0.0, l);
    let n = shape_functions(l, psi, a);
    [-p * n[0], -p * n[1], -p * n[2], -p * n[3]]
}

/// Equivalent nodal loads for a uniform thermal bending moment
///
/// Equal and opposite end moments: `[0, -Mt, 0, +Mt]`.
#[inline]
pub fn thermal_end_moments(mt: f64) -> [f64; 4] {
    [0.0, -mt, 0.0, mt]
}

// =============================================================================
// FIXED-FIXED PARTICULAR DEFLECTIONS
// Deflection of the element with both ends clamped, added to the shape
// function interpolation to recover the exact in-span deflection.
// =============================================================================

/// Fixed-fixed deflection under a uniform load q (positive downward)
///
/// # Formula
/// δ(x) = q x² (L - x)² / (24 EI) + q x (L - x) / (2 κGA)
///
/// At midspan this is qL⁴/(384 EI) + qL²/(8 κGA).
#[inline]
pub fn fixed_fixed_uniform_deflection(q: f64, l: f64, x: f64, ei: f64, kga: f64) -> f64 {
    let bending = q * x * x * (l - x) * (l - x) / (24.0 * ei);
    let shear = q * x * (l - x) / (2.0 * kga);
    bending + shear
}

/// Fixed-fixed deflection under a point load P (positive downward) at offset a
///
/// The clamped-end shear and moment at the start node are
///
/// ```text
/// V1 = P b [b (3L - 2b) + ψL²] / (L³ (1+ψ))
/// M1 = P b² / (2L) - V1 L / 2
/// ```
///
/// and the deflection follows by integrating curvature and shear strain:
///
/// ```text
/// δ(x) = -[M1 x²/2 + V1 x³/6 - P⟨x-a⟩³/6] / EI + [V1 x - P⟨x-a⟩] / κGA
/// ```
///
/// where ⟨x-a⟩ is zero for x ≤ a.
pub fn fixed_fixed_point_deflection(p: f64, a: f64, l: f64, x: f64, ei: f64, kga: f64) -> f64 {
    let a = a.clamp(0.0, l);
    let b = l - a;
    let psi = 12.0 * ei / (kga * l * l);
    let v1 = p * b * (b * (3.0 * l - 2.0 * b) + psi * l * l) / (l.powi(3) * (1.0 + psi));
    let m1 = p * b * b / (2.0 * l) - v1 * l / 2.0;

    let past = (x - a).max(0.0);

    let bending = -(m1 * x * x / 2.0 + v1 * x.powi(3) / 6.0 - p * past.powi(3) / 6.0) / ei;
    let shear = (v1 * x - p * past) / kga;
    bending + shear
}
