//! Newton-type root finding for the implicitly defined points of a tooth
//! profile.
//!
//! Both entry points use finite-difference derivatives and a backtracking
//! line search on the residual norm, so callers only provide the residual.

use crate::errors::{GearError, Result};
use crate::float_types::Real;
use nalgebra::{DMatrix, DVector};

/// Halvings tried before a Newton step is declared unusable.
const MAX_BACKTRACKS: usize = 40;

/// Residual under which a stalled line search still counts as converged.
/// The residual is then at the rounding floor of the evaluated formula.
const STALL_ACCEPTANCE: Real = 1e-8;

/// Convergence controls shared by the scalar and vector solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverOptions {
    /// Residual (norm) under which an iterate is accepted
    pub tolerance: Real,
    /// Newton iterations before giving up
    pub max_iterations: usize,
    /// Relative step of the central differences
    pub derivative_step: Real,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
            derivative_step: 1e-7,
        }
    }
}

/// Solves `f(x) = 0` for a scalar `x`, starting at `x0`.
///
/// # Errors
/// [`GearError::RootFindingFailure`] tagged with `context` when the
/// iteration diverges, hits a flat spot, or exhausts its budget.
pub fn solve_scalar<F>(context: &str, f: F, x0: Real, options: &SolverOptions) -> Result<Real>
where
    F: Fn(Real) -> Real,
{
    let mut x = x0;
    let mut fx = f(x);
    if !fx.is_finite() {
        return Err(GearError::root_finding(context, 0, fx));
    }

    for iteration in 0..options.max_iterations {
        if fx.abs() <= options.tolerance {
            log::trace!("{context}: converged to {x} after {iteration} iterations");
            return Ok(x);
        }

        let h = options.derivative_step * x.abs().max(1.0);
        let slope = (f(x + h) - f(x - h)) / (2.0 * h);
        if slope == 0.0 || !slope.is_finite() {
            return Err(GearError::root_finding(context, iteration, fx.abs()));
        }
        let step = -fx / slope;

        match backtrack(|lambda| f(x + lambda * step), fx.abs(), |v: &Real| v.abs()) {
            Some((lambda, value)) => {
                x += lambda * step;
                fx = value;
            },
            None if fx.abs() <= STALL_ACCEPTANCE => return Ok(x),
            None => return Err(GearError::root_finding(context, iteration, fx.abs())),
        }
    }

    if fx.abs() <= options.tolerance {
        Ok(x)
    } else {
        Err(GearError::root_finding(context, options.max_iterations, fx.abs()))
    }
}

/// Solves the square system `f(x) = 0` starting at `x0`.
///
/// The Jacobian is rebuilt by central differences at every iterate and the
/// Newton step comes from its LU factorization.
///
/// # Errors
/// [`GearError::RootFindingFailure`] tagged with `context` when the Jacobian
/// is singular, the residual cannot be reduced, or the budget runs out.
pub fn solve_system<F>(
    context: &str,
    f: F,
    x0: DVector<Real>,
    options: &SolverOptions,
) -> Result<DVector<Real>>
where
    F: Fn(&DVector<Real>) -> DVector<Real>,
{
    let n = x0.len();
    let mut x = x0;
    let mut fx = f(&x);
    if fx.len() != n {
        return Err(GearError::root_finding(
            format!("{context} (system is {}x{n}, not square)", fx.len()),
            0,
            Real::NAN,
        ));
    }
    if !fx.iter().all(|v| v.is_finite()) {
        return Err(GearError::root_finding(context, 0, fx.norm()));
    }

    for iteration in 0..options.max_iterations {
        let residual = fx.norm();
        if residual <= options.tolerance {
            log::trace!("{context}: converged after {iteration} iterations");
            return Ok(x);
        }

        let mut jacobian = DMatrix::<Real>::zeros(n, n);
        for j in 0..n {
            let h = options.derivative_step * x[j].abs().max(1.0);
            let mut forward = x.clone();
            let mut backward = x.clone();
            forward[j] += h;
            backward[j] -= h;
            let column = (f(&forward) - f(&backward)) / (2.0 * h);
            jacobian.set_column(j, &column);
        }

        let Some(step) = jacobian.lu().solve(&(-&fx)) else {
            return Err(GearError::root_finding(
                format!("{context} (singular Jacobian)"),
                iteration,
                residual,
            ));
        };

        match backtrack(|lambda| f(&(&x + &step * lambda)), residual, |v: &DVector<Real>| v.norm()) {
            Some((lambda, value)) => {
                x += &step * lambda;
                fx = value;
            },
            None if residual <= STALL_ACCEPTANCE => return Ok(x),
            None => return Err(GearError::root_finding(context, iteration, residual)),
        }
    }

    let residual = fx.norm();
    if residual <= options.tolerance {
        Ok(x)
    } else {
        Err(GearError::root_finding(context, options.max_iterations, residual))
    }
}

/// Halves the step length until the residual norm decreases.
fn backtrack<T, E, N>(eval: E, current: Real, norm: N) -> Option<(Real, T)>
where
    E: Fn(Real) -> T,
    N: Fn(&T) -> Real,
{
    let mut lambda = 1.0;
    for _ in 0..MAX_BACKTRACKS {
        let value = eval(lambda);
        let size = norm(&value);
        if size.is_finite() && size < current {
            return Some((lambda, value));
        }
        lambda *= 0.5;
    }
    None
}

/// Inverse of the involute function: the angle `a` with `tan a − a = value`.
///
/// # Errors
/// [`GearError::RootFindingFailure`] if `value` is outside the range the
/// involute function reaches on `[0, π/2)`.
pub fn inverse_involute(value: Real, options: &SolverOptions) -> Result<Real> {
    if value < 0.0 || !value.is_finite() {
        return Err(GearError::root_finding("inverse involute", 0, value));
    }
    if value == 0.0 {
        return Ok(0.0);
    }
    // inv(a) ≈ a³/3 near zero
    let guess = (3.0 * value).cbrt().min(1.4);
    solve_scalar("inverse involute", |a| a.tan() - a - value, guess, options)
}
