use gearmesh::float_types::Real;
use gearmesh::solver::{SolverOptions, inverse_involute, solve_scalar, solve_system};
use nalgebra::DVector;

mod support;

#[test]
fn scalar_fixed_point_of_cosine() {
    let x = solve_scalar("cos x = x", |x| x.cos() - x, 1.0, &SolverOptions::default()).unwrap();
    assert!(support::approx_eq(x, 0.739_085_133_215_160_6, 1e-9));
}

#[test]
fn scalar_without_root_fails_with_context() {
    let err = solve_scalar("x² + 1", |x| x * x + 1.0, 0.5, &SolverOptions::default()).unwrap_err();
    assert!(err.is_root_finding_failure());
    assert!(err.to_string().contains("x² + 1"));
}

#[test]
fn scalar_respects_iteration_budget() {
    let options = SolverOptions {
        max_iterations: 1,
        ..SolverOptions::default()
    };
    let err = solve_scalar("slow", |x: Real| x.powi(3) - 1000.0, 1.0, &options).unwrap_err();
    assert!(err.is_root_finding_failure());
}

#[test]
fn system_circle_meets_line() {
    // x² + y² = 4, y = x
    let f = |v: &DVector<Real>| DVector::from_vec(vec![v[0] * v[0] + v[1] * v[1] - 4.0, v[1] - v[0]]);
    let x = solve_system(
        "circle and line",
        f,
        DVector::from_vec(vec![1.0, 0.5]),
        &SolverOptions::default(),
    )
    .unwrap();
    assert!(support::approx_eq(x[0], 2.0_f64.sqrt(), 1e-9));
    assert!(support::approx_eq(x[1], 2.0_f64.sqrt(), 1e-9));
}

#[test]
fn system_must_be_square() {
    let f = |v: &DVector<Real>| DVector::from_vec(vec![v[0], v[1], v[0] + v[1]]);
    let err = solve_system("overdetermined", f, DVector::zeros(2), &SolverOptions::default())
        .unwrap_err();
    assert!(err.is_root_finding_failure());
}

#[test]
fn system_with_singular_jacobian_fails() {
    let f = |v: &DVector<Real>| DVector::from_vec(vec![v[0] + v[1] - 1.0, 2.0 * v[0] + 2.0 * v[1]]);
    let err = solve_system("parallel lines", f, DVector::zeros(2), &SolverOptions::default())
        .unwrap_err();
    assert!(err.is_root_finding_failure());
}

#[test]
fn inverse_involute_matches_forward() {
    for degrees in [5.0_f64, 14.5, 20.0, 25.0, 35.0] {
        let alpha = degrees.to_radians();
        let back = inverse_involute(alpha.tan() - alpha, &SolverOptions::default()).unwrap();
        assert!(support::approx_eq(back, alpha, 1e-8), "{degrees}°");
    }
    assert!(inverse_involute(-0.1, &SolverOptions::default()).is_err());
}
