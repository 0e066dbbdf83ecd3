#![allow(non_snake_case)]

use embedqp::{algebra::*, solver::*};

#[test]
fn test_unconstrained_feasible() {
    // minimize ½x'Px + q'x with no constraints
    let P = CscMatrix::from(&[
        [2., 0.], //
        [0., 4.], //
    ]);
    let q = vec![-2., 4.];
    let A = CscMatrix::<f64>::zeros((0, 2));
    let b: Vec<f64> = vec![];
    let cones: [SupportedConeT; 0] = [];

    let settings = DefaultSettingsBuilder::default()
        .verbose(false)
        .build()
        .unwrap();

    let mut solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.dist(&[1., -1.]) <= 1e-5);
    assert!(solver.solution.z.is_empty());
}

#[test]
fn test_unconstrained_unbounded() {
    let P = CscMatrix::<f64>::zeros((2, 2));
    let q = vec![1., 0.];
    let A = CscMatrix::<f64>::zeros((0, 2));
    let b: Vec<f64> = vec![];
    let cones: [SupportedConeT; 0] = [];

    let settings = DefaultSettingsBuilder::default()
        .verbose(false)
        .build()
        .unwrap();

    let mut solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::DualInfeasible);
}
