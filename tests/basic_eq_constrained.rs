#![allow(non_snake_case)]

use embedqp::{algebra::*, solver::*};

fn quiet() -> DefaultSettings<f64> {
    DefaultSettingsBuilder::default()
        .verbose(false)
        .build()
        .unwrap()
}

#[test]
fn test_eq_constrained_A1() {
    // minimize ½‖x‖² subject to x₀ + x₁ = 1, x₁ - x₂ = 0
    let P = CscMatrix::<f64>::identity(3);
    let q = vec![0.; 3];
    let A = CscMatrix::from(&[
        [1., 1., 0.],  //
        [0., 1., -1.], //
    ]);
    let b = vec![1., 0.];
    let cones = [ZeroConeT(2)];

    let mut solver = DefaultSolver::new(&P, &q, &A, &b, &cones, quiet()).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    let refsol = vec![2. / 3., 1. / 3., 1. / 3.];
    assert!(solver.solution.x.dist(&refsol) <= 1e-5);

    // equality rows have zero slack
    assert!(solver.solution.s.norm_inf() <= 1e-5);
}

#[test]
fn test_eq_constrained_primal_infeasible() {
    // x₀ = 1 and x₀ = 2
    let P = CscMatrix::<f64>::identity(1);
    let q = vec![0.];
    let A = CscMatrix::from(&[
        [1.], //
        [1.], //
    ]);
    let b = vec![1., 2.];
    let cones = [ZeroConeT(2)];

    let mut solver = DefaultSolver::new(&P, &q, &A, &b, &cones, quiet()).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::PrimalInfeasible);
}

#[test]
fn test_eq_constrained_mixed() {
    // minimize ½‖x‖² - x₁ subject to x₀ + x₁ = 1, x₀ ≥ 0.25
    let P = CscMatrix::<f64>::identity(2);
    let q = vec![0., -1.];
    let A = CscMatrix::from(&[
        [1., 1.],  //
        [-1., 0.], //
    ]);
    let b = vec![1., -0.25];
    let cones = [ZeroConeT(1), NonnegativeConeT(1)];

    let mut solver = DefaultSolver::new(&P, &q, &A, &b, &cones, quiet()).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.dist(&[0.25, 0.75]) <= 1e-5);
}
