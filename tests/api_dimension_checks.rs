#![allow(non_snake_case)]
#![allow(clippy::type_complexity)]
use embedqp::{algebra::*, solver::*};

// a collection of tests to ensure that data of
// incompatible dimension won't be accepted

fn api_dim_check_data() -> (
    CscMatrix<f64>,
    Vec<f64>,
    CscMatrix<f64>,
    Vec<f64>,
    Vec<SupportedConeT>,
) {
    let P = CscMatrix::<f64>::spalloc(4, 4, 0);
    let q = vec![0.; 4];
    let A = CscMatrix::<f64>::spalloc(6, 4, 0);
    let b = vec![0.; 6];
    let cones = vec![ZeroConeT(1), NonnegativeConeT(2), NonnegativeConeT(3)];
    (P, q, A, b, cones)
}

fn is_configuration_error(result: Result<DefaultSolver<f64>, SolverError>) -> bool {
    matches!(result, Err(SolverError::Configuration(_)))
}

#[test]
fn api_dim_check_working() {
    // This example should work because dimensions are
    // all compatible.  All following checks vary one
    // of these sizes to test dimension checks

    let (P, q, A, b, cones) = api_dim_check_data();

    let settings = DefaultSettings::default();
    let solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings);
    assert!(solver.is_ok());
}

#[test]
fn api_dim_check_bad_P() {
    let (_P, q, A, b, cones) = api_dim_check_data();
    let P = CscMatrix::<f64>::spalloc(3, 3, 0);

    let settings = DefaultSettings::default();
    let solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings);
    assert!(is_configuration_error(solver));
}

#[test]
fn api_dim_check_bad_A_rows() {
    let (P, q, _A, b, cones) = api_dim_check_data();
    let A = CscMatrix::<f64>::spalloc(5, 4, 0);

    let settings = DefaultSettings::default();
    let solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings);
    assert!(is_configuration_error(solver));
}

#[test]
fn api_dim_check_bad_A_cols() {
    let (P, q, _A, b, cones) = api_dim_check_data();
    let A = CscMatrix::<f64>::spalloc(6, 3, 0);

    let settings = DefaultSettings::default();
    let solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings);
    assert!(is_configuration_error(solver));
}

#[test]
fn api_dim_check_P_not_square() {
    let (_P, q, A, b, cones) = api_dim_check_data();
    let P = CscMatrix::<f64>::spalloc(4, 3, 0);

    let settings = DefaultSettings::default();
    let solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings);
    assert!(is_configuration_error(solver));
}

#[test]
fn api_dim_check_bad_q() {
    let (P, _q, A, b, cones) = api_dim_check_data();
    let q = vec![0.; 5];

    let settings = DefaultSettings::default();
    let solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings);
    assert!(is_configuration_error(solver));
}

#[test]
fn api_dim_check_bad_b() {
    let (P, q, A, _b, cones) = api_dim_check_data();
    let b = vec![0.; 5];

    let settings = DefaultSettings::default();
    let solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings);
    assert!(is_configuration_error(solver));
}

#[test]
fn api_dim_check_bad_cones() {
    let (P, q, A, b, _cones) = api_dim_check_data();
    let cones = vec![ZeroConeT(1), NonnegativeConeT(2), NonnegativeConeT(4)];

    let settings = DefaultSettings::default();
    let solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings);
    assert!(is_configuration_error(solver));
}

#[test]
fn api_dim_check_malformed_csc() {
    let (_P, q, A, b, cones) = api_dim_check_data();

    // row index out of range
    let P = CscMatrix::new(4, 4, vec![0, 1, 1, 1, 1], vec![7], vec![1.]);

    let settings = DefaultSettings::default();
    let solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings);
    assert!(is_configuration_error(solver));
}

#[test]
fn api_dim_check_bad_settings() {
    let (P, q, A, b, cones) = api_dim_check_data();

    let settings = DefaultSettings {
        eps_prim_inf: 0.,
        ..DefaultSettings::default()
    };
    let solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings);
    assert!(matches!(
        solver,
        Err(SolverError::Settings(SettingsError::BadFieldValue(
            "eps_prim_inf"
        )))
    ));
}
