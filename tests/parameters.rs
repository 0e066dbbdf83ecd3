#![allow(non_snake_case)]

use embedqp::{algebra::*, solver::*};

// minimize ½‖x‖² - r'x subject to lo ≤ x ≤ hi, with
// the target r and the bounds declared as parameters

#[allow(clippy::type_complexity)]
fn parametric_box_data() -> (
    CscMatrix<f64>,
    Vec<f64>,
    CscMatrix<f64>,
    Vec<f64>,
    Vec<SupportedConeT>,
    ParameterSchema<f64>,
) {
    let P = CscMatrix::<f64>::identity(2);
    let q = vec![0.; 2];

    // A = [I; -I]
    let A = CscMatrix::from(&[
        [1., 0.],  //
        [0., 1.],  //
        [-1., 0.], //
        [0., -1.], //
    ]);
    let b = vec![1., 1., 1., 1.];
    let cones = vec![NonnegativeConeT(4)];

    let schema = ParameterSchema::new(vec![
        // q = -r
        Parameter::new("target", ParameterShape::Vector(2), DataField::q, vec![0, 1])
            .with_coefficients(vec![-1., -1.]),
        Parameter::new("hi", ParameterShape::Scalar, DataField::b, vec![0]),
        // b[2..4] = -lo
        Parameter::new("lo", ParameterShape::Matrix(1, 2), DataField::b, vec![2, 3])
            .with_coefficients(vec![-1., -1.]),
    ]);

    (P, q, A, b, cones, schema)
}

fn quiet() -> DefaultSettings<f64> {
    DefaultSettingsBuilder::default()
        .verbose(false)
        .build()
        .unwrap()
}

#[test]
fn test_parameter_updates() {
    let (P, q, A, b, cones, schema) = parametric_box_data();
    let mut solver =
        DefaultSolver::new_with_parameters(&P, &q, &A, &b, &cones, quiet(), schema).unwrap();

    // target inside the box
    solver.update_parameter("target", &[0.5, -0.25]).unwrap();
    solver.solve();
    assert_eq!(solver.status(), SolverStatus::Solved);
    assert!(solver.solution.x.dist(&[0.5, -0.25]) <= 1e-5);

    // target outside the box is clipped to the bounds
    solver.update_parameter("target", &[3., -3.]).unwrap();
    solver.solve();
    assert!(solver.solution.x.dist(&[1., -1.]) <= 1e-5);

    // move both bounds in one batch
    solver
        .update_parameters(&[("hi", &[2.][..]), ("lo", &[-0.5, -0.5][..])])
        .unwrap();
    solver.solve();
    assert_eq!(solver.status(), SolverStatus::Solved);
    assert!(solver.solution.x.dist(&[2., -0.5]) <= 1e-5);
}

#[test]
fn test_parameter_errors_leave_data_unchanged() {
    let (P, q, A, b, cones, schema) = parametric_box_data();
    let mut solver =
        DefaultSolver::new_with_parameters(&P, &q, &A, &b, &cones, quiet(), schema).unwrap();

    let (q0, b0) = (solver.data.q.clone(), solver.data.b.clone());

    assert_eq!(
        solver.update_parameter("target", &[1.]),
        Err(SolverError::ParameterShape {
            expected: 2,
            found: 1
        })
    );
    assert_eq!(
        solver.update_parameter("gain", &[1.]),
        Err(SolverError::UnknownParameter("gain".to_string()))
    );

    // a valid update in front of an invalid one is not applied
    assert!(solver
        .update_parameters(&[("hi", &[5.][..]), ("lo", &[1., 2., 3.][..])])
        .is_err());

    assert_eq!(solver.data.q, q0);
    assert_eq!(solver.data.b, b0);
}

#[test]
fn test_parameter_schema_validation() {
    let (P, q, A, b, cones, _) = parametric_box_data();

    let bad_schemas = vec![
        // duplicate names
        vec![
            Parameter::new("p", ParameterShape::Scalar, DataField::q, vec![0]),
            Parameter::new("p", ParameterShape::Scalar, DataField::q, vec![1]),
        ],
        // too few targets for the shape
        vec![Parameter::new(
            "p",
            ParameterShape::Vector(3),
            DataField::b,
            vec![0, 1],
        )],
        // target out of range
        vec![Parameter::new(
            "p",
            ParameterShape::Scalar,
            DataField::A,
            vec![4],
        )],
        // two parameters writing one entry
        vec![
            Parameter::new("p1", ParameterShape::Scalar, DataField::b, vec![1]),
            Parameter::new("p2", ParameterShape::Vector(2), DataField::b, vec![0, 1]),
        ],
        // wrong number of coefficients
        vec![
            Parameter::new("p", ParameterShape::Vector(2), DataField::q, vec![0, 1])
                .with_coefficients(vec![1.]),
        ],
    ];

    for params in bad_schemas {
        let schema = ParameterSchema::new(params);
        let solver = DefaultSolver::new_with_parameters(&P, &q, &A, &b, &cones, quiet(), schema);
        assert!(matches!(solver, Err(SolverError::Configuration(_))));
    }
}

#[test]
fn test_matrix_parameter() {
    // the scale of the first constraint row as a parameter
    let (P, q, A, b, cones, _) = parametric_box_data();

    // nonzeros of A in column order are (0,0),(2,0),(1,1),(3,1)
    let schema = ParameterSchema::new(vec![Parameter::new(
        "row0",
        ParameterShape::Scalar,
        DataField::A,
        vec![0],
    )]);

    let mut solver =
        DefaultSolver::new_with_parameters(&P, &q, &A, &b, &cones, quiet(), schema).unwrap();
    solver.update_q(&vec![-3., 0.]).unwrap();

    // 4x ≤ 1
    solver.update_parameter("row0", &[4.]).unwrap();
    solver.solve();
    assert_eq!(solver.status(), SolverStatus::Solved);
    assert!((solver.solution.x[0] - 0.25).abs() <= 1e-5);
}
