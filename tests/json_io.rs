#![allow(non_snake_case)]

#[cfg(feature = "serde")]
#[test]
fn test_json_io() {
    use embedqp::{algebra::*, solver::*};
    use std::io::{Seek, SeekFrom};

    let P = CscMatrix::from(&[
        [4., 1.], //
        [1., 2.], //
    ]);
    let q = [1., 1.];
    let A = CscMatrix::from(&[
        [-1., -1.], //
        [1., 0.],   //
        [0., 1.],   //
    ]);
    let b = [-1., 0.7, 0.7];
    let cones = vec![ZeroConeT(1), NonnegativeConeT(2)];

    let settings = DefaultSettingsBuilder::default()
        .verbose(false)
        .max_iter(500)
        .build()
        .unwrap();

    let mut solver = DefaultSolver::<f64>::new(&P, &q, &A, &b, &cones, settings).unwrap();
    solver.solve();

    // write the problem to a file
    let mut file = tempfile::tempfile().unwrap();
    solver.write_to_file(&mut file).unwrap();

    // read the problem from the file
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut solver2 = DefaultSolver::<f64>::read_from_file(&mut file).unwrap();

    assert_eq!(solver2.settings, solver.settings);
    assert_eq!(solver2.data.n, 2);
    assert_eq!(solver2.data.m, 3);

    solver2.solve();
    assert_eq!(solver2.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.dist(&solver2.solution.x) <= 1e-6);
}

#[cfg(feature = "serde")]
#[test]
fn test_json_bad_file() {
    use embedqp::solver::*;
    use std::io::{Seek, SeekFrom, Write};

    let mut file = tempfile::tempfile().unwrap();
    file.write_all(b"{\"P\": 1}").unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    assert!(DefaultSolver::<f64>::read_from_file(&mut file).is_err());
}
