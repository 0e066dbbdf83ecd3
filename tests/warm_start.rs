#![allow(non_snake_case)]

#[cfg(test)]
mod warm_start_tests {
    use embedqp::algebra::*;
    use embedqp::solver::*;

    #[allow(clippy::type_complexity)]
    fn warm_start_data() -> (
        CscMatrix<f64>,
        Vec<f64>,
        CscMatrix<f64>,
        Vec<f64>,
        Vec<SupportedConeT>,
    ) {
        let P = CscMatrix::from(&[[6., 0.], [0., 4.]]);
        let q = vec![-1., -4.];
        let A = CscMatrix::from(&[
            [1., -2.], //
            [1., 0.],  //
            [0., 1.],  //
            [-1., 0.], //
            [0., -1.], //
        ]);
        let b = vec![0., 1., 1., 1., 1.];
        let cones = vec![ZeroConeT(1), NonnegativeConeT(4)];
        (P, q, A, b, cones)
    }

    fn settings(warm_start: bool) -> DefaultSettings<f64> {
        DefaultSettingsBuilder::default()
            .verbose(false)
            .warm_start(warm_start)
            .build()
            .unwrap()
    }

    #[test]
    fn test_warm_start_after_perturbation() {
        let (P, q, A, b, cones) = warm_start_data();

        let mut solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings(true)).unwrap();
        solver.solve();
        assert_eq!(solver.status(), SolverStatus::Solved);

        // small change to the linear cost
        let q2 = vec![-1.01, -4.];
        solver.update_q(&q2).unwrap();
        solver.solve();
        assert_eq!(solver.status(), SolverStatus::Solved);
        let warm_iters = solver.iterations();

        // same problem from a cold start
        let mut cold = DefaultSolver::new(&P, &q2, &A, &b, &cones, settings(false)).unwrap();
        cold.solve();
        assert_eq!(cold.status(), SolverStatus::Solved);

        assert!(warm_iters <= cold.iterations());
        assert!(solver.solution.x.dist(&cold.solution.x) <= 1e-4);
    }

    #[test]
    fn test_warm_start_user_point() {
        let (P, q, A, b, cones) = warm_start_data();

        let mut solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings(false)).unwrap();
        solver.solve();
        let reference = solver.solution().unwrap();

        // a user supplied start is used even with the setting off
        let mut solver2 = DefaultSolver::new(&P, &q, &A, &b, &cones, settings(false)).unwrap();
        solver2.warm_start(&reference.x, &reference.z).unwrap();
        solver2.solve();

        assert_eq!(solver2.status(), SolverStatus::Solved);
        assert!(solver2.iterations() <= reference.iterations);
        assert!(solver2.solution.x.dist(&reference.x) <= 1e-4);

        // and only once
        solver2.solve();
        assert_eq!(solver2.iterations(), reference.iterations);
    }

    #[test]
    fn test_warm_start_dimension_mismatch() {
        let (P, q, A, b, cones) = warm_start_data();

        let mut solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings(false)).unwrap();

        assert_eq!(
            solver.warm_start(&[0.; 3], &[0.; 5]),
            Err(SolverError::ParameterShape {
                expected: 2,
                found: 3
            })
        );
        assert_eq!(
            solver.warm_start(&[0.; 2], &[0.; 4]),
            Err(SolverError::ParameterShape {
                expected: 5,
                found: 4
            })
        );
    }

    #[test]
    fn test_warm_start_resumes_after_max_iter() {
        let (P, q, A, b, cones) = warm_start_data();

        let settings = DefaultSettingsBuilder::default()
            .verbose(false)
            .warm_start(true)
            .max_iter(5)
            .build()
            .unwrap();

        let mut solver = DefaultSolver::new(&P, &q, &A, &b, &cones, settings).unwrap();
        solver.solve();
        assert_eq!(solver.status(), SolverStatus::MaxIterations);

        // each solve continues from the previous iterate
        for _ in 0..1000 {
            if solver.status() == SolverStatus::Solved {
                break;
            }
            solver.solve();
        }
        assert_eq!(solver.status(), SolverStatus::Solved);
    }
}
