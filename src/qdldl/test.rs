use super::*;
use crate::algebra::{CscMatrix, FloatT};

fn test_matrix_4x4() -> CscMatrix<f64> {
    // A =
    //[ 8.0  -3.0   2.0    ⋅ ]
    //[  ⋅    8.0  -1.0    ⋅ ]
    //[  ⋅     ⋅    8.0  -1.0]
    //[  ⋅     ⋅     ⋅    1.0]
    CscMatrix::new(
        4,
        4,
        vec![0, 1, 3, 6, 8],
        vec![0, 0, 1, 0, 1, 2, 2, 3],
        vec![8., -3., 8., 2., -1., 8., -1., 1.],
    )
}

// triu part of the quasidefinite matrix [I A'; A -I] with A = [1 2]
fn test_matrix_quasidef() -> CscMatrix<f64> {
    CscMatrix::from(&[
        [1., 0., 1.],  //
        [0., 1., 2.],  //
        [0., 0., -1.], //
    ])
}

fn inf_norm_diff<T: FloatT>(a: &[T], b: &[T]) -> T {
    zip(a, b).fold(T::zero(), |acc, (x, y)| T::max(acc, T::abs(*x - *y)))
}

#[test]
fn test_invperm() {
    let perm = vec![3, 0, 2, 1];
    assert_eq!(_invperm(&perm).unwrap(), vec![1, 3, 2, 0]);

    //repeated index, including a repeat of the entry mapped from 0
    assert!(_invperm(&[3, 0, 2, 0]).is_err());
    assert!(_invperm(&[1, 1]).is_err());

    //index too big
    assert!(_invperm(&[4, 0, 2, 1]).is_err());
}

#[test]
fn test_permute() {
    let perm = vec![3, 0, 2, 1];
    let b = vec![1., 2., 3., 4.];
    let mut x = vec![0.; 4];
    let mut y = vec![0.; 4];

    _permute(&mut x, &b, &perm);
    assert_eq!(x, vec![4., 1., 3., 2.]);

    _ipermute(&mut y, &x, &perm);
    assert_eq!(y, b);
}

#[test]
fn test_solve_from_factors() {
    //L =
    //[ ⋅    ⋅     ⋅    ⋅ ]
    //[1.0   ⋅     ⋅    ⋅ ]
    //[2.0  1.0    ⋅    ⋅ ]
    //[ ⋅   7.0  -3.0   ⋅ ]

    let Lp = vec![0, 2, 4, 5, 5];
    let Li = vec![1, 2, 2, 3, 3];
    let Lx = vec![1., 2., 1., 7., -3.];
    let dinv = [0.25, -1.0, -0.5, 1.0];
    let x = vec![-3., 2., 1., 4.];

    //(I+L)x = b
    let mut b = vec![-3., -1., -3., 15.];
    _lsolve(&Lp, &Li, &Lx, &mut b);
    assert_eq!(b, x);

    //(I+L')x = b
    let mut b = vec![1., 31., -11., 4.];
    _ltsolve(&Lp, &Li, &Lx, &mut b);
    assert_eq!(b, x);

    //(I+L)*D*(I+L)'*x = b
    let mut b = vec![4., -27., -1., -279.];
    _solve(&Lp, &Li, &Lx, &dinv, &mut b);
    assert_eq!(b, x);
}

#[test]
fn test_etree() {
    let n = 4;
    let A = test_matrix_4x4();
    let mut Lnz = vec![0; n];
    let mut iwork = vec![0; 3 * n];
    let mut etree = vec![0; n];

    _etree(n, &A.colptr, &A.rowval, &mut iwork, &mut Lnz, &mut etree);

    assert_eq!(etree, vec![1, 2, 3, QDLDL_UNKNOWN]);
    assert_eq!(Lnz, vec![2, 1, 1, 0]);
}

#[test]
fn test_permute_symmetric() {
    //no permutation at all
    let A = test_matrix_4x4();
    let iperm: Vec<usize> = vec![0, 1, 2, 3];
    let (P, AtoPAPt) = _permute_symmetric(&A, &iperm);

    assert_eq!(&A.colptr, &P.colptr);
    assert_eq!(&A.rowval, &P.rowval);
    assert_eq!(&A.nzval, &P.nzval);
    let linearidx: Vec<usize> = (0..AtoPAPt.len()).collect();
    assert_eq!(&linearidx, &AtoPAPt);

    //with a permutation.  Entries within each permuted
    //column are not ordered by increasing row number
    let mut A = test_matrix_4x4();
    for (i, v) in A.nzval.iter_mut().enumerate() {
        *v = i as f64 + 1.;
    }

    let perm: Vec<usize> = vec![2, 3, 0, 1];
    let iperm = _invperm(&perm).unwrap();
    let (P, AtoPAPt) = _permute_symmetric(&A, &iperm);

    assert_eq!(&P.colptr, &vec![0, 1, 3, 5, 8]);
    assert_eq!(&P.rowval, &vec![0, 0, 1, 2, 0, 2, 3, 0]);
    assert_eq!(&P.nzval, &vec![6.0, 7.0, 8.0, 1.0, 4.0, 2.0, 3.0, 5.0]);

    // every entry of A is mapped to its own value in P
    for (k, &dest) in AtoPAPt.iter().enumerate() {
        assert_eq!(P.nzval[dest], A.nzval[k]);
    }
}

#[test]
fn test_settings_builder() {
    let opts = QDLDLSettings::<f64>::default();
    assert_eq!(opts.regularize_eps, 1e-12);
    assert_eq!(opts.amd_dense_scale, 1.5);

    //builder defaults agree with Default
    let opts = QDLDLSettingsBuilder::<f64>::default().build().unwrap();
    assert_eq!(opts.regularize_eps, 1e-12);
    assert_eq!(opts.regularize_delta, 1e-7);

    let opts = QDLDLSettingsBuilder::default()
        .perm(vec![0, 1, 2, 3])
        .regularize_enable(true)
        .regularize_eps(1e-3)
        .regularize_delta(1e-3)
        .build()
        .unwrap();

    assert_eq!(opts.regularize_eps, 1e-3);
    assert_eq!(opts.regularize_delta, 1e-3);
}

#[test]
fn test_solve_basic() {
    let A = test_matrix_4x4();
    let x = [1., -2., 3., -4.];

    let orderings: [Option<Vec<usize>>; 3] = [Some(vec![0, 1, 2, 3]), None, Some(vec![3, 0, 2, 1])];

    for perm in orderings {
        let opts = match perm {
            Some(p) => QDLDLSettingsBuilder::default().perm(p).build().unwrap(),
            None => QDLDLSettings::default(),
        };
        let mut factors = QDLDLFactorisation::new(&A, Some(opts)).unwrap();
        let mut b = [20.0, -22.0, 32.0, -7.0];
        factors.solve(&mut b);
        assert!(inf_norm_diff(&x, &b) <= 1e-8);
        assert_eq!(factors.positive_inertia(), 4);
    }
}

#[test]
fn test_quasidefinite_with_signs() {
    let K = test_matrix_quasidef();
    let opts = QDLDLSettingsBuilder::default()
        .Dsigns(vec![1, 1, -1])
        .build()
        .unwrap();

    let mut factors = QDLDLFactorisation::new(&K, Some(opts)).unwrap();
    assert_eq!(factors.positive_inertia(), 2);
    assert_eq!(factors.regularize_count(), 0);

    // K*[1,1,1] = [2, 3, 2]
    let mut b = [2., 3., 2.];
    factors.solve(&mut b);
    assert!(inf_norm_diff(&b, &[1., 1., 1.]) <= 1e-12);
}

#[test]
fn test_update_and_refactor() {
    let mut K = test_matrix_quasidef();
    let opts = QDLDLSettingsBuilder::default()
        .Dsigns(vec![1, 1, -1])
        .build()
        .unwrap();
    let mut factors = QDLDLFactorisation::new(&K, Some(opts)).unwrap();

    // change the (1,1) and (3,3) entries in the input ordering
    let indices = [0, 4];
    let values = [2., -0.5];
    factors.update_values(&indices, &values);
    factors.refactor().unwrap();
    K.nzval[0] = 2.;
    K.nzval[4] = -0.5;

    // K*[1,-1,2] = [4, 3, -2]
    let x = [1., -1., 2.];
    let mut b = [0.; 3];
    K.sym().symv(&mut b, &x, 1., 0.);
    factors.solve(&mut b);
    assert!(inf_norm_diff(&b, &x) <= 1e-12);
}

#[test]
fn test_bad_numeric_pivot() {
    //Disable regularization to force an exact zero pivot
    let opts = QDLDLSettingsBuilder::default()
        .regularize_enable(false)
        .perm(vec![0, 1, 2, 3])
        .build()
        .unwrap();

    let mut A = test_matrix_4x4();
    A.nzval[0] = 0.;
    assert_eq!(
        QDLDLFactorisation::new(&A, Some(opts.clone())).unwrap_err(),
        QDLDLError::ZeroPivot
    );

    //a negative final pivot is fine when regularization is off
    let mut A = test_matrix_4x4();
    *A.nzval.last_mut().unwrap() = 0.;
    let factors = QDLDLFactorisation::new(&A, Some(opts)).unwrap();
    assert_eq!(factors.positive_inertia(), 3);
}

#[test]
fn test_structure_errors() {
    let A = CscMatrix::from(&[
        [1.0, 3.0, 5.0], //
        [2.0, 3.0, 6.0], //
        [1.0, 4.0, 7.0], //
    ]);
    assert_eq!(
        QDLDLFactorisation::new(&A, None).unwrap_err(),
        QDLDLError::NotUpperTriangular
    );

    let A = CscMatrix::from(&[
        [1.0, 0.0, 5.0], //
        [0.0, 0.0, 6.0], //
        [0.0, 0.0, 7.0], //
    ]);
    assert_eq!(
        QDLDLFactorisation::new(&A, None).unwrap_err(),
        QDLDLError::EmptyColumn
    );

    let A = CscMatrix::<f64>::identity(3);
    let opts = QDLDLSettingsBuilder::default()
        .Dsigns(vec![1, 1])
        .build()
        .unwrap();
    assert_eq!(
        QDLDLFactorisation::new(&A, Some(opts)).unwrap_err(),
        QDLDLError::IncompatibleDimension
    );
}
