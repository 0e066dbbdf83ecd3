#![allow(non_snake_case)]
use crate::algebra::*;

// ---------------
// equilibration data
// ---------------

/// Data from the Ruiz equilibration procedure
#[derive(Debug, Clone)]
pub struct DefaultEquilibrationData<T> {
    // scaling matrices for problem data equilibration
    // fields d,e,dinv,einv are vectors of scaling values
    // to be treated as diagonal scaling data
    /// Vector of variable scaling terms
    pub d: Vec<T>,
    /// Vector of inverse variable scaling terms
    pub dinv: Vec<T>,
    /// Vector of constraint scaling terms
    pub e: Vec<T>,
    /// Vector of inverse constraint scaling terms
    pub einv: Vec<T>,
    /// overall scaling for objective function
    pub c: T,
}

impl<T> DefaultEquilibrationData<T>
where
    T: FloatT,
{
    /// creates a new equilibration object with identity scaling
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            d: vec![T::one(); n],
            dinv: vec![T::one(); n],
            e: vec![T::one(); m],
            einv: vec![T::one(); m],
            c: T::one(),
        }
    }
}

// ---------------
// utilities
// ---------------

pub(crate) fn kkt_col_norms<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    norm_LHS: &mut [T],
    norm_RHS: &mut [T],
) {
    P.col_norms_sym(norm_LHS); // P can be triu
    A.col_norms_no_reset(norm_LHS); // incrementally from P norms
    A.row_norms(norm_RHS); // same as column norms of A'
}

pub(crate) fn limit_scaling<T>(s: T, minval: T, maxval: T) -> T
where
    T: FloatT + ScalarMath<T = T>,
{
    s.clip(minval, maxval, T::one(), maxval)
}

// restricts each step δ so that the product δ .* s lies in [minval, maxval]
pub(crate) fn limit_cumulative_scaling<T: FloatT>(δ: &mut [T], s: &[T], minval: T, maxval: T) {
    for (δi, &si) in std::iter::zip(δ.iter_mut(), s) {
        *δi = T::min(T::max(*δi, minval / si), maxval / si);
    }
}

pub(crate) fn scale_data<T: FloatT>(
    P: &mut CscMatrix<T>,
    A: &mut CscMatrix<T>,
    q: &mut [T],
    b: &mut [T],
    d: Option<&[T]>,
    e: &[T],
) {
    match d {
        Some(d) => {
            P.lrscale(d, d); // P[:,:] = Ds*P*Ds
            A.lrscale(e, d); // A[:,:] = Es*A*Ds
            q.hadamard(d);
        }
        None => {
            A.lscale(e); // A[:,:] = Es*A
        }
    }
    b.hadamard(e);
}

#[test]
fn test_limit_scaling() {
    // tiny norms are treated as unit norms, large ones are capped
    assert_eq!(limit_scaling(1e-6, 1e-4, 1e4), 1.0);
    assert_eq!(limit_scaling(1e6, 1e-4, 1e4), 1e4);
    assert_eq!(limit_scaling(2.0, 1e-4, 1e4), 2.0);
}

#[test]
fn test_limit_cumulative_scaling() {
    let s: Vec<f64> = vec![1e-3, 1., 1e3];
    let mut δ: Vec<f64> = vec![1e-2, 1e-6, 1e2];
    limit_cumulative_scaling(&mut δ, &s, 1e-4, 1e4);
    assert_eq!(δ[1], 1e-4);
    assert!((δ[0] * s[0] - 1e-4).abs() < 1e-18);
    assert!((δ[2] * s[2] - 1e4).abs() < 1e-9);
}

#[test]
fn test_kkt_col_norms() {
    let P = CscMatrix::from(&[
        [1., 3.], //
        [0., 2.], //
    ]);
    let A = CscMatrix::from(&[
        [-4., 0.], //
        [0., 0.5], //
    ]);
    let mut dn = vec![0.; 2];
    let mut en = vec![0.; 2];
    kkt_col_norms(&P, &A, &mut dn, &mut en);
    assert_eq!(dn, vec![4., 3.]);
    assert_eq!(en, vec![4., 0.5]);
}
