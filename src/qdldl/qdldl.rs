#![allow(non_snake_case)]
use crate::algebra::*;
use core::cmp::{max, min};
use derive_builder::Builder;
use std::iter::zip;
use thiserror::Error;

/// Error codes returnable from [`QDLDLFactorisation`](QDLDLFactorisation) factor operations

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QDLDLError {
    #[error("Matrix dimension fields are incompatible")]
    IncompatibleDimension,
    #[error("Matrix has a zero column")]
    EmptyColumn,
    #[error("Matrix is not upper triangular")]
    NotUpperTriangular,
    #[error("Matrix factorization produced a zero pivot")]
    ZeroPivot,
    #[error("Invalid permutation vector")]
    InvalidPermutation,
    #[error("AMD ordering failed")]
    OrderingFailed,
}

/// Required settings for [`QDLDLFactorisation`](QDLDLFactorisation)

#[derive(Builder, Debug, Clone)]
pub struct QDLDLSettings<T: FloatT> {
    #[builder(default = "1.5")]
    amd_dense_scale: f64,
    #[builder(default = "None", setter(strip_option))]
    perm: Option<Vec<usize>>,
    #[builder(default = "None", setter(strip_option))]
    Dsigns: Option<Vec<i8>>,
    #[builder(default = "true")]
    regularize_enable: bool,
    #[builder(default = "(1e-12).as_T()")]
    regularize_eps: T,
    #[builder(default = "(1e-7).as_T()")]
    regularize_delta: T,
}

impl<T> Default for QDLDLSettings<T>
where
    T: FloatT,
{
    fn default() -> QDLDLSettings<T> {
        QDLDLSettings {
            amd_dense_scale: 1.5,
            perm: None,
            Dsigns: None,
            regularize_enable: true,
            regularize_eps: (1e-12).as_T(),
            regularize_delta: (1e-7).as_T(),
        }
    }
}

/// Performs $LDL^T$ factorization of a symmetric quasidefinite matrix.
///
/// The sparsity pattern of the input is fixed at construction.  Numeric
/// values can be changed in place with [`update_values`](Self::update_values)
/// followed by [`refactor`](Self::refactor), which reuses the ordering and
/// the symbolic analysis.

#[derive(Debug)]
pub struct QDLDLFactorisation<T = f64> {
    // permutation vector
    pub perm: Vec<usize>,
    // lower triangular factor
    pub L: CscMatrix<T>,
    // D and is inverse for A = LDL^T
    pub D: Vec<T>,
    pub Dinv: Vec<T>,
    // workspace data
    workspace: QDLDLWorkspace<T>,
}

impl<T> QDLDLFactorisation<T>
where
    T: FloatT,
{
    pub fn new(
        Ain: &CscMatrix<T>,
        opts: Option<QDLDLSettings<T>>,
    ) -> Result<QDLDLFactorisation<T>, QDLDLError> {
        //sanity check on structure
        check_structure(Ain)?;

        let n = Ain.nrows();
        let opts = opts.unwrap_or_default();

        // AMD ordering unless the caller fixes one
        let (perm, iperm) = match opts.perm {
            Some(perm) => {
                let iperm = _invperm(&perm)?;
                (perm, iperm)
            }
            None => _get_amd_ordering(Ain, opts.amd_dense_scale)?,
        };

        //permute to (another) upper triangular matrix and store the
        //index mapping the input's entries to the permutation's entries
        let (A, AtoPAPt) = _permute_symmetric(Ain, &iperm);

        // expected signs of D, permuted.  All positive if unspecified
        let mut Dsigns = vec![1_i8; n];
        if let Some(ds) = opts.Dsigns {
            if ds.len() != n {
                return Err(QDLDLError::IncompatibleDimension);
            }
            _permute(&mut Dsigns, &ds, &perm);
        }

        let regularizer = Regularizer {
            enable: opts.regularize_enable,
            eps: opts.regularize_eps,
            delta: opts.regularize_delta,
            Dsigns,
        };

        let mut workspace = QDLDLWorkspace::<T>::new(A, AtoPAPt, regularizer);

        // allocate the factors using the column counts from the etree
        let sumLnz = workspace.Lnz.iter().sum();
        let mut L = CscMatrix::spalloc(n, n, sumLnz);
        let mut D = vec![T::zero(); n];
        let mut Dinv = vec![T::zero(); n];

        workspace.factor(&mut L, &mut D, &mut Dinv)?;

        Ok(QDLDLFactorisation {
            perm,
            L,
            D,
            Dinv,
            workspace,
        })
    }

    /// number of strictly positive entries in D
    pub fn positive_inertia(&self) -> usize {
        self.workspace.positive_inertia
    }

    /// number of pivots replaced by the dynamic regularizer
    pub fn regularize_count(&self) -> usize {
        self.workspace.regularize_count
    }

    /// Solves Ax = b using LDL factors for A, in place (x replaces b).
    pub fn solve(&mut self, b: &mut [T]) {
        assert_eq!(b.len(), self.D.len());

        let tmp = &mut self.workspace.fwork;
        _permute(tmp, b, &self.perm);

        _solve(
            &self.L.colptr,
            &self.L.rowval,
            &self.L.nzval,
            &self.Dinv,
            tmp,
        );

        _ipermute(b, tmp, &self.perm);
    }

    /// Overwrite entries of the (unpermuted) input matrix.  `indices`
    /// address the `nzval` field of the matrix passed to `new`.
    pub fn update_values(&mut self, indices: &[usize], values: &[T]) {
        assert_eq!(indices.len(), values.len());
        let nzval = &mut self.workspace.triuA.nzval;
        let AtoPAPt = &self.workspace.AtoPAPt;

        for (&idx, &v) in zip(indices, values) {
            nzval[AtoPAPt[idx]] = v;
        }
    }

    /// Numeric refactorization after [`update_values`](Self::update_values)
    pub fn refactor(&mut self) -> Result<(), QDLDLError> {
        self.workspace
            .factor(&mut self.L, &mut self.D, &mut self.Dinv)
    }
}

fn check_structure<T: FloatT>(A: &CscMatrix<T>) -> Result<(), QDLDLError> {
    if !A.is_square() {
        return Err(QDLDLError::IncompatibleDimension);
    }

    if !A.is_triu() {
        return Err(QDLDLError::NotUpperTriangular);
    }

    //Error if A doesn't have at least one entry in every column
    if !A.colptr.windows(2).all(|c| c[0] < c[1]) {
        return Err(QDLDLError::EmptyColumn);
    }

    Ok(())
}

// dynamic regularization of pivots with the wrong sign
#[derive(Debug)]
struct Regularizer<T> {
    enable: bool,
    eps: T,
    delta: T,
    Dsigns: Vec<i8>,
}

impl<T: FloatT> Regularizer<T> {
    // returns the (possibly replaced) pivot and whether it was replaced
    fn apply(&self, k: usize, d: T) -> (T, bool) {
        if !self.enable {
            return (d, false);
        }
        let sign = if self.Dsigns[k] < 0 { -T::one() } else { T::one() };
        if d * sign < self.eps {
            (self.delta * sign, true)
        } else {
            (d, false)
        }
    }
}

#[derive(Debug)]
struct QDLDLWorkspace<T> {
    // symbolic analysis
    etree: Vec<usize>,
    Lnz: Vec<usize>,

    // scratch
    iwork: Vec<usize>,
    bwork: Vec<bool>,
    fwork: Vec<T>,

    // number of positive values in D
    positive_inertia: usize,

    // The upper triangular matrix factorisation target
    // This is the post ordering PAPt of the original data
    triuA: CscMatrix<T>,

    // mapping from entries in the triu form of the original
    // input to the post ordering triu form used for the factorization
    AtoPAPt: Vec<usize>,

    regularizer: Regularizer<T>,

    // number of regularized entries in D
    regularize_count: usize,
}

impl<T> QDLDLWorkspace<T>
where
    T: FloatT,
{
    fn new(triuA: CscMatrix<T>, AtoPAPt: Vec<usize>, regularizer: Regularizer<T>) -> Self {
        let n = triuA.ncols();
        let mut etree = vec![0; n];
        let mut Lnz = vec![0; n];
        let mut iwork = vec![0; n * 3];

        _etree(n, &triuA.colptr, &triuA.rowval, &mut iwork, &mut Lnz, &mut etree);

        Self {
            etree,
            Lnz,
            iwork,
            bwork: vec![false; n],
            fwork: vec![T::zero(); n],
            positive_inertia: 0,
            triuA,
            AtoPAPt,
            regularizer,
            regularize_count: 0,
        }
    }

    // numeric factorization of triuA into the preallocated factors
    fn factor(
        &mut self,
        L: &mut CscMatrix<T>,
        D: &mut [T],
        Dinv: &mut [T],
    ) -> Result<(), QDLDLError> {
        let n = self.triuA.n;
        let (Ap, Ai, Ax) = (&self.triuA.colptr, &self.triuA.rowval, &self.triuA.nzval);
        let (Lp, Li, Lx) = (&mut L.colptr, &mut L.rowval, &mut L.nzval);

        self.regularize_count = 0;
        let mut positive_count = 0;

        if n == 0 {
            self.positive_inertia = 0;
            return Ok(());
        }

        // partition working memory into pieces
        let y_markers = &mut self.bwork;
        let (y_idx, iwork) = self.iwork.split_at_mut(n);
        let (elim_buffer, next_colspace) = iwork.split_at_mut(n);
        let y_vals = &mut self.fwork;

        //set Lp to cumsum(Lnz), starting from zero
        Lp[0] = 0;
        let mut acc = 0;
        for (Lp, Lnz) in zip(&mut Lp[1..], &self.Lnz) {
            acc += Lnz;
            *Lp = acc;
        }

        y_markers.fill(QDLDL_UNUSED);
        y_vals.fill(T::zero());
        D.fill(T::zero());
        next_colspace.copy_from_slice(&Lp[0..n]);

        for k in 0..n {
            // solve y = L(0:k-1,0:k-1) \ b, where b is the part of the kth
            // column of A above the diagonal.  y becomes the kth row of L.
            let mut nnz_y = 0;

            // first pass : determine the nonzero pattern of y
            for i in Ap[k]..Ap[k + 1] {
                let bidx = Ai[i];

                if bidx == k {
                    D[k] = Ax[i];
                    continue;
                }

                y_vals[bidx] = Ax[i];

                if y_markers[bidx] == QDLDL_UNUSED {
                    // walk up the etree until we reach a visited node
                    y_markers[bidx] = QDLDL_USED;
                    elim_buffer[0] = bidx;
                    let mut nnz_e = 1;

                    let mut next_idx = self.etree[bidx];
                    while next_idx != QDLDL_UNKNOWN && next_idx < k {
                        if y_markers[next_idx] == QDLDL_USED {
                            break;
                        }
                        y_markers[next_idx] = QDLDL_USED;
                        elim_buffer[nnz_e] = next_idx;
                        next_idx = self.etree[next_idx];
                        nnz_e += 1;
                    }

                    // append the path in reverse order
                    while nnz_e != 0 {
                        nnz_e -= 1;
                        y_idx[nnz_y] = elim_buffer[nnz_e];
                        nnz_y += 1;
                    }
                }
            }

            // second pass : compute values in topological order
            for &cidx in y_idx[0..nnz_y].iter().rev() {
                let tmp_idx = next_colspace[cidx];
                let y_vals_cidx = y_vals[cidx];

                for j in Lp[cidx]..tmp_idx {
                    y_vals[Li[j]] -= Lx[j] * y_vals_cidx;
                }

                Lx[tmp_idx] = y_vals_cidx * Dinv[cidx];
                D[k] -= y_vals_cidx * Lx[tmp_idx];

                Li[tmp_idx] = k;
                next_colspace[cidx] += 1;

                y_vals[cidx] = T::zero();
                y_markers[cidx] = QDLDL_UNUSED;
            }

            let (dk, replaced) = self.regularizer.apply(k, D[k]);
            D[k] = dk;
            if replaced {
                self.regularize_count += 1;
            }

            if D[k] == T::zero() || !D[k].is_finite() {
                return Err(QDLDLError::ZeroPivot);
            }
            if D[k] > T::zero() {
                positive_count += 1;
            }
            Dinv[k] = T::recip(D[k]);
        }

        self.positive_inertia = positive_count;
        Ok(())
    }
}

const QDLDL_UNKNOWN: usize = usize::MAX;
const QDLDL_USED: bool = true;
const QDLDL_UNUSED: bool = false;

// Compute the elimination tree and column counts of L for
// a quasidefinite matrix in compressed sparse column form.
fn _etree(
    n: usize,
    Ap: &[usize],
    Ai: &[usize],
    work: &mut [usize],
    Lnz: &mut [usize],
    etree: &mut [usize],
) {
    work.fill(0);
    Lnz.fill(0);
    etree.fill(QDLDL_UNKNOWN);

    for j in 0..n {
        work[j] = j;
        for &istart in &Ai[Ap[j]..Ap[j + 1]] {
            let mut i = istart;

            while work[i] != j {
                if etree[i] == QDLDL_UNKNOWN {
                    etree[i] = j;
                }
                Lnz[i] += 1;
                work[i] = j;
                i = etree[i];
            }
        }
    }
}

// Solves (L+I)x = b, with x replacing b
fn _lsolve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], x: &mut [T]) {
    for i in 0..x.len() {
        let xi = x[i];
        let (f, l) = (Lp[i], Lp[i + 1]);
        for (&Lij, &Lxj) in zip(&Li[f..l], &Lx[f..l]) {
            x[Lij] -= Lxj * xi;
        }
    }
}

// Solves (L+I)'x = b, with x replacing b
fn _ltsolve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], x: &mut [T]) {
    for i in (0..x.len()).rev() {
        let (f, l) = (Lp[i], Lp[i + 1]);
        let s = zip(&Li[f..l], &Lx[f..l]).fold(T::zero(), |s, (&Lij, &Lxj)| s + Lxj * x[Lij]);
        x[i] -= s;
    }
}

// Solves Ax = b where A has given LDL factors, with x replacing b
fn _solve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], Dinv: &[T], b: &mut [T]) {
    _lsolve(Lp, Li, Lx, b);
    b.hadamard(Dinv);
    _ltsolve(Lp, Li, Lx, b);
}

// Construct an inverse permutation from a permutation
fn _invperm(p: &[usize]) -> Result<Vec<usize>, QDLDLError> {
    let mut b = vec![QDLDL_UNKNOWN; p.len()];

    for (i, &j) in p.iter().enumerate() {
        if j >= p.len() || b[j] != QDLDL_UNKNOWN {
            return Err(QDLDLError::InvalidPermutation);
        }
        b[j] = i;
    }
    Ok(b)
}

// internal permutation and inverse permutation
// functions that require no memory allocations

fn _permute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, x).for_each(|(p, x)| *x = b[*p]);
}

fn _ipermute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, b).for_each(|(p, b)| x[*p] = *b);
}

// Given a sparse symmetric matrix `A` (with only upper triangular entries), return
// permuted sparse symmetric matrix `P` (also only upper triangular) given the
// inverse permutation vector `iperm`, and the map from entries of A to P.
// Follows Davis, "Direct Methods for Sparse Linear Systems".
fn _permute_symmetric<T: FloatT>(A: &CscMatrix<T>, iperm: &[usize]) -> (CscMatrix<T>, Vec<usize>) {
    let n = A.nrows();
    let mut P = CscMatrix::<T>::spalloc(n, n, A.nnz());
    let mut AtoPAPt = vec![0; A.nnz()];

    // count entries in each column of P
    let mut row_starts = vec![0; n];
    for colA in 0..n {
        let colP = iperm[colA];
        for &rowA in &A.rowval[A.colptr[colA]..A.colptr[colA + 1]] {
            if rowA <= colA {
                row_starts[max(iperm[rowA], colP)] += 1;
            }
        }
    }

    // cumulative sum gives the colptr, and each column's next free slot
    P.colptr[0] = 0;
    let mut acc = 0;
    for (c, count) in zip(&mut P.colptr[1..], &mut row_starts) {
        let start = acc;
        acc += *count;
        *c = acc;
        *count = start;
    }

    // place entries.  Rows within a column end up unordered
    for colA in 0..n {
        let colP = iperm[colA];
        for rowA_idx in A.colptr[colA]..A.colptr[colA + 1] {
            let rowA = A.rowval[rowA_idx];
            if rowA <= colA {
                let rowP = iperm[rowA];
                let col_idx = max(colP, rowP);
                let dest = row_starts[col_idx];

                P.rowval[dest] = min(colP, rowP);
                P.nzval[dest] = A.nzval[rowA_idx];
                AtoPAPt[rowA_idx] = dest;

                row_starts[col_idx] += 1;
            }
        }
    }
    (P, AtoPAPt)
}

fn _get_amd_ordering<T: FloatT>(
    A: &CscMatrix<T>,
    amd_dense_scale: f64,
) -> Result<(Vec<usize>, Vec<usize>), QDLDLError> {
    let mut control = amd::Control::default();
    control.dense *= amd_dense_scale;
    let (perm, iperm, _info) = amd::order(A.nrows(), &A.colptr, &A.rowval, &control)
        .map_err(|_| QDLDLError::OrderingFailed)?;
    Ok((perm, iperm))
}

//configure tests of internals
#[path = "test.rs"]
#[cfg(test)]
mod test;
