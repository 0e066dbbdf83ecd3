#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::qdldl::*;
use crate::solver::core::traits::KKTSystem;

// ---------------
// KKT matrix assembly
// ---------------

// Index maps from the problem data into the nonzeros
// of an assembled upper triangular KKT matrix
//
//     [ P + σI     A'    ]
//     [   A     -diag(δ) ]
//
#[derive(Debug, Clone)]
pub(crate) struct KKTDataMaps {
    pub P: Vec<usize>,
    pub A: Vec<usize>,
    // diagonal of the upper left block, including structural zeros
    pub diagP: Vec<usize>,
    // diagonal of the lower right block
    pub diag_rho: Vec<usize>,
}

impl KKTDataMaps {
    fn new<T: FloatT>(P: &CscMatrix<T>, A: &CscMatrix<T>) -> Self {
        let (m, n) = A.size();
        Self {
            P: vec![0; P.nnz()],
            A: vec![0; A.nnz()],
            diagP: vec![0; n],
            diag_rho: vec![0; m],
        }
    }
}

/// Assemble the pattern of the upper triangular KKT matrix from `P`
/// (triu) and `A`.   The diagonal blocks hold only the values of `P`
/// and must be filled in by the caller through the returned maps.
pub(crate) fn assemble_kkt_matrix<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
) -> (CscMatrix<T>, KKTDataMaps) {
    let mut maps = KKTDataMaps::new(P, A);
    let (m, n) = A.size();

    let nnz_diagP = P.count_diagonal_entries();
    let nnzKKT = P.nnz() + n - nnz_diagP + A.nnz() + m;

    let mut K = CscMatrix::<T>::spalloc(m + n, m + n, nnzKKT);

    // use K.colptr to hold nnz entries in each column
    K.colptr.fill(0);
    K.colcount_block(P, 0, MatrixShape::N);
    K.colcount_missing_diag(P, 0);
    K.colcount_block(A, n, MatrixShape::T);
    K.colcount_diag(n, m);

    // cumsum total entries to convert to K.colptr
    K.colcount_to_colptr();

    K.fill_block(P, &mut maps.P, 0, 0, MatrixShape::N);
    K.fill_missing_diag(P, 0); // after P, since triu
    K.fill_block(A, &mut maps.A, 0, n, MatrixShape::T);
    K.fill_diag(&mut maps.diag_rho, n, m);

    K.backshift_colptrs();

    // diagonal is last in each column
    for (d, &ptr) in maps.diagP.iter_mut().zip(&K.colptr[1..=n]) {
        *d = ptr - 1;
    }

    (K, maps)
}

// signs of the pivots of a quasidefinite KKT matrix
pub(crate) fn kkt_dsigns(n: usize, m: usize) -> Vec<i8> {
    let mut dsigns = vec![1_i8; n + m];
    dsigns[n..].fill(-1);
    dsigns
}

pub(crate) fn kkt_factorisation<T: FloatT>(
    K: &CscMatrix<T>,
    n: usize,
    m: usize,
) -> Result<QDLDLFactorisation<T>, QDLDLError> {
    let opts = QDLDLSettingsBuilder::<T>::default()
        .Dsigns(kkt_dsigns(n, m))
        .build()
        .map_err(|_| QDLDLError::IncompatibleDimension)?;

    QDLDLFactorisation::new(K, Some(opts))
}

// ---------------
// KKT system for the ADMM iteration
// ---------------

/// Standard-form solver type implementing the [`KKTSystem`](crate::solver::core::traits::KKTSystem) trait
///
/// Holds a factorization of
///
/// ```text
/// [ P + σI       A'     ]
/// [   A     -diag(1/ρ)  ]
/// ```
///
/// and refactors it only when `P`, `A`, `σ` or `ρ` have changed
/// since the last factorization.

pub struct DefaultKKTSystem<T> {
    K: CscMatrix<T>,
    maps: KKTDataMaps,
    ldl: QDLDLFactorisation<T>,

    // values seen at the last factorization
    matrix_epoch: u64,
    rho_epoch: u64,
    sigma: T,

    // scratch for gathering updated values
    work: Vec<T>,
}

impl<T> DefaultKKTSystem<T>
where
    T: FloatT,
{
    pub fn new(
        data: &DefaultProblemData<T>,
        workspace: &DefaultWorkspace<T>,
        settings: &DefaultSettings<T>,
    ) -> Result<Self, QDLDLError> {
        let (m, n) = (data.m, data.n);
        let (mut K, maps) = assemble_kkt_matrix(&data.P, &data.A);

        let sigma = settings.sigma;
        for &idx in maps.diagP.iter() {
            K.nzval[idx] += sigma;
        }
        for (&idx, &ρinv) in maps.diag_rho.iter().zip(&workspace.rho_inv_vec) {
            K.nzval[idx] = -ρinv;
        }

        let ldl = kkt_factorisation(&K, n, m)?;

        Ok(Self {
            K,
            maps,
            ldl,
            matrix_epoch: data.matrix_epoch,
            rho_epoch: workspace.rho_epoch,
            sigma,
            work: Vec::new(),
        })
    }
}

// copy the KKT values at `indices` into the factorization
fn push_values<T: FloatT>(
    ldl: &mut QDLDLFactorisation<T>,
    K: &CscMatrix<T>,
    indices: &[usize],
    work: &mut Vec<T>,
) {
    work.clear();
    work.extend(indices.iter().map(|&i| K.nzval[i]));
    ldl.update_values(indices, work);
}

impl<T> KKTSystem<T> for DefaultKKTSystem<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type W = DefaultWorkspace<T>;
    type SE = DefaultSettings<T>;

    fn update(
        &mut self,
        data: &DefaultProblemData<T>,
        workspace: &DefaultWorkspace<T>,
        settings: &DefaultSettings<T>,
    ) -> bool {
        let matrix_stale = data.matrix_epoch != self.matrix_epoch;
        let sigma_stale = settings.sigma != self.sigma;
        let rho_stale = workspace.rho_epoch != self.rho_epoch;

        if !(matrix_stale || sigma_stale || rho_stale) {
            return true;
        }

        if matrix_stale || sigma_stale {
            let K = &mut self.K;
            let σ = settings.sigma;

            // P + σI, where P may be missing some diagonal entries
            for &idx in self.maps.diagP.iter() {
                K.nzval[idx] = T::zero();
            }
            for (&idx, &v) in self.maps.P.iter().zip(&data.P.nzval) {
                K.nzval[idx] = v;
            }
            for &idx in self.maps.diagP.iter() {
                K.nzval[idx] += σ;
            }
            push_values(&mut self.ldl, &self.K, &self.maps.P, &mut self.work);
            push_values(&mut self.ldl, &self.K, &self.maps.diagP, &mut self.work);
            self.sigma = σ;
        }

        if matrix_stale {
            for (&idx, &v) in self.maps.A.iter().zip(&data.A.nzval) {
                self.K.nzval[idx] = v;
            }
            push_values(&mut self.ldl, &self.K, &self.maps.A, &mut self.work);
            self.matrix_epoch = data.matrix_epoch;
        }

        if rho_stale {
            for (&idx, &ρinv) in self.maps.diag_rho.iter().zip(&workspace.rho_inv_vec) {
                self.K.nzval[idx] = -ρinv;
            }
            push_values(&mut self.ldl, &self.K, &self.maps.diag_rho, &mut self.work);
            self.rho_epoch = workspace.rho_epoch;
        }

        self.ldl.refactor().is_ok()
    }

    fn solve(&mut self, workspace: &mut DefaultWorkspace<T>) -> bool {
        self.ldl.solve(&mut workspace.kkt_rhs);
        workspace.kkt_rhs.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::cones::{CompositeCone, SupportedConeT::*};
    use crate::solver::core::traits::Workspace;

    #[test]
    fn test_kkt_assembly() {
        // P has no entry on its second diagonal
        let P = CscMatrix::from(&[
            [1., 2.], //
            [0., 0.], //
        ]);
        let A = CscMatrix::from(&[
            [3., 0.], //
            [4., 5.], //
        ]);
        let (mut K, maps) = assemble_kkt_matrix(&P, &A);

        assert!(K.is_triu());
        assert_eq!(K.nnz(), 2 + 1 + 3 + 2);
        assert!(K.check_format().is_ok());

        for &idx in maps.diagP.iter() {
            K.nzval[idx] += 10.;
        }
        for &idx in maps.diag_rho.iter() {
            K.nzval[idx] = -1.;
        }

        let Ktrue = CscMatrix::from(&[
            [11., 2., 3., 4.], //
            [0., 10., 0., 5.], //
            [0., 0., -1., 0.], //
            [0., 0., 0., -1.], //
        ]);
        assert_eq!(K, Ktrue);
    }

    fn test_setup() -> (
        DefaultProblemData<f64>,
        DefaultWorkspace<f64>,
        CompositeCone<f64>,
        DefaultSettings<f64>,
    ) {
        let P = CscMatrix::from(&[
            [4., 1.], //
            [1., 2.], //
        ]);
        let A = CscMatrix::from(&[
            [1., 1.], //
            [1., 0.], //
            [0., 1.], //
        ]);
        let cones = CompositeCone::new(&[ZeroConeT(1), NonnegativeConeT(2)]);
        let data = DefaultProblemData::new(&P, &[1., 1.], &A, &[1., 0.7, 0.7], &cones, 1e20);
        let settings = DefaultSettings::default();
        let mut work = DefaultWorkspace::new(2, 3);
        work.reset(false, &data, &cones, &settings);
        (data, work, cones, settings)
    }

    // residual of the KKT system for the solution held in `work.kkt_rhs`
    fn kkt_residual(
        data: &DefaultProblemData<f64>,
        work: &DefaultWorkspace<f64>,
        sigma: f64,
        rhs: &[f64],
    ) -> f64 {
        let (n, m) = (data.n, data.m);
        let (x, v) = work.kkt_rhs.split_at(n);
        let mut r = rhs.to_vec();

        let (rx, rv) = r.split_at_mut(n);
        data.P.sym().symv(rx, x, -1., 1.);
        rx.axpby(-sigma, x, 1.);
        data.A.t().gemv(rx, v, -1., 1.);
        data.A.gemv(rv, x, -1., 1.);
        for i in 0..m {
            rv[i] -= -work.rho_inv_vec[i] * v[i];
        }
        r.norm_inf()
    }

    #[test]
    fn test_kkt_solve_and_update() {
        let (mut data, mut work, cones, settings) = test_setup();
        let mut kkt = DefaultKKTSystem::new(&data, &work, &settings).unwrap();

        let rhs = vec![1., -2., 0.5, 3., -1.];
        work.kkt_rhs.copy_from_slice(&rhs);
        assert!(kkt.solve(&mut work));
        assert!(kkt_residual(&data, &work, settings.sigma, &rhs) < 1e-9);

        // a step size change is picked up by update
        work.set_rho(10., &cones);
        assert!(kkt.update(&data, &work, &settings));
        work.kkt_rhs.copy_from_slice(&rhs);
        assert!(kkt.solve(&mut work));
        assert!(kkt_residual(&data, &work, settings.sigma, &rhs) < 1e-9);

        // as are matrix changes
        data.set_value(DataField::P, 0, 7.);
        data.set_value(DataField::A, 3, -2.);
        data.finish_update(DataField::P);
        assert!(kkt.update(&data, &work, &settings));
        assert_eq!(kkt.matrix_epoch, data.matrix_epoch);
        work.kkt_rhs.copy_from_slice(&rhs);
        assert!(kkt.solve(&mut work));
        assert!(kkt_residual(&data, &work, settings.sigma, &rhs) < 1e-9);
    }
}
