#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::{
    cones::{CompositeCone, Cone},
    traits::{Residuals, Workspace},
};
use itertools::izip;

// ---------------
// solution polishing
// ---------------
//
// Guesses the active constraints at a converged iterate and solves
// the equality constrained QP on that set directly, i.e.
//
//     [ P + δI    Ared' ] [x]   [  -q  ]
//     [  Ared     -δI   ] [y] = [ bred ]
//
// followed by iterative refinement against the unregularized system.
// The polished iterate replaces the ADMM iterate only if it does not
// increase either residual.

pub(crate) fn polish<T: FloatT>(
    workspace: &mut DefaultWorkspace<T>,
    data: &DefaultProblemData<T>,
    cones: &CompositeCone<T>,
    residuals: &mut DefaultResiduals<T>,
    settings: &DefaultSettings<T>,
) -> bool {
    if !cones.allows_polishing() {
        return false;
    }

    let (n, m) = (data.n, data.m);

    // active set from the slacks and duals
    let mut s = vec![T::zero(); m];
    workspace.slack(data, &mut s);
    let mut active = vec![false; m];
    cones.active_set(&mut active, &s, &workspace.y);
    for (a, &unbounded) in active.iter_mut().zip(&data.unbounded) {
        *a &= !unbounded;
    }

    let Ared = data.A.select_rows(&active);
    let bred: Vec<T> = izip!(&data.b, &active)
        .filter_map(|(&b, &a)| a.then_some(b))
        .collect();

    let Some(sol) = solve_reduced(data, &Ared, &bred, settings) else {
        return false;
    };
    let (xsol, ysol) = sol.split_at(n);

    // expand the duals back to all constraints
    let mut y = vec![T::zero(); m];
    let rows = active.iter().enumerate().filter_map(|(i, &a)| a.then_some(i));
    for (i, &yi) in rows.zip(ysol) {
        y[i] = yi;
    }

    // reject a guess whose duals leave the dual cone by more than
    // the absolute tolerance
    let mut py = y.clone();
    cones.project_dual(&mut py);
    let e = &data.equilibration.e;
    let cinv = T::recip(data.equilibration.c);
    let dual_dist = izip!(&y, &py, e)
        .map(|(&yi, &pyi, &ei)| T::abs(yi - pyi) * ei * cinv)
        .fold(T::zero(), T::max);
    if dual_dist > settings.eps_abs {
        return false;
    }

    let (rp_old, rd_old) = (residuals.rp, residuals.rd);

    // install the candidate, keeping the ADMM iterate for restoring
    workspace.save_prev();
    workspace.x.copy_from(xsol);
    workspace.y.copy_from(&py);
    data.A.gemv(&mut workspace.z, xsol, T::one(), T::zero());
    project_constraints(&mut workspace.z, &mut workspace.work_m, data, cones);

    residuals.update(workspace, data, cones, settings);

    let floor: T = (1e-10).as_T();
    let accept = residuals.rp <= T::max(rp_old, floor) && residuals.rd <= T::max(rd_old, floor);

    if !accept {
        workspace.x.copy_from(&workspace.x_prev);
        workspace.z.copy_from(&workspace.z_prev);
        workspace.y.copy_from(&workspace.y_prev);
        residuals.update(workspace, data, cones, settings);
    }
    accept
}

// Factors the regularized reduced KKT system and solves it with
// iterative refinement.   Returns the stacked solution [x; yred].
fn solve_reduced<T: FloatT>(
    data: &DefaultProblemData<T>,
    Ared: &CscMatrix<T>,
    bred: &[T],
    settings: &DefaultSettings<T>,
) -> Option<Vec<T>> {
    let (n, mred) = (data.n, Ared.nrows());
    let δ = settings.polish_delta;

    let (mut K, maps) = assemble_kkt_matrix(&data.P, Ared);
    for &idx in maps.diagP.iter() {
        K.nzval[idx] += δ;
    }
    for &idx in maps.diag_rho.iter() {
        K.nzval[idx] = -δ;
    }

    let mut ldl = kkt_factorisation(&K, n, mred).ok()?;

    let mut rhs = vec![T::zero(); n + mred];
    rhs[..n].copy_from(&data.q).negate();
    rhs[n..].copy_from(bred);

    let mut sol = rhs.clone();
    ldl.solve(&mut sol);

    // refine against the unregularized matrix
    let mut r = vec![T::zero(); n + mred];
    for _ in 0..settings.polish_refine_iter {
        reduced_kkt_residual(&mut r, &rhs, &sol, &data.P, Ared);
        ldl.solve(&mut r);
        sol.axpby(T::one(), &r, T::one());
    }

    sol.is_finite().then_some(sol)
}

// r = rhs - [P Ared'; Ared 0] * sol
fn reduced_kkt_residual<T: FloatT>(
    r: &mut [T],
    rhs: &[T],
    sol: &[T],
    P: &CscMatrix<T>,
    Ared: &CscMatrix<T>,
) {
    let n = P.ncols();
    r.copy_from(rhs);
    let (rx, ry) = r.split_at_mut(n);
    let (x, y) = sol.split_at(n);

    P.sym().symv(rx, x, -T::one(), T::one());
    Ared.t().gemv(rx, y, -T::one(), T::one());
    Ared.gemv(ry, x, -T::one(), T::one());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::cones::SupportedConeT::*;

    #[test]
    fn test_reduced_kkt_residual() {
        let P = CscMatrix::from(&[
            [2., 1.], //
            [0., 2.], //
        ]);
        let Ared = CscMatrix::from(&[[1., 1.]]);
        let sol = [1., 1., 2.];
        let rhs = [5., 5., 2.];
        let mut r = [0.; 3];
        reduced_kkt_residual(&mut r, &rhs, &sol, &P, &Ared);
        assert_eq!(r, [0., 0., 0.]);
    }

    #[test]
    fn test_polish_active_bound() {
        // minimize ½x² - 2x subject to x ≤ 1.  Optimum x = 1, y = 1
        let P = CscMatrix::from(&[[1.]]);
        let A = CscMatrix::from(&[[1.]]);
        let cones = CompositeCone::new(&[NonnegativeConeT(1)]);
        let data = DefaultProblemData::new(&P, &[-2.], &A, &[1.], &cones, 1e20);
        let settings = DefaultSettings::<f64>::default();

        // an approximate iterate with the bound active
        let mut work = DefaultWorkspace::new(1, 1);
        work.reset(false, &data, &cones, &settings);
        work.x[0] = 0.999;
        work.z[0] = 0.999;
        work.y[0] = 0.99;

        let mut res = DefaultResiduals::new(1, 1);
        res.update(&work, &data, &cones, &settings);

        assert!(polish(&mut work, &data, &cones, &mut res, &settings));
        assert!((work.x[0] - 1.).abs() < 1e-8);
        assert!((work.y[0] - 1.).abs() < 1e-8);
        assert!(res.rp < 1e-8 && res.rd < 1e-8);
    }

    #[test]
    fn test_polish_rejects_socp() {
        let P = CscMatrix::<f64>::zeros((2, 2));
        let A = CscMatrix::from(&[
            [1., 0.], //
            [0., 1.], //
        ]);
        let cones = CompositeCone::new(&[SecondOrderConeT(2)]);
        let data = DefaultProblemData::new(&P, &[1., 1.], &A, &[0., 0.], &cones, 1e20);
        let settings = DefaultSettings::<f64>::default();
        let mut work = DefaultWorkspace::new(2, 2);
        work.reset(false, &data, &cones, &settings);
        let mut res = DefaultResiduals::new(2, 2);

        assert!(!polish(&mut work, &data, &cones, &mut res, &settings));
    }
}
