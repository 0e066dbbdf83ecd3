#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::{
    cones::{CompositeCone, Cone},
    traits::Residuals,
};
use itertools::izip;

// ---------------
// Residuals type for default problem format
// ---------------

/// Standard-form solver type implementing the [`Residuals`](crate::solver::core::traits::Residuals) trait
///
/// Residual norms are infinity norms in the unscaled problem.

#[derive(Debug, Clone)]
pub struct DefaultResiduals<T> {
    /// primal residual ‖Ax - z‖
    pub rp: T,
    /// dual residual ‖Px + q + A'y‖
    pub rd: T,
    /// max(‖Ax‖, ‖z‖)
    pub prim_scale: T,
    /// max(‖Px‖, ‖A'y‖, ‖q‖)
    pub dual_scale: T,

    // inner products in scaled coordinates
    pub dot_qx: T,
    pub dot_xPx: T,

    /// the most recent change in y certifies primal infeasibility
    pub is_primal_infeasible: bool,
    /// the most recent change in x certifies dual infeasibility
    pub is_dual_infeasible: bool,

    // products of the data with the current iterate
    pub(crate) Ax: Vec<T>,
    pub(crate) Px: Vec<T>,
    pub(crate) Aty: Vec<T>,

    // most recent iterate changes, i.e. the candidate certificates
    pub(crate) dx: Vec<T>,
    pub(crate) dy: Vec<T>,

    work_n: Vec<T>,
    work_m: Vec<T>,
    work_m2: Vec<T>,
}

impl<T> DefaultResiduals<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            rp: T::nan(),
            rd: T::nan(),
            prim_scale: T::zero(),
            dual_scale: T::zero(),
            dot_qx: T::zero(),
            dot_xPx: T::zero(),
            is_primal_infeasible: false,
            is_dual_infeasible: false,
            Ax: vec![T::zero(); m],
            Px: vec![T::zero(); n],
            Aty: vec![T::zero(); n],
            dx: vec![T::zero(); n],
            dy: vec![T::zero(); m],
            work_n: vec![T::zero(); n],
            work_m: vec![T::zero(); m],
            work_m2: vec![T::zero(); m],
        }
    }

    // Checks whether dy = y - y_prev, projected onto the dual cone, is
    // a certificate of primal infeasibility:
    //   ‖A'dy‖ ≤ ϵ‖dy‖  and  b'dy < -ϵ‖dy‖
    fn check_primal_infeasibility(
        &mut self,
        workspace: &DefaultWorkspace<T>,
        data: &DefaultProblemData<T>,
        cones: &CompositeCone<T>,
        ϵ: T,
    ) -> bool {
        let equil = &data.equilibration;
        let dy = &mut self.dy;

        dy.waxpby(T::one(), &workspace.y, -T::one(), &workspace.y_prev);
        cones.project_dual(dy);

        // infinite bounds can not support a certificate
        for (dyi, &unbounded) in dy.iter_mut().zip(&data.unbounded) {
            if unbounded {
                *dyi = T::zero();
            }
        }

        let norm_dy = dy.norm_inf_scaled(&equil.e);
        if norm_dy <= (CERTIFICATE_MIN_NORM).as_T() {
            return false;
        }

        data.A.t().gemv(&mut self.work_n, dy, T::one(), T::zero());
        let norm_Atdy = self.work_n.norm_inf_scaled(&equil.dinv);

        norm_Atdy <= ϵ * norm_dy && data.b.dot(dy) < -ϵ * norm_dy
    }

    // Checks whether dx = x - x_prev is a certificate of dual infeasibility:
    //   ‖Pdx‖ ≤ ϵ‖dx‖,  q'dx < -ϵ‖dx‖  and  dist(-Adx, K) ≤ ϵ‖dx‖
    fn check_dual_infeasibility(
        &mut self,
        workspace: &DefaultWorkspace<T>,
        data: &DefaultProblemData<T>,
        cones: &CompositeCone<T>,
        ϵ: T,
    ) -> bool {
        let equil = &data.equilibration;
        let dx = &mut self.dx;

        dx.waxpby(T::one(), &workspace.x, -T::one(), &workspace.x_prev);

        let norm_dx = dx.norm_inf_scaled(&equil.d);
        if norm_dx <= (CERTIFICATE_MIN_NORM).as_T() {
            return false;
        }

        // P and q carry the cost scaling c
        let ϵc = ϵ * equil.c;

        if data.q.dot(dx) >= -ϵc * norm_dx {
            return false;
        }

        data.P
            .sym()
            .symv(&mut self.work_n, dx, T::one(), T::zero());
        if self.work_n.norm_inf_scaled(&equil.dinv) > ϵc * norm_dx {
            return false;
        }

        // v = -Adx in unscaled coordinates and its projection onto K
        let (v, pv) = (&mut self.work_m, &mut self.work_m2);
        data.A.gemv(v, dx, -T::one(), T::zero());
        v.hadamard(&equil.einv);
        pv.copy_from(v);
        cones.project(pv);

        let mut dist = T::zero();
        for (&vi, &pvi, &unbounded) in izip!(v.iter(), pv.iter(), &data.unbounded) {
            if !unbounded {
                dist = T::max(dist, T::abs(vi - pvi));
            }
        }

        dist <= ϵ * norm_dx
    }
}

// changes smaller than this are treated as no change at all
const CERTIFICATE_MIN_NORM: f64 = 1e-20;

impl<T> Residuals<T> for DefaultResiduals<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type W = DefaultWorkspace<T>;
    type C = CompositeCone<T>;
    type SE = DefaultSettings<T>;

    fn update(
        &mut self,
        workspace: &DefaultWorkspace<T>,
        data: &DefaultProblemData<T>,
        cones: &CompositeCone<T>,
        settings: &DefaultSettings<T>,
    ) {
        let equil = &data.equilibration;
        let (dinv, einv) = (&equil.dinv, &equil.einv);
        let cinv = T::recip(equil.c);
        let (x, z, y) = (&workspace.x, &workspace.z, &workspace.y);

        // primal residual
        data.A.gemv(&mut self.Ax, x, T::one(), T::zero());
        self.work_m
            .waxpby(T::one(), &self.Ax, -T::one(), z);

        self.rp = self.work_m.norm_inf_scaled(einv);
        self.prim_scale = T::max(self.Ax.norm_inf_scaled(einv), z.norm_inf_scaled(einv));

        // dual residual
        data.P.sym().symv(&mut self.Px, x, T::one(), T::zero());
        data.A.t().gemv(&mut self.Aty, y, T::one(), T::zero());

        for (r, &px, &q, &aty) in izip!(self.work_n.iter_mut(), &self.Px, &data.q, &self.Aty) {
            *r = px + q + aty;
        }

        self.rd = self.work_n.norm_inf_scaled(dinv) * cinv;
        self.dual_scale = cinv
            * T::max(
                self.Px.norm_inf_scaled(dinv),
                self.Aty.norm_inf_scaled(dinv),
            );
        self.dual_scale = T::max(self.dual_scale, data.normq);

        self.dot_xPx = x.dot(&self.Px);
        self.dot_qx = x.dot(&data.q);

        // infeasibility certificates
        self.is_primal_infeasible =
            self.check_primal_infeasibility(workspace, data, cones, settings.eps_prim_inf);
        self.is_dual_infeasible =
            self.check_dual_infeasibility(workspace, data, cones, settings.eps_dual_inf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::cones::SupportedConeT::*;
    use crate::solver::core::traits::Workspace;

    #[test]
    fn test_residuals_unscaled() {
        let P = CscMatrix::from(&[
            [2., 0.], //
            [0., 0.], //
        ]);
        let A = CscMatrix::from(&[
            [1., 1.], //
            [1., 0.], //
        ]);
        let cones = CompositeCone::new(&[ZeroConeT(1), NonnegativeConeT(1)]);
        let data = DefaultProblemData::new(&P, &[1., -1.], &A, &[1., 2.], &cones, 1e20);
        let settings = DefaultSettings::<f64>::default();

        let mut work = DefaultWorkspace::new(2, 2);
        work.x.copy_from_slice(&[1., 2.]);
        work.z.copy_from_slice(&[1., 0.]);
        work.y.copy_from_slice(&[0.5, 0.]);
        work.save_prev();

        let mut res = DefaultResiduals::new(2, 2);
        res.update(&work, &data, &cones, &settings);

        // Ax = [3, 1], Px + q + A'y = [3.5, -0.5]
        assert_eq!(res.rp, 2.);
        assert_eq!(res.prim_scale, 3.);
        assert_eq!(res.rd, 3.5);
        assert_eq!(res.dual_scale, 2.);
        assert_eq!(res.dot_xPx, 2.);
        assert!(!res.is_primal_infeasible);
        assert!(!res.is_dual_infeasible);
    }

    #[test]
    fn test_primal_infeasibility_certificate() {
        // x ≥ 1 and x ≤ 0, i.e. -x + s = -1 and x + s = 0
        let P = CscMatrix::<f64>::zeros((1, 1));
        let A = CscMatrix::from(&[[-1.], [1.]]);
        let cones = CompositeCone::new(&[NonnegativeConeT(2)]);
        let data = DefaultProblemData::new(&P, &[0.], &A, &[-1., 0.], &cones, 1e20);
        let settings = DefaultSettings::<f64>::default();

        let mut work = DefaultWorkspace::new(1, 2);
        work.save_prev();
        work.y.copy_from_slice(&[1., 1.]);

        let mut res = DefaultResiduals::new(1, 2);
        res.update(&work, &data, &cones, &settings);
        assert!(res.is_primal_infeasible);
        assert!(!res.is_dual_infeasible);
    }

    #[test]
    fn test_dual_infeasibility_certificate() {
        // minimize -x subject to x ≥ 0
        let P = CscMatrix::<f64>::zeros((1, 1));
        let A = CscMatrix::from(&[[-1.]]);
        let cones = CompositeCone::new(&[NonnegativeConeT(1)]);
        let data = DefaultProblemData::new(&P, &[-1.], &A, &[0.], &cones, 1e20);
        let settings = DefaultSettings::<f64>::default();

        let mut work = DefaultWorkspace::new(1, 1);
        work.save_prev();
        work.x[0] = 10.;

        let mut res = DefaultResiduals::new(1, 1);
        res.update(&work, &data, &cones, &settings);
        assert!(res.is_dual_infeasible);

        // the opposite direction leaves the feasible set
        work.x[0] = -10.;
        res.update(&work, &data, &cones, &settings);
        assert!(!res.is_dual_infeasible);
    }
}
