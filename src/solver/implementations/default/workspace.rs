use super::*;
use crate::algebra::*;
use crate::solver::core::{
    cones::{CompositeCone, Cone},
    traits::Workspace,
};
use itertools::izip;

// ---------------
// workspace for the default problem format
// ---------------

/// Standard-form solver type implementing the [`Workspace`](crate::solver::core::traits::Workspace) trait
///
/// Iterates are held in the equilibrated coordinates of the problem data.

#[derive(Debug, Clone)]
pub struct DefaultWorkspace<T> {
    /// primal iterate
    pub x: Vec<T>,
    /// constraint iterate, `Ax` projected onto `b - K`
    pub z: Vec<T>,
    /// dual iterate
    pub y: Vec<T>,

    // iterates from the previous step
    pub(crate) x_prev: Vec<T>,
    pub(crate) z_prev: Vec<T>,
    pub(crate) y_prev: Vec<T>,

    // KKT right hand side, overwritten by the solution
    pub(crate) kkt_rhs: Vec<T>,

    // relaxed constraint iterate
    pub(crate) zr: Vec<T>,
    pub(crate) work_m: Vec<T>,

    /// current scalar step size
    pub rho: T,
    pub(crate) rho_vec: Vec<T>,
    pub(crate) rho_inv_vec: Vec<T>,
    // step size setting at the last reset
    rho_init: T,
    // bumped on every change to rho_vec
    pub(crate) rho_epoch: u64,

    // a user supplied start is pending
    has_user_start: bool,
}

impl<T> DefaultWorkspace<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            z: vec![T::zero(); m],
            y: vec![T::zero(); m],
            x_prev: vec![T::zero(); n],
            z_prev: vec![T::zero(); m],
            y_prev: vec![T::zero(); m],
            kkt_rhs: vec![T::zero(); n + m],
            zr: vec![T::zero(); m],
            work_m: vec![T::zero(); m],
            rho: T::nan(),
            rho_vec: vec![T::zero(); m],
            rho_inv_vec: vec![T::zero(); m],
            rho_init: T::nan(),
            rho_epoch: 0,
            has_user_start: false,
        }
    }

    /// Installs a starting point in equilibrated coordinates, to be
    /// used by the next solve in place of a cold start.
    pub(crate) fn set_start(&mut self, x: &[T], y: &[T]) {
        self.x.copy_from(x);
        self.y.copy_from(y);
        self.has_user_start = true;
    }

    pub(crate) fn set_rho(&mut self, rho: T, cones: &CompositeCone<T>) {
        self.rho = rho;
        cones.rho_vector(&mut self.rho_vec, rho);
        self.rho_inv_vec.scalarop_from(T::recip, &self.rho_vec);
        self.rho_epoch += 1;
    }

    pub(crate) fn slack(&self, data: &DefaultProblemData<T>, s: &mut [T]) {
        s.waxpby(T::one(), &data.b, -T::one(), &self.z);
    }
}

/// Euclidean projection of `v` onto `C = b - K`, in place.  Rows with
/// an infinite bound are unconstrained.
pub(crate) fn project_constraints<T: FloatT>(
    v: &mut [T],
    work: &mut [T],
    data: &DefaultProblemData<T>,
    cones: &CompositeCone<T>,
) {
    // v ← b - Π_K(b - v)
    work.waxpby(T::one(), &data.b, -T::one(), v);
    cones.project(work);

    for (vi, &wi, &bi, &unbounded) in izip!(v.iter_mut(), work.iter(), &data.b, &data.unbounded) {
        if !unbounded {
            *vi = bi - wi;
        }
    }
}

impl<T> Workspace<T> for DefaultWorkspace<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type R = DefaultResiduals<T>;
    type C = CompositeCone<T>;
    type SE = DefaultSettings<T>;

    fn dimensions(&self) -> (usize, usize) {
        (self.x.len(), self.z.len())
    }

    fn reset(
        &mut self,
        warm: bool,
        data: &DefaultProblemData<T>,
        cones: &CompositeCone<T>,
        settings: &DefaultSettings<T>,
    ) {
        let warm = warm || self.has_user_start;
        self.has_user_start = false;

        if warm {
            // keep x and y, with z consistent with x
            data.A.gemv(&mut self.z, &self.x, T::one(), T::zero());
            project_constraints(&mut self.z, &mut self.work_m, data, cones);

            if settings.rho != self.rho_init {
                self.rho_init = settings.rho;
                self.set_rho(settings.rho, cones);
            }
        } else {
            self.x.set(T::zero());
            self.z.set(T::zero());
            self.y.set(T::zero());
            self.rho_init = settings.rho;
            self.set_rho(settings.rho, cones);
        }

        self.save_prev();
    }

    fn save_prev(&mut self) {
        self.x_prev.copy_from(&self.x);
        self.z_prev.copy_from(&self.z);
        self.y_prev.copy_from(&self.y);
    }

    fn admm_rhs(&mut self, data: &DefaultProblemData<T>, settings: &DefaultSettings<T>) {
        let (rhs_x, rhs_z) = self.kkt_rhs.split_at_mut(data.n);

        // σx - q
        rhs_x.waxpby(settings.sigma, &self.x, -T::one(), &data.q);

        // z - y/ρ
        for (r, &z, &y, &ρinv) in izip!(rhs_z.iter_mut(), &self.z, &self.y, &self.rho_inv_vec) {
            *r = z - y * ρinv;
        }
    }

    fn admm_update(
        &mut self,
        data: &DefaultProblemData<T>,
        cones: &CompositeCone<T>,
        settings: &DefaultSettings<T>,
    ) {
        let α = settings.alpha;
        let (xt, ν) = self.kkt_rhs.split_at(data.n);

        // relaxed primal step
        self.x.waxpby(α, xt, T::one() - α, &self.x_prev);

        // relaxed constraint step, zr = αz̃ + (1-α)z with z̃ = z + (ν - y)/ρ
        for (zr, &z, &νi, &y, &ρinv) in izip!(
            self.zr.iter_mut(),
            &self.z_prev,
            ν,
            &self.y_prev,
            &self.rho_inv_vec
        ) {
            let zt = z + (νi - y) * ρinv;
            *zr = α * zt + (T::one() - α) * z;
        }

        // z ← Π(zr + y/ρ)
        for (z, &zr, &y, &ρinv) in izip!(self.z.iter_mut(), &self.zr, &self.y_prev, &self.rho_inv_vec)
        {
            *z = zr + y * ρinv;
        }
        project_constraints(&mut self.z, &mut self.work_m, data, cones);

        // y ← y + ρ(zr - z)
        for (y, &zr, &z, &ρ) in izip!(self.y.iter_mut(), &self.zr, &self.z, &self.rho_vec) {
            *y += ρ * (zr - z);
        }
    }

    fn adapt_rho(
        &mut self,
        residuals: &DefaultResiduals<T>,
        cones: &CompositeCone<T>,
        settings: &DefaultSettings<T>,
    ) -> bool {
        let tiny: T = (1e-10).as_T();

        let prim = residuals.rp / (residuals.prim_scale + tiny);
        let dual = residuals.rd / (residuals.dual_scale + tiny);
        let ratio = T::sqrt(prim / (dual + tiny));

        let rho_new = (self.rho * ratio).clip(
            (RHO_MIN).as_T(),
            (RHO_MAX).as_T(),
            (RHO_MIN).as_T(),
            (RHO_MAX).as_T(),
        );

        if !rho_new.is_finite() {
            return false;
        }

        let tol = settings.adaptive_rho_tolerance;
        if rho_new > self.rho * tol || rho_new < self.rho / tol {
            self.set_rho(rho_new, cones);
            return true;
        }
        false
    }

    fn polish(
        &mut self,
        data: &DefaultProblemData<T>,
        cones: &CompositeCone<T>,
        residuals: &mut DefaultResiduals<T>,
        settings: &DefaultSettings<T>,
    ) -> bool {
        polish::polish(self, data, cones, residuals, settings)
    }
}

const RHO_MIN: f64 = 1e-6;
const RHO_MAX: f64 = 1e6;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::cones::SupportedConeT::*;

    #[test]
    fn test_project_constraints() {
        let P = CscMatrix::<f64>::zeros((1, 1));
        let A = CscMatrix::from(&[[1.], [1.], [1.]]);
        let cones = CompositeCone::new(&[ZeroConeT(1), NonnegativeConeT(2)]);
        let data = DefaultProblemData::new(&P, &[0.], &A, &[2., 1., 1e25], &cones, 1e20);

        let mut v = vec![5., 5., 5.];
        let mut work = vec![0.; 3];
        project_constraints(&mut v, &mut work, &data, &cones);

        // equality row pinned, inequality row capped, unbounded row free
        assert_eq!(v, vec![2., 1., 5.]);
    }

    #[test]
    fn test_reset_and_rho() {
        let P = CscMatrix::<f64>::identity(1);
        let A = CscMatrix::from(&[[1.], [1.]]);
        let cones = CompositeCone::new(&[ZeroConeT(1), NonnegativeConeT(1)]);
        let data = DefaultProblemData::new(&P, &[0.], &A, &[2., 1.], &cones, 1e20);
        let settings = DefaultSettings::<f64>::default();

        let mut work = DefaultWorkspace::<f64>::new(1, 2);
        assert_eq!(work.dimensions(), (1, 2));

        work.reset(false, &data, &cones, &settings);
        assert_eq!(work.rho_vec, vec![100., 0.1]);
        assert_eq!(work.rho_epoch, 1);

        // warm reset keeps x and recomputes z, leaving rho alone
        work.x[0] = 3.;
        work.reset(true, &data, &cones, &settings);
        assert_eq!(work.z, vec![2., 1.]);
        assert_eq!(work.rho_epoch, 1);

        // cold reset zeros everything
        work.reset(false, &data, &cones, &settings);
        assert_eq!(work.x, vec![0.]);
        assert_eq!(work.rho_epoch, 2);
    }
}
