use super::*;
use crate::algebra::*;
use crate::io::PrintTarget;
use crate::solver::core::{traits::Info, SolverStatus};
use crate::timers::*;

/// Standard-form solver type implementing the [`Info`](crate::solver::core::traits::Info) and [`InfoPrint`](crate::solver::core::traits::InfoPrint) traits

#[derive(Default, Debug)]
pub struct DefaultInfo<T> {
    pub iterations: u32,
    pub cost_primal: T,
    pub res_primal: T,
    pub res_dual: T,
    /// convergence thresholds for the residuals at the current iterate
    pub tol_primal: T,
    pub tol_dual: T,
    pub rho: T,
    pub polished: bool,
    pub solve_time: f64,
    pub status: SolverStatus,

    // target stream for printed output
    pub(crate) stream: PrintTarget,
}

impl<T> DefaultInfo<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> Info<T> for DefaultInfo<T>
where
    T: FloatT,
{
    type W = DefaultWorkspace<T>;
    type R = DefaultResiduals<T>;

    fn reset(&mut self, timers: &mut Timers) {
        self.status = SolverStatus::Unsolved;
        self.iterations = 0;
        self.solve_time = 0f64;
        self.polished = false;

        timers.reset_timer("solve");
    }

    fn finalize(&mut self, _settings: &DefaultSettings<T>, timers: &mut Timers) {
        self.solve_time = timers.total_time().as_secs_f64();
    }

    fn update(
        &mut self,
        data: &DefaultProblemData<T>,
        workspace: &DefaultWorkspace<T>,
        residuals: &DefaultResiduals<T>,
        iter: u32,
        timers: &Timers,
    ) {
        // inner products are invariant w.r.t. equilibration,
        // apart from the overall objective scaling c
        let cinv = T::recip(data.equilibration.c);
        let half: T = (0.5).as_T();

        self.iterations = iter;
        self.cost_primal = (half * residuals.dot_xPx + residuals.dot_qx) * cinv;
        self.res_primal = residuals.rp;
        self.res_dual = residuals.rd;
        self.rho = workspace.rho;

        // solve time so far
        self.solve_time = timers.elapsed(&["solve"]).as_secs_f64();
    }

    fn check_termination(
        &mut self,
        residuals: &DefaultResiduals<T>,
        settings: &DefaultSettings<T>,
        iter: u32,
    ) -> bool {
        self.tol_primal = settings.eps_abs + settings.eps_rel * residuals.prim_scale;
        self.tol_dual = settings.eps_abs + settings.eps_rel * residuals.dual_scale;

        // the starting iterate is never accepted as a
        // solution or as a certificate
        if iter > 0 {
            if residuals.rp <= self.tol_primal && residuals.rd <= self.tol_dual {
                self.status = SolverStatus::Solved;
            } else if residuals.is_primal_infeasible {
                self.status = SolverStatus::PrimalInfeasible;
            } else if residuals.is_dual_infeasible {
                self.status = SolverStatus::DualInfeasible;
            }
        }

        // time or iteration limits
        if self.status == SolverStatus::Iterating {
            if iter >= settings.max_iter {
                self.status = SolverStatus::MaxIterations;
            } else if self.solve_time > settings.time_limit {
                self.status = SolverStatus::MaxTime;
            }
        }

        self.status != SolverStatus::Iterating
    }

    fn set_polished(&mut self, polished: bool) {
        self.polished = polished;
    }

    fn get_status(&self) -> SolverStatus {
        self.status
    }

    fn set_status(&mut self, status: SolverStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residuals(rp: f64, rd: f64) -> DefaultResiduals<f64> {
        let mut r = DefaultResiduals::new(1, 1);
        r.rp = rp;
        r.rd = rd;
        r.prim_scale = 1.;
        r.dual_scale = 1.;
        r
    }

    #[test]
    fn test_check_termination() {
        let settings = DefaultSettingsBuilder::<f64>::default()
            .max_iter(10)
            .build()
            .unwrap();

        let mut info = DefaultInfo::<f64>::new();
        info.set_status(SolverStatus::Iterating);

        // converged residuals are not accepted at the starting iterate
        assert!(!info.check_termination(&residuals(0., 0.), &settings, 0));
        assert!(info.check_termination(&residuals(1e-7, 1e-7), &settings, 1));
        assert_eq!(info.get_status(), SolverStatus::Solved);
        assert_eq!(info.tol_primal, 1e-6 + 1e-6);

        info.set_status(SolverStatus::Iterating);
        assert!(!info.check_termination(&residuals(1., 1.), &settings, 9));
        assert!(info.check_termination(&residuals(1., 1.), &settings, 10));
        assert_eq!(info.get_status(), SolverStatus::MaxIterations);

        // certificates come after the convergence check
        info.set_status(SolverStatus::Iterating);
        let mut r = residuals(1., 1.);
        r.is_dual_infeasible = true;
        assert!(info.check_termination(&r, &settings, 3));
        assert_eq!(info.get_status(), SolverStatus::DualInfeasible);
    }

    #[test]
    fn test_time_limit() {
        let settings = DefaultSettingsBuilder::<f64>::default()
            .time_limit(0.)
            .build()
            .unwrap();

        let mut info = DefaultInfo::<f64>::new();
        info.set_status(SolverStatus::Iterating);
        info.solve_time = 1e-3;
        assert!(info.check_termination(&residuals(1., 1.), &settings, 1));
        assert_eq!(info.get_status(), SolverStatus::MaxTime);
    }
}
