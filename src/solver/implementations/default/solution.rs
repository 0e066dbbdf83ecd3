use super::*;
use crate::{
    algebra::*,
    solver::core::{traits::Solution, SolverStatus},
};

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Standard-form solver type implementing the [`Solution`](crate::solver::core::traits::Solution) trait
///
/// All values are in the coordinates of the problem as posed.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct DefaultSolution<T> {
    /// primal solution, or a certificate of dual infeasibility
    pub x: Vec<T>,
    /// dual solution (in dual cone), or a certificate of primal infeasibility
    pub z: Vec<T>,
    /// vector of slacks (in primal cone)
    pub s: Vec<T>,
    /// final solver status
    pub status: SolverStatus,
    /// primal objective value
    pub obj_val: T,
    /// solve time in seconds
    pub solve_time: f64,
    /// number of iterations
    pub iterations: u32,
    /// primal residual
    pub r_prim: T,
    /// dual residual
    pub r_dual: T,
    /// the solution was refined by polishing
    pub polished: bool,
}

impl<T> DefaultSolution<T>
where
    T: FloatT,
{
    /// Create a new `DefaultSolution` object
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            z: vec![T::zero(); m],
            s: vec![T::zero(); m],
            status: SolverStatus::Unsolved,
            obj_val: T::nan(),
            solve_time: 0f64,
            iterations: 0,
            r_prim: T::nan(),
            r_dual: T::nan(),
            polished: false,
        }
    }
}

impl<T> Solution<T> for DefaultSolution<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type W = DefaultWorkspace<T>;
    type R = DefaultResiduals<T>;
    type I = DefaultInfo<T>;

    fn finalize(
        &mut self,
        data: &DefaultProblemData<T>,
        workspace: &DefaultWorkspace<T>,
        residuals: &DefaultResiduals<T>,
        info: &DefaultInfo<T>,
    ) {
        self.status = info.status;
        self.iterations = info.iterations;
        self.solve_time = info.solve_time;
        self.r_prim = info.res_primal;
        self.r_dual = info.res_dual;
        self.polished = info.polished;

        let equil = &data.equilibration;

        match info.status {
            SolverStatus::PrimalInfeasible => {
                // normalized dy in unscaled coordinates
                self.z.copy_from(&residuals.dy).hadamard(&equil.e);
                _normalize(&mut self.z);
                self.x.set(T::nan());
                self.s.set(T::nan());
                self.obj_val = T::infinity();
            }
            SolverStatus::DualInfeasible => {
                // normalized dx in unscaled coordinates
                self.x.copy_from(&residuals.dx).hadamard(&equil.d);
                _normalize(&mut self.x);
                self.z.set(T::nan());
                self.s.set(T::nan());
                self.obj_val = T::neg_infinity();
            }
            _ => {
                let cinv = T::recip(equil.c);

                self.x.copy_from(&workspace.x).hadamard(&equil.d);
                self.z
                    .copy_from(&workspace.y)
                    .hadamard(&equil.e)
                    .scale(cinv);
                workspace.slack(data, &mut self.s);
                self.s.hadamard(&equil.einv);
                self.obj_val = info.cost_primal;
            }
        }
    }
}

// scale to unit infinity norm
fn _normalize<T: FloatT>(v: &mut [T]) {
    let norm = v.norm_inf();
    if norm > T::zero() {
        v.scale(T::recip(norm));
    }
}

#[test]
fn test_normalize() {
    let mut v = vec![2., -4., 1.];
    _normalize(&mut v);
    assert_eq!(v, vec![0.5, -1., 0.25]);

    let mut v = vec![0.; 2];
    _normalize(&mut v);
    assert_eq!(v, vec![0.; 2]);
}
