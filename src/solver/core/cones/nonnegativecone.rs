use super::Cone;
use crate::algebra::*;
use core::marker::PhantomData;
use std::iter::zip;

// -------------------------------------
// Nonnegative Cone
// -------------------------------------

/// The nonnegative orthant `ℝⁿ₊`, used for inequality constraints.
pub struct NonnegativeCone<T: FloatT = f64> {
    dim: usize,
    phantom: PhantomData<T>,
}

impl<T> NonnegativeCone<T>
where
    T: FloatT,
{
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            phantom: PhantomData,
        }
    }
}

impl<T> Cone<T> for NonnegativeCone<T>
where
    T: FloatT,
{
    fn dim(&self) -> usize {
        self.dim
    }

    fn numel(&self) -> usize {
        self.dim()
    }

    fn rectify_equilibration(&self, δ: &mut [T], _e: &[T]) -> bool {
        δ.set(T::one());
        false
    }

    fn project(&self, x: &mut [T]) {
        x.scalarop(|v| T::max(v, T::zero()));
    }

    fn project_dual(&self, x: &mut [T]) {
        //self dual
        self.project(x);
    }

    fn rho_scaling(&self) -> T {
        T::one()
    }

    fn is_orthant(&self) -> bool {
        true
    }

    fn allows_polishing(&self) -> bool {
        true
    }

    fn active_set(&self, active: &mut [bool], s: &[T], y: &[T]) {
        // a constraint is taken as active when its dual
        // dominates its slack
        for (a, (&si, &yi)) in zip(active, zip(s, y)) {
            *a = si < yi;
        }
    }
}
