use super::Cone;
use crate::algebra::*;
use core::marker::PhantomData;

// -------------------------------------
// Zero Cone
// -------------------------------------

/// The cone `{0}ⁿ`, used for equality constraints.
pub struct ZeroCone<T: FloatT = f64> {
    dim: usize,
    phantom: PhantomData<T>,
}

impl<T> ZeroCone<T>
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

impl<T> Cone<T> for ZeroCone<T>
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
        x.set(T::zero());
    }

    fn project_dual(&self, _x: &mut [T]) {
        // dual cone is the whole space
    }

    fn rho_scaling(&self) -> T {
        (1e3).as_T()
    }

    fn is_orthant(&self) -> bool {
        false
    }

    fn allows_polishing(&self) -> bool {
        true
    }

    fn active_set(&self, active: &mut [bool], _s: &[T], _y: &[T]) {
        active.fill(true);
    }
}
