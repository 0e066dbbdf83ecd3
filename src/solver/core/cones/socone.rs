use super::Cone;
use crate::algebra::*;
use core::marker::PhantomData;

// -------------------------------------
// Second Order Cone
// -------------------------------------

/// The second order cone `{(t,x) : ‖x‖ ≤ t}` of dimension `dim`.
pub struct SecondOrderCone<T: FloatT = f64> {
    dim: usize,
    phantom: PhantomData<T>,
}

impl<T> SecondOrderCone<T>
where
    T: FloatT,
{
    pub fn new(dim: usize) -> Self {
        assert!(dim >= 1);
        Self {
            dim,
            phantom: PhantomData,
        }
    }
}

impl<T> Cone<T> for SecondOrderCone<T>
where
    T: FloatT,
{
    fn dim(&self) -> usize {
        self.dim
    }

    fn numel(&self) -> usize {
        self.dim()
    }

    fn rectify_equilibration(&self, δ: &mut [T], e: &[T]) -> bool {
        // replace the block scaling with its mean
        δ.copy_from(e).recip().scale(e.mean());
        true
    }

    fn project(&self, v: &mut [T]) {
        _soc_project(v);
    }

    fn project_dual(&self, v: &mut [T]) {
        //self dual
        _soc_project(v);
    }

    fn rho_scaling(&self) -> T {
        T::one()
    }

    fn is_orthant(&self) -> bool {
        false
    }

    fn allows_polishing(&self) -> bool {
        false
    }

    fn active_set(&self, active: &mut [bool], _s: &[T], _y: &[T]) {
        active.fill(false);
    }
}

// Euclidean projection of v = (t,x) onto the second order cone
fn _soc_project<T: FloatT>(v: &mut [T]) {
    let (t, x) = v.split_at_mut(1);
    let t0 = t[0];
    let normx = x.norm();

    if normx <= t0 {
        // already in the cone
    } else if normx <= -t0 {
        // in the polar cone
        t[0] = T::zero();
        x.set(T::zero());
    } else {
        let a = (normx + t0) / (2.).as_T();
        t[0] = a;
        x.scale(a / normx);
    }
}
