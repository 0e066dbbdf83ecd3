#![allow(non_snake_case)]

use crate::algebra::FloatT;
use enum_dispatch::*;

//primitive cone types
mod nonnegativecone;
mod socone;
mod zerocone;

//the supported cone wrapper type for primitives
//and the composite cone
mod compositecone;
mod supportedcone;

//flatten all cone implementations to appear in this module
pub use compositecone::*;
pub use nonnegativecone::*;
pub use socone::*;
pub use supportedcone::*;
pub use zerocone::*;

/// Operations required of every cone in the constraint set `K`.
///
/// All vector arguments are the slice of a larger vector belonging
/// to this cone, and have length `numel()`.
#[enum_dispatch]
pub trait Cone<T>
where
    T: FloatT,
{
    // functions relating to basic sizing
    fn dim(&self) -> usize;
    fn numel(&self) -> usize;

    /// Converts an elementwise scaling `e` into one that preserves cone
    /// membership.  Writes a multiplicative correction into `δ` and
    /// returns `true` if any entry differs from one.
    fn rectify_equilibration(&self, δ: &mut [T], e: &[T]) -> bool;

    /// Euclidean projection onto the cone, in place.
    fn project(&self, x: &mut [T]);

    /// Euclidean projection onto the dual cone, in place.
    fn project_dual(&self, x: &mut [T]);

    /// Multiplier applied to the ADMM step size on rows of this cone.
    fn rho_scaling(&self) -> T;

    /// True if each row is an independent scalar constraint `sᵢ ≥ 0`, so
    /// that a row with an infinite bound is inactive.
    fn is_orthant(&self) -> bool;

    /// True if the cone supports active set solution polishing.
    fn allows_polishing(&self) -> bool;

    /// Mark constraints active at the slack `s` and dual `y`.
    fn active_set(&self, active: &mut [bool], s: &[T], y: &[T]);
}
