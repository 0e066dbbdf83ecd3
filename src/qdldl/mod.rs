//! Sparse $LDL^T$ factorization of quasidefinite matrices.
//!
//! Used internally to solve the linear systems arising at every
//! iteration of the solver.

#[allow(clippy::module_inception)]
mod qdldl;
pub use self::qdldl::*;
