//! Linear algebra used by the solver.
//!
//! Provides sparse matrices in compressed sparse column format, vector
//! operations on slices of floats and the generic [`FloatT`] numeric type.

// first import float types and associated traits
mod floats;
pub use floats::*;
mod math_traits;
pub use math_traits::*;
mod matrix_types;
pub use matrix_types::*;
mod matrix_traits;
pub use matrix_traits::*;
mod error_types;
pub use error_types::*;

// sparse CSC matrices and native implementations
mod csc;
pub use csc::*;
mod scalarmath;
mod vecmath;
