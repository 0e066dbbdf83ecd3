//! embedqp solver main module.
//!
//! This module contains the main types and traits for the embedqp solver.
//!
//! The solver comes with a [default implementation](crate::solver::implementations::default)
//! of all required traits.   This produces a solver that solves problems in the standard format
//! described in the top level [API page](crate), and is the appropriate choice for nearly all users.
//!
//! It is also possible to implement a custom solver by defining a collection
//! of custom types that together implement all of the required core
//! [traits](crate::solver::core::traits) for
//! objects in the core ADMM solver.

// internal module structure
pub(crate) mod core;
pub mod implementations;

//Here we expose only part of the solver internals
//and rearrange public modules a bit to give a more
//user friendly API

//allows declaration of cone constraints
pub use crate::solver::core::cones::{SupportedConeT, SupportedConeT::*};

//user facing traits required to interact with solver
pub use crate::solver::core::{ADMMSolver, SolverStatus};

#[cfg(feature = "serde")]
pub use crate::solver::core::SolverJSONReadWrite;

//user facing traits required to define new implementations
pub use crate::solver::core::traits;
pub use crate::solver::core::{CoreSettings, SettingsError};

//Since we only have the default implementation, it
//is exposed at the top level as well
pub use crate::solver::implementations::default;
pub use crate::solver::implementations::default::*;
