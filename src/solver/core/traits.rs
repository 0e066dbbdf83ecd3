//! Required traits for types providing an embedqp solver implementation.
//!
//! This module defines the core traits that must be implemented by a collection
//! of mutually associated data types to make an ADMM solver for a particular
//! problem format.
//!
//! In nearly all cases there is no need for a user to implement these traits.
//! Instead, users should use the collection of types that are provided
//! in the [Default solver implementation](crate::solver::implementations::default),
//! which collectively implement support for the problem format described in the top
//! level crate documentation.

use super::{cones::Cone, CoreSettings, SettingsError, SolverStatus};
use crate::algebra::*;
use crate::timers::*;

/// Data for a conic optimization problem.

pub trait ProblemData<T: FloatT> {
    type C: Cone<T>;
    type SE: Settings<T>;

    /// Equilibrate internal data before solver starts.
    fn equilibrate(&mut self, cones: &Self::C, settings: &Self::SE);
}

/// Iterates and scratch memory for the ADMM iteration.
///
/// A workspace is sized once when the solver is created and is reset,
/// never reallocated, between solves.

pub trait Workspace<T: FloatT> {
    type D: ProblemData<T>;
    type R: Residuals<T>;
    type C: Cone<T>;
    type SE: Settings<T>;

    /// Fixed problem dimensions `(n, m)` of the iterates.
    fn dimensions(&self) -> (usize, usize);

    /// Reinitialize the iterates before a solve.  A cold reset zeros
    /// all iterates and restores the initial step size.  A warm reset
    /// keeps the current primal and dual iterates.
    fn reset(&mut self, warm: bool, data: &Self::D, cones: &Self::C, settings: &Self::SE);

    /// Copy the current iterate into the previous iterate.
    fn save_prev(&mut self);

    /// Compute the KKT right hand side for the next ADMM step.
    fn admm_rhs(&mut self, data: &Self::D, settings: &Self::SE);

    /// Complete an ADMM step from the solution of the KKT system.
    fn admm_update(&mut self, data: &Self::D, cones: &Self::C, settings: &Self::SE);

    /// Rebalance the step size using the most recent residuals.   Returns
    /// `true` if the step size changed, in which case the KKT system
    /// must be updated before the next step.
    fn adapt_rho(&mut self, residuals: &Self::R, cones: &Self::C, settings: &Self::SE) -> bool;

    /// Attempt to refine a converged iterate by solving a reduced
    /// system on the active constraints.   Returns `true` if the
    /// refined iterate was accepted, in which case `residuals`
    /// describe the refined iterate.
    fn polish(
        &mut self,
        data: &Self::D,
        cones: &Self::C,
        residuals: &mut Self::R,
        settings: &Self::SE,
    ) -> bool;
}

/// Residuals for a conic optimization problem.

pub trait Residuals<T: FloatT> {
    type D: ProblemData<T>;
    type W: Workspace<T>;
    type C: Cone<T>;
    type SE: Settings<T>;

    /// Compute residuals and infeasibility certificates
    /// for the current iterate.
    fn update(&mut self, workspace: &Self::W, data: &Self::D, cones: &Self::C, settings: &Self::SE);
}

/// KKT linear solver object.

pub trait KKTSystem<T: FloatT> {
    type D: ProblemData<T>;
    type W: Workspace<T>;
    type SE: Settings<T>;

    /// Update the KKT system.   Any matrix data or step sizes that
    /// have changed since the last update are written into the KKT
    /// matrix and the matrix is refactored.

    fn update(&mut self, data: &Self::D, workspace: &Self::W, settings: &Self::SE) -> bool;

    /// Solve the KKT system in place for the right hand side held
    /// by the workspace.

    fn solve(&mut self, workspace: &mut Self::W) -> bool;
}

/// Printing functions for the solver's Info

pub trait InfoPrint<T>
where
    T: FloatT,
{
    type D: ProblemData<T>;
    type C: Cone<T>;
    type SE: Settings<T>;

    /// Print the solver configuration, e.g. settings etc.
    /// This function is called once at the start of the solve.
    fn print_configuration(
        &mut self,
        settings: &Self::SE,
        data: &Self::D,
        cones: &Self::C,
    ) -> std::io::Result<()>;

    /// Print a header to appear at the top of progress information.
    fn print_status_header(&mut self, settings: &Self::SE) -> std::io::Result<()>;

    /// Print solver progress information.   Called once per iteration.
    fn print_status(&mut self, settings: &Self::SE) -> std::io::Result<()>;

    /// Print solver final status and other exit information.   Called at
    /// solver termination.
    fn print_footer(&mut self, settings: &Self::SE) -> std::io::Result<()>;
}

/// Internal information for the solver to monitor progress and check for termination.

pub trait Info<T>: InfoPrint<T>
where
    T: FloatT,
{
    type W: Workspace<T>;
    type R: Residuals<T>;

    /// Reset internal data, particularly solve timers.
    fn reset(&mut self, timers: &mut Timers);

    /// Compute final values before solver termination
    fn finalize(&mut self, settings: &Self::SE, timers: &mut Timers);

    /// Update solver progress information
    fn update(
        &mut self,
        data: &Self::D,
        workspace: &Self::W,
        residuals: &Self::R,
        iter: u32,
        timers: &Timers,
    );

    /// Return `true` if termination conditions have been reached.
    fn check_termination(&mut self, residuals: &Self::R, settings: &Self::SE, iter: u32) -> bool;

    /// Record whether the solution was refined by polishing.
    fn set_polished(&mut self, polished: bool);

    /// Report or update termination status
    fn get_status(&self) -> SolverStatus;
    fn set_status(&mut self, status: SolverStatus);
}

/// Solution for a conic optimization problem.

pub trait Solution<T: FloatT> {
    type D: ProblemData<T>;
    type W: Workspace<T>;
    type R: Residuals<T>;
    type I: Info<T>;

    /// Compute solution from the workspace iterates at solver termination
    fn finalize(&mut self, data: &Self::D, workspace: &Self::W, residuals: &Self::R, info: &Self::I);
}

/// Settings for a conic optimization problem.
///
/// Implementors of this trait can define any internal or problem
/// specific settings they wish.   They must, however, also maintain
/// a settings object of type [`CoreSettings`](crate::solver::core::CoreSettings)
/// and return this to the solver internally.

pub trait Settings<T: FloatT> {
    /// Return the core settings.
    fn core(&self) -> &CoreSettings<T>;

    /// Return the core settings (mutably).
    fn core_mut(&mut self) -> &mut CoreSettings<T>;

    /// Check that the settings hold legal values.
    fn validate(&self) -> Result<(), SettingsError>;

    /// Check that the settings are legal as a replacement for
    /// `prev` in a solver that has already been initialized.
    fn validate_as_update(&self, prev: &Self) -> Result<(), SettingsError>;
}
