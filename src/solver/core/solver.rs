use super::callbacks::SolverCallbacks;
use super::cones::Cone;
use super::traits::*;
use crate::algebra::*;
use crate::io::ConfigurablePrintTarget;
use crate::timers::*;

// ---------------------------------
// Solver status type
// ---------------------------------

/// Status of solver at termination

#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStatus {
    /// Problem is not solved (solver hasn't run).
    #[default]
    Unsolved,
    /// Solver is running.  Only observable from a callback.
    Iterating,
    /// Solver terminated with a solution.
    Solved,
    /// Problem is primal infeasible.  Solution returned is a certificate of primal infeasibility.
    PrimalInfeasible,
    /// Problem is dual infeasible.  Solution returned is a certificate of dual infeasibility.
    DualInfeasible,
    /// Iteration limit reached before solution or infeasibility certificate found.
    MaxIterations,
    /// Time limit reached before solution or infeasibility certificate found.
    MaxTime,
    /// Solver terminated by a user callback.
    CallbackTerminated,
    /// Solver terminated with a numerical error
    NumericalError,
}

impl SolverStatus {
    /// `true` if the status is an infeasibility certificate.
    pub fn is_infeasible(&self) -> bool {
        matches!(
            *self,
            SolverStatus::PrimalInfeasible | SolverStatus::DualInfeasible
        )
    }

    /// `true` if the solver ran and stopped.
    pub fn is_terminal(&self) -> bool {
        !matches!(*self, SolverStatus::Unsolved | SolverStatus::Iterating)
    }

    pub(crate) fn is_errored(&self) -> bool {
        // status is any of the error codes
        matches!(*self, SolverStatus::NumericalError)
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ---------------------------------
// top level solver container type
// ---------------------------------

// The top-level solver.

// This trait is defined with a collection of mutually interacting associated types.
// See the [`DefaultSolver`](crate::solver::implementations::default) for an example.

pub struct Solver<D, W, R, K, C, I, SO, SE> {
    pub data: D,
    pub workspace: W,
    pub residuals: R,
    pub kktsystem: K,
    pub cones: C,
    pub info: I,
    pub solution: SO,
    pub settings: SE,
    pub timers: Option<Timers>,
    pub(crate) callbacks: SolverCallbacks<I>,
}

// ---------------------------------
// ADMMSolver trait and its standard implementation.
// ---------------------------------

/// An operator splitting (ADMM) solver

// Only the main solver function lives in ADMMSolver, since this is the
// only publicly facing trait we want to give the solver.   Additional
// internal functionality for the top level solver object is implemented
// for the ADMMSolverInternals trait below, upon which ADMMSolver depends

pub trait ADMMSolver<T, D, W, R, K, C, I, SO, SE> {
    /// Run the solver
    fn solve(&mut self);
}

impl<T, D, W, R, K, C, I, SO, SE> ADMMSolver<T, D, W, R, K, C, I, SO, SE>
    for Solver<D, W, R, K, C, I, SO, SE>
where
    T: FloatT,
    D: ProblemData<T, C = C, SE = SE>,
    W: Workspace<T, D = D, R = R, C = C, SE = SE>,
    R: Residuals<T, D = D, W = W, C = C, SE = SE>,
    K: KKTSystem<T, D = D, W = W, SE = SE>,
    C: Cone<T>,
    I: Info<T, D = D, W = W, R = R, C = C, SE = SE>,
    SO: Solution<T, D = D, W = W, R = R, I = I>,
    SE: Settings<T>,
{
    fn solve(&mut self) {
        // various initializations
        let mut iter: u32 = 0;

        //timers is stored as an option so that
        //we can swap it out here and avoid
        //borrow conflicts with other fields.
        let mut timers = self.timers.take().unwrap_or_default();

        // solver release info, solver config
        // problem dimensions, cone types etc
        notimeit! {timers; {
            self.info.print_configuration(&self.settings, &self.data, &self.cones).ok();
            self.info.print_status_header(&self.settings).ok();
        }}

        self.info.reset(&mut timers);

        timeit! {timers => "solve"; {

        // cold or warm start the iterates, then bring the
        // KKT system up to date with the data and step sizes
        timeit!{timers => "setup"; {
            let warm = self.settings.core().warm_start;
            self.workspace.reset(warm, &self.data, &self.cones, &self.settings);
            self.info.set_status(SolverStatus::Iterating);

            let is_kkt_update_success;
            timeit!{timers => "kkt update"; {
                is_kkt_update_success = self.kktsystem.update(&self.data, &self.workspace, &self.settings);
            }}
            if !is_kkt_update_success {
                self.info.set_status(SolverStatus::NumericalError);
            }
        }}

        timeit!{timers => "ADMM iteration"; {

        // ----------
        // main loop
        // ----------

        while !self.info.get_status().is_errored() {

            //update the residuals
            //--------------
            self.residuals.update(&self.workspace, &self.data, &self.cones, &self.settings);

            // convergence check and printing
            // --------------
            self.info.update(&self.data, &self.workspace, &self.residuals, iter, &timers);
            let is_done = self.info.check_termination(&self.residuals, &self.settings, iter);

            notimeit!{timers; {
                self.info.print_status(&self.settings).ok();
            }}

            if is_done {
                break;
            }

            // check for termination by the user
            if self.callbacks.check_termination(&self.info) {
                self.info.set_status(SolverStatus::CallbackTerminated);
                break;
            }

            // rebalance the step size and refactor if it moved
            // --------------
            if !self.adapt_step_size(iter, &mut timers) {
                self.info.set_status(SolverStatus::NumericalError);
                break;
            }

            iter += 1;

            // ADMM step
            // --------------
            self.workspace.save_prev();
            self.workspace.admm_rhs(&self.data, &self.settings);

            let is_kkt_solve_success;
            timeit!{timers => "kkt solve"; {
                is_kkt_solve_success = self.kktsystem.solve(&mut self.workspace);
            }}
            if !is_kkt_solve_success {
                self.info.set_status(SolverStatus::NumericalError);
                break;
            }

            self.workspace.admm_update(&self.data, &self.cones, &self.settings);

        } //end loop
        // ----------
        // ----------

        }} //end "ADMM iteration" timer

        if self.info.get_status() == SolverStatus::Solved && self.settings.core().polish {
            timeit!{timers => "polish"; {
                self.polish(iter, &timers);
            }}
        }

        }} // end "solve" timer

        //store final solution, timing etc
        self.info.finalize(&self.settings, &mut timers);

        self.solution
            .finalize(&self.data, &self.workspace, &self.residuals, &self.info);

        self.info.print_footer(&self.settings).ok();

        //stow the timers back into Option in the solver struct
        self.timers.replace(timers);
    }
}

// Encapsulate the internal helpers trait in a private module
// so it doesn't get exported
mod internal {
    use super::super::cones::Cone;
    use super::super::traits::*;
    use super::*;

    pub(super) trait ADMMSolverInternals<T, D, W, R, K, C, I, SO, SE> {
        /// Rebalance ρ on the adaptation interval.   Returns false only
        /// if a refactorization was needed and failed
        fn adapt_step_size(&mut self, iter: u32, timers: &mut Timers) -> bool;

        /// Refine a converged solution on its active set
        fn polish(&mut self, iter: u32, timers: &Timers);
    }

    impl<T, D, W, R, K, C, I, SO, SE> ADMMSolverInternals<T, D, W, R, K, C, I, SO, SE>
        for Solver<D, W, R, K, C, I, SO, SE>
    where
        T: FloatT,
        D: ProblemData<T, C = C, SE = SE>,
        W: Workspace<T, D = D, R = R, C = C, SE = SE>,
        R: Residuals<T, D = D, W = W, C = C, SE = SE>,
        K: KKTSystem<T, D = D, W = W, SE = SE>,
        C: Cone<T>,
        I: Info<T, D = D, W = W, R = R, C = C, SE = SE>,
        SO: Solution<T, D = D, W = W, R = R, I = I>,
        SE: Settings<T>,
    {
        fn adapt_step_size(&mut self, iter: u32, timers: &mut Timers) -> bool {
            let settings = self.settings.core();
            let interval = settings.adaptive_rho_interval;

            if !settings.adaptive_rho || interval == 0 || iter == 0 || iter % interval != 0 {
                return true;
            }

            if !self
                .workspace
                .adapt_rho(&self.residuals, &self.cones, &self.settings)
            {
                return true;
            }

            let is_success;
            timeit! {timers => "kkt update"; {
                is_success = self.kktsystem.update(&self.data, &self.workspace, &self.settings);
            }}
            is_success
        }

        fn polish(&mut self, iter: u32, timers: &Timers) {
            let polished = self.workspace.polish(
                &self.data,
                &self.cones,
                &mut self.residuals,
                &self.settings,
            );

            if polished {
                self.info
                    .update(&self.data, &self.workspace, &self.residuals, iter, timers);
            }
            self.info.set_polished(polished);
        }
    }
}
use internal::*;

// ---------------------------------
// output redirection, forwarded to the solver info
// ---------------------------------

impl<D, W, R, K, C, I, SO, SE> ConfigurablePrintTarget for Solver<D, W, R, K, C, I, SO, SE>
where
    I: ConfigurablePrintTarget,
{
    fn print_to_stdout(&mut self) {
        self.info.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.info.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn std::io::Write + Send + Sync>) {
        self.info.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.info.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.info.get_print_buffer()
    }
}

// ---------------------------------
// problem persistence
// ---------------------------------

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        use std::{fs::File, io};

        /// Reading and writing of solver problems as JSON files
        pub trait SolverJSONReadWrite: Sized {
            /// Write the problem data, cones and settings to `file`.
            fn write_to_file(&self, file: &mut File) -> Result<(), io::Error>;

            /// Create a new solver from a problem written by
            /// [`write_to_file`](Self::write_to_file).
            fn read_from_file(file: &mut File) -> Result<Self, io::Error>;
        }
    }
}
