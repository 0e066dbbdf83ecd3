use super::*;
use crate::solver::core::{
    callbacks::{Callback, SolverCallbacks},
    cones::{CompositeCone, SupportedConeT},
    traits::{ProblemData, Settings},
    ADMMSolver, Solver, SolverStatus,
};

use crate::algebra::*;
use crate::timers::*;

/// Solver for problems in standard conic program form

pub type DefaultSolver<T = f64> = Solver<
    DefaultProblemData<T>,
    DefaultWorkspace<T>,
    DefaultResiduals<T>,
    DefaultKKTSystem<T>,
    CompositeCone<T>,
    DefaultInfo<T>,
    DefaultSolution<T>,
    DefaultSettings<T>,
>;

impl<T> DefaultSolver<T>
where
    T: FloatT,
{
    /// Create a solver for the problem data `(P, q, A, b)` with
    /// constraint cones `cone_types`.
    ///
    /// `P` may be given in full or as its upper triangle.   The data is
    /// copied and equilibrated, and the KKT system is factored, before
    /// this function returns.
    pub fn new(
        P: &CscMatrix<T>,
        q: &[T],
        A: &CscMatrix<T>,
        b: &[T],
        cone_types: &[SupportedConeT],
        settings: DefaultSettings<T>,
    ) -> Result<Self, SolverError> {
        Self::new_with_parameters(
            P,
            q,
            A,
            b,
            cone_types,
            settings,
            ParameterSchema::default(),
        )
    }

    /// As [`new`](Self::new), additionally declaring the named parameters
    /// that can later be written with [`update_parameter`](Self::update_parameter).
    pub fn new_with_parameters(
        P: &CscMatrix<T>,
        q: &[T],
        A: &CscMatrix<T>,
        b: &[T],
        cone_types: &[SupportedConeT],
        settings: DefaultSettings<T>,
        parameters: ParameterSchema<T>,
    ) -> Result<Self, SolverError> {
        settings.validate()?;
        _check_dimensions(P, q, A, b, cone_types)?;

        let mut timers = Timers::default();
        let mut output;

        timeit! {timers => "setup"; {

        let info = DefaultInfo::<T>::new();
        let cones = CompositeCone::<T>::new(cone_types);
        let mut data = DefaultProblemData::<T>::new(P,q,A,b,&cones,settings.infinite_bound);

        // parameter targets are checked against the fixed patterns
        parameters.validate(&data)?;
        data.parameters = parameters;

        // equilibrate problem data immediately on setup.
        // this prevents multiple equilibrations if solve
        // is called more than once.
        timeit!{timers => "equilibration"; {
            data.equilibrate(&cones,&settings);
        }}

        let (n, m) = (data.n, data.m);
        let mut workspace = DefaultWorkspace::<T>::new(n,m);
        workspace.set_rho(settings.rho, &cones);
        let residuals = DefaultResiduals::<T>::new(n,m);

        let kktsystem;
        timeit!{timers => "kktinit"; {
            kktsystem = DefaultKKTSystem::<T>::new(&data,&workspace,&settings)?;
        }}

        // user facing results go here.
        let solution = DefaultSolution::<T>::new(n,m);

        output = Self{data,workspace,residuals,kktsystem,cones,info,solution,settings,
            timers: None, callbacks: SolverCallbacks::default()};

        }} //end "setup" timer.

        //now that the timer is finished we can swap our
        //timer object into the solver structure
        output.timers.replace(timers);

        Ok(output)
    }

    /// Replace the solver settings.   Fails if the new settings are
    /// invalid, or change a setting that is fixed at initialization.
    pub fn update_settings(&mut self, settings: DefaultSettings<T>) -> Result<(), SolverError> {
        settings.validate()?;
        settings.validate_as_update(&self.settings)?;
        self.settings = settings;
        Ok(())
    }

    /// Install `settings`, solve, and return a copy of the result.
    pub fn solve_with(
        &mut self,
        settings: DefaultSettings<T>,
    ) -> Result<DefaultSolution<T>, SolverError> {
        self.update_settings(settings)?;
        self.solve();
        self.solution()
    }

    /// Start the next solve from the primal-dual pair `(x, y)`, given
    /// in the coordinates of the problem as posed.   The point is used
    /// regardless of the `warm_start` setting.
    pub fn warm_start(&mut self, x: &[T], y: &[T]) -> Result<(), SolverError> {
        let (n, m) = (self.data.n, self.data.m);
        if x.len() != n {
            return Err(SolverError::ParameterShape {
                expected: n,
                found: x.len(),
            });
        }
        if y.len() != m {
            return Err(SolverError::ParameterShape {
                expected: m,
                found: y.len(),
            });
        }

        let equil = &self.data.equilibration;
        let mut xs = x.to_vec();
        xs.hadamard(&equil.dinv);
        let mut ys = y.to_vec();
        ys.hadamard(&equil.einv).scale(equil.c);

        self.workspace.set_start(&xs, &ys);
        Ok(())
    }

    // ---------------
    // results
    // ---------------

    /// Status of the most recent solve.
    pub fn status(&self) -> SolverStatus {
        self.solution.status
    }

    /// A copy of the result of the most recent solve.   Fails with
    /// [`NoSolution`](SolverError::NoSolution) before the first solve.
    pub fn solution(&self) -> Result<DefaultSolution<T>, SolverError> {
        match self.solution.status {
            SolverStatus::Unsolved => Err(SolverError::NoSolution),
            _ => Ok(self.solution.clone()),
        }
    }

    /// Iterations taken by the most recent solve.
    pub fn iterations(&self) -> u32 {
        self.solution.iterations
    }

    /// Wall clock time in seconds of the most recent solve.
    pub fn solve_time(&self) -> f64 {
        self.solution.solve_time
    }

    // ---------------
    // callbacks
    // ---------------

    /// Install a function called once per iteration with the current
    /// progress information.   Returning `true` stops the solver with
    /// status [`CallbackTerminated`](SolverStatus::CallbackTerminated).
    pub fn set_termination_callback(&mut self, f: fn(&DefaultInfo<T>) -> bool) {
        self.callbacks.termination_callback = Callback::Rust(f);
    }

    pub fn unset_termination_callback(&mut self) {
        self.callbacks.termination_callback = Callback::None;
    }
}

fn _check_dimensions<T: FloatT>(
    P: &CscMatrix<T>,
    q: &[T],
    A: &CscMatrix<T>,
    b: &[T],
    cone_types: &[SupportedConeT],
) -> Result<(), SolverError> {
    let (m, n) = A.size();

    P.check_format()?;
    A.check_format()?;

    let bad = |what: &str| Err(SolverError::Configuration(format!("inconsistent {what}")));

    if P.size() != (n, n) {
        return bad("dimensions of P and A");
    }
    if q.len() != n {
        return bad("length of q");
    }
    if b.len() != m {
        return bad("length of b");
    }

    if let Some(cone) = cone_types.iter().find(|c| !c.is_valid()) {
        return Err(SolverError::Configuration(format!(
            "invalid cone {cone:?}"
        )));
    }
    let cone_rows: usize = cone_types.iter().map(|c| c.nvars()).sum();
    if cone_rows != m {
        return bad("cone dimensions and rows of A");
    }

    Ok(())
}
