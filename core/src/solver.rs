//! Expectation-maximization control loop.
//!
//! The solver only decides when to stop; what an iteration does belongs to
//! the model. Starting from iteration 1, each round runs the expectation
//! step then the maximization step while `iteration < iteration_limit` and
//! the model has not converged, so a limit of `n` allows at most `n - 1`
//! rounds.

/// A model fitted by alternating expectation and maximization steps.
pub trait ExpectationMaximization {
    type Error;

    fn expectation_step(&mut self) -> Result<(), Self::Error>;

    fn maximization_step(&mut self) -> Result<(), Self::Error>;

    /// Checked before every round.
    fn has_converged(&self) -> bool { false }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverState {
    pub iteration_count: u32,
    pub iteration_limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveReport {
    /// Completed E+M rounds.
    pub iterations: u32,
    /// Whether the loop stopped because the model converged rather than on the limit.
    pub converged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterativeSolver {
    iteration_limit: u32,
}

impl IterativeSolver {
    pub fn new(iteration_limit: u32) -> Self { Self { iteration_limit } }

    pub fn iteration_limit(&self) -> u32 { self.iteration_limit }

    /// Drive `model` until it converges, the limit is reached, or a step fails.
    pub fn solve<M: ExpectationMaximization>(&self, model: &mut M) -> Result<SolveReport, M::Error> {
        let mut state = SolverState { iteration_count: 1, iteration_limit: self.iteration_limit };
        let mut converged = model.has_converged();
        while state.iteration_count < state.iteration_limit && !converged {
            model.expectation_step()?;
            model.maximization_step()?;
            tracing::debug!(iteration = state.iteration_count, limit = state.iteration_limit, "completed EM iteration");
            state.iteration_count += 1;
            converged = model.has_converged();
        }
        let report = SolveReport { iterations: state.iteration_count - 1, converged };
        tracing::info!(iterations = report.iterations, converged = report.converged, "solver finished");
        Ok(report)
    }

    /// Closure form: `state` is shared by both steps and the convergence test.
    pub fn solve_with<S, E, FE, FM, FC>(
        &self,
        state: &mut S,
        expectation: FE,
        maximization: FM,
        converged: FC,
    ) -> Result<SolveReport, E>
    where
        FE: FnMut(&mut S) -> Result<(), E>,
        FM: FnMut(&mut S) -> Result<(), E>,
        FC: Fn(&S) -> bool,
    {
        let mut model = ClosureModel { state, expectation, maximization, converged, _error: std::marker::PhantomData };
        self.solve(&mut model)
    }
}

struct ClosureModel<'s, S, E, FE, FM, FC> {
    state: &'s mut S,
    expectation: FE,
    maximization: FM,
    converged: FC,
    _error: std::marker::PhantomData<fn() -> E>,
}

impl<S, E, FE, FM, FC> ExpectationMaximization for ClosureModel<'_, S, E, FE, FM, FC>
where
    FE: FnMut(&mut S) -> Result<(), E>,
    FM: FnMut(&mut S) -> Result<(), E>,
    FC: Fn(&S) -> bool,
{
    type Error = E;

    fn expectation_step(&mut self) -> Result<(), E> { (self.expectation)(&mut *self.state) }

    fn maximization_step(&mut self) -> Result<(), E> { (self.maximization)(&mut *self.state) }

    fn has_converged(&self) -> bool { (self.converged)(&*self.state) }
}
