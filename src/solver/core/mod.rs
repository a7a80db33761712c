pub mod journalist;
pub mod linsolvers;
pub mod traits;

use thiserror::Error;

// ---------------------------------
// Solver status type
// ---------------------------------

/// Final disposition of a solve.

#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum SolverStatus {
    /// Problem is not solved yet
    #[default]
    Unsolved,
    /// KKT conditions satisfied to within tolerance
    Solved,
    /// Iteration limit reached; incomplete result returned
    MaxIterations,
    /// The restoration phase could not restore feasibility
    RestorationFailed,
    /// Unrecoverable numerical error in the linear solver
    NumericalError,
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let msg = match self {
            SolverStatus::Unsolved => "unsolved",
            SolverStatus::Solved => "solved to requested tolerance",
            SolverStatus::MaxIterations => "maximum iterations reached",
            SolverStatus::RestorationFailed => "could not restore feasibility",
            SolverStatus::NumericalError => "unrecoverable numerical error",
        };
        write!(f, "{}", msg)
    }
}

// ---------------------------------
// Error types
// ---------------------------------

/// Error raised by a [`NonlinearProgram`](crate::solver::NonlinearProgram)
/// callback that could not evaluate at the requested point.
///
/// During the line search this error is recoverable: the trial step size
/// at which the evaluation failed is rejected and the search continues
/// with a shorter step.

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("evaluation of {0} failed")]
pub struct EvalError(pub &'static str);

/// Error type returned by the solver.

#[derive(Error, Debug)]
pub enum SolverError {
    /// An option failed validation.  Raised at initialization only; the
    /// solver holds no partial state afterwards.
    #[error("option out of range: {0}")]
    OptionOutOfRange(String),

    /// The problem description is inconsistent (dimensions, bounds).
    #[error("invalid problem: {0}")]
    InvalidProblem(String),

    /// A problem function could not be evaluated.
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// The KKT matrix could not be factorized with acceptable inertia
    /// even at the regularization cap.
    #[error("linear solver failure: {0}")]
    LinearSolver(String),

    /// The restoration phase failed, or none was configured when one
    /// was required.
    #[error("could not restore feasibility")]
    RestorationFailure,
}
