//! Solver module, comprising the core abstractions and the default
//! implementation for the standard problem format described at the
//! [crate root](crate).

// internal module structure
pub(crate) mod core;
pub(crate) mod implementations;

//Here we expose only part of the solver internals and flatten the
//module structure a bit to give a friendlier API

//user facing problem description trait
pub use crate::solver::core::traits::NonlinearProgram;

//error, status and logging types
pub use crate::solver::core::{
    journalist::{Journalist, PrintCategory, PrintLevel},
    EvalError, SolverError, SolverStatus,
};

//linear solver interface for custom factorization engines
pub use crate::solver::core::linsolvers;

pub use crate::solver::implementations::default::*;
