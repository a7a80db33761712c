//! <h1>ipnlp</h1>
//!
//! A primal-dual interior point solver for constrained nonlinear programs
//!
//! ```text
//! minimize      f(x)
//! subject to    g_L ≤ g(x) ≤ g_U
//!               x_L ≤  x   ≤ x_U
//! ```
//!
//! where f and g are twice continuously differentiable and supplied through
//! the [`NonlinearProgram`](crate::solver::NonlinearProgram) callback trait.
//! Constraints with `g_L = g_U` are treated as equalities; the remainder are
//! reformulated with slack variables.  The solver applies a logarithmic
//! barrier to the bound constraints and globalizes the Newton iteration on
//! the perturbed KKT conditions with a filter line search, including a
//! second order correction and an optional feasibility restoration phase.
//!
//! The algorithm is the filter method of Wächter and Biegler.  See the
//! documentation of the [solver](crate::solver) module for usage.

//Rust hates greek characters
#![allow(confusable_idents)]
#![allow(uncommon_codepoints)]

pub mod algebra;
pub mod solver;
