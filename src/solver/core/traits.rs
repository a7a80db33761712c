//! Problem description trait for the solver.
//!
//! A user supplies the problem functions by implementing
//! [`NonlinearProgram`] for their own type.  All evaluation callbacks take
//! the point as a plain slice and fill caller-allocated buffers; each
//! returns `Err(EvalError)` when the point is outside the domain of the
//! function, which the solver treats as a rejection of the trial step
//! rather than a hard failure.
//!
//! Derivative structures are in triplet (coordinate) form.  The structure
//! callbacks are invoked once at initialization; the value callbacks are
//! invoked with buffers of the corresponding length.  The Hessian is that
//! of σ·f + λᵀg and only its lower triangle is referenced.

use super::EvalError;
use crate::algebra::FloatT;

/// A twice differentiable nonlinear program
///
/// ```text
/// minimize      f(x)
/// subject to    g_L ≤ g(x) ≤ g_U
///               x_L ≤  x   ≤ x_U
/// ```
///
/// Infinite entries in the bound vectors denote absent bounds.
/// Constraints with `g_L = g_U` are equalities.
pub trait NonlinearProgram<T: FloatT> {
    /// Number of decision variables n.
    fn num_variables(&self) -> usize;

    /// Number of general constraints m.
    fn num_constraints(&self) -> usize;

    /// Number of structural nonzeros of the constraint Jacobian.
    fn jacobian_nnz(&self) -> usize;

    /// Number of structural nonzeros of the Lagrangian Hessian
    /// (lower triangle).
    fn hessian_nnz(&self) -> usize;

    /// Fill the variable bounds `x_L`, `x_U` (length n) and the
    /// constraint bounds `g_L`, `g_U` (length m).
    fn bounds(&self, x_l: &mut [T], x_u: &mut [T], g_l: &mut [T], g_u: &mut [T]);

    /// Fill the primal starting point (length n).
    fn starting_point(&self, x: &mut [T]);

    /// Optional initial estimate of the constraint multipliers
    /// (length m).  The default is a zero start.
    fn initial_y(&self) -> Option<Vec<T>> {
        None
    }

    /// Objective value at `x`.
    fn eval_f(&mut self, x: &[T], new_x: bool) -> Result<T, EvalError>;

    /// Objective gradient at `x` (length n).
    fn eval_grad_f(&mut self, x: &[T], new_x: bool, grad: &mut [T]) -> Result<(), EvalError>;

    /// Constraint values g(x) (length m).
    fn eval_g(&mut self, x: &[T], new_x: bool, g: &mut [T]) -> Result<(), EvalError>;

    /// Row and column indices of the Jacobian nonzeros
    /// (length `jacobian_nnz`).
    fn jacobian_structure(&self, rows: &mut [usize], cols: &mut [usize]);

    /// Jacobian values at `x` (length `jacobian_nnz`), in the order
    /// declared by [`jacobian_structure`](Self::jacobian_structure).
    fn eval_jacobian(&mut self, x: &[T], new_x: bool, vals: &mut [T]) -> Result<(), EvalError>;

    /// Row and column indices of the Hessian nonzeros, lower triangle
    /// (length `hessian_nnz`).
    fn hessian_structure(&self, rows: &mut [usize], cols: &mut [usize]);

    /// Hessian of σ·f(x) + λᵀg(x) at `x` (length `hessian_nnz`), in the
    /// order declared by [`hessian_structure`](Self::hessian_structure).
    fn eval_hessian(
        &mut self,
        x: &[T],
        new_x: bool,
        σ: T,
        λ: &[T],
        vals: &mut [T],
    ) -> Result<(), EvalError>;
}
