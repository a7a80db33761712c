use crate::algebra::*;
use crate::solver::core::traits::NonlinearProgram;
use crate::solver::core::SolverError;

// ---------------
// Problem data for the default format
// ---------------

/// Adapter presenting a [`NonlinearProgram`] to the solver core.
///
/// The general constraints g are partitioned into equalities c(x) =
/// g_eq(x) − b (rows with `g_L = g_U`) and inequalities d(x) with bounds
/// d_L ≤ d(x) ≤ d_U, the latter handled through slack variables s with
/// d(x) − s = 0.  Bound patterns on x and s are captured as
/// [`ExpansionMap`]s so that multiplier vectors only carry entries for
/// components that are actually bounded.

pub struct DefaultProblemData<T> {
    pub(crate) nlp: Box<dyn NonlinearProgram<T>>,

    /// number of decision variables
    pub n: usize,
    /// number of general constraints
    pub m: usize,

    pub(crate) x_l: Vec<T>,
    pub(crate) x_u: Vec<T>,

    // partition of the constraint rows
    pub(crate) eq_rows: Vec<usize>,
    pub(crate) ineq_rows: Vec<usize>,

    // right hand sides of the equality rows
    pub(crate) c_rhs: Vec<T>,

    // inequality bounds, indexed over the inequality rows
    pub(crate) d_l: Vec<T>,
    pub(crate) d_u: Vec<T>,

    // injections of the bounded subsets
    pub(crate) map_x_l: ExpansionMap,
    pub(crate) map_x_u: ExpansionMap,
    pub(crate) map_d_l: ExpansionMap,
    pub(crate) map_d_u: ExpansionMap,

    // Jacobian structure split by row class: (block local row, column,
    // index into the callback value array)
    pub(crate) jac_c: Vec<(usize, usize, usize)>,
    pub(crate) jac_d: Vec<(usize, usize, usize)>,
    jac_nnz: usize,

    // Hessian structure, folded into the lower triangle
    pub(crate) hess_rows: Vec<usize>,
    pub(crate) hess_cols: Vec<usize>,
}

impl<T: FloatT> DefaultProblemData<T> {
    pub fn new(nlp: Box<dyn NonlinearProgram<T>>) -> Result<Self, SolverError> {
        let n = nlp.num_variables();
        let m = nlp.num_constraints();
        if n == 0 {
            return Err(SolverError::InvalidProblem(
                "problem has no variables".into(),
            ));
        }

        let mut x_l = vec![T::neg_infinity(); n];
        let mut x_u = vec![T::infinity(); n];
        let mut g_l = vec![T::neg_infinity(); m];
        let mut g_u = vec![T::infinity(); m];
        nlp.bounds(&mut x_l, &mut x_u, &mut g_l, &mut g_u);

        for i in 0..n {
            if x_l[i] > x_u[i] {
                return Err(SolverError::InvalidProblem(format!(
                    "variable {} has x_L > x_U",
                    i
                )));
            }
            if x_l[i] == x_u[i] {
                return Err(SolverError::InvalidProblem(format!(
                    "variable {} is fixed; fixed variables are not supported",
                    i
                )));
            }
        }

        // partition rows into equalities and inequalities
        let mut eq_rows = Vec::new();
        let mut ineq_rows = Vec::new();
        let mut c_rhs = Vec::new();
        let mut d_l = Vec::new();
        let mut d_u = Vec::new();
        for i in 0..m {
            if g_l[i] > g_u[i] {
                return Err(SolverError::InvalidProblem(format!(
                    "constraint {} has g_L > g_U",
                    i
                )));
            }
            if g_l[i] == g_u[i] {
                eq_rows.push(i);
                c_rhs.push(g_l[i]);
            } else {
                ineq_rows.push(i);
                d_l.push(g_l[i]);
                d_u.push(g_u[i]);
            }
        }

        let map_x_l = ExpansionMap::from_pred(&x_l, T::is_finite);
        let map_x_u = ExpansionMap::from_pred(&x_u, T::is_finite);
        let map_d_l = ExpansionMap::from_pred(&d_l, T::is_finite);
        let map_d_u = ExpansionMap::from_pred(&d_u, T::is_finite);

        // split the Jacobian structure by row class.  Row positions within
        // each class follow the order of eq_rows/ineq_rows.
        let jac_nnz = nlp.jacobian_nnz();
        let mut jrows = vec![0usize; jac_nnz];
        let mut jcols = vec![0usize; jac_nnz];
        nlp.jacobian_structure(&mut jrows, &mut jcols);

        let mut row_class = vec![(false, 0usize); m];
        for (local, &r) in eq_rows.iter().enumerate() {
            row_class[r] = (true, local);
        }
        for (local, &r) in ineq_rows.iter().enumerate() {
            row_class[r] = (false, local);
        }

        let mut jac_c = Vec::new();
        let mut jac_d = Vec::new();
        for (k, (&r, &c)) in jrows.iter().zip(&jcols).enumerate() {
            if r >= m || c >= n {
                return Err(SolverError::InvalidProblem(format!(
                    "jacobian entry {} is out of range",
                    k
                )));
            }
            let (is_eq, local) = row_class[r];
            if is_eq {
                jac_c.push((local, c, k));
            } else {
                jac_d.push((local, c, k));
            }
        }

        let hess_nnz = nlp.hessian_nnz();
        let mut hess_rows = vec![0usize; hess_nnz];
        let mut hess_cols = vec![0usize; hess_nnz];
        nlp.hessian_structure(&mut hess_rows, &mut hess_cols);
        for k in 0..hess_nnz {
            if hess_rows[k] >= n || hess_cols[k] >= n {
                return Err(SolverError::InvalidProblem(format!(
                    "hessian entry {} is out of range",
                    k
                )));
            }
            // fold into the lower triangle
            if hess_rows[k] < hess_cols[k] {
                std::mem::swap(&mut hess_rows[k], &mut hess_cols[k]);
            }
        }

        Ok(Self {
            nlp,
            n,
            m,
            x_l,
            x_u,
            eq_rows,
            ineq_rows,
            c_rhs,
            d_l,
            d_u,
            map_x_l,
            map_x_u,
            map_d_l,
            map_d_u,
            jac_c,
            jac_d,
            jac_nnz,
            hess_rows,
            hess_cols,
        })
    }

    /// Number of equality constraints.
    pub fn num_eq(&self) -> usize {
        self.eq_rows.len()
    }

    /// Number of inequality constraints (= number of slacks).
    pub fn num_ineq(&self) -> usize {
        self.ineq_rows.len()
    }

    pub(crate) fn jacobian_nnz(&self) -> usize {
        self.jac_nnz
    }

    /// `out += a * J_c v` with `jvals` the raw Jacobian value array.
    pub(crate) fn jac_c_mul(&self, jvals: &[T], v: &[T], a: T, out: &mut [T]) {
        for &(r, c, k) in &self.jac_c {
            out[r] += a * jvals[k] * v[c];
        }
    }

    /// `out += a * J_cᵀ v`
    pub(crate) fn jac_c_tmul(&self, jvals: &[T], v: &[T], a: T, out: &mut [T]) {
        for &(r, c, k) in &self.jac_c {
            out[c] += a * jvals[k] * v[r];
        }
    }

    /// `out += a * J_d v`
    pub(crate) fn jac_d_mul(&self, jvals: &[T], v: &[T], a: T, out: &mut [T]) {
        for &(r, c, k) in &self.jac_d {
            out[r] += a * jvals[k] * v[c];
        }
    }

    /// `out += a * J_dᵀ v`
    pub(crate) fn jac_d_tmul(&self, jvals: &[T], v: &[T], a: T, out: &mut [T]) {
        for &(r, c, k) in &self.jac_d {
            out[c] += a * jvals[k] * v[r];
        }
    }

    /// Scatter equality and inequality multipliers back into the original
    /// constraint ordering.
    pub(crate) fn full_multipliers(&self, y_c: &[T], y_d: &[T]) -> Vec<T> {
        let mut y = vec![T::zero(); self.m];
        for (local, &r) in self.eq_rows.iter().enumerate() {
            y[r] = y_c[local];
        }
        for (local, &r) in self.ineq_rows.iter().enumerate() {
            y[r] = y_d[local];
        }
        y
    }
}
