use ipnlp::solver::*;

// min ½(x₁² + x₂²)  s.t.  x₁ + x₂ = 1, from x0 = (0.9, 0.9).
// Optimum (0.5, 0.5) with constraint multiplier 0.5.

struct EqualityQp;

impl NonlinearProgram<f64> for EqualityQp {
    fn num_variables(&self) -> usize {
        2
    }
    fn num_constraints(&self) -> usize {
        1
    }
    fn jacobian_nnz(&self) -> usize {
        2
    }
    fn hessian_nnz(&self) -> usize {
        2
    }
    fn bounds(&self, _x_l: &mut [f64], _x_u: &mut [f64], g_l: &mut [f64], g_u: &mut [f64]) {
        g_l[0] = 1.0;
        g_u[0] = 1.0;
    }
    fn starting_point(&self, x: &mut [f64]) {
        x.fill(0.9);
    }
    fn eval_f(&mut self, x: &[f64], _new_x: bool) -> Result<f64, EvalError> {
        Ok(0.5 * (x[0] * x[0] + x[1] * x[1]))
    }
    fn eval_grad_f(&mut self, x: &[f64], _new_x: bool, grad: &mut [f64]) -> Result<(), EvalError> {
        grad.copy_from_slice(x);
        Ok(())
    }
    fn eval_g(&mut self, x: &[f64], _new_x: bool, g: &mut [f64]) -> Result<(), EvalError> {
        g[0] = x[0] + x[1];
        Ok(())
    }
    fn jacobian_structure(&self, rows: &mut [usize], cols: &mut [usize]) {
        rows.copy_from_slice(&[0, 0]);
        cols.copy_from_slice(&[0, 1]);
    }
    fn eval_jacobian(
        &mut self,
        _x: &[f64],
        _new_x: bool,
        vals: &mut [f64],
    ) -> Result<(), EvalError> {
        vals.fill(1.0);
        Ok(())
    }
    fn hessian_structure(&self, rows: &mut [usize], cols: &mut [usize]) {
        rows.copy_from_slice(&[0, 1]);
        cols.copy_from_slice(&[0, 1]);
    }
    fn eval_hessian(
        &mut self,
        _x: &[f64],
        _new_x: bool,
        sigma: f64,
        _lam: &[f64],
        vals: &mut [f64],
    ) -> Result<(), EvalError> {
        vals.fill(sigma);
        Ok(())
    }
}

#[test]
fn test_equality_constrained_qp() {
    let settings = DefaultSettingsBuilder::default()
        .print_level(PrintLevel::None)
        .build()
        .unwrap();
    let mut solver = NlpSolver::new(Box::new(EqualityQp), settings).unwrap();
    let solution = solver.solve();

    assert_eq!(solution.status, SolverStatus::Solved);
    assert!((solution.x[0] - 0.5).abs() < 1e-6);
    assert!((solution.x[1] - 0.5).abs() < 1e-6);
    assert!((solution.obj_val - 0.25).abs() < 1e-6);
    assert!((solution.y[0] - 0.5).abs() < 1e-6);
    assert!(solution.primal_inf < 1e-8);
}
