use ipnlp::solver::*;

// min x²  s.t.  x ≥ 1, from the infeasible start x0 = 0.5.  The
// inequality is active at the solution x* = 1 with multiplier 2.

struct OneSidedQp;

impl NonlinearProgram<f64> for OneSidedQp {
    fn num_variables(&self) -> usize {
        1
    }
    fn num_constraints(&self) -> usize {
        1
    }
    fn jacobian_nnz(&self) -> usize {
        1
    }
    fn hessian_nnz(&self) -> usize {
        1
    }
    fn bounds(&self, _x_l: &mut [f64], _x_u: &mut [f64], g_l: &mut [f64], g_u: &mut [f64]) {
        g_l[0] = 1.0;
        g_u[0] = f64::INFINITY;
    }
    fn starting_point(&self, x: &mut [f64]) {
        x[0] = 0.5;
    }
    fn eval_f(&mut self, x: &[f64], _new_x: bool) -> Result<f64, EvalError> {
        Ok(x[0] * x[0])
    }
    fn eval_grad_f(&mut self, x: &[f64], _new_x: bool, grad: &mut [f64]) -> Result<(), EvalError> {
        grad[0] = 2.0 * x[0];
        Ok(())
    }
    fn eval_g(&mut self, x: &[f64], _new_x: bool, g: &mut [f64]) -> Result<(), EvalError> {
        g[0] = x[0];
        Ok(())
    }
    fn jacobian_structure(&self, rows: &mut [usize], cols: &mut [usize]) {
        rows[0] = 0;
        cols[0] = 0;
    }
    fn eval_jacobian(
        &mut self,
        _x: &[f64],
        _new_x: bool,
        vals: &mut [f64],
    ) -> Result<(), EvalError> {
        vals[0] = 1.0;
        Ok(())
    }
    fn hessian_structure(&self, rows: &mut [usize], cols: &mut [usize]) {
        rows[0] = 0;
        cols[0] = 0;
    }
    fn eval_hessian(
        &mut self,
        _x: &[f64],
        _new_x: bool,
        sigma: f64,
        _lam: &[f64],
        vals: &mut [f64],
    ) -> Result<(), EvalError> {
        vals[0] = 2.0 * sigma;
        Ok(())
    }
}

#[test]
fn test_active_inequality() {
    let settings = DefaultSettingsBuilder::default()
        .print_level(PrintLevel::None)
        .build()
        .unwrap();
    let mut solver = NlpSolver::new(Box::new(OneSidedQp), settings).unwrap();
    let solution = solver.solve();

    assert_eq!(solution.status, SolverStatus::Solved);
    assert!((solution.x[0] - 1.0).abs() < 1e-5);
    assert!((solution.obj_val - 1.0).abs() < 1e-4);
    assert!((solution.y[0] - 2.0).abs() < 1e-3);

    // the slack stays strictly inside its bound
    assert!(solution.s[0] > 1.0);
    assert_eq!(solution.count_restorations, 0);
}

#[test]
fn test_magic_steps_enabled_still_converges() {
    let settings = DefaultSettingsBuilder::default()
        .print_level(PrintLevel::None)
        .magic_steps(true)
        .build()
        .unwrap();
    let mut solver = NlpSolver::new(Box::new(OneSidedQp), settings).unwrap();
    let solution = solver.solve();

    assert_eq!(solution.status, SolverStatus::Solved);
    assert!((solution.x[0] - 1.0).abs() < 1e-5);
}
