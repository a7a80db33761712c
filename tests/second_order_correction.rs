use ipnlp::solver::*;

// min 2(x₁² + x₂² − 1) − x₁  s.t.  x₁² + x₂² = 1.
//
// Along the circle the objective is −x₁, so the solution is (1, 0) with
// constraint multiplier 1.5.  Started on the circle with the exact
// multiplier, the full Newton step increases both the objective and the
// violation (the Maratos effect); the second order correction repairs
// the trial and is accepted, so the first iteration carries an
// uppercase step flag.

struct MaratosProblem;

impl NonlinearProgram<f64> for MaratosProblem {
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
        x[0] = (0.5f64).cos();
        x[1] = (0.5f64).sin();
    }
    fn initial_y(&self) -> Option<Vec<f64>> {
        Some(vec![1.5])
    }
    fn eval_f(&mut self, x: &[f64], _new_x: bool) -> Result<f64, EvalError> {
        Ok(2.0 * (x[0] * x[0] + x[1] * x[1] - 1.0) - x[0])
    }
    fn eval_grad_f(&mut self, x: &[f64], _new_x: bool, grad: &mut [f64]) -> Result<(), EvalError> {
        grad[0] = 4.0 * x[0] - 1.0;
        grad[1] = 4.0 * x[1];
        Ok(())
    }
    fn eval_g(&mut self, x: &[f64], _new_x: bool, g: &mut [f64]) -> Result<(), EvalError> {
        g[0] = x[0] * x[0] + x[1] * x[1];
        Ok(())
    }
    fn jacobian_structure(&self, rows: &mut [usize], cols: &mut [usize]) {
        rows.copy_from_slice(&[0, 0]);
        cols.copy_from_slice(&[0, 1]);
    }
    fn eval_jacobian(
        &mut self,
        x: &[f64],
        _new_x: bool,
        vals: &mut [f64],
    ) -> Result<(), EvalError> {
        vals[0] = 2.0 * x[0];
        vals[1] = 2.0 * x[1];
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
        lam: &[f64],
        vals: &mut [f64],
    ) -> Result<(), EvalError> {
        vals.fill(4.0 * sigma + 2.0 * lam[0]);
        Ok(())
    }
}

#[test]
fn test_soc_repairs_maratos_step() {
    let settings = DefaultSettingsBuilder::default()
        .print_level(PrintLevel::None)
        .build()
        .unwrap();
    let mut solver = NlpSolver::new(Box::new(MaratosProblem), settings).unwrap();
    let solution = solver.solve();

    assert_eq!(solution.status, SolverStatus::Solved);
    assert!((solution.x[0] - 1.0).abs() < 1e-5);
    assert!(solution.x[1].abs() < 1e-5);
    assert!((solution.obj_val + 1.0).abs() < 1e-5);
    assert!((solution.y[0] - 1.5).abs() < 1e-4);

    // the Maratos step was rescued by a second order correction
    assert!(solution.count_soc_steps >= 1);
    assert!(
        solution.step_types.contains('F') || solution.step_types.contains('H'),
        "no uppercase step flag in {:?}",
        solution.step_types
    );
}

#[test]
fn test_soc_disabled_by_option() {
    // with max_soc = 0 the correction never runs; the backtracking line
    // search has to recover on its own
    let settings = DefaultSettingsBuilder::default()
        .print_level(PrintLevel::None)
        .max_soc(0u32)
        .build()
        .unwrap();
    let mut solver = NlpSolver::new(Box::new(MaratosProblem), settings).unwrap();
    let solution = solver.solve();

    assert_eq!(solution.count_soc_steps, 0);
    assert!(!solution.step_types.contains('F'));
    assert!(!solution.step_types.contains('H'));
    assert_eq!(solution.status, SolverStatus::Solved);
}
