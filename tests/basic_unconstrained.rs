use ipnlp::solver::*;

// min ½ xᵀx over x ∈ ℝ², from x0 = (2, -3).  Newton solves this in a
// single full step; the filter is never augmented.

struct SimpleQuadratic;

impl NonlinearProgram<f64> for SimpleQuadratic {
    fn num_variables(&self) -> usize {
        2
    }
    fn num_constraints(&self) -> usize {
        0
    }
    fn jacobian_nnz(&self) -> usize {
        0
    }
    fn hessian_nnz(&self) -> usize {
        2
    }
    fn bounds(&self, _x_l: &mut [f64], _x_u: &mut [f64], _g_l: &mut [f64], _g_u: &mut [f64]) {}
    fn starting_point(&self, x: &mut [f64]) {
        x.copy_from_slice(&[2.0, -3.0]);
    }
    fn eval_f(&mut self, x: &[f64], _new_x: bool) -> Result<f64, EvalError> {
        Ok(0.5 * (x[0] * x[0] + x[1] * x[1]))
    }
    fn eval_grad_f(&mut self, x: &[f64], _new_x: bool, grad: &mut [f64]) -> Result<(), EvalError> {
        grad.copy_from_slice(x);
        Ok(())
    }
    fn eval_g(&mut self, _x: &[f64], _new_x: bool, _g: &mut [f64]) -> Result<(), EvalError> {
        Ok(())
    }
    fn jacobian_structure(&self, _rows: &mut [usize], _cols: &mut [usize]) {}
    fn eval_jacobian(
        &mut self,
        _x: &[f64],
        _new_x: bool,
        _vals: &mut [f64],
    ) -> Result<(), EvalError> {
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

fn quiet_settings() -> DefaultSettings<f64> {
    DefaultSettingsBuilder::default()
        .print_level(PrintLevel::None)
        .build()
        .unwrap()
}

#[test]
fn test_unconstrained_quadratic() {
    let mut solver = NlpSolver::new(Box::new(SimpleQuadratic), quiet_settings()).unwrap();
    let solution = solver.solve();

    assert_eq!(solution.status, SolverStatus::Solved);
    assert!(solution.x[0].abs() < 1e-6);
    assert!(solution.x[1].abs() < 1e-6);
    assert!(solution.obj_val.abs() < 1e-10);

    // one full Newton step, accepted through the Armijo branch; the
    // filter stays empty so no h-type flags appear
    assert_eq!(solution.step_types, "f");
    assert_eq!(solution.iterations, 1);
    assert_eq!(solution.count_soc_steps, 0);
    assert_eq!(solution.count_restorations, 0);
}
