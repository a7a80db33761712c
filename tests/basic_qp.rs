use ipnlp::solver::*;

// min ½‖x − (2,2)‖² subject to 0 ≤ x ≤ 1, from x0 = (0.5, 0.5).
// The unconstrained minimizer lies outside the box, so both upper
// bounds are active at the solution (1,1) with multipliers z_U ≈ 1.

struct BoxQp;

impl NonlinearProgram<f64> for BoxQp {
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
    fn bounds(&self, x_l: &mut [f64], x_u: &mut [f64], _g_l: &mut [f64], _g_u: &mut [f64]) {
        x_l.fill(0.0);
        x_u.fill(1.0);
    }
    fn starting_point(&self, x: &mut [f64]) {
        x.fill(0.5);
    }
    fn eval_f(&mut self, x: &[f64], _new_x: bool) -> Result<f64, EvalError> {
        Ok(0.5 * ((x[0] - 2.0).powi(2) + (x[1] - 2.0).powi(2)))
    }
    fn eval_grad_f(&mut self, x: &[f64], _new_x: bool, grad: &mut [f64]) -> Result<(), EvalError> {
        grad[0] = x[0] - 2.0;
        grad[1] = x[1] - 2.0;
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

#[test]
fn test_box_constrained_qp() {
    let settings = DefaultSettingsBuilder::default()
        .print_level(PrintLevel::None)
        .build()
        .unwrap();
    let mut solver = NlpSolver::new(Box::new(BoxQp), settings).unwrap();
    let solution = solver.solve();

    assert_eq!(solution.status, SolverStatus::Solved);
    assert!((solution.x[0] - 1.0).abs() < 1e-5);
    assert!((solution.x[1] - 1.0).abs() < 1e-5);
    assert!((solution.obj_val - 1.0).abs() < 1e-4);

    // the upper bounds are active, the lower bounds are not
    for i in 0..2 {
        assert!(solution.x[i] < 1.0, "iterate must stay interior");
        assert!(solution.z_u[i] > 0.5);
        assert!(solution.z_l[i] >= 0.0);
        assert!(solution.z_l[i] < 1e-4);
    }
    assert_eq!(solution.count_restorations, 0);
}
