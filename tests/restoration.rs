use ipnlp::solver::*;
use std::cell::Cell;
use std::rc::Rc;

// min ½x₂² + x₂  s.t.  x₁ + x₂ = −10⁶,  x₁ ≥ 0, from x0 = (0, 0).
//
// The equality residual is enormous while x₁ starts hot against its
// bound, so the Newton direction drives x₁ through the bound and the
// fraction-to-the-boundary rule caps the step far below the smallest
// acceptable size: the very first line search fails and control passes
// to the restoration phase.

struct FarEquality;

impl NonlinearProgram<f64> for FarEquality {
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
        1
    }
    fn bounds(&self, x_l: &mut [f64], _x_u: &mut [f64], g_l: &mut [f64], g_u: &mut [f64]) {
        x_l[0] = 0.0;
        g_l[0] = -1e6;
        g_u[0] = -1e6;
    }
    fn starting_point(&self, x: &mut [f64]) {
        x.fill(0.0);
    }
    fn eval_f(&mut self, x: &[f64], _new_x: bool) -> Result<f64, EvalError> {
        Ok(0.5 * x[1] * x[1] + x[1])
    }
    fn eval_grad_f(&mut self, x: &[f64], _new_x: bool, grad: &mut [f64]) -> Result<(), EvalError> {
        grad[0] = 0.0;
        grad[1] = x[1] + 1.0;
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
        rows[0] = 1;
        cols[0] = 1;
    }
    fn eval_hessian(
        &mut self,
        _x: &[f64],
        _new_x: bool,
        sigma: f64,
        _lam: &[f64],
        vals: &mut [f64],
    ) -> Result<(), EvalError> {
        vals[0] = sigma;
        Ok(())
    }
}

// Restoration collaborator that installs a feasible point with matched
// multiplier estimates and counts its invocations.
struct CountingRestoration {
    calls: Rc<Cell<u32>>,
}

impl RestorationPhase<f64> for CountingRestoration {
    fn perform_restoration(
        &mut self,
        _data: &mut DefaultProblemData<f64>,
        it: &mut DefaultIterateData<f64>,
        _qty: &mut DefaultQuantities<f64>,
        _settings: &DefaultSettings<f64>,
        _jnlst: &Journalist,
    ) -> Result<bool, SolverError> {
        self.calls.set(self.calls.get() + 1);

        let curr = it.curr_mut();
        curr.x[0] = 1.0;
        curr.x[1] = -1_000_001.0;
        curr.y_c[0] = -1_000_000.0;
        curr.z_l[0] = 1_000_000.0;
        Ok(true)
    }
}

fn quiet_settings() -> DefaultSettings<f64> {
    DefaultSettingsBuilder::default()
        .print_level(PrintLevel::None)
        .build()
        .unwrap()
}

#[test]
fn test_restoration_invoked_once() {
    let calls = Rc::new(Cell::new(0u32));
    let resto = CountingRestoration {
        calls: calls.clone(),
    };
    let mut solver =
        NlpSolver::new_with_restoration(Box::new(FarEquality), quiet_settings(), Some(Box::new(resto)))
            .unwrap();
    let solution = solver.solve();

    assert_eq!(calls.get(), 1);
    assert_eq!(solution.count_restorations, 1);
    assert_eq!(solution.step_types.matches('R').count(), 1);

    // the solve proceeds to the optimum after restoration: x₁ pinned at
    // its bound, x₂ carrying the equality
    assert_eq!(solution.status, SolverStatus::Solved);
    assert!(solution.x[0].abs() < 1e-3);
    assert!((solution.x[1] + 1e6).abs() < 1.0);
    assert!((solution.y[0] + 999_999.0).abs() < 1.0);
}

#[test]
fn test_restoration_unconfigured_is_fatal() {
    let mut solver =
        NlpSolver::new_with_restoration(Box::new(FarEquality), quiet_settings(), None).unwrap();
    let solution = solver.solve();
    assert_eq!(solution.status, SolverStatus::RestorationFailed);
}
