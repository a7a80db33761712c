use super::DefaultProblemData;
use crate::algebra::*;

// ---------------
// Iterate storage for the default format
// ---------------

/// Monotonically increasing stamp identifying a particular state of a
/// mutable slot.  Cached derived quantities record the tags they were
/// computed from; staleness is detected by inequality.
pub(crate) type Tag = u64;

/// A full primal-dual point (or step direction): primal variables x,
/// slacks s, equality multipliers y_c and y_d, and the four reduced bound
/// multiplier blocks.
#[derive(Debug, Clone)]
pub struct DefaultIterate<T> {
    pub x: Vec<T>,
    pub s: Vec<T>,
    pub y_c: Vec<T>,
    pub y_d: Vec<T>,
    pub z_l: Vec<T>,
    pub z_u: Vec<T>,
    pub v_l: Vec<T>,
    pub v_u: Vec<T>,
}

impl<T: FloatT> DefaultIterate<T> {
    pub fn new(data: &DefaultProblemData<T>) -> Self {
        Self {
            x: vec![T::zero(); data.n],
            s: vec![T::zero(); data.num_ineq()],
            y_c: vec![T::zero(); data.num_eq()],
            y_d: vec![T::zero(); data.num_ineq()],
            z_l: vec![T::zero(); data.map_x_l.len()],
            z_u: vec![T::zero(); data.map_x_u.len()],
            v_l: vec![T::zero(); data.map_d_l.len()],
            v_u: vec![T::zero(); data.map_d_u.len()],
        }
    }

    pub fn copy_from(&mut self, src: &Self) {
        self.x.copy_from(&src.x);
        self.s.copy_from(&src.s);
        self.y_c.copy_from(&src.y_c);
        self.y_d.copy_from(&src.y_d);
        self.z_l.copy_from(&src.z_l);
        self.z_u.copy_from(&src.z_u);
        self.v_l.copy_from(&src.v_l);
        self.v_u.copy_from(&src.v_u);
    }

    /// Infinity norm of the primal step blocks.
    pub fn primal_norm_inf(&self) -> T {
        T::max(self.x.norm_inf(), self.s.norm_inf())
    }
}

/// Current and trial iterates, the step direction, the barrier parameter,
/// iteration counters and the per-iteration diagnostics.
///
/// There is exactly one mutator of the current iterate per outer
/// iteration: [`accept_trial_point`](Self::accept_trial_point) (or a
/// restoration install).  During a line search sweep only the trial slot
/// changes, so all reads of the current slot observe a consistent
/// snapshot.
pub struct DefaultIterateData<T> {
    curr: DefaultIterate<T>,
    trial: DefaultIterate<T>,
    delta: DefaultIterate<T>,

    next_tag: Tag,
    curr_tag: Tag,
    curr_x_tag: Tag,
    trial_tag: Tag,
    trial_x_tag: Tag,
    delta_tag: Tag,
    mu_tag: Tag,

    /// barrier parameter μ
    mu: T,
    /// fraction-to-the-boundary parameter τ
    pub tau: T,
    /// outer iteration counter
    pub iter_count: u32,

    // diagnostics for the iteration summary line
    pub info_alpha_primal: T,
    pub info_alpha_dual: T,
    pub info_alpha_primal_char: char,
    pub info_ls_count: u32,
    pub info_regu_x: T,
    pub info_string: String,

    // cumulative counters
    pub count_soc_steps: u32,
    pub count_restorations: u32,
}

impl<T: FloatT> DefaultIterateData<T> {
    pub fn new(data: &DefaultProblemData<T>) -> Self {
        Self {
            curr: DefaultIterate::new(data),
            trial: DefaultIterate::new(data),
            delta: DefaultIterate::new(data),
            next_tag: 6,
            curr_tag: 0,
            curr_x_tag: 1,
            trial_tag: 2,
            trial_x_tag: 3,
            delta_tag: 4,
            mu_tag: 5,
            mu: T::one(),
            tau: T::one(),
            iter_count: 0,
            info_alpha_primal: T::zero(),
            info_alpha_dual: T::zero(),
            info_alpha_primal_char: ' ',
            info_ls_count: 0,
            info_regu_x: T::zero(),
            info_string: String::new(),
            count_soc_steps: 0,
            count_restorations: 0,
        }
    }

    fn bump(&mut self) -> Tag {
        let t = self.next_tag;
        self.next_tag += 1;
        t
    }

    // ---- read access ----

    pub fn curr(&self) -> &DefaultIterate<T> {
        &self.curr
    }

    pub fn trial(&self) -> &DefaultIterate<T> {
        &self.trial
    }

    pub fn delta(&self) -> &DefaultIterate<T> {
        &self.delta
    }

    pub fn mu(&self) -> T {
        self.mu
    }

    pub(crate) fn curr_tag(&self) -> Tag {
        self.curr_tag
    }

    /// Tag of the current x alone, unaffected by slack and multiplier
    /// writes.  Quantities that depend only on x are stamped with this.
    pub(crate) fn curr_x_tag(&self) -> Tag {
        self.curr_x_tag
    }

    pub(crate) fn trial_tag(&self) -> Tag {
        self.trial_tag
    }

    pub(crate) fn trial_x_tag(&self) -> Tag {
        self.trial_x_tag
    }

    pub(crate) fn delta_tag(&self) -> Tag {
        self.delta_tag
    }

    pub(crate) fn mu_tag(&self) -> Tag {
        self.mu_tag
    }

    // ---- mutation; every write advances the corresponding tag ----

    /// Install a new barrier parameter.
    pub fn set_mu(&mut self, mu: T) {
        self.mu = mu;
        self.mu_tag = self.bump();
    }

    /// Set the trial primal variables to `curr + α·(Δx, Δs)`.
    pub fn set_trial_primal_from_step(&mut self, α: T) {
        self.trial
            .x
            .waxpby(T::one(), &self.curr.x, α, &self.delta.x);
        self.trial
            .s
            .waxpby(T::one(), &self.curr.s, α, &self.delta.s);
        self.trial_tag = self.bump();
        self.trial_x_tag = self.bump();
    }

    /// Set the trial primal variables to `curr + α·(Δx, Δs)` for an
    /// explicit step direction, e.g. a second order correction that has
    /// not (yet) replaced the stored step.
    pub fn set_trial_primal_from(&mut self, α: T, step: &DefaultIterate<T>) {
        self.trial.x.waxpby(T::one(), &self.curr.x, α, &step.x);
        self.trial.s.waxpby(T::one(), &self.curr.s, α, &step.s);
        self.trial_tag = self.bump();
        self.trial_x_tag = self.bump();
    }

    /// Overwrite the trial slacks (magic step).
    pub fn set_trial_s(&mut self, s: &[T]) {
        self.trial.s.copy_from(s);
        self.trial_tag = self.bump();
    }

    /// Set the trial equality multipliers to `curr + α·Δy`.
    pub fn set_trial_eq_mults_from_step(&mut self, α: T) {
        self.trial.y_c.copy_from(&self.curr.y_c);
        self.trial.y_c.axpby(α, &self.delta.y_c, T::one());
        self.trial.y_d.copy_from(&self.curr.y_d);
        self.trial.y_d.axpby(α, &self.delta.y_d, T::one());
        self.trial_tag = self.bump();
    }

    /// Set the trial bound multipliers to `curr + α·Δ`.
    pub fn set_trial_bound_mults_from_step(&mut self, α: T) {
        self.trial.z_l.copy_from(&self.curr.z_l);
        self.trial.z_l.axpby(α, &self.delta.z_l, T::one());
        self.trial.z_u.copy_from(&self.curr.z_u);
        self.trial.z_u.axpby(α, &self.delta.z_u, T::one());
        self.trial.v_l.copy_from(&self.curr.v_l);
        self.trial.v_l.axpby(α, &self.delta.v_l, T::one());
        self.trial.v_u.copy_from(&self.curr.v_u);
        self.trial.v_u.axpby(α, &self.delta.v_u, T::one());
        self.trial_tag = self.bump();
    }

    /// Install a new step direction.
    pub fn set_delta_from(&mut self, step: &DefaultIterate<T>) {
        self.delta.copy_from(step);
        self.delta_tag = self.bump();
    }

    /// Promote the trial iterate to the current iterate.
    pub fn accept_trial_point(&mut self) {
        std::mem::swap(&mut self.curr, &mut self.trial);
        self.curr_tag = self.bump();
        self.curr_x_tag = self.bump();
        self.trial_tag = self.bump();
        self.trial_x_tag = self.bump();
    }

    /// Direct installation of current primal values, used at
    /// initialization and by the restoration phase.  Multipliers are left
    /// to the caller via [`curr_mut`](Self::curr_mut).
    pub fn curr_mut(&mut self) -> &mut DefaultIterate<T> {
        self.curr_tag = self.bump();
        self.curr_x_tag = self.bump();
        &mut self.curr
    }

    /// Append an annotation to the iteration summary string.
    pub fn append_info_string(&mut self, tag: &str) {
        self.info_string.push_str(tag);
    }

    /// Clear the per-iteration diagnostics.
    pub fn reset_info(&mut self) {
        self.info_string.clear();
        self.info_alpha_primal = T::zero();
        self.info_alpha_dual = T::zero();
        self.info_alpha_primal_char = ' ';
        self.info_ls_count = 0;
        self.info_regu_x = T::zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::traits::NonlinearProgram;
    use crate::solver::core::EvalError;

    struct BoxNlp;
    impl NonlinearProgram<f64> for BoxNlp {
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
            0
        }
        fn bounds(&self, x_l: &mut [f64], x_u: &mut [f64], _: &mut [f64], _: &mut [f64]) {
            x_l.fill(0.0);
            x_u.fill(1.0);
        }
        fn starting_point(&self, x: &mut [f64]) {
            x.fill(0.5);
        }
        fn eval_f(&mut self, _: &[f64], _: bool) -> Result<f64, EvalError> {
            Ok(0.0)
        }
        fn eval_grad_f(&mut self, _: &[f64], _: bool, g: &mut [f64]) -> Result<(), EvalError> {
            g.fill(0.0);
            Ok(())
        }
        fn eval_g(&mut self, _: &[f64], _: bool, _: &mut [f64]) -> Result<(), EvalError> {
            Ok(())
        }
        fn jacobian_structure(&self, _: &mut [usize], _: &mut [usize]) {}
        fn eval_jacobian(&mut self, _: &[f64], _: bool, _: &mut [f64]) -> Result<(), EvalError> {
            Ok(())
        }
        fn hessian_structure(&self, _: &mut [usize], _: &mut [usize]) {}
        fn eval_hessian(
            &mut self,
            _: &[f64],
            _: bool,
            _: f64,
            _: &[f64],
            _: &mut [f64],
        ) -> Result<(), EvalError> {
            Ok(())
        }
    }

    #[test]
    fn test_tags_advance_on_writes() {
        let data = DefaultProblemData::new(Box::new(BoxNlp)).unwrap();
        let mut it = DefaultIterateData::<f64>::new(&data);

        let t0 = it.trial_tag();
        it.set_trial_primal_from_step(0.5);
        assert_ne!(it.trial_tag(), t0);

        let c0 = it.curr_tag();
        it.accept_trial_point();
        assert_ne!(it.curr_tag(), c0);

        let m0 = it.mu_tag();
        it.set_mu(0.01);
        assert_ne!(it.mu_tag(), m0);
    }

    #[test]
    fn test_trial_step_values() {
        let data = DefaultProblemData::new(Box::new(BoxNlp)).unwrap();
        let mut it = DefaultIterateData::<f64>::new(&data);

        it.curr_mut().x.copy_from(&[1.0, 2.0]);
        let mut step = DefaultIterate::new(&data);
        step.x.copy_from(&[2.0, -2.0]);
        it.set_delta_from(&step);

        it.set_trial_primal_from_step(0.5);
        assert_eq!(it.trial().x, vec![2.0, 1.0]);
        //current untouched until acceptance
        assert_eq!(it.curr().x, vec![1.0, 2.0]);

        it.accept_trial_point();
        assert_eq!(it.curr().x, vec![2.0, 1.0]);
    }
}
