use super::{DefaultIterate, DefaultIterateData, DefaultProblemData};
use crate::algebra::*;
use crate::solver::core::SolverError;
use crate::solver::implementations::default::iterates::Tag;
use std::rc::Rc;

// ---------------
// Calculated quantities for the default format
// ---------------

/// Shared, immutable cached vector.
pub(crate) type SVec<T> = Rc<Vec<T>>;

/// Cache stamp: the tags of the inputs a quantity was computed from.
/// Unused positions are zero (tag 0 is never issued to a mutable slot
/// after construction writes begin).
type Stamp = (Tag, Tag, Tag);

struct Cached<V> {
    stamp: Option<Stamp>,
    value: V,
}

impl<V> Cached<V> {
    fn new(value: V) -> Self {
        Self { stamp: None, value }
    }

    fn fresh(&self, stamp: Stamp) -> bool {
        self.stamp == Some(stamp)
    }

    fn store(&mut self, stamp: Stamp, value: V) {
        self.stamp = Some(stamp);
        self.value = value;
    }
}

fn svec<T>(v: Vec<T>) -> SVec<T> {
    Rc::new(v)
}

/// On-demand memoization of every derived quantity of the current and
/// trial iterates: objective and constraint values, Jacobian and Hessian
/// values, slacks, barrier objective, constraint violation, directional
/// derivatives, Lagrangian gradients, complementarity residuals and the
/// optimality error.
///
/// Each read compares the stored stamp against the tags of the
/// contributing inputs in [`DefaultIterateData`]; on mismatch the value
/// is recomputed and restamped, so no explicit invalidation calls exist
/// anywhere in the solver.
pub struct DefaultQuantities<T> {
    // raw callback evaluations
    curr_f: Cached<T>,
    trial_f: Cached<T>,
    curr_grad_f: Cached<SVec<T>>,
    curr_g: Cached<SVec<T>>,
    trial_g: Cached<SVec<T>>,
    curr_jac: Cached<SVec<T>>,
    curr_hess: Cached<SVec<T>>,

    // constraint blocks
    curr_c: Cached<SVec<T>>,
    trial_c: Cached<SVec<T>>,
    curr_d: Cached<SVec<T>>,
    trial_d: Cached<SVec<T>>,
    curr_dms: Cached<SVec<T>>,
    trial_dms: Cached<SVec<T>>,

    // slacks to the four bound sets
    curr_sl_xl: Cached<SVec<T>>,
    curr_sl_xu: Cached<SVec<T>>,
    curr_sl_sl: Cached<SVec<T>>,
    curr_sl_su: Cached<SVec<T>>,
    trial_sl_xl: Cached<SVec<T>>,
    trial_sl_xu: Cached<SVec<T>>,
    trial_sl_sl: Cached<SVec<T>>,
    trial_sl_su: Cached<SVec<T>>,

    // scalar merit quantities
    curr_barrier: Cached<T>,
    trial_barrier: Cached<T>,
    curr_theta: Cached<T>,
    trial_theta: Cached<T>,
    curr_gbd: Cached<T>,

    // optimality blocks
    curr_grad_lag_x: Cached<SVec<T>>,
    curr_grad_lag_s: Cached<SVec<T>>,
    compl_xl: Cached<SVec<T>>,
    compl_xu: Cached<SVec<T>>,
    compl_sl: Cached<SVec<T>>,
    compl_su: Cached<SVec<T>>,
}

impl<T: FloatT> DefaultQuantities<T> {
    pub fn new() -> Self {
        Self {
            curr_f: Cached::new(T::zero()),
            trial_f: Cached::new(T::zero()),
            curr_grad_f: Cached::new(svec(vec![])),
            curr_g: Cached::new(svec(vec![])),
            trial_g: Cached::new(svec(vec![])),
            curr_jac: Cached::new(svec(vec![])),
            curr_hess: Cached::new(svec(vec![])),
            curr_c: Cached::new(svec(vec![])),
            trial_c: Cached::new(svec(vec![])),
            curr_d: Cached::new(svec(vec![])),
            trial_d: Cached::new(svec(vec![])),
            curr_dms: Cached::new(svec(vec![])),
            trial_dms: Cached::new(svec(vec![])),
            curr_sl_xl: Cached::new(svec(vec![])),
            curr_sl_xu: Cached::new(svec(vec![])),
            curr_sl_sl: Cached::new(svec(vec![])),
            curr_sl_su: Cached::new(svec(vec![])),
            trial_sl_xl: Cached::new(svec(vec![])),
            trial_sl_xu: Cached::new(svec(vec![])),
            trial_sl_sl: Cached::new(svec(vec![])),
            trial_sl_su: Cached::new(svec(vec![])),
            curr_barrier: Cached::new(T::zero()),
            trial_barrier: Cached::new(T::zero()),
            curr_theta: Cached::new(T::zero()),
            trial_theta: Cached::new(T::zero()),
            curr_gbd: Cached::new(T::zero()),
            curr_grad_lag_x: Cached::new(svec(vec![])),
            curr_grad_lag_s: Cached::new(svec(vec![])),
            compl_xl: Cached::new(svec(vec![])),
            compl_xu: Cached::new(svec(vec![])),
            compl_sl: Cached::new(svec(vec![])),
            compl_su: Cached::new(svec(vec![])),
        }
    }

    // ---- raw evaluations ----

    pub fn curr_f(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<T, SolverError> {
        let stamp = (it.curr_x_tag(), 0, 0);
        if !self.curr_f.fresh(stamp) {
            let v = data.nlp.eval_f(&it.curr().x, true)?;
            self.curr_f.store(stamp, v);
        }
        Ok(self.curr_f.value)
    }

    pub fn trial_f(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<T, SolverError> {
        let stamp = (it.trial_x_tag(), 0, 0);
        if !self.trial_f.fresh(stamp) {
            let v = data.nlp.eval_f(&it.trial().x, true)?;
            self.trial_f.store(stamp, v);
        }
        Ok(self.trial_f.value)
    }

    pub fn curr_grad_f(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<SVec<T>, SolverError> {
        let stamp = (it.curr_x_tag(), 0, 0);
        if !self.curr_grad_f.fresh(stamp) {
            let mut g = vec![T::zero(); data.n];
            data.nlp.eval_grad_f(&it.curr().x, true, &mut g)?;
            self.curr_grad_f.store(stamp, svec(g));
        }
        Ok(self.curr_grad_f.value.clone())
    }

    fn curr_g(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<SVec<T>, SolverError> {
        let stamp = (it.curr_x_tag(), 0, 0);
        if !self.curr_g.fresh(stamp) {
            let mut g = vec![T::zero(); data.m];
            data.nlp.eval_g(&it.curr().x, true, &mut g)?;
            self.curr_g.store(stamp, svec(g));
        }
        Ok(self.curr_g.value.clone())
    }

    fn trial_g(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<SVec<T>, SolverError> {
        let stamp = (it.trial_x_tag(), 0, 0);
        if !self.trial_g.fresh(stamp) {
            let mut g = vec![T::zero(); data.m];
            data.nlp.eval_g(&it.trial().x, true, &mut g)?;
            self.trial_g.store(stamp, svec(g));
        }
        Ok(self.trial_g.value.clone())
    }

    pub fn curr_jac(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<SVec<T>, SolverError> {
        let stamp = (it.curr_x_tag(), 0, 0);
        if !self.curr_jac.fresh(stamp) {
            let mut v = vec![T::zero(); data.jacobian_nnz()];
            data.nlp.eval_jacobian(&it.curr().x, true, &mut v)?;
            self.curr_jac.store(stamp, svec(v));
        }
        Ok(self.curr_jac.value.clone())
    }

    /// Hessian of the Lagrangian at the current point, using the current
    /// equality multipliers.  The callback evaluates σ·∇²f + Σᵢ λᵢ∇²gᵢ;
    /// with the sign convention L = f − yᵀg this is called with λ = −y.
    pub fn curr_hess(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<SVec<T>, SolverError> {
        let stamp = (it.curr_tag(), 0, 0);
        if !self.curr_hess.fresh(stamp) {
            let mut λ = data.full_multipliers(&it.curr().y_c, &it.curr().y_d);
            λ.negate();
            let mut v = vec![T::zero(); data.hess_rows.len()];
            data.nlp
                .eval_hessian(&it.curr().x, true, T::one(), &λ, &mut v)?;
            self.curr_hess.store(stamp, svec(v));
        }
        Ok(self.curr_hess.value.clone())
    }

    // ---- constraint blocks ----

    pub fn curr_c(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<SVec<T>, SolverError> {
        let stamp = (it.curr_x_tag(), 0, 0);
        if !self.curr_c.fresh(stamp) {
            let g = self.curr_g(data, it)?;
            let c = eq_residual(data, &g);
            self.curr_c.store(stamp, svec(c));
        }
        Ok(self.curr_c.value.clone())
    }

    pub fn trial_c(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<SVec<T>, SolverError> {
        let stamp = (it.trial_x_tag(), 0, 0);
        if !self.trial_c.fresh(stamp) {
            let g = self.trial_g(data, it)?;
            let c = eq_residual(data, &g);
            self.trial_c.store(stamp, svec(c));
        }
        Ok(self.trial_c.value.clone())
    }

    pub fn curr_d(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<SVec<T>, SolverError> {
        let stamp = (it.curr_x_tag(), 0, 0);
        if !self.curr_d.fresh(stamp) {
            let g = self.curr_g(data, it)?;
            let d: Vec<T> = data.ineq_rows.iter().map(|&r| g[r]).collect();
            self.curr_d.store(stamp, svec(d));
        }
        Ok(self.curr_d.value.clone())
    }

    pub fn trial_d(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<SVec<T>, SolverError> {
        let stamp = (it.trial_x_tag(), 0, 0);
        if !self.trial_d.fresh(stamp) {
            let g = self.trial_g(data, it)?;
            let d: Vec<T> = data.ineq_rows.iter().map(|&r| g[r]).collect();
            self.trial_d.store(stamp, svec(d));
        }
        Ok(self.trial_d.value.clone())
    }

    pub fn curr_d_minus_s(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<SVec<T>, SolverError> {
        let stamp = (it.curr_tag(), 0, 0);
        if !self.curr_dms.fresh(stamp) {
            let d = self.curr_d(data, it)?;
            let mut dms = (*d).clone();
            dms.axpby(-T::one(), &it.curr().s, T::one());
            self.curr_dms.store(stamp, svec(dms));
        }
        Ok(self.curr_dms.value.clone())
    }

    pub fn trial_d_minus_s(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<SVec<T>, SolverError> {
        let stamp = (it.trial_tag(), 0, 0);
        if !self.trial_dms.fresh(stamp) {
            let d = self.trial_d(data, it)?;
            let mut dms = (*d).clone();
            dms.axpby(-T::one(), &it.trial().s, T::one());
            self.trial_dms.store(stamp, svec(dms));
        }
        Ok(self.trial_dms.value.clone())
    }

    // ---- slacks; these never require callback evaluations ----

    pub fn curr_slack_x_l(
        &mut self,
        data: &DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> SVec<T> {
        let stamp = (it.curr_x_tag(), 0, 0);
        if !self.curr_sl_xl.fresh(stamp) {
            let v = lower_slacks(&data.map_x_l, &it.curr().x, &data.x_l);
            self.curr_sl_xl.store(stamp, svec(v));
        }
        self.curr_sl_xl.value.clone()
    }

    pub fn curr_slack_x_u(
        &mut self,
        data: &DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> SVec<T> {
        let stamp = (it.curr_x_tag(), 0, 0);
        if !self.curr_sl_xu.fresh(stamp) {
            let v = upper_slacks(&data.map_x_u, &it.curr().x, &data.x_u);
            self.curr_sl_xu.store(stamp, svec(v));
        }
        self.curr_sl_xu.value.clone()
    }

    pub fn curr_slack_s_l(
        &mut self,
        data: &DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> SVec<T> {
        let stamp = (it.curr_tag(), 0, 0);
        if !self.curr_sl_sl.fresh(stamp) {
            let v = lower_slacks(&data.map_d_l, &it.curr().s, &data.d_l);
            self.curr_sl_sl.store(stamp, svec(v));
        }
        self.curr_sl_sl.value.clone()
    }

    pub fn curr_slack_s_u(
        &mut self,
        data: &DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> SVec<T> {
        let stamp = (it.curr_tag(), 0, 0);
        if !self.curr_sl_su.fresh(stamp) {
            let v = upper_slacks(&data.map_d_u, &it.curr().s, &data.d_u);
            self.curr_sl_su.store(stamp, svec(v));
        }
        self.curr_sl_su.value.clone()
    }

    fn trial_slack_x_l(
        &mut self,
        data: &DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> SVec<T> {
        let stamp = (it.trial_x_tag(), 0, 0);
        if !self.trial_sl_xl.fresh(stamp) {
            let v = lower_slacks(&data.map_x_l, &it.trial().x, &data.x_l);
            self.trial_sl_xl.store(stamp, svec(v));
        }
        self.trial_sl_xl.value.clone()
    }

    fn trial_slack_x_u(
        &mut self,
        data: &DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> SVec<T> {
        let stamp = (it.trial_x_tag(), 0, 0);
        if !self.trial_sl_xu.fresh(stamp) {
            let v = upper_slacks(&data.map_x_u, &it.trial().x, &data.x_u);
            self.trial_sl_xu.store(stamp, svec(v));
        }
        self.trial_sl_xu.value.clone()
    }

    fn trial_slack_s_l(
        &mut self,
        data: &DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> SVec<T> {
        let stamp = (it.trial_tag(), 0, 0);
        if !self.trial_sl_sl.fresh(stamp) {
            let v = lower_slacks(&data.map_d_l, &it.trial().s, &data.d_l);
            self.trial_sl_sl.store(stamp, svec(v));
        }
        self.trial_sl_sl.value.clone()
    }

    fn trial_slack_s_u(
        &mut self,
        data: &DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> SVec<T> {
        let stamp = (it.trial_tag(), 0, 0);
        if !self.trial_sl_su.fresh(stamp) {
            let v = upper_slacks(&data.map_d_u, &it.trial().s, &data.d_u);
            self.trial_sl_su.store(stamp, svec(v));
        }
        self.trial_sl_su.value.clone()
    }

    // ---- merit quantities ----

    /// Barrier objective φ_μ at the current iterate.
    pub fn curr_barrier_obj(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<T, SolverError> {
        let stamp = (it.curr_tag(), it.mu_tag(), 0);
        if !self.curr_barrier.fresh(stamp) {
            let f = self.curr_f(data, it)?;
            let μ = it.mu();
            let mut φ = f;
            φ += barrier_sum(μ, &self.curr_slack_x_l(data, it));
            φ += barrier_sum(μ, &self.curr_slack_x_u(data, it));
            φ += barrier_sum(μ, &self.curr_slack_s_l(data, it));
            φ += barrier_sum(μ, &self.curr_slack_s_u(data, it));
            self.curr_barrier.store(stamp, φ);
        }
        Ok(self.curr_barrier.value)
    }

    /// Barrier objective φ_μ at the trial iterate.  Returns +∞ when the
    /// trial point touches or crosses a bound.
    pub fn trial_barrier_obj(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<T, SolverError> {
        let stamp = (it.trial_tag(), it.mu_tag(), 0);
        if !self.trial_barrier.fresh(stamp) {
            let f = self.trial_f(data, it)?;
            let μ = it.mu();
            let mut φ = f;
            φ += barrier_sum(μ, &self.trial_slack_x_l(data, it));
            φ += barrier_sum(μ, &self.trial_slack_x_u(data, it));
            φ += barrier_sum(μ, &self.trial_slack_s_l(data, it));
            φ += barrier_sum(μ, &self.trial_slack_s_u(data, it));
            self.trial_barrier.store(stamp, φ);
        }
        Ok(self.trial_barrier.value)
    }

    /// Constraint violation θ = ‖(c, d−s)‖_∞ at the current iterate.
    pub fn curr_constraint_violation(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<T, SolverError> {
        let stamp = (it.curr_tag(), 0, 0);
        if !self.curr_theta.fresh(stamp) {
            let c = self.curr_c(data, it)?;
            let dms = self.curr_d_minus_s(data, it)?;
            let θ = T::max(c.norm_inf(), dms.norm_inf());
            self.curr_theta.store(stamp, θ);
        }
        Ok(self.curr_theta.value)
    }

    /// Constraint violation at the trial iterate.
    pub fn trial_constraint_violation(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<T, SolverError> {
        let stamp = (it.trial_tag(), 0, 0);
        if !self.trial_theta.fresh(stamp) {
            let c = self.trial_c(data, it)?;
            let dms = self.trial_d_minus_s(data, it)?;
            let θ = T::max(c.norm_inf(), dms.norm_inf());
            self.trial_theta.store(stamp, θ);
        }
        Ok(self.trial_theta.value)
    }

    /// Directional derivative ∇φ_μᵀΔ of the barrier objective along the
    /// current step direction.
    pub fn curr_grad_barr_t_delta(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<T, SolverError> {
        let stamp = (it.curr_tag(), it.delta_tag(), it.mu_tag());
        if !self.curr_gbd.fresh(stamp) {
            let gf = self.curr_grad_f(data, it)?;
            let μ = it.mu();
            let Δ = it.delta();

            let mut gbd = gf.dot(&Δ.x);
            gbd += barrier_dir_lower(μ, &self.curr_slack_x_l(data, it), &data.map_x_l, &Δ.x);
            gbd += barrier_dir_upper(μ, &self.curr_slack_x_u(data, it), &data.map_x_u, &Δ.x);
            gbd += barrier_dir_lower(μ, &self.curr_slack_s_l(data, it), &data.map_d_l, &Δ.s);
            gbd += barrier_dir_upper(μ, &self.curr_slack_s_u(data, it), &data.map_d_u, &Δ.s);
            self.curr_gbd.store(stamp, gbd);
        }
        Ok(self.curr_gbd.value)
    }

    // ---- optimality blocks ----

    /// x component of the Lagrangian gradient,
    /// ∇f − J_cᵀy_c − J_dᵀy_d − P_{x_L}z_L + P_{x_U}z_U.
    pub fn curr_grad_lag_x(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<SVec<T>, SolverError> {
        let stamp = (it.curr_tag(), 0, 0);
        if !self.curr_grad_lag_x.fresh(stamp) {
            let gf = self.curr_grad_f(data, it)?;
            let jv = self.curr_jac(data, it)?;
            let iterate = it.curr();

            let mut out = (*gf).clone();
            data.jac_c_tmul(&jv, &iterate.y_c, -T::one(), &mut out);
            data.jac_d_tmul(&jv, &iterate.y_d, -T::one(), &mut out);
            data.map_x_l.scatter_add(&iterate.z_l, -T::one(), &mut out);
            data.map_x_u.scatter_add(&iterate.z_u, T::one(), &mut out);
            self.curr_grad_lag_x.store(stamp, svec(out));
        }
        Ok(self.curr_grad_lag_x.value.clone())
    }

    /// s component of the Lagrangian gradient,
    /// y_d − P_{d_L}v_L + P_{d_U}v_U.
    pub fn curr_grad_lag_s(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<SVec<T>, SolverError> {
        let stamp = (it.curr_tag(), 0, 0);
        if !self.curr_grad_lag_s.fresh(stamp) {
            let iterate = it.curr();
            let mut out = iterate.y_d.clone();
            data.map_d_l.scatter_add(&iterate.v_l, -T::one(), &mut out);
            data.map_d_u.scatter_add(&iterate.v_u, T::one(), &mut out);
            self.curr_grad_lag_s.store(stamp, svec(out));
        }
        Ok(self.curr_grad_lag_s.value.clone())
    }

    /// Relaxed complementarity residuals (slack ∘ multiplier − μ) for the
    /// four bound sets, in the order x_L, x_U, s_L, s_U.
    pub fn curr_relaxed_compl(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> [SVec<T>; 4] {
        let stamp = (it.curr_tag(), it.mu_tag(), 0);
        let μ = it.mu();
        if !self.compl_xl.fresh(stamp) {
            let v = compl_residual(&self.curr_slack_x_l(data, it), &it.curr().z_l, μ);
            self.compl_xl.store(stamp, svec(v));
        }
        if !self.compl_xu.fresh(stamp) {
            let v = compl_residual(&self.curr_slack_x_u(data, it), &it.curr().z_u, μ);
            self.compl_xu.store(stamp, svec(v));
        }
        if !self.compl_sl.fresh(stamp) {
            let v = compl_residual(&self.curr_slack_s_l(data, it), &it.curr().v_l, μ);
            self.compl_sl.store(stamp, svec(v));
        }
        if !self.compl_su.fresh(stamp) {
            let v = compl_residual(&self.curr_slack_s_u(data, it), &it.curr().v_u, μ);
            self.compl_su.store(stamp, svec(v));
        }
        [
            self.compl_xl.value.clone(),
            self.compl_xu.value.clone(),
            self.compl_sl.value.clone(),
            self.compl_su.value.clone(),
        ]
    }

    /// Primal infeasibility in the max norm; identical to θ.
    pub fn curr_primal_infeasibility(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<T, SolverError> {
        self.curr_constraint_violation(data, it)
    }

    /// Dual infeasibility in the max norm.
    pub fn curr_dual_infeasibility(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
    ) -> Result<T, SolverError> {
        let glx = self.curr_grad_lag_x(data, it)?;
        let gls = self.curr_grad_lag_s(data, it)?;
        Ok(T::max(glx.norm_inf(), gls.norm_inf()))
    }

    /// Scaled optimality error E_μ of the barrier problem, using the
    /// multiplier-size safeguards s_d and s_c.  Called with μ = 0 this is
    /// the convergence test for the original problem.
    pub fn optimality_error(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
        μ: T,
        s_max: T,
    ) -> Result<T, SolverError> {
        let dual_inf = self.curr_dual_infeasibility(data, it)?;
        let primal_inf = self.curr_primal_infeasibility(data, it)?;

        let iterate = it.curr();
        let n_bound = iterate.z_l.len() + iterate.z_u.len() + iterate.v_l.len() + iterate.v_u.len();
        let bound_mult_sum = iterate.z_l.norm_one()
            + iterate.z_u.norm_one()
            + iterate.v_l.norm_one()
            + iterate.v_u.norm_one();
        let eq_mult_sum = iterate.y_c.norm_one() + iterate.y_d.norm_one();
        let n_dual = iterate.y_c.len() + iterate.y_d.len() + n_bound;

        let s_d = T::max(s_max, (eq_mult_sum + bound_mult_sum) / (n_dual.max(1)).as_T()) / s_max;
        let s_c = T::max(s_max, bound_mult_sum / (n_bound.max(1)).as_T()) / s_max;

        // complementarity residual against the target μ
        let mut compl = T::zero();
        let slacks = [
            self.curr_slack_x_l(data, it),
            self.curr_slack_x_u(data, it),
            self.curr_slack_s_l(data, it),
            self.curr_slack_s_u(data, it),
        ];
        let iterate = it.curr();
        let mults = [&iterate.z_l, &iterate.z_u, &iterate.v_l, &iterate.v_u];
        for (sl, mult) in slacks.iter().zip(mults) {
            for (&sl, &m) in sl.iter().zip(mult.iter()) {
                compl = T::max(compl, (sl * m - μ).abs());
            }
        }

        Ok(T::max(T::max(dual_inf / s_d, primal_inf), compl / s_c))
    }

    // ---- fraction-to-the-boundary rules ----

    /// Largest α ∈ (0, 1] keeping the primal trial strictly inside the
    /// bounds: slack + α·Δslack ≥ (1 − τ)·slack for all four bound sets.
    pub fn primal_frac_to_the_bound(
        &mut self,
        data: &DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
        τ: T,
        step: &DefaultIterate<T>,
    ) -> T {
        let mut α = T::one();
        α = ftb_lower(α, τ, &self.curr_slack_x_l(data, it), &data.map_x_l, &step.x);
        α = ftb_upper(α, τ, &self.curr_slack_x_u(data, it), &data.map_x_u, &step.x);
        α = ftb_lower(α, τ, &self.curr_slack_s_l(data, it), &data.map_d_l, &step.s);
        α = ftb_upper(α, τ, &self.curr_slack_s_u(data, it), &data.map_d_u, &step.s);
        α
    }

    /// Largest α ∈ (0, 1] keeping the bound multipliers strictly
    /// positive: m + α·Δm ≥ (1 − τ)·m.
    pub fn dual_frac_to_the_bound(
        &self,
        it: &DefaultIterateData<T>,
        τ: T,
        step: &DefaultIterate<T>,
    ) -> T {
        let iterate = it.curr();
        let mut α = T::one();
        α = ftb_direct(α, τ, &iterate.z_l, &step.z_l);
        α = ftb_direct(α, τ, &iterate.z_u, &step.z_u);
        α = ftb_direct(α, τ, &iterate.v_l, &step.v_l);
        α = ftb_direct(α, τ, &iterate.v_u, &step.v_u);
        α
    }
}

impl<T: FloatT> Default for DefaultQuantities<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------
// free helper functions
// ---------------------------------------------------------

fn eq_residual<T: FloatT>(data: &DefaultProblemData<T>, g: &[T]) -> Vec<T> {
    data.eq_rows
        .iter()
        .zip(&data.c_rhs)
        .map(|(&r, &b)| g[r] - b)
        .collect()
}

fn lower_slacks<T: FloatT>(map: &ExpansionMap, v: &[T], bound: &[T]) -> Vec<T> {
    map.indices().iter().map(|&i| v[i] - bound[i]).collect()
}

fn upper_slacks<T: FloatT>(map: &ExpansionMap, v: &[T], bound: &[T]) -> Vec<T> {
    map.indices().iter().map(|&i| bound[i] - v[i]).collect()
}

fn compl_residual<T: FloatT>(sl: &[T], mult: &[T], μ: T) -> Vec<T> {
    sl.iter().zip(mult).map(|(&s, &m)| s * m - μ).collect()
}

/// −μ Σ ln(slᵢ); +∞ if any slack is nonpositive.
fn barrier_sum<T: FloatT>(μ: T, sl: &[T]) -> T {
    let mut sum = T::zero();
    for &s in sl {
        if s <= T::zero() {
            return T::infinity();
        }
        sum += s.ln();
    }
    -μ * sum
}

/// Contribution −μ Σ Δᵢ/slᵢ of a lower bound set to ∇φᵀΔ.
fn barrier_dir_lower<T: FloatT>(μ: T, sl: &[T], map: &ExpansionMap, Δfull: &[T]) -> T {
    let mut sum = T::zero();
    for (&sl, &i) in sl.iter().zip(map.indices()) {
        sum += Δfull[i] / sl;
    }
    -μ * sum
}

/// Contribution +μ Σ Δᵢ/slᵢ of an upper bound set to ∇φᵀΔ.
fn barrier_dir_upper<T: FloatT>(μ: T, sl: &[T], map: &ExpansionMap, Δfull: &[T]) -> T {
    let mut sum = T::zero();
    for (&sl, &i) in sl.iter().zip(map.indices()) {
        sum += Δfull[i] / sl;
    }
    μ * sum
}

fn ftb_lower<T: FloatT>(mut α: T, τ: T, sl: &[T], map: &ExpansionMap, Δfull: &[T]) -> T {
    for (&sl, &i) in sl.iter().zip(map.indices()) {
        let δ = Δfull[i];
        if δ < T::zero() {
            α = T::min(α, -τ * sl / δ);
        }
    }
    α
}

fn ftb_upper<T: FloatT>(mut α: T, τ: T, sl: &[T], map: &ExpansionMap, Δfull: &[T]) -> T {
    for (&sl, &i) in sl.iter().zip(map.indices()) {
        let δ = -Δfull[i];
        if δ < T::zero() {
            α = T::min(α, -τ * sl / δ);
        }
    }
    α
}

fn ftb_direct<T: FloatT>(mut α: T, τ: T, v: &[T], Δ: &[T]) -> T {
    for (&v, &δ) in v.iter().zip(Δ) {
        if δ < T::zero() {
            α = T::min(α, -τ * v / δ);
        }
    }
    α
}
