use super::pdsystem::PDRhs;
use super::{
    DefaultIterate, DefaultIterateData, DefaultPDSystem, DefaultProblemData, DefaultQuantities,
    DefaultSettings, Filter, RestorationPhase,
};
use crate::algebra::*;
use crate::solver::core::journalist::{jprint, Journalist};
use crate::solver::core::SolverError;

// ---------------
// Filter line search
// ---------------

/// How a line search ended: by accepting a trial point into the trial
/// slot, or by a restoration phase installing a new current iterate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineSearchOutcome {
    Accepted,
    Restored,
}

/// Backtracking line search globalized by a filter.
///
/// A trial point must pass either an Armijo test on the barrier objective
/// (when the step is an f-type step and the violation is already small)
/// or a sufficient reduction test against the current iterate, and must
/// additionally be acceptable to the filter.  When the first trial raises
/// the constraint violation, a second order correction recomputes the
/// step against corrected equality residuals before the step size is
/// shortened.  If no acceptable step size remains, the restoration phase
/// takes over.
pub struct FilterLineSearch<T> {
    filter: Filter<T>,
    θ_min: Option<T>,
    θ_max: Option<T>,
    resto_phase: Option<Box<dyn RestorationPhase<T>>>,
}

impl<T: FloatT> FilterLineSearch<T> {
    pub fn new(resto_phase: Option<Box<dyn RestorationPhase<T>>>) -> Self {
        Self {
            filter: Filter::new(),
            θ_min: None,
            θ_max: None,
            resto_phase,
        }
    }

    /// Forget the filter contents, e.g. after a barrier parameter
    /// update.  The lazily initialized violation gates θ_min and θ_max
    /// are kept for the life of the filter.
    pub fn reset(&mut self) {
        self.filter.clear();
    }

    pub fn filter(&self) -> &Filter<T> {
        &self.filter
    }

    /// Backtrack from the fraction-to-the-boundary step until a trial
    /// point is acceptable, then install the trial multipliers.
    pub(crate) fn find_acceptable_trial_point(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &mut DefaultIterateData<T>,
        qty: &mut DefaultQuantities<T>,
        pd: &mut DefaultPDSystem<T>,
        settings: &DefaultSettings<T>,
        jnlst: &Journalist,
    ) -> Result<LineSearchOutcome, SolverError> {
        jprint!(
            jnlst,
            Detailed,
            LineSearch,
            "--> starting filter line search in iteration {} <--\n",
            it.iter_count
        );

        let τ = it.tau;
        let α_min = self.calculate_alpha_min(data, it, qty, settings)?;
        jprint!(
            jnlst,
            Detailed,
            LineSearch,
            "minimal step size alpha_min = {:e}\n",
            α_min
        );

        let α_max = qty.primal_frac_to_the_bound(data, it, τ, it.delta());
        let mut α = α_max;
        // step size used in the f-type and Armijo predicates; stays at the
        // backtracking value even when a second order correction replaces
        // the trial point
        let mut α_test = α;

        self.filter.print(jnlst);

        let mut accept = false;
        let mut soc_taken = false;
        let mut n_steps: u32 = 0;
        let mut soc_delta = DefaultIterate::new(data);

        // always allow the first trial at α_max, even if α_max <= α_min
        while α > α_min || n_steps == 0 {
            jprint!(
                jnlst,
                Detailed,
                LineSearch,
                "starting checks for alpha (primal) = {:e}\n",
                α
            );
            α_test = α;

            it.set_trial_primal_from_step(α);
            accept = match self.evaluate_trial(data, it, qty, settings, jnlst, α_test) {
                Ok(ok) => ok,
                Err(SolverError::Eval(e)) => {
                    jprint!(
                        jnlst,
                        Summary,
                        Main,
                        "warning: cutting back alpha due to evaluation error ({})\n",
                        e
                    );
                    false
                }
                Err(e) => return Err(e),
            };
            if accept {
                break;
            }

            // try a second order correction on the first trial when the
            // violation did not decrease
            if α == α_max && settings.max_soc > 0 {
                let θ_cur = qty.curr_constraint_violation(data, it)?;
                let θ_trial = match qty.trial_constraint_violation(data, it) {
                    Ok(v) => Some(v),
                    Err(SolverError::Eval(_)) => None,
                    Err(e) => return Err(e),
                };
                if θ_trial.map_or(false, |θ_trial| θ_cur <= θ_trial) {
                    accept = self.second_order_correction(
                        data, it, qty, pd, settings, jnlst, τ, α_test, &mut α, &mut soc_delta,
                    )?;
                    if accept {
                        soc_taken = true;
                        break;
                    }
                }
            }

            α *= settings.alpha_red_factor;
            n_steps += 1;
        }

        if !accept {
            // the step size cannot be reduced further; hand over to the
            // restoration phase
            it.info_alpha_primal = α;
            it.info_ls_count = n_steps + 1;
            self.request_restoration(data, it, qty, settings, jnlst)?;
            return Ok(LineSearchOutcome::Restored);
        }

        // the step character records which acceptance branch applied; the
        // filter is augmented whenever the Armijo branch did not
        let is_ftype = self.is_ftype(data, it, qty, settings, α_test)?;
        let armijo = is_ftype && self.armijo_holds(data, it, qty, settings, α_test)?;
        let mut flag = if armijo {
            'f'
        } else {
            self.augment_filter(data, it, qty, settings, jnlst)?;
            'h'
        };
        if soc_taken {
            flag = flag.to_ascii_uppercase();
            it.count_soc_steps += 1;
        }
        it.info_alpha_primal_char = flag;
        it.info_ls_count = n_steps + 1;

        // from here on the accepted correction is the step of record
        if soc_taken {
            it.set_delta_from(&soc_delta);
        }

        // dual fraction-to-the-boundary rule for the multiplier steps;
        // the dual step size may differ from the primal one
        it.set_trial_eq_mults_from_step(α);
        let α_dual = qty.dual_frac_to_the_bound(it, τ, it.delta());
        it.set_trial_bound_mults_from_step(α_dual);

        it.info_alpha_primal = α;
        it.info_alpha_dual = α_dual;

        Ok(LineSearchOutcome::Accepted)
    }

    /// Invoke the restoration phase, e.g. because the line search ran
    /// out of step sizes or the KKT factorization failed at the
    /// regularization cap.  Errors with the fatal
    /// [`RestorationFailure`](SolverError::RestorationFailure) when no
    /// collaborator is configured or the collaborator cannot make the
    /// iterate less infeasible.
    pub(crate) fn request_restoration(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &mut DefaultIterateData<T>,
        qty: &mut DefaultQuantities<T>,
        settings: &DefaultSettings<T>,
        jnlst: &Journalist,
    ) -> Result<(), SolverError> {
        it.info_alpha_dual = T::zero();
        it.info_alpha_primal_char = 'R';

        let resto = self
            .resto_phase
            .as_mut()
            .ok_or(SolverError::RestorationFailure)?;
        let restored = resto.perform_restoration(data, it, qty, settings, jnlst)?;
        if !restored {
            return Err(SolverError::RestorationFailure);
        }
        it.count_restorations += 1;
        Ok(())
    }

    /// Form the trial point extras (magic step) and run the
    /// acceptability checks.  An `Eval` error from any trial evaluation
    /// propagates to the caller, which treats it as a rejection.
    fn evaluate_trial(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &mut DefaultIterateData<T>,
        qty: &mut DefaultQuantities<T>,
        settings: &DefaultSettings<T>,
        jnlst: &Journalist,
        α_test: T,
    ) -> Result<bool, SolverError> {
        if settings.magic_steps {
            self.perform_magic_step(data, it, qty, jnlst)?;
        }
        self.check_acceptability(data, it, qty, settings, jnlst, α_test)
    }

    /// The acceptability predicate suite of the filter method.
    fn check_acceptability(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &mut DefaultIterateData<T>,
        qty: &mut DefaultQuantities<T>,
        settings: &DefaultSettings<T>,
        jnlst: &Journalist,
        α_test: T,
    ) -> Result<bool, SolverError> {
        let φ_cur = qty.curr_barrier_obj(data, it)?;
        let θ_cur = qty.curr_constraint_violation(data, it)?;
        let θ_trial = qty.trial_constraint_violation(data, it)?;

        // the violation gates are frozen from the first observed iterate
        let θ_max = *self
            .θ_max
            .get_or_insert(settings.theta_max_fact * T::max(T::one(), θ_cur));
        let θ_min = *self
            .θ_min
            .get_or_insert(settings.theta_min_fact * T::max(T::one(), θ_cur));

        if θ_trial > θ_max {
            return Ok(false);
        }

        let φ_trial = qty.trial_barrier_obj(data, it)?;
        jprint!(
            jnlst,
            Detailed,
            LineSearch,
            "checking acceptability for trial step size alpha_primal_test = {:13.6e}:\n",
            α_test
        );
        jprint!(
            jnlst,
            Detailed,
            LineSearch,
            "  new values of barrier function     = {:23.16e}  (current {:23.16e})\n",
            φ_trial,
            φ_cur
        );
        jprint!(
            jnlst,
            Detailed,
            LineSearch,
            "  new values of constraint violation = {:23.16e}  (current {:23.16e})\n",
            θ_trial,
            θ_cur
        );

        let accept = if self.is_ftype(data, it, qty, settings, α_test)? && θ_cur <= θ_min {
            jprint!(jnlst, Detailed, LineSearch, "checking Armijo condition\n");
            self.armijo_holds(data, it, qty, settings, α_test)?
        } else {
            jprint!(jnlst, Detailed, LineSearch, "checking sufficient reduction\n");
            self.acceptable_to_current_iterate(φ_trial, θ_trial, φ_cur, θ_cur, settings, jnlst)
        };
        if !accept {
            jprint!(jnlst, Detailed, LineSearch, "failed\n");
            return Ok(false);
        }

        jprint!(jnlst, Detailed, LineSearch, "checking filter acceptability\n");
        let accept = self.filter.acceptable(φ_trial, θ_trial);
        if !accept {
            jprint!(jnlst, Detailed, LineSearch, "failed\n");
        }
        Ok(accept)
    }

    /// An f-type step predicts a decrease of the barrier objective that
    /// dominates the current constraint violation, so an Armijo test on
    /// φ is meaningful.
    fn is_ftype(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
        qty: &mut DefaultQuantities<T>,
        settings: &DefaultSettings<T>,
        α_test: T,
    ) -> Result<bool, SolverError> {
        let gbd = qty.curr_grad_barr_t_delta(data, it)?;
        let θ_cur = qty.curr_constraint_violation(data, it)?;
        Ok(gbd < T::zero()
            && α_test * T::powf(-gbd, settings.s_phi)
                > settings.delta * T::powf(θ_cur, settings.s_theta))
    }

    fn armijo_holds(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
        qty: &mut DefaultQuantities<T>,
        settings: &DefaultSettings<T>,
        α_test: T,
    ) -> Result<bool, SolverError> {
        let φ_cur = qty.curr_barrier_obj(data, it)?;
        let φ_trial = qty.trial_barrier_obj(data, it)?;
        let gbd = qty.curr_grad_barr_t_delta(data, it)?;
        Ok(compare_le(
            φ_trial - φ_cur,
            settings.eta_phi * α_test * gbd,
            φ_cur,
        ))
    }

    /// Sufficient reduction with respect to the current iterate: either
    /// measure improves by its margin.  Rejects outright when the barrier
    /// objective increases by too many orders of magnitude.
    fn acceptable_to_current_iterate(
        &self,
        φ_trial: T,
        θ_trial: T,
        φ_cur: T,
        θ_cur: T,
        settings: &DefaultSettings<T>,
        jnlst: &Journalist,
    ) -> bool {
        if φ_trial > φ_cur {
            let ten = (10.0).as_T();
            let basval = if φ_cur.abs() > ten {
                φ_cur.abs().log10()
            } else {
                T::one()
            };
            if (φ_trial - φ_cur).log10() > settings.obj_max_inc * basval {
                jprint!(
                    jnlst,
                    Detailed,
                    LineSearch,
                    "rejecting trial point; barrier objective increasing too rapidly (from {:e} to {:e})\n",
                    φ_cur,
                    φ_trial
                );
                return false;
            }
        }

        compare_le(θ_trial, (T::one() - settings.gamma_theta) * θ_cur, θ_cur)
            || compare_le(φ_trial - φ_cur, -settings.gamma_phi * θ_cur, φ_cur)
    }

    /// Smallest step size the backtracking loop will try before giving
    /// up and requesting restoration.
    fn calculate_alpha_min(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
        qty: &mut DefaultQuantities<T>,
        settings: &DefaultSettings<T>,
    ) -> Result<T, SolverError> {
        let gbd = qty.curr_grad_barr_t_delta(data, it)?;
        let θ_cur = qty.curr_constraint_violation(data, it)?;

        let mut α_min = settings.gamma_theta;
        if gbd < T::zero() {
            α_min = T::min(settings.gamma_theta, settings.gamma_phi * θ_cur / (-gbd));
            if let Some(θ_min) = self.θ_min {
                if θ_cur <= θ_min {
                    α_min = T::min(
                        α_min,
                        settings.delta * T::powf(θ_cur, settings.s_theta)
                            / T::powf(-gbd, settings.s_phi),
                    );
                }
            }
        }
        Ok(settings.alpha_min_frac * α_min)
    }

    /// Add the current pair, shrunk by the filter margins, so the method
    /// cannot return to this neighborhood.
    fn augment_filter(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
        qty: &mut DefaultQuantities<T>,
        settings: &DefaultSettings<T>,
        jnlst: &Journalist,
    ) -> Result<(), SolverError> {
        let φ_cur = qty.curr_barrier_obj(data, it)?;
        let θ_cur = qty.curr_constraint_violation(data, it)?;

        let φ_add = φ_cur - settings.gamma_phi * θ_cur;
        let θ_add = (T::one() - settings.gamma_theta) * θ_cur;
        jprint!(
            jnlst,
            Detailed,
            LineSearch,
            "augmenting filter with ({:e}, {:e})\n",
            φ_add,
            θ_add
        );
        self.filter.add(φ_add, θ_add, it.iter_count);
        Ok(())
    }

    /// The second order correction loop: re-solve the PD system with
    /// accumulated equality residuals evaluated at the failed trial
    /// point, keeping the original left hand side, until the corrected
    /// trial is acceptable or the violation stops contracting.
    #[allow(clippy::too_many_arguments)]
    fn second_order_correction(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &mut DefaultIterateData<T>,
        qty: &mut DefaultQuantities<T>,
        pd: &mut DefaultPDSystem<T>,
        settings: &DefaultSettings<T>,
        jnlst: &Journalist,
        τ: T,
        α_test: T,
        α: &mut T,
        soc_delta: &mut DefaultIterate<T>,
    ) -> Result<bool, SolverError> {
        let θ_cur = qty.curr_constraint_violation(data, it)?;

        // right hand side blocks at the current iterate; only the
        // equality residual blocks change between corrections
        let glx = qty.curr_grad_lag_x(data, it)?;
        let gls = qty.curr_grad_lag_s(data, it)?;
        let [cxl, cxu, csl, csu] = qty.curr_relaxed_compl(data, it);

        let mut c_soc = (*qty.curr_c(data, it)?).clone();
        let mut dms_soc = (*qty.curr_d_minus_s(data, it)?).clone();

        let mut α_soc = *α;
        let mut θ_soc_old = T::zero();
        let mut θ_trial = T::zero();
        let mut count_soc: u32 = 0;
        let mut accept = false;

        while count_soc < settings.max_soc
            && !accept
            && (count_soc == 0 || θ_trial <= settings.kappa_soc * θ_soc_old)
        {
            θ_soc_old = if count_soc == 0 { θ_cur } else { θ_trial };

            jprint!(
                jnlst,
                Detailed,
                LineSearch,
                "trying second order correction number {}\n",
                count_soc + 1
            );

            // accumulate the equality residuals of the failed trial
            let (trial_c, trial_dms) = match (
                qty.trial_c(data, it),
                qty.trial_d_minus_s(data, it),
            ) {
                (Ok(c), Ok(dms)) => (c, dms),
                (Err(SolverError::Eval(_)), _) | (_, Err(SolverError::Eval(_))) => break,
                (Err(e), _) | (_, Err(e)) => return Err(e),
            };
            c_soc.scale(α_soc);
            c_soc.axpby(T::one(), &trial_c, T::one());
            dms_soc.scale(α_soc);
            dms_soc.axpby(T::one(), &trial_dms, T::one());

            let rhs = PDRhs {
                grad_lag_x: &glx[..],
                grad_lag_s: &gls[..],
                c: &c_soc,
                d_minus_s: &dms_soc,
                compl_x_l: &cxl[..],
                compl_x_u: &cxu[..],
                compl_s_l: &csl[..],
                compl_s_u: &csu[..],
            };
            pd.solve(data, it, qty, &rhs, soc_delta);

            α_soc = qty.primal_frac_to_the_bound(data, it, τ, soc_delta);
            it.set_trial_primal_from(α_soc, soc_delta);

            // the acceptance predicates keep the original step size: the
            // correction repairs the first trial's feasibility without
            // giving up its descent properties
            accept = match self.check_acceptability(data, it, qty, settings, jnlst, α_test) {
                Ok(ok) => ok,
                Err(SolverError::Eval(_)) => {
                    jprint!(
                        jnlst,
                        Summary,
                        Main,
                        "warning: second order correction rejected due to evaluation error\n"
                    );
                    break;
                }
                Err(e) => return Err(e),
            };

            if accept {
                jprint!(
                    jnlst,
                    Detailed,
                    LineSearch,
                    "second order correction step accepted with {} corrections\n",
                    count_soc + 1
                );
                *α = α_soc;
            } else {
                count_soc += 1;
                θ_trial = match qty.trial_constraint_violation(data, it) {
                    Ok(v) => v,
                    Err(SolverError::Eval(_)) => break,
                    Err(e) => return Err(e),
                };
            }
        }

        Ok(accept)
    }

    /// Closed form adjustment of the trial slacks toward d(x_trial),
    /// reducing the barrier contribution of s without moving x.
    fn perform_magic_step(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &mut DefaultIterateData<T>,
        qty: &mut DefaultQuantities<T>,
        jnlst: &Journalist,
    ) -> Result<(), SolverError> {
        let dms = qty.trial_d_minus_s(data, it)?;
        let md = data.num_ineq();
        if md == 0 {
            return Ok(());
        }

        // lift slacks to cure lower violations, push down to cure upper
        // violations; for a component with a single bound one of the two
        // contributions is zero
        let mut Δs = vec![T::zero(); md];
        let lift: Vec<T> = data
            .map_d_l
            .gathered(&dms)
            .iter()
            .map(|&v| T::max(T::zero(), v))
            .collect();
        let drop: Vec<T> = data
            .map_d_u
            .gathered(&dms)
            .iter()
            .map(|&v| T::min(T::zero(), v))
            .collect();
        data.map_d_l.scatter_add(&lift, T::one(), &mut Δs);
        data.map_d_u.scatter_add(&drop, T::one(), &mut Δs);

        // for doubly bounded components, suppress the adjustment unless
        // it moves s strictly closer to the bound midline
        let s_trial = &it.trial().s;
        for i in 0..md {
            if !(data.d_l[i].is_finite() && data.d_u[i].is_finite()) {
                continue;
            }
            let mid = data.d_l[i] + data.d_u[i];
            let two: T = (2.0).as_T();
            let before = (mid - two * s_trial[i]).abs();
            let after = (mid - two * (s_trial[i] + Δs[i])).abs();
            if after > before {
                Δs[i] = T::zero();
            }
        }

        let Δ_max = Δs.norm_inf();
        let ten: T = (10.0).as_T();
        let threshold = ten * T::epsilon() * it.trial().s.norm_inf();
        if Δ_max > threshold {
            let mut s_new = it.trial().s.clone();
            s_new.axpby(T::one(), &Δs, T::one());
            it.set_trial_s(&s_new);
            it.append_info_string("M");
            jprint!(
                jnlst,
                Detailed,
                LineSearch,
                "magic step with max-norm {:.6e} taken\n",
                Δ_max
            );
            jnlst.print_vector(
                crate::solver::core::journalist::PrintLevel::MoreVector,
                crate::solver::core::journalist::PrintCategory::LineSearch,
                "delta_s_magic",
                &Δs,
            );
        }
        Ok(())
    }
}

/// Comparison absorbing the cancellation error of the difference of two
/// nearly equal numbers of size `basval`.
fn compare_le<T: FloatT>(lhs: T, rhs: T, basval: T) -> bool {
    let tol: T = (1e-15).as_T();
    lhs - rhs <= tol * basval.abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::journalist::PrintLevel;
    use crate::solver::core::traits::NonlinearProgram;
    use crate::solver::core::EvalError;

    #[test]
    fn test_compare_le_absorbs_cancellation() {
        assert!(compare_le(1.0, 1.0, 1.0));
        // a violation at the noise floor of the base value passes
        assert!(compare_le(1e-16, 0.0, 1.0));
        assert!(!compare_le(1e-13, 0.0, 1.0));
    }

    // single variable, single two-sided inequality d(x) = x ∈ [0, 1]
    struct SlackNlp;
    impl NonlinearProgram<f64> for SlackNlp {
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
            0
        }
        fn bounds(&self, _: &mut [f64], _: &mut [f64], g_l: &mut [f64], g_u: &mut [f64]) {
            g_l[0] = 0.0;
            g_u[0] = 1.0;
        }
        fn starting_point(&self, x: &mut [f64]) {
            x[0] = 0.5;
        }
        fn eval_f(&mut self, _: &[f64], _: bool) -> Result<f64, EvalError> {
            Ok(0.0)
        }
        fn eval_grad_f(&mut self, _: &[f64], _: bool, grad: &mut [f64]) -> Result<(), EvalError> {
            grad[0] = 0.0;
            Ok(())
        }
        fn eval_g(&mut self, x: &[f64], _: bool, g: &mut [f64]) -> Result<(), EvalError> {
            g[0] = x[0];
            Ok(())
        }
        fn jacobian_structure(&self, rows: &mut [usize], cols: &mut [usize]) {
            rows[0] = 0;
            cols[0] = 0;
        }
        fn eval_jacobian(&mut self, _: &[f64], _: bool, vals: &mut [f64]) -> Result<(), EvalError> {
            vals[0] = 1.0;
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

    #[allow(clippy::type_complexity)]
    fn magic_fixture(
        x: f64,
        s: f64,
    ) -> (
        DefaultProblemData<f64>,
        DefaultIterateData<f64>,
        DefaultQuantities<f64>,
        Journalist,
        FilterLineSearch<f64>,
    ) {
        let data = DefaultProblemData::new(Box::new(SlackNlp)).unwrap();
        let mut it = DefaultIterateData::new(&data);
        {
            let curr = it.curr_mut();
            curr.x[0] = x;
            curr.s[0] = s;
            curr.v_l[0] = 1.0;
            curr.v_u[0] = 1.0;
        }
        // zero step direction, so the trial equals the current point
        it.set_trial_primal_from_step(0.0);
        let jnlst = Journalist::with_writer(PrintLevel::None, Box::new(Vec::<u8>::new()));
        let ls = FilterLineSearch::new(None);
        (data, it, DefaultQuantities::new(), jnlst, ls)
    }

    #[test]
    fn test_magic_step_lifts_slack_toward_d() {
        let (mut data, mut it, mut qty, jnlst, mut ls) = magic_fixture(0.4, 0.1);
        ls.perform_magic_step(&mut data, &mut it, &mut qty, &jnlst)
            .unwrap();

        // s moves to d(x) = 0.4, which lies inside [d_L, d_U]
        assert!((it.trial().s[0] - 0.4).abs() < 1e-14);
        assert!(it.info_string.contains('M'));
        assert!(it.trial().s[0] >= 0.0 && it.trial().s[0] <= 1.0);
    }

    #[test]
    fn test_magic_step_suppressed_outside_two_sided_bounds() {
        // d(x) = 1.2 lies above d_U; lifting s to it would overshoot the
        // bound midline, so the adjustment is dropped
        let (mut data, mut it, mut qty, jnlst, mut ls) = magic_fixture(1.2, 0.1);
        ls.perform_magic_step(&mut data, &mut it, &mut qty, &jnlst)
            .unwrap();

        assert_eq!(it.trial().s[0], 0.1);
        assert!(!it.info_string.contains('M'));
    }
}
