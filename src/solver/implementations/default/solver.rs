use super::iteration_output::{print_iteration_header, print_iteration_line, IterationValues};
use super::linesearch::LineSearchOutcome;
use super::pdsystem::PDRhs;
use super::*;
use crate::algebra::*;
use crate::solver::core::journalist::{jprint, Journalist, PrintLevel};
use crate::solver::core::traits::NonlinearProgram;
use crate::solver::core::{SolverError, SolverStatus};
use std::time::Instant;

// ---------------------------------
// top level solver for the default format
// ---------------------------------

/// Interior point solver for a [`NonlinearProgram`].
///
/// Construction validates the settings and the problem description and
/// sets up all components; [`solve`](NlpSolver::solve) then runs the
/// outer barrier loop: optimality test, barrier parameter update, Newton
/// step on the perturbed KKT system, filter line search, and commit of
/// the accepted iterate.
pub struct NlpSolver<T: FloatT> {
    data: DefaultProblemData<T>,
    iterates: DefaultIterateData<T>,
    quantities: DefaultQuantities<T>,
    pdsystem: DefaultPDSystem<T>,
    linesearch: FilterLineSearch<T>,
    settings: DefaultSettings<T>,
    jnlst: Journalist,

    // scratch step for PD solves before they are installed
    step_work: DefaultIterate<T>,
    step_types: String,
}

impl<T: FloatT> NlpSolver<T> {
    /// Build a solver with the default Gauss-Newton restoration phase.
    pub fn new(
        nlp: Box<dyn NonlinearProgram<T>>,
        settings: DefaultSettings<T>,
    ) -> Result<Self, SolverError> {
        Self::new_with_restoration(
            nlp,
            settings,
            Some(Box::new(GaussNewtonRestoration::new())),
        )
    }

    /// Build a solver with a custom restoration phase, or none at all
    /// (in which case a restoration request is a fatal error).
    pub fn new_with_restoration(
        nlp: Box<dyn NonlinearProgram<T>>,
        settings: DefaultSettings<T>,
        resto_phase: Option<Box<dyn RestorationPhase<T>>>,
    ) -> Result<Self, SolverError> {
        settings.validate()?;
        let data = DefaultProblemData::new(nlp)?;
        let iterates = DefaultIterateData::new(&data);
        let pdsystem = DefaultPDSystem::new(&data);
        let step_work = DefaultIterate::new(&data);
        let jnlst = Journalist::new(settings.print_level);

        Ok(Self {
            data,
            iterates,
            quantities: DefaultQuantities::new(),
            pdsystem,
            linesearch: FilterLineSearch::new(resto_phase),
            settings,
            jnlst,
            step_work,
            step_types: String::new(),
        })
    }

    /// Replace the output journalist, e.g. to capture the journal in a
    /// buffer or raise the verbosity of a single category.
    pub fn set_journalist(&mut self, jnlst: Journalist) {
        self.jnlst = jnlst;
    }

    pub fn settings(&self) -> &DefaultSettings<T> {
        &self.settings
    }

    /// Run the solver and return the final point with its status.
    pub fn solve(&mut self) -> DefaultSolution<T> {
        let start = Instant::now();
        self.print_banner();

        let status = match self.run() {
            Ok(status) => status,
            Err(SolverError::RestorationFailure) => SolverStatus::RestorationFailed,
            Err(e) => {
                jprint!(self.jnlst, Summary, Main, "solver aborted: {}\n", e);
                SolverStatus::NumericalError
            }
        };

        let mut solution = self.finalize(status);
        solution.solve_time = start.elapsed().as_secs_f64();
        self.print_footer(&solution);
        solution
    }

    // ---------------------------------
    // main loop
    // ---------------------------------

    fn run(&mut self) -> Result<SolverStatus, SolverError> {
        self.initialize()?;
        self.print_configuration();

        loop {
            let e0 = self.quantities.optimality_error(
                &mut self.data,
                &self.iterates,
                T::zero(),
                self.settings.s_max,
            )?;
            if e0 <= self.settings.tol {
                return Ok(SolverStatus::Solved);
            }
            if self.iterates.iter_count >= self.settings.max_iter {
                return Ok(SolverStatus::MaxIterations);
            }

            self.update_barrier_parameter()?;
            self.iterates.reset_info();

            match self.compute_search_direction() {
                Ok(()) => {
                    let outcome = self.linesearch.find_acceptable_trial_point(
                        &mut self.data,
                        &mut self.iterates,
                        &mut self.quantities,
                        &mut self.pdsystem,
                        &self.settings,
                        &self.jnlst,
                    )?;
                    self.print_iteration()?;
                    if outcome == LineSearchOutcome::Accepted {
                        self.iterates.accept_trial_point();
                    }
                }
                Err(SolverError::LinearSolver(msg)) => {
                    // regularization cap reached; surface the failure as
                    // a restoration request
                    jprint!(
                        self.jnlst,
                        Summary,
                        Main,
                        "warning: {}; entering restoration\n",
                        msg
                    );
                    self.linesearch.request_restoration(
                        &mut self.data,
                        &mut self.iterates,
                        &mut self.quantities,
                        &self.settings,
                        &self.jnlst,
                    )?;
                    self.print_iteration()?;
                }
                Err(e) => return Err(e),
            }

            self.step_types.push(self.iterates.info_alpha_primal_char);
            self.iterates.iter_count += 1;
        }
    }

    // ---------------------------------
    // initialization
    // ---------------------------------

    fn initialize(&mut self) -> Result<(), SolverError> {
        let data = &mut self.data;
        let κ = self.settings.bound_push;

        let mut x = vec![T::zero(); data.n];
        data.nlp.starting_point(&mut x);
        push_into_bounds(&mut x, &data.x_l, &data.x_u, κ);

        // slacks start from d(x₀), pushed inside the inequality bounds
        let mut g = vec![T::zero(); data.m];
        data.nlp.eval_g(&x, true, &mut g)?;
        let mut s: Vec<T> = data.ineq_rows.iter().map(|&r| g[r]).collect();
        push_into_bounds(&mut s, &data.d_l, &data.d_u, κ);

        // optional equality multiplier estimate from the problem
        let y0 = data.nlp.initial_y();
        if let Some(ref y0) = y0 {
            if y0.len() != data.m {
                return Err(SolverError::InvalidProblem(
                    "initial multiplier estimate has wrong length".into(),
                ));
            }
        }

        let (eq_rows, ineq_rows) = (data.eq_rows.clone(), data.ineq_rows.clone());
        let curr = self.iterates.curr_mut();
        curr.x.copy_from(&x);
        curr.s.copy_from(&s);
        if let Some(y0) = y0 {
            for (k, &r) in eq_rows.iter().enumerate() {
                curr.y_c[k] = y0[r];
            }
            for (k, &r) in ineq_rows.iter().enumerate() {
                curr.y_d[k] = y0[r];
            }
        }
        curr.z_l.set(T::one());
        curr.z_u.set(T::one());
        curr.v_l.set(T::one());
        curr.v_u.set(T::one());

        self.iterates.set_mu(self.settings.mu_init);
        self.iterates.tau = T::max(self.settings.tau_min, T::one() - self.settings.mu_init);

        jprint!(
            self.jnlst,
            Detailed,
            Initialization,
            "starting point pushed inside bounds; mu = {:e}, tau = {}\n",
            self.iterates.mu(),
            self.iterates.tau
        );
        Ok(())
    }

    // ---------------------------------
    // barrier parameter update
    // ---------------------------------

    // Monotone Fiacco-McCormick strategy: once the barrier problem is
    // solved to within kappa_epsilon * mu, tighten mu superlinearly and
    // reset the filter.
    fn update_barrier_parameter(&mut self) -> Result<(), SolverError> {
        let floor = self.settings.tol / (10.0).as_T();
        loop {
            let μ = self.iterates.mu();
            if μ <= floor {
                break;
            }
            let e_mu = self.quantities.optimality_error(
                &mut self.data,
                &self.iterates,
                μ,
                self.settings.s_max,
            )?;
            if e_mu > self.settings.kappa_epsilon * μ {
                break;
            }

            let μ_new = T::max(
                floor,
                T::min(
                    self.settings.kappa_mu * μ,
                    T::powf(μ, self.settings.theta_mu),
                ),
            );
            if μ_new >= μ {
                break;
            }

            self.iterates.set_mu(μ_new);
            self.iterates.tau = T::max(self.settings.tau_min, T::one() - μ_new);
            self.linesearch.reset();
            jprint!(
                self.jnlst,
                Detailed,
                Main,
                "barrier parameter reduced to {:e}; filter cleared\n",
                μ_new
            );
        }
        Ok(())
    }

    // ---------------------------------
    // search direction
    // ---------------------------------

    fn compute_search_direction(&mut self) -> Result<(), SolverError> {
        self.pdsystem.factor(
            &mut self.data,
            &self.iterates,
            &mut self.quantities,
            &self.settings,
            &self.jnlst,
        )?;
        self.iterates.info_regu_x = self.pdsystem.last_regularization;

        let glx = self
            .quantities
            .curr_grad_lag_x(&mut self.data, &self.iterates)?;
        let gls = self
            .quantities
            .curr_grad_lag_s(&mut self.data, &self.iterates)?;
        let c = self.quantities.curr_c(&mut self.data, &self.iterates)?;
        let dms = self
            .quantities
            .curr_d_minus_s(&mut self.data, &self.iterates)?;
        let [cxl, cxu, csl, csu] = self
            .quantities
            .curr_relaxed_compl(&mut self.data, &self.iterates);

        let rhs = PDRhs {
            grad_lag_x: &glx[..],
            grad_lag_s: &gls[..],
            c: &c[..],
            d_minus_s: &dms[..],
            compl_x_l: &cxl[..],
            compl_x_u: &cxu[..],
            compl_s_l: &csl[..],
            compl_s_u: &csu[..],
        };
        self.pdsystem.solve(
            &mut self.data,
            &self.iterates,
            &mut self.quantities,
            &rhs,
            &mut self.step_work,
        );
        self.iterates.set_delta_from(&self.step_work);
        Ok(())
    }

    // ---------------------------------
    // output and finalization
    // ---------------------------------

    fn print_banner(&self) {
        jprint!(
            self.jnlst,
            Summary,
            Main,
            "\nipnlp v{}  -  primal-dual interior point NLP solver\n\n",
            env!("CARGO_PKG_VERSION")
        );
    }

    fn print_configuration(&self) {
        jprint!(self.jnlst, Detailed, Main, "problem:\n");
        jprint!(self.jnlst, Detailed, Main, "  variables     = {}\n", self.data.n);
        jprint!(
            self.jnlst,
            Detailed,
            Main,
            "  equalities    = {}\n",
            self.data.num_eq()
        );
        jprint!(
            self.jnlst,
            Detailed,
            Main,
            "  inequalities  = {}\n",
            self.data.num_ineq()
        );
        jprint!(
            self.jnlst,
            Detailed,
            Main,
            "  bounds on x   = {} lower, {} upper\n",
            self.data.map_x_l.len(),
            self.data.map_x_u.len()
        );
        jprint!(
            self.jnlst,
            Detailed,
            Main,
            "  tol = {:.1e}, max_iter = {}, mu_init = {:.1e}\n\n",
            self.settings.tol,
            self.settings.max_iter,
            self.settings.mu_init
        );
    }

    fn print_iteration(&mut self) -> Result<(), SolverError> {
        if !self
            .jnlst
            .enabled(PrintLevel::Summary, crate::solver::core::journalist::PrintCategory::Main)
        {
            return Ok(());
        }
        print_iteration_header(&self.jnlst, self.iterates.iter_count);

        let vals = IterationValues {
            objective: self.quantities.curr_f(&mut self.data, &self.iterates)?,
            inf_pr: self
                .quantities
                .curr_primal_infeasibility(&mut self.data, &self.iterates)?,
            inf_du: self
                .quantities
                .curr_dual_infeasibility(&mut self.data, &self.iterates)?,
            d_norm: self.iterates.delta().primal_norm_inf(),
        };
        print_iteration_line(&self.jnlst, &self.iterates, &vals);
        Ok(())
    }

    fn finalize(&mut self, status: SolverStatus) -> DefaultSolution<T> {
        let mut solution = DefaultSolution::empty(self.data.n, self.data.m);
        solution.status = status;

        let curr = self.iterates.curr();
        solution.x.copy_from(&curr.x);
        solution.s = curr.s.clone();
        solution.y = self.data.full_multipliers(&curr.y_c, &curr.y_d);
        self.data
            .map_x_l
            .scatter_add(&curr.z_l, T::one(), &mut solution.z_l);
        self.data
            .map_x_u
            .scatter_add(&curr.z_u, T::one(), &mut solution.z_u);

        solution.obj_val = self
            .quantities
            .curr_f(&mut self.data, &self.iterates)
            .unwrap_or(T::nan());
        solution.primal_inf = self
            .quantities
            .curr_primal_infeasibility(&mut self.data, &self.iterates)
            .unwrap_or(T::nan());
        solution.dual_inf = self
            .quantities
            .curr_dual_infeasibility(&mut self.data, &self.iterates)
            .unwrap_or(T::nan());

        solution.iterations = self.iterates.iter_count;
        solution.step_types = self.step_types.clone();
        solution.count_soc_steps = self.iterates.count_soc_steps;
        solution.count_restorations = self.iterates.count_restorations;
        solution
    }

    fn print_footer(&self, solution: &DefaultSolution<T>) {
        jprint!(
            self.jnlst,
            Summary,
            Main,
            "\nterminated with status = {}\n",
            solution.status
        );
        jprint!(
            self.jnlst,
            Summary,
            Main,
            "iterations = {}, objective = {:e}, inf_pr = {:e}, inf_du = {:e}\n",
            solution.iterations,
            solution.obj_val,
            solution.primal_inf,
            solution.dual_inf
        );
    }
}

// Push a starting point strictly inside its bounds by a relative margin,
// shrinking the margin where a two-sided interval is narrow.
fn push_into_bounds<T: FloatT>(x: &mut [T], lower: &[T], upper: &[T], κ: T) {
    for i in 0..x.len() {
        let (l, u) = (lower[i], upper[i]);
        if l.is_finite() && u.is_finite() {
            let p_l = T::min(κ * T::max(T::one(), l.abs()), κ * (u - l));
            let p_u = T::min(κ * T::max(T::one(), u.abs()), κ * (u - l));
            x[i] = T::max(l + p_l, T::min(u - p_u, x[i]));
        } else if l.is_finite() {
            x[i] = T::max(x[i], l + κ * T::max(T::one(), l.abs()));
        } else if u.is_finite() {
            x[i] = T::min(x[i], u - κ * T::max(T::one(), u.abs()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_into_bounds() {
        let lower = vec![0.0, f64::NEG_INFINITY, -1.0];
        let upper = vec![1.0, 2.0, f64::INFINITY];
        let mut x = vec![0.0, 5.0, -3.0];
        push_into_bounds(&mut x, &lower, &upper, 0.01);

        assert!(x[0] > 0.0 && x[0] < 1.0);
        assert!(x[1] < 2.0);
        assert!(x[2] > -1.0);

        // interior points are left alone
        let mut y = vec![0.5, 1.0, 0.0];
        push_into_bounds(&mut y, &lower, &upper, 0.01);
        assert_eq!(y, vec![0.5, 1.0, 0.0]);
    }
}
