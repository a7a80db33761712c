use super::{DefaultIterate, DefaultIterateData, DefaultProblemData, DefaultQuantities, DefaultSettings};
use crate::algebra::*;
use crate::solver::core::journalist::{jprint, Journalist};
use crate::solver::core::linsolvers::{DenseLDLSolver, Inertia, SymLinearSolver};
use crate::solver::core::SolverError;

// ---------------
// Primal-dual system solver for the default format
// ---------------

/// Right hand side blocks of the perturbed KKT system, in the layout of
/// the Newton equations: gradient-of-Lagrangian components, equality
/// residual components and relaxed complementarity components.  The
/// caller substitutes corrected residuals (e.g. the second order
/// correction) for `c` and `d_minus_s` as needed.
pub(crate) struct PDRhs<'a, T> {
    pub grad_lag_x: &'a [T],
    pub grad_lag_s: &'a [T],
    pub c: &'a [T],
    pub d_minus_s: &'a [T],
    pub compl_x_l: &'a [T],
    pub compl_x_u: &'a [T],
    pub compl_s_l: &'a [T],
    pub compl_s_u: &'a [T],
}

/// Factors the augmented KKT matrix
///
/// ```text
/// [ W + Σ_x + δ_W      0          J_cᵀ     J_dᵀ  ]
/// [ 0               Σ_s + δ_W      0        −I   ]
/// [ J_c                0          −δ_C      0    ]
/// [ J_d               −I           0       −δ_C  ]
/// ```
///
/// in the unknowns (Δx, Δs, −Δy_c, −Δy_d), correcting the inertia by
/// increasing δ_W until the factorization has n + m_d positive and
/// m_c + m_d negative eigenvalues, and back-substitutes the bound
/// multiplier steps after each solve.  The factorization is retained
/// until the next call to [`factor`](Self::factor), so second order
/// correction solves reuse it.
pub struct DefaultPDSystem<T> {
    linsolver: DenseLDLSolver<T>,
    kkt: SymTripletMatrix<T>,
    work: Vec<T>,

    // most recent successful regularization, for the warm-started
    // correction schedule
    delta_w_last: T,
    /// δ_W used by the most recent factorization; zero if none was needed
    pub(crate) last_regularization: T,
    factored: bool,
}

impl<T: FloatT> DefaultPDSystem<T> {
    pub fn new(data: &DefaultProblemData<T>) -> Self {
        let dim = data.n + 2 * data.num_ineq() + data.num_eq();
        Self {
            linsolver: DenseLDLSolver::new(dim),
            kkt: SymTripletMatrix::new(dim),
            work: vec![T::zero(); dim],
            delta_w_last: T::zero(),
            last_regularization: T::zero(),
            factored: false,
        }
    }

    /// Assemble and factor the augmented matrix at the current iterate,
    /// running the inertia correction loop.
    pub(crate) fn factor(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
        qty: &mut DefaultQuantities<T>,
        settings: &DefaultSettings<T>,
        jnlst: &Journalist,
    ) -> Result<(), SolverError> {
        let hess = qty.curr_hess(data, it)?;
        let jac = qty.curr_jac(data, it)?;
        let sl_xl = qty.curr_slack_x_l(data, it);
        let sl_xu = qty.curr_slack_x_u(data, it);
        let sl_sl = qty.curr_slack_s_l(data, it);
        let sl_su = qty.curr_slack_s_u(data, it);

        let mut δ_w = T::zero();
        let mut δ_c = T::zero();
        let mut first_correction = true;

        loop {
            self.assemble(data, it, &hess, &jac, &sl_xl, &sl_xu, &sl_sl, &sl_su, δ_w, δ_c);
            let inertia = self.linsolver.factor(&self.kkt);

            if self.inertia_is_correct(data, &inertia) {
                jprint!(
                    jnlst,
                    Detailed,
                    SolvePdSystem,
                    "factorization successful with delta_w = {:e}, delta_c = {:e}\n",
                    δ_w,
                    δ_c
                );
                self.last_regularization = δ_w;
                if δ_w > T::zero() {
                    self.delta_w_last = δ_w;
                }
                self.factored = true;
                return Ok(());
            }

            jprint!(
                jnlst,
                Detailed,
                SolvePdSystem,
                "wrong inertia (pos = {}, neg = {}, zero = {}) at delta_w = {:e}\n",
                inertia.num_pos,
                inertia.num_neg,
                inertia.num_zero,
                δ_w
            );

            if inertia.is_singular() && δ_c == T::zero() {
                δ_c = settings.delta_c_bar * T::powf(it.mu(), settings.kappa_c);
            }

            if first_correction {
                δ_w = if self.delta_w_last == T::zero() {
                    settings.delta_w_init
                } else {
                    T::max(settings.delta_w_min, self.delta_w_last * settings.kappa_w_minus)
                };
                first_correction = false;
            } else if self.delta_w_last == T::zero() {
                δ_w *= settings.kappa_w_plus_init;
            } else {
                δ_w *= settings.kappa_w_plus;
            }

            if δ_w > settings.delta_w_max {
                self.factored = false;
                return Err(SolverError::LinearSolver(format!(
                    "inertia correction exceeded the regularization cap {:e}",
                    settings.delta_w_max
                )));
            }
        }
    }

    /// Solve the perturbed KKT system for a full step direction.  The
    /// most recent factorization is reused; [`factor`](Self::factor) must
    /// have succeeded since the last change of the current iterate.
    pub(crate) fn solve(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
        qty: &mut DefaultQuantities<T>,
        rhs: &PDRhs<T>,
        step: &mut DefaultIterate<T>,
    ) {
        assert!(self.factored, "solve called without a factorization");
        let (n, md) = (data.n, data.num_ineq());
        let (ox, os, oc, od) = self.offsets(data);

        let sl_xl = qty.curr_slack_x_l(data, it);
        let sl_xu = qty.curr_slack_x_u(data, it);
        let sl_sl = qty.curr_slack_s_l(data, it);
        let sl_su = qty.curr_slack_s_u(data, it);

        // condensed right hand side; the complementarity blocks are
        // absorbed into the x and s rows
        let b = &mut self.work;
        b.set(T::zero());

        b[ox..ox + n].copy_from(rhs.grad_lag_x);
        scatter_scaled_ratio(&data.map_x_l, rhs.compl_x_l, &sl_xl, T::one(), &mut b[ox..ox + n]);
        scatter_scaled_ratio(&data.map_x_u, rhs.compl_x_u, &sl_xu, -T::one(), &mut b[ox..ox + n]);

        b[os..os + md].copy_from(rhs.grad_lag_s);
        scatter_scaled_ratio(&data.map_d_l, rhs.compl_s_l, &sl_sl, T::one(), &mut b[os..os + md]);
        scatter_scaled_ratio(&data.map_d_u, rhs.compl_s_u, &sl_su, -T::one(), &mut b[os..os + md]);

        b[oc..oc + data.num_eq()].copy_from(rhs.c);
        b[od..od + md].copy_from(rhs.d_minus_s);
        b.negate();

        self.linsolver.solve_in_place(b);

        step.x.copy_from(&b[ox..ox + n]);
        step.s.copy_from(&b[os..os + md]);
        // the symmetric form solves for the negated multiplier steps
        step.y_c.copy_from(&b[oc..oc + data.num_eq()]);
        step.y_c.negate();
        step.y_d.copy_from(&b[od..od + md]);
        step.y_d.negate();

        // back out the bound multiplier steps from the linearized
        // complementarity rows
        let iterate = it.curr();
        recover_lower_mult(&data.map_x_l, rhs.compl_x_l, &sl_xl, &iterate.z_l, &step.x, &mut step.z_l);
        recover_upper_mult(&data.map_x_u, rhs.compl_x_u, &sl_xu, &iterate.z_u, &step.x, &mut step.z_u);
        recover_lower_mult(&data.map_d_l, rhs.compl_s_l, &sl_sl, &iterate.v_l, &step.s, &mut step.v_l);
        recover_upper_mult(&data.map_d_u, rhs.compl_s_u, &sl_su, &iterate.v_u, &step.s, &mut step.v_u);
    }

    fn offsets(&self, data: &DefaultProblemData<T>) -> (usize, usize, usize, usize) {
        let (n, md) = (data.n, data.num_ineq());
        (0, n, n + md, n + md + data.num_eq())
    }

    fn inertia_is_correct(&self, data: &DefaultProblemData<T>, inertia: &Inertia) -> bool {
        let expect_pos = data.n + data.num_ineq();
        let expect_neg = data.num_eq() + data.num_ineq();
        inertia.num_zero == 0
            && inertia.num_pos == expect_pos
            && inertia.num_neg == expect_neg
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &mut self,
        data: &DefaultProblemData<T>,
        it: &DefaultIterateData<T>,
        hess: &[T],
        jac: &[T],
        sl_xl: &[T],
        sl_xu: &[T],
        sl_sl: &[T],
        sl_su: &[T],
        δ_w: T,
        δ_c: T,
    ) {
        let (n, md, mc) = (data.n, data.num_ineq(), data.num_eq());
        let (ox, os, oc, od) = self.offsets(data);
        let iterate = it.curr();

        let kkt = &mut self.kkt;
        kkt.clear();

        // W block (lower triangle as declared by the problem)
        for (k, (&r, &c)) in data.hess_rows.iter().zip(&data.hess_cols).enumerate() {
            kkt.push(ox + r, ox + c, hess[k]);
        }

        // Σ_x and primal regularization on the x diagonal
        for (k, &i) in data.map_x_l.indices().iter().enumerate() {
            kkt.push(ox + i, ox + i, iterate.z_l[k] / sl_xl[k]);
        }
        for (k, &i) in data.map_x_u.indices().iter().enumerate() {
            kkt.push(ox + i, ox + i, iterate.z_u[k] / sl_xu[k]);
        }
        if δ_w > T::zero() {
            for i in 0..n {
                kkt.push(ox + i, ox + i, δ_w);
            }
        }

        // Σ_s and primal regularization on the s diagonal
        for (k, &i) in data.map_d_l.indices().iter().enumerate() {
            kkt.push(os + i, os + i, iterate.v_l[k] / sl_sl[k]);
        }
        for (k, &i) in data.map_d_u.indices().iter().enumerate() {
            kkt.push(os + i, os + i, iterate.v_u[k] / sl_su[k]);
        }
        if δ_w > T::zero() {
            for i in 0..md {
                kkt.push(os + i, os + i, δ_w);
            }
        }

        // Jacobian blocks
        for &(r, c, k) in &data.jac_c {
            kkt.push(oc + r, ox + c, jac[k]);
        }
        for &(r, c, k) in &data.jac_d {
            kkt.push(od + r, ox + c, jac[k]);
        }

        // slack identity coupling
        for i in 0..md {
            kkt.push(od + i, os + i, -T::one());
        }

        // dual regularization
        if δ_c > T::zero() {
            for i in 0..(mc + md) {
                kkt.push(oc + i, oc + i, -δ_c);
            }
        }
    }
}

// `out[map] += a * compl / sl` for a bound set
fn scatter_scaled_ratio<T: FloatT>(
    map: &ExpansionMap,
    compl: &[T],
    sl: &[T],
    a: T,
    out: &mut [T],
) {
    for ((&compl, &sl), &i) in compl.iter().zip(sl).zip(map.indices()) {
        out[i] += a * compl / sl;
    }
}

// Δm = −(compl + m ∘ Δprimal) / sl over a lower bound set
fn recover_lower_mult<T: FloatT>(
    map: &ExpansionMap,
    compl: &[T],
    sl: &[T],
    mult: &[T],
    Δprimal: &[T],
    out: &mut [T],
) {
    for (k, &i) in map.indices().iter().enumerate() {
        out[k] = -(compl[k] + mult[k] * Δprimal[i]) / sl[k];
    }
}

// Δm = (−compl + m ∘ Δprimal) / sl over an upper bound set
fn recover_upper_mult<T: FloatT>(
    map: &ExpansionMap,
    compl: &[T],
    sl: &[T],
    mult: &[T],
    Δprimal: &[T],
    out: &mut [T],
) {
    for (k, &i) in map.indices().iter().enumerate() {
        out[k] = (-compl[k] + mult[k] * Δprimal[i]) / sl[k];
    }
}
