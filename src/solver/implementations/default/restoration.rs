use super::{DefaultIterateData, DefaultProblemData, DefaultQuantities, DefaultSettings};
use crate::algebra::*;
use crate::solver::core::journalist::{jprint, Journalist};
use crate::solver::core::linsolvers::{DenseLDLSolver, SymLinearSolver};
use crate::solver::core::SolverError;

// ---------------
// Feasibility restoration phase
// ---------------

/// Collaborator invoked when the line search cannot find an acceptable
/// trial point.  An implementor owns its own inner solver and installs a
/// new, less infeasible iterate directly into the iterate storage.
/// Returns `Ok(true)` when a point was installed and the outer iteration
/// may continue.
///
/// Configuring no restoration phase turns a restoration request into the
/// fatal "could not restore feasibility" error.
pub trait RestorationPhase<T: FloatT> {
    fn perform_restoration(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &mut DefaultIterateData<T>,
        qty: &mut DefaultQuantities<T>,
        settings: &DefaultSettings<T>,
        jnlst: &Journalist,
    ) -> Result<bool, SolverError>;
}

/// Default restoration phase: damped Gauss-Newton on the feasibility
/// measure ½‖(c(x), d(x)−s)‖² over (x, s), with backtracking on the
/// residual norm and a fraction-to-the-boundary safeguard on the variable
/// and slack bounds.  The objective plays no role, so the driver makes
/// progress even where f is not evaluable.
pub struct GaussNewtonRestoration<T> {
    _marker: std::marker::PhantomData<T>,
}

impl<T: FloatT> GaussNewtonRestoration<T> {
    pub fn new() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T: FloatT> Default for GaussNewtonRestoration<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FloatT> RestorationPhase<T> for GaussNewtonRestoration<T> {
    fn perform_restoration(
        &mut self,
        data: &mut DefaultProblemData<T>,
        it: &mut DefaultIterateData<T>,
        qty: &mut DefaultQuantities<T>,
        settings: &DefaultSettings<T>,
        jnlst: &Journalist,
    ) -> Result<bool, SolverError> {
        let (n, md, mc) = (data.n, data.num_ineq(), data.num_eq());
        let nv = n + md;

        let mut x = it.curr().x.clone();
        let mut s = it.curr().s.clone();

        let θ_enter = residual_norm_inf(data, &x, &s)?;
        let θ_target = T::max(settings.tol, settings.kappa_resto * θ_enter);
        jprint!(
            jnlst,
            Detailed,
            Main,
            "restoration phase entered with theta = {:e}, target {:e}\n",
            θ_enter,
            θ_target
        );

        let mut ldl = DenseLDLSolver::<T>::new(nv);
        let mut normal = SymTripletMatrix::<T>::with_capacity(nv, nv + data.jacobian_nnz());
        let mut jvals = vec![T::zero(); data.jacobian_nnz()];
        let mut resid = vec![T::zero(); mc + md];
        let mut grad = vec![T::zero(); nv];
        let mut step = vec![T::zero(); nv];
        let τ = settings.tau_min;

        let mut θ = θ_enter;
        for _ in 0..settings.max_resto_iter {
            if θ <= θ_target {
                break;
            }

            fill_residual(data, &x, &s, &mut resid)?;
            data.nlp.eval_jacobian(&x, true, &mut jvals)?;

            // grad = Jᵀ r with J = [J_c 0; J_d −I]
            grad.set(T::zero());
            data.jac_c_tmul(&jvals, &resid[0..mc], T::one(), &mut grad[0..n]);
            data.jac_d_tmul(&jvals, &resid[mc..], T::one(), &mut grad[0..n]);
            grad[n..].axpby(-T::one(), &resid[mc..], T::one());

            // Levenberg damped normal equations (JᵀJ + λI) Δ = −Jᵀ r
            let λ = T::max(T::sqrt(T::epsilon()), T::epsilon() * θ);
            assemble_normal_eqns(data, &jvals, λ, &mut normal);
            let inertia = ldl.factor(&normal);
            if inertia.num_pos != nv {
                jprint!(
                    jnlst,
                    Detailed,
                    Main,
                    "restoration normal equations are not positive definite\n"
                );
                return Ok(false);
            }
            step.copy_from(&grad);
            ldl.solve_in_place(&mut step);
            step.negate();

            // stay inside the variable and slack bounds
            let mut α = T::one();
            α = frac_to_bound_resto(α, τ, &x, &data.x_l, &data.x_u, &step[0..n]);
            α = frac_to_bound_resto(α, τ, &s, &data.d_l, &data.d_u, &step[n..]);

            // backtrack on the residual norm
            let mut improved = false;
            for _ in 0..20 {
                let mut x_new = x.clone();
                x_new.axpby(α, &step[0..n], T::one());
                let mut s_new = s.clone();
                s_new.axpby(α, &step[n..], T::one());

                match residual_norm_inf(data, &x_new, &s_new) {
                    Ok(θ_new) if θ_new < θ => {
                        x = x_new;
                        s = s_new;
                        θ = θ_new;
                        improved = true;
                        break;
                    }
                    //not improved (or not evaluable); shorten the step
                    Ok(_) | Err(SolverError::Eval(_)) => α *= (0.5).as_T(),
                    Err(e) => return Err(e),
                }
            }
            if !improved {
                jprint!(jnlst, Detailed, Main, "restoration stalled at theta = {:e}\n", θ);
                break;
            }
        }

        if θ > θ_target {
            return Ok(false);
        }

        jprint!(
            jnlst,
            Detailed,
            Main,
            "restoration phase finished with theta = {:e}\n",
            θ
        );

        // install the restored point; equality multipliers restart from
        // zero, bound multipliers keep their (positive) values
        let curr = it.curr_mut();
        curr.x.copy_from(&x);
        curr.s.copy_from(&s);
        curr.y_c.set(T::zero());
        curr.y_d.set(T::zero());

        // recheck quantities at the installed point
        let _ = qty.curr_constraint_violation(data, it)?;
        Ok(true)
    }
}

// r = (c(x), d(x) − s)
fn fill_residual<T: FloatT>(
    data: &mut DefaultProblemData<T>,
    x: &[T],
    s: &[T],
    out: &mut [T],
) -> Result<(), SolverError> {
    let mc = data.num_eq();
    let mut g = vec![T::zero(); data.m];
    data.nlp.eval_g(x, true, &mut g)?;
    for (k, (&r, &b)) in data.eq_rows.iter().zip(&data.c_rhs).enumerate() {
        out[k] = g[r] - b;
    }
    for (k, &r) in data.ineq_rows.iter().enumerate() {
        out[mc + k] = g[r] - s[k];
    }
    Ok(())
}

fn residual_norm_inf<T: FloatT>(
    data: &mut DefaultProblemData<T>,
    x: &[T],
    s: &[T],
) -> Result<T, SolverError> {
    let mut r = vec![T::zero(); data.m];
    fill_residual(data, x, s, &mut r)?;
    Ok(r.norm_inf())
}

// JᵀJ + λI over (x, s) with J = [J_c 0; J_d −I], built row block wise:
// JᵀJ = J_cᵀJ_c + J_dᵀJ_d in the x block, −J_dᵀ in the (s,x) coupling,
// and I in the s block.
fn assemble_normal_eqns<T: FloatT>(
    data: &DefaultProblemData<T>,
    jvals: &[T],
    λ: T,
    out: &mut SymTripletMatrix<T>,
) {
    let (n, md) = (data.n, data.num_ineq());
    out.clear();

    // x block: accumulate JᵀJ entry products sharing a constraint row
    dense_jtj_block(&data.jac_c, jvals, out);
    dense_jtj_block(&data.jac_d, jvals, out);

    // coupling block: −(J_d)ᵀ columns against the s identity
    for &(r, c, k) in &data.jac_d {
        out.push(n + r, c, -jvals[k]);
    }

    for i in 0..n {
        out.push(i, i, λ);
    }
    for i in 0..md {
        out.push(n + i, n + i, T::one() + λ);
    }
}

fn dense_jtj_block<T: FloatT>(
    entries: &[(usize, usize, usize)],
    jvals: &[T],
    out: &mut SymTripletMatrix<T>,
) {
    for (a, &(ra, ca, ka)) in entries.iter().enumerate() {
        for &(rb, cb, kb) in &entries[a..] {
            if ra != rb {
                continue;
            }
            let v = jvals[ka] * jvals[kb];
            if ca == cb {
                out.push(ca, cb, v);
            } else {
                out.push(ca.max(cb), ca.min(cb), v);
            }
        }
    }
}

fn frac_to_bound_resto<T: FloatT>(
    mut α: T,
    τ: T,
    v: &[T],
    lower: &[T],
    upper: &[T],
    step: &[T],
) -> T {
    for i in 0..v.len() {
        let δ = step[i];
        if δ < T::zero() && lower[i].is_finite() {
            let sl = v[i] - lower[i];
            if sl > T::zero() {
                α = T::min(α, -τ * sl / δ);
            }
        }
        if δ > T::zero() && upper[i].is_finite() {
            let sl = upper[i] - v[i];
            if sl > T::zero() {
                α = T::min(α, τ * sl / δ);
            }
        }
    }
    α
}
