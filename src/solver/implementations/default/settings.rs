use crate::algebra::*;
use crate::solver::core::journalist::PrintLevel;
use crate::solver::core::SolverError;
use derive_builder::Builder;

/// Solver settings for the default problem format.
///
/// All numeric options are validated against their admissible ranges: the
/// builder rejects explicitly set out-of-range values in `build()`, and
/// the resolved settings are checked in full at solver construction,
/// where a violation fails initialization with
/// [`SolverError::OptionOutOfRange`] and leaves no partial state.

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct DefaultSettings<T: FloatT> {
    ///maximum number of outer iterations
    #[builder(default = "3000")]
    pub max_iter: u32,

    ///convergence tolerance on the scaled optimality error
    #[builder(default = "(1e-8).as_T()")]
    pub tol: T,

    ///verbosity of the iteration journal
    #[builder(default = "PrintLevel::Summary")]
    pub print_level: PrintLevel,

    ///initial barrier parameter μ
    #[builder(default = "(0.1).as_T()")]
    pub mu_init: T,

    ///linear decrease factor for μ
    #[builder(default = "(0.2).as_T()")]
    pub kappa_mu: T,

    ///superlinear decrease exponent for μ
    #[builder(default = "(1.5).as_T()")]
    pub theta_mu: T,

    ///barrier subproblem tolerance factor: μ is reduced once the
    ///optimality error falls below kappa_epsilon * μ
    #[builder(default = "(10.0).as_T()")]
    pub kappa_epsilon: T,

    ///lower bound on the fraction-to-the-boundary parameter τ
    #[builder(default = "(0.99).as_T()")]
    pub tau_min: T,

    ///multiplier norm cap in the optimality error scaling
    #[builder(default = "(100.0).as_T()")]
    pub s_max: T,

    ///relative push of the starting point into the bound interior
    #[builder(default = "(0.01).as_T()")]
    pub bound_push: T,

    // ---- filter line search ----
    ///upper constraint violation cap factor: θ_max = theta_max_fact * max(1, θ₀)
    #[builder(default = "(1e4).as_T()")]
    pub theta_max_fact: T,

    ///switching threshold factor: θ_min = theta_min_fact * max(1, θ₀)
    #[builder(default = "(1e-4).as_T()")]
    pub theta_min_fact: T,

    ///Armijo factor on the barrier objective
    #[builder(default = "(1e-4).as_T()")]
    pub eta_phi: T,

    ///f-type switching condition scaling
    #[builder(default = "(1.0).as_T()")]
    pub delta: T,

    ///f-type switching condition exponent on the barrier descent
    #[builder(default = "(2.3).as_T()")]
    pub s_phi: T,

    ///f-type switching condition exponent on the constraint violation
    #[builder(default = "(1.1).as_T()")]
    pub s_theta: T,

    ///filter margin factor on the barrier objective
    #[builder(default = "(1e-5).as_T()")]
    pub gamma_phi: T,

    ///filter margin factor on the constraint violation
    #[builder(default = "(1e-5).as_T()")]
    pub gamma_theta: T,

    ///safety factor on the smallest admissible step size
    #[builder(default = "(0.05).as_T()")]
    pub alpha_min_frac: T,

    ///backtracking reduction factor for rejected trial steps
    #[builder(default = "(0.5).as_T()")]
    pub alpha_red_factor: T,

    ///maximum number of second order corrections per iteration
    #[builder(default = "4")]
    pub max_soc: u32,

    ///required contraction of the violation between corrections
    #[builder(default = "(0.99).as_T()")]
    pub kappa_soc: T,

    ///cap on the admissible barrier objective increase, in orders of
    ///magnitude relative to the current value
    #[builder(default = "(5.0).as_T()")]
    pub obj_max_inc: T,

    ///enable the closed form slack correction after each primal trial
    #[builder(default = "false")]
    pub magic_steps: bool,

    // ---- KKT regularization ----
    ///first primal-dual regularization value tried
    #[builder(default = "(1e-4).as_T()")]
    pub delta_w_init: T,

    ///smallest nonzero primal-dual regularization
    #[builder(default = "(1e-20).as_T()")]
    pub delta_w_min: T,

    ///regularization cap; exceeding it aborts the factorization
    #[builder(default = "(1e40).as_T()")]
    pub delta_w_max: T,

    ///regularization increase factor
    #[builder(default = "(8.0).as_T()")]
    pub kappa_w_plus: T,

    ///regularization increase factor on the first corrected iteration
    #[builder(default = "(100.0).as_T()")]
    pub kappa_w_plus_init: T,

    ///regularization decrease factor between iterations
    #[builder(default = "(1.0 / 3.0).as_T()")]
    pub kappa_w_minus: T,

    ///dual regularization scaling, applied as delta_c_bar * μ^kappa_c
    ///when the factorization is singular
    #[builder(default = "(1e-8).as_T()")]
    pub delta_c_bar: T,

    ///dual regularization exponent
    #[builder(default = "(0.25).as_T()")]
    pub kappa_c: T,

    // ---- restoration phase ----
    ///iteration limit of the default feasibility restoration
    #[builder(default = "30")]
    pub max_resto_iter: u32,

    ///required violation reduction factor for a successful restoration
    #[builder(default = "(1e-3).as_T()")]
    pub kappa_resto: T,
}

impl<T: FloatT> Default for DefaultSettings<T> {
    fn default() -> DefaultSettings<T> {
        DefaultSettingsBuilder::<T>::default().build().unwrap()
    }
}

macro_rules! check_range {
    ($cond:expr, $name:expr, $msg:expr) => {
        if !($cond) {
            return Err(format!("\"{}\" must be {}", $name, $msg));
        }
    };
}

// pre build checker (for auto-validation when using the builder)

/// Automatic pre-build settings validation
impl<T: FloatT> DefaultSettingsBuilder<T> {
    /// Check every explicitly set option against its admissible range.
    /// A relation between two options is only enforced here when both
    /// are set; the resolved values are checked again in full by
    /// [`DefaultSettings::validate`] at solver construction.
    pub fn validate(&self) -> Result<(), String> {
        let zero = T::zero();
        let one = T::one();
        let half = (0.5).as_T();

        if let Some(v) = self.tol {
            check_range!(v > zero, "tol", "larger than 0");
        }
        if let Some(v) = self.mu_init {
            check_range!(v > zero, "mu_init", "larger than 0");
        }
        if let Some(v) = self.kappa_mu {
            check_range!(v > zero && v < one, "kappa_mu", "between 0 and 1");
        }
        if let Some(v) = self.theta_mu {
            check_range!(v > one, "theta_mu", "larger than 1");
        }
        if let Some(v) = self.kappa_epsilon {
            check_range!(v > zero, "kappa_epsilon", "larger than 0");
        }
        if let Some(v) = self.tau_min {
            check_range!(v > zero && v < one, "tau_min", "between 0 and 1");
        }
        if let Some(v) = self.s_max {
            check_range!(v >= one, "s_max", "at least 1");
        }
        if let Some(v) = self.bound_push {
            check_range!(v > zero && v < half, "bound_push", "between 0 and 0.5");
        }

        if let Some(v) = self.theta_max_fact {
            check_range!(v > zero, "theta_max_fact", "larger than 0");
        }
        if let Some(v) = self.theta_min_fact {
            check_range!(v > zero, "theta_min_fact", "larger than 0");
        }
        if let (Some(lo), Some(hi)) = (self.theta_min_fact, self.theta_max_fact) {
            check_range!(lo < hi, "theta_min_fact", "less than theta_max_fact");
        }
        if let Some(v) = self.eta_phi {
            check_range!(v > zero && v < half, "eta_phi", "between 0 and 0.5");
        }
        if let Some(v) = self.delta {
            check_range!(v > zero, "delta", "larger than 0");
        }
        if let Some(v) = self.s_phi {
            check_range!(v > one, "s_phi", "larger than 1");
        }
        if let Some(v) = self.s_theta {
            check_range!(v > one, "s_theta", "larger than 1");
        }
        if let Some(v) = self.gamma_phi {
            check_range!(v > zero && v < one, "gamma_phi", "between 0 and 1");
        }
        if let Some(v) = self.gamma_theta {
            check_range!(v > zero && v < one, "gamma_theta", "between 0 and 1");
        }
        if let Some(v) = self.alpha_min_frac {
            check_range!(
                v > zero && v <= one,
                "alpha_min_frac",
                "larger than 0 and at most 1"
            );
        }
        if let Some(v) = self.alpha_red_factor {
            check_range!(v > zero && v < one, "alpha_red_factor", "between 0 and 1");
        }
        if let Some(v) = self.kappa_soc {
            check_range!(v > zero, "kappa_soc", "larger than 0");
        }
        if let Some(v) = self.obj_max_inc {
            check_range!(v > one, "obj_max_inc", "larger than 1");
        }

        if let Some(v) = self.delta_w_init {
            check_range!(v > zero, "delta_w_init", "larger than 0");
        }
        if let Some(v) = self.delta_w_min {
            check_range!(v > zero, "delta_w_min", "larger than 0");
        }
        if let Some(v) = self.delta_w_max {
            check_range!(v > zero, "delta_w_max", "larger than 0");
        }
        if let (Some(init), Some(cap)) = (self.delta_w_init, self.delta_w_max) {
            check_range!(cap > init, "delta_w_max", "larger than delta_w_init");
        }
        if let Some(v) = self.kappa_w_plus {
            check_range!(v > one, "kappa_w_plus", "larger than 1");
        }
        if let Some(v) = self.kappa_w_plus_init {
            check_range!(v > one, "kappa_w_plus_init", "larger than 1");
        }
        if let Some(v) = self.kappa_w_minus {
            check_range!(v > zero && v < one, "kappa_w_minus", "between 0 and 1");
        }
        if let Some(v) = self.delta_c_bar {
            check_range!(v >= zero, "delta_c_bar", "at least 0");
        }
        if let Some(v) = self.kappa_c {
            check_range!(v > zero, "kappa_c", "larger than 0");
        }

        if let Some(v) = self.kappa_resto {
            check_range!(v > zero && v < one, "kappa_resto", "between 0 and 1");
        }

        Ok(())
    }
}

// post build checker (covers resolved values and cross-option relations
// regardless of which options were set explicitly)

/// Manual post-build settings validation
impl<T: FloatT> DefaultSettings<T> {
    /// Check every option against its admissible range.
    pub fn validate(&self) -> Result<(), SolverError> {
        self.check_ranges().map_err(SolverError::OptionOutOfRange)
    }

    fn check_ranges(&self) -> Result<(), String> {
        let zero = T::zero();
        let one = T::one();
        let half = (0.5).as_T();

        check_range!(self.tol > zero, "tol", "larger than 0");
        check_range!(self.mu_init > zero, "mu_init", "larger than 0");
        check_range!(
            self.kappa_mu > zero && self.kappa_mu < one,
            "kappa_mu",
            "between 0 and 1"
        );
        check_range!(self.theta_mu > one, "theta_mu", "larger than 1");
        check_range!(self.kappa_epsilon > zero, "kappa_epsilon", "larger than 0");
        check_range!(
            self.tau_min > zero && self.tau_min < one,
            "tau_min",
            "between 0 and 1"
        );
        check_range!(self.s_max >= one, "s_max", "at least 1");
        check_range!(
            self.bound_push > zero && self.bound_push < half,
            "bound_push",
            "between 0 and 0.5"
        );

        check_range!(self.theta_max_fact > zero, "theta_max_fact", "larger than 0");
        check_range!(
            self.theta_min_fact > zero && self.theta_min_fact < self.theta_max_fact,
            "theta_min_fact",
            "larger than 0 and less than theta_max_fact"
        );
        check_range!(
            self.eta_phi > zero && self.eta_phi < half,
            "eta_phi",
            "between 0 and 0.5"
        );
        check_range!(self.delta > zero, "delta", "larger than 0");
        check_range!(self.s_phi > one, "s_phi", "larger than 1");
        check_range!(self.s_theta > one, "s_theta", "larger than 1");
        check_range!(
            self.gamma_phi > zero && self.gamma_phi < one,
            "gamma_phi",
            "between 0 and 1"
        );
        check_range!(
            self.gamma_theta > zero && self.gamma_theta < one,
            "gamma_theta",
            "between 0 and 1"
        );
        check_range!(
            self.alpha_min_frac > zero && self.alpha_min_frac <= one,
            "alpha_min_frac",
            "larger than 0 and at most 1"
        );
        check_range!(
            self.alpha_red_factor > zero && self.alpha_red_factor < one,
            "alpha_red_factor",
            "between 0 and 1"
        );
        check_range!(self.kappa_soc > zero, "kappa_soc", "larger than 0");
        check_range!(self.obj_max_inc > one, "obj_max_inc", "larger than 1");

        check_range!(self.delta_w_init > zero, "delta_w_init", "larger than 0");
        check_range!(self.delta_w_min > zero, "delta_w_min", "larger than 0");
        check_range!(
            self.delta_w_max > self.delta_w_init,
            "delta_w_max",
            "larger than delta_w_init"
        );
        check_range!(self.kappa_w_plus > one, "kappa_w_plus", "larger than 1");
        check_range!(
            self.kappa_w_plus_init > one,
            "kappa_w_plus_init",
            "larger than 1"
        );
        check_range!(
            self.kappa_w_minus > zero && self.kappa_w_minus < one,
            "kappa_w_minus",
            "between 0 and 1"
        );
        check_range!(self.delta_c_bar >= zero, "delta_c_bar", "at least 0");
        check_range!(self.kappa_c > zero, "kappa_c", "larger than 0");

        check_range!(
            self.kappa_resto > zero && self.kappa_resto < one,
            "kappa_resto",
            "between 0 and 1"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_valid() {
        let settings = DefaultSettings::<f64>::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_builder_override() {
        let settings = DefaultSettingsBuilder::<f64>::default()
            .max_soc(0u32)
            .magic_steps(true)
            .build()
            .unwrap();
        assert_eq!(settings.max_soc, 0);
        assert!(settings.magic_steps);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_build_rejects_out_of_range() {
        // build() itself fails on explicitly set out-of-range values
        assert!(DefaultSettingsBuilder::<f64>::default()
            .alpha_red_factor(2.0)
            .build()
            .is_err());
        assert!(DefaultSettingsBuilder::<f64>::default()
            .eta_phi(0.7)
            .build()
            .is_err());
        assert!(DefaultSettingsBuilder::<f64>::default()
            .theta_min_fact(1.0)
            .theta_max_fact(0.5)
            .build()
            .is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut settings = DefaultSettings::<f64>::default();
        settings.eta_phi = 0.7;
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, SolverError::OptionOutOfRange(_)));
        assert!(err.to_string().contains("eta_phi"));

        let mut settings = DefaultSettings::<f64>::default();
        settings.theta_min_fact = 1e5; //exceeds theta_max_fact
        assert!(settings.validate().is_err());

        let mut settings = DefaultSettings::<f64>::default();
        settings.alpha_red_factor = 1.0; //backtracking would not terminate
        assert!(settings.validate().is_err());
    }
}
