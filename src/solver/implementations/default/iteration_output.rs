use super::DefaultIterateData;
use crate::algebra::*;
use crate::solver::core::journalist::{jprint, Journalist, PrintCategory, PrintLevel};

// ---------------
// Iteration summary output
// ---------------

// One fixed-width line per outer iteration.  The lg(rg) column shows the
// primal regularization of the iteration's factorization, or dashes when
// none was needed; the trailing string carries free-form annotations such
// as "M" for a magic step.

pub(crate) const ITER_HEADER: &str =
    " iter     objective    inf_pr   inf_du lg(mu)  ||d||  lg(rg) alpha_du alpha_pr  ls\n";

pub(crate) struct IterationValues<T> {
    pub objective: T,
    pub inf_pr: T,
    pub inf_du: T,
    pub d_norm: T,
}

pub(crate) fn print_iteration_header(jnlst: &Journalist, iter: u32) {
    // reprint the header every ten iterations at summary verbosity, and
    // on every iteration in the detailed journal
    let level = if iter % 10 == 0 {
        PrintLevel::Summary
    } else {
        PrintLevel::Detailed
    };
    jnlst.print(level, PrintCategory::Main, format_args!("{}", ITER_HEADER));
}

pub(crate) fn print_iteration_line<T: FloatT>(
    jnlst: &Journalist,
    it: &DefaultIterateData<T>,
    vals: &IterationValues<T>,
) {
    if !jnlst.enabled(PrintLevel::Summary, PrintCategory::Main) {
        return;
    }

    let regu = if it.info_regu_x == T::zero() {
        "   - ".to_string()
    } else {
        format!("{:5.1}", it.info_regu_x.log10())
    };

    jprint!(
        jnlst,
        Summary,
        Main,
        "{:5}  {:+14.7e} {:8.2e} {:8.2e} {:5.1} {:8.2e} {:>5} {:8.2e} {:8.2e}{}{:3} {}\n",
        it.iter_count,
        vals.objective,
        vals.inf_pr,
        vals.inf_du,
        it.mu().log10(),
        vals.d_norm,
        regu,
        it.info_alpha_dual,
        it.info_alpha_primal,
        it.info_alpha_primal_char,
        it.info_ls_count,
        it.info_string
    );
}
