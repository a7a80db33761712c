use super::{Inertia, SymLinearSolver};
use crate::algebra::{AsFloatT, FloatT, SymTripletMatrix};

// -------------------------------------
// Dense LDLᵀ factorization engine
// -------------------------------------

// LDLᵀ with 1x1 pivots and no pivoting.  The augmented KKT matrix is
// quasi-definite once regularized, for which this factorization is
// backward stable; inertia is read off the signs of D.  Intended as the
// default engine for small and medium problems; large sparse problems
// should supply a sparse multifrontal implementation of the
// SymLinearSolver trait instead.

pub struct DenseLDLSolver<T> {
    n: usize,
    // unit lower triangular factor, column major, diagonal implicit
    l: Vec<T>,
    // diagonal of D
    d: Vec<T>,
    // workspace holding the dense expansion of the input
    work: Vec<T>,
    // relative zero-pivot threshold
    pivot_tol: T,
    factored: bool,
}

impl<T: FloatT> DenseLDLSolver<T> {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            l: vec![T::zero(); n * n],
            d: vec![T::zero(); n],
            work: vec![T::zero(); n * n],
            pivot_tol: T::epsilon(),
            factored: false,
        }
    }

}

impl<T: FloatT> SymLinearSolver<T> for DenseLDLSolver<T> {
    fn factor(&mut self, kkt: &SymTripletMatrix<T>) -> Inertia {
        assert_eq!(kkt.n, self.n);
        let n = self.n;
        kkt.fill_dense_lower(&mut self.work);

        // absolute pivot threshold scaled by the largest diagonal entry
        let mut diag_max = T::one();
        for j in 0..n {
            diag_max = T::max(diag_max, self.work[j * n + j].abs());
        }
        let tiny = self.pivot_tol * diag_max * (n.max(1)).as_T();

        let (l, d, a) = (&mut self.l, &mut self.d, &self.work);
        let mut inertia = Inertia {
            num_pos: 0,
            num_neg: 0,
            num_zero: 0,
        };

        for j in 0..n {
            let mut dj = a[j * n + j];
            for k in 0..j {
                dj -= l[k * n + j] * l[k * n + j] * d[k];
            }

            if dj.abs() <= tiny {
                // numerically zero pivot.  Substitute the threshold so the
                // column sweep can continue and the remaining inertia
                // still be counted; the factorization is unusable and the
                // caller must regularize.
                inertia.num_zero += 1;
                dj = if dj >= T::zero() { tiny } else { -tiny };
            } else if dj > T::zero() {
                inertia.num_pos += 1;
            } else {
                inertia.num_neg += 1;
            }
            d[j] = dj;

            for i in (j + 1)..n {
                let mut lij = a[j * n + i];
                for k in 0..j {
                    lij -= l[k * n + i] * l[k * n + j] * d[k];
                }
                l[j * n + i] = lij / dj;
            }
        }

        self.factored = inertia.num_zero == 0;
        inertia
    }

    fn solve_in_place(&self, b: &mut [T]) {
        assert!(self.factored);
        assert_eq!(b.len(), self.n);
        let n = self.n;
        let (l, d) = (&self.l, &self.d);

        // L y = b
        for j in 0..n {
            let bj = b[j];
            for i in (j + 1)..n {
                b[i] -= l[j * n + i] * bj;
            }
        }
        // D z = y
        for j in 0..n {
            b[j] /= d[j];
        }
        // Lᵀ x = z
        for j in (0..n).rev() {
            let mut bj = b[j];
            for i in (j + 1)..n {
                bj -= l[j * n + i] * b[i];
            }
            b[j] = bj;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::VectorMath;

    fn quasidef_3x3() -> SymTripletMatrix<f64> {
        // [ 2  0  1 ]
        // [ 0  3  1 ]
        // [ 1  1 -1 ]
        let mut m = SymTripletMatrix::new(3);
        m.push(0, 0, 2.0);
        m.push(1, 1, 3.0);
        m.push(2, 0, 1.0);
        m.push(2, 1, 1.0);
        m.push(2, 2, -1.0);
        m
    }

    #[test]
    fn test_factor_inertia() {
        let m = quasidef_3x3();
        let mut ldl = DenseLDLSolver::new(3);
        let inertia = ldl.factor(&m);
        assert_eq!(inertia.num_pos, 2);
        assert_eq!(inertia.num_neg, 1);
        assert_eq!(inertia.num_zero, 0);
    }

    #[test]
    fn test_solve() {
        let m = quasidef_3x3();
        let mut ldl = DenseLDLSolver::new(3);
        ldl.factor(&m);

        let x_true = vec![1.0, -2.0, 3.0];
        let mut b = vec![0.0; 3];
        m.sym_mul_vec(&mut b, &x_true, 1.0, 0.0);
        ldl.solve_in_place(&mut b);
        assert!(b.norm_inf_diff(&x_true) < 1e-12);
    }

    #[test]
    fn test_singular_detected() {
        // rank deficient: third row/col duplicates the first
        let mut m = SymTripletMatrix::new(2);
        m.push(0, 0, 1.0);
        m.push(1, 0, 1.0);
        m.push(1, 1, 1.0);
        let mut ldl = DenseLDLSolver::new(2);
        let inertia = ldl.factor(&m);
        assert!(inertia.is_singular());
    }

    #[test]
    fn test_f32_build() {
        let mut m = SymTripletMatrix::<f32>::new(1);
        m.push(0, 0, 4.0f32);
        let mut ldl = DenseLDLSolver::<f32>::new(1);
        let inertia = ldl.factor(&m);
        assert_eq!(inertia.num_pos, 1);
    }
}
