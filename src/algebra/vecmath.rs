use super::{FloatT, VectorMath};
use itertools::izip;
use std::iter::zip;

impl<T: FloatT> VectorMath for [T] {
    type T = T;

    fn copy_from(&mut self, src: &[T]) -> &mut Self {
        self.copy_from_slice(src);
        self
    }

    fn set(&mut self, c: T) -> &mut Self {
        self.fill(c);
        self
    }

    fn scale(&mut self, c: T) -> &mut Self {
        for x in &mut *self {
            *x *= c;
        }
        self
    }

    fn negate(&mut self) -> &mut Self {
        for x in &mut *self {
            *x = -*x;
        }
        self
    }

    fn axpby(&mut self, a: T, x: &[T], b: T) -> &mut Self {
        assert_eq!(self.len(), x.len());
        for (y, x) in zip(&mut *self, x) {
            *y = a * (*x) + b * (*y);
        }
        self
    }

    fn waxpby(&mut self, a: T, x: &[T], b: T, y: &[T]) -> &mut Self {
        assert_eq!(self.len(), x.len());
        assert_eq!(self.len(), y.len());
        for (w, x, y) in izip!(&mut *self, x, y) {
            *w = a * (*x) + b * (*y);
        }
        self
    }

    fn dot(&self, y: &[T]) -> T {
        assert_eq!(self.len(), y.len());
        zip(self, y).fold(T::zero(), |acc, (&x, &y)| acc + x * y)
    }

    fn norm_one(&self) -> T {
        self.iter().fold(T::zero(), |acc, x| acc + x.abs())
    }

    fn norm_inf(&self) -> T {
        let mut out = T::zero();
        for v in self.iter().map(|v| v.abs()) {
            if v.is_nan() {
                return T::nan();
            }
            out = if v > out { v } else { out };
        }
        out
    }

    fn norm_inf_diff(&self, y: &[T]) -> T {
        zip(self, y).fold(T::zero(), |acc, (&x, &y)| T::max(acc, T::abs(x - y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot() {
        let x = vec![1., 2., 3., 4.];
        let y = vec![4., 5., 6., 7.];
        assert_eq!(x.dot(&y), 60.);
    }

    #[test]
    fn test_axpby() {
        let mut y = vec![1., 1., 1.];
        let x = vec![1., 2., 3.];
        y.axpby(2.0, &x, -1.0);
        assert_eq!(y, vec![1., 3., 5.]);
    }

    #[test]
    fn test_waxpby() {
        let mut w = vec![0.; 3];
        let x = vec![1., 2., 3.];
        let y = vec![3., 2., 1.];
        w.waxpby(1.0, &x, 1.0, &y);
        assert_eq!(w, vec![4., 4., 4.]);
    }

    #[test]
    fn test_norms() {
        let x = vec![1., -3., 2.];
        assert_eq!(x.norm_one(), 6.);
        assert_eq!(x.norm_inf(), 3.);

        let y = [1., f64::NAN, 2.];
        assert!(y.norm_inf().is_nan());
    }
}
