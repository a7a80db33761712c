/// BLAS-1 style operations on slices of [`FloatT`](crate::algebra::FloatT)
/// values.
///
/// Only the kernels actually exercised by the solver are provided.  All
/// mutating operations return `&mut Self` so that calls can be chained.
pub trait VectorMath {
    type T;

    /// Copy values from `src`.  Lengths must agree.
    fn copy_from(&mut self, src: &Self) -> &mut Self;

    /// Set all elements to the scalar `c`.
    fn set(&mut self, c: Self::T) -> &mut Self;

    /// Multiply all elements by the scalar `c`.
    fn scale(&mut self, c: Self::T) -> &mut Self;

    /// Flip the sign of all elements.
    fn negate(&mut self) -> &mut Self;

    /// `self = a*x + b*self`
    fn axpby(&mut self, a: Self::T, x: &Self, b: Self::T) -> &mut Self;

    /// `self = a*x + b*y`
    fn waxpby(&mut self, a: Self::T, x: &Self, b: Self::T, y: &Self) -> &mut Self;

    /// Inner product.
    fn dot(&self, y: &Self) -> Self::T;

    /// One norm.
    fn norm_one(&self) -> Self::T;

    /// Infinity norm.  `Amax` in BLAS terms.
    fn norm_inf(&self) -> Self::T;

    /// Largest absolute difference to `y`, for tests.
    fn norm_inf_diff(&self, y: &Self) -> Self::T;
}
