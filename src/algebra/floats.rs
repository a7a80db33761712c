use num_traits::{Float, FromPrimitive, NumAssign};

/// Trait for the floating point types used by the solver.
///
/// Everything numerical in this crate is generic over `FloatT`, with
/// implementations provided for the native `f32` and `f64` types.  Any
/// other type satisfying the constituent bounds should also work.

pub trait FloatT:
    'static
    + Float
    + NumAssign
    + Default
    + FromPrimitive
    + std::fmt::Display
    + std::fmt::LowerExp
    + std::fmt::Debug
{
}
impl FloatT for f32 {}
impl FloatT for f64 {}

/// Conversion of primitive constants to [`FloatT`].
///
/// Allows `(0.99).as_T()` on literal constants instead of the much more
/// verbose `T::from_f64(0.99).unwrap()`.

#[allow(non_snake_case)]
pub trait AsFloatT<T>: 'static {
    fn as_T(&self) -> T;
}

macro_rules! impl_as_T {
    ($ty:ty, $ident:ident) => {
        impl<T> AsFloatT<T> for $ty
        where
            T: FromPrimitive + 'static,
        {
            #[inline]
            fn as_T(&self) -> T {
                T::$ident(*self).unwrap()
            }
        }
    };
}
impl_as_T!(u32, from_u32);
impl_as_T!(usize, from_usize);
impl_as_T!(f64, from_f64);
