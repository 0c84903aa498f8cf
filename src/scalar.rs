//! Scalar field abstraction.
//!
//! The teacher crate expresses its generic linear algebra over
//! `alga::general::{RealField, ComplexField}`. That trait pair is not part of
//! this crate's dependency table (its exact method surface could not be
//! verified against the retrieved pack), so the same shape is reproduced
//! here as a small, self-contained trait pair with blanket impls for the four
//! concrete scalar types the engine actually runs over: `f32`, `f64`,
//! `Complex<f32>`, `Complex<f64>`.

use num_complex::Complex;
use num_traits::{Float, One, Zero};
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// An ordered floating field: the "R" of the specification.
///
/// Provides the machine epsilon εR and the safe-minimum positive value μR
/// used throughout the deflation and scaling logic.
pub trait RealScalar:
    Copy
    + PartialOrd
    + Zero
    + One
    + Neg<Output = Self>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + AddAssign
    + SubAssign
    + Debug
    + 'static
{
    /// Machine epsilon, εR.
    fn epsilon() -> Self;
    /// Safe minimum positive value, μR (analogous to LAPACK's `dlamch('S')`).
    fn safe_min() -> Self;
    fn abs(self) -> Self;
    fn sqrt(self) -> Self;
    fn signum(self) -> Self;
    fn from_usize(n: usize) -> Self;
}

macro_rules! impl_real_scalar {
    ($t:ty) => {
        impl RealScalar for $t {
            #[inline]
            fn epsilon() -> Self {
                <$t>::EPSILON
            }

            #[inline]
            fn safe_min() -> Self {
                // LAPACK's dlamch('S'): smallest x such that 1/x does not overflow.
                let tiny = <$t>::MIN_POSITIVE;
                let big_inv = <$t>::MAX.recip();
                if tiny < big_inv {
                    big_inv * (1.0 as $t + <$t>::EPSILON)
                } else {
                    tiny
                }
            }

            #[inline]
            fn abs(self) -> Self {
                Float::abs(self)
            }

            #[inline]
            fn sqrt(self) -> Self {
                Float::sqrt(self)
            }

            #[inline]
            fn signum(self) -> Self {
                if self > 0.0 {
                    1.0
                } else if self < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }

            #[inline]
            fn from_usize(n: usize) -> Self {
                n as $t
            }
        }
    };
}

impl_real_scalar!(f32);
impl_real_scalar!(f64);

/// The field F of the specification: either R itself or C = R + iR.
///
/// Mirrors `alga::general::ComplexField` as used throughout the teacher's
/// `linalg` module (`.norm1()`, `.sqrt()`, `.signum()`, `N::from_real(..)`):
/// field operations plus the L¹ magnitude `‖z‖₁ = |Re z| + |Im z|` and a
/// `sqrt` that is well-defined even when `Self` is complex.
pub trait ComplexScalar:
    Copy
    + Zero
    + One
    + Neg<Output = Self>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + AddAssign
    + SubAssign
    + Debug
    + PartialEq
    + 'static
{
    /// The associated real subfield, R.
    type Real: RealScalar;

    fn re(self) -> Self::Real;
    fn im(self) -> Self::Real;
    fn conjugate(self) -> Self;
    /// `|z|`, i.e. the Euclidean modulus (equals `|x|` when `Self` is real).
    fn modulus(self) -> Self::Real;
    /// `‖z‖₁ = |Re z| + |Im z|`.
    fn norm1(self) -> Self::Real;
    fn sqrt(self) -> Self;
    fn from_real(r: Self::Real) -> Self;
    fn scale(self, factor: Self::Real) -> Self;

    #[inline]
    fn is_zero_scalar(self) -> bool {
        self == Self::zero()
    }
}

macro_rules! impl_complex_scalar_for_real {
    ($t:ty) => {
        impl ComplexScalar for $t {
            type Real = $t;

            #[inline]
            fn re(self) -> Self::Real {
                self
            }
            #[inline]
            fn im(self) -> Self::Real {
                0.0
            }
            #[inline]
            fn conjugate(self) -> Self {
                self
            }
            #[inline]
            fn modulus(self) -> Self::Real {
                RealScalar::abs(self)
            }
            #[inline]
            fn norm1(self) -> Self::Real {
                RealScalar::abs(self)
            }
            #[inline]
            fn sqrt(self) -> Self {
                RealScalar::sqrt(self)
            }
            #[inline]
            fn from_real(r: Self::Real) -> Self {
                r
            }
            #[inline]
            fn scale(self, factor: Self::Real) -> Self {
                self * factor
            }
        }
    };
}

impl_complex_scalar_for_real!(f32);
impl_complex_scalar_for_real!(f64);

macro_rules! impl_complex_scalar_for_complex {
    ($t:ty) => {
        impl ComplexScalar for Complex<$t> {
            type Real = $t;

            #[inline]
            fn re(self) -> Self::Real {
                self.re
            }
            #[inline]
            fn im(self) -> Self::Real {
                self.im
            }
            #[inline]
            fn conjugate(self) -> Self {
                Complex::new(self.re, -self.im)
            }
            #[inline]
            fn modulus(self) -> Self::Real {
                self.norm()
            }
            #[inline]
            fn norm1(self) -> Self::Real {
                RealScalar::abs(self.re) + RealScalar::abs(self.im)
            }
            #[inline]
            fn sqrt(self) -> Self {
                self.sqrt()
            }
            #[inline]
            fn from_real(r: Self::Real) -> Self {
                Complex::new(r, <$t as num_traits::Zero>::zero())
            }
            #[inline]
            fn scale(self, factor: Self::Real) -> Self {
                self * factor
            }
        }
    };
}

impl_complex_scalar_for_complex!(f32);
impl_complex_scalar_for_complex!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_epsilon_and_safe_min_are_tiny_and_positive() {
        assert!(f64::epsilon() > 0.0 && f64::epsilon() < 1e-10);
        assert!(f64::safe_min() > 0.0 && f64::safe_min() < 1e-100);
    }

    #[test]
    fn norm1_matches_manhattan_magnitude() {
        let z = Complex::new(3.0_f64, -4.0);
        assert_eq!(z.norm1(), 7.0);
        assert_eq!(ComplexScalar::modulus(z), 5.0);
    }

    #[test]
    fn real_scalar_acts_as_its_own_complex_field() {
        let x: f64 = -2.5;
        assert_eq!(ComplexScalar::norm1(x), 2.5);
        assert_eq!(x.conjugate(), x);
    }
}
