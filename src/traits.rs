// -*- mode: rust; -*-
//
// This file is part of ristretto255.
// See LICENSE for licensing information.

//! Traits shared by the point types.

use core::borrow::Borrow;

use subtle::ConstantTimeEq;

use crate::scalar::Scalar;

/// The additive identity of a group (or the "zero" of a point model).
pub trait Identity {
    /// Returns the identity element.
    fn identity() -> Self;
}

/// Testing whether an element is the identity.
pub trait IsIdentity {
    /// Returns `true` if this element is the identity.
    fn is_identity(&self) -> bool;
}

impl<T> IsIdentity for T
where
    T: ConstantTimeEq + Identity,
{
    fn is_identity(&self) -> bool {
        self.ct_eq(&T::identity()).into()
    }
}

/// Constant-time multi-scalar multiplication.
pub trait MultiscalarMul {
    /// The resulting point type.
    type Point;

    /// Compute \\(c_1 P_1 + \cdots + c_n P_n\\) in time independent of the
    /// scalar values.
    ///
    /// # Panics
    ///
    /// Panics if the two iterators have different lengths.
    fn multiscalar_mul<I, J>(scalars: I, points: J) -> Self::Point
    where
        I: IntoIterator,
        I::Item: Borrow<Scalar>,
        J: IntoIterator,
        J::Item: Borrow<Self::Point>;
}

/// Variable-time multi-scalar multiplication.
///
/// The running time leaks the scalar values; never use this with secret
/// scalars.
pub trait VartimeMultiscalarMul {
    /// The resulting point type.
    type Point;

    /// Compute \\(c_1 P_1 + \cdots + c_n P_n\\), choosing the cheapest
    /// algorithm for the input size.
    ///
    /// # Panics
    ///
    /// Panics if the two iterators have different lengths.
    fn vartime_multiscalar_mul<I, J>(scalars: I, points: J) -> Self::Point
    where
        I: IntoIterator,
        I::Item: Borrow<Scalar>,
        J: IntoIterator,
        J::Item: Borrow<Self::Point>;
}
