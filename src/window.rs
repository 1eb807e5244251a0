// -*- mode: rust; -*-
//
// This file is part of ristretto255.
// See LICENSE for licensing information.

//! Lookup tables of precomputed point multiples.

#![allow(non_snake_case)]

use core::fmt::Debug;

use subtle::Choice;
use subtle::ConditionallyNegatable;
use subtle::ConditionallySelectable;
use subtle::ConstantTimeEq;

use crate::curve_models::{AffineNielsPoint, ProjectiveNielsPoint};
use crate::edwards::EdwardsPoint;
use crate::traits::Identity;

/// A table of multiples \\([P, 2P, \ldots, 8P]\\) of a point \\(P\\),
/// supporting constant-time selection of \\(xP\\) for
/// \\(-8 \leq x \leq 8\\).
#[derive(Copy, Clone)]
pub(crate) struct LookupTable<T>(pub(crate) [T; 8]);

impl<T> LookupTable<T>
where
    T: Identity + ConditionallySelectable + ConditionallyNegatable,
{
    /// Given \\(-8 \leq x \leq 8\\), return \\(xP\\) in constant time:
    /// the whole table is scanned with equality masks regardless of `x`.
    pub fn select(&self, x: i8) -> T {
        debug_assert!((-8..=8).contains(&x));

        // xabs = |x|, without branching on the sign.
        let xmask = x >> 7;
        let xabs = ((x + xmask) ^ xmask) as u8;

        let mut t = T::identity();
        for j in 1..9 {
            // t := j*P exactly when |x| == j.
            t.conditional_assign(&self.0[j - 1], xabs.ct_eq(&(j as u8)));
        }
        // Now t == |x|*P; fix the sign.
        t.conditional_negate(Choice::from((xmask & 1) as u8));

        t
    }
}

impl<'a> From<&'a EdwardsPoint> for LookupTable<ProjectiveNielsPoint> {
    fn from(P: &'a EdwardsPoint) -> Self {
        let mut points = [P.as_projective_niels(); 8];
        for j in 0..7 {
            points[j + 1] = (P + &points[j]).as_extended().as_projective_niels();
        }
        LookupTable(points)
    }
}

impl<'a> From<&'a EdwardsPoint> for LookupTable<AffineNielsPoint> {
    fn from(P: &'a EdwardsPoint) -> Self {
        let mut points = [P.as_affine_niels(); 8];
        for j in 0..7 {
            points[j + 1] = (P + &points[j]).as_extended().as_affine_niels();
        }
        LookupTable(points)
    }
}

impl<T: Debug> Debug for LookupTable<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "LookupTable({:?})", &self.0)
    }
}

/// A table of odd multiples \\([P, 3P, 5P, \ldots, 15P]\\) of a point
/// \\(P\\), indexed directly by NAF digit.
///
/// Selection is a plain array index and therefore variable-time; these
/// tables only ever see public data.
#[derive(Copy, Clone)]
pub(crate) struct NafLookupTable<T>(pub(crate) [T; 8]);

impl<T: Copy> NafLookupTable<T> {
    /// Given odd \\(0 < x < 16\\), return \\(xP\\).
    pub fn select(&self, x: usize) -> T {
        debug_assert_eq!(x & 1, 1);
        debug_assert!(x < 16);

        self.0[x / 2]
    }
}

impl<'a> From<&'a EdwardsPoint> for NafLookupTable<ProjectiveNielsPoint> {
    fn from(A: &'a EdwardsPoint) -> Self {
        let mut Ai = [A.as_projective_niels(); 8];
        let A2 = A.double();
        for i in 0..7 {
            Ai[i + 1] = (&A2 + &Ai[i]).as_extended().as_projective_niels();
        }
        // Now Ai = [A, 3A, 5A, 7A, 9A, 11A, 13A, 15A]
        NafLookupTable(Ai)
    }
}

impl<'a> From<&'a EdwardsPoint> for NafLookupTable<AffineNielsPoint> {
    fn from(A: &'a EdwardsPoint) -> Self {
        let mut Ai = [A.as_affine_niels(); 8];
        let A2 = A.double();
        for i in 0..7 {
            Ai[i + 1] = (&A2 + &Ai[i]).as_extended().as_affine_niels();
        }
        // Now Ai = [A, 3A, 5A, 7A, 9A, 11A, 13A, 15A]
        NafLookupTable(Ai)
    }
}

impl<T: Debug> Debug for NafLookupTable<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NafLookupTable({:?})", &self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants;

    #[test]
    fn lookup_table_select_spans_signed_window() {
        let B = constants::ED25519_BASEPOINT_POINT;
        let table = LookupTable::<ProjectiveNielsPoint>::from(&B);

        // select(0) is the identity addend.
        let zero = table.select(0);
        let sum = (&B + &zero).as_extended();
        assert_eq!(sum.compress(), B.compress());

        // select(d) == d*B, select(-d) == -d*B.
        let mut multiple = B;
        for d in 1i8..=8 {
            let selected = (&EdwardsPoint::identity() + &table.select(d)).as_extended();
            assert_eq!(selected.compress(), multiple.compress());

            let negated = (&EdwardsPoint::identity() + &table.select(-d)).as_extended();
            assert_eq!(negated.compress(), (-&multiple).compress());

            multiple = &multiple + &B;
        }
    }

    #[test]
    fn naf_lookup_table_holds_odd_multiples() {
        let B = constants::ED25519_BASEPOINT_POINT;
        let table = NafLookupTable::<ProjectiveNielsPoint>::from(&B);

        let mut expected = B;
        let B2 = B.double();
        for x in (1usize..16).step_by(2) {
            let entry = (&EdwardsPoint::identity() + &table.select(x)).as_extended();
            assert_eq!(entry.compress(), expected.compress());
            expected = &expected + &B2;
        }
    }
}
