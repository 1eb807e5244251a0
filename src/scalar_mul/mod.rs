// -*- mode: rust; -*-
//
// This file is part of ristretto255.
// See LICENSE for licensing information.

//! Multi-scalar multiplication.
//!
//! Two algorithms share the work: a constant-time interleaved ladder
//! (Straus's method) used whenever scalars may be secret, and a
//! variable-time bucket method (Pippenger's algorithm) that wins for
//! larger batches.  The [`MultiscalarMul`] and [`VartimeMultiscalarMul`]
//! impls for the public point types live here, next to the dispatch
//! logic.

#![allow(non_snake_case)]

use core::borrow::Borrow;

use crate::edwards::EdwardsPoint;
use crate::ristretto::RistrettoPoint;
use crate::scalar::Scalar;
use crate::traits::{MultiscalarMul, VartimeMultiscalarMul};

pub(crate) mod pippenger;
pub(crate) mod straus;

/// Pippenger beats Straus from roughly this many points onward.
const PIPPENGER_CUTOFF: usize = 30;

impl MultiscalarMul for EdwardsPoint {
    type Point = EdwardsPoint;

    fn multiscalar_mul<I, J>(scalars: I, points: J) -> EdwardsPoint
    where
        I: IntoIterator,
        I::Item: Borrow<Scalar>,
        J: IntoIterator,
        J::Item: Borrow<EdwardsPoint>,
    {
        let scalars: Vec<Scalar> = scalars.into_iter().map(|s| *s.borrow()).collect();
        let points: Vec<EdwardsPoint> = points.into_iter().map(|P| *P.borrow()).collect();
        assert_eq!(scalars.len(), points.len());

        straus::multiscalar_mul(&scalars, &points)
    }
}

impl VartimeMultiscalarMul for EdwardsPoint {
    type Point = EdwardsPoint;

    fn vartime_multiscalar_mul<I, J>(scalars: I, points: J) -> EdwardsPoint
    where
        I: IntoIterator,
        I::Item: Borrow<Scalar>,
        J: IntoIterator,
        J::Item: Borrow<EdwardsPoint>,
    {
        let scalars: Vec<Scalar> = scalars.into_iter().map(|s| *s.borrow()).collect();
        let points: Vec<EdwardsPoint> = points.into_iter().map(|P| *P.borrow()).collect();
        assert_eq!(scalars.len(), points.len());

        if points.len() >= PIPPENGER_CUTOFF {
            pippenger::vartime_multiscalar_mul(&scalars, &points)
        } else {
            straus::multiscalar_mul(&scalars, &points)
        }
    }
}

impl MultiscalarMul for RistrettoPoint {
    type Point = RistrettoPoint;

    fn multiscalar_mul<I, J>(scalars: I, points: J) -> RistrettoPoint
    where
        I: IntoIterator,
        I::Item: Borrow<Scalar>,
        J: IntoIterator,
        J::Item: Borrow<RistrettoPoint>,
    {
        let extended_points = points.into_iter().map(|P| P.borrow().0);
        RistrettoPoint(EdwardsPoint::multiscalar_mul(scalars, extended_points))
    }
}

impl VartimeMultiscalarMul for RistrettoPoint {
    type Point = RistrettoPoint;

    fn vartime_multiscalar_mul<I, J>(scalars: I, points: J) -> RistrettoPoint
    where
        I: IntoIterator,
        I::Item: Borrow<Scalar>,
        J: IntoIterator,
        J::Item: Borrow<RistrettoPoint>,
    {
        let extended_points = points.into_iter().map(|P| P.borrow().0);
        RistrettoPoint(EdwardsPoint::vartime_multiscalar_mul(scalars, extended_points))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants;
    use crate::traits::Identity;

    /// Deterministic but unstructured (scalar, point) pairs, the same
    /// construction for every multiscalar test.
    fn test_pairs(n: usize) -> (Vec<Scalar>, Vec<EdwardsPoint>) {
        let x = Scalar::from(2128506u64).invert();
        let y = Scalar::from(4443282u64).invert();
        let points: Vec<EdwardsPoint> = (0..n)
            .map(|i| &constants::ED25519_BASEPOINT_POINT * &Scalar::from(1 + i as u64))
            .collect();
        let scalars: Vec<Scalar> = (0..n)
            .map(|i| &x + &(&Scalar::from(i as u64) * &y))
            .collect();
        (scalars, points)
    }

    fn naive(scalars: &[Scalar], points: &[EdwardsPoint]) -> EdwardsPoint {
        scalars
            .iter()
            .zip(points.iter())
            .fold(EdwardsPoint::identity(), |acc, (s, P)| &acc + &(P * s))
    }

    #[test]
    fn straus_matches_naive() {
        let (scalars, points) = test_pairs(8);
        let expected = naive(&scalars, &points);
        let subject = straus::multiscalar_mul(&scalars, &points);
        assert_eq!(subject.compress(), expected.compress());
    }

    #[test]
    fn pippenger_matches_naive_at_each_window_size() {
        // 128 points exercises w = 6; the larger windows only differ in
        // digit width, covered by the radix_2w reconstruction tests.
        let mut n = 128;
        let (scalars, points) = test_pairs(n);
        let premultiplied: Vec<EdwardsPoint> = scalars
            .iter()
            .zip(points.iter())
            .map(|(s, P)| P * s)
            .collect();

        while n > 0 {
            let expected = premultiplied[0..n]
                .iter()
                .fold(EdwardsPoint::identity(), |acc, P| &acc + P);
            let subject = pippenger::vartime_multiscalar_mul(&scalars[0..n], &points[0..n]);
            assert_eq!(subject.compress(), expected.compress());
            n /= 2;
        }
    }

    #[test]
    fn straus_and_pippenger_agree_at_dispatch_boundary() {
        let (scalars, points) = test_pairs(30);
        let by_straus = straus::multiscalar_mul(&scalars, &points);
        let by_pippenger = pippenger::vartime_multiscalar_mul(&scalars, &points);
        let by_naive = naive(&scalars, &points);
        let by_dispatch = EdwardsPoint::vartime_multiscalar_mul(&scalars, &points);

        assert_eq!(by_straus.compress(), by_naive.compress());
        assert_eq!(by_pippenger.compress(), by_naive.compress());
        assert_eq!(by_dispatch.compress(), by_naive.compress());
    }

    #[test]
    fn multiscalar_is_linear() {
        let s = Scalar::from(99999u64);
        let P = &constants::ED25519_BASEPOINT_POINT * &Scalar::from(3u64);
        let Q = &constants::ED25519_BASEPOINT_POINT * &Scalar::from(7u64);

        let lhs = &(&P * &s) + &(&Q * &s);
        let rhs = &(&P + &Q) * &s;
        assert_eq!(lhs.compress(), rhs.compress());

        let multi = EdwardsPoint::multiscalar_mul(&[s, s], &[P, Q]);
        assert_eq!(multi.compress(), lhs.compress());
    }

    #[test]
    fn ristretto_multiscalar_matches_edwards() {
        let scalars = [Scalar::from(8675309u64), Scalar::from(24601u64)];
        let B = constants::RISTRETTO_BASEPOINT_POINT;
        let points = [B, &B + &B];

        let result = RistrettoPoint::vartime_multiscalar_mul(&scalars, &points);
        let expected = &(&points[0] * &scalars[0]) + &(&points[1] * &scalars[1]);
        assert_eq!(result, expected);

        let ct_result = RistrettoPoint::multiscalar_mul(&scalars, &points);
        assert_eq!(ct_result, expected);
    }
}
