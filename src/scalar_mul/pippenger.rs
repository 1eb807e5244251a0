// -*- mode: rust; -*-
//
// This file is part of ristretto255.
// See LICENSE for licensing information.

//! Pippenger's bucket method: variable-time multi-scalar multiplication
//! for larger batches.

#![allow(non_snake_case)]

use crate::curve_models::ProjectiveNielsPoint;
use crate::edwards::EdwardsPoint;
use crate::scalar::Scalar;
use crate::traits::Identity;

/// Compute \\(\sum_i s_i P_i\\) in variable time.
///
/// Scalars are expanded in signed radix \\(2^w\\).  For each digit
/// position, every point is added to (or subtracted from) the bucket
/// indexed by its digit's magnitude; the buckets are then folded with
/// the running-sum trick,
///
/// ```text
///   C
///   C B
///   C B A    sum = C + (C+B) + (C+B+A) = 3C + 2B + 1A,
/// ```
///
/// which charges one addition per bucket instead of one per index.  The
/// per-position results are combined with \\(w\\) doublings each.
///
/// The bucket count grows as \\(2^{w-1}\\) while the addition count
/// shrinks as \\(n \cdot 256 / w\\), so the window widens slowly with
/// the input size.
///
/// Runs in time dependent on the scalar values; never use with secrets.
pub(crate) fn vartime_multiscalar_mul(scalars: &[Scalar], points: &[EdwardsPoint]) -> EdwardsPoint {
    let size = points.len();
    let w = if size < 500 {
        6
    } else if size < 800 {
        7
    } else {
        8
    };

    let buckets_count: usize = 1 << (w - 1);
    // The signed digits of a 256-bit scalar in radix 2^8 need a 33rd
    // position for the final carry; narrower windows absorb it into the
    // top digit.
    let digits_count: usize = if w == 8 { 33 } else { (256 + w - 1) / w };

    let scalar_digits: Vec<[i8; 43]> = scalars.iter().map(|s| s.to_radix_2w(w)).collect();
    let cached_points: Vec<ProjectiveNielsPoint> =
        points.iter().map(EdwardsPoint::as_projective_niels).collect();

    let mut buckets: Vec<EdwardsPoint> = vec![EdwardsPoint::identity(); buckets_count];

    let mut Q: Option<EdwardsPoint> = None;
    for k in (0..digits_count).rev() {
        for bucket in buckets.iter_mut() {
            *bucket = EdwardsPoint::identity();
        }

        for (digits, point) in scalar_digits.iter().zip(cached_points.iter()) {
            let digit = digits[k] as isize;
            if digit > 0 {
                let b = (digit - 1) as usize;
                buckets[b] = (&buckets[b] + point).as_extended();
            } else if digit < 0 {
                let b = (-digit - 1) as usize;
                buckets[b] = (&buckets[b] - point).as_extended();
            }
        }

        // Fold Σ (b+1)·buckets[b] with two running sums, highest bucket
        // first.
        let mut intermediate_sum = buckets[buckets_count - 1];
        let mut sum = buckets[buckets_count - 1];
        for i in (0..(buckets_count - 1)).rev() {
            intermediate_sum = &intermediate_sum + &buckets[i];
            sum = &sum + &intermediate_sum;
        }

        Q = Some(match Q {
            Some(Q) => &Q.mul_by_pow_2(w as u32) + &sum,
            None => sum,
        });
    }

    Q.unwrap_or_else(EdwardsPoint::identity)
}
