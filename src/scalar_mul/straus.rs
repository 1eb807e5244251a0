// -*- mode: rust; -*-
//
// This file is part of ristretto255.
// See LICENSE for licensing information.

//! Straus's method: constant-time multi-scalar multiplication.

#![allow(non_snake_case)]

use crate::curve_models::ProjectiveNielsPoint;
use crate::edwards::EdwardsPoint;
use crate::scalar::Scalar;
use crate::traits::Identity;
use crate::window::LookupTable;

/// Compute \\(\sum_i s_i P_i\\) in time independent of the scalar values.
///
/// Each point gets its own signed radix-16 window table; a single
/// doubling ladder is then shared across all inputs,
///
/// ```text
///   s_1 P_1 =   P_1 e_{1,0} + 16 (P_1 e_{1,1} + 16 (... + 16 P_1 e_{1,63})...)
/// + s_2 P_2 = + P_2 e_{2,0} + 16 (P_2 e_{2,1} + 16 (... + 16 P_2 e_{2,63})...)
///     ...
/// ```
///
/// summed column-wise top to bottom, then right to left, paying the four
/// doublings once per column instead of once per point.  Table selection
/// is a full constant-time scan for every digit.
pub(crate) fn multiscalar_mul(scalars: &[Scalar], points: &[EdwardsPoint]) -> EdwardsPoint {
    let lookup_tables: Vec<LookupTable<ProjectiveNielsPoint>> =
        points.iter().map(LookupTable::from).collect();

    let scalar_digits: Vec<[i8; 64]> = scalars.iter().map(Scalar::to_radix_16).collect();

    let mut Q = EdwardsPoint::identity();
    for j in (0..64).rev() {
        Q = Q.mul_by_pow_2(4);
        for (digits, table) in scalar_digits.iter().zip(lookup_tables.iter()) {
            Q = (&Q + &table.select(digits[j])).as_extended();
        }
    }
    Q
}
