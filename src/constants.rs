// -*- mode: rust; -*-
//
// This file is part of ristretto255.
// See LICENSE for licensing information.

//! Curve parameters, distinguished points, and precomputed tables.
//!
//! Field constants are spelled out in the ten-limb signed representation;
//! the precomputed point tables are built once, on first use.

use once_cell::sync::Lazy;

use crate::edwards::{CompressedEdwardsY, EdwardsBasepointTable, EdwardsPoint};
use crate::field::FieldElement;
use crate::ristretto::{CompressedRistretto, RistrettoBasepointTable, RistrettoPoint};
use crate::scalar::{Scalar, UnpackedScalar};
use crate::window::NafLookupTable;
use crate::curve_models::AffineNielsPoint;

/// Edwards `d` value, equal to `-121665/121666 mod p`.
pub(crate) const EDWARDS_D: FieldElement = FieldElement([
    -10913610, 13857413, -15372611, 6949391, 114729, -8787816, -6275908, -3247719, -18696448,
    -12055116,
]);

/// Edwards `2*d` value.
pub(crate) const EDWARDS_D2: FieldElement = FieldElement([
    -21827239, -5839606, -30745221, 13898782, 229458, 15978800, -12551817, -6495438, 29715968,
    9444199,
]);

/// `= sqrt(a*d - 1)`, where `a = -1 (mod p)` and `d` is the Edwards
/// curve parameter.
pub(crate) const SQRT_AD_MINUS_ONE: FieldElement = FieldElement([
    24849947, -153582, -23613485, 6347715, -21072328, -667138, -25271143, -15367704, -870347,
    14525639,
]);

/// `= 1/sqrt(a - d)`.
pub(crate) const INVSQRT_A_MINUS_D: FieldElement = FieldElement([
    6111485, 4156064, -27798727, 12243468, -25904040, 120897, 20826367, -7060776, 6093568,
    -1986012,
]);

/// One of the two square roots of -1 (mod p); the "positive" one in the
/// sense of the Ed25519 sign convention.
pub(crate) const SQRT_M1: FieldElement = FieldElement([
    -32595792, -7943725, 9377950, 3500415, 12389472, -272473, -25146209, -2005654, 326686,
    11406482,
]);

/// The order of the basepoint,
/// \\(\ell = 2^{252} + 27742317777372353535851937790883648493\\),
/// as an (unreduced) `Scalar`.
pub const BASEPOINT_ORDER: Scalar = Scalar {
    bytes: [
        0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9, 0xde,
        0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x10,
    ],
};

/// \\(\ell - 2\\), the Fermat inversion exponent for the scalar ring.
pub(crate) const BASEPOINT_ORDER_MINUS_2: Scalar = Scalar {
    bytes: [
        0xeb, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9, 0xde,
        0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x10,
    ],
};

/// \\(\ell\\) in nine 29-bit limbs, the form used by the conditional
/// reductions in scalar addition and subtraction.
pub(crate) const L: UnpackedScalar = UnpackedScalar([
    0x1cf5d3ed, 0x009318d2, 0x1de73596, 0x1df3bd45, 0x0000014d, 0x00000000, 0x00000000,
    0x00000000, 0x00100000,
]);

/// The Ed25519 basepoint, with \\(y = 4/5\\) and \\(x\\) positive.
pub const ED25519_BASEPOINT_POINT: EdwardsPoint = EdwardsPoint {
    X: FieldElement([
        -14297830, -7645148, 16144683, -16471763, 27570974, -2696100, -26142465, 8378389,
        20764389, 8758491,
    ]),
    Y: FieldElement([
        -26843541, -6710886, 13421773, -13421773, 26843546, 6710886, -13421773, 13421773,
        -26843546, -6710886,
    ]),
    Z: FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
    T: FieldElement([
        28827062, -6116119, -27349572, 244363, 8635006, 11264893, 19351346, 13413597, 16611511,
        -6414980,
    ]),
};

/// The Ed25519 basepoint in compressed form.
pub const ED25519_BASEPOINT_COMPRESSED: CompressedEdwardsY = CompressedEdwardsY([
    0x58, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66,
]);

/// The Ristretto basepoint: the coset of the Ed25519 basepoint.
pub const RISTRETTO_BASEPOINT_POINT: RistrettoPoint = RistrettoPoint(ED25519_BASEPOINT_POINT);

/// The Ristretto basepoint in compressed form.
pub const RISTRETTO_BASEPOINT_COMPRESSED: CompressedRistretto = CompressedRistretto([
    0xe2, 0xf2, 0xae, 0x0a, 0x6a, 0xbc, 0x4e, 0x71, 0xa8, 0x84, 0xa9, 0x61, 0xc5, 0x00, 0x51,
    0x5f, 0x58, 0xe3, 0x0b, 0x6a, 0xa5, 0x82, 0xdd, 0x8d, 0xb6, 0xa6, 0x59, 0x45, 0xe0, 0x8d,
    0x2d, 0x76,
]);

/// The 8-torsion subgroup \\(\mathcal E[8]\\).
///
/// The subgroup is cyclic; entry \\(i\\) is \\([i] P_8\\) for a
/// generator \\(P_8\\) of order 8, so \\(\mathcal E[4]\\) sits at the
/// even indices and \\(\mathcal E[2]\\) at indices 0 and 4.
pub const EIGHT_TORSION: [EdwardsPoint; 8] = [
    EdwardsPoint {
        X: FieldElement([0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        Y: FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        Z: FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        T: FieldElement([0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
    },
    EdwardsPoint {
        X: FieldElement([
            21352778, 5345713, 4660180, -8347857, 24143090, 14568123, 30185756, -12247770,
            -33528939, 8345319,
        ]),
        Y: FieldElement([
            6952922, 1265500, -6862341, 7057498, 4037696, 5447722, -31680899, 15325402, 19365852,
            -1569102,
        ]),
        Z: FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        T: FieldElement([
            -25262188, -11972680, 11716002, -5869612, -18193162, 16297739, 20670665, -8559098,
            3541543, -5011181,
        ]),
    },
    EdwardsPoint {
        X: FieldElement([
            32595792, 7943725, -9377950, -3500415, -12389472, 272473, 25146209, 2005654, -326686,
            -11406482,
        ]),
        Y: FieldElement([0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        Z: FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        T: FieldElement([0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
    },
    EdwardsPoint {
        X: FieldElement([
            21352778, 5345713, 4660180, -8347857, 24143090, 14568123, 30185756, -12247770,
            -33528939, 8345319,
        ]),
        Y: FieldElement([
            -6952922, -1265500, 6862341, -7057498, -4037696, -5447722, 31680899, -15325402,
            -19365852, 1569102,
        ]),
        Z: FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        T: FieldElement([
            25262188, 11972680, -11716002, 5869612, 18193162, -16297739, -20670665, 8559098,
            -3541543, 5011181,
        ]),
    },
    EdwardsPoint {
        X: FieldElement([0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        Y: FieldElement([-1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        Z: FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        T: FieldElement([0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
    },
    EdwardsPoint {
        X: FieldElement([
            -21352778, -5345713, -4660180, 8347857, -24143090, -14568123, -30185756, 12247770,
            33528939, -8345319,
        ]),
        Y: FieldElement([
            -6952922, -1265500, 6862341, -7057498, -4037696, -5447722, 31680899, -15325402,
            -19365852, 1569102,
        ]),
        Z: FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        T: FieldElement([
            -25262188, -11972680, 11716002, -5869612, -18193162, 16297739, 20670665, -8559098,
            3541543, -5011181,
        ]),
    },
    EdwardsPoint {
        X: FieldElement([
            -32595792, -7943725, 9377950, 3500415, 12389472, -272473, -25146209, -2005654, 326686,
            11406482,
        ]),
        Y: FieldElement([0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        Z: FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        T: FieldElement([0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
    },
    EdwardsPoint {
        X: FieldElement([
            -21352778, -5345713, -4660180, 8347857, -24143090, -14568123, -30185756, 12247770,
            33528939, -8345319,
        ]),
        Y: FieldElement([
            6952922, 1265500, -6862341, 7057498, 4037696, 5447722, -31680899, 15325402, 19365852,
            -1569102,
        ]),
        Z: FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        T: FieldElement([
            25262188, 11972680, -11716002, 5869612, 18193162, -16297739, -20670665, 8559098,
            -3541543, 5011181,
        ]),
    },
];

/// Odd multiples \\([B, 3B, 5B, \ldots, 15B]\\) of the Ed25519
/// basepoint, used by the variable-time double-base multiplication.
pub(crate) static AFFINE_ODD_MULTIPLES_OF_BASEPOINT: Lazy<NafLookupTable<AffineNielsPoint>> =
    Lazy::new(|| NafLookupTable::from(&ED25519_BASEPOINT_POINT));

/// A precomputed table of multiples of the Ed25519 basepoint, built on
/// first use.
pub static ED25519_BASEPOINT_TABLE: Lazy<EdwardsBasepointTable> =
    Lazy::new(|| EdwardsBasepointTable::new(&ED25519_BASEPOINT_POINT));

/// A precomputed table of multiples of the Ristretto basepoint, built on
/// first use.
pub static RISTRETTO_BASEPOINT_TABLE: Lazy<RistrettoBasepointTable> =
    Lazy::new(|| RistrettoBasepointTable::new(&RISTRETTO_BASEPOINT_POINT));

#[cfg(test)]
mod test {
    use super::*;
    use crate::traits::Identity;

    /// Little-endian canonical encoding of the Edwards `d` parameter.
    static EDWARDS_D_BYTES: [u8; 32] = [
        0xa3, 0x78, 0x59, 0x13, 0xca, 0x4d, 0xeb, 0x75, 0xab, 0xd8, 0x41, 0x41, 0x4d, 0x0a, 0x70,
        0x00, 0x98, 0xe8, 0x79, 0x77, 0x79, 0x40, 0xc7, 0x8c, 0x73, 0xfe, 0x6f, 0x2b, 0xee, 0x6c,
        0x03, 0x52,
    ];

    /// Little-endian canonical encoding of `sqrt(-1)`.
    static SQRT_M1_BYTES: [u8; 32] = [
        0xb0, 0xa0, 0x0e, 0x4a, 0x27, 0x1b, 0xee, 0xc4, 0x78, 0xe4, 0x2f, 0xad, 0x06, 0x18, 0x43,
        0x2f, 0xa7, 0xd7, 0xfb, 0x3d, 0x99, 0x00, 0x4d, 0x2b, 0x0b, 0xdf, 0xc1, 0x4f, 0x80, 0x24,
        0x83, 0x2b,
    ];

    #[test]
    fn edwards_d_matches_reference_encoding() {
        assert_eq!(EDWARDS_D, FieldElement::from_bytes(&EDWARDS_D_BYTES));
    }

    #[test]
    fn edwards_d2_is_twice_d() {
        assert_eq!(EDWARDS_D2, &EDWARDS_D + &EDWARDS_D);
    }

    #[test]
    fn sqrt_m1_matches_reference_encoding() {
        assert_eq!(SQRT_M1, FieldElement::from_bytes(&SQRT_M1_BYTES));
    }

    #[test]
    fn sqrt_m1_squares_to_minus_one() {
        assert_eq!(SQRT_M1.square(), FieldElement::MINUS_ONE);
    }

    #[test]
    fn sqrt_ad_minus_one_identity() {
        // s² = a·d - 1 = -1 - d, so -(s² + 1) = d.
        let s_sq_plus_one = &SQRT_AD_MINUS_ONE.square() + &FieldElement::ONE;
        assert_eq!(-&s_sq_plus_one, EDWARDS_D);
    }

    #[test]
    fn invsqrt_a_minus_d_identity() {
        // (1/t)² = a - d = -1 - d, so -(t⁻² + 1) = d.
        let t_inv_sq_plus_one = &INVSQRT_A_MINUS_D.invert().square() + &FieldElement::ONE;
        assert_eq!(-&t_inv_sq_plus_one, EDWARDS_D);
    }

    #[test]
    fn basepoint_matches_compressed_form() {
        let B = ED25519_BASEPOINT_COMPRESSED.decompress().unwrap();
        assert_eq!(B.X, ED25519_BASEPOINT_POINT.X);
        assert_eq!(B.Y, ED25519_BASEPOINT_POINT.Y);
        assert_eq!(B.Z, ED25519_BASEPOINT_POINT.Z);
        assert_eq!(B.T, ED25519_BASEPOINT_POINT.T);
    }

    #[test]
    fn ristretto_basepoint_matches_compressed_form() {
        assert_eq!(
            RISTRETTO_BASEPOINT_POINT.compress(),
            RISTRETTO_BASEPOINT_COMPRESSED
        );
    }

    #[test]
    fn twenty_nine_bit_limbs_match_basepoint_order() {
        assert_eq!(L.pack(), BASEPOINT_ORDER);
    }

    #[test]
    fn basepoint_order_minus_2_is_consistent() {
        assert_eq!(
            BASEPOINT_ORDER.bytes[0],
            BASEPOINT_ORDER_MINUS_2.bytes[0] + 2
        );
        assert_eq!(BASEPOINT_ORDER.bytes[1..], BASEPOINT_ORDER_MINUS_2.bytes[1..]);
    }

    #[test]
    fn basepoint_order_kills_basepoint() {
        let B = &*ED25519_BASEPOINT_TABLE;
        assert!((B * &BASEPOINT_ORDER).is_identity());
    }

    #[test]
    fn affine_odd_multiples_match_doubling_chain() {
        let B = ED25519_BASEPOINT_POINT;
        let B2 = B.double();
        let mut expected = B;
        for x in (1usize..16).step_by(2) {
            let entry = (&EdwardsPoint::identity() + &AFFINE_ODD_MULTIPLES_OF_BASEPOINT.select(x))
                .as_extended();
            assert_eq!(entry.compress(), expected.compress());
            expected = &expected + &B2;
        }
    }
}
