// -*- mode: rust; -*-
//
// This file is part of ristretto255.
// See LICENSE for licensing information.

//! The Ristretto prime-order group over Curve25519.
//!
//! Ristretto quotients the Edwards curve by its 8-torsion subgroup: a
//! [`RistrettoPoint`] is internally an [`EdwardsPoint`], but equality,
//! encoding, and decoding are defined coset-wise, so the cofactor is
//! invisible to callers and the group behaves as if it had prime order
//! \\(\ell\\).
//!
//! Two Edwards points that differ by 4-torsion are the *same* Ristretto
//! point; the encoding picks a canonical representative of each coset
//! (the Jacobi-quartic \\(s\\)-coordinate with two sign choices fixed),
//! and decoding rejects everything that is not such a canonical
//! representative.

#![allow(non_snake_case)]

use core::fmt::Debug;
use core::ops::{Add, AddAssign};
use core::ops::{Mul, MulAssign};
use core::ops::{Neg, Sub, SubAssign};

use subtle::Choice;
use subtle::ConditionallyNegatable;
use subtle::ConditionallySelectable;
use subtle::ConstantTimeEq;

#[cfg(feature = "digest")]
use digest::consts::U64;
#[cfg(feature = "digest")]
use digest::Digest;

#[cfg(feature = "rand_core")]
use rand_core::{CryptoRng, RngCore};

use crate::constants;
use crate::curve_models::CompletedPoint;
use crate::edwards::{EdwardsBasepointTable, EdwardsPoint};
use crate::errors::InvalidEncoding;
use crate::field::FieldElement;
use crate::scalar::Scalar;
use crate::traits::Identity;

// ------------------------------------------------------------------------
// Compressed points
// ------------------------------------------------------------------------

/// A Ristretto point, in the canonical 32-byte wire format.
///
/// The encoding is canonical: two points are equal if and only if their
/// encodings are byte-identical.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct CompressedRistretto(pub [u8; 32]);

impl Debug for CompressedRistretto {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CompressedRistretto: {:?}", self.as_bytes())
    }
}

impl Identity for CompressedRistretto {
    fn identity() -> CompressedRistretto {
        CompressedRistretto([0u8; 32])
    }
}

impl CompressedRistretto {
    /// View this `CompressedRistretto` as an array of bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Copy this `CompressedRistretto` to an array of bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Attempt to decompress to a `RistrettoPoint`.
    ///
    /// Fails with [`InvalidEncoding`] unless the input is the canonical
    /// encoding of some point: the field element must be canonically
    /// encoded and non-negative, its square-root computation must
    /// succeed, and the resulting representative must pass the sign
    /// checks.
    pub fn decompress(&self) -> Result<RistrettoPoint, InvalidEncoding> {
        // Step 1: decode s and reject non-canonical or negative inputs.
        //
        // Field decoding ignores the high bit, so the only way to smuggle
        // in a non-canonical s is to encode a small value v as v + p;
        // re-encoding catches that, since our encoder is canonical.
        let s = FieldElement::from_bytes(self.as_bytes());
        let s_encoding_is_canonical = s.to_bytes()[..].ct_eq(&self.as_bytes()[..]);
        let s_is_negative = s.is_negative();

        if (!s_encoding_is_canonical | s_is_negative).into() {
            return Err(InvalidEncoding);
        }

        // Step 2: reconstruct the extended coordinates:
        //
        //   y = (1 + a s²) / (1 - a s²),  x = |2s / sqrt(v)|
        //
        // with a = -1 and v = a d (1+as²)² - (1-as²)².
        let one = FieldElement::ONE;
        let ss = s.square();
        let u1 = &one - &ss; // 1 + a*s²
        let u2 = &one + &ss; // 1 - a*s²
        let u2_sqr = u2.square();

        // v = a*d*u1² - u2²
        let v = &(-&(&constants::EDWARDS_D * &u1.square())) - &u2_sqr;

        // I = 1/sqrt(v*u2²); fails iff v*u2² is nonsquare or zero.
        let (ok, I) = (&v * &u2_sqr).invsqrt();

        let Dx = &I * &u2; // 1/sqrt(v)
        let Dy = &I * &(&Dx * &v); // 1/u2

        // x = |2s/sqrt(v)|, i.e. + sqrt(4s²/v).
        let mut x = &(&s + &s) * &Dx;
        let x_is_negative = x.is_negative();
        x.conditional_negate(x_is_negative);

        let y = &u1 * &Dy;
        let t = &x * &y;

        // A canonical representative has non-negative t and xy, and
        // nonzero y.
        if (!ok | t.is_negative() | y.is_zero()).into() {
            return Err(InvalidEncoding);
        }
        Ok(RistrettoPoint(EdwardsPoint {
            X: x,
            Y: y,
            Z: one,
            T: t,
        }))
    }
}

// ------------------------------------------------------------------------
// The group elements
// ------------------------------------------------------------------------

/// An element of the prime-order Ristretto group.
///
/// Internally a coset representative on the Edwards curve; the group
/// operations are exactly as fast as the Edwards operations.
#[derive(Copy, Clone)]
pub struct RistrettoPoint(pub(crate) EdwardsPoint);

impl Identity for RistrettoPoint {
    fn identity() -> RistrettoPoint {
        RistrettoPoint(EdwardsPoint::identity())
    }
}

impl Default for RistrettoPoint {
    fn default() -> RistrettoPoint {
        RistrettoPoint::identity()
    }
}

impl Debug for RistrettoPoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "RistrettoPoint: coset representative {:?}", &self.0)
    }
}

impl Eq for RistrettoPoint {}

impl PartialEq for RistrettoPoint {
    fn eq(&self, other: &RistrettoPoint) -> bool {
        self.ct_eq(other).into()
    }
}

impl ConstantTimeEq for RistrettoPoint {
    /// Test equality of cosets in constant time, without encoding:
    /// \\(P = Q\\) in the quotient iff
    /// \\(X_1 Y_2 = Y_1 X_2\\) or \\(X_1 X_2 = Y_1 Y_2\\).
    fn ct_eq(&self, other: &RistrettoPoint) -> Choice {
        let X1Y2 = &self.0.X * &other.0.Y;
        let Y1X2 = &self.0.Y * &other.0.X;
        let X1X2 = &self.0.X * &other.0.X;
        let Y1Y2 = &self.0.Y * &other.0.Y;

        X1Y2.ct_eq(&Y1X2) | X1X2.ct_eq(&Y1Y2)
    }
}

impl ConditionallySelectable for RistrettoPoint {
    fn conditional_select(
        a: &RistrettoPoint,
        b: &RistrettoPoint,
        choice: Choice,
    ) -> RistrettoPoint {
        RistrettoPoint(EdwardsPoint::conditional_select(&a.0, &b.0, choice))
    }
}

impl RistrettoPoint {
    /// Compress in the Ristretto wire format, in constant time.
    pub fn compress(&self) -> CompressedRistretto {
        let mut X = self.0.X;
        let mut Y = self.0.Y;
        let Z = &self.0.Z;
        let T = &self.0.T;

        let u1 = &(Z + &Y) * &(Z - &Y);
        let u2 = &X * &Y;
        // u1*u2² is square for every valid representative; the flag can
        // be ignored.
        let (_, invsqrt) = (&u1 * &u2.square()).invsqrt();
        let i1 = &invsqrt * &u1;
        let i2 = &invsqrt * &u2;
        let z_inv = &i1 * &(&i2 * T);
        let mut den_inv = i2;

        // If xy is negative, torque the representative by the 4-torsion
        // point (x, y) -> (iy, ix), and switch to the rotated
        // denominator 1/sqrt(Z² + X²).
        let iX = &X * &constants::SQRT_M1;
        let iY = &Y * &constants::SQRT_M1;
        let rotated_den = &i1 * &constants::INVSQRT_A_MINUS_D;

        let rotate = (T * &z_inv).is_negative();
        X.conditional_assign(&iY, rotate);
        Y.conditional_assign(&iX, rotate);
        den_inv.conditional_assign(&rotated_den, rotate);

        // Fix the sign of s/t by negating y if x is negative.
        Y.conditional_negate((&X * &z_inv).is_negative());

        // s = |(Z - Y) / sqrt(Z² - Y²)|
        let mut s = &den_inv * &(Z - &Y);
        let s_is_negative = s.is_negative();
        s.conditional_negate(s_is_negative);

        CompressedRistretto(s.to_bytes())
    }

    /// The Ristretto-flavoured Elligator 2 map.
    ///
    /// Not exposed: callers hash to the group through
    /// [`RistrettoPoint::from_uniform_bytes`], which applies the map
    /// twice to hide the map's non-uniformity.
    pub(crate) fn elligator_ristretto_flavour(r_0: &FieldElement) -> RistrettoPoint {
        let (i, d) = (&constants::SQRT_M1, &constants::EDWARDS_D);
        let one = FieldElement::ONE;

        let r = i * &r_0.square();

        // D = (dr - a)(ar - d) = -(dr + 1)(r + d)
        let D = -&(&(&(d * &r) + &one) * &(&r + d));
        // N = a(d - a)(d + a)(r + 1) = -(r + 1)(d² - 1)
        let d_sq = d.square();
        let N = -&(&(&d_sq - &one) * &(&r + &one));

        let mut s = FieldElement::ZERO;
        let mut c = -&one;

        // s = sqrt(N/D) when N/D is square ...
        let (N_over_D_is_square, maybe_s) = FieldElement::sqrt_ratio_i(&N, &D);
        s.conditional_assign(&maybe_s, N_over_D_is_square);

        // ... else s = -sqrt(rN/D) and c = r.  Exactly one of the two
        // ratios is square since r is i times a square.
        let (rN_over_D_is_square, maybe_s) = FieldElement::sqrt_ratio_i(&(&r * &N), &D);
        let minus_maybe_s = -&maybe_s;
        debug_assert_eq!((N_over_D_is_square ^ rN_over_D_is_square).unwrap_u8(), 1u8);
        s.conditional_assign(&minus_maybe_s, rN_over_D_is_square);
        c.conditional_assign(&r, rN_over_D_is_square);

        // T = c(r - 1)(d - 1)² - D
        let T = &(&c * &(&(&r - &one) * &((d - &one).square()))) - &D;

        let s_sq = s.square();
        let P = CompletedPoint {
            X: &(&s + &s) * &D,
            Z: &T * &constants::SQRT_AD_MINUS_ONE,
            Y: &one - &s_sq,
            T: &one + &s_sq,
        };

        RistrettoPoint(P.as_extended())
    }

    /// Map 64 uniformly random bytes to a group element.
    ///
    /// The bytes are split in two halves, each mapped through Elligator,
    /// and the two outputs added; the sum is uniformly distributed, which
    /// a single application of the map would not be.
    pub fn from_uniform_bytes(bytes: &[u8; 64]) -> RistrettoPoint {
        let mut half = [0u8; 32];

        half.copy_from_slice(&bytes[0..32]);
        let r_1 = FieldElement::from_bytes(&half);
        let R_1 = RistrettoPoint::elligator_ristretto_flavour(&r_1);

        half.copy_from_slice(&bytes[32..64]);
        let r_2 = FieldElement::from_bytes(&half);
        let R_2 = RistrettoPoint::elligator_ristretto_flavour(&r_2);

        &R_1 + &R_2
    }

    /// Return a uniformly random group element from a caller-provided
    /// CSPRNG.
    ///
    /// The discrete log of the output with respect to any other point is
    /// unknown (it is produced by hashing into the group).
    #[cfg(feature = "rand_core")]
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> RistrettoPoint {
        let mut uniform_bytes = [0u8; 64];
        rng.fill_bytes(&mut uniform_bytes);
        RistrettoPoint::from_uniform_bytes(&uniform_bytes)
    }

    /// Hash a slice of bytes into a `RistrettoPoint` using a 512-bit
    /// digest.
    #[cfg(feature = "digest")]
    pub fn hash_from_bytes<D>(input: &[u8]) -> RistrettoPoint
    where
        D: Digest<OutputSize = U64> + Default,
    {
        let mut hash = D::default();
        hash.update(input);
        RistrettoPoint::from_hash(hash)
    }

    /// Construct a `RistrettoPoint` from an existing digest instance.
    #[cfg(feature = "digest")]
    pub fn from_hash<D>(hash: D) -> RistrettoPoint
    where
        D: Digest<OutputSize = U64>,
    {
        let mut output = [0u8; 64];
        output.copy_from_slice(hash.finalize().as_slice());
        RistrettoPoint::from_uniform_bytes(&output)
    }
}

// ------------------------------------------------------------------------
// Arithmetic
// ------------------------------------------------------------------------

impl<'a, 'b> Add<&'b RistrettoPoint> for &'a RistrettoPoint {
    type Output = RistrettoPoint;
    fn add(self, other: &'b RistrettoPoint) -> RistrettoPoint {
        RistrettoPoint(&self.0 + &other.0)
    }
}

define_add_variants!(LHS = RistrettoPoint, RHS = RistrettoPoint, Output = RistrettoPoint);

impl<'b> AddAssign<&'b RistrettoPoint> for RistrettoPoint {
    fn add_assign(&mut self, rhs: &'b RistrettoPoint) {
        *self = &*self + rhs;
    }
}

define_add_assign_variants!(LHS = RistrettoPoint, RHS = RistrettoPoint);

impl<'a, 'b> Sub<&'b RistrettoPoint> for &'a RistrettoPoint {
    type Output = RistrettoPoint;
    fn sub(self, other: &'b RistrettoPoint) -> RistrettoPoint {
        RistrettoPoint(&self.0 - &other.0)
    }
}

define_sub_variants!(LHS = RistrettoPoint, RHS = RistrettoPoint, Output = RistrettoPoint);

impl<'b> SubAssign<&'b RistrettoPoint> for RistrettoPoint {
    fn sub_assign(&mut self, rhs: &'b RistrettoPoint) {
        *self = &*self - rhs;
    }
}

define_sub_assign_variants!(LHS = RistrettoPoint, RHS = RistrettoPoint);

impl<'a> Neg for &'a RistrettoPoint {
    type Output = RistrettoPoint;
    fn neg(self) -> RistrettoPoint {
        RistrettoPoint(-&self.0)
    }
}

impl Neg for RistrettoPoint {
    type Output = RistrettoPoint;
    fn neg(self) -> RistrettoPoint {
        -&self
    }
}

impl<'a, 'b> Mul<&'b Scalar> for &'a RistrettoPoint {
    type Output = RistrettoPoint;
    /// Constant-time variable-base scalar multiplication.
    fn mul(self, scalar: &'b Scalar) -> RistrettoPoint {
        RistrettoPoint(&self.0 * scalar)
    }
}

impl<'a, 'b> Mul<&'b RistrettoPoint> for &'a Scalar {
    type Output = RistrettoPoint;
    fn mul(self, point: &'b RistrettoPoint) -> RistrettoPoint {
        RistrettoPoint(self * &point.0)
    }
}

define_mul_variants!(LHS = RistrettoPoint, RHS = Scalar, Output = RistrettoPoint);
define_mul_variants!(LHS = Scalar, RHS = RistrettoPoint, Output = RistrettoPoint);

impl<'b> MulAssign<&'b Scalar> for RistrettoPoint {
    fn mul_assign(&mut self, scalar: &'b Scalar) {
        *self = &*self * scalar;
    }
}

define_mul_assign_variants!(LHS = RistrettoPoint, RHS = Scalar);

// ------------------------------------------------------------------------
// Fixed-base precomputation
// ------------------------------------------------------------------------

/// A precomputed table of multiples of a basepoint, for accelerating
/// fixed-base scalar multiplication.
#[derive(Clone)]
pub struct RistrettoBasepointTable(pub(crate) EdwardsBasepointTable);

impl RistrettoBasepointTable {
    /// Create a precomputed table of multiples of the given `basepoint`.
    pub fn new(basepoint: &RistrettoPoint) -> RistrettoBasepointTable {
        RistrettoBasepointTable(EdwardsBasepointTable::new(&basepoint.0))
    }

    /// Get the basepoint of this table.
    pub fn basepoint(&self) -> RistrettoPoint {
        RistrettoPoint(self.0.basepoint())
    }
}

impl<'a, 'b> Mul<&'b Scalar> for &'a RistrettoBasepointTable {
    type Output = RistrettoPoint;
    fn mul(self, scalar: &'b Scalar) -> RistrettoPoint {
        RistrettoPoint(&self.0 * scalar)
    }
}

impl<'a, 'b> Mul<&'a RistrettoBasepointTable> for &'b Scalar {
    type Output = RistrettoPoint;
    fn mul(self, basepoint_table: &'a RistrettoBasepointTable) -> RistrettoPoint {
        RistrettoPoint(self * &basepoint_table.0)
    }
}

// ------------------------------------------------------------------------
// Serde support: points serialize in the compressed wire format.
// ------------------------------------------------------------------------

#[cfg(feature = "serde")]
use serde::de::Visitor;
#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[cfg(feature = "serde")]
impl Serialize for RistrettoPoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(self.compress().as_bytes())
    }
}

#[cfg(feature = "serde")]
impl Serialize for CompressedRistretto {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(self.as_bytes())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for RistrettoPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let compressed = CompressedRistretto::deserialize(deserializer)?;
        compressed
            .decompress()
            .map_err(|_| serde::de::Error::custom("decompression failed"))
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for CompressedRistretto {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CompressedRistrettoVisitor;

        impl<'de> Visitor<'de> for CompressedRistrettoVisitor {
            type Value = CompressedRistretto;

            fn expecting(&self, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                formatter.write_str("a 32-byte compressed Ristretto point")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<CompressedRistretto, E>
            where
                E: serde::de::Error,
            {
                if v.len() != 32 {
                    return Err(serde::de::Error::invalid_length(v.len(), &self));
                }
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(v);
                Ok(CompressedRistretto(bytes))
            }
        }

        deserializer.deserialize_bytes(CompressedRistrettoVisitor)
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------
