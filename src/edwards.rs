// -*- mode: rust; -*-
//
// This file is part of ristretto255.
// See LICENSE for licensing information.

//! Group operations on the twisted Edwards form of Curve25519,
//! \\(-x^2 + y^2 = 1 + d x^2 y^2\\) over \\(\mathbb Z / (2^{255}-19)\\)
//! with \\(d = -121665/121666\\).
//!
//! The full curve group has order \\(8\ell\\); unless points are checked
//! with [`EdwardsPoint::is_torsion_free`], protocols built directly on
//! this module must account for the cofactor.  The
//! [`ristretto`](crate::ristretto) module provides the prime-order
//! abstraction that avoids those pitfalls.

// Coordinates in projective space are denoted by capitals, matching the
// literature, so silence the snake-case lint for this module.
#![allow(non_snake_case)]

use core::fmt::Debug;
use core::ops::{Add, AddAssign};
use core::ops::{Mul, MulAssign};
use core::ops::{Neg, Sub, SubAssign};

use subtle::Choice;
use subtle::ConditionallySelectable;
use subtle::ConstantTimeEq;

use crate::constants;
use crate::curve_models::{AffineNielsPoint, CompletedPoint, ProjectiveNielsPoint, ProjectivePoint};
use crate::errors::InvalidEncoding;
use crate::field::FieldElement;
use crate::scalar::Scalar;
use crate::traits::Identity;
use crate::window::{LookupTable, NafLookupTable};

// ------------------------------------------------------------------------
// Compressed points
// ------------------------------------------------------------------------

/// A curve point in "Edwards y" format: 255 bits of little-endian
/// y-coordinate, with the sign of x in the top bit of byte 31.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct CompressedEdwardsY(pub [u8; 32]);

impl Debug for CompressedEdwardsY {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CompressedEdwardsY: {:?}", self.as_bytes())
    }
}

impl Identity for CompressedEdwardsY {
    fn identity() -> CompressedEdwardsY {
        let mut bytes = [0u8; 32];
        bytes[0] = 1;
        CompressedEdwardsY(bytes)
    }
}

impl CompressedEdwardsY {
    /// View this `CompressedEdwardsY` as an array of bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Copy this `CompressedEdwardsY` to an array of bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Attempt to decompress to an `EdwardsPoint`.
    ///
    /// Fails with [`InvalidEncoding`] if the encoded y-coordinate is not
    /// the y-coordinate of any curve point.
    pub fn decompress(&self) -> Result<EdwardsPoint, InvalidEncoding> {
        let Y = FieldElement::from_bytes(self.as_bytes());
        let Z = FieldElement::ONE;
        let YY = Y.square();
        let u = &YY - &Z; // u = y²-1
        let v = &(&YY * &constants::EDWARDS_D) + &Z; // v = dy²+1
        let (is_valid_y_coord, mut X) = FieldElement::sqrt_ratio_i(&u, &v);

        if (!is_valid_y_coord).into() {
            return Err(InvalidEncoding);
        }

        // sqrt_ratio_i always returns the non-negative root; negate X if
        // the encoded sign disagrees.
        let compressed_sign_bit = Choice::from(self.as_bytes()[31] >> 7);
        let negated_X = -&X;
        X.conditional_assign(&negated_X, compressed_sign_bit ^ X.is_negative());

        Ok(EdwardsPoint {
            X,
            Y,
            Z,
            T: &X * &Y,
        })
    }
}

// ------------------------------------------------------------------------
// The extended representation
// ------------------------------------------------------------------------

/// A point on the Edwards form of Curve25519, in extended twisted
/// Edwards coordinates \\((X : Y : Z : T)\\) with \\(xy = T/Z\\).
#[derive(Copy, Clone)]
pub struct EdwardsPoint {
    pub(crate) X: FieldElement,
    pub(crate) Y: FieldElement,
    pub(crate) Z: FieldElement,
    pub(crate) T: FieldElement,
}

impl Identity for EdwardsPoint {
    fn identity() -> EdwardsPoint {
        EdwardsPoint {
            X: FieldElement::ZERO,
            Y: FieldElement::ONE,
            Z: FieldElement::ONE,
            T: FieldElement::ZERO,
        }
    }
}

impl Default for EdwardsPoint {
    fn default() -> EdwardsPoint {
        EdwardsPoint::identity()
    }
}

impl Eq for EdwardsPoint {}

impl PartialEq for EdwardsPoint {
    fn eq(&self, other: &EdwardsPoint) -> bool {
        self.ct_eq(other).into()
    }
}

impl ConstantTimeEq for EdwardsPoint {
    /// Compare the canonical encodings in constant time; the coordinate
    /// representation itself is projective and therefore not comparable.
    fn ct_eq(&self, other: &EdwardsPoint) -> Choice {
        self.compress().as_bytes()[..].ct_eq(&other.compress().as_bytes()[..])
    }
}

impl ConditionallySelectable for EdwardsPoint {
    fn conditional_select(a: &EdwardsPoint, b: &EdwardsPoint, choice: Choice) -> EdwardsPoint {
        EdwardsPoint {
            X: FieldElement::conditional_select(&a.X, &b.X, choice),
            Y: FieldElement::conditional_select(&a.Y, &b.Y, choice),
            Z: FieldElement::conditional_select(&a.Z, &b.Z, choice),
            T: FieldElement::conditional_select(&a.T, &b.T, choice),
        }
    }
}

impl Debug for EdwardsPoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "EdwardsPoint{{\n\tX: {:?},\n\tY: {:?},\n\tZ: {:?},\n\tT: {:?}\n}}",
            &self.X, &self.Y, &self.Z, &self.T
        )
    }
}

// ------------------------------------------------------------------------
// Conversions into the internal models
// ------------------------------------------------------------------------

impl EdwardsPoint {
    /// Reinterpret in \\(\mathbb P^2\\); free.
    pub(crate) fn as_projective(&self) -> ProjectivePoint {
        ProjectivePoint {
            X: self.X,
            Y: self.Y,
            Z: self.Z,
        }
    }

    /// Convert to the cached Niels form for use as an addend.
    pub(crate) fn as_projective_niels(&self) -> ProjectiveNielsPoint {
        ProjectiveNielsPoint {
            Y_plus_X: &self.Y + &self.X,
            Y_minus_X: &self.Y - &self.X,
            Z: self.Z,
            T2d: &self.T * &constants::EDWARDS_D2,
        }
    }

    /// Dehomogenize to the cached affine Niels form.  Costs a field
    /// inversion, so this is only used when building tables.
    pub(crate) fn as_affine_niels(&self) -> AffineNielsPoint {
        let recip = self.Z.invert();
        let x = &self.X * &recip;
        let y = &self.Y * &recip;
        let xy2d = &(&x * &y) * &constants::EDWARDS_D2;
        AffineNielsPoint {
            y_plus_x: &y + &x,
            y_minus_x: &y - &x,
            xy2d,
        }
    }

    /// Compress to "Edwards y" format.
    pub fn compress(&self) -> CompressedEdwardsY {
        let recip = self.Z.invert();
        let x = &self.X * &recip;
        let y = &self.Y * &recip;
        let mut s = y.to_bytes();
        s[31] ^= x.is_negative().unwrap_u8() << 7;
        CompressedEdwardsY(s)
    }
}

// ------------------------------------------------------------------------
// Group operations
// ------------------------------------------------------------------------

impl EdwardsPoint {
    /// Add this point to itself.
    pub fn double(&self) -> EdwardsPoint {
        self.as_projective().double().as_extended()
    }

    /// Compute \\([2^k] P\\) by \\(k\\) successive doublings.
    ///
    /// The intermediate doublings stay in \\(\mathbb P^2\\); only the
    /// last one pays the conversion back to extended coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `k == 0`; use the identity conversion instead.
    pub fn mul_by_pow_2(&self, k: u32) -> EdwardsPoint {
        assert!(k > 0, "exponent must be positive and non-zero");
        let mut s = self.as_projective();
        for _ in 0..(k - 1) {
            s = s.double().as_projective();
        }
        s.double().as_extended()
    }

    /// Compute \\([8] P\\), clearing any 8-torsion component.
    pub fn mul_by_cofactor(&self) -> EdwardsPoint {
        self.mul_by_pow_2(3)
    }

    /// Return true if this point is the group identity.
    pub fn is_identity(&self) -> bool {
        self.ct_eq(&EdwardsPoint::identity()).into()
    }

    /// Return true if this point lies in the 8-torsion subgroup
    /// \\(\mathcal E[8]\\).
    pub fn is_small_order(&self) -> bool {
        self.mul_by_cofactor().is_identity()
    }

    /// Return true if this point is free of any torsion component,
    /// i.e. lies in the prime-order subgroup \\(\mathcal E[\ell]\\).
    pub fn is_torsion_free(&self) -> bool {
        (self * &constants::BASEPOINT_ORDER).is_identity()
    }
}

impl<'a, 'b> Add<&'b EdwardsPoint> for &'a EdwardsPoint {
    type Output = EdwardsPoint;
    fn add(self, other: &'b EdwardsPoint) -> EdwardsPoint {
        (self + &other.as_projective_niels()).as_extended()
    }
}

define_add_variants!(LHS = EdwardsPoint, RHS = EdwardsPoint, Output = EdwardsPoint);

impl<'b> AddAssign<&'b EdwardsPoint> for EdwardsPoint {
    fn add_assign(&mut self, rhs: &'b EdwardsPoint) {
        *self = &*self + rhs;
    }
}

define_add_assign_variants!(LHS = EdwardsPoint, RHS = EdwardsPoint);

impl<'a, 'b> Sub<&'b EdwardsPoint> for &'a EdwardsPoint {
    type Output = EdwardsPoint;
    fn sub(self, other: &'b EdwardsPoint) -> EdwardsPoint {
        (self - &other.as_projective_niels()).as_extended()
    }
}

define_sub_variants!(LHS = EdwardsPoint, RHS = EdwardsPoint, Output = EdwardsPoint);

impl<'b> SubAssign<&'b EdwardsPoint> for EdwardsPoint {
    fn sub_assign(&mut self, rhs: &'b EdwardsPoint) {
        *self = &*self - rhs;
    }
}

define_sub_assign_variants!(LHS = EdwardsPoint, RHS = EdwardsPoint);

impl<'a> Neg for &'a EdwardsPoint {
    type Output = EdwardsPoint;

    fn neg(self) -> EdwardsPoint {
        EdwardsPoint {
            X: -(&self.X),
            Y: self.Y,
            Z: self.Z,
            T: -(&self.T),
        }
    }
}

impl Neg for EdwardsPoint {
    type Output = EdwardsPoint;

    fn neg(self) -> EdwardsPoint {
        -&self
    }
}

// ------------------------------------------------------------------------
// Scalar multiplication
// ------------------------------------------------------------------------

impl<'a, 'b> Mul<&'b Scalar> for &'a EdwardsPoint {
    type Output = EdwardsPoint;

    /// Constant-time variable-base scalar multiplication.
    ///
    /// For repeated multiplications of one basepoint, an
    /// [`EdwardsBasepointTable`] is considerably faster.
    fn mul(self, scalar: &'b Scalar) -> EdwardsPoint {
        // Build the table [P, 2P, ..., 8P] once; the ladder then
        // consumes the scalar as 64 signed radix-16 digits,
        //
        //    s*P = P*e_0 + 16*(P*e_1 + 16*(P*e_2 + 16*(... + P*e_63)...)),
        //
        // evaluated right to left with four doublings per digit.  Every
        // digit selection scans the full table.
        let lookup_table = LookupTable::<ProjectiveNielsPoint>::from(self);
        let digits = scalar.to_radix_16();

        let mut Q = EdwardsPoint::identity();
        for i in (0..64).rev() {
            Q = Q.mul_by_pow_2(4);
            Q = (&Q + &lookup_table.select(digits[i])).as_extended();
        }
        Q
    }
}

impl<'a, 'b> Mul<&'b EdwardsPoint> for &'a Scalar {
    type Output = EdwardsPoint;

    fn mul(self, point: &'b EdwardsPoint) -> EdwardsPoint {
        point * self
    }
}

define_mul_variants!(LHS = EdwardsPoint, RHS = Scalar, Output = EdwardsPoint);
define_mul_variants!(LHS = Scalar, RHS = EdwardsPoint, Output = EdwardsPoint);

impl<'b> MulAssign<&'b Scalar> for EdwardsPoint {
    fn mul_assign(&mut self, scalar: &'b Scalar) {
        *self = &*self * scalar;
    }
}

define_mul_assign_variants!(LHS = EdwardsPoint, RHS = Scalar);

impl EdwardsPoint {
    /// Compute \\([a] A + [b] B\\) in variable time, where \\(B\\) is
    /// the Ed25519 basepoint.
    ///
    /// Both scalars are expanded in width-5 NAF; odd multiples of
    /// \\(A\\) are built on the fly while odd multiples of \\(B\\) come
    /// from the precomputed affine table.  The running time depends on
    /// the scalars; do not use with secrets.
    pub fn vartime_double_scalar_mul_basepoint(
        a: &Scalar,
        A: &EdwardsPoint,
        b: &Scalar,
    ) -> EdwardsPoint {
        let a_naf = a.non_adjacent_form();
        let b_naf = b.non_adjacent_form();

        // Skip leading zero coefficients.
        let mut i: usize = 0;
        for j in (0..256).rev() {
            i = j;
            if a_naf[j] != 0 || b_naf[j] != 0 {
                break;
            }
        }

        let table_A = NafLookupTable::<ProjectiveNielsPoint>::from(A);
        let table_B = &*constants::AFFINE_ODD_MULTIPLES_OF_BASEPOINT;

        let mut r = ProjectivePoint::identity();
        loop {
            let mut t: CompletedPoint = r.double();

            if a_naf[i] > 0 {
                t = &t.as_extended() + &table_A.select(a_naf[i] as usize);
            } else if a_naf[i] < 0 {
                t = &t.as_extended() - &table_A.select((-a_naf[i]) as usize);
            }

            if b_naf[i] > 0 {
                t = &t.as_extended() + &table_B.select(b_naf[i] as usize);
            } else if b_naf[i] < 0 {
                t = &t.as_extended() - &table_B.select((-b_naf[i]) as usize);
            }

            r = t.as_projective();

            if i == 0 {
                break;
            }
            i -= 1;
        }

        r.as_extended()
    }
}

// ------------------------------------------------------------------------
// Fixed-base precomputation
// ------------------------------------------------------------------------

/// A precomputed table of multiples of a basepoint, accelerating
/// fixed-base scalar multiplication by roughly 4x over the generic
/// ladder.
///
/// Holds 32 eight-entry tables of affine Niels points, table \\(i\\)
/// covering \\([1 \cdot 16^{2i} B, \ldots, 8 \cdot 16^{2i} B]\\).  At
/// around 30KB these are worth boxing if many are kept alive.
#[derive(Clone)]
pub struct EdwardsBasepointTable(pub(crate) [LookupTable<AffineNielsPoint>; 32]);

impl EdwardsBasepointTable {
    /// Create a table of precomputed multiples of `basepoint`.
    pub fn new(basepoint: &EdwardsPoint) -> EdwardsBasepointTable {
        let mut table = EdwardsBasepointTable(
            [LookupTable([AffineNielsPoint::identity(); 8]); 32],
        );
        let mut P = *basepoint;
        for i in 0..32 {
            // P = (16^2)^i * B
            table.0[i] = LookupTable::from(&P);
            P = P.mul_by_pow_2(8);
        }
        table
    }

    /// Get the basepoint of this table.
    pub fn basepoint(&self) -> EdwardsPoint {
        // Entry 0 of table 0 is 1*(16^0)*B, as an AffineNielsPoint;
        // adding the identity converts back to extended coordinates.
        (&EdwardsPoint::identity() + &self.0[0].select(1)).as_extended()
    }

    /// Fixed-base scalar multiplication using the radix-16 digits of
    /// \\(a\\) split into even and odd positions:
    ///
    /// $$
    ///    a B = (a_0 16^0 B + a_2 16^2 B + \cdots)
    ///        + 16 (a_1 16^0 B + a_3 16^2 B + \cdots),
    /// $$
    ///
    /// so each of the 32 tables serves one even and one odd digit, with
    /// a single shift by 16 in between.
    fn basepoint_mul(&self, scalar: &Scalar) -> EdwardsPoint {
        let digits = scalar.to_radix_16();
        let mut P = EdwardsPoint::identity();

        for i in (1..64).step_by(2) {
            P = (&P + &self.0[i / 2].select(digits[i])).as_extended();
        }

        P = P.mul_by_pow_2(4);

        for i in (0..64).step_by(2) {
            P = (&P + &self.0[i / 2].select(digits[i])).as_extended();
        }

        P
    }
}

impl<'a, 'b> Mul<&'b Scalar> for &'a EdwardsBasepointTable {
    type Output = EdwardsPoint;

    /// Compute \\(aB\\) for the basepoint \\(B\\) of this table.
    fn mul(self, scalar: &'b Scalar) -> EdwardsPoint {
        self.basepoint_mul(scalar)
    }
}

impl<'a, 'b> Mul<&'a EdwardsBasepointTable> for &'b Scalar {
    type Output = EdwardsPoint;

    /// Compute \\(aB\\) for the basepoint \\(B\\) of this table.
    fn mul(self, basepoint_table: &'a EdwardsBasepointTable) -> EdwardsPoint {
        basepoint_table * self
    }
}

impl Debug for EdwardsBasepointTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "EdwardsBasepointTable([\n")?;
        for table in self.0.iter() {
            writeln!(f, "\t{:?},", table)?;
        }
        write!(f, "])")
    }
}

// ------------------------------------------------------------------------
// Serde support: points serialize in compressed Edwards y form.
// ------------------------------------------------------------------------

#[cfg(feature = "serde")]
use serde::de::Visitor;
#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[cfg(feature = "serde")]
impl Serialize for EdwardsPoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(self.compress().as_bytes())
    }
}

#[cfg(feature = "serde")]
impl Serialize for CompressedEdwardsY {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(self.as_bytes())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for EdwardsPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let compressed = CompressedEdwardsY::deserialize(deserializer)?;
        compressed
            .decompress()
            .map_err(|_| serde::de::Error::custom("decompression failed"))
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for CompressedEdwardsY {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CompressedEdwardsYVisitor;

        impl<'de> Visitor<'de> for CompressedEdwardsYVisitor {
            type Value = CompressedEdwardsY;

            fn expecting(&self, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                formatter.write_str("a 32-byte compressed Edwards point")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<CompressedEdwardsY, E>
            where
                E: serde::de::Error,
            {
                if v.len() != 32 {
                    return Err(serde::de::Error::invalid_length(v.len(), &self));
                }
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(v);
                Ok(CompressedEdwardsY(bytes))
            }
        }

        deserializer.deserialize_bytes(CompressedEdwardsYVisitor)
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------
