// -*- mode: rust; -*-
//
// This file is part of ristretto255.
// See LICENSE for licensing information.

//! Arithmetic in the field \\(\mathbb Z / (2^{255} - 19)\\).
//!
//! A `FieldElement` is represented in radix \\(2^{25.5}\\) as ten signed
//! 32-bit limbs: even-index limbs carry 26 bits, odd-index limbs 25 bits,
//! so an element `t` stands for
//! `t[0] + 2^26 t[1] + 2^51 t[2] + ... + 2^230 t[9]`.
//!
//! Limbs are allowed to grow (by additions and subtractions) between
//! multiplications; every multiply and square ends with a fixed two-pass
//! carry chain that brings the output limbs back below roughly
//! \\(1.1 \cdot 2^{25.5}\\).  The products are accumulated in `i64`, which
//! leaves enough headroom for the permitted compositions.

use core::fmt::Debug;
use core::ops::Neg;
use core::ops::{Add, AddAssign};
use core::ops::{Mul, MulAssign};
use core::ops::{Sub, SubAssign};

use subtle::Choice;
use subtle::ConditionallyNegatable;
use subtle::ConditionallySelectable;
use subtle::ConstantTimeEq;

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

use crate::constants;

/// Read 3 bytes as a little-endian integer.
#[inline(always)]
pub(crate) fn load3(input: &[u8]) -> i64 {
    (input[0] as i64) | ((input[1] as i64) << 8) | ((input[2] as i64) << 16)
}

/// Read 4 bytes as a little-endian integer.
#[inline(always)]
pub(crate) fn load4(input: &[u8]) -> i64 {
    (input[0] as i64)
        | ((input[1] as i64) << 8)
        | ((input[2] as i64) << 16)
        | ((input[3] as i64) << 24)
}

/// An element of the field \\(\mathbb Z / (2^{255} - 19)\\).
///
/// The internal representation is not canonical; elements are normalized
/// to wire format by [`FieldElement::to_bytes`], and all comparisons go
/// through that normalization.
#[derive(Copy, Clone)]
pub(crate) struct FieldElement(pub(crate) [i32; 10]);

impl Debug for FieldElement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "FieldElement({:?})", &self.0[..])
    }
}

impl Eq for FieldElement {}

impl PartialEq for FieldElement {
    fn eq(&self, other: &FieldElement) -> bool {
        self.ct_eq(other).into()
    }
}

impl ConstantTimeEq for FieldElement {
    /// Elements are compared in wire format, since the limb
    /// representation is not canonical.
    fn ct_eq(&self, other: &FieldElement) -> Choice {
        self.to_bytes()[..].ct_eq(&other.to_bytes()[..])
    }
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &FieldElement, b: &FieldElement, choice: Choice) -> FieldElement {
        let mut limbs = [0i32; 10];
        for i in 0..10 {
            limbs[i] = i32::conditional_select(&a.0[i], &b.0[i], choice);
        }
        FieldElement(limbs)
    }
}

#[cfg(feature = "zeroize")]
impl Zeroize for FieldElement {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl<'b> AddAssign<&'b FieldElement> for FieldElement {
    fn add_assign(&mut self, rhs: &'b FieldElement) {
        for i in 0..10 {
            self.0[i] += rhs.0[i];
        }
    }
}

impl<'a, 'b> Add<&'b FieldElement> for &'a FieldElement {
    type Output = FieldElement;
    fn add(self, rhs: &'b FieldElement) -> FieldElement {
        let mut sum = *self;
        sum += rhs;
        sum
    }
}

impl<'b> SubAssign<&'b FieldElement> for FieldElement {
    fn sub_assign(&mut self, rhs: &'b FieldElement) {
        for i in 0..10 {
            self.0[i] -= rhs.0[i];
        }
    }
}

impl<'a, 'b> Sub<&'b FieldElement> for &'a FieldElement {
    type Output = FieldElement;
    fn sub(self, rhs: &'b FieldElement) -> FieldElement {
        let mut difference = *self;
        difference -= rhs;
        difference
    }
}

impl<'b> MulAssign<&'b FieldElement> for FieldElement {
    fn mul_assign(&mut self, rhs: &'b FieldElement) {
        *self = &*self * rhs;
    }
}

impl<'a, 'b> Mul<&'b FieldElement> for &'a FieldElement {
    type Output = FieldElement;
    fn mul(self, rhs: &'b FieldElement) -> FieldElement {
        // Schoolbook 10x10 multiplication, following ref10/donna.
        //
        // Preconditions: |a[i]|, |b[i]| below 1.1*2^26, 1.1*2^25, ...
        // alternating, which every operation in this crate maintains.
        //
        // Limbs above the 2^255 boundary are folded back with the
        // identity 2^255 = 19 (mod p): the 19*b[i] products are computed
        // in 32 bits up front, which is cheaper than multiplying the
        // 64-bit accumulators afterwards.  Odd-index limbs of `a` pick up
        // an extra factor of two since 25-bit limbs are half a radix
        // short.
        let a = &self.0;
        let b = &rhs.0;

        let a0 = a[0] as i64;
        let a1 = a[1] as i64;
        let a2 = a[2] as i64;
        let a3 = a[3] as i64;
        let a4 = a[4] as i64;
        let a5 = a[5] as i64;
        let a6 = a[6] as i64;
        let a7 = a[7] as i64;
        let a8 = a[8] as i64;
        let a9 = a[9] as i64;

        let a1_2 = (2 * a[1]) as i64;
        let a3_2 = (2 * a[3]) as i64;
        let a5_2 = (2 * a[5]) as i64;
        let a7_2 = (2 * a[7]) as i64;
        let a9_2 = (2 * a[9]) as i64;

        let b0 = b[0] as i64;
        let b1 = b[1] as i64;
        let b2 = b[2] as i64;
        let b3 = b[3] as i64;
        let b4 = b[4] as i64;
        let b5 = b[5] as i64;
        let b6 = b[6] as i64;
        let b7 = b[7] as i64;
        let b8 = b[8] as i64;
        let b9 = b[9] as i64;

        let b1_19 = (19 * b[1]) as i64; /* 1.4*2^29 */
        let b2_19 = (19 * b[2]) as i64; /* 1.4*2^30; still fits */
        let b3_19 = (19 * b[3]) as i64;
        let b4_19 = (19 * b[4]) as i64;
        let b5_19 = (19 * b[5]) as i64;
        let b6_19 = (19 * b[6]) as i64;
        let b7_19 = (19 * b[7]) as i64;
        let b8_19 = (19 * b[8]) as i64;
        let b9_19 = (19 * b[9]) as i64;

        let z = [
            a0*b0 + a1_2*b9_19 + a2*b8_19 + a3_2*b7_19 + a4*b6_19 + a5_2*b5_19 + a6*b4_19 + a7_2*b3_19 + a8*b2_19 + a9_2*b1_19,
            a0*b1 + a1*b0 + a2*b9_19 + a3*b8_19 + a4*b7_19 + a5*b6_19 + a6*b5_19 + a7*b4_19 + a8*b3_19 + a9*b2_19,
            a0*b2 + a1_2*b1 + a2*b0 + a3_2*b9_19 + a4*b8_19 + a5_2*b7_19 + a6*b6_19 + a7_2*b5_19 + a8*b4_19 + a9_2*b3_19,
            a0*b3 + a1*b2 + a2*b1 + a3*b0 + a4*b9_19 + a5*b8_19 + a6*b7_19 + a7*b6_19 + a8*b5_19 + a9*b4_19,
            a0*b4 + a1_2*b3 + a2*b2 + a3_2*b1 + a4*b0 + a5_2*b9_19 + a6*b8_19 + a7_2*b7_19 + a8*b6_19 + a9_2*b5_19,
            a0*b5 + a1*b4 + a2*b3 + a3*b2 + a4*b1 + a5*b0 + a6*b9_19 + a7*b8_19 + a8*b7_19 + a9*b6_19,
            a0*b6 + a1_2*b5 + a2*b4 + a3_2*b3 + a4*b2 + a5_2*b1 + a6*b0 + a7_2*b9_19 + a8*b8_19 + a9_2*b7_19,
            a0*b7 + a1*b6 + a2*b5 + a3*b4 + a4*b3 + a5*b2 + a6*b1 + a7*b0 + a8*b9_19 + a9*b8_19,
            a0*b8 + a1_2*b7 + a2*b6 + a3_2*b5 + a4*b4 + a5_2*b3 + a6*b2 + a7_2*b1 + a8*b0 + a9_2*b9_19,
            a0*b9 + a1*b8 + a2*b7 + a3*b6 + a4*b5 + a5*b4 + a6*b3 + a7*b2 + a8*b1 + a9*b0,
        ];

        FieldElement::reduce(z)
    }
}

impl<'a> Neg for &'a FieldElement {
    type Output = FieldElement;
    fn neg(self) -> FieldElement {
        let mut negated = *self;
        for limb in negated.0.iter_mut() {
            *limb = -*limb;
        }
        negated
    }
}

impl FieldElement {
    pub const ZERO: FieldElement = FieldElement([0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    pub const ONE: FieldElement = FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    pub const MINUS_ONE: FieldElement = FieldElement([-1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

    /// Carry-propagate the 64-bit accumulators of a product back into ten
    /// reduced limbs.
    ///
    /// The carry schedule runs two interleaved passes (limbs 0..4 and
    /// 4..8 in lockstep), folds the top carry back through \\(19 \cdot
    /// 2^{-255}\\), and finishes with one more carry out of limb 0.  The
    /// schedule is load-bearing: it is what bounds every output limb to
    /// its canonical bit width without overflowing `i64` on the way, so
    /// it must not be reordered.
    fn reduce(mut z: [i64; 10]) -> FieldElement {
        #[inline(always)]
        fn carry(z: &mut [i64; 10], i: usize) {
            if i == 9 {
                let c = (z[9] + (1 << 24)) >> 25;
                z[0] += c * 19;
                z[9] -= c << 25;
            } else if i % 2 == 0 {
                let c = (z[i] + (1 << 25)) >> 26;
                z[i + 1] += c;
                z[i] -= c << 26;
            } else {
                let c = (z[i] + (1 << 24)) >> 25;
                z[i + 1] += c;
                z[i] -= c << 25;
            }
        }

        carry(&mut z, 0);
        carry(&mut z, 4);
        carry(&mut z, 1);
        carry(&mut z, 5);
        carry(&mut z, 2);
        carry(&mut z, 6);
        carry(&mut z, 3);
        carry(&mut z, 7);
        carry(&mut z, 4);
        carry(&mut z, 8);
        carry(&mut z, 9);
        carry(&mut z, 0);

        let mut limbs = [0i32; 10];
        for (limb, z_i) in limbs.iter_mut().zip(z.iter()) {
            *limb = *z_i as i32;
        }
        FieldElement(limbs)
    }

    /// Load a `FieldElement` from the low 255 bits of a 256-bit input.
    ///
    /// The high bit of byte 31 is masked off.  The input need not be the
    /// canonical representative: `2^255 - 18` decodes to `1`.
    pub fn from_bytes(data: &[u8; 32]) -> FieldElement {
        let mut z = [0i64; 10];
        z[0] = load4(&data[0..]);
        z[1] = load3(&data[4..]) << 6;
        z[2] = load3(&data[7..]) << 5;
        z[3] = load3(&data[10..]) << 3;
        z[4] = load3(&data[13..]) << 2;
        z[5] = load4(&data[16..]);
        z[6] = load3(&data[20..]) << 7;
        z[7] = load3(&data[23..]) << 5;
        z[8] = load3(&data[26..]) << 4;
        z[9] = (load3(&data[29..]) & 0x7fffff) << 2;

        FieldElement::reduce(z)
    }

    /// Serialize to 32 bytes, little-endian.  The encoding is the unique
    /// canonical representative in \\([0, p)\\).
    pub fn to_bytes(&self) -> [u8; 32] {
        // Bit widths of the ten limbs, alternating 26/25.
        const WIDTH: [u32; 10] = [26, 25, 26, 25, 26, 25, 26, 25, 26, 25];

        let mut h = self.0;

        // Compute q = floor(h/p) (which is 0 or 1 for reduced limbs) as
        // floor(2^-255 (h + 19 2^-25 h9 + 2^-1)), per the ref10 lemma,
        // then subtract q*p by adding 19q and dropping the top carry.
        let mut q = (19 * h[9] + (1 << 24)) >> 25;
        for i in 0..10 {
            q = (h[i] + q) >> WIDTH[i];
        }

        h[0] += 19 * q;

        for i in 0..9 {
            let carry = h[i] >> WIDTH[i];
            h[i + 1] += carry;
            h[i] -= carry << WIDTH[i];
        }
        // The carry out of limb 9 is exactly 2^255 q; discard it.
        h[9] -= (h[9] >> 25) << 25;

        let mut s = [0u8; 32];
        s[0] = h[0] as u8;
        s[1] = (h[0] >> 8) as u8;
        s[2] = (h[0] >> 16) as u8;
        s[3] = ((h[0] >> 24) | (h[1] << 2)) as u8;
        s[4] = (h[1] >> 6) as u8;
        s[5] = (h[1] >> 14) as u8;
        s[6] = ((h[1] >> 22) | (h[2] << 3)) as u8;
        s[7] = (h[2] >> 5) as u8;
        s[8] = (h[2] >> 13) as u8;
        s[9] = ((h[2] >> 21) | (h[3] << 5)) as u8;
        s[10] = (h[3] >> 3) as u8;
        s[11] = (h[3] >> 11) as u8;
        s[12] = ((h[3] >> 19) | (h[4] << 6)) as u8;
        s[13] = (h[4] >> 2) as u8;
        s[14] = (h[4] >> 10) as u8;
        s[15] = (h[4] >> 18) as u8;
        s[16] = h[5] as u8;
        s[17] = (h[5] >> 8) as u8;
        s[18] = (h[5] >> 16) as u8;
        s[19] = ((h[5] >> 24) | (h[6] << 1)) as u8;
        s[20] = (h[6] >> 7) as u8;
        s[21] = (h[6] >> 15) as u8;
        s[22] = ((h[6] >> 23) | (h[7] << 3)) as u8;
        s[23] = (h[7] >> 5) as u8;
        s[24] = (h[7] >> 13) as u8;
        s[25] = ((h[7] >> 21) | (h[8] << 4)) as u8;
        s[26] = (h[8] >> 4) as u8;
        s[27] = (h[8] >> 12) as u8;
        s[28] = ((h[8] >> 20) | (h[9] << 6)) as u8;
        s[29] = (h[9] >> 2) as u8;
        s[30] = (h[9] >> 10) as u8;
        s[31] = (h[9] >> 18) as u8;

        debug_assert!(s[31] & 0b1000_0000 == 0);

        s
    }

    fn square_inner(&self) -> [i64; 10] {
        let a = &self.0;

        let a0 = a[0] as i64;
        let a1 = a[1] as i64;
        let a2 = a[2] as i64;
        let a3 = a[3] as i64;
        let a4 = a[4] as i64;
        let a5 = a[5] as i64;
        let a6 = a[6] as i64;
        let a7 = a[7] as i64;
        let a8 = a[8] as i64;
        let a9 = a[9] as i64;

        let a0_2 = (2 * a[0]) as i64;
        let a1_2 = (2 * a[1]) as i64;
        let a2_2 = (2 * a[2]) as i64;
        let a3_2 = (2 * a[3]) as i64;
        let a4_2 = (2 * a[4]) as i64;
        let a5_2 = (2 * a[5]) as i64;
        let a6_2 = (2 * a[6]) as i64;
        let a7_2 = (2 * a[7]) as i64;

        let a5_38 = 38 * a5; // 1.31*2^30
        let a6_19 = 19 * a6;
        let a7_38 = 38 * a7;
        let a8_19 = 19 * a8;
        let a9_38 = 38 * a9;

        [
            a0*a0 + a1_2*a9_38 + a2_2*a8_19 + a3_2*a7_38 + a4_2*a6_19 + a5*a5_38,
            a0_2*a1 + a2*a9_38 + a3_2*a8_19 + a4*a7_38 + a5_2*a6_19,
            a0_2*a2 + a1_2*a1 + a3_2*a9_38 + a4_2*a8_19 + a5_2*a7_38 + a6*a6_19,
            a0_2*a3 + a1_2*a2 + a4*a9_38 + a5_2*a8_19 + a6*a7_38,
            a0_2*a4 + a1_2*a3_2 + a2*a2 + a5_2*a9_38 + a6_2*a8_19 + a7*a7_38,
            a0_2*a5 + a1_2*a4 + a2_2*a3 + a6*a9_38 + a7_2*a8_19,
            a0_2*a6 + a1_2*a5_2 + a2_2*a4 + a3_2*a3 + a7_2*a9_38 + a8*a8_19,
            a0_2*a7 + a1_2*a6 + a2_2*a5 + a3_2*a4 + a8*a9_38,
            a0_2*a8 + a1_2*a7_2 + a2_2*a6 + a3_2*a5_2 + a4*a4 + a9*a9_38,
            a0_2*a9 + a1_2*a8 + a2_2*a7 + a3_2*a6 + a4_2*a5,
        ]
    }

    /// Compute `self^2`.
    pub fn square(&self) -> FieldElement {
        FieldElement::reduce(self.square_inner())
    }

    /// Compute `2*self^2`.
    ///
    /// The doubling is folded into the accumulators before the carry
    /// chain, saving a separate addition that would otherwise push the
    /// inputs of the next multiplication over their bounds.
    pub fn square2(&self) -> FieldElement {
        let mut z = self.square_inner();
        for acc in z.iter_mut() {
            *acc += *acc;
        }
        FieldElement::reduce(z)
    }

    /// Compute `self^(2^k)` by `k` successive squarings.
    fn pow2k(&self, k: u32) -> FieldElement {
        debug_assert!(k > 0);
        let mut z = self.square();
        for _ in 1..k {
            z = z.square();
        }
        z
    }

    /// Compute `(self^(2^250 - 1), self^11)`, the shared prefix of the
    /// `invert` and `pow_p58` addition chains.
    fn pow22501(&self) -> (FieldElement, FieldElement) {
        // Each temporary t_i below is self^e_i; squaring shifts the
        // exponent left, multiplying adds exponents.  The nonzero bits of
        // each e_i are noted on the right.
        let t0 = self.square(); // 1
        let t1 = t0.square().square(); // 3
        let t2 = self * &t1; // 3,0
        let t3 = &t0 * &t2; // 3,1,0
        let t4 = t3.square(); // 4,2,1
        let t5 = &t2 * &t4; // 4,3,2,1,0
        let t6 = t5.pow2k(5); // 9,8,7,6,5
        let t7 = &t6 * &t5; // 9..0
        let t8 = t7.pow2k(10); // 19..10
        let t9 = &t8 * &t7; // 19..0
        let t10 = t9.pow2k(20); // 39..20
        let t11 = &t10 * &t9; // 39..0
        let t12 = t11.pow2k(10); // 49..10
        let t13 = &t12 * &t7; // 49..0
        let t14 = t13.pow2k(50); // 99..50
        let t15 = &t14 * &t13; // 99..0
        let t16 = t15.pow2k(100); // 199..100
        let t17 = &t16 * &t15; // 199..0
        let t18 = t17.pow2k(50); // 249..50
        let t19 = &t18 * &t13; // 249..0

        (t19, t3)
    }

    /// Compute `self^-1 = self^(p-2)`, returning zero on zero input.
    pub fn invert(&self) -> FieldElement {
        // The bits of p-2 = 2^255 - 21 are 11010111111...11.
        let (t19, t3) = self.pow22501(); // t19: 249..0 ; t3: 3,1,0
        let t20 = t19.pow2k(5); // 254..5
        &t20 * &t3 // 254..5,3,1,0
    }

    /// Compute `self^((p-5)/8) = self^(2^252 - 3)`, the core of the
    /// combined inverse-square-root used by `sqrt_ratio_i`.
    fn pow_p58(&self) -> FieldElement {
        // The bits of (p-5)/8 are 101111.....11.
        let (t19, _) = self.pow22501(); // 249..0
        let t20 = t19.pow2k(2); // 251..2
        self * &t20 // 251..2,0
    }

    /// Compute `sqrt(u/v)` or `sqrt(i*u/v)` in constant time, where
    /// `i = sqrt(-1)`.
    ///
    /// The returned element is always the non-negative root.
    ///
    /// # Return
    ///
    /// - `(Choice(1), +sqrt(u/v))` if `v` is nonzero and `u/v` is square;
    /// - `(Choice(1), zero)` if `u` is zero;
    /// - `(Choice(0), zero)` if `v` is zero and `u` is nonzero;
    /// - `(Choice(0), +sqrt(i*u/v))` if `u/v` is a nonzero nonsquare.
    pub fn sqrt_ratio_i(u: &FieldElement, v: &FieldElement) -> (Choice, FieldElement) {
        // The inversion, square root, and square test are merged: with
        // r = (uv^3) (uv^7)^((p-5)/8) we have r^2 = ±(u/v) whenever u/v
        // is square, so a single computation of r followed by sign fixes
        // covers every case.
        let v3 = &v.square() * v;
        let v7 = &v3.square() * v;
        let mut r = &(u * &v3) * &(u * &v7).pow_p58();
        let check = v * &r.square();

        let i = &constants::SQRT_M1;

        let correct_sign_sqrt = check.ct_eq(u);
        let flipped_sign_sqrt = check.ct_eq(&(-u));
        let flipped_sign_sqrt_i = check.ct_eq(&(&(-u) * i));

        let r_prime = i * &r;
        r.conditional_assign(&r_prime, flipped_sign_sqrt | flipped_sign_sqrt_i);

        // Choose the non-negative root.
        let r_is_negative = r.is_negative();
        r.conditional_negate(r_is_negative);

        (correct_sign_sqrt | flipped_sign_sqrt, r)
    }

    /// Compute `1/sqrt(self)`, a convenience wrapper around
    /// `sqrt_ratio_i(1, self)`.
    pub fn invsqrt(&self) -> (Choice, FieldElement) {
        FieldElement::sqrt_ratio_i(&FieldElement::ONE, self)
    }

    /// An element is "negative" (in the Ed25519 sense) if the low bit of
    /// its canonical encoding is set.
    pub fn is_negative(&self) -> Choice {
        (self.to_bytes()[0] & 1).into()
    }

    pub fn is_zero(&self) -> Choice {
        self.to_bytes()[..].ct_eq(&[0u8; 32][..])
    }
}
