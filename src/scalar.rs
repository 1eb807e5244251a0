// -*- mode: rust; -*-
//
// This file is part of ristretto255.
// See LICENSE for licensing information.

//! Arithmetic on scalars, integers modulo the group order
//! \\(\ell = 2^{252} + 27742317777372353535851937790883648493\\).
//!
//! A [`Scalar`] is stored as 32 little-endian bytes with the high bit
//! clear, which keeps the bits directly accessible for the scalar
//! multiplication ladders.  Addition and subtraction unpack into nine
//! 29-bit limbs ([`UnpackedScalar`]) and finish with a single conditional
//! add or subtract of \\(\ell\\); multiplication and wide reduction run a
//! schoolbook product over twelve 21-bit limbs and fold the high half
//! back with the precomputed expansion of \\(-(\ell - 2^{252})\\) in base
//! \\(2^{21}\\).

use core::fmt::Debug;
use core::ops::Neg;
use core::ops::{Add, AddAssign};
use core::ops::{Mul, MulAssign};
use core::ops::{Sub, SubAssign};

use subtle::Choice;
use subtle::ConditionallySelectable;
use subtle::ConstantTimeEq;

#[cfg(feature = "digest")]
use digest::consts::U64;
#[cfg(feature = "digest")]
use digest::Digest;

#[cfg(feature = "rand_core")]
use rand_core::{CryptoRng, RngCore};

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

use crate::constants;
use crate::errors::InvalidRepresentation;
use crate::field::{load3, load4};

/// An element of \\(\mathbb Z / \ell\\).
///
/// Stored in canonical 32-byte little-endian form with `bytes[31] <= 127`.
#[derive(Copy, Clone)]
pub struct Scalar {
    pub(crate) bytes: [u8; 32],
}

impl Debug for Scalar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Scalar{{\n\tbytes: {:?},\n}}", &self.bytes)
    }
}

impl Eq for Scalar {}

impl PartialEq for Scalar {
    fn eq(&self, other: &Scalar) -> bool {
        self.ct_eq(other).into()
    }
}

impl ConstantTimeEq for Scalar {
    /// Compare the byte encodings in constant time.
    fn ct_eq(&self, other: &Scalar) -> Choice {
        self.bytes[..].ct_eq(&other.bytes[..])
    }
}

impl ConditionallySelectable for Scalar {
    fn conditional_select(a: &Scalar, b: &Scalar, choice: Choice) -> Scalar {
        let mut bytes = [0u8; 32];
        for i in 0..32 {
            bytes[i] = u8::conditional_select(&a.bytes[i], &b.bytes[i], choice);
        }
        Scalar { bytes }
    }
}

#[cfg(feature = "zeroize")]
impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.bytes.zeroize();
    }
}

impl From<u64> for Scalar {
    fn from(x: u64) -> Scalar {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&x.to_le_bytes());
        Scalar { bytes }
    }
}

impl Default for Scalar {
    fn default() -> Scalar {
        Scalar::ZERO
    }
}

impl<'a, 'b> Add<&'b Scalar> for &'a Scalar {
    type Output = Scalar;
    fn add(self, rhs: &'b Scalar) -> Scalar {
        UnpackedScalar::add(&self.unpack(), &rhs.unpack()).pack()
    }
}

define_add_variants!(LHS = Scalar, RHS = Scalar, Output = Scalar);

impl<'b> AddAssign<&'b Scalar> for Scalar {
    fn add_assign(&mut self, rhs: &'b Scalar) {
        *self = &*self + rhs;
    }
}

define_add_assign_variants!(LHS = Scalar, RHS = Scalar);

impl<'a, 'b> Sub<&'b Scalar> for &'a Scalar {
    type Output = Scalar;
    fn sub(self, rhs: &'b Scalar) -> Scalar {
        UnpackedScalar::sub(&self.unpack(), &rhs.unpack()).pack()
    }
}

define_sub_variants!(LHS = Scalar, RHS = Scalar, Output = Scalar);

impl<'b> SubAssign<&'b Scalar> for Scalar {
    fn sub_assign(&mut self, rhs: &'b Scalar) {
        *self = &*self - rhs;
    }
}

define_sub_assign_variants!(LHS = Scalar, RHS = Scalar);

impl<'a, 'b> Mul<&'b Scalar> for &'a Scalar {
    type Output = Scalar;
    fn mul(self, rhs: &'b Scalar) -> Scalar {
        Scalar::multiply_and_add(self, rhs, &Scalar::ZERO)
    }
}

define_mul_variants!(LHS = Scalar, RHS = Scalar, Output = Scalar);

impl<'b> MulAssign<&'b Scalar> for Scalar {
    fn mul_assign(&mut self, rhs: &'b Scalar) {
        *self = &*self * rhs;
    }
}

define_mul_assign_variants!(LHS = Scalar, RHS = Scalar);

impl<'a> Neg for &'a Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        UnpackedScalar::sub(&UnpackedScalar::ZERO, &self.unpack()).pack()
    }
}

impl Neg for Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        -&self
    }
}

impl Scalar {
    /// The additive identity.
    pub const ZERO: Scalar = Scalar { bytes: [0u8; 32] };

    /// The multiplicative identity.
    pub const ONE: Scalar = Scalar {
        bytes: [
            1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0,
        ],
    };

    /// Construct a `Scalar` by reducing a 256-bit little-endian integer
    /// modulo \\(\ell\\).
    pub fn from_bytes_mod_order(bytes: [u8; 32]) -> Scalar {
        let mut wide = [0u8; 64];
        wide[..32].copy_from_slice(&bytes);
        Scalar::from_bytes_mod_order_wide(&wide)
    }

    /// Construct a `Scalar` by reducing a 512-bit little-endian integer
    /// modulo \\(\ell\\).
    pub fn from_bytes_mod_order_wide(input: &[u8; 64]) -> Scalar {
        // Load 24 limbs of 21 bits; the top limb keeps its full 29 bits,
        // which reduce_limbs' first carry pass flattens out.
        let mask = (1i64 << 21) - 1;
        let mut z = [0i64; 24];
        z[0] = mask & load3(&input[0..]);
        z[1] = mask & (load4(&input[2..]) >> 5);
        z[2] = mask & (load3(&input[5..]) >> 2);
        z[3] = mask & (load4(&input[7..]) >> 7);
        z[4] = mask & (load4(&input[10..]) >> 4);
        z[5] = mask & (load3(&input[13..]) >> 1);
        z[6] = mask & (load4(&input[15..]) >> 6);
        z[7] = mask & (load3(&input[18..]) >> 3);
        z[8] = mask & load3(&input[21..]);
        z[9] = mask & (load4(&input[23..]) >> 5);
        z[10] = mask & (load3(&input[26..]) >> 2);
        z[11] = mask & (load4(&input[28..]) >> 7);
        z[12] = mask & (load4(&input[31..]) >> 4);
        z[13] = mask & (load3(&input[34..]) >> 1);
        z[14] = mask & (load4(&input[36..]) >> 6);
        z[15] = mask & (load3(&input[39..]) >> 3);
        z[16] = mask & load3(&input[42..]);
        z[17] = mask & (load4(&input[44..]) >> 5);
        z[18] = mask & (load3(&input[47..]) >> 2);
        z[19] = mask & (load4(&input[49..]) >> 7);
        z[20] = mask & (load4(&input[52..]) >> 4);
        z[21] = mask & (load3(&input[55..]) >> 1);
        z[22] = mask & (load4(&input[57..]) >> 6);
        z[23] = load4(&input[60..]) >> 3;

        Scalar::pack_radix_21(&Scalar::reduce_limbs(&mut z))
    }

    /// Attempt to construct a `Scalar` from its canonical byte
    /// representation.
    ///
    /// Fails if the high bit is set or the value is not already reduced
    /// modulo \\(\ell\\).
    pub fn from_canonical_bytes(bytes: [u8; 32]) -> Result<Scalar, InvalidRepresentation> {
        if bytes[31] >> 7 != 0 {
            return Err(InvalidRepresentation);
        }
        let candidate = Scalar { bytes };
        if !candidate.is_canonical() {
            return Err(InvalidRepresentation);
        }
        Ok(candidate)
    }

    /// Construct a `Scalar` from the low 255 bits of a 256-bit integer,
    /// without reducing modulo \\(\ell\\).
    ///
    /// Intended for applications like X25519 that need specific
    /// bit patterns in the scalar.
    pub fn from_bits(mut bytes: [u8; 32]) -> Scalar {
        bytes[31] &= 0x7f;
        Scalar { bytes }
    }

    /// Return a uniformly random `Scalar` from a caller-provided CSPRNG.
    #[cfg(feature = "rand_core")]
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
        let mut wide = [0u8; 64];
        rng.fill_bytes(&mut wide);
        Scalar::from_bytes_mod_order_wide(&wide)
    }

    /// Hash a slice of bytes into a `Scalar` using a 512-bit digest.
    #[cfg(feature = "digest")]
    pub fn hash_from_bytes<D>(input: &[u8]) -> Scalar
    where
        D: Digest<OutputSize = U64> + Default,
    {
        let mut hash = D::default();
        hash.update(input);
        Scalar::from_hash(hash)
    }

    /// Construct a `Scalar` from an existing digest instance.
    #[cfg(feature = "digest")]
    pub fn from_hash<D>(hash: D) -> Scalar
    where
        D: Digest<OutputSize = U64>,
    {
        let mut output = [0u8; 64];
        output.copy_from_slice(hash.finalize().as_slice());
        Scalar::from_bytes_mod_order_wide(&output)
    }

    /// View this `Scalar` as an array of bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Copy this `Scalar` to an array of bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.bytes
    }

    /// Extract the `i`-th bit of the scalar, little-endian.
    pub fn bit(&self, i: usize) -> u8 {
        (self.bytes[i >> 3] >> (i & 7)) & 1
    }

    /// Compute the multiplicative inverse of this scalar, by Fermat
    /// exponentiation with the fixed bit pattern of \\(\ell - 2\\).
    ///
    /// The result on zero input is zero.
    pub fn invert(&self) -> Scalar {
        let mut acc = Scalar::ONE;
        for i in (0..256).rev() {
            acc = Scalar::multiply_and_add(&acc, &acc, &Scalar::ZERO);
            if constants::BASEPOINT_ORDER_MINUS_2.bit(i) == 1 {
                acc = Scalar::multiply_and_add(self, &acc, &Scalar::ZERO);
            }
        }
        acc
    }

    /// Compute `self / rhs = self * rhs^-1 (mod l)`.
    pub fn divide(&self, rhs: &Scalar) -> Scalar {
        Scalar::multiply_and_add(self, &rhs.invert(), &Scalar::ZERO)
    }

    /// Compute `self^2 (mod l)`.
    pub fn square(&self) -> Scalar {
        Scalar::multiply_and_add(self, self, &Scalar::ZERO)
    }

    /// Reduce this scalar modulo \\(\ell\\).
    pub fn reduce(&self) -> Scalar {
        let mut wide = [0u8; 64];
        wide[..32].copy_from_slice(&self.bytes);
        Scalar::from_bytes_mod_order_wide(&wide)
    }

    /// Check whether this scalar is the canonical representative modulo
    /// \\(\ell\\).
    pub fn is_canonical(&self) -> bool {
        self.ct_eq(&self.reduce()).into()
    }

    /// Compute `a*b + c (mod l)`.
    pub fn multiply_and_add(a: &Scalar, b: &Scalar, c: &Scalar) -> Scalar {
        let al = Scalar::to_radix_21(&a.bytes);
        let bl = Scalar::to_radix_21(&b.bytes);
        let cl = Scalar::to_radix_21(&c.bytes);

        // 12x12 schoolbook product in 21-bit limbs.  Each accumulator
        // holds at most twelve products of 42 bits plus a 21-bit carry-in,
        // comfortably inside i64.
        let mut z = [0i64; 24];
        for i in 0..12 {
            z[i] += cl[i];
            for j in 0..12 {
                z[i + j] += al[i] * bl[j];
            }
        }

        Scalar::pack_radix_21(&Scalar::reduce_limbs(&mut z))
    }

    /// Unpack 32 bytes into twelve 21-bit limbs.
    fn to_radix_21(bytes: &[u8; 32]) -> [i64; 12] {
        let mask = (1i64 << 21) - 1;
        [
            mask & load3(&bytes[0..]),
            mask & (load4(&bytes[2..]) >> 5),
            mask & (load3(&bytes[5..]) >> 2),
            mask & (load4(&bytes[7..]) >> 7),
            mask & (load4(&bytes[10..]) >> 4),
            mask & (load3(&bytes[13..]) >> 1),
            mask & (load4(&bytes[15..]) >> 6),
            mask & (load3(&bytes[18..]) >> 3),
            mask & load3(&bytes[21..]),
            mask & (load4(&bytes[23..]) >> 5),
            mask & (load3(&bytes[26..]) >> 2),
            load4(&bytes[28..]) >> 7,
        ]
    }

    /// Pack twelve reduced 21-bit limbs back into 32 bytes.
    fn pack_radix_21(z: &[i64; 12]) -> Scalar {
        let mut s = [0u8; 32];
        s[0] = z[0] as u8;
        s[1] = (z[0] >> 8) as u8;
        s[2] = ((z[0] >> 16) | (z[1] << 5)) as u8;
        s[3] = (z[1] >> 3) as u8;
        s[4] = (z[1] >> 11) as u8;
        s[5] = ((z[1] >> 19) | (z[2] << 2)) as u8;
        s[6] = (z[2] >> 6) as u8;
        s[7] = ((z[2] >> 14) | (z[3] << 7)) as u8;
        s[8] = (z[3] >> 1) as u8;
        s[9] = (z[3] >> 9) as u8;
        s[10] = ((z[3] >> 17) | (z[4] << 4)) as u8;
        s[11] = (z[4] >> 4) as u8;
        s[12] = (z[4] >> 12) as u8;
        s[13] = ((z[4] >> 20) | (z[5] << 1)) as u8;
        s[14] = (z[5] >> 7) as u8;
        s[15] = ((z[5] >> 15) | (z[6] << 6)) as u8;
        s[16] = (z[6] >> 2) as u8;
        s[17] = (z[6] >> 10) as u8;
        s[18] = ((z[6] >> 18) | (z[7] << 3)) as u8;
        s[19] = (z[7] >> 5) as u8;
        s[20] = (z[7] >> 13) as u8;
        s[21] = z[8] as u8;
        s[22] = (z[8] >> 8) as u8;
        s[23] = ((z[8] >> 16) | (z[9] << 5)) as u8;
        s[24] = (z[9] >> 3) as u8;
        s[25] = (z[9] >> 11) as u8;
        s[26] = ((z[9] >> 19) | (z[10] << 2)) as u8;
        s[27] = (z[10] >> 6) as u8;
        s[28] = ((z[10] >> 14) | (z[11] << 7)) as u8;
        s[29] = (z[11] >> 1) as u8;
        s[30] = (z[11] >> 9) as u8;
        s[31] = (z[11] >> 17) as u8;

        Scalar { bytes: s }
    }

    /// Reduce 24 limbs to 12, modulo \\(\ell\\).
    ///
    /// Since \\(2^{252} \equiv -(\ell - 2^{252}) \pmod \ell\\), and limb
    /// \\(12+k\\) weighs \\(2^{252 + 21k}\\), each high limb can be
    /// eliminated by adding its value times the base-\\(2^{21}\\) digits
    /// of \\(-( \ell - 2^{252})\\),
    ///
    /// ```text
    ///   666643*2^0 + 470296*2^21 + 654183*2^42
    /// - 997805*2^63 + 136657*2^84 - 683901*2^105,
    /// ```
    ///
    /// to the six limbs starting 12 positions below.  Carries interleave
    /// with the folds to keep every limb inside i64.
    fn reduce_limbs(z: &mut [i64; 24]) -> [i64; 12] {
        #[inline(always)]
        fn fold(z: &mut [i64; 24], i: usize) {
            z[i - 12] += z[i] * 666643;
            z[i - 11] += z[i] * 470296;
            z[i - 10] += z[i] * 654183;
            z[i - 9] -= z[i] * 997805;
            z[i - 8] += z[i] * 136657;
            z[i - 7] -= z[i] * 683901;
            z[i] = 0;
        }
        /// Carry excess from limb `i` into limb `i+1`, leaving
        /// `-2^20 <= z[i] < 2^20`.
        #[inline(always)]
        fn carry_centered(z: &mut [i64; 24], i: usize) {
            let carry: i64 = (z[i] + (1 << 20)) >> 21;
            z[i + 1] += carry;
            z[i] -= carry << 21;
        }
        /// Carry excess from limb `i` into limb `i+1`, leaving
        /// `0 <= z[i] < 2^21`.
        #[inline(always)]
        fn carry_uncentered(z: &mut [i64; 24], i: usize) {
            let carry: i64 = z[i] >> 21;
            z[i + 1] += carry;
            z[i] -= carry << 21;
        }

        for i in 0..23 {
            carry_centered(z, i);
        }
        for i in (1..23).step_by(2) {
            carry_centered(z, i);
        }

        fold(z, 23);
        fold(z, 22);
        fold(z, 21);
        fold(z, 20);
        fold(z, 19);
        fold(z, 18);

        for i in (6..18).step_by(2) {
            carry_centered(z, i);
        }
        for i in (7..16).step_by(2) {
            carry_centered(z, i);
        }

        fold(z, 17);
        fold(z, 16);
        fold(z, 15);
        fold(z, 14);
        fold(z, 13);
        fold(z, 12);

        for i in (0..12).step_by(2) {
            carry_centered(z, i);
        }
        for i in (1..12).step_by(2) {
            carry_centered(z, i);
        }

        fold(z, 12);

        for i in 0..12 {
            carry_uncentered(z, i);
        }

        fold(z, 12);

        for i in 0..11 {
            carry_uncentered(z, i);
        }

        let mut out = [0i64; 12];
        out.copy_from_slice(&z[..12]);
        out
    }

    /// Unpack into nine 29-bit limbs for addition and subtraction.
    pub(crate) fn unpack(&self) -> UnpackedScalar {
        UnpackedScalar::from_bytes(&self.bytes)
    }

    /// Write this scalar in radix 16, with 64 signed coefficients in
    /// \\([-8, 8)\\) (the last in \\([-8, 8]\\)).
    ///
    /// Precondition: `self.bytes[31] <= 127`, which holds for every
    /// constructed `Scalar`.
    pub(crate) fn to_radix_16(&self) -> [i8; 64] {
        debug_assert!(self.bytes[31] <= 127);
        let mut digits = [0i8; 64];

        // Nibbles first, then a carrying pass recenters each digit from
        // [0, 16) to [-8, 8).
        for i in 0..32 {
            digits[2 * i] = (self.bytes[i] & 15) as i8;
            digits[2 * i + 1] = ((self.bytes[i] >> 4) & 15) as i8;
        }

        let mut carry = 0i8;
        for i in 0..63 {
            digits[i] += carry;
            carry = (digits[i] + 8) >> 4;
            digits[i] -= carry << 4;
        }
        // digits[63] was at most 7 and gains at most 1 from the carry.
        digits[63] += carry;

        digits
    }

    /// Write this scalar in signed radix \\(2^w\\) for `w` in 6..=8.
    ///
    /// Digits lie in \\([-2^{w-1}, 2^{w-1}]\\).  For `w = 8`, 33 digits
    /// are produced, the last absorbing the final carry; otherwise
    /// \\(\lceil 256/w \rceil\\) digits, the last absorbing it.
    pub(crate) fn to_radix_2w(&self, w: usize) -> [i8; 43] {
        debug_assert!((6..=8).contains(&w));

        // Reinterpret the bytes as four 64-bit words for windowed
        // extraction.
        let mut words = [0u64; 4];
        for i in 0..4 {
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&self.bytes[i * 8..(i + 1) * 8]);
            words[i] = u64::from_le_bytes(chunk);
        }

        let radix = 1u64 << w;
        let window_mask = radix - 1;

        let digits_count = (256 + w - 1) / w;
        let mut digits = [0i8; 43];
        let mut carry = 0u64;
        for i in 0..digits_count {
            let bit_offset = i * w;
            let word_idx = bit_offset / 64;
            let bit_idx = bit_offset % 64;

            // Window bits, possibly straddling a word boundary.
            let bit_buf = if bit_idx < 64 - w || word_idx == 3 {
                words[word_idx] >> bit_idx
            } else {
                (words[word_idx] >> bit_idx) | (words[word_idx + 1] << (64 - bit_idx))
            };

            let coef = carry + (bit_buf & window_mask);

            // Recenter into [-radix/2, radix/2).
            carry = (coef + radix / 2) >> w;
            digits[i] = (coef as i64 - ((carry << w) as i64)) as i8;
        }

        // For w < 8 the final carry re-enters the top digit (scalars are
        // below 2^255); for w = 8 it needs its own 33rd digit.
        if w == 8 {
            digits[digits_count] += carry as i8;
        } else {
            digits[digits_count - 1] += (carry << w) as i8;
        }

        digits
    }

    /// Compute a width-5 "Non-Adjacent Form" of this scalar: 256 signed
    /// coefficients, each odd and in \\([-15, 15]\\), with at least four
    /// zeros between consecutive nonzeros.
    pub(crate) fn non_adjacent_form(&self) -> [i8; 256] {
        let mut naf = [0i8; 256];

        // One byte per bit, then greedily merge runs of bits into odd
        // digits by carrying upwards or downwards.
        for i in 0..256 {
            naf[i] = self.bit(i) as i8;
        }

        for i in 0..256 {
            if naf[i] == 0 {
                continue;
            }
            'window: for b in 1..=6 {
                if i + b >= 256 {
                    break 'window;
                }
                if naf[i + b] == 0 {
                    continue 'window;
                }
                let contribution = naf[i + b] << b;
                if naf[i] + contribution <= 15 {
                    // Absorb naf[i+b] downwards.
                    naf[i] += contribution;
                    naf[i + b] = 0;
                } else if naf[i] - contribution >= -15 {
                    // Absorb naf[i+b] upwards, rippling the borrow
                    // through the run of ones above it.
                    naf[i] -= contribution;
                    for k in (i + b)..256 {
                        if naf[k] == 0 {
                            naf[k] = 1;
                            break;
                        }
                        naf[k] = 0;
                    }
                } else {
                    break 'window;
                }
            }
        }

        naf
    }
}

/// A scalar unpacked into nine 29-bit limbs, the working form for
/// addition and subtraction.
#[derive(Copy, Clone)]
pub(crate) struct UnpackedScalar(pub(crate) [u32; 9]);

impl UnpackedScalar {
    pub(crate) const ZERO: UnpackedScalar = UnpackedScalar([0, 0, 0, 0, 0, 0, 0, 0, 0]);

    const MASK: u32 = (1 << 29) - 1;

    /// Unpack 32 bytes into nine 29-bit limbs.
    pub(crate) fn from_bytes(bytes: &[u8; 32]) -> UnpackedScalar {
        let mut words = [0u32; 8];
        for i in 0..8 {
            let mut chunk = [0u8; 4];
            chunk.copy_from_slice(&bytes[i * 4..(i + 1) * 4]);
            words[i] = u32::from_le_bytes(chunk);
        }

        let mask = UnpackedScalar::MASK;
        let top_mask = (1u32 << 24) - 1;

        UnpackedScalar([
            words[0] & mask,
            ((words[0] >> 29) | (words[1] << 3)) & mask,
            ((words[1] >> 26) | (words[2] << 6)) & mask,
            ((words[2] >> 23) | (words[3] << 9)) & mask,
            ((words[3] >> 20) | (words[4] << 12)) & mask,
            ((words[4] >> 17) | (words[5] << 15)) & mask,
            ((words[5] >> 14) | (words[6] << 18)) & mask,
            ((words[6] >> 11) | (words[7] << 21)) & mask,
            (words[7] >> 8) & top_mask,
        ])
    }

    /// Pack the limbs back into a `Scalar`.
    pub(crate) fn pack(&self) -> Scalar {
        let z = &self.0;
        let mut s = [0u8; 32];
        s[0] = z[0] as u8;
        s[1] = (z[0] >> 8) as u8;
        s[2] = (z[0] >> 16) as u8;
        s[3] = ((z[0] >> 24) | (z[1] << 5)) as u8;
        s[4] = (z[1] >> 3) as u8;
        s[5] = (z[1] >> 11) as u8;
        s[6] = (z[1] >> 19) as u8;
        s[7] = ((z[1] >> 27) | (z[2] << 2)) as u8;
        s[8] = (z[2] >> 6) as u8;
        s[9] = (z[2] >> 14) as u8;
        s[10] = ((z[2] >> 22) | (z[3] << 7)) as u8;
        s[11] = (z[3] >> 1) as u8;
        s[12] = (z[3] >> 9) as u8;
        s[13] = (z[3] >> 17) as u8;
        s[14] = ((z[3] >> 25) | (z[4] << 4)) as u8;
        s[15] = (z[4] >> 4) as u8;
        s[16] = (z[4] >> 12) as u8;
        s[17] = (z[4] >> 20) as u8;
        s[18] = ((z[4] >> 28) | (z[5] << 1)) as u8;
        s[19] = (z[5] >> 7) as u8;
        s[20] = (z[5] >> 15) as u8;
        s[21] = ((z[5] >> 23) | (z[6] << 6)) as u8;
        s[22] = (z[6] >> 2) as u8;
        s[23] = (z[6] >> 10) as u8;
        s[24] = (z[6] >> 18) as u8;
        s[25] = ((z[6] >> 26) | (z[7] << 3)) as u8;
        s[26] = (z[7] >> 5) as u8;
        s[27] = (z[7] >> 13) as u8;
        s[28] = (z[7] >> 21) as u8;
        s[29] = z[8] as u8;
        s[30] = (z[8] >> 8) as u8;
        s[31] = (z[8] >> 16) as u8;

        Scalar { bytes: s }
    }

    /// Compute `a + b (mod l)`, assuming both inputs are below \\(\ell\\).
    pub(crate) fn add(a: &UnpackedScalar, b: &UnpackedScalar) -> UnpackedScalar {
        let mut sum = UnpackedScalar::ZERO;

        let mut carry: u32 = 0;
        for i in 0..9 {
            carry = a.0[i] + b.0[i] + (carry >> 29);
            sum.0[i] = carry & UnpackedScalar::MASK;
        }

        // The sum is below 2l; one conditional subtraction reduces it.
        UnpackedScalar::sub(&sum, &constants::L)
    }

    /// Compute `a - b (mod l)`.
    pub(crate) fn sub(a: &UnpackedScalar, b: &UnpackedScalar) -> UnpackedScalar {
        let mut difference = UnpackedScalar::ZERO;

        let mut borrow: u32 = 0;
        for i in 0..9 {
            borrow = a.0[i].wrapping_sub(b.0[i] + (borrow >> 31));
            difference.0[i] = borrow & UnpackedScalar::MASK;
        }

        // Conditionally add l if the subtraction underflowed.
        let underflow_mask = ((borrow >> 31) ^ 1).wrapping_sub(1);
        let mut carry: u32 = 0;
        for i in 0..9 {
            carry = (carry >> 29) + difference.0[i] + (constants::L.0[i] & underflow_mask);
            difference.0[i] = carry & UnpackedScalar::MASK;
        }

        difference
    }
}

// ------------------------------------------------------------------------
// Serde support: a scalar serializes as its canonical 32 bytes.
// ------------------------------------------------------------------------

#[cfg(feature = "serde")]
use serde::de::Visitor;
#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[cfg(feature = "serde")]
impl Serialize for Scalar {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(self.as_bytes())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ScalarVisitor;

        impl<'de> Visitor<'de> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                formatter.write_str("a canonical 32-byte scalar")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Scalar, E>
            where
                E: serde::de::Error,
            {
                if v.len() != 32 {
                    return Err(serde::de::Error::invalid_length(v.len(), &self));
                }
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(v);
                Scalar::from_canonical_bytes(bytes)
                    .map_err(|_| serde::de::Error::custom("scalar was not canonical"))
            }
        }

        deserializer.deserialize_bytes(ScalarVisitor)
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// x = 2238329342913194256032495932344128051776374960164957527413114840482143558222
    pub static X: Scalar = Scalar {
        bytes: [
            0x4e, 0x5a, 0xb4, 0x34, 0x5d, 0x47, 0x08, 0x84, 0x59, 0x13, 0xb4, 0x64, 0x1b, 0xc2,
            0x7d, 0x52, 0x52, 0xa5, 0x85, 0x10, 0x1b, 0xcc, 0x42, 0x44, 0xd4, 0x49, 0xf4, 0xa8,
            0x79, 0xd9, 0xf2, 0x04,
        ],
    };
    /// y = 2592331292931086675770238855846338635550719849568364935475441891787804997264
    pub static Y: Scalar = Scalar {
        bytes: [
            0x90, 0x76, 0x33, 0xfe, 0x1c, 0x4b, 0x66, 0xa4, 0xa2, 0x8d, 0x2d, 0xd7, 0x67, 0x83,
            0x86, 0xc3, 0x53, 0xd0, 0xde, 0x54, 0x55, 0xd4, 0xfc, 0x9d, 0xe8, 0xef, 0x7a, 0xc3,
            0x1f, 0x35, 0xbb, 0x05,
        ],
    };
    /// z = 5033871415930814945849241457262266927579821285980625165479289807629491019013
    pub static Z: Scalar = Scalar {
        bytes: [
            0x05, 0x9d, 0x3e, 0x0b, 0x09, 0x26, 0x50, 0x3d, 0xa3, 0x84, 0xa1, 0x3c, 0x92, 0x7a,
            0xc2, 0x06, 0x41, 0x98, 0xcf, 0x34, 0x3a, 0x24, 0xd5, 0xb7, 0xeb, 0x33, 0x6a, 0x2d,
            0xfc, 0x11, 0x21, 0x0b,
        ],
    };
    /// w = x*y + z
    static W: Scalar = Scalar {
        bytes: [
            0x84, 0xfc, 0xbc, 0x4f, 0x78, 0x12, 0xa0, 0x06, 0xd7, 0x91, 0xd9, 0x7a, 0x3a, 0x27,
            0xdd, 0x1e, 0x21, 0x43, 0x45, 0xf7, 0xb1, 0xb9, 0x56, 0x7a, 0x81, 0x30, 0x73, 0x44,
            0x96, 0x85, 0xb5, 0x07,
        ],
    };

    /// x*y = 5690045403673944803228348699031245560686958845067437804563560795922180092780
    static X_TIMES_Y: Scalar = Scalar {
        bytes: [
            0x6c, 0x33, 0x74, 0xa1, 0x89, 0x4f, 0x62, 0x21, 0x0a, 0xaa, 0x2f, 0xe1, 0x86, 0xa6,
            0xf9, 0x2c, 0xe0, 0xaa, 0x75, 0xc2, 0x77, 0x95, 0x81, 0xc2, 0x95, 0xfc, 0x08, 0x17,
            0x9a, 0x73, 0x94, 0x0c,
        ],
    };

    pub static A_SCALAR: Scalar = Scalar {
        bytes: [
            0x1a, 0x0e, 0x97, 0x8a, 0x90, 0xf6, 0x62, 0x2d, 0x37, 0x47, 0x02, 0x3f, 0x8a, 0xd8,
            0x26, 0x4d, 0xa7, 0x58, 0xaa, 0x1b, 0x88, 0xe0, 0x40, 0xd1, 0x58, 0x9e, 0x7b, 0x7f,
            0x23, 0x76, 0xef, 0x09,
        ],
    };

    static A_NAF: [i8; 256] = [
        0, 13, 0, 0, 0, 0, 0, 0, 0, 7, 0, 0, 0, 0, 0, 0, -9, 0, 0, 0, 0, -11, 0, 0, 0, 0, 3, 0, 0,
        0, 0, 1, 0, 0, 0, 0, 9, 0, 0, 0, 0, -5, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 0, 11, 0, 0, 0, 0,
        11, 0, 0, 0, 0, 0, -9, 0, 0, 0, 0, 0, -3, 0, 0, 0, 0, 9, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0,
        0, -1, 0, 0, 0, 0, 0, 9, 0, 0, 0, 0, -15, 0, 0, 0, 0, -7, 0, 0, 0, 0, -9, 0, 0, 0, 0, 0,
        5, 0, 0, 0, 0, 13, 0, 0, 0, 0, 0, -3, 0, 0, 0, 0, -11, 0, 0, 0, 0, -7, 0, 0, 0, 0, -13, 0,
        0, 0, 0, 11, 0, 0, 0, 0, -9, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, -15, 0, 0, 0, 0, 1, 0, 0, 0,
        0, 7, 0, 0, 0, 0, 0, 0, 0, 0, 5, 0, 0, 0, 0, 0, 13, 0, 0, 0, 0, 0, 0, 11, 0, 0, 0, 0, 0,
        15, 0, 0, 0, 0, 0, -9, 0, 0, 0, 0, 0, 0, 0, -1, 0, 0, 0, 0, 0, 0, 0, 7, 0, 0, 0, 0, 0,
        -15, 0, 0, 0, 0, 0, 15, 0, 0, 0, 0, 15, 0, 0, 0, 0, 15, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0,
    ];

    #[test]
    fn non_adjacent_form_matches_sage() {
        let naf = A_SCALAR.non_adjacent_form();
        for i in 0..256 {
            assert_eq!(naf[i], A_NAF[i]);
        }
    }

    #[test]
    fn non_adjacent_form_digits_are_sparse_and_odd() {
        let naf = A_SCALAR.non_adjacent_form();
        for i in 0..256 {
            if naf[i] == 0 {
                continue;
            }
            assert_eq!(naf[i] & 1, 1);
            assert!(naf[i] <= 15 && naf[i] >= -15);
            for j in 1..5 {
                if i + j < 256 {
                    assert_eq!(naf[i + j], 0);
                }
            }
        }
    }

    #[test]
    fn from_u64() {
        let val = 0xdead_beef_dead_beefu64;
        let s = Scalar::from(val);
        assert_eq!(s.bytes[0], 0xef);
        assert_eq!(s.bytes[1], 0xbe);
        assert_eq!(s.bytes[6], 0xad);
        assert_eq!(s.bytes[7], 0xde);
        assert_eq!(s.bytes[8], 0x00);
    }

    #[test]
    fn bit_accessor() {
        // 0x06 = 0b110: bits 1 and 2 set, bit 0 and 3 clear.
        let s = Scalar::from(6u64);
        assert_eq!(s.bit(0), 0);
        assert_eq!(s.bit(1), 1);
        assert_eq!(s.bit(2), 1);
        assert_eq!(s.bit(3), 0);
        // Byte 1 starts at bit 8.
        let t = Scalar::from(0x8000u64);
        assert_eq!(t.bit(15), 1);
        assert_eq!(t.bit(14), 0);
        // Cross-check every bit of a fixed scalar against its bytes.
        for i in 0..256 {
            assert_eq!(A_SCALAR.bit(i), (A_SCALAR.bytes[i / 8] >> (i % 8)) & 1);
        }
    }

    #[test]
    fn impl_mul() {
        assert_eq!(&X * &Y, X_TIMES_Y);
    }

    #[test]
    fn multiply_and_add_matches_mul_plus_add() {
        assert_eq!(Scalar::multiply_and_add(&X, &Y, &Z), W);
        assert_eq!(Scalar::multiply_and_add(&X, &Y, &Scalar::ZERO), &X * &Y);
        assert_eq!(&X_TIMES_Y + &Z, W);
    }

    #[test]
    fn square_matches_mul() {
        assert_eq!(X.square(), &X * &X);
    }

    #[test]
    fn impl_add_sub() {
        let two = Scalar::from(2u64);
        let one = Scalar::ONE;
        assert_eq!(&one + &one, two);
        assert_eq!(&two - &one, one);

        // 0 - 1 wraps to l - 1.
        let l_minus_1 = Scalar {
            bytes: [
                0xec, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde,
                0xf9, 0xde, 0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x10,
            ],
        };
        assert_eq!(&Scalar::ZERO - &one, l_minus_1);
        assert_eq!(&l_minus_1 + &one, Scalar::ZERO);
    }

    #[test]
    fn neg_twice_is_identity() {
        assert_eq!(-&(-&X), X);
        assert_eq!(-&Scalar::ZERO, Scalar::ZERO);
        assert_eq!(&X + &(-&X), Scalar::ZERO);
    }

    #[test]
    fn wide_reduction_known_answer() {
        let mut bignum = [0u8; 64];
        // set bignum = x + 2^256 x
        for i in 0..32 {
            bignum[i] = X.bytes[i];
            bignum[32 + i] = X.bytes[i];
        }
        // 3958878930004874126169954872055634648693766179881526445624823978500314864344
        // = x + 2^256 x (mod l)
        let reduced = Scalar {
            bytes: [
                216, 154, 179, 139, 210, 121, 2, 71, 69, 99, 158, 216, 23, 173, 63, 100, 204, 0,
                91, 50, 219, 153, 57, 249, 28, 82, 31, 197, 100, 165, 192, 8,
            ],
        };
        assert_eq!(Scalar::from_bytes_mod_order_wide(&bignum), reduced);
    }

    #[test]
    fn wide_reduction_of_all_ones() {
        // 2^512 - 1 mod l, from the reference implementation.
        let expected = Scalar {
            bytes: [
                0x1c, 0x95, 0x98, 0x8d, 0x74, 0x31, 0xec, 0xd6, 0x70, 0xcf, 0x7d, 0x73, 0xf4,
                0x5b, 0xef, 0xc6, 0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
                0xff, 0xff, 0xff, 0xff, 0xff, 0x0f,
            ],
        };
        assert_eq!(Scalar::from_bytes_mod_order_wide(&[0xff; 64]), expected);
    }

    #[test]
    fn invert() {
        let x_inv = X.invert();
        assert_eq!(&x_inv * &X, Scalar::ONE);
        assert_eq!(X.divide(&X), Scalar::ONE);
        assert_eq!(X.divide(&Y), &X * &Y.invert());
    }

    #[test]
    fn from_canonical_bytes_accepts_canonical() {
        let s = Scalar::from_canonical_bytes(X.bytes).unwrap();
        assert_eq!(s, X);
    }

    #[test]
    fn from_canonical_bytes_rejects_unreduced() {
        // l itself is not canonical.
        let l_bytes: [u8; 32] = [
            0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9,
            0xde, 0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x10,
        ];
        assert_eq!(
            Scalar::from_canonical_bytes(l_bytes),
            Err(InvalidRepresentation)
        );
    }

    #[test]
    fn from_canonical_bytes_rejects_high_bit() {
        let mut bytes = X.bytes;
        bytes[31] |= 0x80;
        assert_eq!(
            Scalar::from_canonical_bytes(bytes),
            Err(InvalidRepresentation)
        );
    }

    #[test]
    fn from_bits_clears_high_bit() {
        let s = Scalar::from_bits([0xff; 32]);
        assert_eq!(s.bytes[31], 0x7f);
        // from_bits does not reduce.
        assert!(!s.is_canonical());
        assert!(X.is_canonical());
    }

    #[test]
    fn from_bytes_mod_order_keeps_bit_255() {
        // 2^256 - 1 = 2*(2^255) - 1 (mod l); from_bits would drop the
        // top bit, from_bytes_mod_order must not.
        let t = two_to_the_255_mod_l();
        let expected = &(&t + &t) - &Scalar::ONE;
        let reduced = Scalar::from_bytes_mod_order([0xff; 32]);
        assert_eq!(reduced, expected);
        assert!(reduced.is_canonical());
    }

    fn two_to_the_255_mod_l() -> Scalar {
        let mut bytes = [0u8; 64];
        bytes[31] = 0x80;
        Scalar::from_bytes_mod_order_wide(&bytes)
    }

    #[test]
    fn radix_16_digit_bounds_and_reconstruction() {
        let digits = A_SCALAR.to_radix_16();
        for (i, digit) in digits.iter().enumerate() {
            if i == 63 {
                assert!((0..=8).contains(digit));
            } else {
                assert!((-8..8).contains(digit));
            }
        }

        // Horner evaluation: sum of digit*16^i must give back the scalar.
        let sixteen = Scalar::from(16u64);
        let mut acc = Scalar::ZERO;
        for digit in digits.iter().rev() {
            acc *= &sixteen;
            acc += &digit_scalar(*digit);
        }
        assert_eq!(acc, A_SCALAR);
    }

    #[test]
    fn radix_2w_reconstruction() {
        for w in 6..=8 {
            let digits = A_SCALAR.to_radix_2w(w);
            let digits_count = if w == 8 { 33 } else { (256 + w - 1) / w };
            let radix = Scalar::from(1u64 << w);

            let mut acc = Scalar::ZERO;
            for digit in digits[..digits_count].iter().rev() {
                acc *= &radix;
                acc += &digit_scalar(*digit);
            }
            assert_eq!(acc, A_SCALAR, "w = {}", w);

            for digit in digits[..digits_count].iter() {
                let bound = 1i16 << (w - 1);
                assert!((*digit as i16) >= -bound && (*digit as i16) <= bound);
            }
        }
    }

    fn digit_scalar(digit: i8) -> Scalar {
        if digit < 0 {
            -&Scalar::from((-(digit as i16)) as u64)
        } else {
            Scalar::from(digit as u64)
        }
    }

    #[test]
    fn canonical_decoding() {
        // Canonical encoding of 1667457891
        let canonical_bytes = [
            99, 99, 99, 99, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0,
        ];
        assert!(Scalar::from_canonical_bytes(canonical_bytes).is_ok());

        // Encoding of 7265385991361016183439748078976496179028704920197054998554201349516117938192
        // = 28380414028753969466561515933501938171588560817147392552250411230663687203
        // (mod l), non-canonical because of overflow.
        let non_canonical_bytes_because_unreduced = [
            16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16,
            16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16,
        ];
        assert!(Scalar::from_canonical_bytes(non_canonical_bytes_because_unreduced).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_bincode_round_trip() {
        let encoded = bincode::serialize(&X).unwrap();
        let parsed: Scalar = bincode::deserialize(&encoded).unwrap();
        assert_eq!(parsed, X);

        // Non-canonical bytes are rejected on deserialization.  This
        // relies on bincode's eight-byte length prefix for byte strings.
        let l_bytes: [u8; 32] = [
            0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9,
            0xde, 0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x10,
        ];
        let mut encoded_l = bincode::serialize(&X).unwrap();
        encoded_l[8..40].copy_from_slice(&l_bytes);
        assert!(bincode::deserialize::<Scalar>(&encoded_l).is_err());
    }
}
