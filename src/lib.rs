// -*- mode: rust; -*-
//
// This file is part of ristretto255.
// See LICENSE for licensing information.

#![deny(missing_docs)]

//! # ristretto255
//!
//! A pure-Rust implementation of group operations on the twisted Edwards
//! form of Curve25519 and on ristretto255, the prime-order group obtained
//! by quotienting away the curve's cofactor.
//!
//! This crate provides the arithmetic stack needed to build higher-level
//! protocols (signatures, key agreement, VRFs, zero-knowledge proof
//! systems):
//!
//! * arithmetic in the field \\(\mathbb Z/(2^{255}-19)\\), in a ten-limb
//!   32-bit representation with 64-bit products;
//! * arithmetic on [`scalar::Scalar`]s, integers modulo the basepoint
//!   order \\(\ell\\);
//! * group operations on [`edwards::EdwardsPoint`]s in extended twisted
//!   Edwards coordinates, including constant-time variable-base and
//!   fixed-base scalar multiplication and a variable-time double-base
//!   multiplication for verification;
//! * the [`ristretto::RistrettoPoint`] prime-order abstraction with its
//!   canonical 32-byte encoding and Elligator-based hash-to-group;
//! * constant-time (Straus) and variable-time (Pippenger) multi-scalar
//!   multiplication, behind the traits in [`traits`].
//!
//! Operations documented as constant-time do not branch or index memory
//! based on secret data.  Functions with `vartime` in their name leak
//! their scalar inputs through timing and must only see public data.
//!
//! No protocol layer is included; callers get exactly the group, its
//! encodings, and nothing else.
//!
//! ## Feature flags
//!
//! * `serde` — serialize scalars and points as their canonical 32-byte
//!   encodings;
//! * `digest` — hash-to-scalar and hash-to-group from any 512-bit
//!   [`digest::Digest`];
//! * `rand_core` — uniformly random scalars and points from a
//!   caller-provided CSPRNG;
//! * `zeroize` — wipe scalars on drop via the [`zeroize`] traits.

// Internal macros come first so the operator-forwarding macros are in
// scope everywhere.
#[macro_use]
mod macros;

pub mod constants;
pub mod edwards;
pub mod errors;
pub mod ristretto;
pub mod scalar;
pub mod traits;

pub(crate) mod curve_models;
pub(crate) mod field;
pub(crate) mod scalar_mul;
pub(crate) mod window;
