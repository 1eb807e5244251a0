// -*- mode: rust; -*-
//
// This file is part of ristretto255.
// See LICENSE for licensing information.

//! The two recoverable failure kinds of this crate.
//!
//! Everything else (wrong input length, a zero exponent passed to an
//! internal doubling chain) is a programmer error and panics.

use thiserror::Error;

/// A compressed point was not the canonical encoding of any group element.
///
/// Returned by [`CompressedEdwardsY::decompress`][crate::edwards::CompressedEdwardsY::decompress]
/// when the y-coordinate has no corresponding x on the curve, and by
/// [`CompressedRistretto::decompress`][crate::ristretto::CompressedRistretto::decompress]
/// when any of the Ristretto canonicality checks fail.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[error("invalid point encoding")]
pub struct InvalidEncoding;

/// A byte string violated the `Scalar` representation invariant.
///
/// Either the high bit of byte 31 was set, or the value was not the
/// canonical representative below the group order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[error("invalid scalar representation")]
pub struct InvalidRepresentation;
