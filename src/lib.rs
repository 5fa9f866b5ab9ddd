//! Arithmetic on the Jubjub elliptic curve.
//!
//! Jubjub is a twisted Edwards curve of order `8·ℓ` defined over the
//! BLS12-381 scalar field, used by Sapling-family shielded protocols for
//! signatures, key derivation and other in-circuit-friendly primitives.
//! This crate provides:
//!
//! * [`Fq`], the base field of the curve (the BLS12-381 scalar field);
//! * [`Fr`], the scalar field of the prime-order subgroup of order ℓ;
//! * [`AffinePoint`] and [`ExtendedPoint`] representations of group
//!   elements, with the 32-byte compressed wire encoding;
//! * [`ExtendedNielsPoint`], a precomputed addend carrying constant-time
//!   scalar multiplication.
//!
//! Every operation that can see secret data — field arithmetic, the group
//! law, conditional selection, the scalar ladder — runs in time and with a
//! memory access pattern independent of that data. Routines that are
//! variable-time carry a `_vartime` suffix and must only be given public
//! inputs.
//!
//! Points are validated on decode: an encoding is accepted only if it is
//! canonical and actually names a point on the curve.

#[macro_use]
mod macros;

mod arithmetic;
pub mod edwards;
pub mod fq;
pub mod fr;

pub use edwards::{
    AffinePoint, CompressedPoint, ExtendedNielsPoint, ExtendedPoint, EDWARDS_D, EDWARDS_D2,
};
pub use fq::{Fq, LegendreSymbol};
pub use fr::Fr;

use thiserror::Error;

/// An error produced while decoding a compressed point.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The input was not exactly 32 bytes long.
    #[error("expected 32 bytes, got {0}")]
    InvalidLength(usize),

    /// The 32 bytes do not name a point on the curve.
    #[error("invalid point encoding")]
    InvalidEncoding,
}
