//! Group operations on the Jubjub curve, in twisted Edwards form.
//!
//! The curve is `-u² + v² = 1 + d·u²·v²` over [`Fq`] with
//! `d = -(10240/10241)`; its order is `8·ℓ` and the prime-order subgroup
//! of order ℓ is the cryptographic group. Points on the wire are 32 bytes:
//! the `v` coordinate little-endian, with the high bit of the last byte
//! carrying the sign (canonical parity) of `u`.
//!
//! Internally the group law runs on "extended" coordinates
//! `(u, v, z, t1, t2)` representing the affine point `(u/z, v/z)` with
//! `t1·t2 = u·v/z`, passing through a completed representation after each
//! doubling or addition. Addition takes its right-hand side in Niels form
//! `(v+u, v-u, z, 2d·t1·t2)`, which saves multiplications in the ladder.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use subtle::{Choice, ConditionallyNegatable, ConditionallySelectable, ConstantTimeEq, CtOption};

use crate::fq::Fq;
use crate::fr::Fr;
use crate::DecodeError;

/// `d = -(10240/10241)`
pub const EDWARDS_D: Fq = Fq::from_raw([
    0x0106_5fd6_d634_3eb1,
    0x292d_7f6d_3757_9d26,
    0xf5fd_9207_e6bd_7fd4,
    0x2a93_18e7_4bfa_2b48,
]);

/// `2·d`
pub const EDWARDS_D2: Fq = Fq::from_raw([
    0x020c_bfad_ac68_7d62,
    0x525a_feda_6eaf_3a4c,
    0xebfb_240f_cd7a_ffa8,
    0x5526_31ce_97f4_5691,
]);

// ------------------------------------------------------------------------
// Compressed points
// ------------------------------------------------------------------------

/// The 32-byte wire encoding of a point: `v` little-endian with the high
/// bit of byte 31 set to the canonical parity of `u`.
#[derive(Copy, Clone)]
pub struct CompressedPoint(pub [u8; 32]);

impl CompressedPoint {
    /// View this encoding as an array of bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Copy this encoding to an array of bytes.
    pub const fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// The encoding of the identity, affine (0, 1).
    pub const fn identity() -> CompressedPoint {
        let mut bytes = [0u8; 32];
        bytes[0] = 1;
        CompressedPoint(bytes)
    }

    /// Constructs a `CompressedPoint` from a slice of bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidLength`] unless the slice is exactly
    /// 32 bytes. No arithmetic is performed.
    pub fn from_slice(bytes: &[u8]) -> Result<CompressedPoint, DecodeError> {
        bytes
            .try_into()
            .map(CompressedPoint)
            .map_err(|_| DecodeError::InvalidLength(bytes.len()))
    }

    /// Attempts to decompress to an [`ExtendedPoint`].
    ///
    /// Returns `None` when the encoding is not canonical or the decoded
    /// `u²` has no square root, i.e. when these bytes do not name a curve
    /// point.
    pub fn decompress(&self) -> Option<ExtendedPoint> {
        ExtendedPoint::from_bytes(&self.0).into()
    }
}

impl TryFrom<&[u8]> for CompressedPoint {
    type Error = DecodeError;

    fn try_from(slice: &[u8]) -> Result<CompressedPoint, DecodeError> {
        Self::from_slice(slice)
    }
}

impl Default for CompressedPoint {
    fn default() -> CompressedPoint {
        CompressedPoint::identity()
    }
}

impl fmt::Debug for CompressedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompressedPoint({})", hex::encode(self.0))
    }
}

impl ConstantTimeEq for CompressedPoint {
    fn ct_eq(&self, other: &CompressedPoint) -> Choice {
        self.as_bytes().ct_eq(other.as_bytes())
    }
}

impl PartialEq for CompressedPoint {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}

impl Eq for CompressedPoint {}

// ------------------------------------------------------------------------
// Affine points
// ------------------------------------------------------------------------

/// An affine point `(u, v)` on the curve.
///
/// The coordinate pair satisfies the curve equation for every value
/// produced by decoding or by the group law; `from_raw_unchecked` is the
/// only way to construct one that does not.
#[derive(Clone, Copy, Debug)]
pub struct AffinePoint {
    u: Fq,
    v: Fq,
}

impl AffinePoint {
    /// The identity of the group, (0, 1).
    pub const fn identity() -> AffinePoint {
        AffinePoint {
            u: Fq::zero(),
            v: Fq::one(),
        }
    }

    /// Whether this is the identity.
    pub fn is_identity(&self) -> Choice {
        self.u.ct_eq(&Fq::zero()) & self.v.ct_eq(&Fq::one())
    }

    /// The `u` coordinate.
    pub const fn u(&self) -> Fq {
        self.u
    }

    /// The `v` coordinate.
    pub const fn v(&self) -> Fq {
        self.v
    }

    /// Constructs a point from raw coordinates without checking the curve
    /// equation. The caller is responsible for validity.
    pub const fn from_raw_unchecked(u: Fq, v: Fq) -> AffinePoint {
        AffinePoint { u, v }
    }

    /// Attempts to interpret a 32-byte compressed encoding as a point.
    ///
    /// The encoding must hold a canonical `v`, the reconstructed
    /// `u² = (v² - 1)/(d·v² + 1)` must have a square root, and the root is
    /// negated to match the sign bit. A failed square root rejects the
    /// encoding, so the result always lies on the curve.
    pub fn from_bytes(bytes: &[u8; 32]) -> CtOption<AffinePoint> {
        let mut b = *bytes;
        let sign = b[31] >> 7;
        b[31] &= 0b0111_1111;

        Fq::from_bytes(&b).and_then(|v| {
            // u² = (v² - 1) / (d·v² + 1); a zero denominator names no point.
            let v2 = v.square();
            let numerator = v2 - Fq::one();
            let denominator = v2 * EDWARDS_D + Fq::one();

            denominator.invert().and_then(|denom_inv| {
                (numerator * denom_inv).sqrt().map(|mut u| {
                    // The sign bit is the parity of the canonical encoding
                    // of u, never of its Montgomery form.
                    let flip_sign = Choice::from((u.to_bytes()[0] ^ sign) & 1);
                    u.conditional_negate(flip_sign);

                    AffinePoint { u, v }
                })
            })
        })
    }

    /// Compresses this point into its canonical 32-byte encoding.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut tmp = self.v.to_bytes();
        let u = self.u.to_bytes();

        // The sign of u goes into the most significant bit.
        tmp[31] |= u[0] << 7;

        tmp
    }

    /// Compresses this point.
    pub fn compress(&self) -> CompressedPoint {
        CompressedPoint(self.to_bytes())
    }

    /// Whether the coordinates satisfy `-u² + v² = 1 + d·u²·v²`.
    pub fn is_on_curve(&self) -> Choice {
        let u2 = self.u.square();
        let v2 = self.v.square();

        (v2 - u2).ct_eq(&(Fq::one() + EDWARDS_D * u2 * v2))
    }

    /// Lifts this point into extended coordinates.
    pub const fn to_extended(&self) -> ExtendedPoint {
        ExtendedPoint {
            u: self.u,
            v: self.v,
            z: Fq::one(),
            t1: self.u,
            t2: self.v,
        }
    }
}

impl Default for AffinePoint {
    fn default() -> AffinePoint {
        AffinePoint::identity()
    }
}

impl ConstantTimeEq for AffinePoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.u.ct_eq(&other.u) & self.v.ct_eq(&other.v)
    }
}

impl PartialEq for AffinePoint {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}

impl Eq for AffinePoint {}

impl ConditionallySelectable for AffinePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        AffinePoint {
            u: Fq::conditional_select(&a.u, &b.u, choice),
            v: Fq::conditional_select(&a.v, &b.v, choice),
        }
    }
}

impl<'a> Neg for &'a AffinePoint {
    type Output = AffinePoint;

    /// Flips the sign of `u`, returning `(-u, v)`.
    fn neg(self) -> AffinePoint {
        AffinePoint {
            u: -self.u,
            v: self.v,
        }
    }
}

impl Neg for AffinePoint {
    type Output = AffinePoint;

    fn neg(self) -> AffinePoint {
        -&self
    }
}

impl From<AffinePoint> for ExtendedPoint {
    fn from(affine: AffinePoint) -> ExtendedPoint {
        affine.to_extended()
    }
}

// ------------------------------------------------------------------------
// Extended points
// ------------------------------------------------------------------------

/// A point in extended coordinates `(u, v, z, t1, t2)` representing the
/// affine point `(u/z, v/z)` with `t1·t2 = u·v/z`.
#[derive(Clone, Copy, Debug)]
pub struct ExtendedPoint {
    u: Fq,
    v: Fq,
    z: Fq,
    t1: Fq,
    t2: Fq,
}

impl ExtendedPoint {
    /// The identity of the group, (0, 1, 1, 0, 1) — the lift of affine
    /// (0, 1).
    pub const fn identity() -> ExtendedPoint {
        ExtendedPoint {
            u: Fq::zero(),
            v: Fq::one(),
            z: Fq::one(),
            t1: Fq::zero(),
            t2: Fq::one(),
        }
    }

    /// Whether this is the identity, `u = 0` and `v = z`.
    pub fn is_identity(&self) -> Choice {
        self.u.ct_eq(&Fq::zero()) & self.v.ct_eq(&self.z)
    }

    /// Attempts to interpret a 32-byte compressed encoding as a point.
    pub fn from_bytes(bytes: &[u8; 32]) -> CtOption<ExtendedPoint> {
        AffinePoint::from_bytes(bytes).map(|p| p.to_extended())
    }

    /// Compresses this point into its canonical 32-byte encoding.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.to_affine().to_bytes()
    }

    /// Compresses this point.
    pub fn compress(&self) -> CompressedPoint {
        CompressedPoint(self.to_bytes())
    }

    /// Normalizes back to affine coordinates by dividing out `z`.
    pub fn to_affine(&self) -> AffinePoint {
        // z is nonzero for every representative the group law produces
        // from a valid starting point.
        let zinv = self.z.invert().unwrap_or(Fq::zero());

        AffinePoint {
            u: self.u * zinv,
            v: self.v * zinv,
        }
    }

    /// Precomputes the Niels form `(v+u, v-u, z, 2d·t1·t2)` of this point
    /// for use as the right-hand side of additions.
    pub fn to_niels(&self) -> ExtendedNielsPoint {
        ExtendedNielsPoint {
            v_plus_u: self.v + self.u,
            v_minus_u: self.v - self.u,
            z: self.z,
            t2d: self.t1 * self.t2 * EDWARDS_D2,
        }
    }

    /// Adds this point to itself.
    pub fn double(&self) -> ExtendedPoint {
        let uu = self.u.square();
        let vv = self.v.square();
        let zz2 = self.z.square().double();
        let uv2 = (self.u + self.v).square();
        let vv_plus_uu = vv + uu;
        let vv_minus_uu = vv - uu;

        CompletedPoint {
            u: uv2 - vv_plus_uu,
            v: vv_plus_uu,
            z: vv_minus_uu,
            t: zz2 - vv_minus_uu,
        }
        .into_extended()
    }

    /// Unified addition of a Niels-form right-hand side.
    pub fn add_extended_niels(&self, other: &ExtendedNielsPoint) -> ExtendedPoint {
        let a = (self.v - self.u) * other.v_minus_u;
        let b = (self.v + self.u) * other.v_plus_u;
        let c = self.t1 * self.t2 * other.t2d;
        let d = (self.z * other.z).double();

        CompletedPoint {
            u: b - a,
            v: b + a,
            z: d + c,
            t: d - c,
        }
        .into_extended()
    }

    /// Multiplies by the cofactor 8 via three doublings, projecting into
    /// the prime-order subgroup.
    pub fn mul_by_cofactor(&self) -> ExtendedPoint {
        self.double().double().double()
    }
}

impl Default for ExtendedPoint {
    fn default() -> ExtendedPoint {
        ExtendedPoint::identity()
    }
}

impl ConstantTimeEq for ExtendedPoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        // (u/z, v/z) = (u'/z', v'/z') exactly when u·z' = u'·z and
        // v·z' = v'·z, which avoids the two inversions an affine
        // comparison would need.
        (self.u * other.z).ct_eq(&(other.u * self.z))
            & (self.v * other.z).ct_eq(&(other.v * self.z))
    }
}

impl PartialEq for ExtendedPoint {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}

impl Eq for ExtendedPoint {}

impl ConditionallySelectable for ExtendedPoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        ExtendedPoint {
            u: Fq::conditional_select(&a.u, &b.u, choice),
            v: Fq::conditional_select(&a.v, &b.v, choice),
            z: Fq::conditional_select(&a.z, &b.z, choice),
            t1: Fq::conditional_select(&a.t1, &b.t1, choice),
            t2: Fq::conditional_select(&a.t2, &b.t2, choice),
        }
    }
}

impl<'a> Neg for &'a ExtendedPoint {
    type Output = ExtendedPoint;

    fn neg(self) -> ExtendedPoint {
        ExtendedPoint {
            u: -self.u,
            v: self.v,
            z: self.z,
            t1: -self.t1,
            t2: self.t2,
        }
    }
}

impl Neg for ExtendedPoint {
    type Output = ExtendedPoint;

    fn neg(self) -> ExtendedPoint {
        -&self
    }
}

impl<'a, 'b> Add<&'b ExtendedPoint> for &'a ExtendedPoint {
    type Output = ExtendedPoint;

    fn add(self, other: &'b ExtendedPoint) -> ExtendedPoint {
        self.add_extended_niels(&other.to_niels())
    }
}

impl<'a, 'b> Sub<&'b ExtendedPoint> for &'a ExtendedPoint {
    type Output = ExtendedPoint;

    fn sub(self, other: &'b ExtendedPoint) -> ExtendedPoint {
        self.add_extended_niels(&(-other).to_niels())
    }
}

define_add_variants!(LHS = ExtendedPoint, RHS = ExtendedPoint, Output = ExtendedPoint);
define_sub_variants!(LHS = ExtendedPoint, RHS = ExtendedPoint, Output = ExtendedPoint);

impl<'b> AddAssign<&'b ExtendedPoint> for ExtendedPoint {
    fn add_assign(&mut self, rhs: &'b ExtendedPoint) {
        *self = &*self + rhs;
    }
}

impl<'b> SubAssign<&'b ExtendedPoint> for ExtendedPoint {
    fn sub_assign(&mut self, rhs: &'b ExtendedPoint) {
        *self = &*self - rhs;
    }
}

define_add_assign_variants!(LHS = ExtendedPoint, RHS = ExtendedPoint);
define_sub_assign_variants!(LHS = ExtendedPoint, RHS = ExtendedPoint);

impl<'a, 'b> Add<&'b ExtendedNielsPoint> for &'a ExtendedPoint {
    type Output = ExtendedPoint;

    fn add(self, other: &'b ExtendedNielsPoint) -> ExtendedPoint {
        self.add_extended_niels(other)
    }
}

impl<'a, 'b> Sub<&'b ExtendedNielsPoint> for &'a ExtendedPoint {
    type Output = ExtendedPoint;

    fn sub(self, other: &'b ExtendedNielsPoint) -> ExtendedPoint {
        // Negating a Niels point swaps the v±u sums and negates t2d.
        self.add_extended_niels(&ExtendedNielsPoint {
            v_plus_u: other.v_minus_u,
            v_minus_u: other.v_plus_u,
            z: other.z,
            t2d: -other.t2d,
        })
    }
}

define_add_variants!(LHS = ExtendedPoint, RHS = ExtendedNielsPoint, Output = ExtendedPoint);
define_sub_variants!(LHS = ExtendedPoint, RHS = ExtendedNielsPoint, Output = ExtendedPoint);

impl<'a, 'b> Mul<&'b Fr> for &'a ExtendedPoint {
    type Output = ExtendedPoint;

    fn mul(self, other: &'b Fr) -> ExtendedPoint {
        self.to_niels().multiply(&other.to_bytes())
    }
}

impl<'a, 'b> Mul<&'b ExtendedPoint> for &'a Fr {
    type Output = ExtendedPoint;

    fn mul(self, other: &'b ExtendedPoint) -> ExtendedPoint {
        other * self
    }
}

define_mul_variants!(LHS = ExtendedPoint, RHS = Fr, Output = ExtendedPoint);
define_mul_variants!(LHS = Fr, RHS = ExtendedPoint, Output = ExtendedPoint);

impl<'b> MulAssign<&'b Fr> for ExtendedPoint {
    fn mul_assign(&mut self, rhs: &'b Fr) {
        *self = &*self * rhs;
    }
}

define_mul_assign_variants!(LHS = ExtendedPoint, RHS = Fr);

impl<T> Sum<T> for ExtendedPoint
where
    T: core::borrow::Borrow<ExtendedPoint>,
{
    fn sum<I>(iter: I) -> Self
    where
        I: Iterator<Item = T>,
    {
        iter.fold(ExtendedPoint::identity(), |acc, item| acc + item.borrow())
    }
}

// ------------------------------------------------------------------------
// Niels points
// ------------------------------------------------------------------------

/// The Niels form `(v+u, v-u, z, 2d·t1·t2)` of an extended point:
/// a precomputed addend for [`ExtendedPoint::add_extended_niels`].
#[derive(Clone, Copy, Debug)]
pub struct ExtendedNielsPoint {
    v_plus_u: Fq,
    v_minus_u: Fq,
    z: Fq,
    t2d: Fq,
}

impl ExtendedNielsPoint {
    /// The additive zero, the Niels form of the identity.
    ///
    /// `t2d` must be zero here — `2d·t1·t2 = 0` for the identity — so that
    /// adding this point is a no-op under the addition law.
    pub const fn identity() -> ExtendedNielsPoint {
        ExtendedNielsPoint {
            v_plus_u: Fq::one(),
            v_minus_u: Fq::one(),
            z: Fq::one(),
            t2d: Fq::zero(),
        }
    }

    /// Constant-time double-and-add evaluation of `[scalar]·P`, where `P`
    /// is the point this Niels form was derived from and the scalar is the
    /// little-endian integer in `by`.
    ///
    /// Every one of the 256 iterations performs the same doubling and the
    /// same unified addition, selecting between `P` and the additive zero
    /// with a bitmask, so the instruction sequence and memory accesses do
    /// not depend on the scalar. Scalars at or above ℓ are reduced
    /// implicitly by the group order.
    pub fn multiply(&self, by: &[u8; 32]) -> ExtendedPoint {
        let zero = ExtendedNielsPoint::identity();
        let mut acc = ExtendedPoint::identity();

        // Scan from the most significant bit down. For Fr-sized scalars
        // the top four bits are always clear; those iterations double the
        // identity and add the zero, which changes nothing.
        for bit in by
            .iter()
            .rev()
            .flat_map(|byte| (0..8).rev().map(move |i| Choice::from((byte >> i) & 1u8)))
        {
            acc = acc.double();
            acc = acc.add_extended_niels(&ExtendedNielsPoint::conditional_select(
                &zero, self, bit,
            ));
        }

        acc
    }
}

impl ConditionallySelectable for ExtendedNielsPoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        ExtendedNielsPoint {
            v_plus_u: Fq::conditional_select(&a.v_plus_u, &b.v_plus_u, choice),
            v_minus_u: Fq::conditional_select(&a.v_minus_u, &b.v_minus_u, choice),
            z: Fq::conditional_select(&a.z, &b.z, choice),
            t2d: Fq::conditional_select(&a.t2d, &b.t2d, choice),
        }
    }
}

// ------------------------------------------------------------------------
// Completed points
// ------------------------------------------------------------------------

/// The intermediate `(u, v, z, t)` a doubling or addition produces before
/// normalization, representing the pair `(u/z, v/t)`.
#[derive(Clone, Copy)]
struct CompletedPoint {
    u: Fq,
    v: Fq,
    z: Fq,
    t: Fq,
}

impl CompletedPoint {
    /// Collapses back to extended coordinates via
    /// `(u·t, v·z, z·t, u, v)`.
    fn into_extended(self) -> ExtendedPoint {
        ExtendedPoint {
            u: self.u * self.t,
            v: self.v * self.z,
            z: self.z * self.t,
            t1: self.u,
            t2: self.v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    /// A compressed point of the full group; it happens to already lie in
    /// the prime-order subgroup.
    const TEST_POINT: &str = "7d09bb9aa97704719c33d1f6e7ed7e8d6c0edad0a02f7af82ab77ebc104f5f1e";

    fn decode(hex_str: &str) -> ExtendedPoint {
        let bytes: [u8; 32] = hex::decode(hex_str).unwrap().try_into().unwrap();
        ExtendedPoint::from_bytes(&bytes).unwrap()
    }

    fn scalar_bytes(k: u64) -> [u8; 32] {
        let mut b = [0u8; 32];
        b[..8].copy_from_slice(&k.to_le_bytes());
        b
    }

    fn random_point(rng: &mut impl RngCore) -> ExtendedPoint {
        loop {
            let mut b = [0u8; 32];
            rng.fill_bytes(&mut b);
            let p = ExtendedPoint::from_bytes(&b);
            if bool::from(p.is_some()) {
                return p.unwrap();
            }
        }
    }

    #[test]
    fn curve_constants() {
        // d = -(10240/10241)
        let d = -(Fq::from(10240u64) * Fq::from(10241u64).invert().unwrap());
        assert_eq!(EDWARDS_D, d);
        assert_eq!(EDWARDS_D2, d.double());
    }

    #[test]
    fn identity_decoding() {
        let encoding = CompressedPoint::identity();
        let p = encoding.decompress().unwrap();
        assert!(bool::from(p.is_identity()));
        assert_eq!(p.to_bytes(), encoding.to_bytes());

        assert!(bool::from(AffinePoint::identity().is_identity()));
        assert!(bool::from(AffinePoint::identity().is_on_curve()));
        assert!(bool::from(ExtendedPoint::identity().is_identity()));
        assert_eq!(
            AffinePoint::identity().to_extended(),
            ExtendedPoint::identity()
        );
    }

    #[test]
    fn decoded_coordinates_known_answer() {
        let p = decode(TEST_POINT).to_affine();
        assert_eq!(
            p.u(),
            Fq::from_raw([
                0xac93_8633_c255_2228,
                0xb57b_d96b_6cf0_3c58,
                0xae43_902e_8080_ec9a,
                0x11fe_f74d_d050_3256,
            ])
        );
        assert_eq!(
            p.v(),
            Fq::from_raw([
                0x7104_77a9_9abb_097d,
                0x8d7e_ede7_f6d1_339c,
                0xf87a_2fa0_d0da_0e6c,
                0x1e5f_4f10_bc7e_b72a,
            ])
        );
        assert!(bool::from(p.is_on_curve()));
    }

    #[test]
    fn raw_coordinates_compress_to_wire_encoding() {
        // Rebuild the known point from its bare coordinates and compress.
        let u = Fq::from_raw([
            0xac93_8633_c255_2228,
            0xb57b_d96b_6cf0_3c58,
            0xae43_902e_8080_ec9a,
            0x11fe_f74d_d050_3256,
        ]);
        let v = Fq::from_raw([
            0x7104_77a9_9abb_097d,
            0x8d7e_ede7_f6d1_339c,
            0xf87a_2fa0_d0da_0e6c,
            0x1e5f_4f10_bc7e_b72a,
        ]);
        let p = AffinePoint::from_raw_unchecked(u, v);
        assert!(bool::from(p.is_on_curve()));

        let expected: [u8; 32] = hex::decode(TEST_POINT).unwrap().try_into().unwrap();
        assert_eq!(p.compress(), CompressedPoint(expected));
        assert_eq!(p.to_extended().compress().to_bytes(), expected);
    }

    #[test]
    fn point_round_trip() {
        let bytes: [u8; 32] = hex::decode(TEST_POINT).unwrap().try_into().unwrap();
        let p = ExtendedPoint::from_bytes(&bytes).unwrap();
        assert_eq!(p.to_bytes(), bytes);

        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let p = random_point(&mut rng);
            let q = ExtendedPoint::from_bytes(&p.to_bytes()).unwrap();
            assert_eq!(p, q);
            assert!(bool::from(q.to_affine().is_on_curve()));
        }
    }

    #[test]
    fn invalid_encodings_are_rejected() {
        // v = 2 reconstructs a u² with no square root.
        let mut non_residue = [0u8; 32];
        non_residue[0] = 2;
        assert!(bool::from(AffinePoint::from_bytes(&non_residue).is_none()));

        // The modulus itself is a non-canonical v.
        let q_bytes: [u8; 32] =
            hex::decode("01000000fffffffffe5bfeff02a4bd5305d8a10908d83933487d9d2953a7ed73")
                .unwrap()
                .try_into()
                .unwrap();
        assert!(bool::from(AffinePoint::from_bytes(&q_bytes).is_none()));

        // Wrong lengths never reach the arithmetic.
        assert_eq!(
            CompressedPoint::from_slice(&[0u8; 31]),
            Err(DecodeError::InvalidLength(31))
        );
        assert_eq!(
            CompressedPoint::from_slice(&[0u8; 33]),
            Err(DecodeError::InvalidLength(33))
        );
        assert!(CompressedPoint::try_from(&[0u8; 32][..]).is_ok());
    }

    #[test]
    fn cofactor_clearing_and_subgroup_order() {
        let p = decode(TEST_POINT);
        let q = p.mul_by_cofactor();

        let expected: [u8; 32] =
            hex::decode("c86b073ef3b907f124ed60654b07cab2bbf3267d96a8c1dbb7872766baee03bf")
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!(q.to_bytes(), expected);

        // After cofactor clearing the point has order dividing ℓ.
        let r = q.to_niels().multiply(&Fr::MODULUS_BYTES);
        assert!(bool::from(r.is_identity()));

        // This particular point already generates the prime-order
        // subgroup, so [ℓ]·P is the identity even without clearing.
        let r = p.to_niels().multiply(&Fr::MODULUS_BYTES);
        assert!(bool::from(r.is_identity()));

        // The same holds for every decoded point once the cofactor is
        // cleared.
        let mut rng = rand::thread_rng();
        for _ in 0..3 {
            let q = random_point(&mut rng).mul_by_cofactor();
            let r = q.to_niels().multiply(&Fr::MODULUS_BYTES);
            assert!(bool::from(r.is_identity()));
        }
    }

    #[test]
    fn torsion_point_is_not_in_subgroup() {
        // (0, -1) has order two: [ℓ] fixes it (ℓ is odd), and cofactor
        // clearing kills it.
        let two_torsion: [u8; 32] =
            hex::decode("00000000fffffffffe5bfeff02a4bd5305d8a10908d83933487d9d2953a7ed73")
                .unwrap()
                .try_into()
                .unwrap();
        let p = ExtendedPoint::from_bytes(&two_torsion).unwrap();
        assert!(bool::from(p.to_affine().is_on_curve()));

        let r = p.to_niels().multiply(&Fr::MODULUS_BYTES);
        assert!(!bool::from(r.is_identity()));
        assert_eq!(r, p);

        assert!(bool::from(p.mul_by_cofactor().is_identity()));
    }

    #[test]
    fn doubling_matches_addition() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let p = random_point(&mut rng);
            let doubled = p.double();
            let added = p + p;
            assert_eq!(doubled, added);
            assert_eq!(doubled.to_bytes(), added.to_bytes());
        }
    }

    #[test]
    fn ladder_known_answers() {
        let g = decode(TEST_POINT).mul_by_cofactor();

        // [2]G from the ladder, from doubling, and from addition agree.
        let two_g = g.to_niels().multiply(&scalar_bytes(2));
        assert_eq!(two_g, g.double());
        let expected: [u8; 32] =
            hex::decode("61e77a10a2828fdcf1f47fb661fc925c553a5aaa7f81cd55fe6366a6f2021ad2")
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!(two_g.to_bytes(), expected);

        let seven_g = g.to_niels().multiply(&scalar_bytes(7));
        let expected: [u8; 32] =
            hex::decode("f505b88bcb2d731e88d1512aaaa9b65c27a53d0c891386e959739340e018fcf1")
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!(seven_g.to_bytes(), expected);

        // [0]P and [1]P degenerate correctly.
        assert!(bool::from(
            g.to_niels().multiply(&scalar_bytes(0)).is_identity()
        ));
        assert_eq!(g.to_niels().multiply(&scalar_bytes(1)), g);
    }

    #[test]
    fn scalar_mul_linearity() {
        let g = decode(TEST_POINT).mul_by_cofactor();

        let a_bytes: [u8; 32] =
            hex::decode("38a1b4b208378c303baa36fe5b9e453810f71f75977f75f8472f89358ea1b603")
                .unwrap()
                .try_into()
                .unwrap();
        let b_bytes: [u8; 32] =
            hex::decode("49e42a5ce546cfa60589e2ee38bd865900c6cd0103ca9e005f59d6a521589000")
                .unwrap()
                .try_into()
                .unwrap();
        let a = Fr::from_bytes(&a_bytes).unwrap();
        let b = Fr::from_bytes(&b_bytes).unwrap();

        let a_g = &g * &a;
        let b_g = &g * &b;
        let expected_a_g: [u8; 32] =
            hex::decode("b50fd999462bacd190daabdd8f76ed3af0912faf31b50abd3e642984b495e91d")
                .unwrap()
                .try_into()
                .unwrap();
        let expected_b_g: [u8; 32] =
            hex::decode("c0aa8e8650b69caacfe3b5ecb5d9ee97739f46c09a58e4486b031ad203089d32")
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!(a_g.to_bytes(), expected_a_g);
        assert_eq!(b_g.to_bytes(), expected_b_g);

        // (a + b)·G = a·G + b·G
        let sum_g = &g * &(a + b);
        let expected_sum: [u8; 32] =
            hex::decode("9735851fc7aa787d075ca4ac31bbfe780712adf34f36862549fc4cdf5236ff49")
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!(sum_g.to_bytes(), expected_sum);
        assert_eq!(sum_g, a_g + b_g);

        // a·(b·G) = (a·b)·G
        let ab_g = &b_g * &a;
        let expected_ab: [u8; 32] =
            hex::decode("922b9133e035c0d21f4ab19df77df6b382e09457d789ea28cf65321f29837a23")
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!(ab_g.to_bytes(), expected_ab);
        assert_eq!(ab_g, &g * &(a * b));
    }

    #[test]
    fn group_axioms() {
        let mut rng = rand::thread_rng();
        for _ in 0..10 {
            let p = random_point(&mut rng);
            let q = random_point(&mut rng);
            let r = random_point(&mut rng);

            assert_eq!(p + ExtendedPoint::identity(), p);
            assert!(bool::from((p - p).is_identity()));
            assert!(bool::from((p + (-p)).is_identity()));
            assert_eq!((p + q) + r, p + (q + r));
            assert_eq!(p + q, q + p);
            assert_eq!(p - q, p + (-q));
        }
    }

    #[test]
    fn niels_identity_is_additive_zero() {
        let mut rng = rand::thread_rng();
        let p = random_point(&mut rng);
        let q = p + ExtendedNielsPoint::identity();
        assert_eq!(p, q);

        // Which is what makes adding it inside the ladder a no-op.
        assert!(bool::from(
            ExtendedPoint::identity()
                .add_extended_niels(&ExtendedNielsPoint::identity())
                .is_identity()
        ));
    }

    #[test]
    fn negation_flips_only_the_sign_bit() {
        let p = decode(TEST_POINT);
        let expected: [u8; 32] =
            hex::decode("7d09bb9aa97704719c33d1f6e7ed7e8d6c0edad0a02f7af82ab77ebc104f5f9e")
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!((-p).to_bytes(), expected);

        let mut rng = rand::thread_rng();
        for _ in 0..10 {
            let p = random_point(&mut rng);
            let mut enc = p.to_bytes();
            let neg_enc = (-p).to_bytes();
            if bool::from(p.to_affine().u().is_zero()) {
                continue;
            }
            enc[31] ^= 0x80;
            assert_eq!(enc, neg_enc);
        }
    }

    #[test]
    fn sum_of_points() {
        let mut rng = rand::thread_rng();
        let p = random_point(&mut rng);
        let q = random_point(&mut rng);

        let total: ExtendedPoint = [p, q].iter().sum();
        assert_eq!(total, p + q);

        let empty: ExtendedPoint = core::iter::empty::<ExtendedPoint>().sum();
        assert!(bool::from(empty.is_identity()));
    }

    #[test]
    fn assign_operators() {
        let mut rng = rand::thread_rng();
        let p = random_point(&mut rng);
        let q = random_point(&mut rng);

        let mut acc = p;
        acc += q;
        assert_eq!(acc, p + q);
        acc -= q;
        assert_eq!(acc, p);
        acc *= Fr::from(3u64);
        assert_eq!(acc, p + p + p);
    }

    #[test]
    fn small_v_point() {
        // v = 3 names a curve point; check the reconstructed u coordinate.
        let mut bytes = [0u8; 32];
        bytes[0] = 3;
        let p = AffinePoint::from_bytes(&bytes).unwrap();
        assert_eq!(
            p.u(),
            Fq::from_raw([
                0x2a35_685f_117f_e76a,
                0x471c_9a2c_9cff_3805,
                0x1c28_29c2_3636_614a,
                0x0218_414f_da05_e517,
            ])
        );
        assert!(bool::from(p.is_on_curve()));
    }
}
