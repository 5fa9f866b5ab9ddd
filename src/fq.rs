//! The base field of the Jubjub curve.
//!
//! `Fq` is the prime field of order
//! `q = 0x73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001`,
//! which is also the scalar field of BLS12-381. Elements are held in
//! Montgomery form and every routine that can see secret data is
//! branchless; the `_vartime` routines must only ever be given public
//! inputs.

use core::fmt;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroize;

use crate::arithmetic::{adc, mac, sbb};

/// An element of the base field, stored as `a · R mod q` with `R = 2^256`
/// over four little-endian 64-bit limbs. Representatives are always fully
/// reduced.
#[derive(Clone, Copy)]
pub struct Fq(pub(crate) [u64; 4]);

/// q, the modulus of the field.
const MODULUS: Fq = Fq([
    0xffff_ffff_0000_0001,
    0x53bd_a402_fffe_5bfe,
    0x3339_d808_09a1_d805,
    0x73ed_a753_299d_7d48,
]);

/// INV = -q^{-1} mod 2^64
const INV: u64 = 0xffff_fffe_ffff_ffff;

/// R = 2^256 mod q
const R: Fq = Fq([
    0x0000_0001_ffff_fffe,
    0x5884_b7fa_0003_4802,
    0x998c_4fef_ecbc_4ff5,
    0x1824_b159_acc5_056f,
]);

/// R^2 = 2^512 mod q
const R2: Fq = Fq([
    0xc999_e990_f3f2_9c6d,
    0x2b6c_edcb_8792_5c23,
    0x05d3_1496_7254_398f,
    0x0748_d9d9_9f59_ff11,
]);

/// R^3 = 2^768 mod q
const R3: Fq = Fq([
    0xc62c_1807_439b_73af,
    0x1b3e_0d18_8cf0_6990,
    0x73d1_3c71_c7b5_f418,
    0x6e2a_5bb9_c8db_33e9,
]);

/// q - 1 = 2^S · t with t odd.
pub const S: u32 = 32;

/// A multiplicative generator of the field, 7. Every generator is a
/// quadratic non-residue.
pub const GENERATOR: Fq = Fq::from_raw([7, 0, 0, 0]);

/// GENERATOR^t, a fixed generator of the 2^S-torsion subgroup used by the
/// Tonelli-Shanks square root.
pub const ROOT_OF_UNITY: Fq = Fq::from_raw([
    0x3829_971f_439f_0d2b,
    0xb636_8350_8c22_80b9,
    0xd09b_6819_22c8_13b4,
    0x16a2_a19e_dfe8_1f20,
]);

/// (t - 1) / 2, where t is the odd part of q - 1.
const T_MINUS_1_OVER_2: [u64; 4] = [
    0x7fff_2dff_7fff_ffff,
    0x04d0_ec02_a9de_d201,
    0x94ce_bea4_199c_ec04,
    0x0000_0000_39f6_d3a9,
];

/// t, the odd part of q - 1.
const T: [u64; 4] = [
    0xfffe_5bfe_ffff_ffff,
    0x09a1_d805_53bd_a402,
    0x299d_7d48_3339_d808,
    0x0000_0000_73ed_a753,
];

/// (t + 1) / 2.
const T_PLUS_1_OVER_2: [u64; 4] = [
    0x7fff_2dff_8000_0000,
    0x04d0_ec02_a9de_d201,
    0x94ce_bea4_199c_ec04,
    0x0000_0000_39f6_d3a9,
];

/// (q - 1) / 2, the Euler criterion exponent.
const MODULUS_MINUS_1_OVER_2: [u64; 4] = [
    0x7fff_ffff_8000_0000,
    0xa9de_d201_7fff_2dff,
    0x199c_ec04_04d0_ec02,
    0x39f6_d3a9_94ce_bea4,
];

/// The Legendre symbol of a field element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegendreSymbol {
    /// The element is zero.
    Zero,
    /// The element is a nonzero square.
    QuadraticResidue,
    /// The element is not a square.
    QuadraticNonResidue,
}

impl fmt::Debug for Fq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tmp = self.to_bytes();
        write!(f, "0x")?;
        for &b in tmp.iter().rev() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Display for Fq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Default for Fq {
    #[inline]
    fn default() -> Self {
        Fq::zero()
    }
}

impl From<u64> for Fq {
    fn from(val: u64) -> Fq {
        Fq([val, 0, 0, 0]) * R2
    }
}

impl Zeroize for Fq {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl ConstantTimeEq for Fq {
    fn ct_eq(&self, other: &Self) -> Choice {
        // Representatives are canonical, so limb equality is value equality.
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
    }
}

impl PartialEq for Fq {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}

impl Eq for Fq {}

impl ConditionallySelectable for Fq {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Fq([
            u64::conditional_select(&a.0[0], &b.0[0], choice),
            u64::conditional_select(&a.0[1], &b.0[1], choice),
            u64::conditional_select(&a.0[2], &b.0[2], choice),
            u64::conditional_select(&a.0[3], &b.0[3], choice),
        ])
    }
}

impl<'a> Neg for &'a Fq {
    type Output = Fq;

    #[inline]
    fn neg(self) -> Fq {
        self.neg()
    }
}

impl Neg for Fq {
    type Output = Fq;

    #[inline]
    fn neg(self) -> Fq {
        -&self
    }
}

impl<'a, 'b> Add<&'b Fq> for &'a Fq {
    type Output = Fq;

    #[inline]
    fn add(self, rhs: &'b Fq) -> Fq {
        self.add(rhs)
    }
}

impl<'a, 'b> Sub<&'b Fq> for &'a Fq {
    type Output = Fq;

    #[inline]
    fn sub(self, rhs: &'b Fq) -> Fq {
        self.sub(rhs)
    }
}

impl<'a, 'b> Mul<&'b Fq> for &'a Fq {
    type Output = Fq;

    #[inline]
    fn mul(self, rhs: &'b Fq) -> Fq {
        self.mul(rhs)
    }
}

impl<'b> AddAssign<&'b Fq> for Fq {
    #[inline]
    fn add_assign(&mut self, rhs: &'b Fq) {
        *self = &*self + rhs;
    }
}

impl<'b> SubAssign<&'b Fq> for Fq {
    #[inline]
    fn sub_assign(&mut self, rhs: &'b Fq) {
        *self = &*self - rhs;
    }
}

impl<'b> MulAssign<&'b Fq> for Fq {
    #[inline]
    fn mul_assign(&mut self, rhs: &'b Fq) {
        *self = &*self * rhs;
    }
}

define_add_variants!(LHS = Fq, RHS = Fq, Output = Fq);
define_sub_variants!(LHS = Fq, RHS = Fq, Output = Fq);
define_mul_variants!(LHS = Fq, RHS = Fq, Output = Fq);
define_add_assign_variants!(LHS = Fq, RHS = Fq);
define_sub_assign_variants!(LHS = Fq, RHS = Fq);
define_mul_assign_variants!(LHS = Fq, RHS = Fq);

impl Fq {
    /// The additive identity.
    #[inline]
    pub const fn zero() -> Fq {
        Fq([0, 0, 0, 0])
    }

    /// The multiplicative identity.
    #[inline]
    pub const fn one() -> Fq {
        R
    }

    /// Whether this element is zero.
    #[inline]
    pub fn is_zero(&self) -> Choice {
        self.ct_eq(&Fq::zero())
    }

    /// Converts an integer given as four little-endian limbs into its
    /// congruent field element, reducing modulo q.
    pub const fn from_raw(val: [u64; 4]) -> Self {
        (&Fq(val)).mul(&R2)
    }

    /// Interprets 32 little-endian bytes as a canonical field element.
    ///
    /// The result is `None` when the value is not fully reduced, which is
    /// the encoding convention every caller of this crate's point decoder
    /// relies on.
    pub fn from_bytes(bytes: &[u8; 32]) -> CtOption<Fq> {
        let mut tmp = Fq([0, 0, 0, 0]);

        tmp.0[0] = u64::from_le_bytes(bytes[0..8].try_into().unwrap());
        tmp.0[1] = u64::from_le_bytes(bytes[8..16].try_into().unwrap());
        tmp.0[2] = u64::from_le_bytes(bytes[16..24].try_into().unwrap());
        tmp.0[3] = u64::from_le_bytes(bytes[24..32].try_into().unwrap());

        // Subtracting the modulus underflows exactly when the value is
        // already reduced, leaving an all-ones borrow.
        let (_, borrow) = sbb(tmp.0[0], MODULUS.0[0], 0);
        let (_, borrow) = sbb(tmp.0[1], MODULUS.0[1], borrow);
        let (_, borrow) = sbb(tmp.0[2], MODULUS.0[2], borrow);
        let (_, borrow) = sbb(tmp.0[3], MODULUS.0[3], borrow);
        let is_some = (borrow as u8) & 1;

        // Convert to Montgomery form by multiplying with R^2.
        tmp *= &R2;

        CtOption::new(tmp, Choice::from(is_some))
    }

    /// Converts this element into its canonical 32-byte little-endian
    /// encoding.
    pub fn to_bytes(&self) -> [u8; 32] {
        // Montgomery-reduce with zero high limbs to divide out R.
        let tmp =
            Fq::montgomery_reduce(self.0[0], self.0[1], self.0[2], self.0[3], 0, 0, 0, 0);

        let mut res = [0u8; 32];
        res[0..8].copy_from_slice(&tmp.0[0].to_le_bytes());
        res[8..16].copy_from_slice(&tmp.0[1].to_le_bytes());
        res[16..24].copy_from_slice(&tmp.0[2].to_le_bytes());
        res[24..32].copy_from_slice(&tmp.0[3].to_le_bytes());

        res
    }

    /// Reduces a 512-bit little-endian integer modulo q.
    ///
    /// Useful for turning uniform 64-byte strings into (close to uniform)
    /// field elements.
    pub fn from_bytes_wide(bytes: &[u8; 64]) -> Fq {
        Fq::from_u512([
            u64::from_le_bytes(bytes[0..8].try_into().unwrap()),
            u64::from_le_bytes(bytes[8..16].try_into().unwrap()),
            u64::from_le_bytes(bytes[16..24].try_into().unwrap()),
            u64::from_le_bytes(bytes[24..32].try_into().unwrap()),
            u64::from_le_bytes(bytes[32..40].try_into().unwrap()),
            u64::from_le_bytes(bytes[40..48].try_into().unwrap()),
            u64::from_le_bytes(bytes[48..56].try_into().unwrap()),
            u64::from_le_bytes(bytes[56..64].try_into().unwrap()),
        ])
    }

    fn from_u512(limbs: [u64; 8]) -> Fq {
        // Split into two 256-bit halves a0 + a1·2^256 and map each half into
        // Montgomery form with the matching power of R: a0·R^2 + a1·R^3
        // reduces to (a0 + a1·2^256)·R.
        let d0 = Fq([limbs[0], limbs[1], limbs[2], limbs[3]]);
        let d1 = Fq([limbs[4], limbs[5], limbs[6], limbs[7]]);
        d0 * R2 + d1 * R3
    }

    /// Adds `rhs` to `self`.
    #[inline]
    pub const fn add(&self, rhs: &Self) -> Self {
        let (d0, carry) = adc(self.0[0], rhs.0[0], 0);
        let (d1, carry) = adc(self.0[1], rhs.0[1], carry);
        let (d2, carry) = adc(self.0[2], rhs.0[2], carry);
        let (d3, _) = adc(self.0[3], rhs.0[3], carry);

        // Both inputs are below q, so one conditional subtraction of the
        // modulus renormalizes the sum.
        (&Fq([d0, d1, d2, d3])).sub(&MODULUS)
    }

    /// Subtracts `rhs` from `self`.
    #[inline]
    pub const fn sub(&self, rhs: &Self) -> Self {
        let (d0, borrow) = sbb(self.0[0], rhs.0[0], 0);
        let (d1, borrow) = sbb(self.0[1], rhs.0[1], borrow);
        let (d2, borrow) = sbb(self.0[2], rhs.0[2], borrow);
        let (d3, borrow) = sbb(self.0[3], rhs.0[3], borrow);

        // The final borrow is an all-ones mask on underflow; use it to
        // conditionally add the modulus back.
        let (d0, carry) = adc(d0, MODULUS.0[0] & borrow, 0);
        let (d1, carry) = adc(d1, MODULUS.0[1] & borrow, carry);
        let (d2, carry) = adc(d2, MODULUS.0[2] & borrow, carry);
        let (d3, _) = adc(d3, MODULUS.0[3] & borrow, carry);

        Fq([d0, d1, d2, d3])
    }

    /// Negates this element.
    #[inline]
    pub const fn neg(&self) -> Self {
        let (d0, borrow) = sbb(MODULUS.0[0], self.0[0], 0);
        let (d1, borrow) = sbb(MODULUS.0[1], self.0[1], borrow);
        let (d2, borrow) = sbb(MODULUS.0[2], self.0[2], borrow);
        let (d3, _) = sbb(MODULUS.0[3], self.0[3], borrow);

        // q - 0 would be q itself; mask the result to zero when the input
        // was zero.
        let mask = (((self.0[0] | self.0[1] | self.0[2] | self.0[3]) == 0) as u64)
            .wrapping_sub(1);

        Fq([d0 & mask, d1 & mask, d2 & mask, d3 & mask])
    }

    /// Doubles this element.
    #[inline]
    pub const fn double(&self) -> Self {
        self.add(self)
    }

    /// Multiplies `rhs` by `self`.
    #[inline]
    pub const fn mul(&self, rhs: &Self) -> Self {
        // Schoolbook 4x4 multiplication into eight limbs.
        let (r0, carry) = mac(0, self.0[0], rhs.0[0], 0);
        let (r1, carry) = mac(0, self.0[0], rhs.0[1], carry);
        let (r2, carry) = mac(0, self.0[0], rhs.0[2], carry);
        let (r3, r4) = mac(0, self.0[0], rhs.0[3], carry);

        let (r1, carry) = mac(r1, self.0[1], rhs.0[0], 0);
        let (r2, carry) = mac(r2, self.0[1], rhs.0[1], carry);
        let (r3, carry) = mac(r3, self.0[1], rhs.0[2], carry);
        let (r4, r5) = mac(r4, self.0[1], rhs.0[3], carry);

        let (r2, carry) = mac(r2, self.0[2], rhs.0[0], 0);
        let (r3, carry) = mac(r3, self.0[2], rhs.0[1], carry);
        let (r4, carry) = mac(r4, self.0[2], rhs.0[2], carry);
        let (r5, r6) = mac(r5, self.0[2], rhs.0[3], carry);

        let (r3, carry) = mac(r3, self.0[3], rhs.0[0], 0);
        let (r4, carry) = mac(r4, self.0[3], rhs.0[1], carry);
        let (r5, carry) = mac(r5, self.0[3], rhs.0[2], carry);
        let (r6, r7) = mac(r6, self.0[3], rhs.0[3], carry);

        Fq::montgomery_reduce(r0, r1, r2, r3, r4, r5, r6, r7)
    }

    /// Squares this element.
    ///
    /// Exploits a_i·a_j = a_j·a_i: the strictly upper triangle is computed
    /// once, shifted left by one bit, and the diagonal added on top. Always
    /// equal to `self.mul(self)`.
    #[inline]
    pub const fn square(&self) -> Self {
        let (r1, carry) = mac(0, self.0[0], self.0[1], 0);
        let (r2, carry) = mac(0, self.0[0], self.0[2], carry);
        let (r3, r4) = mac(0, self.0[0], self.0[3], carry);

        let (r3, carry) = mac(r3, self.0[1], self.0[2], 0);
        let (r4, r5) = mac(r4, self.0[1], self.0[3], carry);

        let (r5, r6) = mac(r5, self.0[2], self.0[3], 0);

        let r7 = r6 >> 63;
        let r6 = (r6 << 1) | (r5 >> 63);
        let r5 = (r5 << 1) | (r4 >> 63);
        let r4 = (r4 << 1) | (r3 >> 63);
        let r3 = (r3 << 1) | (r2 >> 63);
        let r2 = (r2 << 1) | (r1 >> 63);
        let r1 = r1 << 1;

        let (r0, carry) = mac(0, self.0[0], self.0[0], 0);
        let (r1, carry) = adc(0, r1, carry);
        let (r2, carry) = mac(r2, self.0[1], self.0[1], carry);
        let (r3, carry) = adc(0, r3, carry);
        let (r4, carry) = mac(r4, self.0[2], self.0[2], carry);
        let (r5, carry) = adc(0, r5, carry);
        let (r6, carry) = mac(r6, self.0[3], self.0[3], carry);
        let (r7, _) = adc(0, r7, carry);

        Fq::montgomery_reduce(r0, r1, r2, r3, r4, r5, r6, r7)
    }

    /// Montgomery reduction of an eight-limb product, one limb at a time.
    #[allow(clippy::too_many_arguments)]
    #[inline(always)]
    const fn montgomery_reduce(
        r0: u64,
        r1: u64,
        r2: u64,
        r3: u64,
        r4: u64,
        r5: u64,
        r6: u64,
        r7: u64,
    ) -> Self {
        let k = r0.wrapping_mul(INV);
        let (_, carry) = mac(r0, k, MODULUS.0[0], 0);
        let (r1, carry) = mac(r1, k, MODULUS.0[1], carry);
        let (r2, carry) = mac(r2, k, MODULUS.0[2], carry);
        let (r3, carry) = mac(r3, k, MODULUS.0[3], carry);
        let (r4, carry2) = adc(r4, 0, carry);

        let k = r1.wrapping_mul(INV);
        let (_, carry) = mac(r1, k, MODULUS.0[0], 0);
        let (r2, carry) = mac(r2, k, MODULUS.0[1], carry);
        let (r3, carry) = mac(r3, k, MODULUS.0[2], carry);
        let (r4, carry) = mac(r4, k, MODULUS.0[3], carry);
        let (r5, carry2) = adc(r5, carry2, carry);

        let k = r2.wrapping_mul(INV);
        let (_, carry) = mac(r2, k, MODULUS.0[0], 0);
        let (r3, carry) = mac(r3, k, MODULUS.0[1], carry);
        let (r4, carry) = mac(r4, k, MODULUS.0[2], carry);
        let (r5, carry) = mac(r5, k, MODULUS.0[3], carry);
        let (r6, carry2) = adc(r6, carry2, carry);

        let k = r3.wrapping_mul(INV);
        let (_, carry) = mac(r3, k, MODULUS.0[0], 0);
        let (r4, carry) = mac(r4, k, MODULUS.0[1], carry);
        let (r5, carry) = mac(r5, k, MODULUS.0[2], carry);
        let (r6, carry) = mac(r6, k, MODULUS.0[3], carry);
        let (r7, _) = adc(r7, carry2, carry);

        // The high half may still be within one modulus of the true value.
        (&Fq([r4, r5, r6, r7])).sub(&MODULUS)
    }

    /// Exponentiates by `by`, interpreted as a little-endian limb order
    /// integer.
    ///
    /// **This operation is variable time with respect to the exponent.** It
    /// must only be used with public exponents.
    pub fn pow_vartime(&self, by: &[u64; 4]) -> Self {
        let mut res = Self::one();
        for e in by.iter().rev() {
            for i in (0..64).rev() {
                res = res.square();

                if ((*e >> i) & 1) == 1 {
                    res *= self;
                }
            }
        }
        res
    }

    /// Computes the Legendre symbol via Euler's criterion,
    /// `self^((q - 1) / 2)`.
    ///
    /// **Variable time.** Only call with public inputs.
    pub fn legendre_vartime(&self) -> LegendreSymbol {
        let s = self.pow_vartime(&MODULUS_MINUS_1_OVER_2);
        if s == Fq::zero() {
            LegendreSymbol::Zero
        } else if s == Fq::one() {
            LegendreSymbol::QuadraticResidue
        } else {
            LegendreSymbol::QuadraticNonResidue
        }
    }

    /// Computes the square root of this element in constant time.
    ///
    /// The result is `None` when the element is a quadratic non-residue;
    /// validity of the returned `CtOption` is the only failure signal.
    pub fn sqrt(&self) -> CtOption<Self> {
        // Tonelli-Shanks with all exponents fixed at compile time; the
        // inner search latches its "found" state through conditional
        // selects so the access pattern is independent of the input.
        let w = self.pow_vartime(&T_MINUS_1_OVER_2);

        let mut v = S;
        let mut x = self * w;
        let mut b = x * w;

        // A generator of the 2^S-torsion subgroup.
        let mut z = ROOT_OF_UNITY;

        for max_v in (1..=S).rev() {
            let mut k = 1;
            let mut tmp = b.square();
            let mut j_less_than_v: Choice = 1.into();

            for j in 2..max_v {
                let tmp_is_one = tmp.ct_eq(&Fq::one());
                let squared = Fq::conditional_select(&tmp, &z, tmp_is_one).square();
                tmp = Fq::conditional_select(&squared, &tmp, tmp_is_one);
                let new_z = Fq::conditional_select(&z, &squared, tmp_is_one);
                j_less_than_v &= !j.ct_eq(&v);
                k = u32::conditional_select(&j, &k, tmp_is_one);
                z = Fq::conditional_select(&z, &new_z, j_less_than_v);
            }

            let result = x * z;
            x = Fq::conditional_select(&result, &x, b.ct_eq(&Fq::one()));
            z = z.square();
            b *= z;
            v = k;
        }

        CtOption::new(x, (x * x).ct_eq(self))
    }

    /// Computes the square root of this element with data-dependent
    /// branching.
    ///
    /// **Variable time.** Only call with public inputs.
    pub fn sqrt_vartime(&self) -> Option<Self> {
        match self.legendre_vartime() {
            LegendreSymbol::Zero => Some(*self),
            LegendreSymbol::QuadraticNonResidue => None,
            LegendreSymbol::QuadraticResidue => {
                let mut r = self.pow_vartime(&T_PLUS_1_OVER_2);
                let mut t = self.pow_vartime(&T);
                let mut c = ROOT_OF_UNITY;
                let mut m = S;

                while t != Fq::one() {
                    // Find the least i with t^(2^i) = 1.
                    let mut i = 1;
                    let mut t2i = t.square();
                    while t2i != Fq::one() {
                        t2i = t2i.square();
                        i += 1;
                    }

                    for _ in 0..(m - i - 1) {
                        c = c.square();
                    }
                    r *= &c;
                    c = c.square();
                    t *= &c;
                    m = i;
                }

                Some(r)
            }
        }
    }

    /// Computes the multiplicative inverse of this element as
    /// `self^(q - 2)`, using a fixed addition chain.
    ///
    /// The result is `None` when the element is zero.
    pub fn invert(&self) -> CtOption<Self> {
        #[inline(always)]
        fn square_assign_multi(n: &mut Fq, num_times: usize) {
            for _ in 0..num_times {
                *n = n.square();
            }
        }

        let mut t0 = self.square();
        let mut t1 = t0 * self;
        let mut t16 = t0.square();
        let mut t6 = t16.square();
        let mut t5 = t6 * t0;
        t0 = t6 * t16;
        let mut t12 = t5 * t16;
        let mut t2 = t6.square();
        let mut t7 = t5 * t6;
        let mut t15 = t0 * t5;
        let mut t17 = t12.square();
        t1 *= t17;
        let mut t3 = t7 * t2;
        let t8 = t1 * t17;
        let t4 = t8 * t2;
        let t9 = t8 * t7;
        t7 = t4 * t5;
        let t11 = t4 * t17;
        t5 = t9 * t17;
        let t14 = t7 * t15;
        let t13 = t11 * t12;
        t12 = t11 * t17;
        t15 *= t12;
        t16 *= t15;
        t3 *= t16;
        t17 *= t3;
        t0 *= t17;
        t6 *= t0;
        t2 *= t6;

        square_assign_multi(&mut t0, 8);
        t0 *= t17;
        square_assign_multi(&mut t0, 9);
        t0 *= t16;
        square_assign_multi(&mut t0, 9);
        t0 *= t15;
        square_assign_multi(&mut t0, 9);
        t0 *= t15;
        square_assign_multi(&mut t0, 7);
        t0 *= t14;
        square_assign_multi(&mut t0, 7);
        t0 *= t13;
        square_assign_multi(&mut t0, 10);
        t0 *= t12;
        square_assign_multi(&mut t0, 9);
        t0 *= t11;
        square_assign_multi(&mut t0, 8);
        t0 *= t8;
        square_assign_multi(&mut t0, 8);
        t0 *= self;
        square_assign_multi(&mut t0, 14);
        t0 *= t9;
        square_assign_multi(&mut t0, 10);
        t0 *= t8;
        square_assign_multi(&mut t0, 15);
        t0 *= t7;
        square_assign_multi(&mut t0, 10);
        t0 *= t6;
        square_assign_multi(&mut t0, 8);
        t0 *= t5;
        square_assign_multi(&mut t0, 16);
        t0 *= t3;
        square_assign_multi(&mut t0, 8);
        t0 *= t2;
        square_assign_multi(&mut t0, 7);
        t0 *= t4;
        square_assign_multi(&mut t0, 9);
        t0 *= t2;
        square_assign_multi(&mut t0, 8);
        t0 *= t3;
        square_assign_multi(&mut t0, 8);
        t0 *= t2;
        square_assign_multi(&mut t0, 8);
        t0 *= t2;
        square_assign_multi(&mut t0, 8);
        t0 *= t2;
        square_assign_multi(&mut t0, 8);
        t0 *= t3;
        square_assign_multi(&mut t0, 8);
        t0 *= t2;
        square_assign_multi(&mut t0, 8);
        t0 *= t2;
        square_assign_multi(&mut t0, 5);
        t0 *= t1;
        square_assign_multi(&mut t0, 5);
        t0 *= t1;

        CtOption::new(t0, !self.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    fn random_fq(rng: &mut impl RngCore) -> Fq {
        let mut buf = [0u8; 64];
        rng.fill_bytes(&mut buf);
        Fq::from_bytes_wide(&buf)
    }

    #[test]
    fn zero_and_one_encodings() {
        assert_eq!(Fq::zero().to_bytes(), [0u8; 32]);

        let mut one = [0u8; 32];
        one[0] = 1;
        assert_eq!(Fq::one().to_bytes(), one);

        let mut two = [0u8; 32];
        two[0] = 2;
        assert_eq!((Fq::one() + Fq::one()).to_bytes(), two);
        assert_eq!(Fq::one().double().to_bytes(), two);
    }

    #[test]
    fn modulus_constants_are_consistent() {
        // INV · q ≡ -1 (mod 2^64)
        assert_eq!(MODULUS.0[0].wrapping_mul(INV), u64::MAX);
        // q ≡ 0 in the field
        assert!(bool::from(Fq::from_raw(MODULUS.0).is_zero()));
        // from_raw(1) is the Montgomery representation of one
        assert_eq!(Fq::from_raw([1, 0, 0, 0]), Fq::one());
    }

    #[test]
    fn from_bytes_is_range_checked() {
        // q itself must be rejected...
        let q_bytes: [u8; 32] =
            hex::decode("01000000fffffffffe5bfeff02a4bd5305d8a10908d83933487d9d2953a7ed73")
                .unwrap()
                .try_into()
                .unwrap();
        assert!(bool::from(Fq::from_bytes(&q_bytes).is_none()));

        // ...while q - 1 round-trips.
        let largest: [u8; 32] =
            hex::decode("00000000fffffffffe5bfeff02a4bd5305d8a10908d83933487d9d2953a7ed73")
                .unwrap()
                .try_into()
                .unwrap();
        let e = Fq::from_bytes(&largest).unwrap();
        assert_eq!(e.to_bytes(), largest);
        assert_eq!(e + Fq::one(), Fq::zero());
    }

    #[test]
    fn encode_decode_round_trip() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let a = random_fq(&mut rng);
            let b = Fq::from_bytes(&a.to_bytes()).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn from_bytes_wide_known_answer() {
        let expected: [u8; 32] =
            hex::decode("6c9cf2f390e999c9235c9287cbed6c2b8f3954729614d30511ff599fd9d94807")
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!(Fq::from_bytes_wide(&[0xff; 64]).to_bytes(), expected);

        // The low half alone must agree with the narrow decoder.
        let mut wide = [0u8; 64];
        wide[..32].copy_from_slice(&Fq::from(12345u64).to_bytes());
        assert_eq!(Fq::from_bytes_wide(&wide), Fq::from(12345u64));
    }

    #[test]
    fn additive_axioms() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let a = random_fq(&mut rng);
            let b = random_fq(&mut rng);
            let c = random_fq(&mut rng);

            assert_eq!((a + b) + c, a + (b + c));
            assert_eq!(a + b, b + a);
            assert_eq!(a + Fq::zero(), a);
            assert_eq!(a + (-a), Fq::zero());
            assert_eq!(Fq::zero() - a, -a);
        }
        assert_eq!(-Fq::zero(), Fq::zero());
    }

    #[test]
    fn multiplicative_axioms() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let a = random_fq(&mut rng);
            let b = random_fq(&mut rng);
            let c = random_fq(&mut rng);

            assert_eq!((a * b) * c, a * (b * c));
            assert_eq!(a * b, b * a);
            assert_eq!(a * Fq::one(), a);
            assert_eq!(a * (b + c), a * b + a * c);
            assert_eq!(a.square(), a * a);
            assert_eq!(a.double(), a + a);
        }
    }

    #[test]
    fn inversion() {
        // Known answers for small inputs.
        let expected: [u8; 32] =
            hex::decode("01000080ffffff7fff2dff7f01d2dea902ecd00404ec9c19a4bece94a9d3f639")
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!(Fq::from(2u64).invert().unwrap().to_bytes(), expected);

        let expected: [u8; 32] =
            hex::decode("25499224dbb66ddb481a2449dc2e36aa4a6277704b62c757829151e760541f21")
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!(Fq::from(7u64).invert().unwrap().to_bytes(), expected);

        assert!(bool::from(Fq::zero().invert().is_none()));

        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let a = random_fq(&mut rng);
            if bool::from(a.is_zero()) {
                continue;
            }
            let inv = a.invert().unwrap();
            assert_eq!(a * inv, Fq::one());
            assert_eq!(inv.invert().unwrap(), a);
        }
    }

    #[test]
    fn pow_vartime_matches_repeated_multiplication() {
        let a = Fq::from(10u64);
        // a^5
        assert_eq!(a.pow_vartime(&[5, 0, 0, 0]), a * a * a * a * a);
        assert_eq!(a.pow_vartime(&[0, 0, 0, 0]), Fq::one());
        assert_eq!(a.pow_vartime(&[1, 0, 0, 0]), a);
    }

    #[test]
    fn legendre() {
        assert_eq!(Fq::zero().legendre_vartime(), LegendreSymbol::Zero);
        assert_eq!(Fq::one().legendre_vartime(), LegendreSymbol::QuadraticResidue);
        assert_eq!(
            Fq::from(4u64).legendre_vartime(),
            LegendreSymbol::QuadraticResidue
        );
        // The multiplicative generator is a non-residue.
        assert_eq!(
            GENERATOR.legendre_vartime(),
            LegendreSymbol::QuadraticNonResidue
        );
    }

    #[test]
    fn sqrt_of_squares() {
        let mut rng = rand::thread_rng();
        for _ in 0..25 {
            let a = random_fq(&mut rng);
            let s = a.square().sqrt().unwrap();
            assert!(s == a || s == -a);
            assert_eq!(s.square(), a.square());
        }

        let two = Fq::from(4u64).sqrt().unwrap();
        assert!(two == Fq::from(2u64) || two == -Fq::from(2u64));
    }

    #[test]
    fn sqrt_rejects_non_residues() {
        assert!(bool::from(GENERATOR.sqrt().is_none()));
        assert!(GENERATOR.sqrt_vartime().is_none());
    }

    #[test]
    fn sqrt_vartime_agrees_with_constant_time() {
        let mut rng = rand::thread_rng();
        for _ in 0..25 {
            let a = random_fq(&mut rng).square();
            assert_eq!(a.sqrt().unwrap(), a.sqrt_vartime().unwrap());
        }
        assert_eq!(Fq::zero().sqrt_vartime(), Some(Fq::zero()));
    }

    #[test]
    fn root_of_unity() {
        // ROOT_OF_UNITY = GENERATOR^t
        assert_eq!(GENERATOR.pow_vartime(&T), ROOT_OF_UNITY);

        // It has exact order 2^S.
        let mut r = ROOT_OF_UNITY;
        for _ in 0..(S - 1) {
            r = r.square();
        }
        assert_eq!(r, -Fq::one());
        assert_eq!(r.square(), Fq::one());
    }

    #[test]
    fn conditional_select() {
        let a = Fq::from(3u64);
        let b = Fq::from(5u64);
        assert_eq!(Fq::conditional_select(&a, &b, Choice::from(0)), a);
        assert_eq!(Fq::conditional_select(&a, &b, Choice::from(1)), b);
    }

    #[test]
    fn zeroize_clears_the_limbs() {
        let mut secret = Fq::from(0xdead_beef_cafe_babeu64);
        assert!(!bool::from(secret.is_zero()));

        secret.zeroize();

        assert!(bool::from(secret.is_zero()));
        assert_eq!(secret.0, [0u64; 4]);
        assert_eq!(secret.to_bytes(), [0u8; 32]);
    }

    #[test]
    fn debug_and_display_render_big_endian_hex() {
        assert_eq!(
            format!("{:?}", Fq::one()),
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
        assert_eq!(
            format!("{}", Fq::from(0x1f2u64)),
            "0x00000000000000000000000000000000000000000000000000000000000001f2"
        );
    }
}
