//! secp256k1 domain parameters as integers, plus scalar conversions.
use ecdsa::elliptic_curve::PrimeField;
use libpaillier::unknown_order::BigNumber;

use super::numbers;

/// The order of the secp256k1 curve
const SECP256K1_CURVE_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// The prime of the secp256k1 base field
const SECP256K1_FIELD_PRIME: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe, 0xff, 0xff, 0xfc, 0x2f,
];

const SECP256K1_B: u64 = 7;

/// Integer view of the curve, hashed into every proof challenge.
///
/// Built once by the caller and passed by reference.
#[derive(Clone, Debug, PartialEq)]
pub struct CurveParams {
    /// group order `q`
    pub q: BigNumber,
    /// field prime `p`
    pub p: BigNumber,
    /// coefficient `b` of `y^2 = x^3 + b`
    pub b: BigNumber,
}

impl CurveParams {
    pub fn secp256k1() -> Self {
        Self {
            q: BigNumber::from_slice(SECP256K1_CURVE_ORDER.as_ref()),
            p: BigNumber::from_slice(SECP256K1_FIELD_PRIME.as_ref()),
            b: BigNumber::from(SECP256K1_B),
        }
    }

    pub fn q_pow(&self, e: usize) -> BigNumber {
        (1..e).fold(self.q.clone(), |acc, _| acc * &self.q)
    }
}

/// secp256k1 curve order as a `BigNumber`
pub fn secp256k1_modulus() -> BigNumber {
    BigNumber::from_slice(SECP256K1_CURVE_ORDER.as_ref())
}

/// Reduce any integer modulo `q` into a scalar.
pub fn to_scalar(bigint: &BigNumber) -> k256::Scalar {
    let q = secp256k1_modulus();
    let mut s = bigint % &q;
    if s < BigNumber::zero() {
        s = s + &q;
    }
    // s < q fits in 32 bytes and is canonical
    numbers::to_be_bytes_padded(&s, 32)
        .and_then(|bytes| {
            Option::<k256::Scalar>::from(k256::Scalar::from_repr(*k256::FieldBytes::from_slice(
                &bytes,
            )))
        })
        .unwrap_or(k256::Scalar::ZERO)
}

pub fn to_bigint(s: &k256::Scalar) -> BigNumber {
    super::k256_serde::scalar_to_bigint(s)
}

/// `x(P) mod q`, or `None` for the identity.
pub fn x_mod_q(p: &k256::ProjectivePoint) -> Option<k256::Scalar> {
    super::k256_serde::ProjectivePoint::from(p)
        .coordinates()
        .map(|(x, _)| to_scalar(&x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecdsa::elliptic_curve::Field;

    #[test]
    fn secp256k1_order() {
        // Test that secp256k1 modulus is the order of the generator
        let g = k256::ProjectivePoint::GENERATOR;
        let q_minus_one = secp256k1_modulus() - BigNumber::one();

        assert_eq!(
            g * to_scalar(&q_minus_one) + g,
            k256::ProjectivePoint::IDENTITY
        );
        assert_eq!(to_scalar(&secp256k1_modulus()), k256::Scalar::ZERO);
    }

    #[test]
    fn scalar_round_trip() {
        let s = k256::Scalar::random(rand::thread_rng());
        assert_eq!(to_scalar(&to_bigint(&s)), s);

        let q = CurveParams::secp256k1();
        let big = &q.q_pow(3) + &to_bigint(&s);
        assert_eq!(to_scalar(&big), s);
    }

    #[test]
    fn field_prime_matches_generator() {
        // y^2 = x^3 + 7 mod p for the generator
        let params = CurveParams::secp256k1();
        let (x, y) = crate::crypto_tools::k256_serde::ProjectivePoint::from(
            k256::ProjectivePoint::GENERATOR,
        )
        .coordinates()
        .unwrap();
        let lhs = y.modmul(&y, &params.p);
        let rhs = (&x.modmul(&x, &params.p).modmul(&x, &params.p) + &params.b) % &params.p;
        assert_eq!(lhs, rhs);
    }
}
