//! serde support for k256
//!
//! ## References
//!
//! [Implementing Serialize · Serde](https://serde.rs/impl-serialize.html)
//! [Implementing Deserialize · Serde](https://serde.rs/impl-deserialize.html)

use ecdsa::elliptic_curve::{Field, PrimeField};
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{de, de::Error, de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

use crate::{crypto_tools::numbers, sdk::api::BytesVec};

/// A secret scalar that is zeroized on drop
#[derive(Clone, Debug, PartialEq, Zeroize, Serialize, Deserialize)]
#[zeroize(drop)]
pub struct SecretScalar(Scalar);

impl AsRef<k256::Scalar> for SecretScalar {
    fn as_ref(&self) -> &k256::Scalar {
        &self.0 .0
    }
}

impl SecretScalar {
    /// Uniform in `[1, q)`.
    pub fn random(rng: &mut (impl CryptoRng + RngCore)) -> Self {
        Self(Scalar(random_nonzero_scalar(rng)))
    }

    pub fn to_bigint(&self) -> BigNumber {
        scalar_to_bigint(&self.0 .0)
    }
}

impl From<k256::Scalar> for SecretScalar {
    fn from(s: k256::Scalar) -> Self {
        Self(Scalar(s))
    }
}

/// Uniform in `[1, q)`.
pub fn random_nonzero_scalar(rng: &mut (impl CryptoRng + RngCore)) -> k256::Scalar {
    loop {
        let s = k256::Scalar::random(&mut *rng);
        if !bool::from(s.is_zero()) {
            return s;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
pub struct Scalar(k256::Scalar);

impl AsRef<k256::Scalar> for Scalar {
    fn as_ref(&self) -> &k256::Scalar {
        &self.0
    }
}

impl From<k256::Scalar> for Scalar {
    fn from(s: k256::Scalar) -> Self {
        Scalar(s)
    }
}

impl Serialize for Scalar {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bytes: [u8; 32] = self.0.to_bytes().into();
        bytes.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: [u8; 32] = Deserialize::deserialize(deserializer)?;

        // from_repr rejects integers not less than the secp256k1 order
        Option::<k256::Scalar>::from(k256::Scalar::from_repr(bytes.into()))
            .map(Scalar)
            .ok_or_else(|| D::Error::custom("integer exceeds secp256k1 modulus"))
    }
}

#[derive(Clone, Debug, PartialEq)]
struct EncodedPoint(k256::EncodedPoint);

impl Serialize for EncodedPoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(self.0.as_bytes())
    }
}

impl<'de> Deserialize<'de> for EncodedPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_bytes(EncodedPointVisitor)
    }
}

struct EncodedPointVisitor;

impl<'de> Visitor<'de> for EncodedPointVisitor {
    type Value = EncodedPoint;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("SEC1-encoded secp256k1 (K-256) curve point")
    }

    fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(EncodedPoint(
            k256::EncodedPoint::from_bytes(v).map_err(E::custom)?,
        ))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let mut bytes = Vec::new();
        while let Some(b) = seq.next_element::<u8>()? {
            bytes.push(b);
        }
        self.visit_bytes(&bytes)
    }
}

/// A curve point; equality treats all representations of the identity alike.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectivePoint(k256::ProjectivePoint);

impl ProjectivePoint {
    pub fn bytes(&self) -> BytesVec {
        to_bytes(&self.0)
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Option::<k256::ProjectivePoint>::from(k256::ProjectivePoint::from_encoded_point(
            &k256::EncodedPoint::from_bytes(bytes).ok()?,
        ))
        .map(Self)
    }

    pub fn is_identity(&self) -> bool {
        self.0 == k256::ProjectivePoint::IDENTITY
    }

    /// Affine coordinates, or `None` for the point at infinity.
    pub fn coordinates(&self) -> Option<(BigNumber, BigNumber)> {
        let encoded = self.0.to_affine().to_encoded_point(false);
        Some((
            BigNumber::from_slice(encoded.x()?.as_slice()),
            BigNumber::from_slice(encoded.y()?.as_slice()),
        ))
    }

    /// Affine coordinates for hashing; the identity contributes `(0, 0)`.
    pub fn hash_coordinates(&self) -> (BigNumber, BigNumber) {
        self.coordinates()
            .unwrap_or_else(|| (BigNumber::zero(), BigNumber::zero()))
    }

    /// Inverse of [ProjectivePoint::hash_coordinates].
    pub fn from_hash_coordinates(x: &BigNumber, y: &BigNumber) -> Option<Self> {
        if numbers::is_zero(x) && numbers::is_zero(y) {
            return Some(Self(k256::ProjectivePoint::IDENTITY));
        }
        Self::from_coordinates(x, y)
    }

    /// `None` unless `(x, y)` lies on the curve.
    /// Coordinates must be canonical, less than the field prime.
    pub fn from_coordinates(x: &BigNumber, y: &BigNumber) -> Option<Self> {
        let x = numbers::to_be_bytes_padded(x, 32)?;
        let y = numbers::to_be_bytes_padded(y, 32)?;
        let encoded = k256::EncodedPoint::from_affine_coordinates(
            k256::FieldBytes::from_slice(&x),
            k256::FieldBytes::from_slice(&y),
            false,
        );
        Option::<k256::ProjectivePoint>::from(k256::ProjectivePoint::from_encoded_point(&encoded))
            .map(Self)
    }
}

impl AsRef<k256::ProjectivePoint> for ProjectivePoint {
    fn as_ref(&self) -> &k256::ProjectivePoint {
        &self.0
    }
}

pub fn to_bytes(p: &k256::ProjectivePoint) -> BytesVec {
    p.to_affine().to_encoded_point(true).as_bytes().to_vec()
}

impl From<k256::ProjectivePoint> for ProjectivePoint {
    fn from(p: k256::ProjectivePoint) -> Self {
        ProjectivePoint(p)
    }
}

impl From<&k256::ProjectivePoint> for ProjectivePoint {
    fn from(p: &k256::ProjectivePoint) -> Self {
        ProjectivePoint(*p)
    }
}

impl From<&SecretScalar> for ProjectivePoint {
    fn from(s: &SecretScalar) -> Self {
        ProjectivePoint(k256::ProjectivePoint::GENERATOR * s.as_ref())
    }
}

impl Serialize for ProjectivePoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        EncodedPoint(self.0.to_encoded_point(true)).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProjectivePoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<k256::ProjectivePoint>::from(k256::ProjectivePoint::from_encoded_point(
            &EncodedPoint::deserialize(deserializer)?.0,
        ))
        .map(ProjectivePoint)
        .ok_or_else(|| D::Error::custom("SEC1-encoded point is not on curve secp256k (K-256)"))
    }
}

pub fn scalar_to_bigint(s: &k256::Scalar) -> BigNumber {
    BigNumber::from_slice(s.to_bytes().as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_round_trip() {
        let mut rng = rand::thread_rng();

        let s = Scalar(k256::Scalar::random(&mut rng));
        let s_serialized = bincode::serialize(&s).unwrap();
        assert_eq!(s_serialized.len(), 32);
        let s_deserialized: Scalar = bincode::deserialize(&s_serialized).unwrap();
        assert_eq!(s, s_deserialized);

        let p = ProjectivePoint(k256::ProjectivePoint::GENERATOR * k256::Scalar::random(&mut rng));
        let p_serialized = bincode::serialize(&p).unwrap();
        let p_deserialized: ProjectivePoint = bincode::deserialize(&p_serialized).unwrap();
        assert_eq!(p, p_deserialized);
    }

    #[test]
    fn scalar_deserialization_fail() {
        let mut modulus: [u8; 32] = [
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
            0xff, 0xfe, 0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c,
            0xd0, 0x36, 0x41, 0x41,
        ]; // secp256k1 modulus

        // test edge case: integer too large
        bincode::deserialize::<Scalar>(&modulus).unwrap_err();

        // test edge case: integer not too large
        modulus[31] -= 1;
        bincode::deserialize::<Scalar>(&modulus).unwrap();
    }

    #[test]
    fn coordinates() {
        let g = ProjectivePoint(k256::ProjectivePoint::GENERATOR);
        let (x, y) = g.coordinates().unwrap();
        assert_eq!(ProjectivePoint::from_coordinates(&x, &y), Some(g));

        // off-curve
        let y1 = &y + &BigNumber::one();
        assert_eq!(ProjectivePoint::from_coordinates(&x, &y1), None);

        let identity = ProjectivePoint(k256::ProjectivePoint::IDENTITY);
        assert!(identity.is_identity());
        assert_eq!(identity.coordinates(), None);
        assert_eq!(
            identity.hash_coordinates(),
            (BigNumber::zero(), BigNumber::zero())
        );
    }
}
