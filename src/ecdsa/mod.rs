//! Single-key ECDSA over secp256k1: message hashing and textbook verification.
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::crypto_tools::{curve, k256_serde};

/// `SHA256(message)` read as a big-endian integer and reduced mod `q`.
pub fn message_hash(message: &[u8]) -> k256::Scalar {
    let digest = Sha256::digest(message);
    curve::to_scalar(&libpaillier::unknown_order::BigNumber::from_slice(
        digest.as_slice(),
    ))
}

/// An ECDSA signature `(r, s)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    r: k256_serde::Scalar,
    s: k256_serde::Scalar,
}

impl Signature {
    pub fn new(r: k256::Scalar, s: k256::Scalar) -> Self {
        Self {
            r: r.into(),
            s: s.into(),
        }
    }

    pub fn r(&self) -> &k256::Scalar {
        self.r.as_ref()
    }

    pub fn s(&self) -> &k256::Scalar {
        self.s.as_ref()
    }
}

/// `u1 = h s^-1, u2 = r s^-1`, accept iff `x(u1 G + u2 X) = r mod q`.
pub fn verify(public_key: &k256::ProjectivePoint, hash: &k256::Scalar, sig: &Signature) -> bool {
    let (r, s) = (sig.r(), sig.s());
    if bool::from(r.is_zero()) || bool::from(s.is_zero()) {
        warn!("ecdsa verify: r or s is zero");
        return false;
    }
    let s_inv = match Option::<k256::Scalar>::from(s.invert()) {
        Some(s_inv) => s_inv,
        None => return false,
    };
    let u1 = hash * &s_inv;
    let u2 = r * &s_inv;
    let point = k256::ProjectivePoint::GENERATOR * u1 + public_key * &u2;

    match curve::x_mod_q(&point) {
        Some(x) if x == *r => true,
        Some(_) => {
            warn!("ecdsa verify: signature mismatch");
            false
        }
        None => {
            warn!("ecdsa verify: point at infinity");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_tools::k256_serde::random_nonzero_scalar;
    use ::ecdsa::signature::hazmat::PrehashSigner;

    #[test]
    fn sign_with_k256_verify_textbook() {
        let mut rng = rand::thread_rng();
        let signing_key = k256::ecdsa::SigningKey::random(&mut rng);
        let public_key = k256::ProjectivePoint::from(*signing_key.verifying_key().as_affine());

        let digest = Sha256::digest(b"test");
        let signature: k256::ecdsa::Signature = signing_key.sign_prehash(&digest).unwrap();
        let (r, s) = signature.split_scalars();
        let sig = Signature::new(*r, *s);
        let hash = message_hash(b"test");

        assert!(verify(&public_key, &hash, &sig));
        assert!(!verify(&public_key, &message_hash(b"tesT"), &sig));
        let other_key = k256::ProjectivePoint::GENERATOR * random_nonzero_scalar(&mut rng);
        assert!(!verify(&other_key, &hash, &sig));
    }

    #[test]
    fn zero_components_rejected() {
        let mut rng = rand::thread_rng();
        let x = random_nonzero_scalar(&mut rng);
        let public_key = k256::ProjectivePoint::GENERATOR * x;
        let hash = message_hash(b"test");
        let nonzero = random_nonzero_scalar(&mut rng);

        assert!(!verify(
            &public_key,
            &hash,
            &Signature::new(k256::Scalar::ZERO, nonzero)
        ));
        assert!(!verify(
            &public_key,
            &hash,
            &Signature::new(nonzero, k256::Scalar::ZERO)
        ));
    }

    #[test]
    fn textbook_signature() {
        // s = k^-1 (h + r x) with R = k G, r = x(R)
        let mut rng = rand::thread_rng();
        let x = random_nonzero_scalar(&mut rng);
        let k = random_nonzero_scalar(&mut rng);
        let public_key = k256::ProjectivePoint::GENERATOR * x;
        let r = curve::x_mod_q(&(k256::ProjectivePoint::GENERATOR * k)).unwrap();
        let hash = message_hash(b"hello");
        let k_inv = Option::<k256::Scalar>::from(k.invert()).unwrap();
        let s = k_inv * (hash + r * x);

        let sig = Signature::new(r, s);
        assert!(verify(&public_key, &hash, &sig));
        assert_eq!(
            crate::sdk::api::deserialize::<Signature>(&crate::sdk::api::serialize(&sig).unwrap())
                .unwrap(),
            sig
        );
    }
}
