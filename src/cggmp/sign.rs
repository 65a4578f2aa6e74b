//! Signing with a presignature: one local share each, then combine and verify.
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::{
    cggmp::presign::PresigOutputData,
    crypto_tools::curve,
    ecdsa::{self, Signature},
    sdk::{
        api::{CggmpError, CggmpResult, Malformed},
        wire::{field, scalar_from_wire, scalar_to_wire, WireMessage},
    },
};

/// A party's signature share `sigma_i = k_i m + r chi_i`.
#[derive(Debug, Clone, PartialEq)]
pub struct SigningMessage {
    pub sigma: k256::Scalar,
}

impl WireMessage for SigningMessage {
    fn to_wire(&self) -> CggmpResult<Value> {
        Ok(json!({ "sigma": scalar_to_wire(&self.sigma)? }))
    }

    fn from_wire(value: &Value) -> CggmpResult<Self> {
        Ok(Self {
            sigma: scalar_from_wire(field(value, "sigma")?)?,
        })
    }
}

/// Holds a presignature until exactly one message is signed with it.
#[derive(Debug)]
pub struct Signer {
    presig: PresigOutputData,
    r: k256::Scalar,
    public_key: k256::ProjectivePoint,
}

impl Signer {
    /// Fails if `R` has x-coordinate zero mod `q`.
    pub fn new(presig: PresigOutputData, public_key: &k256::ProjectivePoint) -> CggmpResult<Self> {
        let r = match curve::x_mod_q(presig.r_point()) {
            Some(r) if !bool::from(r.is_zero()) => r,
            _ => {
                error!("presignature has r = 0");
                return Err(CggmpError::Malformed(Malformed::Point));
            }
        };
        Ok(Self {
            presig,
            r,
            public_key: *public_key,
        })
    }

    pub fn r(&self) -> &k256::Scalar {
        &self.r
    }

    /// Consumes the presignature: its nonce share never signs a second message.
    pub fn sign(self, message: &[u8]) -> (Verifier, SigningMessage) {
        let hash = ecdsa::message_hash(message);
        let sigma = self.presig.k_i().as_ref() * &hash + self.presig.chi_i().as_ref() * &self.r;

        (
            Verifier {
                hash,
                r: self.r,
                sigma_i: sigma,
                public_key: self.public_key,
            },
            SigningMessage { sigma },
        )
    }
}

/// Combines both shares once the peer's arrives.
#[derive(Debug)]
pub struct Verifier {
    hash: k256::Scalar,
    r: k256::Scalar,
    sigma_i: k256::Scalar,
    public_key: k256::ProjectivePoint,
}

impl Verifier {
    pub fn verify(self, msg_j: &SigningMessage) -> CggmpResult<Signature> {
        let s = self.sigma_i + msg_j.sigma;
        if bool::from(s.is_zero()) {
            warn!("combined signature has s = 0");
            return Err(CggmpError::Verification);
        }

        let sig = Signature::new(self.r, s);
        if !ecdsa::verify(&self.public_key, &self.hash, &sig) {
            warn!("combined signature does not verify");
            return Err(CggmpError::Verification);
        }
        Ok(sig)
    }
}
