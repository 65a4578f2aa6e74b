use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    crypto_tools::{
        constants::KEYGEN_COMMIT_TAG,
        curve::CurveParams,
        hash::Transcript,
        k256_serde::{self, SecretScalar},
        numbers,
    },
    sdk::{
        api::CggmpResult,
        wire::{field, point_from_wire, point_to_wire, WireMessage},
    },
};

use super::r1;

pub use crate::crypto_tools::rng::SecretRecoveryKey;

/// Byte length of the keygen session randomness `rid`.
pub const RID_BYTES: usize = 32;

/// Verified result of keygen: this party's share of the signing key and the
/// joint public key. Store it to run later phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeygenOutputData {
    id_j: u64,
    ssid: BigNumber,
    x_i: SecretScalar,
    x_i_point: k256_serde::ProjectivePoint,
    x_j_point: k256_serde::ProjectivePoint,
    x: k256_serde::ProjectivePoint,
}

impl KeygenOutputData {
    pub(super) fn new(
        id_j: u64,
        ssid: BigNumber,
        x_i: SecretScalar,
        x_i_point: k256::ProjectivePoint,
        x_j_point: k256::ProjectivePoint,
        x: k256::ProjectivePoint,
    ) -> Self {
        Self {
            id_j,
            ssid,
            x_i,
            x_i_point: x_i_point.into(),
            x_j_point: x_j_point.into(),
            x: x.into(),
        }
    }

    /// The counterparty's id
    pub fn id_j(&self) -> u64 {
        self.id_j
    }

    /// Session id `rid_i xor rid_j`, shared by both parties.
    pub fn ssid(&self) -> &BigNumber {
        &self.ssid
    }

    pub fn x_i(&self) -> &SecretScalar {
        &self.x_i
    }

    pub fn x_i_point(&self) -> &k256::ProjectivePoint {
        self.x_i_point.as_ref()
    }

    pub fn x_j_point(&self) -> &k256::ProjectivePoint {
        self.x_j_point.as_ref()
    }

    /// The joint public key `X_i + X_j`
    pub fn public_key(&self) -> &k256::ProjectivePoint {
        self.x.as_ref()
    }
}

/// Announces the joint public key once keygen completes.
#[derive(Debug, Clone, PartialEq)]
pub struct KeygenOutputMessage {
    pub x: k256::ProjectivePoint,
}

impl WireMessage for KeygenOutputMessage {
    fn to_wire(&self) -> CggmpResult<Value> {
        Ok(json!({ "X": point_to_wire(&self.x) }))
    }

    fn from_wire(value: &Value) -> CggmpResult<Self> {
        Ok(Self {
            x: point_from_wire(field(value, "X")?)?,
        })
    }
}

/// Initialize a new keygen protocol.
///
/// All of this party's keygen secrets are drawn here, so a seeded `rng`
/// reproduces the same key share.
pub fn new_keygen(
    rng: &mut (impl CryptoRng + RngCore),
    id: u64,
    curve: &CurveParams,
) -> r1::R1 {
    let x_i = SecretScalar::random(rng);
    let x_i_point = k256::ProjectivePoint::GENERATOR * x_i.as_ref();

    let mut rid = [0u8; RID_BYTES];
    rng.fill_bytes(&mut rid);
    let rid = numbers::from_be_bytes(&rid);

    let alpha = SecretScalar::random(rng);
    let a_i = k256::ProjectivePoint::GENERATOR * alpha.as_ref();

    let v_i = commit(id, &rid, &x_i_point, &a_i);

    r1::R1 {
        id,
        curve: curve.clone(),
        x_i,
        x_i_point,
        rid,
        alpha,
        a_i,
        v_i,
    }
}

/// `V = H(id, rid, X, A)`
pub(crate) fn commit(
    id: u64,
    rid: &BigNumber,
    x: &k256::ProjectivePoint,
    a: &k256::ProjectivePoint,
) -> BigNumber {
    Transcript::tagged(KEYGEN_COMMIT_TAG)
        .chain_int(&BigNumber::from(id))
        .chain_int(rid)
        .chain_k256_point(x)
        .chain_k256_point(a)
        .finalize()
}
