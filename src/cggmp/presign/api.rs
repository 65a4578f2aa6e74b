use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde_json::{json, Value};

use crate::{
    cggmp::{aux_info::AuxOutputData, keygen::KeygenOutputData},
    crypto_tools::{
        curve::CurveParams,
        k256_serde::{self, SecretScalar},
        paillier::{zk::RingPedersen, DecryptionKey, EncryptionKey, Plaintext},
    },
    sdk::{
        api::CggmpResult,
        wire::{field, point_from_wire, point_to_wire, WireMessage},
    },
};

use super::r1;

/// A presignature: the nonce point `R` and this party's shares `k_i`, `chi_i`.
///
/// Single use. Signing two messages with the same presignature reveals the
/// key, so signing consumes it by value.
#[derive(Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct PresigOutputData {
    r_point: k256_serde::ProjectivePoint,
    k_i: SecretScalar,
    chi_i: SecretScalar,
}

impl PresigOutputData {
    pub(crate) fn new(r_point: k256::ProjectivePoint, k_i: SecretScalar, chi_i: SecretScalar) -> Self {
        Self {
            r_point: r_point.into(),
            k_i,
            chi_i,
        }
    }

    pub fn r_point(&self) -> &k256::ProjectivePoint {
        self.r_point.as_ref()
    }

    pub(crate) fn k_i(&self) -> &SecretScalar {
        &self.k_i
    }

    pub(crate) fn chi_i(&self) -> &SecretScalar {
        &self.chi_i
    }
}

/// Announces the agreed nonce point.
#[derive(Debug, Clone, PartialEq)]
pub struct PresigningOutputMessage {
    pub r_point: k256::ProjectivePoint,
}

impl WireMessage for PresigningOutputMessage {
    fn to_wire(&self) -> CggmpResult<Value> {
        Ok(json!({ "R": point_to_wire(&self.r_point) }))
    }

    fn from_wire(value: &Value) -> CggmpResult<Self> {
        Ok(Self {
            r_point: point_from_wire(field(value, "R")?)?,
        })
    }
}

/// Keys and parameters fixed by keygen and aux info, carried through every round.
pub(super) struct Session {
    pub(super) id: u64,
    pub(super) id_j: u64,
    pub(super) ssid: BigNumber,
    pub(super) curve: CurveParams,
    pub(super) x_i: SecretScalar,
    pub(super) x_i_point: k256::ProjectivePoint,
    pub(super) x_j_point: k256::ProjectivePoint,
    pub(super) dk_i: DecryptionKey,
    pub(super) setup_i: RingPedersen,
    pub(super) ek_j: EncryptionKey,
    pub(super) setup_j: RingPedersen,
}

impl Session {
    pub(super) fn ek_i(&self) -> &EncryptionKey {
        self.dk_i.encryption_key()
    }
}

/// Initialize a new presigning protocol.
///
/// The ephemeral shares `k_i`, `gamma_i` and their encryptions are drawn here.
pub fn new_presign(
    rng: &mut (impl CryptoRng + RngCore),
    id: u64,
    curve: &CurveParams,
    keygen: &KeygenOutputData,
    aux: &AuxOutputData,
) -> CggmpResult<r1::R1> {
    let session = Session {
        id,
        id_j: keygen.id_j(),
        ssid: keygen.ssid().clone(),
        curve: curve.clone(),
        x_i: keygen.x_i().clone(),
        x_i_point: *keygen.x_i_point(),
        x_j_point: *keygen.x_j_point(),
        dk_i: aux.dk_i().clone(),
        setup_i: aux.setup_i().clone(),
        ek_j: aux.ek_j().clone(),
        setup_j: aux.setup_j().clone(),
    };

    let k_i = SecretScalar::random(rng);
    let gamma_i = SecretScalar::random(rng);
    let (k_ciphertext, rho_i) = session
        .ek_i()
        .encrypt(rng, &Plaintext::from_scalar(k_i.as_ref()))?;
    let (g_ciphertext, nu_i) = session
        .ek_i()
        .encrypt(rng, &Plaintext::from_scalar(gamma_i.as_ref()))?;
    let gamma_i_point = k256::ProjectivePoint::GENERATOR * gamma_i.as_ref();

    Ok(r1::R1 {
        session,
        k_i,
        gamma_i,
        k_ciphertext,
        rho_i,
        g_ciphertext,
        nu_i,
        gamma_i_point,
    })
}
