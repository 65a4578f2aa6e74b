use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

use crate::{
    crypto_tools::{
        constants::AUX_COMMIT_TAG,
        curve::CurveParams,
        hash::Transcript,
        numbers,
        paillier::{
            self,
            zk::{prm, ProofParts, RingPedersen},
            DecryptionKey, EncryptionKey,
        },
    },
    sdk::{
        api::{CggmpError, CggmpResult, Malformed},
        wire::{field, int_from_wire, int_to_wire, WireMessage},
    },
};

use super::r1;

/// Verified result of aux info: this party's Paillier key plus both parties'
/// public Paillier keys and Ring-Pedersen parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxOutputData {
    dk_i: DecryptionKey,
    setup_i: RingPedersen,
    ek_j: EncryptionKey,
    setup_j: RingPedersen,
}

impl AuxOutputData {
    pub(super) fn new(
        dk_i: DecryptionKey,
        setup_i: RingPedersen,
        ek_j: EncryptionKey,
        setup_j: RingPedersen,
    ) -> Self {
        Self {
            dk_i,
            setup_i,
            ek_j,
            setup_j,
        }
    }

    pub fn dk_i(&self) -> &DecryptionKey {
        &self.dk_i
    }

    pub fn ek_i(&self) -> &EncryptionKey {
        self.dk_i.encryption_key()
    }

    pub fn setup_i(&self) -> &RingPedersen {
        &self.setup_i
    }

    pub fn ek_j(&self) -> &EncryptionKey {
        &self.ek_j
    }

    pub fn setup_j(&self) -> &RingPedersen {
        &self.setup_j
    }
}

/// Announces the peer's verified Paillier modulus.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxOutputMessage {
    pub n: BigNumber,
}

impl WireMessage for AuxOutputMessage {
    fn to_wire(&self) -> CggmpResult<Value> {
        Ok(json!({ "n": int_to_wire(&self.n)? }))
    }

    fn from_wire(value: &Value) -> CggmpResult<Self> {
        Ok(Self {
            n: int_from_wire(field(value, "n")?)?,
        })
    }
}

/// Generate a Paillier key pair from safe primes.
pub fn paillier_keypair() -> CggmpResult<DecryptionKey> {
    let (_, dk) = paillier::keygen()?;
    Ok(dk)
}

/// BEWARE: the primes are not safe primes. For testing only.
pub fn paillier_keypair_unsafe() -> CggmpResult<DecryptionKey> {
    let (_, dk) = paillier::keygen_unsafe()?;
    Ok(dk)
}

/// Initialize a new aux info protocol bound to the keygen session `ssid`.
///
/// `dk` is this session's fresh Paillier key, see [paillier_keypair].
pub fn new_aux_info(
    rng: &mut (impl CryptoRng + RngCore),
    id: u64,
    ssid: &BigNumber,
    curve: &CurveParams,
    dk: DecryptionKey,
) -> CggmpResult<r1::R1> {
    if numbers::is_zero(ssid) {
        error!("aux info: zero session id");
        return Err(CggmpError::Malformed(Malformed::ProofInput));
    }

    let (setup, lambda) = RingPedersen::generate(rng, &dk);
    let prm_proof = prm::prove(rng, ssid, &setup, &lambda, dk.totient())?;
    let rho_i = numbers::sample_nonzero_below(rng, dk.encryption_key().n());

    let v_i = commit(
        ssid,
        id,
        dk.encryption_key().n(),
        &setup,
        &prm_proof,
        &rho_i,
    );

    Ok(r1::R1 {
        id,
        ssid: ssid.clone(),
        curve: curve.clone(),
        dk,
        setup,
        prm_proof,
        rho_i,
        v_i,
    })
}

/// `V = H(ssid, id, N, s, t, prm..., rho)`
pub(super) fn commit(
    ssid: &BigNumber,
    id: u64,
    n: &BigNumber,
    setup: &RingPedersen,
    prm_proof: &prm::Proof,
    rho: &BigNumber,
) -> BigNumber {
    let prm_parts: Vec<BigNumber> = prm_proof
        .to_parts()
        .iter()
        .map(|part| numbers::from_be_bytes(part))
        .collect();
    Transcript::tagged(AUX_COMMIT_TAG)
        .chain_int(ssid)
        .chain_int(&BigNumber::from(id))
        .chain_int(n)
        .chain_int(setup.s())
        .chain_int(setup.t())
        .chain_ints(prm_parts.iter())
        .chain_int(rho)
        .finalize()
}
