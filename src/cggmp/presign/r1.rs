use rand::{CryptoRng, RngCore};
use serde_json::{json, Value};

use crate::{
    crypto_tools::{
        k256_serde::SecretScalar,
        paillier::{zk::enc, Ciphertext, Randomness},
    },
    sdk::{
        api::CggmpResult,
        wire::{field, int_from_wire, int_to_wire, proof_from_wire, proof_to_wire, WireMessage},
    },
};

use super::{api::Session, r2};

/// `K_i = Enc_i(k_i)`, `G_i = Enc_i(gamma_i)` and a range proof for `k_i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Round1Message {
    pub k_ciphertext: Ciphertext,
    pub g_ciphertext: Ciphertext,
    pub proof_enc: enc::Proof,
}

pub struct R1 {
    pub(super) session: Session,
    pub(super) k_i: SecretScalar,
    pub(super) gamma_i: SecretScalar,
    pub(super) k_ciphertext: Ciphertext,
    pub(super) rho_i: Randomness,
    pub(super) g_ciphertext: Ciphertext,
    pub(super) nu_i: Randomness,
    pub(super) gamma_i_point: k256::ProjectivePoint,
}

impl R1 {
    pub fn round1(
        self,
        rng: &mut (impl CryptoRng + RngCore),
    ) -> CggmpResult<(r2::R2, Round1Message)> {
        let s = &self.session;
        let proof_enc = enc::prove(
            rng,
            &enc::Statement {
                ssid: &s.ssid,
                curve: &s.curve,
                ek: s.ek_i(),
                ciphertext: &self.k_ciphertext,
                setup: &s.setup_j,
            },
            &enc::Witness {
                msg: &self.k_i.to_bigint(),
                randomness: &self.rho_i,
            },
        )?;

        let msg = Round1Message {
            k_ciphertext: self.k_ciphertext.clone(),
            g_ciphertext: self.g_ciphertext.clone(),
            proof_enc,
        };

        Ok((
            r2::R2 {
                session: self.session,
                k_i: self.k_i,
                gamma_i: self.gamma_i,
                k_ciphertext: self.k_ciphertext,
                rho_i: self.rho_i,
                nu_i: self.nu_i,
                g_ciphertext: self.g_ciphertext,
                gamma_i_point: self.gamma_i_point,
            },
            msg,
        ))
    }
}

impl WireMessage for Round1Message {
    fn to_wire(&self) -> CggmpResult<Value> {
        Ok(json!({
            "K_ct": int_to_wire(self.k_ciphertext.as_bigint())?,
            "G_ct": int_to_wire(self.g_ciphertext.as_bigint())?,
            "proofenc": proof_to_wire(&self.proof_enc),
        }))
    }

    fn from_wire(value: &Value) -> CggmpResult<Self> {
        Ok(Self {
            k_ciphertext: int_from_wire(field(value, "K_ct")?)?.into(),
            g_ciphertext: int_from_wire(field(value, "G_ct")?)?.into(),
            proof_enc: proof_from_wire(field(value, "proofenc")?)?,
        })
    }
}
