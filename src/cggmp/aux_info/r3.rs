use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde_json::{json, Value};
use tracing::warn;

use crate::{
    crypto_tools::{
        constants::PAILLIER_MODULUS_MIN_BITS,
        curve::CurveParams,
        numbers,
        paillier::{
            zk::{fac, modulus, prm, RingPedersen},
            DecryptionKey, EncryptionKey,
        },
    },
    sdk::{
        api::{CggmpError, CggmpResult},
        wire::{field, proof_from_wire, proof_to_wire, WireMessage},
    },
};

use super::{api::commit, r2, r4};

/// Proofs that this party's modulus is Paillier-Blum with no small factor.
#[derive(Debug, Clone, PartialEq)]
pub struct Round3Message {
    pub modulus: modulus::Proof,
    pub fac: fac::Proof,
}

pub struct R3 {
    pub(super) id: u64,
    pub(super) ssid: BigNumber,
    pub(super) curve: CurveParams,
    pub(super) dk: DecryptionKey,
    pub(super) setup: RingPedersen,
    pub(super) rho_i: BigNumber,
    pub(super) id_j: u64,
    pub(super) v_j: BigNumber,
}

impl R3 {
    pub fn round3(
        self,
        rng: &mut (impl CryptoRng + RngCore),
        msg_j: &r2::Round2Message,
    ) -> CggmpResult<(r4::R4, Round3Message)> {
        if msg_j.n.bit_length() < PAILLIER_MODULUS_MIN_BITS {
            warn!(
                "party {} says: paillier modulus of {} bits from party {}",
                self.id,
                msg_j.n.bit_length(),
                self.id_j
            );
            return Err(CggmpError::Verification);
        }

        let setup_j = RingPedersen::new(msg_j.n.clone(), msg_j.s.clone(), msg_j.t.clone());
        if commit(
            &self.ssid,
            self.id_j,
            &msg_j.n,
            &setup_j,
            &msg_j.prm,
            &msg_j.rho,
        ) != self.v_j
        {
            warn!(
                "party {} says: commitment mismatch from party {}",
                self.id, self.id_j
            );
            return Err(CggmpError::Verification);
        }

        if !prm::verify(&self.ssid, &setup_j, &msg_j.prm) {
            warn!(
                "party {} says: bad prm proof from party {}",
                self.id, self.id_j
            );
            return Err(CggmpError::Verification);
        }

        let rho = numbers::xor(&self.rho_i, &msg_j.rho);
        let session = numbers::xor(&self.ssid, &rho);
        let ek_j = EncryptionKey::from_modulus(msg_j.n.clone());

        let modulus_proof = modulus::prove(rng, &session, &self.dk)?;
        let fac_proof = fac::prove(
            rng,
            &fac::Statement {
                ssid: &session,
                curve: &self.curve,
                n0: self.dk.encryption_key().n(),
                setup: &setup_j,
            },
            &fac::Witness {
                p: self.dk.p(),
                q: self.dk.q(),
            },
        )?;

        Ok((
            r4::R4 {
                id: self.id,
                curve: self.curve,
                dk: self.dk,
                setup: self.setup,
                session,
                id_j: self.id_j,
                ek_j,
                setup_j,
            },
            Round3Message {
                modulus: modulus_proof,
                fac: fac_proof,
            },
        ))
    }
}

impl WireMessage for Round3Message {
    fn to_wire(&self) -> CggmpResult<Value> {
        Ok(json!({
            "mod": proof_to_wire(&self.modulus),
            "fac": proof_to_wire(&self.fac),
        }))
    }

    fn from_wire(value: &Value) -> CggmpResult<Self> {
        Ok(Self {
            modulus: proof_from_wire(field(value, "mod")?)?,
            fac: proof_from_wire(field(value, "fac")?)?,
        })
    }
}
