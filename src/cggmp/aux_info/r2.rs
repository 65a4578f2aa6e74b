use libpaillier::unknown_order::BigNumber;
use serde_json::{json, Value};

use crate::{
    crypto_tools::{
        curve::CurveParams,
        paillier::{
            zk::{prm, RingPedersen},
            DecryptionKey,
        },
    },
    sdk::{
        api::CggmpResult,
        wire::{field, int_from_wire, int_to_wire, proof_from_wire, proof_to_wire, WireMessage},
    },
};

use super::{r1, r3};

/// Opening of the round 1 commitment.
#[derive(Debug, Clone, PartialEq)]
pub struct Round2Message {
    pub n: BigNumber,
    pub s: BigNumber,
    pub t: BigNumber,
    pub prm: prm::Proof,
    pub rho: BigNumber,
}

pub struct R2 {
    pub(super) id: u64,
    pub(super) ssid: BigNumber,
    pub(super) curve: CurveParams,
    pub(super) dk: DecryptionKey,
    pub(super) setup: RingPedersen,
    pub(super) prm_proof: prm::Proof,
    pub(super) rho_i: BigNumber,
}

impl R2 {
    pub fn round2(self, msg_j: &r1::Round1Message) -> (r3::R3, Round2Message) {
        let msg = Round2Message {
            n: self.dk.encryption_key().n().clone(),
            s: self.setup.s().clone(),
            t: self.setup.t().clone(),
            prm: self.prm_proof,
            rho: self.rho_i.clone(),
        };

        (
            r3::R3 {
                id: self.id,
                ssid: self.ssid,
                curve: self.curve,
                dk: self.dk,
                setup: self.setup,
                rho_i: self.rho_i,
                id_j: msg_j.id,
                v_j: msg_j.v.clone(),
            },
            msg,
        )
    }
}

impl WireMessage for Round2Message {
    fn to_wire(&self) -> CggmpResult<Value> {
        Ok(json!({
            "n": int_to_wire(&self.n)?,
            "s": int_to_wire(&self.s)?,
            "t": int_to_wire(&self.t)?,
            "prm": proof_to_wire(&self.prm),
            "rho": int_to_wire(&self.rho)?,
        }))
    }

    fn from_wire(value: &Value) -> CggmpResult<Self> {
        Ok(Self {
            n: int_from_wire(field(value, "n")?)?,
            s: int_from_wire(field(value, "s")?)?,
            t: int_from_wire(field(value, "t")?)?,
            prm: proof_from_wire(field(value, "prm")?)?,
            rho: int_from_wire(field(value, "rho")?)?,
        })
    }
}
