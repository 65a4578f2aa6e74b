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
        wire::{field, int_from_wire, int_to_wire, u64_from_wire, WireMessage},
    },
};

use super::r2;

/// Commitment to this party's Paillier modulus and Ring-Pedersen parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Round1Message {
    pub id: u64,
    pub v: BigNumber,
}

pub struct R1 {
    pub(super) id: u64,
    pub(super) ssid: BigNumber,
    pub(super) curve: CurveParams,
    pub(super) dk: DecryptionKey,
    pub(super) setup: RingPedersen,
    pub(super) prm_proof: prm::Proof,
    pub(super) rho_i: BigNumber,
    pub(super) v_i: BigNumber,
}

impl R1 {
    pub fn round1(self) -> (r2::R2, Round1Message) {
        let msg = Round1Message {
            id: self.id,
            v: self.v_i,
        };

        (
            r2::R2 {
                id: self.id,
                ssid: self.ssid,
                curve: self.curve,
                dk: self.dk,
                setup: self.setup,
                prm_proof: self.prm_proof,
                rho_i: self.rho_i,
            },
            msg,
        )
    }
}

impl WireMessage for Round1Message {
    fn to_wire(&self) -> CggmpResult<Value> {
        Ok(json!({
            "id": self.id,
            "V": int_to_wire(&self.v)?,
        }))
    }

    fn from_wire(value: &Value) -> CggmpResult<Self> {
        Ok(Self {
            id: u64_from_wire(field(value, "id")?)?,
            v: int_from_wire(field(value, "V")?)?,
        })
    }
}
