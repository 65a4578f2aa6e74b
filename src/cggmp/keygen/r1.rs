use libpaillier::unknown_order::BigNumber;
use serde_json::{json, Value};

use crate::{
    crypto_tools::{curve::CurveParams, k256_serde::SecretScalar},
    sdk::{
        api::CggmpResult,
        wire::{field, int_from_wire, int_to_wire, u64_from_wire, WireMessage},
    },
};

use super::r2;

/// Commitment to this party's keygen contribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Round1Message {
    pub id: u64,
    pub v: BigNumber,
}

pub struct R1 {
    pub(super) id: u64,
    pub(super) curve: CurveParams,
    pub(super) x_i: SecretScalar,
    pub(super) x_i_point: k256::ProjectivePoint,
    pub(super) rid: BigNumber,
    pub(super) alpha: SecretScalar,
    pub(super) a_i: k256::ProjectivePoint,
    pub(super) v_i: BigNumber,
}

impl R1 {
    /// no incoming messages for round 1
    pub fn round1(self) -> (r2::R2, Round1Message) {
        let msg = Round1Message {
            id: self.id,
            v: self.v_i,
        };

        (
            r2::R2 {
                id: self.id,
                curve: self.curve,
                x_i: self.x_i,
                x_i_point: self.x_i_point,
                rid: self.rid,
                alpha: self.alpha,
                a_i: self.a_i,
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
