use libpaillier::unknown_order::BigNumber;
use serde_json::{json, Value};

use crate::{
    crypto_tools::{curve::CurveParams, k256_serde::SecretScalar},
    sdk::{
        api::CggmpResult,
        wire::{field, int_from_wire, int_to_wire, point_from_wire, point_to_wire, WireMessage},
    },
};

use super::{r1, r3};

/// Opening of the round 1 commitment.
#[derive(Debug, Clone, PartialEq)]
pub struct Round2Message {
    pub rid: BigNumber,
    pub x: k256::ProjectivePoint,
    pub a: k256::ProjectivePoint,
}

pub struct R2 {
    pub(super) id: u64,
    pub(super) curve: CurveParams,
    pub(super) x_i: SecretScalar,
    pub(super) x_i_point: k256::ProjectivePoint,
    pub(super) rid: BigNumber,
    pub(super) alpha: SecretScalar,
    pub(super) a_i: k256::ProjectivePoint,
}

impl R2 {
    /// The peer's commitment is only stored here; it is checked in round 3.
    pub fn round2(self, msg_j: &r1::Round1Message) -> (r3::R3, Round2Message) {
        let msg = Round2Message {
            rid: self.rid.clone(),
            x: self.x_i_point,
            a: self.a_i,
        };

        (
            r3::R3 {
                id: self.id,
                curve: self.curve,
                x_i: self.x_i,
                x_i_point: self.x_i_point,
                rid: self.rid,
                alpha: self.alpha,
                a_i: self.a_i,
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
            "rid": int_to_wire(&self.rid)?,
            "X": point_to_wire(&self.x),
            "A": point_to_wire(&self.a),
        }))
    }

    fn from_wire(value: &Value) -> CggmpResult<Self> {
        Ok(Self {
            rid: int_from_wire(field(value, "rid")?)?,
            x: point_from_wire(field(value, "X")?)?,
            a: point_from_wire(field(value, "A")?)?,
        })
    }
}
