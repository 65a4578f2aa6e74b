use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde_json::{json, Value};
use tracing::warn;

use crate::{
    crypto_tools::{
        constants::KEYGEN_PROOF_COMMIT_TAG,
        curve::{to_bigint, CurveParams},
        hash::Transcript,
        k256_serde::SecretScalar,
        numbers,
        zkp::schnorr,
    },
    sdk::{
        api::{CggmpError, CggmpResult, Malformed},
        wire::{field, int_from_wire, int_to_wire, proof_from_wire, proof_to_wire, WireMessage},
    },
};

use super::{api::commit, r2, r4};

/// Proofs of knowledge of `x_i` and of the nonce behind `A_i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Round3Message {
    pub sch_x: schnorr::Proof,
    pub sch_a: schnorr::Proof,
    pub psi: BigNumber,
}

pub struct R3 {
    pub(super) id: u64,
    pub(super) curve: CurveParams,
    pub(super) x_i: SecretScalar,
    pub(super) x_i_point: k256::ProjectivePoint,
    pub(super) rid: BigNumber,
    pub(super) alpha: SecretScalar,
    pub(super) a_i: k256::ProjectivePoint,
    pub(super) id_j: u64,
    pub(super) v_j: BigNumber,
}

impl R3 {
    pub fn round3(
        self,
        rng: &mut (impl CryptoRng + RngCore),
        msg_j: &r2::Round2Message,
    ) -> CggmpResult<(r4::R4, Round3Message)> {
        if commit(self.id_j, &msg_j.rid, &msg_j.x, &msg_j.a) != self.v_j {
            warn!(
                "party {} says: commitment mismatch from party {}",
                self.id, self.id_j
            );
            return Err(CggmpError::Verification);
        }
        if msg_j.x == k256::ProjectivePoint::IDENTITY {
            warn!(
                "party {} says: identity public share from party {}",
                self.id, self.id_j
            );
            return Err(CggmpError::Malformed(Malformed::Point));
        }

        let srid = numbers::xor(&self.rid, &msg_j.rid);

        // sch_x reuses the nonce committed to by A_i
        let sch_x = schnorr::prove_with_nonce(
            &schnorr::Statement {
                ssid: &srid,
                curve: &self.curve,
                target: &self.x_i_point,
            },
            &schnorr::Witness {
                scalar: self.x_i.as_ref(),
            },
            &self.alpha,
        );
        let sch_a = schnorr::prove(
            rng,
            &schnorr::Statement {
                ssid: &srid,
                curve: &self.curve,
                target: &self.a_i,
            },
            &schnorr::Witness {
                scalar: self.alpha.as_ref(),
            },
        );
        let psi = proof_commit(self.id, &srid, &sch_x, &sch_a);

        Ok((
            r4::R4 {
                id: self.id,
                curve: self.curve,
                x_i: self.x_i,
                x_i_point: self.x_i_point,
                srid,
                id_j: self.id_j,
                x_j_point: msg_j.x,
                a_j: msg_j.a,
            },
            Round3Message { sch_x, sch_a, psi },
        ))
    }
}

/// `psi = H(id, srid, x(A_x), z_x, x(A_a), z_a)`
pub(super) fn proof_commit(
    id: u64,
    srid: &BigNumber,
    sch_x: &schnorr::Proof,
    sch_a: &schnorr::Proof,
) -> BigNumber {
    let (a_x, _) = sch_x.commitment().hash_coordinates();
    let (a_a, _) = sch_a.commitment().hash_coordinates();
    Transcript::tagged(KEYGEN_PROOF_COMMIT_TAG)
        .chain_int(&BigNumber::from(id))
        .chain_int(srid)
        .chain_int(&a_x)
        .chain_int(&to_bigint(sch_x.response()))
        .chain_int(&a_a)
        .chain_int(&to_bigint(sch_a.response()))
        .finalize()
}

impl WireMessage for Round3Message {
    fn to_wire(&self) -> CggmpResult<Value> {
        Ok(json!({
            "schX": proof_to_wire(&self.sch_x),
            "schA": proof_to_wire(&self.sch_a),
            "psi": int_to_wire(&self.psi)?,
        }))
    }

    fn from_wire(value: &Value) -> CggmpResult<Self> {
        Ok(Self {
            sch_x: proof_from_wire(field(value, "schX")?)?,
            sch_a: proof_from_wire(field(value, "schA")?)?,
            psi: int_from_wire(field(value, "psi")?)?,
        })
    }
}
