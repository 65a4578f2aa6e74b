use libpaillier::unknown_order::BigNumber;
use tracing::warn;

use crate::{
    crypto_tools::{curve::CurveParams, k256_serde::SecretScalar, zkp::schnorr},
    sdk::api::{CggmpError, CggmpResult},
};

use super::{r3, KeygenOutputData};

pub struct R4 {
    pub(super) id: u64,
    pub(super) curve: CurveParams,
    pub(super) x_i: SecretScalar,
    pub(super) x_i_point: k256::ProjectivePoint,
    pub(super) srid: BigNumber,
    pub(super) id_j: u64,
    pub(super) x_j_point: k256::ProjectivePoint,
    pub(super) a_j: k256::ProjectivePoint,
}

impl R4 {
    pub fn round_out(self, msg_j: &r3::Round3Message) -> CggmpResult<KeygenOutputData> {
        if r3::proof_commit(self.id_j, &self.srid, &msg_j.sch_x, &msg_j.sch_a) != msg_j.psi {
            warn!(
                "party {} says: proof commitment mismatch from party {}",
                self.id, self.id_j
            );
            return Err(CggmpError::Verification);
        }

        if msg_j.sch_x.commitment().as_ref() != &self.a_j {
            warn!(
                "party {} says: schnorr nonce differs from committed A from party {}",
                self.id, self.id_j
            );
            return Err(CggmpError::Verification);
        }

        let x_ok = schnorr::verify(
            &schnorr::Statement {
                ssid: &self.srid,
                curve: &self.curve,
                target: &self.x_j_point,
            },
            &msg_j.sch_x,
        );
        let a_ok = schnorr::verify(
            &schnorr::Statement {
                ssid: &self.srid,
                curve: &self.curve,
                target: &self.a_j,
            },
            &msg_j.sch_a,
        );
        if !x_ok || !a_ok {
            warn!(
                "party {} says: bad schnorr proof from party {}",
                self.id, self.id_j
            );
            return Err(CggmpError::Verification);
        }

        let x = self.x_i_point + self.x_j_point;

        Ok(KeygenOutputData::new(
            self.id_j,
            self.srid,
            self.x_i,
            self.x_i_point,
            self.x_j_point,
            x,
        ))
    }
}
