use tracing::warn;

use crate::{
    crypto_tools::{
        k256_serde::SecretScalar,
        paillier::{zk::logstar, Ciphertext},
    },
    sdk::api::{CggmpError, CggmpResult},
};

use super::{api::Session, r3, PresigOutputData};

pub struct R4 {
    pub(super) session: Session,
    pub(super) k_i: SecretScalar,
    pub(super) chi_i: SecretScalar,
    pub(super) gamma: k256::ProjectivePoint,
    pub(super) delta_i: k256::Scalar,
    pub(super) big_delta_i: k256::ProjectivePoint,
    pub(super) k_j_ciphertext: Ciphertext,
}

impl R4 {
    pub fn round_out(self, msg_j: &r3::Round3Message) -> CggmpResult<PresigOutputData> {
        let s = &self.session;

        if !logstar::verify(
            &logstar::Statement {
                ssid: &s.ssid,
                curve: &s.curve,
                ek: &s.ek_j,
                ciphertext: &self.k_j_ciphertext,
                x: &msg_j.big_delta,
                base: &self.gamma,
                setup: &s.setup_i,
            },
            &msg_j.proof,
        ) {
            warn!(
                "party {} says: bad log* proof for Delta from party {}",
                s.id, s.id_j
            );
            return Err(CggmpError::Verification);
        }

        let delta = self.delta_i + msg_j.delta;
        if k256::ProjectivePoint::GENERATOR * delta != self.big_delta_i + msg_j.big_delta {
            warn!(
                "party {} says: delta inconsistent with Delta from party {}",
                s.id, s.id_j
            );
            return Err(CggmpError::Verification);
        }

        let delta_inv = Option::<k256::Scalar>::from(delta.invert()).ok_or_else(|| {
            warn!("party {} says: delta is zero", s.id);
            CggmpError::Verification
        })?;

        let r_point = self.gamma * delta_inv;

        Ok(PresigOutputData::new(r_point, self.k_i, self.chi_i))
    }
}
