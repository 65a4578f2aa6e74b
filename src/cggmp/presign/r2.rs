use rand::{CryptoRng, RngCore};
use serde_json::{json, Value};
use tracing::warn;

use crate::{
    crypto_tools::{
        k256_serde::SecretScalar,
        mta::{self, MtaOut},
        paillier::{
            zk::{affg, enc, logstar},
            Ciphertext, Randomness,
        },
    },
    sdk::{
        api::{CggmpError, CggmpResult},
        wire::{
            field, int_from_wire, int_to_wire, point_from_wire, point_to_wire, proof_from_wire,
            proof_to_wire, WireMessage,
        },
    },
};

use super::{api::Session, r1, r3};

/// Responses of the two MtA conversions against `K_j`, plus a proof that
/// `Gamma_i` matches `G_i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Round2Message {
    pub gamma_point: k256::ProjectivePoint,
    /// MtA for `gamma_i k_j`
    pub d: Ciphertext,
    /// MtA for `x_i k_j`
    pub d_hat: Ciphertext,
    pub f: Ciphertext,
    pub f_hat: Ciphertext,
    pub affg_gamma: affg::Proof,
    pub affg_x: affg::Proof,
    pub logstar_gamma: logstar::Proof,
}

pub struct R2 {
    pub(super) session: Session,
    pub(super) k_i: SecretScalar,
    pub(super) gamma_i: SecretScalar,
    pub(super) k_ciphertext: Ciphertext,
    pub(super) rho_i: Randomness,
    pub(super) g_ciphertext: Ciphertext,
    pub(super) nu_i: Randomness,
    pub(super) gamma_i_point: k256::ProjectivePoint,
}

impl R2 {
    pub fn round2(
        self,
        rng: &mut (impl CryptoRng + RngCore),
        msg_j: &r1::Round1Message,
    ) -> CggmpResult<(r3::R3, Round2Message)> {
        let s = &self.session;

        if !s.ek_j.validate_ciphertext(&msg_j.k_ciphertext)
            || !s.ek_j.validate_ciphertext(&msg_j.g_ciphertext)
        {
            warn!(
                "party {} says: ciphertext not in Z*_N^2 from party {}",
                s.id, s.id_j
            );
            return Err(CggmpError::Verification);
        }

        if !enc::verify(
            &enc::Statement {
                ssid: &s.ssid,
                curve: &s.curve,
                ek: &s.ek_j,
                ciphertext: &msg_j.k_ciphertext,
                setup: &s.setup_i,
            },
            &msg_j.proof_enc,
        ) {
            warn!(
                "party {} says: bad enc proof from party {}",
                s.id, s.id_j
            );
            return Err(CggmpError::Verification);
        }

        let mta_gamma = respond(rng, s, &msg_j.k_ciphertext, &self.gamma_i_point, &self.gamma_i)?;
        let mta_x = respond(rng, s, &msg_j.k_ciphertext, &s.x_i_point, &s.x_i)?;

        let logstar_gamma = logstar::prove(
            rng,
            &logstar::Statement {
                ssid: &s.ssid,
                curve: &s.curve,
                ek: s.ek_i(),
                ciphertext: &self.g_ciphertext,
                x: &self.gamma_i_point,
                base: &k256::ProjectivePoint::GENERATOR,
                setup: &s.setup_j,
            },
            &logstar::Witness {
                x: &self.gamma_i.to_bigint(),
                rho: &self.nu_i,
            },
        )?;

        let MtaOut {
            d,
            f,
            beta,
            proof: affg_gamma,
            ..
        } = mta_gamma;
        let MtaOut {
            d: d_hat,
            f: f_hat,
            beta: beta_hat,
            proof: affg_x,
            ..
        } = mta_x;

        let msg = Round2Message {
            gamma_point: self.gamma_i_point,
            d,
            d_hat,
            f,
            f_hat,
            affg_gamma,
            affg_x,
            logstar_gamma,
        };

        Ok((
            r3::R3 {
                session: self.session,
                k_i: self.k_i,
                gamma_i: self.gamma_i,
                k_ciphertext: self.k_ciphertext,
                rho_i: self.rho_i,
                gamma_i_point: self.gamma_i_point,
                k_j_ciphertext: msg_j.k_ciphertext.clone(),
                g_j_ciphertext: msg_j.g_ciphertext.clone(),
                beta,
                beta_hat,
            },
            msg,
        ))
    }
}

/// One MtA response to `K_j` for the secret behind `point`.
fn respond(
    rng: &mut (impl CryptoRng + RngCore),
    s: &Session,
    k_j_ciphertext: &Ciphertext,
    point: &k256::ProjectivePoint,
    secret: &SecretScalar,
) -> CggmpResult<MtaOut> {
    mta::mta_response(
        rng,
        &mta::Statement {
            ssid: &s.ssid,
            curve: &s.curve,
            k_ciphertext: k_j_ciphertext,
            gamma_point: point,
            ek_receiver: &s.ek_j,
            ek_responder: s.ek_i(),
            setup_receiver: &s.setup_j,
        },
        secret.as_ref(),
    )
}

impl WireMessage for Round2Message {
    fn to_wire(&self) -> CggmpResult<Value> {
        Ok(json!({
            "Gamma": point_to_wire(&self.gamma_point),
            "D": int_to_wire(self.d.as_bigint())?,
            "_D": int_to_wire(self.d_hat.as_bigint())?,
            "F": int_to_wire(self.f.as_bigint())?,
            "_F": int_to_wire(self.f_hat.as_bigint())?,
            "psi_affg_gamma": proof_to_wire(&self.affg_gamma),
            "psi_affg_xi": proof_to_wire(&self.affg_x),
            "psi_logstar_gamma": proof_to_wire(&self.logstar_gamma),
        }))
    }

    fn from_wire(value: &Value) -> CggmpResult<Self> {
        Ok(Self {
            gamma_point: point_from_wire(field(value, "Gamma")?)?,
            d: int_from_wire(field(value, "D")?)?.into(),
            d_hat: int_from_wire(field(value, "_D")?)?.into(),
            f: int_from_wire(field(value, "F")?)?.into(),
            f_hat: int_from_wire(field(value, "_F")?)?.into(),
            affg_gamma: proof_from_wire(field(value, "psi_affg_gamma")?)?,
            affg_x: proof_from_wire(field(value, "psi_affg_xi")?)?,
            logstar_gamma: proof_from_wire(field(value, "psi_logstar_gamma")?)?,
        })
    }
}
