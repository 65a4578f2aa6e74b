use rand::{CryptoRng, RngCore};
use serde_json::{json, Value};
use tracing::warn;

use crate::{
    crypto_tools::{
        curve::to_scalar,
        k256_serde::SecretScalar,
        mta,
        paillier::{
            zk::{affg, logstar},
            Ciphertext, Randomness, SecretNumber,
        },
    },
    sdk::{
        api::{CggmpError, CggmpResult, Malformed},
        wire::{
            field, point_from_wire, point_to_wire, proof_from_wire, proof_to_wire,
            scalar_from_wire, scalar_to_wire, WireMessage,
        },
    },
};

use super::{api::Session, r2, r4};

/// `delta_i`, `Delta_i = k_i Gamma` and a proof that `Delta_i` matches `K_i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Round3Message {
    pub delta: k256::Scalar,
    pub big_delta: k256::ProjectivePoint,
    pub proof: logstar::Proof,
}

pub struct R3 {
    pub(super) session: Session,
    pub(super) k_i: SecretScalar,
    pub(super) gamma_i: SecretScalar,
    pub(super) k_ciphertext: Ciphertext,
    pub(super) rho_i: Randomness,
    pub(super) gamma_i_point: k256::ProjectivePoint,
    pub(super) k_j_ciphertext: Ciphertext,
    pub(super) g_j_ciphertext: Ciphertext,
    pub(super) beta: SecretNumber,
    pub(super) beta_hat: SecretNumber,
}

impl R3 {
    pub fn round3(
        self,
        rng: &mut (impl CryptoRng + RngCore),
        msg_j: &r2::Round2Message,
    ) -> CggmpResult<(r4::R4, Round3Message)> {
        let s = &self.session;

        if msg_j.gamma_point == k256::ProjectivePoint::IDENTITY {
            warn!(
                "party {} says: identity Gamma from party {}",
                s.id, s.id_j
            );
            return Err(CggmpError::Malformed(Malformed::Point));
        }

        let alpha = self
            .receive(&msg_j.gamma_point, &msg_j.d, &msg_j.f, &msg_j.affg_gamma)
            .map_err(|e| {
                warn!(
                    "party {} says: bad aff-g proof for Gamma from party {}",
                    s.id, s.id_j
                );
                e
            })?;
        let alpha_hat = self
            .receive(&s.x_j_point, &msg_j.d_hat, &msg_j.f_hat, &msg_j.affg_x)
            .map_err(|e| {
                warn!(
                    "party {} says: bad aff-g proof for X from party {}",
                    s.id, s.id_j
                );
                e
            })?;

        if !s.ek_j.validate_ciphertext(&self.g_j_ciphertext)
            || !logstar::verify(
                &logstar::Statement {
                    ssid: &s.ssid,
                    curve: &s.curve,
                    ek: &s.ek_j,
                    ciphertext: &self.g_j_ciphertext,
                    x: &msg_j.gamma_point,
                    base: &k256::ProjectivePoint::GENERATOR,
                    setup: &s.setup_i,
                },
                &msg_j.logstar_gamma,
            )
        {
            warn!(
                "party {} says: bad log* proof for Gamma from party {}",
                s.id, s.id_j
            );
            return Err(CggmpError::Verification);
        }

        let gamma = self.gamma_i_point + msg_j.gamma_point;
        let big_delta = gamma * self.k_i.as_ref();

        // shares summed over the integers and reduced once
        let k_i = self.k_i.to_bigint();
        let delta = to_scalar(&(&(&self.gamma_i.to_bigint() * &k_i) + &alpha.0 + &self.beta.0));
        let chi = SecretScalar::from(to_scalar(
            &(&(&s.x_i.to_bigint() * &k_i) + &alpha_hat.0 + &self.beta_hat.0),
        ));

        let proof = logstar::prove(
            rng,
            &logstar::Statement {
                ssid: &s.ssid,
                curve: &s.curve,
                ek: s.ek_i(),
                ciphertext: &self.k_ciphertext,
                x: &big_delta,
                base: &gamma,
                setup: &s.setup_j,
            },
            &logstar::Witness {
                x: &k_i,
                rho: &self.rho_i,
            },
        )?;

        let msg = Round3Message {
            delta,
            big_delta,
            proof,
        };

        Ok((
            r4::R4 {
                session: self.session,
                k_i: self.k_i,
                chi_i: chi,
                gamma,
                delta_i: delta,
                big_delta_i: big_delta,
                k_j_ciphertext: self.k_j_ciphertext,
            },
            msg,
        ))
    }

    /// Receiver side of one conversion against our own `K_i`.
    fn receive(
        &self,
        point: &k256::ProjectivePoint,
        d: &Ciphertext,
        f: &Ciphertext,
        proof: &affg::Proof,
    ) -> CggmpResult<SecretNumber> {
        let s = &self.session;
        mta::mta_receive(
            &mta::Statement {
                ssid: &s.ssid,
                curve: &s.curve,
                k_ciphertext: &self.k_ciphertext,
                gamma_point: point,
                ek_receiver: s.ek_i(),
                ek_responder: &s.ek_j,
                setup_receiver: &s.setup_i,
            },
            &s.dk_i,
            d,
            f,
            proof,
        )
    }
}

impl WireMessage for Round3Message {
    fn to_wire(&self) -> CggmpResult<Value> {
        Ok(json!({
            "delta": scalar_to_wire(&self.delta)?,
            "vdelta": point_to_wire(&self.big_delta),
            "psi": proof_to_wire(&self.proof),
        }))
    }

    fn from_wire(value: &Value) -> CggmpResult<Self> {
        Ok(Self {
            delta: scalar_from_wire(field(value, "delta")?)?,
            big_delta: point_from_wire(field(value, "vdelta")?)?,
            proof: proof_from_wire(field(value, "psi")?)?,
        })
    }
}
