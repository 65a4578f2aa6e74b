//! Multiplicative-to-additive share conversion.
//!
//! Party `i` holds a secret `gamma` and receives `K = Enc_j(k)`. It answers with
//! `D = K^gamma Enc_j(beta_neg)` and keeps `beta = q^5 - beta_neg`, so that
//! after party `j` decrypts `alpha = Dec_j(D)` we get `alpha + beta = gamma k mod q`.
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use tracing::warn;

use crate::{
    crypto_tools::{
        constants::MTA_BLINDING_TAG,
        curve::CurveParams,
        hash::Transcript,
        numbers,
        paillier::{
            zk::{affg, RingPedersen},
            Ciphertext, DecryptionKey, EncryptionKey, Plaintext, Randomness, SecretNumber,
        },
    },
    sdk::api::{CggmpError, CggmpResult},
};

/// Public inputs of one conversion, shared by both sides.
#[derive(Clone, Debug)]
pub struct Statement<'a> {
    pub ssid: &'a BigNumber,
    pub curve: &'a CurveParams,
    /// `Enc_j(k)`
    pub k_ciphertext: &'a Ciphertext,
    /// `gamma G`
    pub gamma_point: &'a k256::ProjectivePoint,
    /// the receiver's key, encrypts `k` and `D`
    pub ek_receiver: &'a EncryptionKey,
    /// the responder's key, encrypts `F`
    pub ek_responder: &'a EncryptionKey,
    /// the receiver's parameters
    pub setup_receiver: &'a RingPedersen,
}

/// The responder's output. `d`, `f` and `proof` go to the receiver.
#[derive(Clone, Debug)]
pub struct MtaOut {
    pub d: Ciphertext,
    pub f: Ciphertext,
    /// randomness of `Enc_j(beta_neg)` inside `d`
    pub s: Randomness,
    /// randomness of `f`
    pub r: Randomness,
    /// additive share, deliberately not reduced mod `q`
    pub beta: SecretNumber,
    pub proof: affg::Proof,
}

/// Blinding `beta_neg` uniform in `[0, q^5)`, bound to the session id and a
/// fresh nonce.
fn sample_blinding(
    rng: &mut (impl CryptoRng + RngCore),
    ssid: &BigNumber,
    q5: &BigNumber,
) -> BigNumber {
    let mut nonce = [0u8; 32];
    rng.fill_bytes(&mut nonce);
    let seed = Transcript::tagged(MTA_BLINDING_TAG)
        .chain_int(ssid)
        .chain_int(&numbers::from_be_bytes(&nonce))
        .finalize();
    numbers::rejection_sample(q5, &seed)
}

pub fn mta_response(
    rng: &mut (impl CryptoRng + RngCore),
    stmt: &Statement,
    gamma: &k256::Scalar,
) -> CggmpResult<MtaOut> {
    let q5 = stmt.curve.q_pow(5);
    let gamma = Plaintext::from_scalar(gamma);

    let beta_neg = sample_blinding(rng, stmt.ssid, &q5);
    let beta = &q5 - &beta_neg;

    // D = K^gamma Enc_j(beta_neg, s)
    let (blinding_j, s) = stmt
        .ek_receiver
        .encrypt(rng, &Plaintext::from(beta_neg.clone()))?;
    let d = stmt.ek_receiver.add(
        &stmt.ek_receiver.mul(stmt.k_ciphertext, &gamma),
        &blinding_j,
    );

    // F = Enc_i(beta_neg, r)
    let (f, r) = stmt
        .ek_responder
        .encrypt(rng, &Plaintext::from(beta_neg.clone()))?;

    let proof = affg::prove(
        rng,
        &affg_statement(stmt, &d, &f),
        &affg::Witness {
            x: gamma.as_bigint(),
            y: &beta_neg,
            rho: &s,
            rho_y: &r,
        },
    )?;

    Ok(MtaOut {
        d,
        f,
        s,
        r,
        beta: SecretNumber(beta),
        proof,
    })
}

/// Verify the responder's proof and decrypt the receiver's share `alpha`.
pub fn mta_receive(
    stmt: &Statement,
    dk_receiver: &DecryptionKey,
    d: &Ciphertext,
    f: &Ciphertext,
    proof: &affg::Proof,
) -> CggmpResult<SecretNumber> {
    if !affg::verify(&affg_statement(stmt, d, f), proof) {
        warn!("mta: aff-g proof failed");
        return Err(CggmpError::Verification);
    }
    let alpha = dk_receiver.decrypt(d).map_err(|_| CggmpError::Verification)?;
    Ok(SecretNumber(alpha.as_bigint().clone()))
}

fn affg_statement<'a>(
    stmt: &'a Statement,
    d: &'a Ciphertext,
    f: &'a Ciphertext,
) -> affg::Statement<'a> {
    affg::Statement {
        ssid: stmt.ssid,
        curve: stmt.curve,
        ek0: stmt.ek_receiver,
        ek1: stmt.ek_responder,
        setup: stmt.setup_receiver,
        c: stmt.k_ciphertext,
        d,
        y: f,
        x: stmt.gamma_point,
    }
}
