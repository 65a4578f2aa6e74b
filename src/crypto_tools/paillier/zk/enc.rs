use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    crypto_tools::{
        curve::CurveParams,
        hash::Transcript,
        numbers,
        paillier::{
            utils::{member_of_mod, member_of_mul_group},
            Ciphertext, EncryptionKey, Randomness,
        },
    },
    sdk::api::{BytesVec, CggmpResult},
};

use super::{ints_to_parts, parts_to_array, require_nonzero, ProofParts, RingPedersen};

#[derive(Clone, Debug)]
pub struct Statement<'a> {
    pub ssid: &'a BigNumber,
    pub curve: &'a CurveParams,
    pub ek: &'a EncryptionKey,
    pub ciphertext: &'a Ciphertext,
    /// the verifier's parameters
    pub setup: &'a RingPedersen,
}

#[derive(Clone, Debug)]
pub struct Witness<'a> {
    pub msg: &'a BigNumber,
    pub randomness: &'a Randomness,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    s: BigNumber,
    a: BigNumber,
    c: BigNumber,
    z1: BigNumber,
    z2: BigNumber,
    z3: BigNumber,
}

fn compute_challenge(stmt: &Statement, s: &BigNumber, a: &BigNumber, c: &BigNumber) -> BigNumber {
    Transcript::new()
        .chain_int(stmt.ssid)
        .chain_int(stmt.ek.n())
        .chain_int(&stmt.ek.gamma())
        .chain_int(&stmt.curve.b)
        .chain_int(&stmt.curve.q)
        .chain_int(&stmt.curve.p)
        .chain_int(stmt.setup.n())
        .chain_int(stmt.setup.s())
        .chain_int(stmt.setup.t())
        .chain_int(stmt.ciphertext.as_bigint())
        .chain_ints([s, a, c])
        .challenge(&stmt.curve.q)
}

// statement (ciphertext, ek), witness (msg, randomness)
//   such that ciphertext = Enc(ek, msg, randomness) and msg < q^3
#[allow(clippy::many_single_char_names)]
pub fn prove(
    rng: &mut (impl CryptoRng + RngCore),
    stmt: &Statement,
    wit: &Witness,
) -> CggmpResult<Proof> {
    require_nonzero(
        "enc",
        &[
            stmt.ssid,
            stmt.ek.n(),
            stmt.ciphertext.as_bigint(),
            stmt.setup.n(),
            stmt.setup.s(),
            stmt.setup.t(),
            wit.msg,
            wit.randomness.as_bigint(),
        ],
    )?;

    let n = stmt.ek.n();
    let q = &stmt.curve.q;
    let q3 = stmt.curve.q_pow(3);
    let n_cap = stmt.setup.n();

    // Sample alpha from Z_q^3, mu from Z_(q N^), r from Z*_N, gamma from Z_(q^3 N^)
    let alpha = numbers::sample_below(rng, &q3);
    let mu = numbers::sample_below(rng, &(q * n_cap));
    let r = numbers::sample_unit(rng, n);
    let gamma = numbers::sample_below(rng, &(&q3 * n_cap));

    // s = s^k t^mu mod N^
    let s = stmt.setup.commit(wit.msg, &mu);
    // a = (1+N)^alpha r^N mod N^2
    let a = stmt.ek.encrypt_unchecked(&alpha, &r);
    // c = s^alpha t^gamma mod N^
    let c = stmt.setup.commit(&alpha, &gamma);

    let e = compute_challenge(stmt, &s, &a, &c);

    // z1 = e k + alpha
    let z1 = &e * wit.msg + &alpha;
    // z2 = rho^e r mod N
    let z2 = wit.randomness.0.modpow(&e, n).modmul(&r, n);
    // z3 = e mu + gamma
    let z3 = &e * &mu + &gamma;

    Ok(Proof {
        s,
        a,
        c,
        z1,
        z2,
        z3,
    })
}

pub fn verify(stmt: &Statement, proof: &Proof) -> bool {
    let n = stmt.ek.n();
    let nn = stmt.ek.nn();
    let n_cap = stmt.setup.n();

    if !member_of_mul_group(stmt.ciphertext.as_bigint(), nn) {
        warn!("enc proof: ciphertext not in Z*_N^2");
        return false;
    }

    if !member_of_mod(&proof.z1, &stmt.curve.q_pow(3)) {
        warn!("enc proof: z1 not in Z_q^3");
        return false;
    }

    if !member_of_mul_group(&proof.s, n_cap) || !member_of_mul_group(&proof.c, n_cap) {
        warn!("enc proof: s or c not in Z*_N^");
        return false;
    }

    if !member_of_mul_group(&proof.a, nn) {
        warn!("enc proof: a not in Z*_N^2");
        return false;
    }

    if !member_of_mul_group(&proof.z2, n) {
        warn!("enc proof: z2 not in Z*_N");
        return false;
    }

    let e = compute_challenge(stmt, &proof.s, &proof.a, &proof.c);

    // (1+N)^z1 z2^N == a K^e mod N^2
    let lhs = stmt.ek.encrypt_unchecked(&proof.z1, &proof.z2);
    let rhs = proof
        .a
        .modmul(&stmt.ciphertext.as_bigint().modpow(&e, nn), nn);
    if lhs != rhs {
        warn!("enc proof: paillier check failed");
        return false;
    }

    // s^z1 t^z3 == c S^e mod N^
    let lhs = stmt.setup.commit(&proof.z1, &proof.z3);
    let rhs = proof.c.modmul(&proof.s.modpow(&e, n_cap), n_cap);
    if lhs != rhs {
        warn!("enc proof: ring-pedersen check failed");
        return false;
    }

    true
}

impl ProofParts for Proof {
    const ARITY: usize = 6;
    const NAME: &'static str = "enc";

    fn to_parts(&self) -> Vec<BytesVec> {
        ints_to_parts([&self.s, &self.a, &self.c, &self.z1, &self.z2, &self.z3])
    }

    fn from_checked_parts(parts: &[BytesVec]) -> CggmpResult<Self> {
        let [s, a, c, z1, z2, z3] = parts_to_array(parts)?;
        Ok(Self {
            s,
            a,
            c,
            z1,
            z2,
            z3,
        })
    }
}
