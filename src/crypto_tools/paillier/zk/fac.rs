//! No small factor proof: `N0 = p q` with both factors near `sqrt(N0)`.
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    crypto_tools::{
        curve::CurveParams,
        hash::Transcript,
        numbers,
        paillier::utils::{member_of_mod, member_of_mul_group},
    },
    sdk::api::{BytesVec, CggmpError, CggmpResult, Malformed},
};

use super::{ints_to_parts, parts_to_array, require_nonzero, ProofParts, RingPedersen};

#[derive(Clone, Debug)]
pub struct Statement<'a> {
    pub ssid: &'a BigNumber,
    pub curve: &'a CurveParams,
    pub n0: &'a BigNumber,
    /// the verifier's parameters
    pub setup: &'a RingPedersen,
}

#[derive(Clone, Debug)]
pub struct Witness<'a> {
    pub p: &'a BigNumber,
    pub q: &'a BigNumber,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    p: BigNumber,
    q: BigNumber,
    a: BigNumber,
    b: BigNumber,
    t: BigNumber,
    sigma: BigNumber,
    z1: BigNumber,
    z2: BigNumber,
    w1: BigNumber,
    w2: BigNumber,
    v: BigNumber,
}

impl Proof {
    fn commitments(&self) -> [&BigNumber; 6] {
        [&self.p, &self.q, &self.a, &self.b, &self.t, &self.sigma]
    }
}

fn compute_challenge(stmt: &Statement, commitments: [&BigNumber; 6]) -> BigNumber {
    Transcript::new()
        .chain_int(stmt.ssid)
        .chain_int(stmt.n0)
        .chain_int(stmt.setup.n())
        .chain_int(stmt.setup.s())
        .chain_int(stmt.setup.t())
        .chain_ints(commitments)
        .chain_int(&stmt.curve.b)
        .chain_int(&stmt.curve.q)
        .chain_int(&stmt.curve.p)
        .challenge(&stmt.curve.q)
}

/// Range bound `q^3 sqrt(N0)` of the responses `z1, z2`.
fn response_bound(stmt: &Statement) -> BigNumber {
    stmt.curve.q_pow(3) * numbers::isqrt(stmt.n0)
}

#[allow(clippy::many_single_char_names)]
pub fn prove(
    rng: &mut (impl CryptoRng + RngCore),
    stmt: &Statement,
    wit: &Witness,
) -> CggmpResult<Proof> {
    require_nonzero(
        "fac",
        &[
            stmt.ssid,
            stmt.n0,
            stmt.setup.n(),
            stmt.setup.s(),
            stmt.setup.t(),
            wit.p,
            wit.q,
        ],
    )?;

    let q = &stmt.curve.q;
    let q3 = stmt.curve.q_pow(3);
    let n_cap = stmt.setup.n();
    let bound = response_bound(stmt);
    let q_n_cap = q * n_cap;
    let q3_n_cap = &q3 * n_cap;

    let alpha = numbers::sample_below(rng, &bound);
    let beta = numbers::sample_below(rng, &bound);
    let mu = numbers::sample_below(rng, &q_n_cap);
    let nu = numbers::sample_below(rng, &q_n_cap);
    let sigma = numbers::sample_below(rng, &(&q_n_cap * stmt.n0));
    let x = numbers::sample_below(rng, &q3_n_cap);
    let y = numbers::sample_below(rng, &q3_n_cap);
    let r = numbers::sample_below(rng, &(&q3_n_cap * stmt.n0));

    let p_commit = stmt.setup.commit(wit.p, &mu);
    let q_commit = stmt.setup.commit(wit.q, &nu);
    let a = stmt.setup.commit(&alpha, &x);
    let b = stmt.setup.commit(&beta, &y);
    // t = Q^alpha t^r mod N^
    let t = q_commit
        .modpow(&alpha, n_cap)
        .modmul(&stmt.setup.t().modpow(&r, n_cap), n_cap);

    let e = compute_challenge(stmt, [&p_commit, &q_commit, &a, &b, &t, &sigma]);

    let z1 = &e * wit.p + &alpha;
    let z2 = &e * wit.q + &beta;
    let w1 = &e * &mu + &x;
    let w2 = &e * &nu + &y;
    let v = &e * &(&sigma - &(&nu * wit.p)) + &r;

    // negative only with probability about 1/sqrt(N0)
    if v < BigNumber::zero() {
        error!("fac proof: negative response, retry with fresh randomness");
        return Err(CggmpError::Malformed(Malformed::ProofInput));
    }

    Ok(Proof {
        p: p_commit,
        q: q_commit,
        a,
        b,
        t,
        sigma,
        z1,
        z2,
        w1,
        w2,
        v,
    })
}

pub fn verify(stmt: &Statement, proof: &Proof) -> bool {
    let n_cap = stmt.setup.n();
    let bound = response_bound(stmt);

    if !member_of_mod(&proof.z1, &bound) || !member_of_mod(&proof.z2, &bound) {
        warn!("fac proof: z1 or z2 out of range");
        return false;
    }
    if [&proof.p, &proof.q, &proof.a, &proof.b, &proof.t]
        .iter()
        .any(|v| !member_of_mul_group(v, n_cap))
    {
        warn!("fac proof: commitment not in Z*_N^");
        return false;
    }
    if [&proof.sigma, &proof.w1, &proof.w2, &proof.v]
        .iter()
        .any(|v| **v < BigNumber::zero())
    {
        warn!("fac proof: negative response");
        return false;
    }

    let e = compute_challenge(stmt, proof.commitments());

    // s^z1 t^w1 == A P^e mod N^
    let lhs = stmt.setup.commit(&proof.z1, &proof.w1);
    let rhs = proof.a.modmul(&proof.p.modpow(&e, n_cap), n_cap);
    if lhs != rhs {
        warn!("fac proof: p commitment check failed");
        return false;
    }

    // s^z2 t^w2 == B Q^e mod N^
    let lhs = stmt.setup.commit(&proof.z2, &proof.w2);
    let rhs = proof.b.modmul(&proof.q.modpow(&e, n_cap), n_cap);
    if lhs != rhs {
        warn!("fac proof: q commitment check failed");
        return false;
    }

    // Q^z1 t^v == T (s^N0 t^sigma)^e mod N^
    let r = stmt.setup.commit(stmt.n0, &proof.sigma);
    let lhs = proof
        .q
        .modpow(&proof.z1, n_cap)
        .modmul(&stmt.setup.t().modpow(&proof.v, n_cap), n_cap);
    let rhs = proof.t.modmul(&r.modpow(&e, n_cap), n_cap);
    if lhs != rhs {
        warn!("fac proof: product check failed");
        return false;
    }

    true
}

impl ProofParts for Proof {
    const ARITY: usize = 11;
    const NAME: &'static str = "fac";

    fn to_parts(&self) -> Vec<BytesVec> {
        let mut parts = ints_to_parts(self.commitments());
        parts.extend(ints_to_parts([
            &self.z1, &self.z2, &self.w1, &self.w2, &self.v,
        ]));
        parts
    }

    fn from_checked_parts(parts: &[BytesVec]) -> CggmpResult<Self> {
        let [p, q, a, b, t, sigma, z1, z2, w1, w2, v] = parts_to_array(parts)?;
        Ok(Self {
            p,
            q,
            a,
            b,
            t,
            sigma,
            z1,
            z2,
            w1,
            w2,
            v,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_tools::paillier::zk::test_setup::{
        check_wire_arity, corrupt_part, prover_and_setup, wire_trip, zeroed_on_the_wire,
    };
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn basic_correctness() {
        let mut rng = rand::thread_rng();
        let curve = CurveParams::secp256k1();
        let (ek, dk, setup) = prover_and_setup();
        let ssid = BigNumber::from(5u64);

        let stmt = Statement {
            ssid: &ssid,
            curve: &curve,
            n0: ek.n(),
            setup: &setup,
        };
        let wit = Witness {
            p: dk.p(),
            q: dk.q(),
        };

        // test: valid proof
        let proof = prove(&mut rng, &stmt, &wit).unwrap();
        assert!(verify(&stmt, &proof));

        // test: JSON round trip, a zero field and a list of the wrong length
        let decoded = wire_trip(&proof);
        assert_eq!(decoded, proof);
        assert!(verify(&stmt, &decoded));
        let zeroed = zeroed_on_the_wire(&proof, 6);
        assert!(!verify(&stmt, &zeroed));
        check_wire_arity(&proof);

        // test: every corrupted field
        let parts = proof.to_parts();
        assert_eq!(Proof::from_parts(&parts).unwrap(), proof);
        for i in 0..Proof::ARITY {
            let bad_proof = Proof::from_parts(&corrupt_part(&parts, i)).unwrap();
            assert!(!verify(&stmt, &bad_proof), "field {} corrupted", i);
        }

        // test: factors of another modulus
        let bad_p = dk.p() + &BigNumber::from(2u64);
        let bad_wit = Witness {
            p: &bad_p,
            ..wit
        };
        let bad_proof = prove(&mut rng, &stmt, &bad_wit).unwrap();
        assert!(!verify(&stmt, &bad_proof));
    }

    #[test]
    #[traced_test]
    fn small_factor_rejected() {
        let mut rng = rand::thread_rng();
        let curve = CurveParams::secp256k1();
        let (ek, _, setup) = prover_and_setup();
        let ssid = BigNumber::from(6u64);

        // N0 = 3 (N0 / 3) is a valid product but z2 exceeds the range bound
        let n0 = ek.n() * &BigNumber::from(3u64);
        let stmt = Statement {
            ssid: &ssid,
            curve: &curve,
            n0: &n0,
            setup: &setup,
        };
        let three = BigNumber::from(3u64);
        let wit = Witness {
            p: &three,
            q: ek.n(),
        };
        let proof = prove(&mut rng, &stmt, &wit).unwrap();
        assert!(!verify(&stmt, &proof));
    }
}
