//! Knowledge of `x, rho` with `C = Enc(x, rho)` and `X = x g` for an
//! arbitrary base point `g`.
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    crypto_tools::{
        curve::{to_scalar, CurveParams},
        hash::Transcript,
        k256_serde::ProjectivePoint,
        numbers,
        paillier::{
            utils::{member_of_mod, member_of_mul_group},
            Ciphertext, EncryptionKey, Randomness,
        },
    },
    sdk::api::{BytesVec, CggmpResult},
};

use super::{
    ints_to_parts, parts_to_array, point_from_ints, point_to_parts, require_nonzero, ProofParts,
    RingPedersen,
};

#[derive(Clone, Debug)]
pub struct Statement<'a> {
    pub ssid: &'a BigNumber,
    pub curve: &'a CurveParams,
    pub ek: &'a EncryptionKey,
    pub ciphertext: &'a Ciphertext,
    pub x: &'a k256::ProjectivePoint,
    pub base: &'a k256::ProjectivePoint,
    /// the verifier's parameters
    pub setup: &'a RingPedersen,
}

#[derive(Clone, Debug)]
pub struct Witness<'a> {
    pub x: &'a BigNumber,
    pub rho: &'a Randomness,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    s: BigNumber,
    a: BigNumber,
    y: ProjectivePoint,
    d: BigNumber,
    z1: BigNumber,
    z2: BigNumber,
    z3: BigNumber,
}

fn compute_challenge(
    stmt: &Statement,
    s: &BigNumber,
    a: &BigNumber,
    y: &ProjectivePoint,
    d: &BigNumber,
) -> BigNumber {
    Transcript::new()
        .chain_int(stmt.ssid)
        .chain_int(stmt.ek.n())
        .chain_int(&stmt.ek.gamma())
        .chain_int(&stmt.curve.b)
        .chain_int(&stmt.curve.q)
        .chain_int(&stmt.curve.p)
        .chain_int(stmt.ciphertext.as_bigint())
        .chain_k256_point(stmt.x)
        .chain_k256_point(stmt.base)
        .chain_ints([s, a])
        .chain_point(y)
        .chain_int(d)
        .chain_int(stmt.setup.n())
        .chain_int(stmt.setup.s())
        .chain_int(stmt.setup.t())
        .challenge(&stmt.curve.q)
}

#[allow(clippy::many_single_char_names)]
pub fn prove(
    rng: &mut (impl CryptoRng + RngCore),
    stmt: &Statement,
    wit: &Witness,
) -> CggmpResult<Proof> {
    require_nonzero(
        "log*",
        &[
            stmt.ssid,
            stmt.ek.n(),
            stmt.ciphertext.as_bigint(),
            stmt.setup.n(),
            stmt.setup.s(),
            stmt.setup.t(),
            wit.x,
            wit.rho.as_bigint(),
        ],
    )?;

    let n = stmt.ek.n();
    let q = &stmt.curve.q;
    let q3 = stmt.curve.q_pow(3);
    let n_cap = stmt.setup.n();

    let alpha = numbers::sample_below(rng, &q3);
    let mu = numbers::sample_below(rng, &(q * n_cap));
    let gamma = numbers::sample_below(rng, &(&q3 * n_cap));
    let r = numbers::sample_unit(rng, n);

    // s = s^x t^mu mod N^
    let s = stmt.setup.commit(wit.x, &mu);
    // a = (1+N)^alpha r^N mod N^2
    let a = stmt.ek.encrypt_unchecked(&alpha, &r);
    // y = alpha g
    let y = ProjectivePoint::from(stmt.base * &to_scalar(&alpha));
    // d = s^alpha t^gamma mod N^
    let d = stmt.setup.commit(&alpha, &gamma);

    let e = compute_challenge(stmt, &s, &a, &y, &d);

    let z1 = &e * wit.x + &alpha;
    let z2 = wit.rho.0.modpow(&e, n).modmul(&r, n);
    let z3 = &e * &mu + &gamma;

    Ok(Proof {
        s,
        a,
        y,
        d,
        z1,
        z2,
        z3,
    })
}

pub fn verify(stmt: &Statement, proof: &Proof) -> bool {
    let n = stmt.ek.n();
    let nn = stmt.ek.nn();
    let n_cap = stmt.setup.n();

    if !member_of_mod(&proof.z1, &stmt.curve.q_pow(3)) {
        warn!("log* proof: z1 not in Z_q^3");
        return false;
    }
    if !member_of_mul_group(&proof.s, n_cap) || !member_of_mul_group(&proof.d, n_cap) {
        warn!("log* proof: s or d not in Z*_N^");
        return false;
    }
    if !member_of_mul_group(&proof.a, nn) {
        warn!("log* proof: a not in Z*_N^2");
        return false;
    }
    if !member_of_mul_group(&proof.z2, n) {
        warn!("log* proof: z2 not in Z*_N");
        return false;
    }

    let e = compute_challenge(stmt, &proof.s, &proof.a, &proof.y, &proof.d);

    // (1+N)^z1 z2^N == C^e a mod N^2
    let lhs = stmt.ek.encrypt_unchecked(&proof.z1, &proof.z2);
    let rhs = stmt
        .ciphertext
        .as_bigint()
        .modpow(&e, nn)
        .modmul(&proof.a, nn);
    if lhs != rhs {
        warn!("log* proof: paillier check failed");
        return false;
    }

    // z1 g == e X + y
    let lhs = stmt.base * &to_scalar(&proof.z1);
    let rhs = stmt.x * &to_scalar(&e) + proof.y.as_ref();
    if lhs != rhs {
        warn!("log* proof: curve check failed");
        return false;
    }

    // s^z1 t^z3 == d S^e mod N^
    let lhs = stmt.setup.commit(&proof.z1, &proof.z3);
    let rhs = proof.d.modmul(&proof.s.modpow(&e, n_cap), n_cap);
    if lhs != rhs {
        warn!("log* proof: ring-pedersen check failed");
        return false;
    }

    true
}

impl ProofParts for Proof {
    const ARITY: usize = 8;
    const NAME: &'static str = "log*";

    fn to_parts(&self) -> Vec<BytesVec> {
        let [y_x, y_y] = point_to_parts(&self.y);
        let mut parts = ints_to_parts([&self.s, &self.a]);
        parts.extend([y_x, y_y]);
        parts.extend(ints_to_parts([&self.d, &self.z1, &self.z2, &self.z3]));
        parts
    }

    fn from_checked_parts(parts: &[BytesVec]) -> CggmpResult<Self> {
        let [s, a, y_x, y_y, d, z1, z2, z3] = parts_to_array(parts)?;
        Ok(Self {
            s,
            a,
            y: point_from_ints(&y_x, &y_y, Self::NAME)?,
            d,
            z1,
            z2,
            z3,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_tools::{
        k256_serde::random_nonzero_scalar,
        paillier::zk::test_setup::{
            check_wire_arity, corrupt_part, prover_and_setup, wire_trip, zeroed_on_the_wire,
        },
    };
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn basic_correctness() {
        let mut rng = rand::thread_rng();
        let curve = CurveParams::secp256k1();
        let (ek, _, setup) = prover_and_setup();
        let ssid = BigNumber::from(99u64);

        // an arbitrary base point, not the generator
        let base = k256::ProjectivePoint::GENERATOR * random_nonzero_scalar(&mut rng);
        let x = numbers::sample_nonzero_below(&mut rng, &curve.q);
        let (ciphertext, rho) = ek.encrypt(&mut rng, &x.clone().into()).unwrap();
        let x_point = base * to_scalar(&x);

        let stmt = Statement {
            ssid: &ssid,
            curve: &curve,
            ek: &ek,
            ciphertext: &ciphertext,
            x: &x_point,
            base: &base,
            setup: &setup,
        };
        let wit = Witness { x: &x, rho: &rho };

        // test: valid proof
        let proof = prove(&mut rng, &stmt, &wit).unwrap();
        assert!(verify(&stmt, &proof));

        // test: JSON round trip, a zero field and a list of the wrong length
        let decoded = wire_trip(&proof);
        assert_eq!(decoded, proof);
        assert!(verify(&stmt, &decoded));
        let zeroed = zeroed_on_the_wire(&proof, 5);
        assert!(!verify(&stmt, &zeroed));
        check_wire_arity(&proof);

        // test: same statement over the generator
        let generator = k256::ProjectivePoint::GENERATOR;
        let bad_stmt = Statement {
            base: &generator,
            ..stmt.clone()
        };
        assert!(!verify(&bad_stmt, &proof));

        // test: every corrupted field; y coordinates leave the curve
        let parts = proof.to_parts();
        assert_eq!(Proof::from_parts(&parts).unwrap(), proof);
        for i in 0..Proof::ARITY {
            match Proof::from_parts(&corrupt_part(&parts, i)) {
                Ok(bad_proof) => assert!(!verify(&stmt, &bad_proof), "field {} corrupted", i),
                Err(_) => assert!(i == 2 || i == 3, "field {} failed to decode", i),
            }
        }

        // test: bad witness
        let bad_x = &x + &BigNumber::one();
        let bad_wit = Witness {
            x: &bad_x,
            ..wit.clone()
        };
        let bad_proof = prove(&mut rng, &stmt, &bad_wit).unwrap();
        assert!(!verify(&stmt, &bad_proof));

        // test: zero randomness refused
        let zero: Randomness = BigNumber::zero().into();
        let zero_wit = Witness { rho: &zero, ..wit };
        assert!(prove(&mut rng, &stmt, &zero_wit).is_err());
    }
}
