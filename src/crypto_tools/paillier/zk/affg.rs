//! Paillier affine operation with group commitment in range.
//!
//! The prover knows `x, y` such that `D = C^x Enc_0(y, rho)`,
//! `Y = Enc_1(y, rho_y)` and `X = x G`, with `x < q` and `y < q^5`.
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
    /// key of `c` and `d`, the verifier's
    pub ek0: &'a EncryptionKey,
    /// key of `y`, the prover's
    pub ek1: &'a EncryptionKey,
    /// the verifier's parameters
    pub setup: &'a RingPedersen,
    pub c: &'a Ciphertext,
    pub d: &'a Ciphertext,
    pub y: &'a Ciphertext,
    pub x: &'a k256::ProjectivePoint,
}

#[derive(Clone, Debug)]
pub struct Witness<'a> {
    pub x: &'a BigNumber,
    pub y: &'a BigNumber,
    pub rho: &'a Randomness,
    pub rho_y: &'a Randomness,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    s: BigNumber,
    t: BigNumber,
    a: BigNumber,
    bx: ProjectivePoint,
    by: BigNumber,
    e: BigNumber,
    f: BigNumber,
    z1: BigNumber,
    z2: BigNumber,
    z3: BigNumber,
    z4: BigNumber,
    w: BigNumber,
    wy: BigNumber,
}

#[allow(clippy::too_many_arguments)]
fn compute_challenge(
    stmt: &Statement,
    s: &BigNumber,
    t: &BigNumber,
    a: &BigNumber,
    bx: &ProjectivePoint,
    by: &BigNumber,
    e: &BigNumber,
    f: &BigNumber,
) -> BigNumber {
    Transcript::new()
        .chain_int(stmt.ssid)
        .chain_int(&stmt.curve.b)
        .chain_int(&stmt.curve.q)
        .chain_int(&stmt.curve.p)
        .chain_int(stmt.ek0.n())
        .chain_int(stmt.ek1.n())
        .chain_int(stmt.setup.n())
        .chain_int(stmt.setup.s())
        .chain_int(stmt.setup.t())
        .chain_int(stmt.c.as_bigint())
        .chain_int(stmt.d.as_bigint())
        .chain_int(stmt.y.as_bigint())
        .chain_k256_point(stmt.x)
        .chain_ints([s, t, a])
        .chain_point(bx)
        .chain_ints([by, e, f])
        .challenge(&stmt.curve.q)
}

#[allow(clippy::many_single_char_names)]
pub fn prove(
    rng: &mut (impl CryptoRng + RngCore),
    stmt: &Statement,
    wit: &Witness,
) -> CggmpResult<Proof> {
    require_nonzero(
        "aff-g",
        &[
            stmt.ssid,
            stmt.ek0.n(),
            stmt.ek1.n(),
            stmt.setup.n(),
            stmt.c.as_bigint(),
            stmt.d.as_bigint(),
            stmt.y.as_bigint(),
            wit.x,
            wit.y,
            wit.rho.as_bigint(),
            wit.rho_y.as_bigint(),
        ],
    )?;

    let (n0, nn0) = (stmt.ek0.n(), stmt.ek0.nn());
    let n1 = stmt.ek1.n();
    let n_cap = stmt.setup.n();
    let q = &stmt.curve.q;
    let q3 = stmt.curve.q_pow(3);
    let q7 = stmt.curve.q_pow(7);
    let q_n_cap = q * n_cap;
    let q3_n_cap = &q3 * n_cap;

    let alpha = numbers::sample_below(rng, &q3);
    let beta = numbers::sample_below(rng, &q7);
    let r = numbers::sample_unit(rng, n0);
    let r_y = numbers::sample_unit(rng, n1);
    let gamma = numbers::sample_below(rng, &q3_n_cap);
    let m = numbers::sample_below(rng, &q_n_cap);
    let delta = numbers::sample_below(rng, &q3_n_cap);
    let mu = numbers::sample_below(rng, &q_n_cap);

    // a = C^alpha (1+N0)^beta r^N0 mod N0^2
    let a = stmt
        .c
        .as_bigint()
        .modpow(&alpha, nn0)
        .modmul(&stmt.ek0.encrypt_unchecked(&beta, &r), nn0);
    // bx = alpha G
    let bx = ProjectivePoint::from(k256::ProjectivePoint::GENERATOR * to_scalar(&alpha));
    // by = (1+N1)^beta r_y^N1 mod N1^2
    let by = stmt.ek1.encrypt_unchecked(&beta, &r_y);
    // e = s^alpha t^gamma, s = s^x t^m, f = s^beta t^delta, t = s^y t^mu  mod N^
    let e_commit = stmt.setup.commit(&alpha, &gamma);
    let s = stmt.setup.commit(wit.x, &m);
    let f = stmt.setup.commit(&beta, &delta);
    let t = stmt.setup.commit(wit.y, &mu);

    let e = compute_challenge(stmt, &s, &t, &a, &bx, &by, &e_commit, &f);

    let z1 = &e * wit.x + &alpha;
    let z2 = &e * wit.y + &beta;
    let z3 = &e * &m + &gamma;
    let z4 = &e * &mu + &delta;
    // w = rho^e r mod N0
    let w = wit.rho.0.modpow(&e, n0).modmul(&r, n0);
    // wy = rho_y^e r_y mod N1
    let wy = wit.rho_y.0.modpow(&e, n1).modmul(&r_y, n1);

    Ok(Proof {
        s,
        t,
        a,
        bx,
        by,
        e: e_commit,
        f,
        z1,
        z2,
        z3,
        z4,
        w,
        wy,
    })
}

pub fn verify(stmt: &Statement, proof: &Proof) -> bool {
    let (n0, nn0) = (stmt.ek0.n(), stmt.ek0.nn());
    let (n1, nn1) = (stmt.ek1.n(), stmt.ek1.nn());
    let n_cap = stmt.setup.n();
    let zero = BigNumber::zero();

    // range checks
    if !member_of_mod(&proof.z1, &stmt.curve.q_pow(3)) {
        warn!("aff-g proof: z1 not in Z_q^3");
        return false;
    }
    if !member_of_mod(&proof.z2, &stmt.curve.q_pow(7)) {
        warn!("aff-g proof: z2 not in Z_q^7");
        return false;
    }
    if [&proof.z1, &proof.z2, &proof.z3, &proof.z4]
        .iter()
        .any(|z| **z <= zero)
    {
        warn!("aff-g proof: non-positive response");
        return false;
    }

    // group membership checks
    if !member_of_mul_group(&proof.a, nn0) {
        warn!("aff-g proof: a not in Z*_N0^2");
        return false;
    }
    if !member_of_mul_group(&proof.by, nn1) {
        warn!("aff-g proof: by not in Z*_N1^2");
        return false;
    }
    if !member_of_mul_group(&proof.w, n0) {
        warn!("aff-g proof: w not in Z*_N0");
        return false;
    }
    if !member_of_mul_group(&proof.wy, n1) {
        warn!("aff-g proof: wy not in Z*_N1");
        return false;
    }
    if [&proof.e, &proof.f, &proof.s, &proof.t]
        .iter()
        .any(|v| !member_of_mul_group(v, n_cap))
    {
        warn!("aff-g proof: commitment not in Z*_N^");
        return false;
    }

    let e = compute_challenge(
        stmt, &proof.s, &proof.t, &proof.a, &proof.bx, &proof.by, &proof.e, &proof.f,
    );

    // C^z1 (1+N0)^z2 w^N0 == D^e a mod N0^2
    let lhs = stmt
        .c
        .as_bigint()
        .modpow(&proof.z1, nn0)
        .modmul(&stmt.ek0.encrypt_unchecked(&proof.z2, &proof.w), nn0);
    let rhs = stmt.d.as_bigint().modpow(&e, nn0).modmul(&proof.a, nn0);
    if lhs != rhs {
        warn!("aff-g proof: affine paillier check failed");
        return false;
    }

    // z1 G == e X + bx
    let lhs = k256::ProjectivePoint::GENERATOR * to_scalar(&proof.z1);
    let rhs = stmt.x * &to_scalar(&e) + proof.bx.as_ref();
    if lhs != rhs {
        warn!("aff-g proof: curve check failed");
        return false;
    }

    // (1+N1)^z2 wy^N1 == Y^e by mod N1^2
    let lhs = stmt.ek1.encrypt_unchecked(&proof.z2, &proof.wy);
    let rhs = stmt.y.as_bigint().modpow(&e, nn1).modmul(&proof.by, nn1);
    if lhs != rhs {
        warn!("aff-g proof: paillier check failed");
        return false;
    }

    // s^z1 t^z3 == S^e E mod N^
    let lhs = stmt.setup.commit(&proof.z1, &proof.z3);
    let rhs = proof.s.modpow(&e, n_cap).modmul(&proof.e, n_cap);
    if lhs != rhs {
        warn!("aff-g proof: x commitment check failed");
        return false;
    }

    // s^z2 t^z4 == T^e F mod N^
    let lhs = stmt.setup.commit(&proof.z2, &proof.z4);
    let rhs = proof.t.modpow(&e, n_cap).modmul(&proof.f, n_cap);
    if lhs != rhs {
        warn!("aff-g proof: y commitment check failed");
        return false;
    }

    true
}

impl ProofParts for Proof {
    const ARITY: usize = 14;
    const NAME: &'static str = "aff-g";

    fn to_parts(&self) -> Vec<BytesVec> {
        let [bx_x, bx_y] = point_to_parts(&self.bx);
        let mut parts = ints_to_parts([&self.s, &self.t, &self.a]);
        parts.extend([bx_x, bx_y]);
        parts.extend(ints_to_parts([
            &self.by, &self.e, &self.f, &self.z1, &self.z2, &self.z3, &self.z4, &self.w, &self.wy,
        ]));
        parts
    }

    fn from_checked_parts(parts: &[BytesVec]) -> CggmpResult<Self> {
        let [s, t, a, bx_x, bx_y, by, e, f, z1, z2, z3, z4, w, wy] = parts_to_array(parts)?;
        Ok(Self {
            s,
            t,
            a,
            bx: point_from_ints(&bx_x, &bx_y, Self::NAME)?,
            by,
            e,
            f,
            z1,
            z2,
            z3,
            z4,
            w,
            wy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_tools::paillier::{
        test_keys,
        zk::test_setup::{
            check_wire_arity, corrupt_part, prover_and_setup, wire_trip, zeroed_on_the_wire,
        },
    };
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn basic_correctness() {
        let mut rng = rand::thread_rng();
        let curve = CurveParams::secp256k1();
        // prover owns ek1, verifier owns ek0 and the ring-pedersen setup
        let (ek0, _, setup) = prover_and_setup();
        let (ek1, _) = test_keys::keypair(2);
        let ssid = BigNumber::from(7u64);

        let k = numbers::sample_nonzero_below(&mut rng, &curve.q);
        let (c, _) = ek0.encrypt(&mut rng, &k.into()).unwrap();

        let x = numbers::sample_nonzero_below(&mut rng, &curve.q);
        let y = numbers::sample_nonzero_below(&mut rng, &curve.q_pow(5));
        let (enc_y, rho) = ek0.encrypt(&mut rng, &y.clone().into()).unwrap();
        let d = ek0.add(&ek0.mul(&c, &x.clone().into()), &enc_y);
        let (y_ct, rho_y) = ek1.encrypt(&mut rng, &y.clone().into()).unwrap();
        let x_point = k256::ProjectivePoint::GENERATOR * to_scalar(&x);

        let stmt = Statement {
            ssid: &ssid,
            curve: &curve,
            ek0: &ek0,
            ek1: &ek1,
            setup: &setup,
            c: &c,
            d: &d,
            y: &y_ct,
            x: &x_point,
        };
        let wit = Witness {
            x: &x,
            y: &y,
            rho: &rho,
            rho_y: &rho_y,
        };

        // test: valid proof
        let proof = prove(&mut rng, &stmt, &wit).unwrap();
        assert!(verify(&stmt, &proof));

        // test: JSON round trip, a zero field and a list of the wrong length
        let decoded = wire_trip(&proof);
        assert_eq!(decoded, proof);
        assert!(verify(&stmt, &decoded));
        let zeroed = zeroed_on_the_wire(&proof, 8);
        assert!(!verify(&stmt, &zeroed));
        check_wire_arity(&proof);

        // test: wrong public point
        let bad_point = x_point + k256::ProjectivePoint::GENERATOR;
        let bad_stmt = Statement {
            x: &bad_point,
            ..stmt.clone()
        };
        assert!(!verify(&bad_stmt, &proof));

        // test: every corrupted field; bx coordinates leave the curve
        let parts = proof.to_parts();
        assert_eq!(Proof::from_parts(&parts).unwrap(), proof);
        for i in 0..Proof::ARITY {
            match Proof::from_parts(&corrupt_part(&parts, i)) {
                Ok(bad_proof) => assert!(!verify(&stmt, &bad_proof), "field {} corrupted", i),
                Err(_) => assert!(i == 3 || i == 4, "field {} failed to decode", i),
            }
        }

        // test: bad witness
        let bad_y = &y + &BigNumber::one();
        let bad_wit = Witness {
            y: &bad_y,
            ..wit
        };
        let bad_proof = prove(&mut rng, &stmt, &bad_wit).unwrap();
        assert!(!verify(&stmt, &bad_proof));
    }
}
