//! Ring-Pedersen parameter proof: knowledge of `lambda` with `s = t^lambda mod N`.
//!
//! Parallel repetition of a one-bit-challenge Schnorr protocol; the challenge
//! bits are the low bits of a single digest.
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    crypto_tools::{constants::PRM_PROOF_ITERATIONS, hash::Transcript, numbers},
    sdk::api::{BytesVec, CggmpResult},
};

use super::{ints_to_parts, parts_to_ints, require_nonzero, ProofParts, RingPedersen};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    a: Vec<BigNumber>,
    z: Vec<BigNumber>,
}

fn compute_challenge(ssid: &BigNumber, setup: &RingPedersen, a: &[BigNumber]) -> BigNumber {
    Transcript::new()
        .chain_ints([ssid, setup.s(), setup.t(), setup.n()])
        .chain_ints(a.iter())
        .finalize()
}

/// `lambda` and `phi` are the secrets returned by [RingPedersen::generate]
/// and the totient of its modulus.
pub fn prove(
    rng: &mut (impl CryptoRng + RngCore),
    ssid: &BigNumber,
    setup: &RingPedersen,
    lambda: &BigNumber,
    phi: &BigNumber,
) -> CggmpResult<Proof> {
    require_nonzero(
        "prm",
        &[ssid, setup.n(), setup.s(), setup.t(), lambda, phi],
    )?;

    let alphas: Vec<BigNumber> = (0..PRM_PROOF_ITERATIONS)
        .map(|_| numbers::sample_below(rng, phi))
        .collect();
    let a: Vec<BigNumber> = alphas
        .iter()
        .map(|alpha| setup.t().modpow(alpha, setup.n()))
        .collect();

    let e = compute_challenge(ssid, setup, &a);

    let z = alphas
        .iter()
        .enumerate()
        .map(|(i, alpha)| {
            if numbers::bit(&e, i) {
                (alpha + lambda) % phi
            } else {
                alpha.clone()
            }
        })
        .collect();

    Ok(Proof { a, z })
}

pub fn verify(ssid: &BigNumber, setup: &RingPedersen, proof: &Proof) -> bool {
    let n = setup.n();
    let one = BigNumber::one();

    if !setup.is_well_formed() {
        return false;
    }
    if proof.a.len() != PRM_PROOF_ITERATIONS || proof.z.len() != PRM_PROOF_ITERATIONS {
        warn!("prm proof: wrong number of iterations");
        return false;
    }
    if proof.a.iter().any(|a| a <= &one || a >= n) {
        warn!("prm proof: commitment not in (1, N)");
        return false;
    }
    // responses are exponents, not group elements
    if proof.z.iter().any(|z| z < &BigNumber::zero()) {
        warn!("prm proof: negative response");
        return false;
    }

    let e = compute_challenge(ssid, setup, &proof.a);

    for (i, (a, z)) in proof.a.iter().zip(proof.z.iter()).enumerate() {
        // t^z_i == a_i s^e_i mod N
        let rhs = if numbers::bit(&e, i) {
            a.modmul(setup.s(), n)
        } else {
            a.clone()
        };
        if setup.t().modpow(z, n) != rhs {
            warn!("prm proof: check failed at iteration {}", i);
            return false;
        }
    }

    true
}

impl ProofParts for Proof {
    const ARITY: usize = 2 * PRM_PROOF_ITERATIONS;
    const NAME: &'static str = "prm";

    fn to_parts(&self) -> Vec<BytesVec> {
        let mut parts = ints_to_parts(self.a.iter());
        parts.extend(ints_to_parts(self.z.iter()));
        parts
    }

    fn from_checked_parts(parts: &[BytesVec]) -> CggmpResult<Self> {
        let mut a = parts_to_ints(parts);
        let z = a.split_off(PRM_PROOF_ITERATIONS);
        Ok(Self { a, z })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_tools::paillier::{
        test_keys,
        zk::test_setup::{check_wire_arity, corrupt_part, wire_trip, zeroed_on_the_wire},
    };
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn basic_correctness() {
        let mut rng = rand::thread_rng();
        let (_, dk) = test_keys::keypair(1);
        let (setup, lambda) = RingPedersen::generate(&mut rng, &dk);
        let ssid = BigNumber::from(77u64);

        // test: valid proof
        let proof = prove(&mut rng, &ssid, &setup, &lambda, dk.totient()).unwrap();
        assert!(verify(&ssid, &setup, &proof));

        // test: JSON round trip, a zero field and a list of the wrong length
        let decoded = wire_trip(&proof);
        assert_eq!(decoded, proof);
        assert!(verify(&ssid, &setup, &decoded));
        let zeroed = zeroed_on_the_wire(&proof, PRM_PROOF_ITERATIONS);
        assert!(!verify(&ssid, &setup, &zeroed));
        check_wire_arity(&proof);

        // test: bad ssid
        assert!(!verify(&BigNumber::from(78u64), &setup, &proof));

        // test: swapped parameters
        let swapped = RingPedersen::new(setup.n().clone(), setup.t().clone(), setup.s().clone());
        assert!(!verify(&ssid, &swapped, &proof));

        // test: corrupted fields
        let parts = proof.to_parts();
        assert_eq!(Proof::from_parts(&parts).unwrap(), proof);
        for i in [0, PRM_PROOF_ITERATIONS - 1, PRM_PROOF_ITERATIONS, Proof::ARITY - 1] {
            let bad_proof = Proof::from_parts(&corrupt_part(&parts, i)).unwrap();
            assert!(!verify(&ssid, &setup, &bad_proof), "field {} corrupted", i);
        }

        // test: wrong secret
        let bad_lambda = &lambda + &BigNumber::one();
        let bad_proof = prove(&mut rng, &ssid, &setup, &bad_lambda, dk.totient()).unwrap();
        assert!(!verify(&ssid, &setup, &bad_proof));
    }
}
