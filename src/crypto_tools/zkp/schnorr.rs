use crate::{
    crypto_tools::{
        curve::{secp256k1_modulus, to_bigint, to_scalar, CurveParams},
        hash::Transcript,
        k256_serde::{self, ProjectivePoint, SecretScalar},
        numbers,
        paillier::zk::{point_from_ints, point_to_parts, ProofParts},
    },
    sdk::api::{BytesVec, CggmpError, CggmpResult, Malformed},
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Clone, Debug)]
pub struct Statement<'a> {
    pub ssid: &'a BigNumber,
    pub curve: &'a CurveParams,
    pub target: &'a k256::ProjectivePoint,
}

#[derive(Clone, Debug)]
pub struct Witness<'a> {
    pub scalar: &'a k256::Scalar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    a: ProjectivePoint,
    z: k256_serde::Scalar,
}

impl Proof {
    /// The nonce commitment `A = alpha G`
    pub fn commitment(&self) -> &ProjectivePoint {
        &self.a
    }

    pub fn response(&self) -> &k256::Scalar {
        self.z.as_ref()
    }
}

/// Compute the challenge for Schnorr zk proof
fn compute_challenge(stmt: &Statement, a: &ProjectivePoint) -> k256::Scalar {
    let e = Transcript::new()
        .chain_int(stmt.ssid)
        .chain_int(&stmt.curve.b)
        .chain_int(&stmt.curve.q)
        .chain_int(&stmt.curve.p)
        .chain_k256_point(stmt.target)
        .chain_k256_point(&k256::ProjectivePoint::GENERATOR)
        .chain_point(a)
        .challenge(&stmt.curve.q);
    to_scalar(&e)
}

// statement (target), witness (scalar)
//   such that target == scalar * G
pub fn prove(rng: &mut (impl CryptoRng + RngCore), stmt: &Statement, wit: &Witness) -> Proof {
    prove_with_nonce(stmt, wit, &SecretScalar::random(rng))
}

/// Prove with a nonce whose point `alpha G` was committed to earlier.
pub fn prove_with_nonce(stmt: &Statement, wit: &Witness, alpha: &SecretScalar) -> Proof {
    let a = ProjectivePoint::from(alpha);
    let e = compute_challenge(stmt, &a);
    let z = alpha.as_ref() + &(e * wit.scalar);

    Proof { a, z: z.into() }
}

pub fn verify(stmt: &Statement, proof: &Proof) -> bool {
    // z is in Z_q and A is on the curve, handled on decode
    let e = compute_challenge(stmt, &proof.a);
    let lhs = k256::ProjectivePoint::GENERATOR * proof.z.as_ref();
    let rhs = proof.a.as_ref() + &(stmt.target * &e);

    if lhs == rhs {
        true
    } else {
        warn!("schnorr proof: verify failed");
        false
    }
}

impl ProofParts for Proof {
    const ARITY: usize = 3;
    const NAME: &'static str = "schnorr";

    fn to_parts(&self) -> Vec<BytesVec> {
        let [a_x, a_y] = point_to_parts(&self.a);
        vec![a_x, a_y, numbers::to_be_bytes(&to_bigint(self.z.as_ref()))]
    }

    fn from_checked_parts(parts: &[BytesVec]) -> CggmpResult<Self> {
        let a = point_from_ints(
            &numbers::from_be_bytes(&parts[0]),
            &numbers::from_be_bytes(&parts[1]),
            Self::NAME,
        )?;
        let z = numbers::from_be_bytes(&parts[2]);
        if z >= secp256k1_modulus() {
            warn!("schnorr proof: z not in Z_q");
            return Err(CggmpError::Malformed(Malformed::Scalar));
        }
        Ok(Self {
            a,
            z: to_scalar(&z).into(),
        })
    }
}

#[cfg(test)]
pub(crate) mod malicious {
    use super::*;

    pub fn corrupt_proof(proof: &Proof) -> Proof {
        Proof {
            z: (proof.z.as_ref() + &k256::Scalar::ONE).into(),
            ..proof.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_tools::{
        k256_serde::random_nonzero_scalar,
        paillier::zk::test_setup::{check_wire_arity, wire_trip, zeroed_on_the_wire},
    };
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn basic_correctness() {
        let mut rng = rand::thread_rng();
        let curve = CurveParams::secp256k1();
        let scalar = &random_nonzero_scalar(&mut rng);
        let target = &(k256::ProjectivePoint::GENERATOR * scalar);
        let ssid = BigNumber::from(5u64);
        let bad_ssid = BigNumber::from(1u64);
        let stmt = Statement {
            ssid: &ssid,
            curve: &curve,
            target,
        };
        let wit = Witness { scalar };
        let bad_stmt = Statement {
            ssid: &bad_ssid,
            ..stmt.clone()
        };

        // test: valid proof
        let proof = prove(&mut rng, &stmt, &wit);
        assert!(verify(&stmt, &proof));
        assert_eq!(Proof::from_parts(&proof.to_parts()).unwrap(), proof);

        // test: JSON round trip, a zero field and a list of the wrong length
        let decoded = wire_trip(&proof);
        assert_eq!(decoded, proof);
        assert!(verify(&stmt, &decoded));
        let zeroed = zeroed_on_the_wire(&proof, 2);
        assert!(!verify(&stmt, &zeroed));
        check_wire_arity(&proof);

        // test: bad ssid
        assert!(!verify(&bad_stmt, &proof));

        // test: bad proof
        let bad_proof = malicious::corrupt_proof(&proof);
        assert!(!verify(&stmt, &bad_proof));
        assert!(!verify(&bad_stmt, &bad_proof));

        // test: bad witness
        let bad_wit = Witness {
            scalar: &(*wit.scalar + k256::Scalar::ONE),
        };
        let bad_proof = prove(&mut rng, &stmt, &bad_wit);
        assert!(!verify(&stmt, &bad_proof));
    }

    #[test]
    fn committed_nonce() {
        let mut rng = rand::thread_rng();
        let curve = CurveParams::secp256k1();
        let scalar = &random_nonzero_scalar(&mut rng);
        let target = &(k256::ProjectivePoint::GENERATOR * scalar);
        let ssid = BigNumber::from(9u64);
        let stmt = Statement {
            ssid: &ssid,
            curve: &curve,
            target,
        };

        let alpha = SecretScalar::random(&mut rng);
        let proof = prove_with_nonce(&stmt, &Witness { scalar }, &alpha);
        assert_eq!(proof.commitment(), &ProjectivePoint::from(&alpha));
        assert!(verify(&stmt, &proof));
    }

    #[test]
    fn non_canonical_parts() {
        let mut rng = rand::thread_rng();
        let curve = CurveParams::secp256k1();
        let scalar = &random_nonzero_scalar(&mut rng);
        let target = &(k256::ProjectivePoint::GENERATOR * scalar);
        let ssid = BigNumber::from(3u64);
        let stmt = Statement {
            ssid: &ssid,
            curve: &curve,
            target,
        };
        let proof = prove(&mut rng, &stmt, &Witness { scalar });

        // z + q encodes the same scalar but is refused
        let mut parts = proof.to_parts();
        let z = numbers::from_be_bytes(&parts[2]) + &curve.q;
        parts[2] = numbers::to_be_bytes(&z);
        assert_eq!(
            Proof::from_parts(&parts),
            Err(CggmpError::Malformed(Malformed::Scalar))
        );

        // off-curve commitment
        let mut parts = proof.to_parts();
        parts[1] = numbers::to_be_bytes(&(numbers::from_be_bytes(&parts[1]) + BigNumber::one()));
        assert_eq!(
            Proof::from_parts(&parts),
            Err(CggmpError::Malformed(Malformed::Point))
        );
    }
}
