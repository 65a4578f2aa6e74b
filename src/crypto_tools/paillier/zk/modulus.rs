//! Paillier-Blum modulus proof.
//!
//! The prover shows that `N` is the product of two primes `p = q = 3 mod 4`
//! with `gcd(N, phi(N)) = 1`. For each challenge `y_i` it reveals an `N`-th
//! root `z_i` and a fourth root `x_i` of `(-1)^a_i w^b_i y_i`.
//!
//! The choice bits `a_i`, `b_i` travel packed into a single integer each:
//! a `0xff` header byte followed by one byte per iteration.
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    crypto_tools::{
        constants::{
            MOD_PROOF_ITERATIONS, MOD_PROOF_PACKED_MAX_BITS, MOD_PROOF_PACKED_MIN_BITS,
        },
        hash::Transcript,
        numbers::{self, jacobi},
        paillier::{utils::member_of_mul_group, DecryptionKey},
    },
    sdk::api::{BytesVec, CggmpError, CggmpResult, Malformed},
};

use super::{ints_to_parts, parts_to_ints, require_nonzero, ProofParts};

const PACKED_HEADER: u8 = 0xff;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    w: BigNumber,
    x: Vec<BigNumber>,
    a: BigNumber,
    b: BigNumber,
    z: Vec<BigNumber>,
}

/// Challenges `y_i`; each one hashes all of its predecessors.
fn compute_challenges(ssid: &BigNumber, w: &BigNumber, n: &BigNumber) -> Vec<BigNumber> {
    let mut ys: Vec<BigNumber> = Vec::with_capacity(MOD_PROOF_ITERATIONS);
    for _ in 0..MOD_PROOF_ITERATIONS {
        let seed = Transcript::new()
            .chain_ints([ssid, w, n])
            .chain_ints(ys.iter())
            .finalize();
        ys.push(numbers::rejection_sample(n, &seed));
    }
    ys
}

/// `(-1)^a w^b y mod N`
fn twist(y: &BigNumber, w: &BigNumber, n: &BigNumber, a: bool, b: bool) -> BigNumber {
    let mut v = y % n;
    if a {
        v = (n - &v) % n;
    }
    if b {
        v = v.modmul(w, n);
    }
    v
}

fn pack(bits: &[bool]) -> BigNumber {
    let bytes: Vec<u8> = std::iter::once(PACKED_HEADER)
        .chain(bits.iter().map(|&bit| u8::from(bit)))
        .collect();
    numbers::from_be_bytes(&bytes)
}

/// Inverse of [pack]; `None` unless every choice byte is 0 or 1.
/// The caller checks the bit length first.
fn unpack(packed: &BigNumber) -> Option<Vec<bool>> {
    let bytes = numbers::to_be_bytes(packed);
    if bytes.len() != MOD_PROOF_ITERATIONS + 1 {
        return None;
    }
    bytes[1..]
        .iter()
        .map(|&byte| match byte {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        })
        .collect()
}

fn packed_length_ok(packed: &BigNumber) -> bool {
    let bits = packed.bit_length();
    bits > MOD_PROOF_PACKED_MIN_BITS && bits <= MOD_PROOF_PACKED_MAX_BITS
}

pub fn prove(
    rng: &mut (impl CryptoRng + RngCore),
    ssid: &BigNumber,
    dk: &DecryptionKey,
) -> CggmpResult<Proof> {
    let n = dk.encryption_key().n();
    require_nonzero("mod", &[ssid, n, dk.p(), dk.q()])?;

    let phi = dk.totient();

    // w with Jacobi symbol -1 is a non-residue mod exactly one of p, q
    let w = loop {
        let w = numbers::sample_unit(rng, n);
        if jacobi(&w, n) == -1 {
            break w;
        }
    };

    let ys = compute_challenges(ssid, &w, n);

    let n_inv = n.invert(phi).ok_or_else(|| {
        error!("mod proof: N not invertible mod phi(N)");
        CggmpError::Malformed(Malformed::Modulus)
    })?;

    // fourth root exponent for Blum primes: ((phi + 4) / 8)^2 mod phi
    let expo = ((phi + &BigNumber::from(4u64)) >> 3usize).modpow(&BigNumber::from(2u64), phi);

    let mut xs = Vec::with_capacity(MOD_PROOF_ITERATIONS);
    let mut zs = Vec::with_capacity(MOD_PROOF_ITERATIONS);
    let mut a_bits = Vec::with_capacity(MOD_PROOF_ITERATIONS);
    let mut b_bits = Vec::with_capacity(MOD_PROOF_ITERATIONS);

    for y in ys.iter() {
        let (a, b, twisted) = [(false, false), (true, false), (false, true), (true, true)]
            .into_iter()
            .map(|(a, b)| (a, b, twist(y, &w, n, a, b)))
            .find(|(_, _, v)| dk.is_quadratic_residue(v))
            .ok_or_else(|| {
                error!("mod proof: no fourth root, modulus is not Paillier-Blum");
                CggmpError::Malformed(Malformed::Modulus)
            })?;

        let x = twisted.modpow(&expo, n);
        if x.modpow(&BigNumber::from(4u64), n) != twisted {
            error!("mod proof: fourth root check failed, modulus is not Paillier-Blum");
            return Err(CggmpError::Malformed(Malformed::Modulus));
        }

        xs.push(x);
        zs.push(y.modpow(&n_inv, n));
        a_bits.push(a);
        b_bits.push(b);
    }

    Ok(Proof {
        w,
        x: xs,
        a: pack(&a_bits),
        b: pack(&b_bits),
        z: zs,
    })
}

pub fn verify(ssid: &BigNumber, n: &BigNumber, proof: &Proof) -> bool {
    if numbers::is_even(n) {
        warn!("mod proof: N is even");
        return false;
    }
    if n.is_prime() {
        warn!("mod proof: N is prime");
        return false;
    }
    if proof.x.len() != MOD_PROOF_ITERATIONS || proof.z.len() != MOD_PROOF_ITERATIONS {
        warn!("mod proof: wrong number of iterations");
        return false;
    }
    if !member_of_mul_group(&proof.w, n) || jacobi(&proof.w, n) != -1 {
        warn!("mod proof: w must have Jacobi symbol -1");
        return false;
    }
    if proof
        .x
        .iter()
        .chain(proof.z.iter())
        .any(|v| !member_of_mul_group(v, n))
    {
        warn!("mod proof: x or z not in Z*_N");
        return false;
    }
    if !packed_length_ok(&proof.a) || !packed_length_ok(&proof.b) {
        warn!("mod proof: packed choice bits have wrong length");
        return false;
    }
    let (a_bits, b_bits) = match (unpack(&proof.a), unpack(&proof.b)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            warn!("mod proof: malformed packed choice bits");
            return false;
        }
    };

    let ys = compute_challenges(ssid, &proof.w, n);
    let four = BigNumber::from(4u64);

    for (i, y) in ys.iter().enumerate() {
        // z_i^N == y_i mod N
        if proof.z[i].modpow(n, n) != *y {
            warn!("mod proof: N-th root check failed at iteration {}", i);
            return false;
        }

        // x_i^4 == (-1)^a_i w^b_i y_i mod N
        if proof.x[i].modpow(&four, n) != twist(y, &proof.w, n, a_bits[i], b_bits[i]) {
            warn!("mod proof: fourth root check failed at iteration {}", i);
            return false;
        }
    }

    true
}

impl ProofParts for Proof {
    const ARITY: usize = 2 * MOD_PROOF_ITERATIONS + 3;
    const NAME: &'static str = "mod";

    fn to_parts(&self) -> Vec<BytesVec> {
        let mut parts = ints_to_parts([&self.w]);
        parts.extend(ints_to_parts(self.x.iter()));
        parts.extend(ints_to_parts([&self.a, &self.b]));
        parts.extend(ints_to_parts(self.z.iter()));
        parts
    }

    fn from_checked_parts(parts: &[BytesVec]) -> CggmpResult<Self> {
        let mut ints = parts_to_ints(parts);
        let z = ints.split_off(MOD_PROOF_ITERATIONS + 3);
        let b = ints.remove(MOD_PROOF_ITERATIONS + 2);
        let a = ints.remove(MOD_PROOF_ITERATIONS + 1);
        let x = ints.split_off(1);
        let w = ints.remove(0);
        Ok(Self { w, x, a, b, z })
    }
}
