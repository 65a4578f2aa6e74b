//! Fiat-Shamir proofs over Paillier and Ring-Pedersen moduli.
//!
//! Every proof serializes to a fixed number of big-endian byte strings, one
//! per field, see [ProofParts].
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    crypto_tools::{k256_serde::ProjectivePoint, numbers, paillier::DecryptionKey},
    sdk::api::{BytesVec, CggmpError, CggmpResult, Malformed},
};

pub mod affg;
pub mod enc;
pub mod fac;
pub mod logstar;
pub mod modulus;
pub mod prm;

/// Ring-Pedersen commitment parameters `(N^, s, t)` with `s = t^lambda mod N^`.
///
/// Whoever publishes them acts as verifier for range-style proofs that
/// commit under them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RingPedersen {
    n: BigNumber,
    s: BigNumber,
    t: BigNumber,
}

impl RingPedersen {
    pub fn new(n: BigNumber, s: BigNumber, t: BigNumber) -> Self {
        Self { n, s, t }
    }

    /// Fresh parameters over the modulus of `dk`, returned with the secret `lambda`.
    ///
    /// `t` is a random square so that `s` stays in the subgroup `t` generates.
    pub fn generate(
        rng: &mut (impl CryptoRng + RngCore),
        dk: &DecryptionKey,
    ) -> (Self, BigNumber) {
        let n = dk.encryption_key().n().clone();
        let lambda = numbers::sample_nonzero_below(rng, dk.totient());
        let r = numbers::sample_unit(rng, &n);
        let t = r.modmul(&r, &n);
        let s = t.modpow(&lambda, &n);
        (Self { n, s, t }, lambda)
    }

    pub fn n(&self) -> &BigNumber {
        &self.n
    }

    pub fn s(&self) -> &BigNumber {
        &self.s
    }

    pub fn t(&self) -> &BigNumber {
        &self.t
    }

    /// Compute the commitment `s^x t^y mod N^`
    pub fn commit(&self, x: &BigNumber, y: &BigNumber) -> BigNumber {
        let s_x = self.s.modpow(x, &self.n);
        let t_y = self.t.modpow(y, &self.n);

        s_x.modmul(&t_y, &self.n)
    }

    /// `1 < s, t < N^` and `s != t`
    pub fn is_well_formed(&self) -> bool {
        let one = BigNumber::one();
        if self.s <= one || self.s >= self.n || self.t <= one || self.t >= self.n {
            warn!("ring-pedersen: s or t not in (1, N^)");
            return false;
        }
        if self.s == self.t {
            warn!("ring-pedersen: s == t");
            return false;
        }
        true
    }
}

/// Fixed-arity positional encoding of a proof.
pub trait ProofParts: Sized {
    const ARITY: usize;
    const NAME: &'static str;

    fn to_parts(&self) -> Vec<BytesVec>;

    /// Callers must check the arity first, see [check_arity].
    fn from_checked_parts(parts: &[BytesVec]) -> CggmpResult<Self>;

    fn from_parts(parts: &[BytesVec]) -> CggmpResult<Self> {
        check_arity(parts, Self::ARITY, Self::NAME)?;
        Self::from_checked_parts(parts)
    }
}

pub(crate) fn check_arity(parts: &[BytesVec], arity: usize, name: &str) -> CggmpResult<()> {
    if parts.len() != arity {
        warn!(
            "{} proof: expected {} parts, got {}",
            name,
            arity,
            parts.len()
        );
        return Err(CggmpError::Malformed(Malformed::Wire));
    }
    Ok(())
}

pub(crate) fn ints_to_parts<'a>(ints: impl IntoIterator<Item = &'a BigNumber>) -> Vec<BytesVec> {
    ints.into_iter().map(numbers::to_be_bytes).collect()
}

pub(crate) fn parts_to_ints(parts: &[BytesVec]) -> Vec<BigNumber> {
    parts.iter().map(|p| numbers::from_be_bytes(p)).collect()
}

pub(crate) fn parts_to_array<const N: usize>(parts: &[BytesVec]) -> CggmpResult<[BigNumber; N]> {
    parts_to_ints(parts)
        .try_into()
        .map_err(|_| CggmpError::Malformed(Malformed::Wire))
}

pub(crate) fn point_to_parts(p: &ProjectivePoint) -> [BytesVec; 2] {
    let (x, y) = p.hash_coordinates();
    [numbers::to_be_bytes(&x), numbers::to_be_bytes(&y)]
}

pub(crate) fn point_from_ints(x: &BigNumber, y: &BigNumber, name: &str) -> CggmpResult<ProjectivePoint> {
    ProjectivePoint::from_hash_coordinates(x, y).ok_or_else(|| {
        warn!("{} proof: point not on curve", name);
        CggmpError::Malformed(Malformed::Point)
    })
}

/// Provers refuse zero-valued inputs; they indicate a caller bug.
pub(crate) fn require_nonzero(name: &str, values: &[&BigNumber]) -> CggmpResult<()> {
    if values.iter().any(|v| numbers::is_zero(v)) {
        error!("{} proof: zero-valued input", name);
        return Err(CggmpError::Malformed(Malformed::ProofInput));
    }
    Ok(())
}
