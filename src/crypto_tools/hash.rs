//! Fiat-Shamir hashing of mixed integers and points.
//!
//! Every input is absorbed as its minimal big-endian encoding followed by the
//! delimiter `$`, so `(1, 23)` and `(12, 3)` hash differently. Points
//! contribute their affine `x` then `y`.
use libpaillier::unknown_order::BigNumber;
use sha2::{Digest, Sha512_256};

use super::{k256_serde::ProjectivePoint, numbers};

const DELIMITER: &[u8] = b"$";

#[derive(Clone, Default)]
pub struct Transcript {
    hasher: Sha512_256,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Domain-separated variant: the state is prefixed with `H(tag) || H(tag)`,
    /// where the tag itself is absorbed like any other input.
    pub fn tagged(tag: u8) -> Self {
        let tag_hash = Sha512_256::new()
            .chain_update(tag.to_be_bytes())
            .chain_update(DELIMITER)
            .finalize();
        Self {
            hasher: Sha512_256::new()
                .chain_update(tag_hash)
                .chain_update(tag_hash),
        }
    }

    pub fn chain_int(mut self, x: &BigNumber) -> Self {
        self.hasher.update(numbers::to_be_bytes(x));
        self.hasher.update(DELIMITER);
        self
    }

    pub fn chain_ints<'a>(self, xs: impl IntoIterator<Item = &'a BigNumber>) -> Self {
        xs.into_iter().fold(self, |t, x| t.chain_int(x))
    }

    pub fn chain_point(self, p: &ProjectivePoint) -> Self {
        let (x, y) = p.hash_coordinates();
        self.chain_int(&x).chain_int(&y)
    }

    pub fn chain_k256_point(self, p: &k256::ProjectivePoint) -> Self {
        self.chain_point(&ProjectivePoint::from(p))
    }

    /// The digest as a 256-bit integer.
    pub fn finalize(self) -> BigNumber {
        BigNumber::from_slice(self.hasher.finalize().as_slice())
    }

    /// Unbiased challenge in `[0, modulus)`.
    pub fn challenge(self, modulus: &BigNumber) -> BigNumber {
        numbers::rejection_sample(modulus, &self.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(x: u64) -> BigNumber {
        BigNumber::from(x)
    }

    #[test]
    fn delimiter_separates_inputs() {
        // 0x01, 0x0203 versus 0x0102, 0x03
        let a = Transcript::new().chain_int(&n(0x01)).chain_int(&n(0x0203));
        let b = Transcript::new().chain_int(&n(0x0102)).chain_int(&n(0x03));
        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn zero_is_empty_input() {
        let manual = BigNumber::from_slice(Sha512_256::digest(b"$").as_slice());
        assert_eq!(Transcript::new().chain_int(&BigNumber::zero()).finalize(), manual);
    }

    #[test]
    fn tag_separates_domains() {
        let x = n(42);
        let plain = Transcript::new().chain_int(&x).finalize();
        let tagged0 = Transcript::tagged(0).chain_int(&x).finalize();
        let tagged1 = Transcript::tagged(1).chain_int(&x).finalize();
        assert_ne!(plain, tagged0);
        assert_ne!(tagged0, tagged1);
        assert_eq!(tagged0, Transcript::tagged(0).chain_int(&x).finalize());
    }

    #[test]
    fn challenge_in_range() {
        let q = crate::crypto_tools::curve::secp256k1_modulus();
        let e = Transcript::new().chain_int(&n(7)).challenge(&q);
        assert!(e < q);
    }
}
