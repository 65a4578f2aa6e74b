//! Paillier encryption with generator `N + 1`.
//!
//! The decryption key owns a copy of the encryption key, so the public half
//! can always be handed out or serialized on its own.

use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use zeroize::Zeroize;

use crate::{
    crypto_tools::{
        constants::PAILLIER_MODULUS_BITS,
        numbers::{self, jacobi},
    },
    sdk::api::{CggmpError, CggmpResult, Malformed},
};

use self::utils::{member_of_mod, member_of_mul_group};

pub mod utils;
pub mod zk;

/// Generate a Paillier keypair from two safe primes.
pub fn keygen() -> CggmpResult<(EncryptionKey, DecryptionKey)> {
    loop {
        let p = BigNumber::safe_prime(PAILLIER_MODULUS_BITS / 2);
        let q = BigNumber::safe_prime(PAILLIER_MODULUS_BITS / 2);
        if p != q {
            return DecryptionKey::from_primes(&p, &q);
        }
    }
}

/// unsafe because key pair does not use safe primes
///
/// Both primes are still `3 mod 4` so every proof about the modulus holds.
pub fn keygen_unsafe() -> CggmpResult<(EncryptionKey, DecryptionKey)> {
    loop {
        let p = blum_prime(PAILLIER_MODULUS_BITS / 2);
        let q = blum_prime(PAILLIER_MODULUS_BITS / 2);
        if p != q {
            return DecryptionKey::from_primes(&p, &q);
        }
    }
}

fn blum_prime(bits: usize) -> BigNumber {
    let four = BigNumber::from(4u64);
    let three = BigNumber::from(3u64);
    loop {
        let p = BigNumber::prime(bits);
        if &p % &four == three {
            return p;
        }
    }
}

/// Wrapper for a `BigNumber` that is zeroized on drop
#[derive(Debug, Clone, PartialEq, Zeroize)]
#[zeroize(drop)]
pub struct SecretNumber(pub(crate) BigNumber);

/// Paillier public key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Zeroize)]
pub struct EncryptionKey {
    n: BigNumber,
    nn: BigNumber,
}

impl EncryptionKey {
    /// The caller is responsible for `n` being a product of two large primes.
    pub fn from_modulus(n: BigNumber) -> Self {
        let nn = &n * &n;
        Self { n, nn }
    }

    pub fn n(&self) -> &BigNumber {
        &self.n
    }

    pub fn nn(&self) -> &BigNumber {
        &self.nn
    }

    /// The generator `N + 1`
    pub fn gamma(&self) -> BigNumber {
        &self.n + &BigNumber::one()
    }

    pub fn sample_randomness(&self, rng: &mut (impl CryptoRng + RngCore)) -> Randomness {
        Randomness(numbers::sample_unit(rng, &self.n))
    }

    pub fn random_plaintext(&self, rng: &mut (impl CryptoRng + RngCore)) -> Plaintext {
        Plaintext(numbers::sample_below(rng, &self.n))
    }

    /// Validate that the `plaintext` is a valid input to the Paillier encryption key.
    pub fn validate_plaintext(&self, p: &Plaintext) -> bool {
        member_of_mod(&p.0, &self.n)
    }

    /// Validate that the `ciphertext` is a valid output of the Paillier encryption key.
    pub fn validate_ciphertext(&self, c: &Ciphertext) -> bool {
        member_of_mul_group(&c.0, &self.nn)
    }

    /// Validate that the `randomness` is a valid input to the Paillier encryption key.
    pub fn validate_randomness(&self, r: &Randomness) -> bool {
        member_of_mul_group(&r.0, &self.n)
    }

    /// Encrypt a plaintext `p` with fresh randomness.
    pub fn encrypt(
        &self,
        rng: &mut (impl CryptoRng + RngCore),
        p: &Plaintext,
    ) -> CggmpResult<(Ciphertext, Randomness)> {
        let r = self.sample_randomness(rng);
        Ok((self.encrypt_with_randomness(p, &r)?, r))
    }

    /// `c = (N+1)^m r^N mod N^2`
    pub fn encrypt_with_randomness(&self, p: &Plaintext, r: &Randomness) -> CggmpResult<Ciphertext> {
        if !self.validate_plaintext(p) {
            error!("paillier encrypt: plaintext not in Z_N");
            return Err(CggmpError::Malformed(Malformed::Message));
        }
        if !self.validate_randomness(r) {
            error!("paillier encrypt: randomness not in Z*_N");
            return Err(CggmpError::Malformed(Malformed::Randomness));
        }
        Ok(Ciphertext(self.encrypt_unchecked(&p.0, &r.0)))
    }

    pub(crate) fn encrypt_unchecked(&self, m: &BigNumber, r: &BigNumber) -> BigNumber {
        // (N+1)^m = 1 + mN mod N^2
        let gm = (BigNumber::one() + m * &self.n) % &self.nn;
        gm.modmul(&r.modpow(&self.n, &self.nn), &self.nn)
    }

    /// Homomorphically add `c1` to `c2`
    pub fn add(&self, c1: &Ciphertext, c2: &Ciphertext) -> Ciphertext {
        Ciphertext(c1.0.modmul(&c2.0, &self.nn))
    }

    /// Homomorphically multiply `c` by `p`
    pub fn mul(&self, c: &Ciphertext, p: &Plaintext) -> Ciphertext {
        Ciphertext(c.0.modpow(&p.0, &self.nn))
    }

    /// Homomorphically multiply `c` by `p`, then re-randomize with `Enc(0, r)`.
    pub fn mul_obfuscated(
        &self,
        rng: &mut (impl CryptoRng + RngCore),
        c: &Ciphertext,
        p: &Plaintext,
    ) -> (Ciphertext, Randomness) {
        let r = self.sample_randomness(rng);
        let mask = Ciphertext(r.0.modpow(&self.n, &self.nn));
        (self.add(&self.mul(c, p), &mask), r)
    }
}

/// Wrapper for Paillier decryption key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Zeroize)]
#[zeroize(drop)]
pub struct DecryptionKey {
    ek: EncryptionKey,
    p: BigNumber,
    q: BigNumber,
    lambda: BigNumber,
    totient: BigNumber,
    /// `L((N+1)^lambda mod N^2)^-1 mod N`
    mu: BigNumber,
}

impl DecryptionKey {
    /// Build a key pair from two distinct primes.
    pub fn from_primes(
        p: &BigNumber,
        q: &BigNumber,
    ) -> CggmpResult<(EncryptionKey, DecryptionKey)> {
        if p == q {
            error!("paillier keygen: equal primes");
            return Err(CggmpError::Malformed(Malformed::Modulus));
        }
        let one = BigNumber::one();
        let ek = EncryptionKey::from_modulus(p * q);
        let (p1, q1) = (p - &one, q - &one);
        let totient = &p1 * &q1;
        let lambda = p1.lcm(&q1);

        let l = l_function(&ek.gamma().modpow(&lambda, ek.nn()), ek.n());
        let mu = l.invert(ek.n()).ok_or_else(|| {
            error!("paillier keygen: decryption constant not invertible");
            CggmpError::Malformed(Malformed::Modulus)
        })?;

        Ok((
            ek.clone(),
            DecryptionKey {
                ek,
                p: p.clone(),
                q: q.clone(),
                lambda,
                totient,
                mu,
            },
        ))
    }

    pub fn encryption_key(&self) -> &EncryptionKey {
        &self.ek
    }

    pub fn p(&self) -> &BigNumber {
        &self.p
    }

    pub fn q(&self) -> &BigNumber {
        &self.q
    }

    pub fn totient(&self) -> &BigNumber {
        &self.totient
    }

    pub fn lambda(&self) -> &BigNumber {
        &self.lambda
    }

    /// `m = L(c^lambda mod N^2) mu mod N`
    pub fn decrypt(&self, c: &Ciphertext) -> CggmpResult<Plaintext> {
        if !self.ek.validate_ciphertext(c) {
            warn!("paillier decrypt: ciphertext not in Z*_N^2");
            return Err(CggmpError::Malformed(Malformed::Ciphertext));
        }
        let l = l_function(&c.0.modpow(&self.lambda, self.ek.nn()), self.ek.n());
        Ok(Plaintext(l.modmul(&self.mu, self.ek.n())))
    }

    /// Recover the `r` with `c = Enc(m, r)`.
    ///
    /// `c (1 - mN) = r^N mod N^2`, and `N` is invertible mod `phi(N)`.
    pub fn recover_randomness(&self, c: &Ciphertext) -> CggmpResult<Randomness> {
        let m = self.decrypt(c)?;
        Ok(Randomness(self.recover_randomness_unchecked(&c.0, &m.0)?))
    }

    pub fn decrypt_with_randomness(&self, c: &Ciphertext) -> CggmpResult<(Plaintext, Randomness)> {
        let m = self.decrypt(c)?;
        let r = self.recover_randomness_unchecked(&c.0, &m.0)?;
        Ok((m, Randomness(r)))
    }

    fn recover_randomness_unchecked(&self, c: &BigNumber, m: &BigNumber) -> CggmpResult<BigNumber> {
        let (n, nn) = (self.ek.n(), self.ek.nn());
        // (N+1)^-m = 1 - mN mod N^2
        let g_inv_m = (nn - &((m * n) % nn) + BigNumber::one()) % nn;
        let c0 = c.modmul(&g_inv_m, nn) % n;
        let n_inv = n.invert(&self.totient).ok_or_else(|| {
            error!("paillier: N not invertible mod phi(N)");
            CggmpError::Malformed(Malformed::Modulus)
        })?;
        Ok(c0.modpow(&n_inv, n))
    }

    /// Quadratic residuosity modulo both prime factors.
    pub(crate) fn is_quadratic_residue(&self, x: &BigNumber) -> bool {
        jacobi(x, &self.p) == 1 && jacobi(x, &self.q) == 1
    }
}

/// `L(x) = (x - 1) / N`
fn l_function(x: &BigNumber, n: &BigNumber) -> BigNumber {
    (x - &BigNumber::one()) / n
}

/// Wrapper for Paillier plaintext
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Zeroize)]
#[zeroize(drop)]
pub struct Plaintext(pub(crate) BigNumber);

impl Plaintext {
    pub fn from_scalar(s: &k256::Scalar) -> Self {
        Self(crate::crypto_tools::curve::to_bigint(s))
    }

    pub fn to_scalar(&self) -> k256::Scalar {
        crate::crypto_tools::curve::to_scalar(&self.0)
    }

    pub fn as_bigint(&self) -> &BigNumber {
        &self.0
    }
}

impl From<BigNumber> for Plaintext {
    fn from(n: BigNumber) -> Self {
        Self(n)
    }
}

/// Wrapper for Paillier ciphertext
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ciphertext(pub(crate) BigNumber);

impl Ciphertext {
    pub fn as_bigint(&self) -> &BigNumber {
        &self.0
    }
}

impl From<BigNumber> for Ciphertext {
    fn from(n: BigNumber) -> Self {
        Self(n)
    }
}

/// Wrapper for randomness used in Paillier encryption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Zeroize)]
#[zeroize(drop)]
pub struct Randomness(pub(crate) BigNumber);

impl Randomness {
    pub fn as_bigint(&self) -> &BigNumber {
        &self.0
    }
}

impl From<BigNumber> for Randomness {
    fn from(n: BigNumber) -> Self {
        Self(n)
    }
}
