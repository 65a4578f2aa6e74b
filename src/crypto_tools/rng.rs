use std::{
    array::TryFromSliceError,
    convert::{TryFrom, TryInto},
};

use hmac::{Hmac, Mac};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use tracing::error;
use zeroize::Zeroize;

use crate::sdk::api::{CggmpError, CggmpResult, Malformed};

#[derive(Debug, Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretRecoveryKey(pub(crate) [u8; 64]);

impl TryFrom<&[u8]> for SecretRecoveryKey {
    type Error = TryFromSliceError;

    fn try_from(v: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(v.try_into()?))
    }
}

const SESSION_NONCE_LENGTH_MIN: usize = 4;
const SESSION_NONCE_LENGTH_MAX: usize = 256;

/// Deterministic rng for a party's secrets: the same recovery key and
/// session nonce reproduce the same key share.
pub(crate) fn rng_seed(
    tag: u8,
    party_id: u64,
    secret_recovery_key: &SecretRecoveryKey,
    session_nonce: &[u8],
) -> CggmpResult<impl CryptoRng + RngCore> {
    if session_nonce.len() < SESSION_NONCE_LENGTH_MIN
        || session_nonce.len() > SESSION_NONCE_LENGTH_MAX
    {
        error!(
            "invalid session_nonce length {} not in [{},{}]",
            session_nonce.len(),
            SESSION_NONCE_LENGTH_MIN,
            SESSION_NONCE_LENGTH_MAX
        );
        return Err(CggmpError::Malformed(Malformed::ProofInput));
    }

    let mut prf = Hmac::<Sha256>::new_from_slice(&secret_recovery_key.0[..]).map_err(|_| {
        error!("failure to initialize hmac from secret recovery key");
        CggmpError::Malformed(Malformed::ProofInput)
    })?;

    prf.update(&tag.to_be_bytes());
    prf.update(&party_id.to_be_bytes());
    prf.update(session_nonce);

    let seed = prf.finalize().into_bytes().into();

    Ok(ChaCha20Rng::from_seed(seed))
}

#[cfg(test)]
/// return the all-zero array with the first bytes set to the bytes of `index`
pub fn dummy_secret_recovery_key(index: usize) -> SecretRecoveryKey {
    let index_bytes = index.to_be_bytes();
    let mut result = [0; 64];
    for (i, &b) in index_bytes.iter().enumerate() {
        result[i] = b;
    }
    SecretRecoveryKey(result)
}
