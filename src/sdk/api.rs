//! API for cggmp2p users
use std::fmt;

pub type CggmpResult<T> = Result<T, CggmpError>;
pub type BytesVec = Vec<u8>;

/// Everything that can make a round call fail.
///
/// Local input problems are [CggmpError::Malformed]. A counterparty message
/// that fails a commitment, proof or consistency check is
/// [CggmpError::Verification]. Calling a round before its predecessor is
/// [CggmpError::OutOfOrder]. None of these are recoverable within a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CggmpError {
    Malformed(Malformed),
    Verification,
    OutOfOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    /// Paillier plaintext outside `[0, N)`
    Message,
    /// Paillier randomness outside `Z*_N`
    Randomness,
    /// Paillier ciphertext outside `Z*_N^2`
    Ciphertext,
    Scalar,
    Point,
    /// structured wire value of the wrong shape
    Wire,
    /// missing or zero-valued proof input
    ProofInput,
    /// Paillier or Ring-Pedersen modulus unusable
    Modulus,
}

impl fmt::Display for CggmpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CggmpError::Malformed(m) => write!(f, "malformed input: {:?}", m),
            CggmpError::Verification => write!(f, "counterparty verification failure"),
            CggmpError::OutOfOrder => write!(f, "round invoked out of order"),
        }
    }
}

impl std::error::Error for CggmpError {}

impl From<Malformed> for CggmpError {
    fn from(m: Malformed) -> Self {
        CggmpError::Malformed(m)
    }
}

/// Expose the crate's (de)serialization functions
/// that use the appropriate bincode config options.
pub use super::wire_bytes::{deserialize, serialize};
