//! Two-party CGGMP21 ECDSA: four phases run in order, each a chain of
//! round structs where every round consumes the previous one.
//!
//! [keygen] → [aux_info] → [presign] → [sign], sequenced by [party::Party].
pub mod aux_info;
pub mod keygen;
pub mod party;
pub mod presign;
pub mod sign;
pub use crate::crypto_tools::curve::CurveParams;
