pub mod cggmp;
mod crypto_tools;
pub mod ecdsa;
pub mod sdk;
