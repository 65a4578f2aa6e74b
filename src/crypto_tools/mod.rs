pub mod constants;
pub mod curve;
pub mod hash;
pub mod k256_serde;
pub mod mta;
pub mod numbers;
pub mod paillier;
pub mod rng;
pub mod zkp;
