// Domain separation constants for hash function calls
pub const KEYGEN_COMMIT_TAG: u8 = 0x00;
pub const KEYGEN_PROOF_COMMIT_TAG: u8 = 0x01;
pub const AUX_COMMIT_TAG: u8 = 0x02;
pub const MTA_BLINDING_TAG: u8 = 0x03;

// Domain separation for seeding the RNG
pub const KEYGEN_RNG_TAG: u8 = 0x00;

/// Paillier modulus size generated by each party.
pub const PAILLIER_MODULUS_BITS: usize = 2048;

/// The product of two 1024-bit primes can be 2047 bits.
pub const PAILLIER_MODULUS_MIN_BITS: usize = 2047;

/// Challenges per Mod and Prm proof; each one halves the cheating probability.
pub const MOD_PROOF_ITERATIONS: usize = 80;
pub const PRM_PROOF_ITERATIONS: usize = 80;

/// Bit length bounds of the packed Mod proof choice bits:
/// a 0xff header byte followed by one byte per iteration.
pub const MOD_PROOF_PACKED_MIN_BITS: usize = 8 * MOD_PROOF_ITERATIONS;
pub const MOD_PROOF_PACKED_MAX_BITS: usize = 8 * (MOD_PROOF_ITERATIONS + 1);
