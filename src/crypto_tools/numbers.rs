//! Number-theory helpers over [BigNumber].
//!
//! Everything that touches the binary representation of an integer lives
//! here so that the rest of the crate only sees arithmetic.
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::sdk::api::BytesVec;

/// Minimal big-endian encoding; zero encodes as the empty string.
pub fn to_be_bytes(x: &BigNumber) -> BytesVec {
    let bytes = x.to_bytes();
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[first_nonzero..].to_vec()
}

pub fn from_be_bytes(bytes: &[u8]) -> BigNumber {
    if bytes.iter().all(|&b| b == 0) {
        return BigNumber::zero();
    }
    BigNumber::from_slice(bytes)
}

/// Left-pad the minimal encoding of `x` to `len` bytes.
/// Returns `None` if `x` does not fit.
pub fn to_be_bytes_padded(x: &BigNumber, len: usize) -> Option<BytesVec> {
    let bytes = to_be_bytes(x);
    if bytes.len() > len {
        return None;
    }
    let mut padded = vec![0; len];
    padded[len - bytes.len()..].copy_from_slice(&bytes);
    Some(padded)
}

pub fn is_zero(x: &BigNumber) -> bool {
    x == &BigNumber::zero()
}

pub fn is_even(x: &BigNumber) -> bool {
    low_byte(x) & 1 == 0
}

fn low_byte(x: &BigNumber) -> u8 {
    to_be_bytes(x).last().copied().unwrap_or(0)
}

/// Bit `i` of a non-negative integer, least significant first.
pub fn bit(x: &BigNumber, i: usize) -> bool {
    let bytes = to_be_bytes(x);
    let byte_index = i / 8;
    if byte_index >= bytes.len() {
        return false;
    }
    (bytes[bytes.len() - 1 - byte_index] >> (i % 8)) & 1 == 1
}

/// Bitwise xor of two non-negative integers.
pub fn xor(a: &BigNumber, b: &BigNumber) -> BigNumber {
    let (a, b) = (to_be_bytes(a), to_be_bytes(b));
    let len = a.len().max(b.len());
    let mut out = vec![0u8; len];
    for (i, byte) in a.iter().rev().enumerate() {
        out[len - 1 - i] ^= byte;
    }
    for (i, byte) in b.iter().rev().enumerate() {
        out[len - 1 - i] ^= byte;
    }
    from_be_bytes(&out)
}

/// Jacobi symbol `(a/n)` for odd positive `n`.
pub fn jacobi(a: &BigNumber, n: &BigNumber) -> i8 {
    let zero = BigNumber::zero();
    let mut a = a % n;
    if a < zero {
        a = &a + n;
    }
    let mut n = n.clone();
    let mut result = 1i8;

    while !is_zero(&a) {
        while is_even(&a) {
            a = a >> 1usize;
            let n_mod_8 = low_byte(&n) & 7;
            if n_mod_8 == 3 || n_mod_8 == 5 {
                result = -result;
            }
        }
        std::mem::swap(&mut a, &mut n);
        if low_byte(&a) & 3 == 3 && low_byte(&n) & 3 == 3 {
            result = -result;
        }
        a = &a % &n;
    }

    if n.is_one() {
        result
    } else {
        0
    }
}

/// Floor of the square root of a non-negative integer.
pub fn isqrt(n: &BigNumber) -> BigNumber {
    if n < &BigNumber::from(2u64) {
        return n.clone();
    }
    // start above the root, Newton iteration decreases monotonically
    let mut x = BigNumber::one() << ((n.bit_length() + 1) / 2);
    loop {
        let y = (&x + &(n / &x)) >> 1usize;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Uniform sample from `[0, n)`.
pub fn sample_below(rng: &mut (impl CryptoRng + RngCore), n: &BigNumber) -> BigNumber {
    BigNumber::from_rng(n, rng)
}

/// Uniform sample from `[1, n)`.
pub fn sample_nonzero_below(rng: &mut (impl CryptoRng + RngCore), n: &BigNumber) -> BigNumber {
    loop {
        let x = sample_below(rng, n);
        if !is_zero(&x) {
            return x;
        }
    }
}

/// Uniform sample from `Z*_n`.
pub fn sample_unit(rng: &mut (impl CryptoRng + RngCore), n: &BigNumber) -> BigNumber {
    loop {
        let x = sample_nonzero_below(rng, n);
        if x.gcd(n).is_one() {
            return x;
        }
    }
}

/// Deterministically map `seed` to a uniform integer in `[0, modulus)`.
///
/// 256-bit blocks `SHA256(decimal(seed + i))` are appended until the
/// accumulator reaches `modulus`, so the final reduction carries negligible bias.
pub fn rejection_sample(modulus: &BigNumber, seed: &BigNumber) -> BigNumber {
    let mut acc = BigNumber::zero();
    let mut i = 0u64;
    while &acc < modulus {
        let block = Sha256::digest(to_decimal(&(seed + &BigNumber::from(i))).as_bytes());
        acc = (acc << 256usize) + BigNumber::from_slice(block.as_slice());
        i += 1;
    }
    acc % modulus
}

/// Decimal rendering of a non-negative integer.
pub fn to_decimal(x: &BigNumber) -> String {
    let mut digits: Vec<u8> = Vec::new();
    let mut value = to_be_bytes(x);
    while !value.is_empty() {
        // divide the big-endian byte string by 10, keep the remainder
        let mut remainder = 0u32;
        let mut quotient = Vec::with_capacity(value.len());
        for &byte in &value {
            let acc = (remainder << 8) | u32::from(byte);
            let q = (acc / 10) as u8;
            remainder = acc % 10;
            if !(quotient.is_empty() && q == 0) {
                quotient.push(q);
            }
        }
        digits.push(b'0' + remainder as u8);
        value = quotient;
    }
    if digits.is_empty() {
        return "0".to_string();
    }
    digits.iter().rev().map(|&d| d as char).collect()
}

pub fn from_decimal(s: &str) -> Option<BigNumber> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // accumulate in base 256, little-endian
    let mut bytes: Vec<u8> = Vec::new();
    for digit in s.bytes() {
        let mut carry = u32::from(digit - b'0');
        for byte in bytes.iter_mut() {
            let acc = u32::from(*byte) * 10 + carry;
            *byte = (acc & 0xff) as u8;
            carry = acc >> 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }
    bytes.reverse();
    Some(from_be_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(x: u64) -> BigNumber {
        BigNumber::from(x)
    }

    #[test]
    fn zero_encodes_empty() {
        assert!(to_be_bytes(&BigNumber::zero()).is_empty());
        assert_eq!(from_be_bytes(&[]), BigNumber::zero());
        assert_eq!(to_be_bytes(&n(0x0102)), vec![1, 2]);
        assert_eq!(from_be_bytes(&[0, 0, 1, 2]), n(0x0102));
    }

    #[test]
    fn jacobi_small() {
        // (a/15) for a = 1..15 computed by hand
        let expected = [1, 1, 0, 1, 0, 0, -1, 1, 0, 0, -1, 0, -1, -1, 0];
        for (a, &e) in (1..=15u64).zip(expected.iter()) {
            assert_eq!(jacobi(&n(a), &n(15)), e, "(a/15) for a = {}", a);
        }
        // quadratic residues mod the prime 23
        for x in 1..23u64 {
            assert_eq!(jacobi(&n(x * x % 23), &n(23)), 1);
        }
        assert_eq!(jacobi(&n(5), &n(23)), -1);
    }

    #[test]
    fn isqrt_floor() {
        for x in [0u64, 1, 2, 3, 4, 15, 16, 17, 1 << 40, (1 << 40) + 1, u64::MAX] {
            let r = isqrt(&n(x));
            assert!(&r * &r <= n(x));
            let r1 = &r + &BigNumber::one();
            assert!(&r1 * &r1 > n(x));
        }
    }

    #[test]
    fn bits_and_xor() {
        let x = n(0b1010_0000_0001);
        assert!(bit(&x, 0));
        assert!(!bit(&x, 1));
        assert!(bit(&x, 9));
        assert!(bit(&x, 11));
        assert!(!bit(&x, 300));
        assert_eq!(xor(&n(0xff00), &n(0x0ff0)), n(0xf0f0));
        assert_eq!(xor(&n(7), &n(7)), BigNumber::zero());
        assert!(is_even(&n(10)) && !is_even(&n(11)) && is_even(&BigNumber::zero()));
    }

    #[test]
    fn rejection_sample_deterministic_in_range() {
        let modulus = (BigNumber::one() << 300usize) + n(12345);
        let seed = n(42);
        let a = rejection_sample(&modulus, &seed);
        assert_eq!(a, rejection_sample(&modulus, &seed));
        assert!(a < modulus);
        assert_ne!(a, rejection_sample(&modulus, &n(43)));
    }

    #[test]
    fn decimal() {
        for x in [0u64, 9, 10, 255, 256, 1234567890123, u64::MAX] {
            assert_eq!(to_decimal(&n(x)), x.to_string());
            assert_eq!(from_decimal(&x.to_string()), Some(n(x)));
        }
        let big = (BigNumber::one() << 2048usize) - BigNumber::one();
        assert_eq!(from_decimal(&to_decimal(&big)), Some(big));
        assert_eq!(from_decimal("12a"), None);
        assert_eq!(from_decimal(""), None);
    }
}
