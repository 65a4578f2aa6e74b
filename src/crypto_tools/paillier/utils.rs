use libpaillier::unknown_order::BigNumber;

/// Check if `x` is a member of the integers modulo `Z_n`
pub(crate) fn member_of_mod(x: &BigNumber, n: &BigNumber) -> bool {
    if x < &BigNumber::zero() || x >= n {
        return false;
    }

    true
}

/// Check if `x` is a member of the multiplicative group `Z*_n`
pub(crate) fn member_of_mul_group(x: &BigNumber, n: &BigNumber) -> bool {
    if x < &BigNumber::one() || x >= n {
        return false;
    }

    if !x.gcd(n).is_one() {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(x: u64) -> BigNumber {
        BigNumber::from(x)
    }

    #[test]
    fn membership() {
        assert!(member_of_mod(&n(0), &n(15)));
        assert!(!member_of_mod(&n(15), &n(15)));

        assert!(member_of_mul_group(&n(2), &n(15)));
        assert!(!member_of_mul_group(&n(0), &n(15)));
        assert!(!member_of_mul_group(&n(5), &n(15)));
        assert!(!member_of_mul_group(&n(16), &n(15)));
    }
}
