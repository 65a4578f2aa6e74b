//! Structured-value encoding of protocol messages for the transport.
//!
//! Integers are exact JSON numbers, points are
//! `{"is_infinity": bool, "x": "0x..", "y": "0x.."}` and proofs are arrays of
//! hex strings, one per field. Decoding never reduces: values out of range
//! are refused.
use libpaillier::unknown_order::BigNumber;
use serde_json::{json, Number, Value};
use std::str::FromStr;
use tracing::{error, warn};

use crate::{
    crypto_tools::{
        curve::{secp256k1_modulus, to_bigint, to_scalar},
        k256_serde::ProjectivePoint,
        numbers,
        paillier::zk::ProofParts,
    },
    sdk::api::{BytesVec, CggmpError, CggmpResult, Malformed},
};

/// A closed set of message records, each with a hand-written codec.
pub trait WireMessage: Sized {
    fn to_wire(&self) -> CggmpResult<Value>;
    fn from_wire(value: &Value) -> CggmpResult<Self>;

    fn to_json(&self) -> CggmpResult<String> {
        Ok(self.to_wire()?.to_string())
    }

    fn from_json(s: &str) -> CggmpResult<Self> {
        let value: Value = serde_json::from_str(s).map_err(|err| {
            warn!("json parse failure: {}", err);
            CggmpError::Malformed(Malformed::Wire)
        })?;
        Self::from_wire(&value)
    }
}

fn malformed_wire(what: &str) -> CggmpError {
    warn!("wire: malformed {}", what);
    CggmpError::Malformed(Malformed::Wire)
}

/// Look up a named field of a wire object.
pub fn field<'a>(value: &'a Value, name: &str) -> CggmpResult<&'a Value> {
    value
        .as_object()
        .and_then(|object| object.get(name))
        .ok_or_else(|| malformed_wire(name))
}

pub fn int_to_wire(x: &BigNumber) -> CggmpResult<Value> {
    if x < &BigNumber::zero() {
        error!("wire: negative integer");
        return Err(CggmpError::Malformed(Malformed::Wire));
    }
    Number::from_str(&numbers::to_decimal(x))
        .map(Value::Number)
        .map_err(|err| {
            error!("wire: integer encoding failure: {}", err);
            CggmpError::Malformed(Malformed::Wire)
        })
}

/// Non-negative integers only.
pub fn int_from_wire(value: &Value) -> CggmpResult<BigNumber> {
    match value {
        Value::Number(n) => {
            numbers::from_decimal(&n.to_string()).ok_or_else(|| malformed_wire("integer"))
        }
        _ => Err(malformed_wire("integer")),
    }
}

/// Party ids are plain JSON integers.
pub fn u64_from_wire(value: &Value) -> CggmpResult<u64> {
    value.as_u64().ok_or_else(|| malformed_wire("id"))
}

pub fn scalar_to_wire(s: &k256::Scalar) -> CggmpResult<Value> {
    int_to_wire(&to_bigint(s))
}

/// Refuses integers not less than the curve order.
pub fn scalar_from_wire(value: &Value) -> CggmpResult<k256::Scalar> {
    let x = int_from_wire(value)?;
    if x >= secp256k1_modulus() {
        warn!("wire: scalar not in Z_q");
        return Err(CggmpError::Malformed(Malformed::Scalar));
    }
    Ok(to_scalar(&x))
}

/// `0x`-prefixed lowercase hex without leading zeros; zero is `0x0`.
fn int_to_hex(x: &BigNumber) -> String {
    let digits = hex::encode(numbers::to_be_bytes(x));
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{}", digits)
    }
}

fn int_from_hex(value: &Value) -> CggmpResult<BigNumber> {
    let s = value.as_str().ok_or_else(|| malformed_wire("hex coordinate"))?;
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| malformed_wire("hex coordinate"))?;
    if digits.is_empty() {
        return Err(malformed_wire("hex coordinate"));
    }
    let padded = if digits.len() % 2 == 1 {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };
    let bytes = hex::decode(padded).map_err(|_| malformed_wire("hex coordinate"))?;
    Ok(numbers::from_be_bytes(&bytes))
}

pub fn point_to_wire(p: &k256::ProjectivePoint) -> Value {
    match ProjectivePoint::from(p).coordinates() {
        Some((x, y)) => json!({
            "is_infinity": false,
            "x": int_to_hex(&x),
            "y": int_to_hex(&y),
        }),
        None => json!({
            "is_infinity": true,
            "x": "0x0",
            "y": "0x0",
        }),
    }
}

/// Coordinates must be canonical and on the curve.
pub fn point_from_wire(value: &Value) -> CggmpResult<k256::ProjectivePoint> {
    let is_infinity = field(value, "is_infinity")?
        .as_bool()
        .ok_or_else(|| malformed_wire("is_infinity"))?;
    if is_infinity {
        return Ok(k256::ProjectivePoint::IDENTITY);
    }
    let x = int_from_hex(field(value, "x")?)?;
    let y = int_from_hex(field(value, "y")?)?;
    ProjectivePoint::from_coordinates(&x, &y)
        .map(|p| *p.as_ref())
        .ok_or_else(|| {
            warn!("wire: point not on curve");
            CggmpError::Malformed(Malformed::Point)
        })
}

pub fn bytes_list_to_wire(parts: &[BytesVec]) -> Value {
    Value::Array(parts.iter().map(|p| Value::String(hex::encode(p))).collect())
}

pub fn bytes_list_from_wire(value: &Value) -> CggmpResult<Vec<BytesVec>> {
    value
        .as_array()
        .ok_or_else(|| malformed_wire("byte list"))?
        .iter()
        .map(|part| {
            part.as_str()
                .and_then(|s| hex::decode(s).ok())
                .ok_or_else(|| malformed_wire("byte list entry"))
        })
        .collect()
}

pub fn proof_to_wire<P: ProofParts>(proof: &P) -> Value {
    bytes_list_to_wire(&proof.to_parts())
}

/// Fails on a list of the wrong length, see [ProofParts::from_parts].
pub fn proof_from_wire<P: ProofParts>(value: &Value) -> CggmpResult<P> {
    P::from_parts(&bytes_list_from_wire(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_tools::k256_serde::random_nonzero_scalar;

    #[test]
    fn big_integers_stay_exact() {
        let big = (BigNumber::one() << 2048usize) - BigNumber::from(3u64);
        let value = int_to_wire(&big).unwrap();
        let text = value.to_string();
        assert!(text.chars().all(|c| c.is_ascii_digit()));

        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(int_from_wire(&parsed).unwrap(), big);
        assert_eq!(int_to_wire(&BigNumber::zero()).unwrap().to_string(), "0");
    }

    #[test]
    fn integers_refused() {
        for bad in ["-5", "1.5", "\"12\"", "null", "1e3"] {
            let value: Value = serde_json::from_str(bad).unwrap();
            assert_eq!(
                int_from_wire(&value),
                Err(CggmpError::Malformed(Malformed::Wire)),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn scalar_range() {
        let q = secp256k1_modulus();
        let value = int_to_wire(&q).unwrap();
        assert_eq!(
            scalar_from_wire(&value),
            Err(CggmpError::Malformed(Malformed::Scalar))
        );
        let value = int_to_wire(&(&q - &BigNumber::one())).unwrap();
        assert_eq!(scalar_from_wire(&value).unwrap(), -k256::Scalar::ONE);
    }

    #[test]
    fn points() {
        let p = k256::ProjectivePoint::GENERATOR * random_nonzero_scalar(&mut rand::thread_rng());
        let value = point_to_wire(&p);
        assert_eq!(value["is_infinity"], Value::Bool(false));
        assert!(value["x"].as_str().unwrap().starts_with("0x"));
        assert_eq!(point_from_wire(&value).unwrap(), p);

        let identity = point_to_wire(&k256::ProjectivePoint::IDENTITY);
        assert_eq!(
            identity,
            json!({"is_infinity": true, "x": "0x0", "y": "0x0"})
        );
        assert_eq!(
            point_from_wire(&identity).unwrap(),
            k256::ProjectivePoint::IDENTITY
        );

        // generator with y + 1 is off the curve
        let g = point_to_wire(&k256::ProjectivePoint::GENERATOR);
        let y = int_from_hex(&g["y"]).unwrap() + BigNumber::one();
        let off_curve = json!({"is_infinity": false, "x": g["x"], "y": int_to_hex(&y)});
        assert_eq!(
            point_from_wire(&off_curve),
            Err(CggmpError::Malformed(Malformed::Point))
        );

        assert!(point_from_wire(&json!({"x": "0x1"})).is_err());
        assert!(point_from_wire(&json!({"is_infinity": false, "x": "12", "y": "0x1"})).is_err());
    }

    #[test]
    fn hex_without_leading_zeros() {
        assert_eq!(int_to_hex(&BigNumber::from(0x0fu64)), "0xf");
        assert_eq!(int_to_hex(&BigNumber::from(0x1234u64)), "0x1234");
        assert_eq!(
            int_from_hex(&json!("0xf")).unwrap(),
            BigNumber::from(0x0fu64)
        );
    }

    #[test]
    fn byte_lists() {
        let parts = vec![vec![], vec![0x01, 0xab], vec![0xff]];
        let value = bytes_list_to_wire(&parts);
        assert_eq!(value, json!(["", "01ab", "ff"]));
        assert_eq!(bytes_list_from_wire(&value).unwrap(), parts);

        assert!(bytes_list_from_wire(&json!(["zz"])).is_err());
        assert!(bytes_list_from_wire(&json!("01ab")).is_err());
    }
}
