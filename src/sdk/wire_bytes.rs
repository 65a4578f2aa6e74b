use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{error, warn};

use super::api::{BytesVec, CggmpError, CggmpResult, Malformed};

const CGGMP_SERIALIZATION_VERSION: u16 = 0;

/// Versioned bincode encoding, used to persist phase output records.
pub fn serialize<T: ?Sized>(value: &T) -> CggmpResult<BytesVec>
where
    T: Serialize,
{
    let payload = bincode_serialize(value)?;
    bincode_serialize(&BytesVecVersioned {
        version: CGGMP_SERIALIZATION_VERSION,
        payload,
    })
}

/// deserialization failures are attributed to the input, not to us
pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> CggmpResult<T> {
    let bytes_versioned: BytesVecVersioned = bincode::deserialize(bytes).map_err(|err| {
        warn!("outer deserialization failure: {}", err.to_string());
        CggmpError::Malformed(Malformed::Wire)
    })?;
    if bytes_versioned.version != CGGMP_SERIALIZATION_VERSION {
        warn!(
            "encoding version {}, expected {}",
            bytes_versioned.version, CGGMP_SERIALIZATION_VERSION
        );
        return Err(CggmpError::Malformed(Malformed::Wire));
    }
    bincode::deserialize(&bytes_versioned.payload).map_err(|err| {
        warn!("inner deserialization failure: {}", err.to_string());
        CggmpError::Malformed(Malformed::Wire)
    })
}

fn bincode_serialize<T: ?Sized + Serialize>(value: &T) -> CggmpResult<BytesVec> {
    bincode::serialize(value).map_err(|err| {
        error!("serialization failure: {}", err.to_string());
        CggmpError::Malformed(Malformed::Wire)
    })
}

#[derive(Serialize, Deserialize)]
struct BytesVecVersioned {
    version: u16,
    payload: BytesVec,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        id: u32,
        share: Vec<u8>,
    }

    #[test]
    fn versioned_round_trip() {
        let record = Record {
            id: 7,
            share: vec![1, 2, 3],
        };
        let bytes = serialize(&record).unwrap();
        let decoded: Record = deserialize(&bytes).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn wrong_version() {
        let bytes = bincode::serialize(&BytesVecVersioned {
            version: CGGMP_SERIALIZATION_VERSION + 1,
            payload: bincode::serialize(&5u32).unwrap(),
        })
        .unwrap();
        assert_eq!(
            deserialize::<u32>(&bytes),
            Err(CggmpError::Malformed(Malformed::Wire))
        );
    }

    #[test]
    fn garbage() {
        assert!(deserialize::<Record>(b"these bytes are corrupted 1234").is_err());
    }
}
