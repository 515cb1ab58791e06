//! CBOR wire encoding for update deltas.
//!
//! Framing and transport are up to the embedding application; this module
//! only turns a delta into bytes and back. Decoded deltas are validated
//! before they are handed to the caller.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::delta::UpdateDelta;
use crate::error::{CoreError, Result};

/// Encode a delta to CBOR bytes.
pub fn encode_delta<T: Serialize>(delta: &UpdateDelta<T>) -> Result<Bytes> {
    let mut buf = Vec::new();
    ciborium::into_writer(delta, &mut buf).map_err(|e| CoreError::Encoding(e.to_string()))?;
    Ok(Bytes::from(buf))
}

/// Decode and validate a delta from CBOR bytes.
pub fn decode_delta<T: DeserializeOwned>(bytes: &[u8]) -> Result<UpdateDelta<T>> {
    let delta: UpdateDelta<T> =
        ciborium::from_reader(bytes).map_err(|e| CoreError::Decoding(e.to_string()))?;
    delta.validate()?;
    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{VersionId, NO_VERSION};

    #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    struct Header {
        id: u64,
        name: String,
    }

    #[test]
    fn test_struct_elements_survive_encoding() {
        let delta = UpdateDelta {
            base_version: VersionId(-7),
            result_version: VersionId(i32::MAX),
            added: vec![Header {
                id: 1,
                name: "orders".into(),
            }],
            removed: vec![Header {
                id: 2,
                name: "legacy".into(),
            }],
        };

        let bytes = encode_delta(&delta).unwrap();
        let decoded: UpdateDelta<Header> = decode_delta(&bytes).unwrap();
        assert_eq!(decoded, delta);
    }

    #[test]
    fn test_decode_rejects_sentinel_result() {
        let delta = UpdateDelta::<u32>::rebase(NO_VERSION, vec![1]);
        let bytes = encode_delta(&delta).unwrap();
        let err = decode_delta::<u32>(&bytes).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDelta(_)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_delta::<u32>(&[0xff, 0x00, 0x13]).unwrap_err();
        assert!(matches!(err, CoreError::Decoding(_)));
    }

    #[test]
    fn test_decode_rejects_wrong_element_type() {
        let delta = UpdateDelta::rebase(VersionId(1), vec!["text".to_string()]);
        let bytes = encode_delta(&delta).unwrap();
        assert!(decode_delta::<u32>(&bytes).is_err());
    }
}
