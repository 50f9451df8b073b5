// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

//! Canonical CBOR encode/decode over the closed value model

use std::io::Cursor;

use crate::error::{DecodeError, EncodeError};
use crate::value::Value;

/// Encode a value into canonical CBOR bytes.
///
/// Deterministic: the same value always yields the same bytes (map keys are
/// written in sorted order).
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    ciborium::into_writer(&value.to_wire(), &mut buf)
        .map_err(|e| EncodeError::Write(e.to_string()))?;
    Ok(buf)
}

/// Decode canonical CBOR bytes back into a value.
///
/// Strict inverse of [`encode`]: truncated input, trailing bytes after the
/// value, and wire constructs outside the value model all fail. A partially
/// decoded value is never returned.
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    let mut reader = Cursor::new(bytes);
    let wire: ciborium::Value =
        ciborium::from_reader(&mut reader).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    if reader.position() != bytes.len() as u64 {
        return Err(DecodeError::TrailingBytes);
    }
    Value::from_wire(wire)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn sample_value() -> Value {
        let mut inner = BTreeMap::new();
        inner.insert("flag".to_string(), Value::Bool(true));
        inner.insert("blob".to_string(), Value::Bytes(vec![0xde, 0xad]));

        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::Text("nsm".to_string()));
        map.insert("count".to_string(), Value::Int(-42));
        map.insert("ratio".to_string(), Value::Float(0.5));
        map.insert("nothing".to_string(), Value::Null);
        map.insert(
            "items".to_string(),
            Value::Sequence(vec![Value::Int(1), Value::Map(inner)]),
        );
        Value::Map(map)
    }

    #[test]
    fn round_trip_nested_value() {
        let value = sample_value();
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn encoding_is_deterministic() {
        let value = sample_value();
        assert_eq!(encode(&value).unwrap(), encode(&value).unwrap());
    }

    #[test]
    fn text_and_bytes_are_distinct_wire_types() {
        let text = encode(&Value::Text("hi".to_string())).unwrap();
        let bytes = encode(&Value::Bytes(b"hi".to_vec())).unwrap();
        assert_ne!(text, bytes);
        assert_eq!(decode(&text).unwrap(), Value::Text("hi".to_string()));
        assert_eq!(decode(&bytes).unwrap(), Value::Bytes(b"hi".to_vec()));
    }

    #[test]
    fn every_truncation_fails() {
        let bytes = encode(&sample_value()).unwrap();
        for len in 0..bytes.len() {
            let err = decode(&bytes[..len]).unwrap_err();
            assert!(
                matches!(err, DecodeError::Malformed(_)),
                "prefix of {len} bytes: {err}"
            );
        }
    }

    #[test]
    fn trailing_bytes_fail() {
        let mut bytes = encode(&Value::Int(1)).unwrap();
        bytes.push(0x00);
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            DecodeError::TrailingBytes
        ));
    }

    #[test]
    fn tags_are_unsupported() {
        // 0xc0 = tag(0), 0x61 0x41 = text "A"
        let err = decode(&[0xc0, 0x61, 0x41]).unwrap_err();
        assert!(matches!(err, DecodeError::Unsupported(_)));
    }

    #[test]
    fn integer_map_keys_are_rejected() {
        // {1: 2}, a map with an integer key
        let err = decode(&[0xa1, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, DecodeError::NonTextKey));
    }

    #[test]
    fn duplicate_map_keys_are_rejected() {
        // {"a": 1, "a": 2}
        let err = decode(&[0xa2, 0x61, 0x61, 0x01, 0x61, 0x61, 0x02]).unwrap_err();
        assert!(matches!(err, DecodeError::DuplicateKey(_)));
    }

    #[test]
    fn u64_max_is_out_of_range() {
        // 0x1b + 8 bytes = unsigned 0xffff_ffff_ffff_ffff
        let mut bytes = vec![0x1b];
        bytes.extend_from_slice(&u64::MAX.to_be_bytes());
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            DecodeError::IntOutOfRange
        ));
    }
}
