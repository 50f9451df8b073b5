// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

//! Closed value model for canonical encoding
//!
//! Every value that crosses the envelope boundary is represented by [`Value`]:
//! maps with unique text keys, insertion-ordered sequences, text, byte
//! strings, integers, floats, booleans and null. Anything else (CBOR tags,
//! non-text map keys, integers beyond `i64`) is rejected at the boundary
//! instead of being carried around half-supported.

use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{DecodeError, EncodeError};

/// A canonically encodable value.
///
/// Maps use `BTreeMap` so that encoding a value is deterministic: the same
/// value always produces the same bytes. Cycles are unrepresentable since the
/// tree owns its children.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// CBOR null
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text string (distinct wire type from `Bytes`)
    Text(String),
    /// Byte string (distinct wire type from `Text`)
    Bytes(Vec<u8>),
    /// Ordered sequence
    Sequence(Vec<Value>),
    /// Map with unique text keys
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Convert any serde-serializable input into the value model.
    ///
    /// This is the boundary for arbitrary caller input: anything the model
    /// cannot represent fails here with [`EncodeError`] rather than deeper in
    /// the codec.
    pub fn serialized<T: Serialize + ?Sized>(input: &T) -> Result<Self, EncodeError> {
        let wire = ciborium::Value::serialized(input)
            .map_err(|e| EncodeError::Unrepresentable(e.to_string()))?;
        Self::from_wire(wire).map_err(|e| EncodeError::Unrepresentable(e.to_string()))
    }

    /// Convert a decoded value into a serde-deserializable type.
    pub fn deserialized<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        self.to_wire()
            .deserialized()
            .map_err(|e| DecodeError::Malformed(e.to_string()))
    }

    /// Lower into the ciborium representation for writing.
    pub(crate) fn to_wire(&self) -> ciborium::Value {
        match self {
            Self::Null => ciborium::Value::Null,
            Self::Bool(b) => ciborium::Value::Bool(*b),
            Self::Int(i) => ciborium::Value::Integer((*i).into()),
            Self::Float(f) => ciborium::Value::Float(*f),
            Self::Text(s) => ciborium::Value::Text(s.clone()),
            Self::Bytes(b) => ciborium::Value::Bytes(b.clone()),
            Self::Sequence(seq) => {
                ciborium::Value::Array(seq.iter().map(Value::to_wire).collect())
            }
            Self::Map(map) => ciborium::Value::Map(
                map.iter()
                    .map(|(k, v)| (ciborium::Value::Text(k.clone()), v.to_wire()))
                    .collect(),
            ),
        }
    }

    /// Lift a ciborium value into the model, rejecting unsupported constructs.
    pub(crate) fn from_wire(wire: ciborium::Value) -> Result<Self, DecodeError> {
        match wire {
            ciborium::Value::Null => Ok(Self::Null),
            ciborium::Value::Bool(b) => Ok(Self::Bool(b)),
            ciborium::Value::Integer(i) => {
                let wide: i128 = i.into();
                let narrow = i64::try_from(wide).map_err(|_| DecodeError::IntOutOfRange)?;
                Ok(Self::Int(narrow))
            }
            ciborium::Value::Float(f) => Ok(Self::Float(f)),
            ciborium::Value::Text(s) => Ok(Self::Text(s)),
            ciborium::Value::Bytes(b) => Ok(Self::Bytes(b)),
            ciborium::Value::Array(items) => {
                let seq = items
                    .into_iter()
                    .map(Self::from_wire)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::Sequence(seq))
            }
            ciborium::Value::Map(entries) => {
                let mut map = BTreeMap::new();
                for (key, value) in entries {
                    let ciborium::Value::Text(key) = key else {
                        return Err(DecodeError::NonTextKey);
                    };
                    let value = Self::from_wire(value)?;
                    if map.insert(key.clone(), value).is_some() {
                        return Err(DecodeError::DuplicateKey(key));
                    }
                }
                Ok(Self::Map(map))
            }
            ciborium::Value::Tag(tag, _) => Err(DecodeError::Unsupported(format!("tag {tag}"))),
            other => Err(DecodeError::Unsupported(format!("{other:?}"))),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}
