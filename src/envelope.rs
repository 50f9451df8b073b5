// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

//! Signed envelope disassembly
//!
//! An NSM attestation document is a COSE_Sign1-shaped CBOR array:
//! `[protected, unprotected, payload, signature]`. This module splits such an
//! envelope into its four fields and recursively decodes the fields that
//! arrive as encoded byte strings. The native encoder is inconsistent about
//! two of them: `unprotected` and the payload's `user_data` key sometimes
//! arrive already decoded. That tolerance is part of the protocol and is kept
//! as-is via [`MaybeEncoded`].

use std::collections::BTreeMap;
use std::io::Cursor;

use tracing::debug;

use crate::codec;
use crate::error::{DecodeError, EnvelopeError, EnvelopeField};
use crate::value::Value;

/// CBOR tag for a COSE_Sign1 structure
const COSE_SIGN1_TAG: u64 = 18;

/// Payload key holding the caller's original input
pub const USER_DATA_KEY: &str = "user_data";

/// A field the producer emits either as encoded bytes or already decoded.
///
/// Classified once from the runtime representation; resolution decodes the
/// raw form exactly once and passes the decoded form through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum MaybeEncoded {
    /// Still an encoded byte string
    Raw(Vec<u8>),
    /// Already a decoded value
    Decoded(Value),
}

impl MaybeEncoded {
    /// Classify a decoded envelope element by its runtime representation.
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Bytes(bytes) => Self::Raw(bytes),
            other => Self::Decoded(other),
        }
    }

    /// Resolve to a plain value, decoding the raw form if necessary.
    pub fn resolve(self) -> Result<Value, DecodeError> {
        match self {
            Self::Raw(bytes) => codec::decode(&bytes),
            Self::Decoded(value) => Ok(value),
        }
    }
}

/// A signed envelope split into its four constituent fields.
///
/// Structural decoding only: the signature is carried through as raw bytes
/// for a caller-supplied verifier, nothing is verified here.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEnvelope {
    /// Decoded protected headers
    pub protected: Value,
    /// Decoded unprotected headers
    pub unprotected: Value,
    /// Flat payload map; `user_data` is resolved in place, other keys pass
    /// through as-is
    pub payload: BTreeMap<String, Value>,
    /// Raw signature bytes, untouched
    pub signature: Vec<u8>,
}

/// Split a signed envelope into `{protected, unprotected, payload, signature}`.
///
/// Accepts a bare 4-element array or one wrapped in the COSE_Sign1 tag (18).
/// `protected` and `payload` must be encoded byte strings; `unprotected` and
/// the payload's `user_data` key are decoded only if they still are.
pub fn decode_envelope(bytes: &[u8]) -> Result<DecodedEnvelope, EnvelopeError> {
    let mut reader = Cursor::new(bytes);
    let wire: ciborium::Value = ciborium::from_reader(&mut reader)
        .map_err(|e| DecodeError::Malformed(e.to_string()))
        .map_err(EnvelopeError::field(EnvelopeField::Envelope))?;
    if reader.position() != bytes.len() as u64 {
        return Err(EnvelopeError::Field {
            field: EnvelopeField::Envelope,
            source: DecodeError::TrailingBytes,
        });
    }

    // Some producers emit the tagged form, some the bare array
    let wire = match wire {
        ciborium::Value::Tag(COSE_SIGN1_TAG, inner) => *inner,
        other => other,
    };

    let outer = Value::from_wire(wire).map_err(EnvelopeError::field(EnvelopeField::Envelope))?;
    let Value::Sequence(elements) = outer else {
        return Err(EnvelopeError::NotAnArray);
    };
    if elements.len() != 4 {
        return Err(EnvelopeError::WrongArity(elements.len()));
    }
    let mut elements = elements.into_iter();
    let protected_raw = elements.next().unwrap_or(Value::Null);
    let unprotected_raw = elements.next().unwrap_or(Value::Null);
    let payload_raw = elements.next().unwrap_or(Value::Null);
    let signature_raw = elements.next().unwrap_or(Value::Null);

    let Value::Bytes(protected_bytes) = protected_raw else {
        return Err(EnvelopeError::NotBytes(EnvelopeField::Protected));
    };
    let protected = codec::decode(&protected_bytes)
        .map_err(EnvelopeError::field(EnvelopeField::Protected))?;

    let unprotected = MaybeEncoded::classify(unprotected_raw)
        .resolve()
        .map_err(EnvelopeError::field(EnvelopeField::Unprotected))?;

    let Value::Bytes(payload_bytes) = payload_raw else {
        return Err(EnvelopeError::NotBytes(EnvelopeField::Payload));
    };
    let inner_payload =
        codec::decode(&payload_bytes).map_err(EnvelopeError::field(EnvelopeField::Payload))?;
    let Value::Map(mut payload) = inner_payload else {
        return Err(EnvelopeError::PayloadNotMap);
    };

    // user_data carries the same sometimes-pre-decoded tolerance
    if let Some(user_data) = payload.remove(USER_DATA_KEY) {
        let resolved = MaybeEncoded::classify(user_data)
            .resolve()
            .map_err(EnvelopeError::field(EnvelopeField::UserData))?;
        payload.insert(USER_DATA_KEY.to_string(), resolved);
    }

    let Value::Bytes(signature) = signature_raw else {
        return Err(EnvelopeError::NotBytes(EnvelopeField::Signature));
    };

    debug!(
        "Decoded signed envelope: {} payload keys, {} signature bytes",
        payload.len(),
        signature.len()
    );

    Ok(DecodedEnvelope {
        protected,
        unprotected,
        payload,
        signature,
    })
}
