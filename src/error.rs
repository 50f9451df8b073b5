// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the envelope codec

use std::fmt;

use thiserror::Error;

/// A value could not be canonically encoded.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The input cannot be represented in the closed value model
    #[error("value not representable: {0}")]
    Unrepresentable(String),
    /// The CBOR writer failed
    #[error("failed to write encoding: {0}")]
    Write(String),
}

/// Bytes could not be decoded back into a value.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Malformed or truncated CBOR
    #[error("malformed or truncated encoding: {0}")]
    Malformed(String),
    /// Extra bytes after the end of the value
    #[error("trailing bytes after value")]
    TrailingBytes,
    /// A wire construct outside the value model (e.g. a CBOR tag)
    #[error("unsupported wire construct: {0}")]
    Unsupported(String),
    /// A map key that is not a text string
    #[error("map key is not a text string")]
    NonTextKey,
    /// The same key appeared twice in one map
    #[error("duplicate map key: {0:?}")]
    DuplicateKey(String),
    /// An integer outside the i64 range
    #[error("integer out of range")]
    IntOutOfRange,
}

/// Which part of the signed envelope an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeField {
    /// The top-level 4-element array itself
    Envelope,
    /// Element 0: protected headers
    Protected,
    /// Element 1: unprotected headers
    Unprotected,
    /// Element 2: payload
    Payload,
    /// The `user_data` key inside the payload
    UserData,
    /// Element 3: signature
    Signature,
}

impl fmt::Display for EnvelopeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Envelope => "envelope",
            Self::Protected => "protected headers",
            Self::Unprotected => "unprotected headers",
            Self::Payload => "payload",
            Self::UserData => "user_data",
            Self::Signature => "signature",
        };
        f.write_str(name)
    }
}

/// A signed envelope that does not have the expected shape.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The top-level value is not an array
    #[error("envelope is not an array")]
    NotAnArray,
    /// The top-level array does not have exactly 4 elements
    #[error("envelope must have 4 elements, got {0}")]
    WrongArity(usize),
    /// A field that must be a byte string is something else
    #[error("{0} is not a byte string")]
    NotBytes(EnvelopeField),
    /// The decoded payload is not a map
    #[error("payload is not a map")]
    PayloadNotMap,
    /// A field failed to decode
    #[error("failed to decode {field}")]
    Field {
        /// Which field failed
        field: EnvelopeField,
        /// The underlying decode failure
        #[source]
        source: DecodeError,
    },
}

impl EnvelopeError {
    pub(crate) fn field(field: EnvelopeField) -> impl FnOnce(DecodeError) -> Self {
        move |source| Self::Field { field, source }
    }
}

/// An error from the native signer, carried through without reinterpretation.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct SignerError(#[from] pub anyhow::Error);

/// Failure of the composed attest path.
#[derive(Debug, Error)]
pub enum AttestError {
    /// The user input could not be encoded into a request
    #[error("failed to encode attestation request")]
    Encode(#[from] EncodeError),
    /// The native signer failed
    #[error(transparent)]
    Signer(#[from] SignerError),
}
