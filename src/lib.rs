// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

//! CBOR envelope codec for AWS Nitro Enclave NSM attestation documents
//!
//! This crate canonically encodes caller input into an attestation request,
//! hands it to a native signer, and splits the returned COSE_Sign1-shaped
//! envelope back into `{protected, unprotected, payload, signature}`.
//!
//! The hard parts (hardware attestation, PCR measurement, signing) happen in
//! the NSM device behind the [`Signer`] seam. This layer is pure structural
//! transformation: no verification is performed; the signature is exposed as
//! raw bytes for a caller-supplied verifier.
//!
//! # Features
//!
//! - `nsm` (default): [`nsm::NsmSigner`] backed by `/dev/nsm` via
//!   `aws-nitro-enclaves-nsm-api`. Disable it to use the codec with a custom
//!   [`Signer`] outside an enclave.

use tracing::debug;

mod codec;
mod envelope;
mod error;
mod signer;
mod value;

#[cfg(feature = "nsm")]
pub mod nsm;

pub use codec::{decode, encode};
pub use envelope::{decode_envelope, DecodedEnvelope, MaybeEncoded, USER_DATA_KEY};
pub use error::{
    AttestError, DecodeError, EncodeError, EnvelopeError, EnvelopeField, SignerError,
};
pub use signer::Signer;
pub use value::Value;

/// Encode user input into attestation request bytes.
///
/// The input is encoded alone, with no metadata added at this layer; absent
/// input encodes as null, so building a request never fails for lack of one.
pub fn build_request(user_input: Option<&Value>) -> Result<Vec<u8>, EncodeError> {
    encode(user_input.unwrap_or(&Value::Null))
}

/// Request a signed attestation document for the given user input.
///
/// Encodes the input, issues one [`Signer::sign`] call, and returns the
/// signer's raw output unmodified; decoding is the caller's choice via
/// [`decode_envelope`]. Signer failures propagate without reinterpretation.
pub fn attest(signer: &impl Signer, user_input: Option<&Value>) -> Result<Vec<u8>, AttestError> {
    let request = build_request(user_input)?;
    debug!("Requesting attestation for {} request bytes", request.len());
    let document = signer.sign(&request)?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_input_encodes_null() {
        let request = build_request(None).unwrap();
        assert_eq!(decode(&request).unwrap(), Value::Null);
    }

    #[test]
    fn request_is_input_encoded_alone() {
        let input = Value::Text("report".to_string());
        let request = build_request(Some(&input)).unwrap();
        assert_eq!(request, encode(&input).unwrap());
    }
}
