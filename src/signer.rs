// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

//! Native signer seam

use crate::error::SignerError;

/// A native attestation signer.
///
/// One synchronous operation: take the encoded request bytes, return the
/// signed attestation document bytes. The call may block on hardware I/O and
/// may fail for hardware or availability reasons this layer does not
/// interpret; such failures are surfaced verbatim as [`SignerError`].
pub trait Signer {
    /// Produce a signed attestation document for the encoded request.
    fn sign(&self, request: &[u8]) -> Result<Vec<u8>, SignerError>;
}
