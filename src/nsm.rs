// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

//! NSM (Nitro Security Module) signer
//!
//! The NSM device is available at `/dev/nsm` inside a Nitro Enclave and
//! produces the COSE_Sign1 attestation document. This module is call-through
//! glue only; request encoding and response decoding live in the codec.

use std::path::Path;

use anyhow::anyhow;
use aws_nitro_enclaves_nsm_api::api::{Request, Response};
use aws_nitro_enclaves_nsm_api::driver;

use crate::error::SignerError;
use crate::signer::Signer;

/// NSM device path
pub const NSM_DEVICE_PATH: &str = "/dev/nsm";

/// Check if running inside a Nitro Enclave
pub fn is_nitro_enclave() -> bool {
    Path::new(NSM_DEVICE_PATH).exists()
}

/// Signer backed by the NSM device.
///
/// Holds the NSM file descriptor for its lifetime; the device is closed on
/// drop. Each [`Signer::sign`] call issues one attestation request with the
/// encoded request bytes as `user_data` (max 512 bytes per the NSM contract).
#[derive(Debug)]
pub struct NsmSigner {
    fd: i32,
}

impl NsmSigner {
    /// Open the NSM device.
    pub fn new() -> Result<Self, SignerError> {
        let fd = driver::nsm_init();
        if fd < 0 {
            return Err(SignerError(anyhow!("failed to open NSM device")));
        }
        Ok(Self { fd })
    }
}

impl Signer for NsmSigner {
    fn sign(&self, request: &[u8]) -> Result<Vec<u8>, SignerError> {
        let response = driver::nsm_process_request(
            self.fd,
            Request::Attestation {
                user_data: Some(request.to_vec().into()),
                nonce: None,
                public_key: None,
            },
        );

        match response {
            Response::Attestation { document } => Ok(document),
            Response::Error(err) => Err(SignerError(anyhow!("NSM attestation failed: {err:?}"))),
            _ => Err(SignerError(anyhow!("unexpected NSM response"))),
        }
    }
}

impl Drop for NsmSigner {
    fn drop(&mut self) {
        driver::nsm_exit(self.fd);
    }
}
