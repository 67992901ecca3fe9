// Copyright 2025 Mysten Labs
// Copyright 2025 Anapaya Systems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Computation and verification of packet authenticators.
//!
//! The encoder hands the authenticated bytes of a packet to a [`PacketMac`] and writes the result
//! into the security extension. [`DefaultMac`] implements the security modes with the RustCrypto
//! and `ed25519-dalek` crates; other implementations can be injected into
//! [`PacketEncoder::new`][crate::packet::PacketEncoder::new].

use aes::{Aes128, Aes256};
use bytes::Bytes;
use cmac::{
    Cmac, Mac,
    digest::{KeyInit, MacError},
};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use hmac::Hmac;
use sha2::Sha256;

use crate::packet::security::SecurityMode;

/// Errors raised while computing or verifying an authenticator.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// The security mode is not implemented.
    #[error("unsupported security mode {0:?}")]
    UnsupportedMode(SecurityMode),
    /// The key does not have a length usable with the mode.
    #[error("invalid key of {length} bytes for security mode {mode:?}")]
    InvalidKey {
        /// The requested mode.
        mode: SecurityMode,
        /// Length of the provided key.
        length: usize,
    },
    /// The authenticator does not match the packet.
    #[error("authenticator does not match the packet")]
    Mismatch,
    /// The authenticator does not have the length required by the mode.
    #[error("invalid authenticator length, expected {expected}, actual {actual}")]
    InvalidAuthenticatorLength {
        /// Length required by the mode.
        expected: usize,
        /// Length provided.
        actual: usize,
    },
    /// Verification was requested for a packet without a security extension.
    #[error("packet has no security extension")]
    MissingSecurityExtension,
}

/// Computes and verifies authenticators over the authenticated bytes of a packet.
pub trait PacketMac {
    /// Computes the authenticator of `message`.
    fn compute(&self, mode: SecurityMode, key: &[u8], message: &[u8])
    -> Result<Bytes, AuthError>;

    /// Checks `authenticator` against `message`.
    ///
    /// The default implementation recomputes the authenticator and compares the two in constant
    /// time.
    fn verify(
        &self,
        mode: SecurityMode,
        key: &[u8],
        message: &[u8],
        authenticator: &[u8],
    ) -> Result<(), AuthError> {
        let expected = self.compute(mode, key, message)?;
        if expected.len() != authenticator.len() {
            return Err(AuthError::InvalidAuthenticatorLength {
                expected: expected.len(),
                actual: authenticator.len(),
            });
        }
        let difference = expected
            .iter()
            .zip(authenticator)
            .fold(0u8, |difference, (a, b)| difference | (a ^ b));
        if difference != 0 {
            return Err(AuthError::Mismatch);
        }
        Ok(())
    }
}

/// Authenticator implementation for the standard security modes.
///
/// - AES-CMAC with a 16-byte (AES-128) or 32-byte (AES-256) key.
/// - HMAC-SHA256 with a key of any length.
/// - Ed25519: [`compute`][PacketMac::compute] takes the 32-byte secret seed, while
///   [`verify`][PacketMac::verify] takes the 32-byte public key.
///
/// AES-128-GCM is not supported.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMac;

impl PacketMac for DefaultMac {
    fn compute(
        &self,
        mode: SecurityMode,
        key: &[u8],
        message: &[u8],
    ) -> Result<Bytes, AuthError> {
        let invalid_key = AuthError::InvalidKey {
            mode,
            length: key.len(),
        };
        match mode {
            SecurityMode::AesCmac => match key.len() {
                16 => mac_tag::<Cmac<Aes128>>(key, message),
                32 => mac_tag::<Cmac<Aes256>>(key, message),
                _ => None,
            }
            .ok_or(invalid_key),
            SecurityMode::HmacSha256 => {
                mac_tag::<Hmac<Sha256>>(key, message).ok_or(invalid_key)
            }
            SecurityMode::Ed25519 => {
                let seed = <&[u8; 32]>::try_from(key).or(Err(invalid_key))?;
                let signature = SigningKey::from_bytes(seed).sign(message);
                Ok(Bytes::copy_from_slice(&signature.to_bytes()))
            }
            other => Err(AuthError::UnsupportedMode(other)),
        }
    }

    fn verify(
        &self,
        mode: SecurityMode,
        key: &[u8],
        message: &[u8],
        authenticator: &[u8],
    ) -> Result<(), AuthError> {
        let invalid_key = AuthError::InvalidKey {
            mode,
            length: key.len(),
        };
        let expected_length = mode
            .authenticator_length()
            .ok_or(AuthError::UnsupportedMode(mode))?;
        if authenticator.len() != expected_length {
            return Err(AuthError::InvalidAuthenticatorLength {
                expected: expected_length,
                actual: authenticator.len(),
            });
        }

        let result = match mode {
            SecurityMode::AesCmac => match key.len() {
                16 => verify_mac_tag::<Cmac<Aes128>>(key, message, authenticator),
                32 => verify_mac_tag::<Cmac<Aes256>>(key, message, authenticator),
                _ => return Err(invalid_key),
            },
            SecurityMode::HmacSha256 => {
                verify_mac_tag::<Hmac<Sha256>>(key, message, authenticator)
            }
            SecurityMode::Ed25519 => {
                let public_key = <&[u8; 32]>::try_from(key).or(Err(invalid_key))?;
                let verifying_key = VerifyingKey::from_bytes(public_key).or(Err(invalid_key))?;
                let signature = Signature::from_slice(authenticator).or(Err(AuthError::Mismatch))?;
                verifying_key
                    .verify(message, &signature)
                    .or(Err(AuthError::Mismatch))?;
                return Ok(());
            }
            other => return Err(AuthError::UnsupportedMode(other)),
        };

        match result {
            Some(Ok(())) => Ok(()),
            Some(Err(MacError)) => Err(AuthError::Mismatch),
            None => Err(invalid_key),
        }
    }
}

/// Returns `None` if the key length is not accepted by the algorithm.
fn mac_tag<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> Option<Bytes> {
    let mut mac = <M as KeyInit>::new_from_slice(key).ok()?;
    mac.update(message);
    Some(Bytes::copy_from_slice(&mac.finalize().into_bytes()))
}

fn verify_mac_tag<M: Mac + KeyInit>(
    key: &[u8],
    message: &[u8],
    tag: &[u8],
) -> Option<Result<(), MacError>> {
    let mut mac = <M as KeyInit>::new_from_slice(key).ok()?;
    mac.update(message);
    Some(mac.verify_slice(tag))
}
