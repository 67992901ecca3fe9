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

//! The SCION packet security extension.
//!
//! The security extension is an end-to-end extension whose data holds an authenticator computed
//! over the whole packet:
//!
//! ```text
//! +-----------+-----------+-----------+-----------+-----------------------+
//! |  NextHdr  |  NumLines |  Type (2) |  SecMode  |  Metadata (4 bytes)   |
//! +-----------+-----------+-----------+-----------+-----------------------+
//! |               Authenticator (length depends on SecMode)               |
//! +-----------------------------------------------------------------------+
//! ```
//!
//! While encoding, the authenticator is first reserved as zeros, the authenticated bytes of the
//! finished packet are computed and the result is written into the reserved window.

use std::fmt::{Debug, Formatter};

use bytes::{BufMut, Bytes, BytesMut};

use super::{
    DecodeError, EncodeError, NextHeader, Section,
    extension::{EncodedExtension, ExtensionClass, ExtensionHeader, FixLengths, end_to_end},
    offsets::{ExtensionKind, SectionOffsets},
};
use crate::{
    auth::AuthError,
    line::{first_nonzero, padded_length, put_padding},
    utils::encoded_type,
};

encoded_type! {
    /// The algorithm used to compute the authenticator.
    pub enum SecurityMode(u8) {
        /// AES-CMAC with a 16-byte tag.
        AesCmac = 0,
        /// HMAC-SHA256 with a 32-byte tag.
        HmacSha256 = 1,
        /// Ed25519 signature of 64 bytes.
        Ed25519 = 2,
        /// AES-128-GCM with a 16-byte tag.
        GcmAes128 = 3;
        /// An unassigned mode.
        Unknown = 4..=255,
    }
}

impl SecurityMode {
    /// The length of the authenticator in bytes, or `None` for unknown modes.
    pub const fn authenticator_length(&self) -> Option<usize> {
        match self {
            SecurityMode::AesCmac => Some(16),
            SecurityMode::HmacSha256 => Some(32),
            SecurityMode::Ed25519 => Some(64),
            SecurityMode::GcmAes128 => Some(16),
            SecurityMode::Unknown(_) => None,
        }
    }
}

/// The security extension of a packet.
///
/// The key is used to compute the authenticator while encoding and is never written to the wire;
/// it is empty after decoding.
#[derive(Clone, PartialEq, Eq)]
pub struct SecurityExtension {
    /// The authentication algorithm.
    pub mode: SecurityMode,
    /// Opaque metadata, such as a sequence number.
    pub metadata: [u8; 4],
    /// The authenticator. Ignored when encoding, as it is recomputed.
    pub authenticator: Bytes,
    /// Key for computing the authenticator.
    pub key: Bytes,
}

impl SecurityExtension {
    /// The end-to-end extension type of the security extension.
    pub const TYPE: u8 = end_to_end::SECURITY;

    const MODE_LENGTH: usize = 1;
    const METADATA_LENGTH: usize = 4;

    /// Offset of the authenticator in the extension data.
    pub const AUTHENTICATOR_OFFSET: usize = Self::MODE_LENGTH + Self::METADATA_LENGTH;

    /// Creates an extension with a zeroed authenticator of the length required by `mode`.
    pub fn new(mode: SecurityMode, key: impl Into<Bytes>) -> Result<Self, AuthError> {
        let length = mode
            .authenticator_length()
            .ok_or(AuthError::UnsupportedMode(mode))?;
        Ok(Self {
            mode,
            metadata: [0; 4],
            authenticator: Bytes::from(vec![0; length]),
            key: key.into(),
        })
    }

    /// Sets the metadata.
    pub fn with_metadata(mut self, metadata: [u8; 4]) -> Self {
        self.metadata = metadata;
        self
    }

    /// Start of the authenticator in the extension data.
    pub fn auth_start_offset(&self) -> usize {
        Self::AUTHENTICATOR_OFFSET
    }

    /// End of the authenticator in the extension data.
    pub fn auth_end_offset(&self) -> Result<usize, AuthError> {
        Ok(Self::AUTHENTICATOR_OFFSET + self.authenticator_length()?)
    }

    fn authenticator_length(&self) -> Result<usize, AuthError> {
        self.mode
            .authenticator_length()
            .ok_or(AuthError::UnsupportedMode(self.mode))
    }

    /// Replaces the authenticator, which must have the length required by the mode.
    pub fn set_authenticator(&mut self, authenticator: &[u8]) -> Result<(), AuthError> {
        let expected = self.authenticator_length()?;
        if authenticator.len() != expected {
            return Err(AuthError::InvalidAuthenticatorLength {
                expected,
                actual: authenticator.len(),
            });
        }
        self.authenticator = Bytes::copy_from_slice(authenticator);
        Ok(())
    }

    /// Encodes the extension with a zero-filled authenticator.
    ///
    /// The returned kind records the position of the authenticator within the extension.
    pub(crate) fn encode(&self, next_header: NextHeader) -> Result<EncodedExtension, EncodeError> {
        let authenticator_length = self.authenticator_length()?;

        let mut data = BytesMut::with_capacity(Self::AUTHENTICATOR_OFFSET + authenticator_length);
        data.put_u8(self.mode.into());
        data.put_slice(&self.metadata);
        put_padding(&mut data, authenticator_length);

        let mut header = ExtensionHeader::new(next_header, Self::TYPE, data.freeze());
        let mut encoded = header.encode(ExtensionClass::EndToEnd, FixLengths::Yes)?;
        encoded.kind = ExtensionKind::Security {
            authenticator: SectionOffsets::new(
                ExtensionHeader::SUB_HEADER_LEN + Self::AUTHENTICATOR_OFFSET,
                authenticator_length,
            ),
        };
        Ok(encoded)
    }

    /// Reads the extension from a decoded extension header of the security type.
    pub(crate) fn from_header(header: &ExtensionHeader) -> Result<Self, DecodeError> {
        let data = &header.data;
        let Some(&mode) = data.first() else {
            return Err(DecodeError::Truncated {
                section: Section::SecurityExtension,
                expected: Self::AUTHENTICATOR_OFFSET,
                actual: 0,
            });
        };
        let mode = SecurityMode::from(mode);
        let length = mode
            .authenticator_length()
            .ok_or(DecodeError::UnsupportedSecurityMode(mode.into()))?;

        let end = Self::AUTHENTICATOR_OFFSET + length;
        if data.len() < end {
            return Err(DecodeError::Truncated {
                section: Section::SecurityExtension,
                expected: padded_length(ExtensionHeader::SUB_HEADER_LEN + end),
                actual: ExtensionHeader::SUB_HEADER_LEN + data.len(),
            });
        }
        if let Some((index, value)) = first_nonzero(&data[end..]) {
            return Err(DecodeError::InvalidPadding {
                section: Section::SecurityExtension,
                position: ExtensionHeader::SUB_HEADER_LEN + end + index,
                value,
            });
        }

        let mut metadata = [0; Self::METADATA_LENGTH];
        metadata.copy_from_slice(&data[Self::MODE_LENGTH..Self::AUTHENTICATOR_OFFSET]);
        Ok(Self {
            mode,
            metadata,
            authenticator: data.slice(Self::AUTHENTICATOR_OFFSET..end),
            key: Bytes::new(),
        })
    }
}

impl Debug for SecurityExtension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityExtension")
            .field("mode", &self.mode)
            .field("metadata", &self.metadata)
            .field("authenticator", &self.authenticator)
            .field("key", &format_args!("<{} bytes>", self.key.len()))
            .finish()
    }
}
