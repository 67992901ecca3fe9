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

//! Errors raised when encoding or decoding SCION packets.

use std::fmt::{Display, Formatter};

use super::{NextHeader, extension::ExtensionError};
use crate::{address::MalformedHostAddr, auth::AuthError};

/// A section of a SCION packet, used to attribute errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// The common header.
    CommonHeader,
    /// The address header.
    AddressHeader,
    /// The forwarding path.
    Path,
    /// A hop-by-hop or end-to-end extension.
    Extension,
    /// The security extension.
    SecurityExtension,
    /// The L4 header.
    L4Header,
    /// The L4 payload.
    Payload,
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Section::CommonHeader => "common header",
            Section::AddressHeader => "address header",
            Section::Path => "path",
            Section::Extension => "extension",
            Section::SecurityExtension => "security extension",
            Section::L4Header => "L4 header",
            Section::Payload => "payload",
        };
        f.write_str(name)
    }
}

/// Errors raised when failing to decode a [`ScionPacket`][super::ScionPacket] or one of its
/// sections.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum DecodeError {
    #[error("{section}: expected {expected} bytes, actual buffer {actual}")]
    Truncated {
        section: Section,
        expected: usize,
        actual: usize,
    },
    #[error("{section}: length must not be zero")]
    ZeroLength { section: Section },
    #[error("{section}: malformed length, expected {expected}, actual {actual}")]
    LengthMismatch {
        section: Section,
        expected: usize,
        actual: usize,
    },
    #[error("{section}: {reason}")]
    MalformedAddress {
        section: Section,
        reason: MalformedHostAddr,
    },
    #[error("{section}: unsupported protocol {protocol:?}")]
    UnsupportedProtocol {
        section: Section,
        protocol: NextHeader,
    },
    #[error("checksum mismatch: header carries {expected:#06x}, computed {actual:#06x}")]
    ChecksumFailure { expected: u16, actual: u16 },
    #[error("{section}: non-zero padding byte {value:#04x} at offset {position}")]
    InvalidPadding {
        section: Section,
        position: usize,
        value: u8,
    },
    #[error("invalid extensions: {0}")]
    InvalidExtensions(#[from] ExtensionError),
    #[error("{field} cursor {offset} does not point into the path")]
    InvalidPathOffset { field: &'static str, offset: u8 },
    #[error("cannot decode packet with unsupported header version {0}")]
    UnsupportedVersion(u8),
    #[error("unsupported security mode {0}")]
    UnsupportedSecurityMode(u8),
}

impl DecodeError {
    /// The section the error was raised in, if it is attributable to a single one.
    pub fn section(&self) -> Option<Section> {
        match self {
            DecodeError::Truncated { section, .. }
            | DecodeError::ZeroLength { section }
            | DecodeError::LengthMismatch { section, .. }
            | DecodeError::MalformedAddress { section, .. }
            | DecodeError::UnsupportedProtocol { section, .. }
            | DecodeError::InvalidPadding { section, .. } => Some(*section),
            DecodeError::ChecksumFailure { .. } => Some(Section::L4Header),
            DecodeError::InvalidExtensions(_) => Some(Section::Extension),
            DecodeError::InvalidPathOffset { .. } => Some(Section::Path),
            DecodeError::UnsupportedVersion(_) => Some(Section::CommonHeader),
            DecodeError::UnsupportedSecurityMode(_) => Some(Section::SecurityExtension),
        }
    }
}

/// Errors raised when failing to encode a [`ScionPacket`][super::ScionPacket].
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum EncodeError {
    /// The caller-provided output buffer cannot hold the packet.
    #[error("output buffer too small: {required} bytes required, {available} available")]
    BufferTooSmall {
        /// Length of the encoded packet.
        required: usize,
        /// Length of the provided buffer.
        available: usize,
    },
    /// The packet is longer than the total length field can express.
    #[error("packet is too large")]
    PayloadTooLarge,
    /// The headers are longer than the header length field can express.
    ///
    /// This is most likely due to a too long path.
    #[error("packet header is too large")]
    HeaderTooLarge,
    /// An extension is longer than its line count field can express.
    #[error("extension of type {ext_type} with {length} data bytes is too large")]
    ExtensionTooLarge {
        /// Type of the offending extension.
        ext_type: u8,
        /// Length of its data.
        length: usize,
    },
    /// The extension list violates the ordering rules.
    #[error("invalid extensions: {0}")]
    InvalidExtensions(#[from] ExtensionError),
    /// A section that has to consist of whole lines does not.
    #[error("{section} of {length} bytes is not aligned to 8-byte lines")]
    Misaligned {
        /// The misaligned section.
        section: Section,
        /// Its length in bytes.
        length: usize,
    },
    /// A path cursor does not point to a line inside the path.
    #[error("{field} offset {offset} does not point to a line inside the path")]
    InvalidPathOffset {
        /// The cursor, info field or hop field.
        field: &'static str,
        /// The path-relative offset in bytes.
        offset: usize,
    },
    /// The payload does not fit the L4 protocol, e.g. an SCMP payload behind a UDP header.
    #[error("payload does not match the L4 protocol")]
    PayloadMismatch,
    /// The authenticator could not be computed.
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),
}

/// Raised if a buffer does not have sufficient capacity for encoding a header.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy, Default)]
#[error("the provided buffer did not have sufficient size")]
pub struct InadequateBufferSize;
