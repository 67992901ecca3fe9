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

//! Hop-by-hop and end-to-end extensions.
//!
//! Every extension starts with a 3-byte sub-header
//!
//! ```text
//! +-----------+-----------+-----------+--------------------------------+
//! |  NextHdr  |  NumLines |   Type    |  data, zero padded to a line   |
//! +-----------+-----------+-----------+--------------------------------+
//! ```
//!
//! where `NumLines` is the length of the whole extension in lines. The class of an extension,
//! hop-by-hop or end-to-end, is not part of the extension itself but is given by the next-header
//! field of the preceding header.

use std::collections::HashSet;

use bytes::{BufMut, Bytes, BytesMut};

use super::{DecodeError, EncodeError, NextHeader, Section, offsets::ExtensionKind};
use crate::line::{LINE_LEN, padded_length, put_padding};

/// The maximum number of hop-by-hop extensions in a packet.
pub const MAX_HBH_EXTENSIONS: usize = 3;

/// Well-known hop-by-hop extension types.
pub mod hop_by_hop {
    /// Traceroute.
    pub const TRACEROUTE: u8 = 0;
    /// SIBRA reservation.
    pub const SIBRA: u8 = 1;
    /// SCMP; must be the first hop-by-hop extension.
    pub const SCMP: u8 = 2;
    /// One-hop path.
    pub const ONE_HOP_PATH: u8 = 3;
}

/// Well-known end-to-end extension types.
pub mod end_to_end {
    /// Path transport.
    pub const PATH_TRANSPORT: u8 = 0;
    /// Path probe.
    pub const PATH_PROBE: u8 = 1;
    /// SCION packet security extension, see [`SecurityExtension`][crate::packet::security].
    pub const SECURITY: u8 = 2;
    /// Debug extension carrying an opaque identifier.
    pub const DEBUG: u8 = 254;
}

/// The class of an extension.
///
/// Hop-by-hop extensions are processed by every router on the path, end-to-end extensions only by
/// the destination. Hop-by-hop extensions always precede end-to-end extensions on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExtensionClass {
    /// Hop-by-hop extension.
    HopByHop,
    /// End-to-end extension.
    EndToEnd,
}

impl ExtensionClass {
    /// Returns the class announced by a next-header value, if any.
    pub const fn from_next_header(next_header: NextHeader) -> Option<Self> {
        match next_header {
            NextHeader::HopByHop => Some(ExtensionClass::HopByHop),
            NextHeader::EndToEnd => Some(ExtensionClass::EndToEnd),
            _ => None,
        }
    }
}

impl From<ExtensionClass> for NextHeader {
    fn from(value: ExtensionClass) -> Self {
        match value {
            ExtensionClass::HopByHop => NextHeader::HopByHop,
            ExtensionClass::EndToEnd => NextHeader::EndToEnd,
        }
    }
}

/// A generic extension.
///
/// The data is opaque to this crate. After decoding, it includes the zero padding up to the end of
/// the last line, so encoding a decoded extension reproduces it byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// Hop-by-hop or end-to-end.
    pub class: ExtensionClass,
    /// The extension type within its class.
    pub ext_type: u8,
    /// The extension data.
    pub data: Bytes,
}

impl Extension {
    /// Creates a hop-by-hop extension.
    pub fn hop_by_hop(ext_type: u8, data: impl Into<Bytes>) -> Self {
        Self {
            class: ExtensionClass::HopByHop,
            ext_type,
            data: data.into(),
        }
    }

    /// Creates an end-to-end extension.
    pub fn end_to_end(ext_type: u8, data: impl Into<Bytes>) -> Self {
        Self {
            class: ExtensionClass::EndToEnd,
            ext_type,
            data: data.into(),
        }
    }
}

/// Whether [`ExtensionHeader::encode`] recomputes the line count from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixLengths {
    /// Derive the line count from the data length.
    Yes,
    /// Keep the stored line count, for replaying on-wire bytes.
    No,
}

/// The wire form of an extension: the sub-header fields and the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionHeader {
    /// Protocol of the section following this extension.
    pub next_header: NextHeader,
    /// Length of the extension in lines, including the sub-header.
    pub num_lines: u8,
    /// The extension type.
    pub ext_type: u8,
    /// The data following the sub-header, up to the end of the extension.
    pub data: Bytes,
}

impl ExtensionHeader {
    /// Length of the sub-header in bytes.
    pub const SUB_HEADER_LEN: usize = 3;

    /// Creates an extension header whose line count is not yet set.
    pub fn new(next_header: NextHeader, ext_type: u8, data: Bytes) -> Self {
        Self {
            next_header,
            num_lines: 0,
            ext_type,
            data,
        }
    }

    /// Length of the extension in bytes, as given by its line count.
    pub fn length(&self) -> usize {
        usize::from(self.num_lines) * LINE_LEN
    }

    /// Decodes an extension from the start of `data` and returns it together with the number of
    /// bytes it occupies.
    ///
    /// The data is a zero-copy slice of the input.
    pub fn decode(data: &Bytes) -> Result<(Self, usize), DecodeError> {
        if data.len() < Self::SUB_HEADER_LEN {
            return Err(DecodeError::Truncated {
                section: Section::Extension,
                expected: Self::SUB_HEADER_LEN,
                actual: data.len(),
            });
        }

        let num_lines = data[1];
        if num_lines == 0 {
            return Err(DecodeError::ZeroLength {
                section: Section::Extension,
            });
        }
        let length = usize::from(num_lines) * LINE_LEN;
        if data.len() < length {
            return Err(DecodeError::Truncated {
                section: Section::Extension,
                expected: length,
                actual: data.len(),
            });
        }

        let header = Self {
            next_header: data[0].into(),
            num_lines,
            ext_type: data[2],
            data: data.slice(Self::SUB_HEADER_LEN..length),
        };
        Ok((header, length))
    }

    /// Encodes the extension, padding the data with zeros to the next line boundary.
    ///
    /// With [`FixLengths::Yes`] the line count is first updated to match the data.
    pub fn encode(
        &mut self,
        class: ExtensionClass,
        fix_lengths: FixLengths,
    ) -> Result<EncodedExtension, EncodeError> {
        let unpadded = Self::SUB_HEADER_LEN + self.data.len();
        let length = padded_length(unpadded);
        if fix_lengths == FixLengths::Yes {
            self.num_lines =
                u8::try_from(length / LINE_LEN).or(Err(EncodeError::ExtensionTooLarge {
                    ext_type: self.ext_type,
                    length: self.data.len(),
                }))?;
        }

        let mut buffer = BytesMut::with_capacity(length);
        buffer.put_u8(self.next_header.into());
        buffer.put_u8(self.num_lines);
        buffer.put_u8(self.ext_type);
        buffer.put_slice(&self.data);
        put_padding(&mut buffer, length - unpadded);

        let kind = match class {
            ExtensionClass::HopByHop => ExtensionKind::HopByHop,
            ExtensionClass::EndToEnd => ExtensionKind::EndToEnd,
        };
        Ok(EncodedExtension {
            kind,
            bytes: buffer.freeze(),
        })
    }
}

/// A serialized extension together with the information needed to authenticate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedExtension {
    /// How the extension contributes to the authenticated bytes.
    pub kind: ExtensionKind,
    /// The encoded extension.
    pub bytes: Bytes,
}

impl EncodedExtension {
    /// The bytes of this extension that are covered by the packet authenticator.
    ///
    /// Only the next-header and type fields of hop-by-hop extensions are covered, since routers
    /// may modify their data. End-to-end extensions are covered entirely.
    pub fn authenticated_bytes(&self) -> Vec<u8> {
        let mut authenticated = Vec::with_capacity(self.bytes.len());
        self.kind.append_authenticated(&self.bytes, &mut authenticated);
        authenticated
    }
}

/// A violation of the rules for combining extensions in one packet.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionError {
    /// More than [`MAX_HBH_EXTENSIONS`] hop-by-hop extensions.
    #[error("{count} hop-by-hop extensions, at most {MAX_HBH_EXTENSIONS} are allowed")]
    TooManyHopByHop {
        /// The number of hop-by-hop extensions found.
        count: usize,
    },
    /// The SCMP hop-by-hop extension is not the first extension.
    #[error("the SCMP hop-by-hop extension must be the first extension")]
    ScmpNotFirst,
    /// Two extensions share class and type.
    #[error("duplicate extension of class {class:?} and type {ext_type}")]
    Duplicate {
        /// Class of the duplicated extension.
        class: ExtensionClass,
        /// Type of the duplicated extension.
        ext_type: u8,
    },
    /// A hop-by-hop extension follows an end-to-end extension.
    #[error("hop-by-hop extension after an end-to-end extension")]
    HopByHopAfterEndToEnd,
    /// A generic end-to-end extension of the security type in a packet without security
    /// extension. A decoder would read it as the security extension.
    #[error("end-to-end extension of the security type without a security extension")]
    SecurityTypeMisplaced,
}

/// Checks a list of generic extensions in wire order.
///
/// The security extension is not part of the list and is not subject to the duplicate check.
pub fn validate_extensions(extensions: &[Extension]) -> Result<(), ExtensionError> {
    let mut seen_end_to_end = false;
    let mut hop_by_hop_count = 0;
    let mut seen = HashSet::with_capacity(extensions.len());

    for (index, extension) in extensions.iter().enumerate() {
        match extension.class {
            ExtensionClass::HopByHop if seen_end_to_end => {
                return Err(ExtensionError::HopByHopAfterEndToEnd);
            }
            ExtensionClass::HopByHop => {
                hop_by_hop_count += 1;
                if extension.ext_type == hop_by_hop::SCMP && index != 0 {
                    return Err(ExtensionError::ScmpNotFirst);
                }
            }
            ExtensionClass::EndToEnd => seen_end_to_end = true,
        }
        if !seen.insert((extension.class, extension.ext_type)) {
            return Err(ExtensionError::Duplicate {
                class: extension.class,
                ext_type: extension.ext_type,
            });
        }
    }

    if hop_by_hop_count > MAX_HBH_EXTENSIONS {
        return Err(ExtensionError::TooManyHopByHop {
            count: hop_by_hop_count,
        });
    }
    Ok(())
}
