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

//! Positions of the sections of an encoded packet.
//!
//! Both the encoder and the decoder produce an [`Offsets`] record. The bytes covered by the
//! packet authenticator are derived from it by [`Offsets::authenticated_bytes`], so that signing
//! and verification always see the same message.

use std::ops::Range;

use super::{CommonHeader, layout::CommonHeaderLayout};

/// Start and end of a section in bytes from the start of the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionOffsets {
    /// First byte of the section.
    pub start: usize,
    /// One past the last byte of the section.
    pub end: usize,
}

impl SectionOffsets {
    /// Creates the offsets of a section of `length` bytes starting at `start`.
    pub const fn new(start: usize, length: usize) -> Self {
        Self {
            start,
            end: start + length,
        }
    }

    /// Length of the section in bytes.
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the section has no bytes.
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The section as a range.
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// How an extension contributes to the authenticated bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionKind {
    /// Hop-by-hop: only the next-header and type bytes.
    HopByHop,
    /// End-to-end: the whole extension.
    EndToEnd,
    /// The security extension: the whole extension with the authenticator zeroed.
    Security {
        /// The authenticator, relative to the start of the extension.
        authenticator: SectionOffsets,
    },
}

impl ExtensionKind {
    const HOP_BY_HOP_AUTHENTICATED: [usize; 2] = [0, 2];

    /// Appends the authenticated view of an encoded extension to `out`.
    pub fn append_authenticated(&self, encoded: &[u8], out: &mut Vec<u8>) {
        match self {
            ExtensionKind::HopByHop => out.extend(
                Self::HOP_BY_HOP_AUTHENTICATED
                    .iter()
                    .filter_map(|index| encoded.get(*index)),
            ),
            ExtensionKind::EndToEnd => out.extend_from_slice(encoded),
            ExtensionKind::Security { authenticator } => {
                let start = authenticator.start.min(encoded.len());
                let end = authenticator.end.clamp(start, encoded.len());
                out.extend_from_slice(&encoded[..start]);
                out.resize(out.len() + (end - start), 0);
                out.extend_from_slice(&encoded[end..]);
            }
        }
    }
}

/// Position and kind of one extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionOffsets {
    /// How the extension is authenticated.
    pub kind: ExtensionKind,
    /// Where the extension is.
    pub offsets: SectionOffsets,
}

/// Positions of all sections of an encoded packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Offsets {
    /// The common header.
    pub common_header: SectionOffsets,
    /// The address header, including padding.
    pub address_header: SectionOffsets,
    /// The path; empty if the packet has none.
    pub path: SectionOffsets,
    /// All extensions in wire order, including the security extension.
    pub extensions: Vec<ExtensionOffsets>,
    /// The L4 header.
    pub l4_header: SectionOffsets,
    /// The payload.
    pub payload: SectionOffsets,
}

impl Offsets {
    /// The block of all extensions.
    pub fn extension_block(&self) -> SectionOffsets {
        match (self.extensions.first(), self.extensions.last()) {
            (Some(first), Some(last)) => SectionOffsets {
                start: first.offsets.start,
                end: last.offsets.end,
            },
            _ => SectionOffsets::new(self.path.end, 0),
        }
    }

    /// The authenticator of the security extension, relative to the start of the packet.
    pub fn authenticator(&self) -> Option<SectionOffsets> {
        self.extensions.iter().find_map(|extension| match extension.kind {
            ExtensionKind::Security { authenticator } => Some(SectionOffsets {
                start: extension.offsets.start + authenticator.start,
                end: extension.offsets.start + authenticator.end,
            }),
            _ => None,
        })
    }

    /// Builds the message covered by the packet authenticator from an encoded packet.
    ///
    /// The message consists of, in wire order: the authenticated subset of the common header, the
    /// address header, the path, the authenticated view of every extension, the L4 header and
    /// the payload. The authenticator itself is zeroed, so the message is the same before and
    /// after the authenticator is written.
    pub fn authenticated_bytes(&self, raw: &[u8]) -> Vec<u8> {
        let section = |offsets: &SectionOffsets| raw.get(offsets.range()).unwrap_or_default();
        let mut message = Vec::with_capacity(raw.len());

        if let Some(common) = raw
            .get(self.common_header.range())
            .and_then(|header| <&[u8; CommonHeader::LENGTH]>::try_from(header).ok())
        {
            message.extend_from_slice(&CommonHeaderLayout::authenticated_bytes(common));
        }
        message.extend_from_slice(section(&self.address_header));
        message.extend_from_slice(section(&self.path));
        for extension in &self.extensions {
            extension
                .kind
                .append_authenticated(section(&extension.offsets), &mut message);
        }
        message.extend_from_slice(section(&self.l4_header));
        message.extend_from_slice(section(&self.payload));
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets() -> Offsets {
        Offsets {
            common_header: SectionOffsets::new(0, 8),
            address_header: SectionOffsets::new(8, 8),
            path: SectionOffsets::new(16, 0),
            extensions: vec![
                ExtensionOffsets {
                    kind: ExtensionKind::HopByHop,
                    offsets: SectionOffsets::new(16, 8),
                },
                ExtensionOffsets {
                    kind: ExtensionKind::Security {
                        authenticator: SectionOffsets::new(4, 2),
                    },
                    offsets: SectionOffsets::new(24, 8),
                },
            ],
            l4_header: SectionOffsets::new(32, 2),
            payload: SectionOffsets::new(34, 1),
        }
    }

    fn raw() -> Vec<u8> {
        let mut raw = vec![0, 0x41, 0, 35, 2, 0, 0, 0];
        raw.extend_from_slice(&[10, 11, 12, 13, 14, 15, 16, 17]);
        raw.extend_from_slice(&[222, 1, 7, 90, 91, 92, 93, 94]);
        raw.extend_from_slice(&[17, 1, 2, 3, 0xaa, 0xbb, 4, 5]);
        raw.extend_from_slice(&[40, 41, 50]);
        raw
    }

    #[test]
    fn authenticated_bytes_follow_wire_order() {
        let expected = [
            vec![0, 0x41, 0],
            vec![10, 11, 12, 13, 14, 15, 16, 17],
            vec![222, 7],
            vec![17, 1, 2, 3, 0, 0, 4, 5],
            vec![40, 41, 50],
        ]
        .concat();
        assert_eq!(offsets().authenticated_bytes(&raw()), expected);
    }

    #[test]
    fn authenticator_is_absolute() {
        assert_eq!(offsets().authenticator(), Some(SectionOffsets::new(28, 2)));
    }

    #[test]
    fn extension_block_spans_all_extensions() {
        assert_eq!(offsets().extension_block(), SectionOffsets::new(16, 16));
        let empty = Offsets {
            path: SectionOffsets::new(16, 8),
            ..Offsets::default()
        };
        assert_eq!(empty.extension_block(), SectionOffsets::new(24, 0));
    }

    #[test]
    fn out_of_range_sections_are_skipped() {
        let mut offsets = offsets();
        offsets.payload = SectionOffsets::new(40, 8);
        assert_eq!(offsets.authenticated_bytes(&raw()).len(), 3 + 8 + 2 + 8 + 2);
    }
}
