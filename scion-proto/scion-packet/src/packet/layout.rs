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

//! Field offsets in an encoded SCION packet

/// Generates basic member functions like
///
/// ```ignore
/// pub fn field_a(&self) -> BitOffset {
///     BitOffset(Self::START + 10)
/// }
/// ```
macro_rules! gen_static_field_offset {
    ($(($offset:expr, $name:ident)),* $(,)?) => {
        $(
            /// Returns the offset in bits to the field.
            pub fn $name(&self) -> BitOffset {
                BitOffset(Self::START + $offset)
            }
        )*
    };
}

/// Bit offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitOffset(u16);
impl BitOffset {
    /// Returns the offset in bytes
    pub fn bytes(self) -> usize {
        usize::from(self.0 / 8)
    }
}

/// Common header layout.
pub struct CommonHeaderLayout;
impl CommonHeaderLayout {
    //  0                   1                   2                   3
    //  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |Version|  DstType  |  SrcType  |            TotalLen           |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |    HdrLen     |   CurrInfoF   |   CurrHopF    |    NextHdr    |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

    /// Start offset.
    pub const START: u16 = 0;

    gen_static_field_offset! {
        (0, version),
        (10, src_type),
        (56, next_header),
    }

    /// The bytes of the common header that are covered by the packet authenticator.
    ///
    /// These are the version and host type fields followed by the next-header field. Lengths and
    /// path cursors change in transit and are excluded.
    pub fn authenticated_bytes(encoded_header: &[u8; 8]) -> [u8; 3] {
        let layout = Self;
        [
            encoded_header[layout.version().bytes()],
            encoded_header[layout.src_type().bytes()],
            encoded_header[layout.next_header().bytes()],
        ]
    }
}
