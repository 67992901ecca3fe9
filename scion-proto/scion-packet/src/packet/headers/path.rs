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

use bytes::{BufMut, Bytes};

use crate::{
    line::LINE_LEN,
    packet::{DecodeError, EncodeError, InadequateBufferSize, Section},
    wire_encoding::WireEncode,
};

/// An opaque forwarding path.
///
/// The path is carried as raw bytes. Only the positions of the current info field and hop field
/// are interpreted; they are relative to the start of the path and are written to the common
/// header as absolute line cursors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawPath {
    /// The encoded path, a whole number of lines.
    pub raw: Bytes,
    /// Offset of the current info field in bytes from the start of the path.
    pub info_offset: usize,
    /// Offset of the current hop field in bytes from the start of the path.
    pub hop_offset: usize,
}

impl RawPath {
    /// Creates a path whose cursors point to its first line.
    pub fn new(raw: Bytes) -> Self {
        Self {
            raw,
            info_offset: 0,
            hop_offset: 0,
        }
    }

    /// Returns true if the path has no bytes.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Computes the absolute line cursors `(info, hop)` for the common header, given the offset
    /// of the path in the packet.
    ///
    /// Empty paths have both cursors at zero.
    pub(crate) fn cursors(&self, path_start: usize) -> Result<(u8, u8), EncodeError> {
        if self.raw.len() % LINE_LEN != 0 {
            return Err(EncodeError::Misaligned {
                section: Section::Path,
                length: self.raw.len(),
            });
        }
        if self.is_empty() {
            return Ok((0, 0));
        }
        Ok((
            self.cursor("info field", path_start, self.info_offset)?,
            self.cursor("hop field", path_start, self.hop_offset)?,
        ))
    }

    fn cursor(
        &self,
        field: &'static str,
        path_start: usize,
        offset: usize,
    ) -> Result<u8, EncodeError> {
        let invalid = EncodeError::InvalidPathOffset { field, offset };
        if offset % LINE_LEN != 0 || offset >= self.raw.len() {
            return Err(invalid);
        }
        u8::try_from((path_start + offset) / LINE_LEN).or(Err(invalid))
    }

    /// Reconstructs the path from the bytes between the address header and the end of the
    /// headers, using the cursors of the common header.
    ///
    /// Both cursors being zero means they are unset.
    pub(crate) fn from_cursors(
        raw: Bytes,
        path_start: usize,
        info_cursor: u8,
        hop_cursor: u8,
    ) -> Result<Self, DecodeError> {
        if raw.len() % LINE_LEN != 0 {
            return Err(DecodeError::LengthMismatch {
                section: Section::Path,
                expected: raw.len().next_multiple_of(LINE_LEN),
                actual: raw.len(),
            });
        }
        if info_cursor == 0 && hop_cursor == 0 {
            return Ok(Self::new(raw));
        }

        let offset = |field: &'static str, cursor: u8| {
            let absolute = usize::from(cursor) * LINE_LEN;
            absolute
                .checked_sub(path_start)
                .filter(|relative| *relative < raw.len())
                .ok_or(DecodeError::InvalidPathOffset {
                    field,
                    offset: cursor,
                })
        };
        let info_offset = offset("info field", info_cursor)?;
        let hop_offset = offset("hop field", hop_cursor)?;

        Ok(Self {
            raw,
            info_offset,
            hop_offset,
        })
    }
}

impl WireEncode for RawPath {
    type Error = InadequateBufferSize;

    #[inline]
    fn encoded_length(&self) -> usize {
        self.raw.len()
    }

    fn encode_to_unchecked<T: BufMut>(&self, buffer: &mut T) {
        buffer.put_slice(&self.raw);
    }
}
