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

//! Line arithmetic.
//!
//! Every section of a SCION packet header starts and ends on a line boundary. Lengths inside the
//! headers are therefore usually expressed as a number of lines rather than bytes.

use bytes::BufMut;

/// The length of a line in bytes.
pub const LINE_LEN: usize = 8;

/// Returns the number of zero bytes needed to extend `length` to a multiple of `line`.
///
/// `line` must not be zero.
pub const fn calc_padding(length: usize, line: usize) -> usize {
    let remainder = length % line;
    if remainder == 0 { 0 } else { line - remainder }
}

/// Returns `length` rounded up to the next line boundary.
pub const fn padded_length(length: usize) -> usize {
    length + calc_padding(length, LINE_LEN)
}

/// Writes `count` zero bytes to the buffer.
pub(crate) fn put_padding<T: BufMut>(buffer: &mut T, count: usize) {
    buffer.put_bytes(0, count);
}

/// Returns the index and value of the first non-zero byte, if any.
pub(crate) fn first_nonzero(bytes: &[u8]) -> Option<(usize, u8)> {
    bytes
        .iter()
        .enumerate()
        .find(|(_, value)| **value != 0)
        .map(|(index, value)| (index, *value))
}
