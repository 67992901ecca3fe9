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

//! Traits for encoding and decoding fixed-layout headers.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::packet::InadequateBufferSize;

/// A type that can be written to the wire.
pub trait WireEncode {
    /// The error returned when encoding fails.
    type Error: From<InadequateBufferSize>;

    /// The number of bytes written by [`encode_to_unchecked`][Self::encode_to_unchecked].
    fn encoded_length(&self) -> usize;

    /// Writes the encoded value to the buffer.
    ///
    /// The caller has to make sure the buffer has at least
    /// [`encoded_length`][Self::encoded_length] bytes of remaining capacity; [`BufMut`] panics
    /// otherwise.
    fn encode_to_unchecked<T: BufMut>(&self, buffer: &mut T);

    /// Writes the encoded value to the buffer after checking that it fits.
    fn encode_to<T: BufMut>(&self, buffer: &mut T) -> Result<(), Self::Error> {
        if buffer.remaining_mut() < self.encoded_length() {
            return Err(InadequateBufferSize.into());
        }
        self.encode_to_unchecked(buffer);
        Ok(())
    }

    /// Encodes the value into a newly allocated buffer.
    fn encode_to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(self.encoded_length());
        self.encode_to_unchecked(&mut buffer);
        buffer.freeze()
    }
}

/// A type that can be read from the front of a buffer.
///
/// On success, the buffer is advanced past the decoded value.
pub trait WireDecode<T: Buf>: Sized {
    /// The error returned when decoding fails.
    type Error;

    /// Decodes a value from the start of `data`.
    fn decode(data: &mut T) -> Result<Self, Self::Error>;
}
