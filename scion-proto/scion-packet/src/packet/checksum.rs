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

//! Internet checksum of L4 headers.

use super::{NextHeader, headers::AddressHeader};
use crate::wire_encoding::WireEncode;

/// Incrementally computes the 16-bit ones' complement checksum of RFC 1071.
///
/// Every added slice is summed on its own: a trailing odd byte is treated as the high-order byte
/// of a 16-bit word padded with zero, and the next slice starts again at a word boundary.
///
/// # Examples
///
/// ```
/// # use scion_packet::packet::ChecksumDigest;
/// let checksum = ChecksumDigest::new().add_slice(&[0x45, 0x00, 0x01]).checksum();
/// assert_eq!(checksum, !0x4600);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ChecksumDigest {
    sum: u64,
}

impl ChecksumDigest {
    /// Creates an empty digest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single 16-bit word.
    pub fn add_u16(&mut self, word: u16) -> &mut Self {
        self.sum += u64::from(word);
        self
    }

    /// Adds all bytes of the slice.
    pub fn add_slice(&mut self, data: &[u8]) -> &mut Self {
        let mut chunks = data.chunks_exact(2);
        for chunk in &mut chunks {
            self.sum += u64::from(u16::from_be_bytes([chunk[0], chunk[1]]));
        }
        if let [last] = chunks.remainder() {
            self.sum += u64::from(*last) << 8;
        }
        self
    }

    /// Folds the sum to 16 bits and returns its ones' complement.
    pub fn checksum(&self) -> u16 {
        let mut sum = self.sum;
        while sum > 0xffff {
            sum = (sum >> 16) + (sum & 0xffff);
        }
        !(sum as u16)
    }
}

/// An L4 header protected by the internet checksum.
///
/// The checksum covers a pseudo header followed by the L4 header, with its checksum field set to
/// zero, and the payload. The pseudo header is the encoded address header followed by a zero
/// byte and the protocol number.
pub trait MessageChecksum {
    /// The checksum currently stored in the header.
    fn checksum(&self) -> u16;

    /// Stores a checksum in the header.
    fn set_checksum_value(&mut self, checksum: u16);

    /// The protocol number used in the pseudo header.
    fn protocol(&self) -> NextHeader;

    /// Adds the header to the digest with its checksum field zeroed.
    fn add_header_to_digest(&self, digest: &mut ChecksumDigest);

    /// Computes the checksum for the given addresses and payload.
    fn calculate_checksum(&self, address_header: &AddressHeader, payload: &[u8]) -> u16 {
        let mut digest = ChecksumDigest::new();
        digest
            .add_slice(&address_header.encode_to_bytes())
            .add_slice(&[0, u8::from(self.protocol())]);
        self.add_header_to_digest(&mut digest);
        digest.add_slice(payload).checksum()
    }

    /// Computes the checksum and stores it in the header.
    fn set_checksum(&mut self, address_header: &AddressHeader, payload: &[u8]) {
        let checksum = self.calculate_checksum(address_header, payload);
        self.set_checksum_value(checksum);
    }
}
