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

//! SCION packet headers.

mod common_header;
pub use common_header::{CommonHeader, NextHeader};

mod address_header;
pub use address_header::AddressHeader;

mod path;
pub use path::RawPath;

/// Instances of an object associated with both a source and destination endpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
pub struct ByEndpoint<T> {
    /// The value for the source
    pub source: T,
    /// The value for the destination
    pub destination: T,
}

impl<T> ByEndpoint<T> {
    /// Swaps source and destination.
    pub fn into_reversed(self) -> Self {
        Self {
            source: self.destination,
            destination: self.source,
        }
    }

    /// Applies the function to both values.
    pub fn map<U, F: Fn(&T) -> U>(&self, function: F) -> ByEndpoint<U> {
        ByEndpoint {
            source: function(&self.source),
            destination: function(&self.destination),
        }
    }
}

impl<T: Clone> ByEndpoint<T> {
    /// Create a new instance where both the source and destination have the same value.
    pub fn with_cloned(source_and_destination: T) -> Self {
        Self {
            destination: source_and_destination.clone(),
            source: source_and_destination,
        }
    }
}
