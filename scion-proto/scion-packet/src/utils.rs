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

//! Utils used internally in other modules.

/// Creates an enum for a protocol field that is encoded as a short integer, such as a host type,
/// a next-header tag or a security mode.
///
/// Named variants map to a fixed value. The trailing catch-all variants keep any other value so
/// that unknown tags survive a decode/encode cycle unchanged.
macro_rules! encoded_type {
    (
        $(#[$outer:meta])*
        pub enum $name:ident ($representation_type:ty) {
            $($(#[$doc:meta])* $variant:ident = $value:literal),*;
            $($(#[$doc_other:meta])* $variant_other:ident = $range:pat,)*
        }
    ) => {
        $(#[$outer])*
        #[repr($representation_type)]
        #[non_exhaustive]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$doc])* $variant = $value,)*
            $($(#[$doc_other])* $variant_other($representation_type),)*
        }

        impl From<$representation_type> for $name {
            fn from(value: $representation_type) -> Self {
                match value {
                    $($value => Self::$variant,)*
                    #[allow(clippy::redundant_pattern)]
                    $(x@$range => Self::$variant_other(x),)*
                }
            }
        }

        impl From<$name> for $representation_type {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $value,)*
                    $($name::$variant_other(x) => x,)*
                }
            }
        }
    };
}
pub(crate) use encoded_type;

#[cfg(test)]
mod tests {
    encoded_type! {
        /// Example field.
        pub enum Example(u8) {
            First = 1,
            Second = 2;
            Other = _,
        }
    }

    #[test]
    fn unknown_values_survive_conversion() {
        let value = Example::from(7);
        assert_eq!(value, Example::Other(7));
        assert_eq!(u8::from(value), 7);
    }

    #[test]
    fn known_values_map_to_variants() {
        assert_eq!(Example::from(2), Example::Second);
        assert_eq!(u8::from(Example::First), 1);
    }
}
