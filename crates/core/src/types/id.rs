//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Identifiers in the
//! document store are plain strings, so every ID wraps a `String`.

use chrono::{DateTime, Utc};

/// Maximum length accepted for any identifier.
pub const MAX_ID_LENGTH: usize = 128;

/// Errors that can occur when parsing an identifier.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input string is empty or only whitespace.
    #[error("identifier cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("identifier must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Validating constructor `parse()` plus `as_str()` and `into_inner()`
/// - `Display` and `FromStr` implementations
///
/// # Example
///
/// ```rust
/// # use mini_shop_core::define_id;
/// define_id!(CustomerId);
///
/// let id = CustomerId::parse("c-1").unwrap();
/// assert_eq!(id.as_str(), "c-1");
/// assert!(CustomerId::parse("").is_err());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an ID, rejecting empty or overlong values.
            ///
            /// # Errors
            ///
            /// Returns an error if the input is blank or longer than
            /// `MAX_ID_LENGTH` characters.
            pub fn parse(value: &str) -> ::core::result::Result<Self, $crate::IdError> {
                if value.trim().is_empty() {
                    return Err($crate::IdError::Empty);
                }
                if value.chars().count() > $crate::MAX_ID_LENGTH {
                    return Err($crate::IdError::TooLong {
                        max: $crate::MAX_ID_LENGTH,
                    });
                }
                Ok(Self(value.to_owned()))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_id!(ProductId);
define_id!(OrderId);

impl OrderId {
    /// Build an order ID from a point in time: `"o"` followed by the Unix
    /// epoch in milliseconds.
    ///
    /// Two orders created within the same millisecond share an ID. The store
    /// write is unconditional, so the later order replaces the earlier one.
    #[must_use]
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(format!("o{}", at.timestamp_millis()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(ProductId::parse(""), Err(IdError::Empty));
        assert_eq!(ProductId::parse("   "), Err(IdError::Empty));
    }

    #[test]
    fn test_parse_rejects_overlong() {
        let long = "p".repeat(MAX_ID_LENGTH + 1);
        assert_eq!(
            OrderId::parse(&long),
            Err(IdError::TooLong { max: MAX_ID_LENGTH })
        );
        assert!(OrderId::parse(&"p".repeat(MAX_ID_LENGTH)).is_ok());
    }

    #[test]
    fn test_serde_transparent() {
        let id = ProductId::parse("p1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p1\"");
        let back: ProductId = serde_json::from_str("\"p1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_order_id_from_timestamp() {
        let at = Utc.timestamp_millis_opt(1_704_067_200_123).unwrap();
        assert_eq!(OrderId::from_timestamp(at).as_str(), "o1704067200123");
    }

    #[test]
    fn test_order_ids_collide_within_same_millisecond() {
        let first = Utc.timestamp_nanos(1_704_067_200_123_000_001);
        let second = Utc.timestamp_nanos(1_704_067_200_123_999_999);
        assert_eq!(OrderId::from_timestamp(first), OrderId::from_timestamp(second));
    }
}
