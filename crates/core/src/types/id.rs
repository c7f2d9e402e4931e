//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.
//!
//! Records stored in content documents carry string IDs built from the
//! current time in milliseconds followed by a short random base-36 suffix.
//! Uniqueness is probabilistic: two IDs generated in the same millisecond
//! collide only if their suffixes match.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Number of random base-36 characters appended to generated IDs.
pub const ID_SUFFIX_LEN: usize = 9;

/// Generate a new record ID for the given instant.
///
/// ```rust
/// # use backline_core::types::id::generate_at;
/// let now = chrono::Utc::now();
/// let id = generate_at(now);
/// assert!(id.starts_with(&now.timestamp_millis().to_string()));
/// ```
#[must_use]
pub fn generate_at(now: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from_digit(rng.random_range(0..36), 36).unwrap_or('0'))
        .collect();
    format!("{}{suffix}", now.timestamp_millis())
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Construction: `new()`, `generate()`
/// - Access: `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use backline_core::define_id;
/// define_id!(TicketId);
/// define_id!(VenueId);
///
/// let ticket = TicketId::new("t-1");
/// let venue = VenueId::new("t-1");
///
/// // These are different types, so this won't compile:
/// // let _: TicketId = venue;
/// assert_eq!(ticket.as_str(), venue.as_str());
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
            /// Wrap an existing ID value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh timestamp-plus-suffix ID.
            #[must_use]
            pub fn generate() -> Self {
                Self($crate::types::id::generate_at(::chrono::Utc::now()))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(OrderId);
define_id!(ProductId);
define_id!(ReleaseId);
define_id!(TrackId);
define_id!(MediaItemId);
define_id!(MessageId);
define_id!(UploadId);
