//! Content documents: keys, default shapes and the one-level merge.
//!
//! Every piece of site content lives in a single JSON document addressed
//! by a string key. A missing document is not an error: readers get the
//! key's default shape and the first write creates the document.

use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::order::StoreSettings;
use crate::visibility::VisibilityConfig;

/// Longest accepted content key.
pub const MAX_KEY_LENGTH: usize = 64;

/// Errors produced by content key parsing and document merging.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// Key contains characters outside `[a-z0-9_-]` or is too long.
    #[error("invalid content key: {0}")]
    InvalidKey(String),

    /// PATCH body was not a JSON object.
    #[error("patch body must be a JSON object")]
    PatchNotObject,

    /// Document has the wrong top-level JSON type for its key.
    #[error("{key} must be a JSON {expected}")]
    WrongShape {
        /// Key being written.
        key: &'static str,
        /// Expected JSON type.
        expected: &'static str,
    },
}

/// Top-level JSON type a content domain is stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// A list of records (products, shows, releases...).
    Array,
    /// A single object (about, homepage, settings...).
    Object,
}

impl DocumentShape {
    const fn name(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// The named content domains of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKey {
    /// Store products, a list.
    Products,
    /// Tour dates, a list.
    Shows,
    /// Releases with their tracks, a list.
    Music,
    /// Band bio and members.
    About,
    /// Photo, video and flyer buckets.
    Media,
    /// Homepage copy and hero.
    Homepage,
    /// Placed orders, newest first. Admin only.
    Orders,
    /// The page/section/element visibility tree.
    Visibility,
    /// Site name, currency and shipping options.
    SiteConfig,
    /// Social links.
    Socials,
    /// Payment provider settings; secrets are masked publicly.
    PaymentConfig,
    /// Contact form inbox. Admin only.
    Messages,
    /// Recorded client events. Admin only.
    Analytics,
}

impl ContentKey {
    /// All known domains.
    pub const ALL: [Self; 13] = [
        Self::Products,
        Self::Shows,
        Self::Music,
        Self::About,
        Self::Media,
        Self::Homepage,
        Self::Orders,
        Self::Visibility,
        Self::SiteConfig,
        Self::Socials,
        Self::PaymentConfig,
        Self::Messages,
        Self::Analytics,
    ];

    /// Storage key of the domain.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Shows => "shows",
            Self::Music => "music",
            Self::About => "about",
            Self::Media => "media",
            Self::Homepage => "homepage",
            Self::Orders => "orders",
            Self::Visibility => "visibility",
            Self::SiteConfig => "site-config",
            Self::Socials => "socials",
            Self::PaymentConfig => "payment-config",
            Self::Messages => "messages",
            Self::Analytics => "analytics",
        }
    }

    /// Look up a known domain by its storage key.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }

    /// Top-level JSON type of the domain.
    #[must_use]
    pub const fn shape(&self) -> DocumentShape {
        match self {
            Self::Products | Self::Shows | Self::Music | Self::Orders | Self::Messages => {
                DocumentShape::Array
            }
            _ => DocumentShape::Object,
        }
    }

    /// Whether the public API may read this domain.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        !matches!(self, Self::Orders | Self::Messages | Self::Analytics)
    }

    /// The value readers get when the document has never been written.
    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            Self::Products | Self::Shows | Self::Music | Self::Orders | Self::Messages => {
                json!([])
            }
            Self::Media => json!({"photos": [], "videos": [], "flyers": []}),
            Self::Visibility => VisibilityConfig::default().to_value(),
            Self::Analytics => json!({"events": []}),
            Self::SiteConfig => {
                serde_json::to_value(StoreSettings::default()).unwrap_or_else(|_| json!({}))
            }
            Self::About => json!({"bio": "", "members": []}),
            Self::Homepage | Self::Socials | Self::PaymentConfig => json!({}),
        }
    }

    /// Check that a full replacement has the domain's top-level type.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::WrongShape` on a mismatch.
    pub fn check_shape(&self, value: &Value) -> Result<(), ContentError> {
        let shape = self.shape();
        if shape.matches(value) {
            Ok(())
        } else {
            Err(ContentError::WrongShape {
                key: self.as_str(),
                expected: shape.name(),
            })
        }
    }
}

impl std::fmt::Display for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a free-form content key.
///
/// Keys double as file names in the file-backed store, so they are
/// restricted to `^[a-z0-9][a-z0-9_-]{0,63}$`.
///
/// # Errors
///
/// Returns `ContentError::InvalidKey` if the key does not match.
pub fn validate_key(key: &str) -> Result<&str, ContentError> {
    let mut chars = key.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    let rest_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

    if first_ok && rest_ok && key.len() <= MAX_KEY_LENGTH {
        Ok(key)
    } else {
        Err(ContentError::InvalidKey(key.to_string()))
    }
}

/// Default document for any key, known or not.
///
/// Unknown keys default to an empty object.
#[must_use]
pub fn default_for(key: &str) -> Value {
    ContentKey::parse(key).map_or_else(|| json!({}), |k| k.default_value())
}

/// Merge `patch` into `current` one level deep.
///
/// Equivalent to `{...current, ...patch}`: top-level keys of the patch
/// overwrite those of the current document, and nested objects are
/// replaced wholesale rather than merged. A current value that is not an
/// object is treated as empty.
///
/// ```rust
/// use backline_core::content::shallow_merge;
/// use serde_json::json;
///
/// let merged = shallow_merge(json!({"a": {"x": 1}, "b": 2}), json!({"a": {"y": 2}})).unwrap();
/// assert_eq!(merged, json!({"a": {"y": 2}, "b": 2}));
/// ```
///
/// # Errors
///
/// Returns `ContentError::PatchNotObject` if `patch` is not an object.
pub fn shallow_merge(current: Value, patch: Value) -> Result<Value, ContentError> {
    let Value::Object(patch) = patch else {
        return Err(ContentError::PatchNotObject);
    };

    let mut merged = match current {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    merged.extend(patch);

    Ok(Value::Object(merged))
}
