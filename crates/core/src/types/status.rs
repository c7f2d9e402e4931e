//! Status enums for orders, releases and media.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Orders start as `Pending`. The forward lifecycle is
/// `pending → processing → shipped → delivered`, and `cancelled` can be
/// reached from any state except `delivered`. Admin updates may set any
/// status; [`OrderStatus::is_forward_transition`] only tells callers
/// whether a change follows the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Position in the forward lifecycle; `None` for `Cancelled`.
    const fn rank(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Processing => Some(1),
            Self::Shipped => Some(2),
            Self::Delivered => Some(3),
            Self::Cancelled => None,
        }
    }

    /// Whether moving from `self` to `to` follows the order lifecycle.
    ///
    /// Staying on the same status counts as forward.
    #[must_use]
    pub fn is_forward_transition(self, to: Self) -> bool {
        match (self.rank(), to.rank()) {
            (Some(from), Some(to)) => to >= from,
            (Some(from), None) => from < 3,
            (None, None) => true,
            (None, Some(_)) => false,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Who can see a music release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseVisibility {
    /// Listed and fully playable.
    #[default]
    Public,
    /// Reachable by direct link only, not listed.
    Unlisted,
    /// Listed, but audio and lyrics require the release password.
    Private,
}

/// The typed buckets of the media document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaBucket {
    Photos,
    Videos,
    Flyers,
}

impl MediaBucket {
    /// All buckets.
    pub const ALL: [Self; 3] = [Self::Photos, Self::Videos, Self::Flyers];

    /// Field name of the bucket within the media document.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Photos => "photos",
            Self::Videos => "videos",
            Self::Flyers => "flyers",
        }
    }
}

impl std::fmt::Display for MediaBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == s)
            .ok_or_else(|| format!("invalid media bucket: {s}"))
    }
}
