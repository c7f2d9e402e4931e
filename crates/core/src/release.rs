//! Music releases and their public, password-gated view.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{ReleaseId, ReleaseVisibility, TrackId};

/// A track on a release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TrackId>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    /// Fields the admin console stores that the server does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Track {
    fn withhold_gated(&mut self) {
        self.audio_url = None;
        self.lyrics = None;
    }
}

/// A music release as stored in the `music` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: ReleaseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub visibility: ReleaseVisibility,
    /// Plaintext unlock password for private releases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Release {
    /// Parse the releases out of a `music` document.
    ///
    /// # Errors
    ///
    /// Returns a serde error if the document is not an array of releases.
    pub fn list_from(document: Value) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_value(document)
    }

    /// Whether `key` is this release's id or slug.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.id.as_str() == key || self.slug.as_deref() == Some(key)
    }

    /// Whether the release appears in public listings.
    #[must_use]
    pub fn is_listed(&self) -> bool {
        self.visibility != ReleaseVisibility::Unlisted
    }

    /// Whether `supplied` unlocks this release's gated track data.
    #[must_use]
    pub fn unlocks_with(&self, supplied: Option<&str>) -> bool {
        if self.visibility != ReleaseVisibility::Private {
            return true;
        }
        matches!((self.password.as_deref(), supplied), (Some(stored), Some(given)) if stored == given)
    }

    /// The release as served to the public.
    ///
    /// The stored password is never included. A private release that is
    /// not unlocked by `supplied` loses every track's `audioUrl` and
    /// `lyrics` and gains `requiresPassword: true`.
    #[must_use]
    pub fn public_view(&self, supplied: Option<&str>) -> Value {
        let unlocked = self.unlocks_with(supplied);

        let mut view = self.clone();
        view.password = None;
        if !unlocked {
            view.tracks.iter_mut().for_each(Track::withhold_gated);
        }

        let mut value = serde_json::to_value(view).unwrap_or_default();
        if !unlocked {
            if let Some(object) = value.as_object_mut() {
                object.insert("requiresPassword".to_string(), Value::Bool(true));
            }
        }
        value
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn private_release() -> Release {
        serde_json::from_value(json!({
            "id": "r1",
            "slug": "demo-tapes",
            "title": "Demo Tapes",
            "visibility": "private",
            "password": "letmein",
            "label": "self-released",
            "tracks": [
                {"title": "Intro", "audioUrl": "/uploads/music/intro.mp3", "lyrics": "la la", "bpm": 120},
                {"title": "Outro", "audioUrl": "/uploads/music/outro.mp3"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_private_release_without_password_is_gated() {
        let release = private_release();
        for supplied in [None, Some("wrong"), Some("")] {
            let view = release.public_view(supplied);
            assert_eq!(view["requiresPassword"], json!(true));
            assert!(view.get("password").is_none());
            for track in view["tracks"].as_array().unwrap() {
                assert!(track.get("audioUrl").is_none());
                assert!(track.get("lyrics").is_none());
            }
            // Uninterpreted fields survive
            assert_eq!(view["tracks"][0]["bpm"], json!(120));
            assert_eq!(view["label"], json!("self-released"));
        }
    }

    #[test]
    fn test_private_release_with_password_is_complete() {
        let view = private_release().public_view(Some("letmein"));
        assert!(view.get("password").is_none());
        assert!(view.get("requiresPassword").is_none());
        assert_eq!(view["tracks"][0]["audioUrl"], json!("/uploads/music/intro.mp3"));
        assert_eq!(view["tracks"][0]["lyrics"], json!("la la"));
    }

    #[test]
    fn test_private_release_without_stored_password_stays_locked() {
        let mut release = private_release();
        release.password = None;
        assert!(!release.unlocks_with(Some("")));
        assert!(!release.unlocks_with(None));
    }

    #[test]
    fn test_public_release_hides_password_field() {
        let mut release = private_release();
        release.visibility = ReleaseVisibility::Public;
        let view = release.public_view(None);
        assert!(view.get("password").is_none());
        assert!(view.get("requiresPassword").is_none());
        assert!(view["tracks"][1].get("audioUrl").is_some());
    }

    #[test]
    fn test_matches_id_or_slug() {
        let release = private_release();
        assert!(release.matches("r1"));
        assert!(release.matches("demo-tapes"));
        assert!(!release.matches("Demo Tapes"));
    }

    #[test]
    fn test_unlisted_is_not_listed() {
        let mut release = private_release();
        assert!(release.is_listed());
        release.visibility = ReleaseVisibility::Unlisted;
        assert!(!release.is_listed());
    }
}
