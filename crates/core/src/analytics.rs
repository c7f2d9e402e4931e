//! Page view and event recording.
//!
//! Events are appended to `analytics.events` and the list is capped to the
//! most recent [`MAX_EVENTS`]. There is no aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::validation::{FieldSpec, Rule, Schema};

/// Events kept in the analytics document.
pub const MAX_EVENTS: usize = 1000;

/// A recorded client event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    #[serde(default = "default_event")]
    pub event: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(default = "Utc::now")]
    pub recorded_at: DateTime<Utc>,
}

fn default_event() -> String {
    "pageview".to_string()
}

const EVENT_SCHEMA: Schema = Schema::new(&[
    FieldSpec { path: "path", rules: &[Rule::Required, Rule::NonBlank, Rule::MaxLength(2048)] },
    FieldSpec { path: "event", rules: &[Rule::NonBlank, Rule::MaxLength(100)] },
    FieldSpec { path: "referrer", rules: &[Rule::String, Rule::MaxLength(2048)] },
]);

impl AnalyticsEvent {
    /// Parse a client event, stamping it with `now`.
    ///
    /// Returns `None` for bodies that do not describe an event; callers
    /// drop those silently.
    #[must_use]
    pub fn from_json(body: &Value, now: DateTime<Utc>) -> Option<Self> {
        EVENT_SCHEMA.validate(body).ok()?;
        let get = |field: &str| body.get(field).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            event: get("event").unwrap_or_else(default_event),
            path: get("path")?,
            referrer: get("referrer"),
            recorded_at: now,
        })
    }
}

/// Append `event` to the analytics document, keeping the newest [`MAX_EVENTS`].
///
/// # Errors
///
/// Returns a serde error if the event cannot be serialized.
pub fn record(document: &mut Value, event: &AnalyticsEvent) -> Result<(), serde_json::Error> {
    let value = serde_json::to_value(event)?;
    if !document.is_object() {
        *document = Value::Object(Map::new());
    }
    let Some(object) = document.as_object_mut() else {
        return Ok(());
    };

    let mut events = match object.remove("events") {
        Some(Value::Array(events)) => events,
        _ => Vec::new(),
    };
    events.push(value);
    if events.len() > MAX_EVENTS {
        events.drain(..events.len() - MAX_EVENTS);
    }
    object.insert("events".to_string(), Value::Array(events));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_json_defaults_event_name() {
        let event = AnalyticsEvent::from_json(&json!({"path": "/shows"}), Utc::now()).unwrap();
        assert_eq!(event.event, "pageview");
        assert!(AnalyticsEvent::from_json(&json!({"event": "click"}), Utc::now()).is_none());
        assert!(AnalyticsEvent::from_json(&json!("junk"), Utc::now()).is_none());
    }

    #[test]
    fn test_record_caps_events() {
        let mut document = json!({"events": [], "since": "2026-01-01"});
        let now = Utc::now();
        for i in 0..MAX_EVENTS + 5 {
            let event = AnalyticsEvent::from_json(&json!({"path": format!("/p/{i}")}), now).unwrap();
            record(&mut document, &event).unwrap();
        }

        let events = document["events"].as_array().unwrap();
        assert_eq!(events.len(), MAX_EVENTS);
        assert_eq!(events[0]["path"], json!("/p/5"));
        assert_eq!(document["since"], json!("2026-01-01"));
    }
}
