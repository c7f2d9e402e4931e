//! Fire-and-forget event recording.

use chrono::{DateTime, Utc};
use serde_json::Value;

use backline_core::analytics::{AnalyticsEvent, record};
use backline_core::content::ContentKey;

use crate::db::ContentStore;
use crate::error::AppError;

const ANALYTICS: &str = ContentKey::Analytics.as_str();

/// Record a client event. Never fails: bad bodies are dropped and storage
/// errors are logged.
pub async fn track(store: &dyn ContentStore, body: &Value, now: DateTime<Utc>) {
    let Some(event) = AnalyticsEvent::from_json(body, now) else {
        tracing::debug!("Ignoring malformed analytics event");
        return;
    };

    let result = store
        .modify(ANALYTICS, move |mut document| {
            record(&mut document, &event)
                .map_err(|e| AppError::Internal(format!("event serialization failed: {e}")))?;
            Ok(document)
        })
        .await;

    if let Err(e) = result {
        tracing::warn!(error = %e, "Failed to record analytics event");
    }
}
