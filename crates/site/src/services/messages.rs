//! Contact form inbox.

use chrono::{DateTime, Utc};
use serde_json::Value;

use backline_core::content::ContentKey;
use backline_core::message::{ContactMessage, MessageUpdate};
use backline_core::types::MessageId;

use crate::db::ContentStore;
use crate::error::{AppError, Result};

const MESSAGES: &str = ContentKey::Messages.as_str();

fn not_found() -> AppError {
    AppError::NotFound("Message".to_string())
}

fn into_records(document: Value) -> Vec<Value> {
    match document {
        Value::Array(records) => records,
        _ => Vec::new(),
    }
}

fn has_id(record: &Value, id: &str) -> bool {
    record.get("id").and_then(Value::as_str) == Some(id)
}

/// Store a contact form submission, newest first.
///
/// # Errors
///
/// Returns `AppError::Validation` for an invalid form, or a storage error.
pub async fn submit(store: &dyn ContentStore, body: Value, now: DateTime<Utc>) -> Result<MessageId> {
    let message = ContactMessage::submit(body, now)?;
    let record = serde_json::to_value(&message)
        .map_err(|e| AppError::Internal(format!("message serialization failed: {e}")))?;

    store
        .modify(MESSAGES, move |document| {
            let mut records = into_records(document);
            records.insert(0, record);
            Ok(Value::Array(records))
        })
        .await?;

    tracing::info!(message_id = %message.id, "Contact message received");
    Ok(message.id)
}

/// All stored messages as JSON records.
///
/// # Errors
///
/// Returns a storage error.
pub async fn list(store: &dyn ContentStore) -> Result<Value> {
    Ok(store.read_or_default(MESSAGES).await?)
}

/// Mark a message read or unread and return it.
///
/// # Errors
///
/// Returns `AppError::Validation` unless the body is `{read: bool}`,
/// `AppError::NotFound` if absent, or a storage error.
pub async fn mark(store: &dyn ContentStore, id: &str, body: Value) -> Result<Value> {
    let update = MessageUpdate::from_json(body)?;
    let target = id.to_string();

    let document = store
        .modify(MESSAGES, move |document| {
            let mut records = into_records(document);
            let record = records
                .iter_mut()
                .find(|record| has_id(record, &target))
                .ok_or_else(not_found)?;
            if let Some(object) = record.as_object_mut() {
                object.insert("read".to_string(), Value::Bool(update.read));
            }
            Ok(Value::Array(records))
        })
        .await?;

    into_records(document)
        .into_iter()
        .find(|record| has_id(record, id))
        .ok_or_else(not_found)
}

/// Delete a message.
///
/// # Errors
///
/// Returns `AppError::NotFound` if absent, or a storage error.
pub async fn delete(store: &dyn ContentStore, id: &str) -> Result<()> {
    let target = id.to_string();
    store
        .modify(MESSAGES, move |document| {
            let mut records = into_records(document);
            let before = records.len();
            records.retain(|record| !has_id(record, &target));
            if records.len() == before {
                return Err(not_found());
            }
            Ok(Value::Array(records))
        })
        .await?;

    tracing::info!(message_id = id, "Contact message deleted");
    Ok(())
}
