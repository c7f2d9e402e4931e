//! Contact form messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Email, MessageId};
use crate::validation::{FieldErrors, FieldSpec, Rule, Schema};

/// A message sent through the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: MessageId,
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ContactForm {
    name: String,
    email: String,
    #[serde(default)]
    subject: Option<String>,
    message: String,
}

/// Admin change to a stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MessageUpdate {
    pub read: bool,
}

const CONTACT_SCHEMA: Schema = Schema::new(&[
    FieldSpec { path: "name", rules: &[Rule::Required, Rule::NonBlank, Rule::MaxLength(200)] },
    FieldSpec { path: "email", rules: &[Rule::Required, Rule::Email] },
    FieldSpec { path: "subject", rules: &[Rule::String, Rule::MaxLength(200)] },
    FieldSpec { path: "message", rules: &[Rule::Required, Rule::NonBlank, Rule::MaxLength(5000)] },
]);

const MESSAGE_UPDATE_SCHEMA: Schema = Schema::new(&[FieldSpec {
    path: "read",
    rules: &[Rule::Required, Rule::Boolean],
}]);

impl ContactMessage {
    /// Validate a contact form body and create an unread message.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn submit(body: Value, now: DateTime<Utc>) -> Result<Self, FieldErrors> {
        CONTACT_SCHEMA.validate(&body)?;
        let form: ContactForm =
            serde_json::from_value(body).map_err(|e| FieldErrors::single("body", e.to_string()))?;
        let email =
            Email::parse(&form.email).map_err(|e| FieldErrors::single("email", e.to_string()))?;

        Ok(Self {
            id: MessageId::new(crate::types::id::generate_at(now)),
            name: form.name.trim().to_string(),
            email,
            subject: form.subject.filter(|s| !s.trim().is_empty()),
            message: form.message,
            read: false,
            created_at: now,
        })
    }
}

impl MessageUpdate {
    /// Validate a message update body.
    ///
    /// # Errors
    ///
    /// Returns a field error unless `read` is a boolean.
    pub fn from_json(body: Value) -> Result<Self, FieldErrors> {
        MESSAGE_UPDATE_SCHEMA.validate(&body)?;
        serde_json::from_value(body).map_err(|e| FieldErrors::single("body", e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_submit_creates_unread_message() {
        let message = ContactMessage::submit(
            json!({"name": " Alex ", "email": "alex@example.com", "subject": "", "message": "Booking?"}),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(message.name, "Alex");
        assert!(!message.read);
        assert_eq!(message.subject, None);
    }

    #[test]
    fn test_submit_reports_fields() {
        let errors =
            ContactMessage::submit(json!({"email": "nope", "message": "  "}), Utc::now()).unwrap_err();
        assert!(errors.contains("name"));
        assert!(errors.contains("email"));
        assert!(errors.contains("message"));
    }

    #[test]
    fn test_update_requires_boolean() {
        assert!(MessageUpdate::from_json(json!({"read": true})).unwrap().read);
        assert!(MessageUpdate::from_json(json!({"read": "yes"})).is_err());
        assert!(MessageUpdate::from_json(json!({})).is_err());
    }
}
