//! Calendar assistant demo types
//!
//! Each struct doubles as the output contract of one structured
//! invocation: the derived JSON Schema is sent with the request and the
//! response deserializes back into the same type.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// First chaining stage: is this text a calendar event at all?
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EventExtraction {
    /// Raw description of the event
    pub description: String,
    /// Whether this text describes a calendar event
    pub is_calendar_event: bool,
    /// Confidence score between 0 and 1
    pub confidence_score: f64,
}

/// Second chaining stage: parsed event fields.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EventDetails {
    /// Name of the event
    pub name: String,
    /// One-line description
    pub description: String,
    /// Location, if mentioned
    pub location: Option<String>,
    /// ISO 8601 date and time
    pub date: String,
    pub duration_minutes: u32,
    /// Names or emails of participants
    pub participants: Vec<String>,
}

/// Final chaining stage: message shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EventConfirmation {
    /// Natural language confirmation message
    pub confirmation_message: String,
    /// Generated calendar link, if available
    pub calendar_link: Option<String>,
}

/// Parallel validation branch: is this a calendar request?
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CalendarValidation {
    pub is_calendar_request: bool,
    /// Confidence score between 0 and 1
    pub confidence_score: f64,
}

/// Parallel validation branch: prompt-injection screen.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SecurityCheck {
    pub is_safe: bool,
    /// Detected risk indicators, if any
    pub risk_flags: Vec<String>,
}

/// Routing handler output for the `new_event` intent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NewEventDetails {
    pub name: String,
    /// ISO 8601 date and time
    pub date: String,
    pub duration_minutes: u32,
    pub participants: Vec<String>,
}

/// One field change requested on an existing event.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Change {
    /// Which field to change
    pub field: String,
    pub new_value: String,
}

/// Routing handler output for the `modify_event` intent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ModifyEventDetails {
    /// How the user refers to the event being changed
    pub event_identifier: String,
    pub changes: Vec<Change>,
    pub participants_to_add: Vec<String>,
    pub participants_to_remove: Vec<String>,
}
