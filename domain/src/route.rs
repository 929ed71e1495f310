//! Intent routing value objects
//!
//! Routing classifies free-form input into one of a closed set of intent
//! labels, plus an `Unrecognized` catch-all that low-confidence
//! classifications are forced into.

use crate::schema::SchemaSpec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of intent labels a router recognizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSet {
    labels: Vec<String>,
}

impl IntentSet {
    pub fn new(labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Label assigned by routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// One of the router's configured labels
    Known(String),
    /// Catch-all: unknown label or confidence below the routing threshold
    Unrecognized,
}

impl Intent {
    pub fn as_known(&self) -> Option<&str> {
        match self {
            Intent::Known(label) => Some(label),
            Intent::Unrecognized => None,
        }
    }

    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Intent::Unrecognized)
    }
}

/// Result of classifying one input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResult {
    pub intent: Intent,
    /// The model's reported confidence, kept even when the intent was
    /// forced to `Unrecognized`
    pub confidence: f64,
    /// Cleaned description handed to the intent handler
    pub description: String,
}

impl RouteResult {
    pub fn unrecognized(confidence: f64, description: impl Into<String>) -> Self {
        Self {
            intent: Intent::Unrecognized,
            confidence,
            description: description.into(),
        }
    }
}

/// Wire shape of the router's structured classification call.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RouteClassification {
    /// One of the configured labels, or "unrecognized"
    pub intent: String,
    /// Confidence score between 0 and 1
    pub confidence: f64,
    /// Cleaned description of the request
    pub cleaned_description: String,
}

impl RouteClassification {
    /// Label the catch-all intent uses on the wire.
    pub const UNRECOGNIZED: &'static str = "unrecognized";

    /// Schema for the classification call, advertising the configured
    /// labels plus the catch-all in the `intent` property description.
    ///
    /// The labels are guidance, not a hard `enum` constraint: a label the
    /// model invents must decode and reach the router's membership check,
    /// where it falls through to `Unrecognized` instead of failing the
    /// invocation outright.
    pub fn schema_for(intents: &IntentSet) -> SchemaSpec {
        let mut spec = SchemaSpec::of::<RouteClassification>("route_classification");

        let mut allowed: Vec<String> = intents.labels().to_vec();
        allowed.push(Self::UNRECOGNIZED.to_string());

        if let Some(intent) = spec
            .schema
            .get_mut("properties")
            .and_then(|p| p.get_mut("intent"))
            .and_then(|i| i.as_object_mut())
        {
            intent.insert(
                "description".to_string(),
                Value::String(format!("One of: {}", allowed.join(", "))),
            );
        }
        spec
    }
}
