//! Confidence gates
//!
//! A [`GatePolicy`] is a declarative conjunction of predicates over fields
//! of structured validation output. Evaluation is total: every predicate is
//! checked and every failing predicate contributes a reason, so a rejected
//! decision still carries full diagnostics. The evaluator is a pure
//! function of its inputs, which keeps gate behavior testable without any
//! model calls.
//!
//! # Example
//!
//! ```
//! use relay_domain::gate::{Comparator, GatePolicy};
//! use serde_json::json;
//!
//! let policy = GatePolicy::new()
//!     .require_true("is_calendar_event")
//!     .min_confidence("confidence_score", 0.7);
//!
//! let decision = policy.evaluate(&[json!({
//!     "is_calendar_event": true,
//!     "confidence_score": 0.92,
//! })]);
//! assert!(decision.accepted);
//! assert!(decision.reasons.is_empty());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison applied to one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// Field must equal this value (bool, string or number)
    Equals(Value),
    /// Numeric field must be strictly greater than the threshold
    GreaterThan(f64),
    /// Numeric field must be at least the threshold
    AtLeast(f64),
    /// Numeric field must be strictly less than the threshold
    LessThan(f64),
    /// Numeric field must be at most the threshold
    AtMost(f64),
}

/// One predicate of a gate policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatePredicate {
    /// Dot-separated path into one of the evaluated values
    pub field_path: String,
    pub comparator: Comparator,
}

impl GatePredicate {
    pub fn new(field_path: impl Into<String>, comparator: Comparator) -> Self {
        Self {
            field_path: field_path.into(),
            comparator,
        }
    }
}

/// Accept/reject decision produced by evaluating a policy.
///
/// Derived and never mutated. `confidence` is the lowest value observed by
/// a lower-bound comparator, clamped to [0, 1], or 1.0 when the policy has
/// none. Upper-bound comparators constrain magnitudes such as durations and
/// do not feed the confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    pub accepted: bool,
    pub confidence: f64,
    /// One human-readable explanation per failing predicate, in policy order
    pub reasons: Vec<String>,
}

/// Conjunction of predicates; `accepted` is the logical AND of all of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatePolicy {
    predicates: Vec<GatePredicate>,
}

impl GatePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn predicate(mut self, field_path: impl Into<String>, comparator: Comparator) -> Self {
        self.predicates.push(GatePredicate::new(field_path, comparator));
        self
    }

    /// Require a boolean field to be true.
    pub fn require_true(self, field_path: impl Into<String>) -> Self {
        self.predicate(field_path, Comparator::Equals(Value::Bool(true)))
    }

    /// Require a numeric field to exceed a threshold.
    pub fn min_confidence(self, field_path: impl Into<String>, threshold: f64) -> Self {
        self.predicate(field_path, Comparator::GreaterThan(threshold))
    }

    pub fn predicates(&self) -> &[GatePredicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Evaluate the policy over a set of structured values.
    ///
    /// Each field path is looked up in the values in order; the first value
    /// containing the path supplies the field. Every predicate is always
    /// evaluated, even after one has failed.
    pub fn evaluate(&self, values: &[Value]) -> GateDecision {
        let mut reasons = Vec::new();
        let mut confidence = f64::INFINITY;

        for predicate in &self.predicates {
            let field = lookup(values, &predicate.field_path);

            match (&predicate.comparator, field) {
                (_, None) => {
                    reasons.push(format!("{} is missing", predicate.field_path));
                }
                (Comparator::Equals(expected), Some(actual)) => {
                    if actual != expected {
                        if expected.is_boolean() && actual.is_boolean() {
                            reasons.push(format!("{} is {}", predicate.field_path, actual));
                        } else {
                            reasons.push(format!(
                                "{} is {}, expected {}",
                                predicate.field_path, actual, expected
                            ));
                        }
                    }
                }
                (comparator, Some(actual)) => match actual.as_f64() {
                    Some(number) => {
                        if matches!(
                            comparator,
                            Comparator::GreaterThan(_) | Comparator::AtLeast(_)
                        ) {
                            confidence = confidence.min(number);
                        }
                        if let Some(reason) = check_numeric(comparator, number, &predicate.field_path)
                        {
                            reasons.push(reason);
                        }
                    }
                    None => {
                        reasons.push(format!(
                            "{} is not a number: {}",
                            predicate.field_path, actual
                        ));
                    }
                },
            }
        }

        GateDecision {
            accepted: reasons.is_empty(),
            confidence: if confidence.is_finite() {
                confidence.clamp(0.0, 1.0)
            } else {
                1.0
            },
            reasons,
        }
    }
}

fn check_numeric(comparator: &Comparator, actual: f64, path: &str) -> Option<String> {
    let (ok, symbol, threshold) = match comparator {
        Comparator::GreaterThan(t) => (actual > *t, ">", *t),
        Comparator::AtLeast(t) => (actual >= *t, ">=", *t),
        Comparator::LessThan(t) => (actual < *t, "<", *t),
        Comparator::AtMost(t) => (actual <= *t, "<=", *t),
        Comparator::Equals(_) => return None,
    };

    if ok {
        None
    } else {
        Some(format!("{} is {}, required {} {}", path, actual, symbol, threshold))
    }
}

/// Resolve a dot-separated path against the first value containing it.
fn lookup<'a>(values: &'a [Value], path: &str) -> Option<&'a Value> {
    values.iter().find_map(|value| {
        let mut current = value;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current)
    })
}
