//! Pipeline run state and outcomes

use crate::conversation::Conversation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Process-local state for one pipeline run.
///
/// Created at pipeline start, mutated by each stage in sequence, discarded
/// at pipeline end. Structured values accumulate keyed by stage name, in
/// production order.
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    pub conversation: Conversation,
    values: Vec<(String, Value)>,
    pub termination_reason: Option<String>,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_value(&mut self, stage: impl Into<String>, value: Value) {
        self.values.push((stage.into(), value));
    }

    pub fn value(&self, stage: &str) -> Option<&Value> {
        self.values
            .iter()
            .rev()
            .find(|(name, _)| name == stage)
            .map(|(_, value)| value)
    }

    /// The most recently produced structured value.
    pub fn latest_value(&self) -> Option<&Value> {
        self.values.last().map(|(_, value)| value)
    }

    /// All accumulated values, most recent first.
    ///
    /// This is the order gate evaluation sees, so a field produced by a
    /// later stage shadows an earlier one of the same name.
    pub fn values_latest_first(&self) -> Vec<Value> {
        self.values.iter().rev().map(|(_, v)| v.clone()).collect()
    }

    pub fn is_terminated(&self) -> bool {
        self.termination_reason.is_some()
    }
}

/// Why a stage failed, surfaced through [`PipelineOutcome::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    /// Name of the failing stage
    pub stage: String,
    pub message: String,
}

impl StageFailure {
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stage '{}' failed: {}", self.stage, self.message)
    }
}

impl std::error::Error for StageFailure {}

/// Terminal outcome of a pipeline run.
///
/// Always one of these three; callers handle all of them explicitly and
/// never see a raw error escape a run.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// All stages ran; carries the final structured value
    Completed(Value),
    /// A gate rejected the run; no later stage executed
    Rejected(Vec<String>),
    /// A stage failed fatally
    Failed(StageFailure),
}

impl PipelineOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PipelineOutcome::Completed(_))
    }

    pub fn as_completed(&self) -> Option<&Value> {
        match self {
            PipelineOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    pub fn rejection_reasons(&self) -> Option<&[String]> {
        match self {
            PipelineOutcome::Rejected(reasons) => Some(reasons),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn latest_value_tracks_insertion_order() {
        let mut ctx = PipelineContext::new();
        ctx.insert_value("extract", json!({"confidence": 0.9}));
        ctx.insert_value("details", json!({"name": "standup"}));

        assert_eq!(ctx.latest_value(), Some(&json!({"name": "standup"})));
        assert_eq!(ctx.value("extract"), Some(&json!({"confidence": 0.9})));
        assert!(ctx.value("missing").is_none());
    }

    #[test]
    fn values_latest_first_reverses() {
        let mut ctx = PipelineContext::new();
        ctx.insert_value("a", json!(1));
        ctx.insert_value("b", json!(2));
        assert_eq!(ctx.values_latest_first(), vec![json!(2), json!(1)]);
    }

    #[test]
    fn outcome_accessors() {
        let completed = PipelineOutcome::Completed(json!({"ok": true}));
        assert!(completed.is_completed());
        assert!(completed.rejection_reasons().is_none());

        let rejected = PipelineOutcome::Rejected(vec!["is_calendar_event is false".to_string()]);
        assert!(!rejected.is_completed());
        assert_eq!(rejected.rejection_reasons().map(|r| r.len()), Some(1));
    }
}
