//! Prompt-chaining demo: extraction, gate, details, confirmation.

use crate::demo::context::with_date_context;
use crate::demo::schemas::{EventConfirmation, EventDetails, EventExtraction};
use anyhow::Result;
use relay_application::{ModelBackend, ModelInvoker, StageInput, StagedPipeline};
use relay_domain::{GatePolicy, PipelineOutcome, SchemaSpec};
use relay_infrastructure::ConsoleNotifier;
use std::sync::Arc;

const EXTRACTION_PROMPT: &str =
    "Analyze if the text describes a calendar event. Set is_calendar_event and \
     a confidence_score between 0 and 1.";
const DETAILS_PROMPT: &str =
    "Extract detailed event information from the description. Use ISO 8601 for the date.";
const CONFIRMATION_PROMPT: &str =
    "Generate a natural confirmation message for the event. Sign off as Susie.";

pub fn build_pipeline<B: ModelBackend>(invoker: Arc<ModelInvoker<B>>) -> StagedPipeline<B> {
    let gate = GatePolicy::new()
        .require_true("is_calendar_event")
        .min_confidence("confidence_score", 0.7);

    StagedPipeline::builder(invoker)
        .extract(
            "extraction",
            with_date_context(EXTRACTION_PROMPT),
            SchemaSpec::of::<EventExtraction>("event_extraction"),
        )
        .gate("calendar_gate", gate)
        .detail(
            "details",
            with_date_context(DETAILS_PROMPT),
            SchemaSpec::of::<EventDetails>("event_details"),
            StageInput::field("extraction", "description"),
        )
        .detail(
            "confirmation",
            CONFIRMATION_PROMPT,
            SchemaSpec::of::<EventConfirmation>("event_confirmation"),
            StageInput::StageValue("details".to_string()),
        )
        .side_effect(
            Arc::new(ConsoleNotifier::new("notify", "Event confirmation")),
            StageInput::LatestValue,
            true,
        )
        .build()
}

pub async fn run<B: ModelBackend>(invoker: Arc<ModelInvoker<B>>, input: &str) -> Result<()> {
    let pipeline = build_pipeline(invoker);

    match pipeline.run(input).await {
        PipelineOutcome::Completed(value) => {
            let confirmation: EventConfirmation = serde_json::from_value(value)?;
            println!("{}", confirmation.confirmation_message);
            if let Some(link) = confirmation.calendar_link {
                println!("Calendar link: {}", link);
            }
        }
        PipelineOutcome::Rejected(reasons) => {
            println!("This doesn't look like a calendar request:");
            for reason in reasons {
                println!("  - {}", reason);
            }
        }
        PipelineOutcome::Failed(failure) => {
            anyhow::bail!("pipeline failed at stage '{}': {}", failure.stage, failure.message);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_gate_uses_the_shared_threshold() {
        let gate = GatePolicy::new()
            .require_true("is_calendar_event")
            .min_confidence("confidence_score", 0.7);
        let decision = gate.evaluate(&[serde_json::json!({
            "is_calendar_event": false,
            "confidence_score": 0.9,
        })]);
        assert_eq!(decision.reasons, vec!["is_calendar_event is false"]);
    }
}
