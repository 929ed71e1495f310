//! Run Pipeline use case
//!
//! Chains ordered stages — extract, gate, detail, side-effect — with
//! short-circuit on gate rejection. Execution is strictly sequential; a
//! rejected gate means no later stage runs at all. Every run terminates in
//! exactly one of `Completed`, `Rejected` or `Failed`; errors never escape
//! as raw results.

use crate::ports::model_backend::ModelBackend;
use crate::ports::side_effect::SideEffectPort;
use crate::use_cases::invoke_model::ModelInvoker;
use relay_domain::{
    Conversation, GatePolicy, InvocationRequest, InvocationResult, PipelineContext,
    PipelineOutcome, SchemaSpec, StageFailure, Turn,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a stage takes its input from.
#[derive(Debug, Clone)]
pub enum StageInput {
    /// The raw pipeline input text
    PipelineInput,
    /// The most recently produced structured value
    LatestValue,
    /// The value produced by a named stage
    StageValue(String),
    /// One field of a named stage's value
    Field { stage: String, field: String },
}

impl StageInput {
    pub fn field(stage: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Field {
            stage: stage.into(),
            field: field.into(),
        }
    }
}

/// One stage of a pipeline.
pub enum Stage {
    /// Structured invocation over the pipeline input
    Extract {
        name: String,
        system_prompt: String,
        schema: SchemaSpec,
    },
    /// Checkpoint over the accumulated structured values
    Gate { name: String, policy: GatePolicy },
    /// Structured invocation over a prior stage's output
    Detail {
        name: String,
        system_prompt: String,
        schema: SchemaSpec,
        input: StageInput,
    },
    /// External collaborator invocation
    SideEffect {
        effect: Arc<dyn SideEffectPort>,
        payload: StageInput,
        /// Failures of a best-effort stage are logged and skipped;
        /// otherwise they are fatal
        best_effort: bool,
    },
}

impl Stage {
    fn name(&self) -> &str {
        match self {
            Stage::Extract { name, .. } => name,
            Stage::Gate { name, .. } => name,
            Stage::Detail { name, .. } => name,
            Stage::SideEffect { effect, .. } => effect.name(),
        }
    }
}

/// Use case for running a staged pipeline.
pub struct StagedPipeline<B: ModelBackend> {
    invoker: Arc<ModelInvoker<B>>,
    stages: Vec<Stage>,
}

impl<B: ModelBackend> StagedPipeline<B> {
    pub fn builder(invoker: Arc<ModelInvoker<B>>) -> PipelineBuilder<B> {
        PipelineBuilder {
            invoker,
            stages: Vec::new(),
        }
    }

    /// Run the pipeline over one input.
    ///
    /// The context is created here, threaded through each stage in order,
    /// and discarded when the outcome is returned.
    pub async fn run(&self, input: &str) -> PipelineOutcome {
        let mut ctx = PipelineContext::new();
        info!("Pipeline run over {} stage(s)", self.stages.len());

        for stage in &self.stages {
            debug!("Stage '{}'", stage.name());

            match stage {
                Stage::Extract {
                    name,
                    system_prompt,
                    schema,
                } => {
                    if let Err(outcome) =
                        self.invoke_stage(&mut ctx, name, system_prompt, schema, input).await
                    {
                        return outcome;
                    }
                }
                Stage::Detail {
                    name,
                    system_prompt,
                    schema,
                    input: stage_input,
                } => {
                    let content = match resolve_text(stage_input, input, &ctx) {
                        Ok(content) => content,
                        Err(message) => {
                            return PipelineOutcome::Failed(StageFailure::new(name, message))
                        }
                    };
                    if let Err(outcome) =
                        self.invoke_stage(&mut ctx, name, system_prompt, schema, &content).await
                    {
                        return outcome;
                    }
                }
                Stage::Gate { name, policy } => {
                    let decision = policy.evaluate(&ctx.values_latest_first());
                    if !decision.accepted {
                        warn!("Gate '{}' rejected: {:?}", name, decision.reasons);
                        ctx.termination_reason = Some(format!("gate '{}' rejected", name));
                        return PipelineOutcome::Rejected(decision.reasons);
                    }
                    debug!("Gate '{}' passed (confidence {:.2})", name, decision.confidence);
                }
                Stage::SideEffect {
                    effect,
                    payload,
                    best_effort,
                } => {
                    let value = match resolve_value(payload, input, &ctx) {
                        Ok(value) => value,
                        Err(message) => {
                            return PipelineOutcome::Failed(StageFailure::new(effect.name(), message))
                        }
                    };

                    match effect.execute(&value).await {
                        Ok(()) => info!("Side effect '{}' completed", effect.name()),
                        Err(err) if *best_effort => {
                            warn!("Best-effort side effect '{}' failed: {}", effect.name(), err);
                        }
                        Err(err) => {
                            return PipelineOutcome::Failed(StageFailure::new(
                                effect.name(),
                                err.to_string(),
                            ));
                        }
                    }
                }
            }
        }

        PipelineOutcome::Completed(ctx.latest_value().cloned().unwrap_or(Value::Null))
    }

    async fn invoke_stage(
        &self,
        ctx: &mut PipelineContext,
        name: &str,
        system_prompt: &str,
        schema: &SchemaSpec,
        content: &str,
    ) -> Result<(), PipelineOutcome> {
        let conversation = Conversation::exchange(system_prompt, content);
        let request = InvocationRequest::structured(conversation, schema.clone());

        match self.invoker.invoke(request).await {
            Ok(InvocationResult::Structured { value, raw_turn }) => {
                ctx.conversation.push(Turn::system(system_prompt));
                ctx.conversation.push(Turn::user(content));
                ctx.conversation.push(raw_turn);
                ctx.insert_value(name, value);
                Ok(())
            }
            Ok(_) => Err(PipelineOutcome::Failed(StageFailure::new(
                name,
                "structured invocation returned a non-structured result",
            ))),
            Err(err) => Err(PipelineOutcome::Failed(StageFailure::new(name, err.to_string()))),
        }
    }
}

/// Builder assembling the stage sequence.
pub struct PipelineBuilder<B: ModelBackend> {
    invoker: Arc<ModelInvoker<B>>,
    stages: Vec<Stage>,
}

impl<B: ModelBackend> PipelineBuilder<B> {
    pub fn extract(
        mut self,
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        schema: SchemaSpec,
    ) -> Self {
        self.stages.push(Stage::Extract {
            name: name.into(),
            system_prompt: system_prompt.into(),
            schema,
        });
        self
    }

    pub fn gate(mut self, name: impl Into<String>, policy: GatePolicy) -> Self {
        self.stages.push(Stage::Gate {
            name: name.into(),
            policy,
        });
        self
    }

    pub fn detail(
        mut self,
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        schema: SchemaSpec,
        input: StageInput,
    ) -> Self {
        self.stages.push(Stage::Detail {
            name: name.into(),
            system_prompt: system_prompt.into(),
            schema,
            input,
        });
        self
    }

    pub fn side_effect(
        mut self,
        effect: Arc<dyn SideEffectPort>,
        payload: StageInput,
        best_effort: bool,
    ) -> Self {
        self.stages.push(Stage::SideEffect {
            effect,
            payload,
            best_effort,
        });
        self
    }

    pub fn build(self) -> StagedPipeline<B> {
        StagedPipeline {
            invoker: self.invoker,
            stages: self.stages,
        }
    }
}

fn resolve_value(input: &StageInput, pipeline_input: &str, ctx: &PipelineContext) -> Result<Value, String> {
    match input {
        StageInput::PipelineInput => Ok(Value::String(pipeline_input.to_string())),
        StageInput::LatestValue => ctx
            .latest_value()
            .cloned()
            .ok_or_else(|| "no structured value produced yet".to_string()),
        StageInput::StageValue(stage) => ctx
            .value(stage)
            .cloned()
            .ok_or_else(|| format!("no value recorded for stage '{}'", stage)),
        StageInput::Field { stage, field } => ctx
            .value(stage)
            .and_then(|value| value.get(field))
            .cloned()
            .ok_or_else(|| format!("stage '{}' has no field '{}'", stage, field)),
    }
}

fn resolve_text(input: &StageInput, pipeline_input: &str, ctx: &PipelineContext) -> Result<String, String> {
    let value = resolve_value(input, pipeline_input, ctx)?;
    match value {
        Value::String(text) => Ok(text),
        other => Ok(other.to_string()),
    }
}
