//! Tool loop demo: the model calls get_weather, the result is fed back,
//! and the loop runs until a plain text answer arrives.

use anyhow::Result;
use relay_application::{ModelBackend, ModelInvoker, ToolDispatcher};
use relay_application::config::ExecutionParams;
use relay_domain::{Conversation, ToolDefinition, ToolError};
use relay_infrastructure::ToolRegistry;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are a helpful weather assistant.";

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct WeatherArgs {
    /// Latitude in decimal degrees
    latitude: f64,
    /// Longitude in decimal degrees
    longitude: f64,
}

/// Registry with a deterministic stand-in for a weather provider.
pub fn weather_registry() -> ToolRegistry {
    ToolRegistry::new().register(
        ToolDefinition::new(
            "get_weather",
            "Get current temperature and wind speed for the given coordinates",
        )
        .with_parameters_of::<WeatherArgs>(),
        |call| async move {
            let latitude = call
                .get_f64("latitude")
                .ok_or_else(|| ToolError::invalid_argument("latitude is required"))?;
            let longitude = call
                .get_f64("longitude")
                .ok_or_else(|| ToolError::invalid_argument("longitude is required"))?;

            // Deterministic pseudo-forecast derived from the coordinates
            let temperature = 14.0 + (latitude / 10.0).sin() * 8.0;
            let wind_speed = 5.0 + (longitude / 10.0).cos().abs() * 10.0;
            Ok(json!({
                "temperature_celsius": (temperature * 10.0).round() / 10.0,
                "wind_speed_kmh": (wind_speed * 10.0).round() / 10.0,
                "units": {"temperature": "celsius", "wind_speed": "km/h"},
            }))
        },
    )
}

pub async fn run<B: ModelBackend>(
    invoker: Arc<ModelInvoker<B>>,
    params: &ExecutionParams,
    input: &str,
) -> Result<()> {
    let dispatcher = ToolDispatcher::new(Arc::new(weather_registry()));
    let conversation = Conversation::exchange(SYSTEM_PROMPT, input);

    let (result, _conversation) = dispatcher
        .run_to_completion(&invoker, conversation, params.tool_loop_max_iterations)
        .await?;

    match result.as_text() {
        Some(text) => println!("{}", text),
        None => println!("{}", serde_json::to_string_pretty(&result.as_structured())?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_application::ToolExecutorPort;
    use relay_domain::ToolCall;

    #[tokio::test]
    async fn canned_weather_tool_returns_a_forecast() {
        let registry = weather_registry();
        let call = ToolCall::new("call_1", "get_weather")
            .with_arg("latitude", json!(48.85))
            .with_arg("longitude", json!(2.35));

        let output = registry.execute(&call).await.expect("execute");
        assert!(output["temperature_celsius"].is_number());
        assert!(output["wind_speed_kmh"].is_number());
    }

    #[test]
    fn weather_parameters_schema_names_both_coordinates() {
        let definitions = weather_registry().definitions();
        let parameters = &definitions[0].parameters;
        assert!(parameters["properties"]["latitude"].is_object());
        assert!(parameters["properties"]["longitude"].is_object());
    }
}
