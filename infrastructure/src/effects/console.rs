//! Console side-effect adapter
//!
//! Prints the stage payload to stdout. Stands in for real collaborators
//! (calendar APIs, mail providers) in demos and local runs.

use async_trait::async_trait;
use relay_application::ports::side_effect::{SideEffectError, SideEffectPort};
use serde_json::Value;

/// Side effect that renders its payload as a console notification.
pub struct ConsoleNotifier {
    effect_name: String,
    heading: String,
}

impl ConsoleNotifier {
    pub fn new(name: impl Into<String>, heading: impl Into<String>) -> Self {
        Self {
            effect_name: name.into(),
            heading: heading.into(),
        }
    }
}

#[async_trait]
impl SideEffectPort for ConsoleNotifier {
    fn name(&self) -> &str {
        &self.effect_name
    }

    async fn execute(&self, payload: &Value) -> Result<(), SideEffectError> {
        let rendered =
            serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        println!("\n=== {} ===\n{}\n", self.heading, rendered);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn notifier_reports_its_name_and_succeeds() {
        let notifier = ConsoleNotifier::new("confirmation", "Event confirmation");
        assert_eq!(notifier.name(), "confirmation");
        assert!(notifier.execute(&json!({"name": "standup"})).await.is_ok());
    }
}
