//! Date context for system prompts

use chrono::Local;

/// Prefix a system prompt with today's date so relative expressions like
/// "next tuesday" resolve consistently.
pub fn with_date_context(prompt: &str) -> String {
    let today = Local::now();
    format!("Today is {}. {}", today.format("%A, %Y-%m-%d"), prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_the_date_prefix() {
        let prompt = with_date_context("Extract event details.");
        assert!(prompt.starts_with("Today is "));
        assert!(prompt.ends_with("Extract event details."));
    }
}
