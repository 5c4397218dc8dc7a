use std::time::Duration;

use lexi_config::generation::GenerationConfig;
use serde_json::Value;

use crate::entry::EntryError;
use crate::repair::recover_json;
use crate::{GenerationRequest, TextGenerator};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Calls per item, the first one included
    pub max_attempts: u32,
    pub retry_delay: Duration,
    /// Characters of a rejected reply quoted back to the model
    pub context_chars: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            context_chars: config.context_chars,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome<T> {
    Accepted { value: T, attempts: u32 },
    Failed { attempts: u32, reason: String },
}

impl<T> GenerationOutcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GenerationOutcome::Accepted { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            GenerationOutcome::Accepted { attempts, .. } | GenerationOutcome::Failed { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn accepted(self) -> Option<T> {
        match self {
            GenerationOutcome::Accepted { value, .. } => Some(value),
            GenerationOutcome::Failed { .. } => None,
        }
    }
}

/// Call `generator` until a reply yields a JSON object that `validate` accepts.
///
/// Every rejected reply is quoted back in the next attempt's system prompt
/// together with the reason it was rejected. `subject` names the item in
/// logs and retry prompts; `fallback_fields` enables per-field recovery.
pub async fn generate_validated<T, F>(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
    policy: &RetryPolicy,
    subject: &str,
    fallback_fields: &[&str],
    validate: F,
) -> GenerationOutcome<T>
where
    F: Fn(Value) -> Result<T, EntryError>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut current = request.clone();
    let mut reason = String::from("no attempt made");

    for attempt in 1..=max_attempts {
        tracing::info!("Requesting {} (attempt {}/{})", subject, attempt, max_attempts);
        tracing::debug!("System prompt:\n{}", current.system);
        tracing::debug!("User prompt:\n{}", current.prompt);

        let mut previous: Option<String> = None;

        match generator.generate(&current).await {
            Ok(text) => {
                tracing::info!("Response received for {} ({} chars)", subject, text.len());
                tracing::debug!("Full response:\n{}", text);

                match recover_json(&text, fallback_fields) {
                    Some(recovery) => match validate(recovery.value) {
                        Ok(value) => {
                            tracing::info!(
                                "Accepted {} on attempt {} ({:?})",
                                subject,
                                attempt,
                                recovery.method
                            );
                            return GenerationOutcome::Accepted {
                                value,
                                attempts: attempt,
                            };
                        }
                        Err(e) => reason = format!("validation failed: {e}"),
                    },
                    None => reason = "no valid JSON object in response".to_string(),
                }

                previous = Some(text);
            }
            Err(e) => reason = format!("request failed: {e}"),
        }

        tracing::warn!("Attempt {} for {} rejected: {}", attempt, subject, reason);

        if attempt < max_attempts {
            if let Some(previous) = previous.filter(|p| !p.trim().is_empty()) {
                current.system = retry_system_prompt(
                    &request.system,
                    subject,
                    &previous,
                    &reason,
                    policy.context_chars,
                );
            }

            tracing::info!(
                "Waiting {:?} before retry #{}...",
                policy.retry_delay,
                attempt + 1
            );
            tokio::time::sleep(policy.retry_delay).await;
        }
    }

    tracing::error!("All {} attempts failed for {}: {}", max_attempts, subject, reason);
    GenerationOutcome::Failed {
        attempts: max_attempts,
        reason,
    }
}

/// System prompt for a retry: the original instructions plus the rejected reply
pub fn retry_system_prompt(
    base: &str,
    subject: &str,
    previous: &str,
    reason: &str,
    limit: usize,
) -> String {
    format!(
        "{base}\n\n\
         In a previous attempt to generate JSON for \"{subject}\", your response was truncated \
         or had errors ({reason}). Here is the previous response:\n\n\
         {}\n\n\
         Please provide a COMPLETE and VALID JSON response. Include all closing quotes and \
         brackets, use proper JSON formatting throughout and include ALL fields in the \
         requested structure. Do not truncate or abbreviate any part of it.",
        truncate_chars(previous.trim(), limit)
    )
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
