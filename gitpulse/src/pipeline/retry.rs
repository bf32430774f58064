//! Bounded generation-retry loop with recovery-prompt escalation.

use std::sync::Arc;

use crate::error::{PulseError, Result};
use crate::llm::{prompts, GenerationOptions, TextGenerator};
use crate::models::{FormattedResult, ResponseBody};
use crate::pipeline::{formatter, validator};

/// Why a single attempt did not produce an acceptable result. Termination of
/// the loop is a plain data check over this type, not exception propagation.
#[derive(Debug)]
enum AttemptFailure {
    /// The reply parsed to a structured shape the validator rejected.
    Malformed { description: String, raw: String },
    /// The generation capability itself failed.
    Provider(PulseError),
}

/// Drives up to `max_attempts` generation calls for one request. After a
/// failed attempt the recovery instruction is appended to the prompt — prior
/// prompt content is never discarded — and the decoding options stay fixed.
#[derive(Clone)]
pub struct RetryController {
    llm: Arc<dyn TextGenerator>,
    options: GenerationOptions,
    max_attempts: u32,
}

impl RetryController {
    pub fn new(llm: Arc<dyn TextGenerator>, options: GenerationOptions, max_attempts: u32) -> Self {
        Self {
            llm,
            options,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Run the attempt loop. On exhaustion the last raw response travels in
    /// the error so the caller can surface it with a rephrase suggestion; a
    /// provider failure on the final attempt propagates as-is.
    pub async fn run(&self, prompt: String, original_query: &str) -> Result<FormattedResult> {
        let mut prompt = prompt;
        let mut attempt = 1;

        loop {
            let failure = match self.attempt(&prompt).await {
                Ok(result) => return Ok(result),
                Err(failure) => failure,
            };

            if attempt == self.max_attempts {
                return Err(match failure {
                    AttemptFailure::Malformed { description, raw } => PulseError::RetryExhausted {
                        details: description,
                        raw_response: raw,
                    },
                    AttemptFailure::Provider(error) => error,
                });
            }

            let description = match &failure {
                AttemptFailure::Malformed { description, .. } => description.clone(),
                AttemptFailure::Provider(error) => error.to_string(),
            };

            tracing::debug!(attempt, error = %description, "Generation attempt failed, retrying with recovery prompt");

            prompt.push_str("\n\n");
            prompt.push_str(&prompts::recovery_prompt(&description, original_query));
            attempt += 1;
        }
    }

    async fn attempt(&self, prompt: &str) -> std::result::Result<FormattedResult, AttemptFailure> {
        let raw = self
            .llm
            .generate(prompt, &self.options)
            .await
            .map_err(AttemptFailure::Provider)?;

        let formatted = formatter::format_response(&raw);

        // List- and text-shaped replies are accepted as-is; json-shaped ones
        // must additionally satisfy the chart/analysis schema.
        if let ResponseBody::Json(value) = &formatted.body {
            let outcome = validator::validate_json_response(value);
            if !outcome.valid {
                return Err(AttemptFailure::Malformed {
                    description: outcome.errors.join("; "),
                    raw,
                });
            }
        }

        Ok(formatted)
    }
}
