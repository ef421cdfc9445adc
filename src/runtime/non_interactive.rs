use anyhow::Result;
use serde::Serialize;
use std::time::Instant;

use crate::{
    cli::OutputFormat,
    i18n::Language,
    models::{ConversationId, Source},
    session::{LoadOutcome, SendOutcome, SessionController},
};

/// Result of a non-interactive run
#[derive(Debug, Serialize)]
pub struct NonInteractiveResult {
    /// The prompt that was sent
    pub prompt: String,
    /// The assistant's reply, or the localized error text
    pub response: String,
    pub sources: Vec<Source>,
    /// Any errors that occurred
    pub errors: Vec<String>,
    /// Metadata about the execution
    pub metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize)]
pub struct ExecutionMetadata {
    /// Conversation the exchange was recorded in
    pub conversation_id: Option<ConversationId>,
    pub language: Language,
    /// Execution time in milliseconds
    pub duration_ms: u128,
}

/// Sends a single prompt through a session controller
pub struct NonInteractiveRunner<'a> {
    controller: &'a SessionController,
}

impl<'a> NonInteractiveRunner<'a> {
    pub fn new(controller: &'a SessionController) -> Self {
        Self { controller }
    }

    /// Continue `conversation_id` instead of starting a new one
    pub async fn resume(&self, conversation_id: ConversationId) -> Result<()> {
        match self.controller.open_conversation(conversation_id.clone()).await {
            LoadOutcome::Loaded => Ok(()),
            _ => anyhow::bail!("Failed to load conversation {}", conversation_id),
        }
    }

    /// Send `prompt` and collect the outcome
    pub async fn execute(&self, prompt: String) -> NonInteractiveResult {
        let start_time = Instant::now();
        let mut errors = Vec::new();

        let (response, sources) = match self.controller.send_message(&prompt).await {
            SendOutcome::Delivered(message) => (message.content, message.sources),
            SendOutcome::Failed(message) => {
                errors.push("The assistant could not be reached".to_string());
                (message.content, Vec::new())
            }
            SendOutcome::Ignored => {
                errors.push("Empty prompt".to_string());
                (String::new(), Vec::new())
            }
            SendOutcome::Discarded => {
                errors.push("Reply discarded".to_string());
                (String::new(), Vec::new())
            }
        };

        let snapshot = self.controller.snapshot();
        NonInteractiveResult {
            prompt,
            response,
            sources,
            errors,
            metadata: ExecutionMetadata {
                conversation_id: snapshot.conversation_id,
                language: snapshot.language,
                duration_ms: start_time.elapsed().as_millis(),
            },
        }
    }

    /// Format the result according to the output format
    pub fn format_result(&self, result: &NonInteractiveResult, format: OutputFormat) -> String {
        format_result(result, format)
    }
}

fn format_result(result: &NonInteractiveResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)
            .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)),
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str(&result.response);

            let labels: Vec<&str> = result.sources.iter().filter_map(Source::label).collect();
            if !labels.is_empty() {
                output.push_str("\n\n--- Sources ---\n");
                for label in labels {
                    output.push_str(&format!("• {}\n", label));
                }
            }

            if !result.errors.is_empty() {
                output.push_str("\n--- Errors ---\n");
                for error in &result.errors {
                    output.push_str(&format!("• {}\n", error));
                }
            }

            output
        }
        OutputFormat::Markdown => {
            let mut output = String::new();

            output.push_str("## Response\n\n");
            output.push_str(&result.response);
            output.push_str("\n\n");

            let labels: Vec<&str> = result.sources.iter().filter_map(Source::label).collect();
            if !labels.is_empty() {
                output.push_str("## Sources\n\n");
                for label in labels {
                    output.push_str(&format!("- {}\n", label));
                }
                output.push('\n');
            }

            if !result.errors.is_empty() {
                output.push_str("## Errors\n\n");
                for error in &result.errors {
                    output.push_str(&format!("- {}\n", error));
                }
                output.push('\n');
            }

            output.push_str("---\n");
            output.push_str(&format!(
                "*Conversation: {} | Language: {} | Duration: {}ms*\n",
                result
                    .metadata
                    .conversation_id
                    .as_ref()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                result.metadata.language.code(),
                result.metadata.duration_ms
            ));

            output
        }
    }
}
