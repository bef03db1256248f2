pub mod error;
pub mod llm;
pub mod prompt;
pub mod sanitize;
pub mod schema;
pub mod template;

pub use error::AutofillError;
pub use llm::OpenAiClient;
pub use schema::{AutofillRequest, ChatMessage};
pub use template::{FormTemplate, TemplateStore};

use serde_json::Value;
use std::time::Instant;

pub struct Autofiller {
    templates: TemplateStore,
    llm_client: OpenAiClient,
}

impl Autofiller {
    pub fn new(templates: TemplateStore, llm_client: OpenAiClient) -> Self {
        Self {
            templates,
            llm_client,
        }
    }

    pub fn model(&self) -> &str {
        self.llm_client.model()
    }

    /// Fill the form template from free text.
    ///
    /// Loads the template, asks the completion service for a filled copy, strips
    /// any code fence around the answer and parses it. The parsed value is returned
    /// as-is; its keys are not checked against the template.
    pub async fn autofill(&self, input_text: &str) -> Result<Value, AutofillError> {
        let template = self.templates.load().await?;
        let messages = prompt::build_autofill_messages(input_text, &template);

        let start = Instant::now();
        let raw = self.llm_client.complete(&messages).await?;
        tracing::debug!(
            model = self.llm_client.model(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Completion received"
        );

        let sanitized = sanitize::strip_code_fences(&raw);
        tracing::info!(output = %sanitized, "Autofill result from completion service");

        sanitize::parse_model_output(&sanitized)
    }
}
