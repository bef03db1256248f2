use anyhow::Context;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::AutofillError;

/// Parsed form template. The structure is opaque; it is handed to the model as-is.
#[derive(Debug, Clone)]
pub struct FormTemplate {
    value: Value,
}

impl FormTemplate {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Compact JSON rendering used inside the prompt
    pub fn to_compact_json(&self) -> String {
        self.value.to_string()
    }
}

/// Reads the form template from a fixed path. No caching: every `load` hits the disk.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    path: PathBuf,
}

impl TemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<FormTemplate, AutofillError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::error!(path = %self.path.display(), "Form template not found");
                return Err(AutofillError::Configuration(self.path.clone()));
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to read form template {}", self.path.display()))
                    .into());
            }
        };

        let value: Value = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse form template {}", self.path.display()))?;

        Ok(FormTemplate::new(value))
    }
}
