use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

use autofill::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

pub const TEMPLATE_FILE_NAME: &str = "sample.json";

/// `sample.json` two directories above the running binary's directory, so
/// `target/<profile>/api` finds the template shipped at the workspace root.
/// Falls back to the working directory when the executable path is unknown.
pub fn default_template_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::parent)
        .and_then(Path::parent)
        .and_then(Path::parent)
        .map(|root| root.join(TEMPLATE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(TEMPLATE_FILE_NAME))
}

/// Process configuration, read once at startup and handed to the router.
#[derive(Clone, Serialize)]
pub struct AppConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub template_path: PathBuf,
    pub bind_addr: String,
    pub log_json: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let Some(api_key) = var("OPEN_API_KEY") else {
            anyhow::bail!(
                "OPEN_API_KEY environment variable not set. Please create a .env file and add it."
            );
        };

        Ok(Self {
            api_key,
            model: var("AUTOFILL_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            template_path: var("AUTOFILL_TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_template_path),
            bind_addr: var("AUTOFILL_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            log_json: var("AUTOFILL_LOG_JSON").is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("template_path", &self.template_path)
            .field("bind_addr", &self.bind_addr)
            .field("log_json", &self.log_json)
            .finish()
    }
}
