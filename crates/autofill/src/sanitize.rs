use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::error::AutofillError;

static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*```(?:json)?\s*").expect("leading fence pattern"));

static TRAILING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*```\s*$").expect("trailing fence pattern"));

/// Strip a markdown code fence wrapped around model output.
///
/// Only a fence at the very start (optionally tagged `json`, any case) and one at
/// the very end are removed. Everything in between is returned untouched.
pub fn strip_code_fences(raw: &str) -> String {
    let without_leading = LEADING_FENCE.replace(raw, "");
    TRAILING_FENCE.replace(&without_leading, "").into_owned()
}

/// Parse already-sanitized model output as JSON.
pub fn parse_model_output(sanitized: &str) -> Result<Value, AutofillError> {
    serde_json::from_str(sanitized).map_err(|e| {
        tracing::error!(error = %e, "Failed to decode JSON from completion response");
        AutofillError::ResponseFormat
    })
}
