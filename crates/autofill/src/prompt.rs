use crate::schema::ChatMessage;
use crate::template::FormTemplate;

pub const SYSTEM_PROMPT: &str = "You are an expert in medical forms and autofill. Always respond ONLY with a valid JSON object that matches the provided form structure.";

pub fn build_user_prompt(input_text: &str, template_json: &str) -> String {
    format!(
        "Given the following text, fill out the medical intake form fields. Respond only with a valid JSON object matching the structure. Text: {}. Form: {}",
        input_text, template_json
    )
}

/// System message followed by the user message carrying the text and the template.
pub fn build_autofill_messages(input_text: &str, template: &FormTemplate) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_user_prompt(input_text, &template.to_compact_json())),
    ]
}
