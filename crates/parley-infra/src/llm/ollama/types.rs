//! Wire types for the Ollama `/api/chat` protocol.

use serde::{Deserialize, Serialize};

use parley_types::chat::ChatMessage;

/// Request body for both single-shot and streaming calls.
#[derive(Debug, Serialize)]
pub(crate) struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<OllamaMessage>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct OllamaMessage {
    pub role: String,
    pub content: String,
}

/// One response record. In streaming mode each NDJSON line decodes to
/// this shape; in single-shot mode the whole body is one record.
#[derive(Debug, Deserialize)]
pub(crate) struct OllamaChatResponse {
    #[serde(default)]
    pub message: Option<OllamaReplyMessage>,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OllamaReplyMessage {
    #[serde(default)]
    pub content: String,
}

impl OllamaChatResponse {
    /// Extract the reply text, treating a missing message or content
    /// field as an empty reply rather than a decode failure.
    pub(crate) fn content(self) -> String {
        self.message.map(|m| m.content).unwrap_or_default()
    }
}

/// Build the ordered message list: history entries followed by the new
/// prompt as a trailing user turn.
pub(crate) fn build_messages(history: &[ChatMessage], prompt: &str) -> Vec<OllamaMessage> {
    let mut messages: Vec<OllamaMessage> = history
        .iter()
        .map(|m| OllamaMessage {
            role: m.role.to_string(),
            content: m.content.clone(),
        })
        .collect();
    messages.push(OllamaMessage {
        role: "user".to_string(),
        content: prompt.to_string(),
    });
    messages
}
