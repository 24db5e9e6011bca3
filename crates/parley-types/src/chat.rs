//! Chat message and wire types for Parley.
//!
//! These types model a conversation between a caller identity and the
//! generation backend: the per-turn message, the sync request/reply pair,
//! and the transient stream chunk sent on the streaming paths.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Role of a message within a session history.
///
/// Sessions only ever contain the two conversational roles; system
/// prompting is a backend concern and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single turn in a session history. Immutable once created.
///
/// Stored as one JSON document per list entry in the session store,
/// in conversation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    /// A user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// An assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Inbound chat request: the sync/stream request body and the per-turn
/// WebSocket frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Opaque caller identity, resolved by an external collaborator.
    pub identity: String,
    /// The new user message text.
    pub message: String,
}

/// Reply to a synchronous chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub identity: String,
    pub reply: String,
}

/// One unit of a streamed reply. Transient -- relayed to the caller in
/// order, never persisted.
///
/// A stream is terminated by exactly one chunk with `is_final = true`
/// and an empty token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    pub token: String,
    #[serde(default)]
    pub is_final: bool,
}

impl StreamChunk {
    /// An intermediate token chunk.
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            is_final: false,
        }
    }

    /// The terminating marker chunk (empty token, `is_final = true`).
    pub fn final_marker() -> Self {
        Self {
            token: String::new(),
            is_final: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_roundtrip() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            let s = role.to_string();
            let parsed: MessageRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_message_role_serde() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let parsed: MessageRole = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, MessageRole::Assistant);
    }

    #[test]
    fn test_message_role_rejects_unknown() {
        assert!("moderator".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_chat_message_serialize() {
        let msg = ChatMessage::user("hello");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hello"}"#);
        let parsed: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_stream_chunk_is_final_defaults_false() {
        let parsed: StreamChunk = serde_json::from_str(r#"{"token":"hi"}"#).unwrap();
        assert_eq!(parsed, StreamChunk::token("hi"));
    }

    #[test]
    fn test_stream_chunk_final_marker() {
        let marker = StreamChunk::final_marker();
        assert!(marker.is_final);
        assert!(marker.token.is_empty());
        let json = serde_json::to_string(&marker).unwrap();
        assert_eq!(json, r#"{"token":"","is_final":true}"#);
    }
}
