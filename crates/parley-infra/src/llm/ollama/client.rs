//! OllamaGateway -- concrete [`ChatGenerator`] over the Ollama chat API.
//!
//! Single-shot completions are retried up to a configured budget with a
//! fixed inter-attempt delay; streaming connections are opened once and
//! never retried.

use tracing::warn;

use parley_core::llm::{ChatGenerator, TokenStream};
use parley_types::chat::ChatMessage;
use parley_types::error::GenerationError;

use crate::config::LlmConfig;

use super::streaming::create_ollama_stream;
use super::types::{build_messages, OllamaChatRequest, OllamaChatResponse};

/// Ollama chat backend gateway.
pub struct OllamaGateway {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OllamaGateway {
    /// Create a gateway for the configured endpoint.
    ///
    /// The HTTP client carries no global timeout: streaming responses may
    /// outlive any fixed deadline. The single-shot path applies the
    /// configured per-request timeout itself.
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn request_body(&self, prompt: &str, history: &[ChatMessage], stream: bool) -> OllamaChatRequest {
        OllamaChatRequest {
            model: self.config.model.clone(),
            messages: build_messages(history, prompt),
            stream,
        }
    }

    /// One blocking attempt. Failures come back as a description string
    /// so the retry loop can log them uniformly.
    async fn request_once(&self, body: &OllamaChatRequest) -> Result<String, String> {
        let response = self
            .client
            .post(&self.config.url)
            .timeout(self.config.timeout)
            .json(body)
            .send()
            .await
            .map_err(|err| format!("request failed: {err}"))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {status}: {error_body}"));
        }

        let decoded: OllamaChatResponse = response
            .json()
            .await
            .map_err(|err| format!("malformed response body: {err}"))?;

        Ok(decoded.content())
    }
}

impl ChatGenerator for OllamaGateway {
    async fn complete(
        &self,
        prompt: &str,
        history: &[ChatMessage],
    ) -> Result<String, GenerationError> {
        let body = self.request_body(prompt, history, false);

        let mut last_failure = String::new();
        for attempt in 1..=self.config.retries {
            match self.request_once(&body).await {
                Ok(reply) => return Ok(reply),
                Err(failure) => {
                    warn!(
                        attempt,
                        budget = self.config.retries,
                        %failure,
                        "chat completion attempt failed"
                    );
                    last_failure = failure;
                }
            }
            if attempt < self.config.retries {
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }

        Err(GenerationError::Unavailable(format!(
            "backend unavailable after {} attempts: {last_failure}",
            self.config.retries
        )))
    }

    fn stream(&self, prompt: &str, history: &[ChatMessage]) -> TokenStream {
        let body = self.request_body(prompt, history, true);
        create_ollama_stream(&self.client, &self.config.url, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use futures_util::StreamExt;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway_for(server: &MockServer) -> OllamaGateway {
        OllamaGateway::new(LlmConfig {
            url: format!("{}/api/chat", server.uri()),
            model: "gemma3:1b".to_string(),
            retries: 3,
            retry_delay: Duration::from_millis(5),
            timeout: Duration::from_secs(5),
        })
    }

    #[tokio::test]
    async fn complete_returns_reply_on_first_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "hi there"},
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = gateway_for(&server).complete("hello", &[]).await.unwrap();
        assert_eq!(reply, "hi there");
    }

    #[tokio::test]
    async fn complete_sends_history_then_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "model": "gemma3:1b",
                "stream": false,
                "messages": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"},
                    {"role": "user", "content": "how are you?"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "fine"},
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let history = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")];
        let reply = gateway_for(&server)
            .complete("how are you?", &history)
            .await
            .unwrap();
        assert_eq!(reply, "fine");
    }

    #[tokio::test]
    async fn complete_exhausts_retry_budget_then_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
            .expect(3)
            .mount(&server)
            .await;

        let err = gateway_for(&server).complete("hello", &[]).await.unwrap_err();
        let GenerationError::Unavailable(message) = err;
        assert!(message.contains("3 attempts"), "unexpected message: {message}");
    }

    #[tokio::test]
    async fn complete_recovers_after_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "recovered"},
                "done": true
            })))
            .mount(&server)
            .await;

        let reply = gateway_for(&server).complete("hello", &[]).await.unwrap();
        assert_eq!(reply, "recovered");
    }

    #[tokio::test]
    async fn complete_treats_missing_reply_field_as_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
            .expect(1)
            .mount(&server)
            .await;

        let reply = gateway_for(&server).complete("hello", &[]).await.unwrap();
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn stream_yields_tokens_until_done_record() {
        let server = MockServer::start().await;
        let body = concat!(
            r#"{"message":{"role":"assistant","content":"hi"},"done":false}"#,
            "\n",
            r#"{"message":{"role":"assistant","content":" there"},"done":false}"#,
            "\n",
            r#"{"done":true}"#,
            "\n",
        );
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"),
            )
            .mount(&server)
            .await;

        let mut stream = gateway_for(&server).stream("hello", &[]);
        let mut tokens = Vec::new();
        while let Some(item) = stream.next().await {
            tokens.push(item.unwrap());
        }
        assert_eq!(tokens, vec!["hi", " there"]);
    }

    #[tokio::test]
    async fn stream_delivers_non_ascii_tokens_intact() {
        let server = MockServer::start().await;
        let body = concat!(
            r#"{"message":{"role":"assistant","content":"café"},"done":false}"#,
            "\n",
            r#"{"message":{"role":"assistant","content":" naïve 日本語"},"done":false}"#,
            "\n",
            r#"{"done":true}"#,
            "\n",
        );
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"),
            )
            .mount(&server)
            .await;

        let mut stream = gateway_for(&server).stream("hello", &[]);
        let mut tokens = Vec::new();
        while let Some(item) = stream.next().await {
            tokens.push(item.unwrap());
        }
        assert_eq!(tokens, vec!["café", " naïve 日本語"]);
    }

    #[tokio::test]
    async fn stream_skips_undecodable_lines() {
        let server = MockServer::start().await;
        let body = concat!(
            r#"{"message":{"role":"assistant","content":"ok"},"done":false}"#,
            "\n",
            "this is not json\n",
            r#"{"message":{"role":"assistant","content":"!"},"done":false}"#,
            "\n",
            r#"{"done":true}"#,
            "\n",
        );
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"),
            )
            .mount(&server)
            .await;

        let mut stream = gateway_for(&server).stream("hello", &[]);
        let mut tokens = Vec::new();
        while let Some(item) = stream.next().await {
            tokens.push(item.unwrap());
        }
        assert_eq!(tokens, vec!["ok", "!"]);
    }

    #[tokio::test]
    async fn stream_fails_fast_on_connect_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let mut stream = gateway_for(&server).stream("hello", &[]);
        let first = stream.next().await.unwrap();
        let GenerationError::Unavailable(message) = first.unwrap_err();
        assert!(message.contains("500"), "unexpected message: {message}");
        assert!(message.contains("model not loaded"));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn stream_does_not_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let mut stream = gateway_for(&server).stream("hello", &[]);
        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
    }
}
