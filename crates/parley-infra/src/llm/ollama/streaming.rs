//! NDJSON token stream decoding for the Ollama chat endpoint.

use async_stream::try_stream;
use futures_util::StreamExt;
use tracing::debug;

use parley_core::llm::TokenStream;
use parley_types::error::GenerationError;

use super::types::{OllamaChatRequest, OllamaChatResponse};

/// Open a streaming chat request and decode its NDJSON body into tokens.
///
/// One long-lived connection, no retry. A non-success status at connect
/// time fails immediately; an undecodable line is skipped; a record with
/// `done: true` ends the sequence. Dropping the returned stream drops
/// the response and stops backend reads.
pub(crate) fn create_ollama_stream(
    client: &reqwest::Client,
    url: &str,
    body: OllamaChatRequest,
) -> TokenStream {
    let client = client.clone();
    let url = url.to_string();

    Box::pin(try_stream! {
        let response = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| GenerationError::Unavailable(format!("streaming request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            Err(GenerationError::Unavailable(format!(
                "HTTP {status}: {error_body}"
            )))?;
            // The `?` above always propagates; the explicit return lets
            // the borrow checker see `response` is not used after `text`.
            return;
        }

        let mut bytes = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();

        'read: while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(|err| {
                GenerationError::Unavailable(format!("stream read failed: {err}"))
            })?;
            buffer.extend_from_slice(&chunk);

            // Records can arrive split or coalesced across chunks, so
            // tokens are cut at newline boundaries from a raw byte carry
            // buffer. UTF-8 decoding happens per complete line; a chunk
            // boundary inside a multi-byte character must not mangle it.
            while let Some(raw) = next_line(&mut buffer) {
                let line = match std::str::from_utf8(&raw) {
                    Ok(text) => text.trim(),
                    Err(err) => {
                        debug!(%err, "skipping non-utf8 stream record");
                        continue;
                    }
                };
                if line.is_empty() {
                    continue;
                }

                match serde_json::from_str::<OllamaChatResponse>(line) {
                    Ok(record) if record.done => break 'read,
                    Ok(record) => {
                        let token = record.content();
                        if !token.is_empty() {
                            yield token;
                        }
                    }
                    Err(err) => {
                        debug!(%err, "skipping undecodable stream record");
                    }
                }
            }
        }
    })
}

/// Pop the next complete line (newline stripped) from the carry buffer.
fn next_line(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let newline = buffer.iter().position(|&b| b == b'\n')?;
    let mut line: Vec<u8> = buffer.drain(..=newline).collect();
    line.pop();
    Some(line)
}
