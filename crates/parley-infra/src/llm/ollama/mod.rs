//! Ollama chat backend adapter.
//!
//! Speaks the Ollama `/api/chat` protocol: one JSON request/response
//! call for single-shot completions, and a newline-delimited JSON record
//! stream for token-by-token delivery.

mod client;
mod streaming;
mod types;

pub use client::OllamaGateway;
