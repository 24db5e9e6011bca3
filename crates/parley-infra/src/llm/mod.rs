//! Generation backend adapters.

pub mod ollama;

pub use ollama::OllamaGateway;
