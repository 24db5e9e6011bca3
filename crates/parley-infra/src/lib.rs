//! Infrastructure layer for Parley.
//!
//! Contains implementations of the port traits defined in `parley-core`:
//! Redis session storage and admission counting, plus the Ollama
//! generation gateway. Also home to the environment-driven configuration
//! loader.

pub mod config;
pub mod llm;
pub mod redis;
