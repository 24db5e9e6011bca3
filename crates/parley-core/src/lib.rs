//! Business logic and port trait definitions for Parley.
//!
//! This crate defines the "ports" (session store, generation gateway,
//! admission gate) that the infrastructure layer implements, plus the
//! `ChatService` orchestrator that composes them. It depends only on
//! `parley-types` -- never on `parley-infra` or any IO crate.

pub mod admission;
pub mod chat;
pub mod llm;
pub mod session;
