//! Shared domain types for Parley.
//!
//! This crate contains the types used across the Parley chat relay:
//! messages, request/reply shapes, stream chunks, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod chat;
pub mod error;
