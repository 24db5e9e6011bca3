//! Chat orchestration.

pub mod service;

pub use service::ChatService;

/// Stand-in persisted as the assistant turn on streaming paths, where the
/// full reply text is never assembled server-side.
pub const STREAMED_REPLY_PLACEHOLDER: &str = "[streamed response]";
