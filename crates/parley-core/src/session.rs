//! SessionStore trait definition.
//!
//! The store owns the retained per-identity message history and all
//! mutation rights to it; callers only append and read snapshots.
//! Implementations live in parley-infra (e.g., `RedisSessionStore`).

use parley_types::chat::ChatMessage;
use parley_types::error::StoreError;

/// Bounded, append-only per-identity message log.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait SessionStore: Send + Sync {
    /// Append a message to `identity`'s history, then truncate the stored
    /// history to the most recent retention bound, discarding older
    /// entries in FIFO order.
    fn append(
        &self,
        identity: &str,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Load the full retained history for `identity`, in conversation
    /// order. Empty if no history exists.
    ///
    /// A malformed stored entry deletes the whole session key and fails
    /// with [`StoreError::CorruptedSession`]; a subsequent load sees an
    /// empty history.
    fn load(
        &self,
        identity: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, StoreError>> + Send;
}
