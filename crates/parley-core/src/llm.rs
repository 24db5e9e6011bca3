//! ChatGenerator trait definition.
//!
//! Abstraction over the generation backend. Uses RPITIT for `complete`
//! and `Pin<Box<dyn Stream>>` for `stream`, so the streaming method stays
//! object-safe and the returned sequence can be moved into response
//! bodies and socket loops.
//!
//! Implementations live in parley-infra (e.g., `OllamaGateway`).

use std::pin::Pin;

use futures_util::Stream;

use parley_types::chat::ChatMessage;
use parley_types::error::GenerationError;

/// A finite, ordered sequence of reply tokens.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, GenerationError>> + Send + 'static>>;

/// Backend that turns a prompt plus prior history into a reply.
pub trait ChatGenerator: Send + Sync {
    /// Produce the whole reply in one blocking round trip.
    ///
    /// Single-shot calls are idempotent, so implementations retry up to a
    /// fixed budget before failing with
    /// [`GenerationError::Unavailable`].
    fn complete(
        &self,
        prompt: &str,
        history: &[ChatMessage],
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send;

    /// Produce the reply token by token over one long-lived connection.
    ///
    /// No retry: partially delivered tokens cannot be un-sent, so a
    /// mid-stream failure surfaces as an error item instead of a
    /// restarted sequence. Dropping the stream stops backend reads.
    fn stream(&self, prompt: &str, history: &[ChatMessage]) -> TokenStream;
}
