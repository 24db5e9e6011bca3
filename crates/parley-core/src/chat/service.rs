//! Chat turn orchestration over the store and generation ports.

use std::pin::Pin;

use async_stream::stream;
use futures_util::{Stream, StreamExt};
use tracing::{debug, error};

use parley_types::chat::{ChatMessage, ChatReply, ChatRequest, StreamChunk};
use parley_types::error::ChatError;

use crate::chat::STREAMED_REPLY_PLACEHOLDER;
use crate::llm::ChatGenerator;
use crate::session::SessionStore;

/// Chunk stream handed to the transport layer.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, ChatError>> + Send + 'static>>;

/// Orchestrates a chat turn: persist the user message, gather history,
/// invoke the generator, persist the outcome.
///
/// Generic over the store and generator ports so tests can substitute
/// in-memory fakes. The transport layer pins concrete types via a
/// type alias in its state module.
#[derive(Clone)]
pub struct ChatService<S, G> {
    store: S,
    generator: G,
}

impl<S, G> ChatService<S, G>
where
    S: SessionStore + Clone + Send + 'static,
    G: ChatGenerator,
{
    pub fn new(store: S, generator: G) -> Self {
        Self { store, generator }
    }

    /// Synchronous turn: the full reply is produced, persisted, and
    /// returned in one piece.
    ///
    /// The user message is persisted before generation is attempted, so
    /// a failed turn still leaves the question in the history. Store and
    /// generator errors propagate unmodified; the transport boundary owns
    /// the caller-visible mapping.
    pub async fn handle_message(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let user_turn = ChatMessage::user(&request.message);
        self.store.append(&request.identity, &user_turn).await?;

        let history = self.store.load(&request.identity).await?;
        debug!(
            identity = %request.identity,
            history_len = history.len(),
            "dispatching sync chat turn"
        );

        let reply = self.generator.complete(&request.message, &history).await?;

        self.store
            .append(&request.identity, &ChatMessage::assistant(&reply))
            .await?;

        Ok(ChatReply {
            identity: request.identity.clone(),
            reply,
        })
    }

    /// Streaming turn: tokens are relayed as they arrive.
    ///
    /// The user message append and the history load happen eagerly, so
    /// store failures surface as an `Err` return before any chunk is
    /// produced. Once the stream is handed out, a generation failure
    /// arrives as an error item and terminates the sequence; on clean
    /// completion a placeholder assistant turn is persisted and a final
    /// marker chunk is emitted.
    pub async fn stream_message(&self, request: &ChatRequest) -> Result<ChunkStream, ChatError> {
        let user_turn = ChatMessage::user(&request.message);
        self.store.append(&request.identity, &user_turn).await?;

        let history = self.store.load(&request.identity).await?;
        debug!(
            identity = %request.identity,
            history_len = history.len(),
            "dispatching streaming chat turn"
        );

        let mut tokens = self.generator.stream(&request.message, &history);
        let store = self.store.clone();
        let identity = request.identity.clone();

        let chunks = stream! {
            let mut failed = false;
            while let Some(item) = tokens.next().await {
                match item {
                    Ok(token) => yield Ok(StreamChunk::token(token)),
                    Err(err) => {
                        failed = true;
                        yield Err(ChatError::from(err));
                        break;
                    }
                }
            }
            if !failed {
                let placeholder = ChatMessage::assistant(STREAMED_REPLY_PLACEHOLDER);
                if let Err(err) = store.append(&identity, &placeholder).await {
                    error!(identity = %identity, %err, "failed to persist streamed assistant turn");
                    yield Err(ChatError::from(err));
                } else {
                    yield Ok(StreamChunk::final_marker());
                }
            }
        };

        Ok(Box::pin(chunks))
    }
}
