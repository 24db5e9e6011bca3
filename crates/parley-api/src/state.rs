//! Application state wiring all services together.
//!
//! The chat service is generic over the store and generator ports, but
//! AppState pins it to the concrete infra implementations. The Redis
//! connection is acquired once at startup and shared (via cheap clones)
//! between the session store and the admission gate.

use std::sync::Arc;

use parley_core::chat::ChatService;
use parley_infra::config::AppConfig;
use parley_infra::llm::OllamaGateway;
use parley_infra::redis::{connect, RedisAdmissionGate, RedisSessionStore};

/// Concrete type alias for the service generics pinned to infra implementations.
pub type ConcreteChatService = ChatService<RedisSessionStore, OllamaGateway>;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub admission: Arc<RedisAdmissionGate>,
}

impl AppState {
    /// Initialize the application state: connect to Redis, wire services.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let con = connect(&config.redis_url).await?;

        let store = RedisSessionStore::new(con.clone());
        let gateway = OllamaGateway::new(config.llm.clone());
        let admission = RedisAdmissionGate::new(con, config.rate_limit.clone());

        Ok(Self {
            chat_service: Arc::new(ChatService::new(store, gateway)),
            admission: Arc::new(admission),
        })
    }
}
