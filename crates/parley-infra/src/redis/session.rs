//! Redis-backed session store.
//!
//! One Redis list per identity, keyed `chat:session:{identity}`, each
//! element a JSON-serialized [`ChatMessage`]. Every append truncates the
//! list to the newest [`MAX_HISTORY`] entries in the same MULTI/EXEC
//! block, so the bound holds even under concurrent appends.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{error, warn};

use parley_core::session::SessionStore;
use parley_types::chat::ChatMessage;
use parley_types::error::StoreError;

use super::manager::{read_error, write_error};

/// Maximum retained messages per session; older entries are evicted
/// oldest-first.
pub const MAX_HISTORY: i64 = 50;

/// [`SessionStore`] backed by Redis lists.
#[derive(Clone)]
pub struct RedisSessionStore {
    con: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(con: ConnectionManager) -> Self {
        Self { con }
    }

    fn key(identity: &str) -> String {
        format!("chat:session:{identity}")
    }
}

impl SessionStore for RedisSessionStore {
    async fn append(&self, identity: &str, message: &ChatMessage) -> Result<(), StoreError> {
        let payload = serde_json::to_string(message)
            .map_err(|err| StoreError::WriteFailed(format!("message serialization: {err}")))?;
        let key = Self::key(identity);

        // RPUSH and LTRIM run in one transaction so a reader never
        // observes the list above its bound.
        let mut con = self.con.clone();
        let _: () = redis::pipe()
            .atomic()
            .rpush(&key, payload)
            .ignore()
            .ltrim(&key, -MAX_HISTORY as isize, -1)
            .ignore()
            .query_async(&mut con)
            .await
            .map_err(write_error)?;

        Ok(())
    }

    async fn load(&self, identity: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let key = Self::key(identity);
        let mut con = self.con.clone();

        let entries: Vec<String> = con.lrange(&key, 0, -1).await.map_err(read_error)?;

        let mut history = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_str::<ChatMessage>(&entry) {
                Ok(message) => history.push(message),
                Err(err) => {
                    // One bad entry poisons the whole session: drop the
                    // key so the next turn starts clean.
                    warn!(identity = %identity, %err, "corrupted session entry, resetting history");
                    if let Err(del_err) = con.del::<_, ()>(&key).await {
                        error!(identity = %identity, %del_err, "failed to delete corrupted session");
                    }
                    return Err(StoreError::CorruptedSession);
                }
            }
        }

        Ok(history)
    }
}
