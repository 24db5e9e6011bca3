//! Redis connection management and error classification.

use redis::aio::ConnectionManager;
use redis::RedisError;

use parley_types::error::StoreError;

/// Open a multiplexed connection to Redis.
///
/// The returned [`ConnectionManager`] reconnects on its own after a
/// dropped connection; clones share the underlying connection, so one
/// manager serves both the session store and the admission gate.
pub async fn connect(redis_url: &str) -> Result<ConnectionManager, StoreError> {
    let client = redis::Client::open(redis_url)
        .map_err(|err| StoreError::Unavailable(format!("invalid redis url: {err}")))?;
    ConnectionManager::new(client)
        .await
        .map_err(|err| StoreError::Unavailable(format!("redis connection failed: {err}")))
}

/// True when the failure is the server being unreachable rather than a
/// bad command or payload.
fn is_unreachable(err: &RedisError) -> bool {
    err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
}

/// Classify a Redis failure during a read.
pub(crate) fn read_error(err: RedisError) -> StoreError {
    if is_unreachable(&err) {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::ReadFailed(err.to_string())
    }
}

/// Classify a Redis failure during a write.
pub(crate) fn write_error(err: RedisError) -> StoreError {
    if is_unreachable(&err) {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::WriteFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_refused() -> RedisError {
        RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ))
    }

    fn server_response() -> RedisError {
        RedisError::from((redis::ErrorKind::ResponseError, "wrong kind of value"))
    }

    #[test]
    fn unreachable_server_maps_to_unavailable() {
        assert!(matches!(read_error(io_refused()), StoreError::Unavailable(_)));
        assert!(matches!(write_error(io_refused()), StoreError::Unavailable(_)));
    }

    #[test]
    fn command_rejection_maps_to_operation_failure() {
        assert!(matches!(read_error(server_response()), StoreError::ReadFailed(_)));
        assert!(matches!(
            write_error(server_response()),
            StoreError::WriteFailed(_)
        ));
    }
}
