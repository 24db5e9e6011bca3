//! Redis-backed fixed-window admission gate.
//!
//! One counter per identity, keyed `rate:limit:{identity}`, incremented
//! on every request. The first increment of a window arms a TTL equal to
//! the window length, so the counter (and the window) expires on its
//! own. Counting failures fail open.

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError};
use tracing::warn;

use parley_core::admission::AdmissionGate;
use parley_types::error::AdmissionError;

use crate::config::RateLimitConfig;

/// Bucket used when the request carries no identity.
pub const ANONYMOUS_BUCKET: &str = "anonymous";

/// [`AdmissionGate`] backed by Redis counters.
#[derive(Clone)]
pub struct RedisAdmissionGate {
    con: ConnectionManager,
    config: RateLimitConfig,
}

impl RedisAdmissionGate {
    pub fn new(con: ConnectionManager, config: RateLimitConfig) -> Self {
        Self { con, config }
    }

    fn key(bucket: &str) -> String {
        format!("rate:limit:{bucket}")
    }

    /// Increment the window counter, arming its expiry on first use.
    ///
    /// INCR and EXPIRE are separate commands: if the EXPIRE after a
    /// first increment fails, the key is left without a TTL and that
    /// bucket's window never resets until the key is deleted.
    async fn bump(&self, bucket: &str) -> Result<i64, RedisError> {
        let key = Self::key(bucket);
        let mut con = self.con.clone();

        let count: i64 = con.incr(&key, 1).await?;
        if count == 1 {
            let _: () = con.expire(&key, self.config.period.as_secs() as i64).await?;
        }
        Ok(count)
    }
}

impl AdmissionGate for RedisAdmissionGate {
    async fn admit(&self, identity: &str) -> Result<(), AdmissionError> {
        let bucket = bucket_for(identity);
        let outcome = self.bump(bucket).await;
        decide(bucket, outcome, self.config.max_requests)
    }
}

/// Requests without an identity share one bucket.
fn bucket_for(identity: &str) -> &str {
    if identity.is_empty() {
        ANONYMOUS_BUCKET
    } else {
        identity
    }
}

/// Turn a counter outcome into an admission decision.
///
/// A count over the ceiling rejects; a counting failure admits, because
/// the gate protects the backend from load, not from a Redis outage.
fn decide(
    bucket: &str,
    outcome: Result<i64, RedisError>,
    ceiling: i64,
) -> Result<(), AdmissionError> {
    match outcome {
        Ok(count) if count > ceiling => Err(AdmissionError::RateExceeded),
        Ok(_) => Ok(()),
        Err(err) => {
            warn!(bucket = %bucket, %err, "admission counter unavailable, admitting request");
            Ok(())
        }
    }
}
