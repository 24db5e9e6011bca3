//! AdmissionGate trait definition.
//!
//! Request admission is independent of the store and the gateway: it is
//! consulted by the transport layer once per sync/stream request and once
//! per inbound framed message on the duplex path.

use parley_types::error::AdmissionError;

/// Fixed-window request counter keyed by caller identity.
///
/// Fails closed only on an explicit over-quota count. If the counting
/// infrastructure itself is unreachable the gate fails open: the request
/// is allowed and the failure is only logged. Implementations live in
/// parley-infra (e.g., `RedisAdmissionGate`).
pub trait AdmissionGate: Send + Sync {
    /// Count one request for `identity` and decide whether to admit it.
    fn admit(
        &self,
        identity: &str,
    ) -> impl std::future::Future<Output = Result<(), AdmissionError>> + Send;
}
