//! Redis-backed adapters.
//!
//! Sessions and admission counters share one multiplexed connection
//! manager; each adapter owns a cheap clone of it.

pub mod admission;
pub mod manager;
pub mod session;

pub use admission::RedisAdmissionGate;
pub use manager::connect;
pub use session::RedisSessionStore;
