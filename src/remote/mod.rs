pub mod client;
pub mod endpoint;

pub use client::{HttpEndpoint, HttpProbe, IDEMPOTENCY_HEADER};
pub use endpoint::{classify_status, Ack, RemoteEndpoint, RemoteFailure, SyncRequest};

#[cfg(test)]
pub use endpoint::MockRemoteEndpoint;
