//! The remote write endpoint seen by the reconciler.

use std::fmt;

use serde::Serialize;

use crate::core::EntryId;
use crate::features::sync::Mutation;

/// Server acknowledgement that a mutation was durably accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// HTTP status of the response
    pub status: u16,
}

/// A submission the server did not acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteFailure {
    /// Network error, timeout or server-side trouble. Worth retrying.
    Transient(String),
    /// The server rejected the payload. Retrying will not help.
    Permanent {
        status: Option<u16>,
        reason: String,
    },
}

impl RemoteFailure {
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient(msg) => write!(f, "transient: {msg}"),
            Self::Permanent {
                status: Some(code),
                reason,
            } => write!(f, "rejected ({code}): {reason}"),
            Self::Permanent {
                status: None,
                reason,
            } => write!(f, "rejected: {reason}"),
        }
    }
}

/// Wire body of a single submission.
#[derive(Debug, Serialize)]
pub struct SyncRequest<'a> {
    pub id: &'a EntryId,
    pub payload: &'a Mutation,
}

/// Accepts queued mutations.
///
/// Implementations must treat `id` as an idempotency key: submitting the same
/// id twice has the effect of submitting it once.
#[cfg_attr(test, mockall::automock)]
pub trait RemoteEndpoint {
    /// Submit one mutation.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteFailure`] classifying why the mutation was not acknowledged.
    fn submit(&self, id: &EntryId, payload: &Mutation) -> Result<Ack, RemoteFailure>;
}

impl<R: RemoteEndpoint + ?Sized> RemoteEndpoint for &R {
    fn submit(&self, id: &EntryId, payload: &Mutation) -> Result<Ack, RemoteFailure> {
        (**self).submit(id, payload)
    }
}

/// Classify an HTTP status code.
///
/// 408, 425 and 429 are transient, as is anything outside 2xx and 4xx;
/// every other 4xx is permanent.
///
/// # Errors
///
/// Returns the failure for any non-2xx status.
pub fn classify_status(status: u16, body: &str) -> Result<Ack, RemoteFailure> {
    match status {
        200..=299 => Ok(Ack { status }),
        408 | 425 | 429 => Err(transient(status, body)),
        400..=499 => Err(RemoteFailure::Permanent {
            status: Some(status),
            reason: if body.trim().is_empty() {
                format!("server returned {status}")
            } else {
                body.trim().to_string()
            },
        }),
        _ => Err(transient(status, body)),
    }
}

fn transient(status: u16, body: &str) -> RemoteFailure {
    RemoteFailure::Transient(format!("server returned {status}{}", body_suffix(body)))
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body.chars().take(200).collect::<String>())
    }
}
