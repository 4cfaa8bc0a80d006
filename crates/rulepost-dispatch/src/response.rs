//! Successful dispatch outcome.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of a dispatch that the endpoint accepted with HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResponse {
    /// Request ID this response corresponds to.
    pub request_id: Uuid,
    /// HTTP status code from the endpoint.
    pub status_code: u16,
    /// Raw response body.
    pub body: String,
    /// Timestamp when the request was initiated.
    pub started_at: Timestamp,
    /// Timestamp when the response was received.
    pub finished_at: Timestamp,
}

impl DispatchResponse {
    /// Creates a new response finished now.
    pub fn new(request_id: Uuid, status_code: u16, body: String, started_at: Timestamp) -> Self {
        Self {
            request_id,
            status_code,
            body,
            started_at,
            finished_at: Timestamp::now(),
        }
    }

    /// Calculates the response time as a duration.
    pub fn duration(&self) -> jiff::Span {
        self.started_at.until(self.finished_at).unwrap_or_default()
    }

    /// Consumes the response and returns the raw body.
    pub fn into_body(self) -> String {
        self.body
    }
}
