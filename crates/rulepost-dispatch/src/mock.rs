//! Mock transport and logger for testing.
//!
//! # Feature Flag
//!
//! Outside this crate's own tests the module is only available when the
//! `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! rulepost-dispatch = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use rulepost_dispatch::mock::{MockTransport, RecordingLogger};
//! use rulepost_dispatch::Dispatcher;
//!
//! let transport = MockTransport::respond(200, "OK-BODY");
//! let logger = RecordingLogger::default();
//! let dispatcher = Dispatcher::new(transport.clone()).with_logger(logger.clone());
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::logger::DispatchLogger;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use crate::{Error, ErrorKind, Result};

/// What the mock transport does when asked to send.
#[derive(Debug, Clone)]
enum Script {
    Respond(HttpResponse),
    Timeout,
    ConnectionRefused,
}

#[derive(Debug)]
struct MockTransportInner {
    script: Script,
    requests: Mutex<Vec<HttpRequest>>,
}

/// Transport that answers every request from a script and records what it saw.
///
/// Clones share the same recording.
#[derive(Debug, Clone)]
pub struct MockTransport {
    inner: Arc<MockTransportInner>,
}

impl MockTransport {
    fn scripted(script: Script) -> Self {
        Self {
            inner: Arc::new(MockTransportInner {
                script,
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Answers every request with the given status and body.
    pub fn respond(status: u16, body: impl Into<String>) -> Self {
        Self::scripted(Script::Respond(HttpResponse::new(status, body)))
    }

    /// Fails every request as if the timeout elapsed.
    pub fn fail_with_timeout() -> Self {
        Self::scripted(Script::Timeout)
    }

    /// Fails every request as if the connection was refused.
    pub fn fail_with_connection_refused() -> Self {
        Self::scripted(Script::ConnectionRefused)
    }

    /// Returns the requests sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.inner.requests).clone()
    }

    /// Returns how many times `send` was called.
    pub fn call_count(&self) -> usize {
        lock(&self.inner.requests).len()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        lock(&self.inner.requests).push(request.clone());

        match &self.inner.script {
            Script::Respond(response) => Ok(response.clone()),
            Script::Timeout => Err(Error::transport().with_message(format!(
                "request timed out after {}ms",
                request.timeout.as_millis()
            ))),
            Script::ConnectionRefused => Err(Error::transport()
                .with_message("connection failed")
                .with_source(std::io::Error::from(
                    std::io::ErrorKind::ConnectionRefused,
                ))),
        }
    }
}

/// A failure seen by [`RecordingLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub channel: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Logger that keeps every entry in memory.
///
/// Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl RecordingLogger {
    /// Returns the entries logged so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        lock(&self.entries).clone()
    }
}

impl DispatchLogger for RecordingLogger {
    fn log(&self, channel: &str, error: &Error) {
        lock(&self.entries).push(LogEntry {
            channel: channel.to_owned(),
            kind: error.kind(),
            message: error.to_string(),
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dispatcher, RequestConfig};

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let transport = MockTransport::fail_with_connection_refused();
        let logger = RecordingLogger::default();
        let dispatcher = Dispatcher::new(transport.clone()).with_logger(logger.clone());

        let config = RequestConfig::new(
            "http://127.0.0.1:9/node",
            "http://127.0.0.1:9/rest/type/node/article",
        );
        let error = dispatcher.dispatch(&config).await.unwrap_err();

        assert_eq!(error.kind, ErrorKind::Transport);
        assert!(std::error::Error::source(&error).is_some());
        assert_eq!(transport.call_count(), 1);
        assert_eq!(logger.entries().len(), 1);
        assert!(logger.entries()[0].message.contains("connection failed"));
    }

    #[tokio::test]
    async fn test_clones_share_recordings() {
        let transport = MockTransport::respond(200, "");
        let clone = transport.clone();

        let config = RequestConfig::new("https://example.com/a", "https://example.com/b");
        let request = crate::build_request(&config.resolve().unwrap()).unwrap();
        clone.send(&request).await.unwrap();

        assert_eq!(transport.call_count(), 1);
        assert_eq!(transport.requests()[0].request_id, request.request_id);
    }
}
