//! Request dispatcher.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use jiff::Timestamp;
use uuid::Uuid;

use crate::config::{RequestConfig, ResolvedConfig};
use crate::logger::{DEFAULT_CHANNEL, DispatchLogger, TracingLogger};
use crate::payload::PayloadDocument;
use crate::transport::{HttpRequest, Transport};
use crate::{DispatchResponse, DispatchResult, Error, Result, TRACING_TARGET};

/// Media type of both the payload and the expected response.
pub const HAL_JSON: &str = "application/hal+json";

/// The only status treated as success.
pub const SUCCESS_STATUS: u16 = 200;

/// Builds the content payload for a request config and sends it once.
///
/// The transport is injected at construction and shared behind an `Arc`, so
/// the dispatcher is cheap to clone and holds no per-call state.
///
/// # Examples
///
/// ```rust,ignore
/// use rulepost_dispatch::reqwest::{ReqwestConfig, ReqwestTransport};
/// use rulepost_dispatch::{Dispatcher, RequestConfig};
///
/// let transport = ReqwestTransport::new(ReqwestConfig::default())?;
/// let dispatcher = Dispatcher::new(transport);
///
/// let config = RequestConfig::new(
///     "https://example.com/node?_format=hal_json",
///     "https://example.com/rest/type/node/article",
/// )
/// .with_credentials("editor", "secret");
///
/// let body = dispatcher.dispatch(&config).await?.into_body();
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    logger: Arc<dyn DispatchLogger>,
    channel: String,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher over the given transport, logging through `tracing`.
    pub fn new<T>(transport: T) -> Self
    where
        T: Transport + 'static,
    {
        Self {
            transport: Arc::new(transport),
            logger: Arc::new(TracingLogger),
            channel: DEFAULT_CHANNEL.to_owned(),
        }
    }

    /// Replaces the failure logger.
    #[must_use]
    pub fn with_logger<L>(mut self, logger: L) -> Self
    where
        L: DispatchLogger + 'static,
    {
        self.logger = Arc::new(logger);
        self
    }

    /// Sets the channel failures are logged on.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Returns the channel failures are logged on.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Dispatches one request for the given config.
    ///
    /// # Errors
    ///
    /// - configuration errors, returned before the transport is touched and
    ///   not logged;
    /// - transport errors and unexpected statuses, each logged exactly once on
    ///   the dispatcher's channel before being returned.
    pub async fn dispatch(&self, config: &RequestConfig) -> DispatchResult {
        let resolved = config.resolve().inspect_err(|error| {
            tracing::debug!(
                target: TRACING_TARGET,
                error = %error,
                "Rejected dispatch configuration"
            );
        })?;
        let request = build_request(&resolved)?;

        let started_at = Timestamp::now();
        let started = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            request_id = %request.request_id,
            method = %request.method,
            url = %request.url,
            has_auth = request.basic_auth.is_some(),
            timeout_ms = request.timeout.as_millis(),
            max_redirects = request.max_redirects,
            "Dispatching request"
        );

        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(error) => return Err(self.report(&request, error, started)),
        };

        if response.status != SUCCESS_STATUS {
            let error = Error::unexpected_status(response.status, response.body);
            return Err(self.report(&request, error, started));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            request_id = %request.request_id,
            status_code = response.status,
            body_len = response.body.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Dispatch completed"
        );

        Ok(DispatchResponse::new(
            request.request_id,
            response.status,
            response.body,
            started_at,
        ))
    }

    /// Hands a failure to the logger and returns it.
    fn report(&self, request: &HttpRequest, error: Error, started: Instant) -> Error {
        tracing::debug!(
            target: TRACING_TARGET,
            request_id = %request.request_id,
            elapsed_ms = started.elapsed().as_millis(),
            "Dispatch attempt finished without success"
        );

        self.logger.log(&self.channel, &error);
        error
    }
}

/// Assembles the HTTP request for a resolved config.
///
/// The fixed hal+json headers come first, then `X-CSRF-Token` when a token is
/// set, then the extra header lines.
///
/// # Errors
///
/// Returns a serialization error if the payload cannot be encoded.
pub fn build_request(resolved: &ResolvedConfig) -> Result<HttpRequest> {
    let payload = PayloadDocument::new(&resolved.link_href, resolved.user_id.as_deref());

    let mut headers = vec![
        ("Content-Type".to_owned(), HAL_JSON.to_owned()),
        ("Accept".to_owned(), HAL_JSON.to_owned()),
    ];
    if let Some(token) = &resolved.api_token {
        headers.push(("X-CSRF-Token".to_owned(), token.clone()));
    }
    headers.extend(resolved.headers.iter().cloned());

    Ok(HttpRequest {
        request_id: Uuid::now_v7(),
        method: resolved.method,
        url: resolved.url.clone(),
        headers,
        body: payload.to_bytes()?,
        basic_auth: resolved.basic_auth.clone(),
        timeout: resolved.timeout,
        max_redirects: resolved.max_redirects,
    })
}
