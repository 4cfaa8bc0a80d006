//! Reqwest-based HTTP transport.

use std::sync::Arc;

use reqwest::{Client, Method, redirect};

use super::{Error, ReqwestConfig, TRACING_TARGET};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// Inner transport that holds the HTTP client and configuration.
struct ReqwestTransportInner {
    http: Client,
    config: ReqwestConfig,
}

/// Reqwest-based transport for sending dispatch requests to external endpoints.
///
/// The shared client is built once with the configured redirect limit. A
/// request asking for a different limit gets a dedicated client for that call,
/// since reqwest fixes the redirect policy per client.
///
/// # Examples
///
/// ```rust,ignore
/// use rulepost_dispatch::reqwest::{ReqwestConfig, ReqwestTransport};
///
/// let transport = ReqwestTransport::new(ReqwestConfig::default().with_timeout(10))?;
/// ```
#[derive(Clone)]
pub struct ReqwestTransport {
    inner: Arc<ReqwestTransportInner>,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Creates a new transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: ReqwestConfig) -> super::Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET,
            timeout_ms = config.timeout().as_millis(),
            max_redirects = config.max_redirects,
            "Creating reqwest transport"
        );

        config.validate()?;
        let http = build_client(&config, config.max_redirects)?;

        let inner = ReqwestTransportInner { http, config };
        let transport = Self {
            inner: Arc::new(inner),
        };

        tracing::info!(
            target: TRACING_TARGET,
            "Reqwest transport created successfully"
        );

        Ok(transport)
    }

    /// Creates a new transport with default configuration.
    pub fn with_defaults() -> super::Result<Self> {
        Self::new(ReqwestConfig::default())
    }

    /// Gets the transport configuration.
    pub fn config(&self) -> &ReqwestConfig {
        &self.inner.config
    }

    /// Returns a client that follows at most `max_redirects` redirects.
    fn client_for(&self, max_redirects: usize) -> super::Result<Client> {
        if max_redirects == self.inner.config.max_redirects {
            return Ok(self.inner.http.clone());
        }

        tracing::trace!(
            target: TRACING_TARGET,
            max_redirects,
            "Building client for non-default redirect limit"
        );
        build_client(&self.inner.config, max_redirects)
    }
}

fn build_client(config: &ReqwestConfig, max_redirects: usize) -> super::Result<Client> {
    let policy = match max_redirects {
        0 => redirect::Policy::none(),
        n => redirect::Policy::limited(n),
    };

    let client = Client::builder()
        .timeout(config.timeout())
        .user_agent(config.effective_user_agent())
        .redirect(policy)
        .build()?;

    Ok(client)
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Trace => Method::TRACE,
        HttpMethod::Connect => Method::CONNECT,
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> crate::Result<HttpResponse> {
        let client = self.client_for(request.max_redirects)?;

        let mut http_request = client
            .request(to_reqwest_method(request.method), request.url.clone())
            .timeout(request.timeout);

        for (name, value) in &request.headers {
            http_request = http_request.header(name.as_str(), value.as_str());
        }

        if let Some(auth) = &request.basic_auth {
            http_request = http_request.basic_auth(&auth.username, Some(&auth.password));
        }

        let http_response = http_request
            .body(request.body.clone())
            .send()
            .await
            .map_err(Error::from)?;

        let status = http_response.status().as_u16();
        let headers = http_response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = http_response.text().await.map_err(Error::from)?;

        tracing::trace!(
            target: TRACING_TARGET,
            request_id = %request.request_id,
            status,
            body_len = body.len(),
            "Response received"
        );

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
