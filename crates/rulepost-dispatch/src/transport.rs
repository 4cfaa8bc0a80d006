//! HTTP transport seam.
//!
//! Requests and responses are described as plain data. The dispatcher builds
//! an [`HttpRequest`], hands it to whichever [`Transport`] it was constructed
//! with, and interprets the returned [`HttpResponse`]. A transport reports
//! every HTTP status as `Ok`; only faults that prevent a response from being
//! read are errors.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use url::Url;
use uuid::Uuid;

use crate::Result;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
    Connect,
}

impl HttpMethod {
    /// Returns the canonical upper-case method name.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Username and password for HTTP basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An outbound HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Identifier used to correlate log events for this request.
    pub request_id: Uuid,
    pub method: HttpMethod,
    pub url: Url,
    /// Header pairs in the order they should be sent.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub basic_auth: Option<BasicAuth>,
    /// Upper bound for the whole round-trip.
    pub timeout: Duration,
    /// How many redirects the transport may follow.
    pub max_redirects: usize,
}

impl HttpRequest {
    /// Returns the first value of the named header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// Performs the HTTP round-trip for a dispatcher.
///
/// Implementations are injected into [`Dispatcher`](crate::Dispatcher) at
/// construction time.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request once and returns whatever response the endpoint produced.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}
