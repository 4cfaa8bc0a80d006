//! Per-call request configuration and its validation.
//!
//! [`RequestConfig`] is what a host resolves from the action's bindings. It
//! is loose by nature: sequences that may be empty, strings that may be
//! blank. [`RequestConfig::resolve`] turns it into a [`ResolvedConfig`] with
//! every default applied, or fails with a configuration error before any
//! network activity happens.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::transport::{BasicAuth, HttpMethod};
use crate::{Error, Result};

/// Redirects followed when the binding leaves the limit unset.
pub const DEFAULT_MAX_REDIRECTS: u32 = 3;

/// Request timeout applied when the binding leaves it unset.
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

/// Headers the dispatcher always sets itself; header lines cannot override them.
pub const RESERVED_HEADERS: [&str; 3] = ["content-type", "accept", "x-csrf-token"];

/// Inputs of a single dispatch, as bound by the host.
///
/// Field names follow the host's camelCase binding convention; the snake/flat
/// spellings used by older rule configurations are accepted as aliases.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    /// Target endpoints. Only the first one is used.
    #[serde(default)]
    pub url: Vec<String>,
    /// REST type links. Only the first one is used.
    #[serde(default, alias = "linkurl")]
    pub link_url: Vec<String>,
    #[serde(default, alias = "apiuser")]
    pub api_user: Option<String>,
    #[serde(default, alias = "apipass")]
    pub api_pass: Option<String>,
    /// Sent as `X-CSRF-Token`.
    #[serde(default, alias = "apitoken")]
    pub api_token: Option<String>,
    #[serde(default, alias = "user_id")]
    pub user_id: Option<String>,
    /// Raw `name: value` lines, one header per line.
    #[serde(default)]
    pub headers: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default, alias = "max_redirects")]
    pub max_redirects: Option<u32>,
    #[serde(default, alias = "timeout")]
    pub timeout_seconds: Option<f64>,
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("url", &self.url)
            .field("link_url", &self.link_url)
            .field("api_user", &self.api_user)
            .field("has_api_pass", &self.api_pass.is_some())
            .field("has_api_token", &self.api_token.is_some())
            .field("user_id", &self.user_id)
            .field("headers", &self.headers)
            .field("method", &self.method)
            .field("max_redirects", &self.max_redirects)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl RequestConfig {
    /// Creates a configuration with a single target and link url.
    pub fn new(url: impl Into<String>, link_url: impl Into<String>) -> Self {
        Self {
            url: vec![url.into()],
            link_url: vec![link_url.into()],
            ..Default::default()
        }
    }

    /// Sets the basic-auth credentials.
    #[must_use]
    pub fn with_credentials(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.api_user = Some(user.into());
        self.api_pass = Some(pass.into());
        self
    }

    /// Sets the session token sent as `X-CSRF-Token`.
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Sets the user id embedded into the payload.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Sets the raw header lines.
    #[must_use]
    pub fn with_headers(mut self, headers: impl Into<String>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    /// Sets the HTTP method name.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Sets the redirect limit.
    #[must_use]
    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = Some(max_redirects);
        self
    }

    /// Sets the request timeout in seconds.
    #[must_use]
    pub fn with_timeout_seconds(mut self, timeout_seconds: f64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Validates the bindings and applies defaults.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `url` or `link_url` is empty or blank,
    /// the target is not an absolute http(s) url, the method is unknown, the
    /// timeout is not a positive number of seconds, or a header line is malformed.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let target = first_non_blank(&self.url).ok_or_else(|| {
            Error::configuration().with_message("at least one target url is required")
        })?;
        let link_href = first_non_blank(&self.link_url).ok_or_else(|| {
            Error::configuration().with_message("at least one link url is required")
        })?;

        let url = Url::parse(target)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::configuration()
                .with_message(format!("unsupported url scheme '{}'", url.scheme())));
        }

        let method = match non_blank(&self.method) {
            Some(name) => HttpMethod::from_str(name).map_err(|e| {
                Error::configuration()
                    .with_message(format!("unknown http method '{name}'"))
                    .with_source(e)
            })?,
            None => HttpMethod::default(),
        };

        let timeout_secs = self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let timeout = Duration::try_from_secs_f64(timeout_secs)
            .ok()
            .filter(|timeout| !timeout.is_zero())
            .ok_or_else(|| {
                Error::configuration().with_message(format!(
                    "timeout must be a positive number of seconds, got {timeout_secs}"
                ))
            })?;

        let basic_auth = match (non_blank(&self.api_user), non_blank(&self.api_pass)) {
            (Some(user), Some(pass)) => Some(BasicAuth::new(user, pass)),
            _ => None,
        };

        let headers = match non_blank(&self.headers) {
            Some(raw) => parse_header_lines(raw)?,
            None => Vec::new(),
        };

        Ok(ResolvedConfig {
            url,
            link_href: link_href.to_owned(),
            method,
            basic_auth,
            api_token: non_blank(&self.api_token).map(str::to_owned),
            user_id: non_blank(&self.user_id).map(str::to_owned),
            headers,
            timeout,
            max_redirects: self.max_redirects.unwrap_or(DEFAULT_MAX_REDIRECTS) as usize,
        })
    }
}

/// A validated [`RequestConfig`] with defaults applied.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub url: Url,
    pub link_href: String,
    pub method: HttpMethod,
    pub basic_auth: Option<BasicAuth>,
    pub api_token: Option<String>,
    pub user_id: Option<String>,
    /// Extra headers from the header lines, reserved names removed.
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
    pub max_redirects: usize,
}

/// Parses `name: value` lines into header pairs.
///
/// Blank lines are skipped. Lines naming one of [`RESERVED_HEADERS`] are
/// dropped with a warning.
///
/// # Errors
///
/// Returns a configuration error for a line without `:`, an empty or
/// non-token header name, or a value containing control characters.
pub fn parse_header_lines(raw: &str) -> Result<Vec<(String, String)>> {
    let mut headers = Vec::new();

    for (index, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(Error::configuration()
                .with_message(format!("header line {} is missing ':'", index + 1)));
        };
        let (name, value) = (name.trim(), value.trim());

        if name.is_empty() || !name.bytes().all(is_token_byte) {
            return Err(Error::configuration()
                .with_message(format!("header line {} has an invalid name", index + 1)));
        }
        if value.bytes().any(|b| b.is_ascii_control() && b != b'\t') {
            return Err(Error::configuration()
                .with_message(format!("header '{name}' has an invalid value")));
        }

        if RESERVED_HEADERS
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(name))
        {
            tracing::warn!(
                target: crate::TRACING_TARGET,
                header = name,
                "Ignoring reserved header from header lines"
            );
            continue;
        }

        headers.push((name.to_owned(), value.to_owned()));
    }

    Ok(headers)
}

/// RFC 9110 `tchar`.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn first_non_blank(values: &[String]) -> Option<&str> {
    values
        .first()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}
