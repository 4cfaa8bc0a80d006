//! Bindings of a single dispatch.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use rulepost_dispatch::reqwest::ReqwestConfig;
use rulepost_dispatch::{DEFAULT_CHANNEL, RequestConfig};

use crate::TRACING_TARGET_CONFIG;

/// Inputs of the API POST action.
///
/// Values can come from a JSON bindings file, arguments, or environment
/// variables. Arguments and environment variables win over the file.
///
/// # Environment Variables
///
/// - `RULEPOST_URL`, `RULEPOST_LINK_URL` - a single url each
/// - `RULEPOST_API_USER`, `RULEPOST_API_PASS` - basic-auth credentials
/// - `RULEPOST_API_TOKEN` - sent as `X-CSRF-Token`
/// - `RULEPOST_USER_ID` - stored in the payload's user id field
/// - `RULEPOST_HEADERS` - extra `name: value` lines
/// - `RULEPOST_METHOD`, `RULEPOST_MAX_REDIRECTS`, `RULEPOST_TIMEOUT`
#[derive(Debug, Clone, Args)]
pub struct DispatchArgs {
    /// JSON file with the action bindings (camelCase field names).
    #[arg(long, env = "RULEPOST_BINDINGS")]
    pub bindings: Option<PathBuf>,

    /// Endpoint the request is sent to. Repeatable; only the first value is used.
    #[arg(long, env = "RULEPOST_URL")]
    pub url: Vec<String>,

    /// REST type link of the created item. Repeatable; only the first value is used.
    #[arg(long, env = "RULEPOST_LINK_URL")]
    pub link_url: Vec<String>,

    /// Username for basic authentication.
    #[arg(long, env = "RULEPOST_API_USER")]
    pub api_user: Option<String>,

    /// Password for basic authentication.
    #[arg(long, env = "RULEPOST_API_PASS", hide_env_values = true)]
    pub api_pass: Option<String>,

    /// Session token sent as `X-CSRF-Token`.
    #[arg(long, env = "RULEPOST_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// User id stored in the created item.
    #[arg(long, env = "RULEPOST_USER_ID")]
    pub user_id: Option<String>,

    /// Extra request headers as `name: value` lines.
    #[arg(long, env = "RULEPOST_HEADERS")]
    pub headers: Option<String>,

    /// HTTP method (default: POST).
    #[arg(short = 'X', long, env = "RULEPOST_METHOD")]
    pub method: Option<String>,

    /// How many redirects may be followed (default: 3).
    #[arg(long, env = "RULEPOST_MAX_REDIRECTS")]
    pub max_redirects: Option<u32>,

    /// Request timeout in seconds (default: 30).
    #[arg(long = "timeout", env = "RULEPOST_TIMEOUT")]
    pub timeout_seconds: Option<f64>,

    /// Channel failures are logged on.
    #[arg(long, env = "RULEPOST_LOG_CHANNEL", default_value = DEFAULT_CHANNEL)]
    pub channel: String,

    /// HTTP transport configuration.
    #[clap(flatten)]
    pub http: ReqwestConfig,
}

impl DispatchArgs {
    /// Builds the request config from the bindings file and the arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the bindings file cannot be read or parsed.
    pub fn request_config(&self) -> anyhow::Result<RequestConfig> {
        let base = match &self.bindings {
            Some(path) => load_bindings(path)?,
            None => RequestConfig::default(),
        };

        Ok(self.apply(base))
    }

    /// Overlays the argument values onto `config`.
    fn apply(&self, mut config: RequestConfig) -> RequestConfig {
        if !self.url.is_empty() {
            config.url = self.url.clone();
        }
        if !self.link_url.is_empty() {
            config.link_url = self.link_url.clone();
        }

        overlay(&mut config.api_user, &self.api_user);
        overlay(&mut config.api_pass, &self.api_pass);
        overlay(&mut config.api_token, &self.api_token);
        overlay(&mut config.user_id, &self.user_id);
        overlay(&mut config.headers, &self.headers);
        overlay(&mut config.method, &self.method);
        overlay(&mut config.max_redirects, &self.max_redirects);
        overlay(&mut config.timeout_seconds, &self.timeout_seconds);

        config
    }

    /// Logs the dispatch configuration (no credentials).
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            bindings = ?self.bindings,
            url = ?self.url.first(),
            link_url = ?self.link_url.first(),
            has_credentials = self.api_user.is_some() && self.api_pass.is_some(),
            has_token = self.api_token.is_some(),
            method = ?self.method,
            channel = %self.channel,
            http_timeout_secs = self.http.http_timeout,
            http_max_redirects = self.http.max_redirects,
            "Dispatch configuration"
        );
    }
}

fn overlay<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        target.clone_from(value);
    }
}

fn load_bindings(path: &Path) -> anyhow::Result<RequestConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bindings file {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse bindings file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use crate::config::{Cli, Command};

    fn dispatch_args(args: &[&str]) -> super::DispatchArgs {
        let argv = ["rulepost", "dispatch"].into_iter().chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Command::Dispatch(args) => args,
            Command::Describe => panic!("expected dispatch"),
        }
    }

    #[test]
    fn test_arguments_map_onto_config() {
        let args = dispatch_args(&[
            "--url",
            "https://example.com/node",
            "--url",
            "https://backup.example.com/node",
            "--link-url",
            "https://example.com/rest/type/node/article",
            "--api-user",
            "editor",
            "--api-pass",
            "secret",
            "-X",
            "put",
            "--timeout",
            "2.5",
        ]);

        let config = args.request_config().unwrap();
        assert_eq!(config.url.len(), 2);
        assert_eq!(config.api_user.as_deref(), Some("editor"));
        assert_eq!(config.method.as_deref(), Some("put"));
        assert_eq!(config.timeout_seconds, Some(2.5));
        assert!(config.max_redirects.is_none());

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.url.as_str(), "https://example.com/node");
        assert!(resolved.basic_auth.is_some());
    }

    #[test]
    fn test_comma_in_query_kept_in_url() {
        let args = dispatch_args(&[
            "--url",
            "https://example.com/node?ids=1,2",
            "--link-url",
            "https://example.com/rest/type/node/article",
        ]);

        assert_eq!(args.url, ["https://example.com/node?ids=1,2"]);
        let resolved = args.request_config().unwrap().resolve().unwrap();
        assert_eq!(resolved.url.as_str(), "https://example.com/node?ids=1,2");
    }

    #[test]
    fn test_request_and_client_redirect_limits_are_separate() {
        let args = dispatch_args(&[
            "--url",
            "https://example.com/node",
            "--link-url",
            "https://example.com/rest/type/node/article",
            "--max-redirects",
            "1",
            "--http-max-redirects",
            "5",
        ]);

        assert_eq!(args.max_redirects, Some(1));
        assert_eq!(args.http.max_redirects, 5);
        assert_eq!(args.request_config().unwrap().max_redirects, Some(1));
    }

    #[test]
    fn test_missing_urls_left_to_dispatcher() {
        let args = dispatch_args(&[]);
        assert_eq!(args.channel, rulepost_dispatch::DEFAULT_CHANNEL);
        assert_eq!(args.http.http_timeout, 30);

        let config = args.request_config().unwrap();
        assert!(config.url.is_empty());
        assert!(config.resolve().is_err());
    }

    #[test]
    fn test_bindings_file_overlaid_by_arguments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "url": ["https://example.com/node"],
                "linkUrl": ["https://example.com/rest/type/node/article"],
                "userId": "7",
                "maxRedirects": 1
            }}"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let args = dispatch_args(&["--bindings", path, "--user-id", "42"]);
        let config = args.request_config().unwrap();

        assert_eq!(config.url, vec!["https://example.com/node".to_owned()]);
        assert_eq!(config.user_id.as_deref(), Some("42"));
        assert_eq!(config.max_redirects, Some(1));
    }

    #[test]
    fn test_unreadable_bindings_file() {
        let args = dispatch_args(&["--bindings", "/nonexistent/rulepost/bindings.json"]);
        let error = args.request_config().unwrap_err();
        assert!(error.to_string().contains("failed to read bindings file"));
    }
}
