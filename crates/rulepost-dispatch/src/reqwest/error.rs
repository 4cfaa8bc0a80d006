//! Error types for the reqwest transport.

use thiserror::Error;

/// Result type alias for reqwest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Invalid transport configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<Error> for crate::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    crate::Error::transport()
                        .with_message("request timed out")
                        .with_source(e)
                } else if e.is_connect() {
                    crate::Error::transport()
                        .with_message("connection failed")
                        .with_source(e)
                } else if e.is_redirect() {
                    crate::Error::transport()
                        .with_message("too many redirects")
                        .with_source(e)
                } else if e.is_builder() {
                    crate::Error::configuration()
                        .with_message(e.to_string())
                        .with_source(e)
                } else {
                    crate::Error::transport()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Config(message) => crate::Error::configuration().with_message(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_config_error_conversion() {
        let error = crate::Error::from(Error::Config("timeout cannot be zero".into()));
        assert_eq!(error.kind, ErrorKind::Configuration);
        assert_eq!(error.message.as_deref(), Some("timeout cannot be zero"));
    }
}
