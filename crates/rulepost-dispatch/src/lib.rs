#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod dispatcher;
mod error;
mod logger;
mod response;

pub mod config;
pub mod definition;
pub mod payload;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod reqwest;

pub use config::{RequestConfig, ResolvedConfig};
pub use definition::ActionDefinition;
pub use dispatcher::{Dispatcher, HAL_JSON, SUCCESS_STATUS, build_request};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use logger::{DEFAULT_CHANNEL, DispatchLogger, TracingLogger};
pub use payload::PayloadDocument;
pub use response::DispatchResponse;
pub use transport::{BasicAuth, HttpMethod, HttpRequest, HttpResponse, Transport};

/// Tracing target for dispatch operations.
pub const TRACING_TARGET: &str = "rulepost_dispatch::dispatcher";

/// Outcome of a single dispatch.
pub type DispatchResult = Result<DispatchResponse>;
