//! Reqwest-based HTTP transport.
//!
//! This module provides a reqwest-based implementation of the [`Transport`] trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use rulepost_dispatch::reqwest::{ReqwestConfig, ReqwestTransport};
//! use rulepost_dispatch::Dispatcher;
//!
//! // Create a transport with default configuration
//! let transport = ReqwestTransport::new(ReqwestConfig::default())?;
//!
//! // Inject it into a dispatcher
//! let dispatcher = Dispatcher::new(transport);
//! ```
//!
//! [`Transport`]: crate::Transport

mod client;
mod config;
mod error;

pub use client::ReqwestTransport;
pub use config::ReqwestConfig;
pub use error::{Error, Result};

/// Tracing target for reqwest transport operations.
pub const TRACING_TARGET: &str = "rulepost_dispatch::reqwest";
