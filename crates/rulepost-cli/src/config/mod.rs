//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── dispatch: DispatchArgs   # Action bindings + HTTP transport
//! └── describe                 # Prints the action definition table
//! ```
//!
//! All dispatch inputs can be provided via CLI arguments, environment
//! variables, or a JSON bindings file. Use `--help` to see all options.
//!
//! # Example
//!
//! ```bash
//! rulepost dispatch --url "https://example.com/node?_format=hal_json" \
//!     --link-url "https://example.com/rest/type/node/article"
//!
//! # Or via environment variables
//! RULEPOST_URL="https://example.com/node" RULEPOST_LINK_URL="..." rulepost dispatch
//! ```

mod dispatch;

use std::process;

use clap::{Parser, Subcommand};
pub use dispatch::DispatchArgs;

use crate::TRACING_TARGET_STARTUP;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "rulepost")]
#[command(about = "Creates content items through a REST API, one request per run")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sends the content item and prints the response body.
    Dispatch(DispatchArgs),
    /// Prints the action's binding table as JSON.
    Describe,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its values
    /// are visible to clap's `env` fallbacks.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Logs build information and configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        if let Command::Dispatch(args) = &self.command {
            args.log();
        }
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
