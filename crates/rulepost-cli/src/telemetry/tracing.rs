//! Tracing subscriber for the `rulepost` binary.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset or empty.
const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber.
///
/// Log lines go to stderr so that stdout holds nothing but the response body
/// (or the `describe` JSON), which keeps `rulepost dispatch ... > out.json`
/// usable. Dispatch failures surface here through the library's
/// `rulepost_dispatch::dispatcher` target; `RUST_LOG=rulepost_dispatch=debug`
/// adds the per-request events.
///
/// # Errors
///
/// Returns an error if `RUST_LOG` cannot be parsed or a global subscriber is
/// already installed.
pub(super) fn init_tracing() -> anyhow::Result<()> {
    let filter = env_filter()?;
    let ansi = std::io::IsTerminal::is_terminal(&std::io::stderr());

    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(ansi);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
}

/// Reads `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
fn env_filter() -> anyhow::Result<EnvFilter> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .map_err(|e| anyhow::anyhow!("Invalid {}: {e}", EnvFilter::DEFAULT_ENV)),
        _ => Ok(EnvFilter::new(DEFAULT_FILTER)),
    }
}
