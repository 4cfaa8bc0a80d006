#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use std::process;

use anyhow::Context;
use rulepost_dispatch::reqwest::ReqwestTransport;
use rulepost_dispatch::{ActionDefinition, Dispatcher};

use crate::config::{Cli, Command, DispatchArgs};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "rulepost_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "rulepost_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "rulepost_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing()?;
    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting rulepost"
    );
    cli.log();

    match cli.command {
        Command::Dispatch(args) => dispatch(args).await,
        Command::Describe => describe(),
    }
}

/// Sends the content item once and prints the response body to stdout.
async fn dispatch(args: DispatchArgs) -> anyhow::Result<()> {
    let config = args.request_config()?;
    let transport =
        ReqwestTransport::new(args.http).context("failed to create HTTP transport")?;
    let dispatcher = Dispatcher::new(transport).with_channel(args.channel);

    let response = dispatcher
        .dispatch(&config)
        .await
        .context("dispatch failed")?;

    tracing::info!(
        target: TRACING_TARGET_SHUTDOWN,
        request_id = %response.request_id,
        status_code = response.status_code,
        duration = %response.duration(),
        "content item created"
    );

    println!("{}", response.into_body());
    Ok(())
}

/// Prints the action's binding table as pretty JSON.
fn describe() -> anyhow::Result<()> {
    let definition = ActionDefinition::api_post();
    let json = serde_json::to_string_pretty(&definition)
        .context("failed to serialize action definition")?;

    println!("{json}");
    Ok(())
}
