//! install-couchbase-server - provision a single Couchbase Server node
//!
//! Parses the command line, loads configuration and drives the provisioning
//! pipeline in the ops crate while rendering its events.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::Cli;
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use cbnode_config::Config;
use cbnode_events::{AppEvent, EventEmitter, EventReceiver, GeneralEvent};
use cbnode_net::{NetClient, NetConfig};
use cbnode_ops::{OpsContextBuilder, OpsCtx, RequestArgs};
use cbnode_types::ProvisionReport;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::path::Path;
use std::process;
use std::time::Duration;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = parse_args();

    let config = match load_config(&cli).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    init_tracing(cli.json, cli.debug, &config.paths.log_dir);

    if let Err(e) = run(&cli, config).await {
        error!("Provisioning failed: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Parse arguments; usage errors exit 1, `--help` exits 0
fn parse_args() -> Cli {
    if cli::wants_help(std::env::args_os()) {
        let mut command = Cli::command();
        if command.print_help().is_err() {
            process::exit(1);
        }
        println!();
        process::exit(0);
    }

    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp => 0,
                _ => 1,
            };
            // help goes to stdout, everything else to stderr
            let _ = e.print();
            process::exit(code);
        }
    }
}

/// Load configuration: file (or defaults), then environment
async fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load_or_default(cli.config.as_deref())
        .await
        .map_err(CliError::Config)?;
    config.merge_env().map_err(CliError::Config)?;
    config.validate().map_err(CliError::Config)?;
    Ok(config)
}

/// Main application logic
async fn run(cli: &Cli, config: Config) -> Result<(), CliError> {
    info!("Starting install-couchbase-server v{}", env!("CARGO_PKG_VERSION"));

    let (event_sender, event_receiver) = cbnode_events::channel();
    let source = cli
        .config
        .clone()
        .unwrap_or_else(Config::default_path)
        .display()
        .to_string();
    event_sender.emit(AppEvent::General(GeneralEvent::ConfigurationLoaded { source }));

    let net = NetClient::new(&NetConfig {
        timeout: Duration::from_secs(config.download.timeout_secs),
        connect_timeout: Duration::from_secs(config.download.connect_timeout_secs),
        ..NetConfig::default()
    })?;

    let ops_ctx = OpsContextBuilder::new()
        .with_config(config)
        .with_net(net)
        .with_event_sender(event_sender)
        .build()?;

    let colors_enabled = console::Term::stderr().features().colors_supported();
    let mut event_handler = EventHandler::new(colors_enabled, cli.debug, cli.json);
    let renderer = OutputRenderer::new(
        cli.json,
        console::Term::stdout().features().colors_supported(),
    );

    let report = provision_with_events(
        &ops_ctx,
        &cli.request_args(),
        event_receiver,
        &mut event_handler,
    )
    .await?;

    renderer.render_report(&report)?;

    info!("Provisioning completed successfully");
    Ok(())
}

/// Run the pipeline while rendering its events as they arrive
async fn provision_with_events(
    ctx: &OpsCtx,
    args: &RequestArgs,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<ProvisionReport, CliError> {
    let mut provision_future = Box::pin(cbnode_ops::provision(ctx, args));

    loop {
        select! {
            result = &mut provision_future => {
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result.map_err(CliError::Ops);
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool, log_dir: &Path) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let filter = |default: &str| {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
    };

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_file = log_dir.join(format!(
            "install-couchbase-server-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::create_dir_all(log_dir).and_then(|()| std::fs::File::create(&log_file)) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(filter(
                        "info,cbnode=debug,cbnode_ops=debug,cbnode_platform=debug",
                    ))
                    .init();
                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_env_filter(filter("info,cbnode=debug,cbnode_ops=debug"))
                    .init();
            }
        }
    } else if json_mode {
        // stdout carries the report; keep stderr quiet too
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter("warn"))
            .init();
    }
}
