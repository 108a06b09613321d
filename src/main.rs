//! # Aviso — Reminder Dispatcher
//!
//! Scans a Google Sheet of scheduled reminders and sends the due rows over
//! WhatsApp Web, marking each one `sí` so it never goes out twice.
//!
//! Usage:
//!   aviso                # Start the HTTP gateway (same as `aviso serve`)
//!   aviso preview        # Print the rows a pass would send, then exit
//!   aviso send           # Run one dispatch pass from the terminal
//!   aviso config show    # Print the resolved configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use aviso_core::config::AvisoConfig;
use aviso_core::dates::Clock;
use aviso_engine::{Dispatcher, MISSING_DESTINATIONS_MSG};
use aviso_gateway::EnvConnector;

#[derive(Parser)]
#[command(
    name = "aviso",
    version,
    about = "📆 Aviso — due-reminder dispatch over WhatsApp Web"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP gateway (default)
    Serve,
    /// Show the rows a dispatch pass would send right now
    Preview,
    /// Run one dispatch pass and exit
    Send,
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the resolved configuration as JSON
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "debug,hyper=info,reqwest=info"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = AvisoConfig::from_env();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!("📆 Aviso v{}", env!("CARGO_PKG_VERSION"));
            aviso_gateway::start(config).await?;
        }
        Command::Preview => preview(config).await?,
        Command::Send => send(config).await?,
        Command::Config { action: ConfigAction::Show } => {
            let mut shown = config;
            if !shown.sheet.credentials_json.is_empty() {
                // Never echo the service-account document
                shown.sheet.credentials_json = "••••".into();
            }
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
    }
    Ok(())
}

/// Dry run against the sheet only; the browser never starts.
async fn preview(config: AvisoConfig) -> Result<()> {
    let clock = Clock::from_name(&config.dispatch.timezone)?;
    let dispatcher = Dispatcher::from_config(&config.dispatch);
    let connector = EnvConnector::new(config);

    let sheet = connector.open_sheet().await?;
    let today = clock.today();
    let to_send = dispatcher.preview(&sheet, today).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "today": today,
            "mode": dispatcher.mode().as_str(),
            "to_send": to_send,
        }))?
    );
    Ok(())
}

/// One dispatch pass from the terminal. The browser session is closed on
/// the way out, success or not.
async fn send(config: AvisoConfig) -> Result<()> {
    let dispatcher = Dispatcher::from_config(&config.dispatch);
    if !dispatcher.has_recipients() {
        anyhow::bail!(MISSING_DESTINATIONS_MSG);
    }

    let clock = Clock::from_name(&config.dispatch.timezone)?;
    let connector = EnvConnector::new(config);

    let channel = connector.open_channel().await?;
    let sheet = match connector.open_sheet().await {
        Ok(sheet) => sheet,
        Err(e) => {
            channel.close().await.ok();
            return Err(e.into());
        }
    };

    let report = dispatcher.run(&channel, &sheet, clock.today()).await;
    channel.close().await.ok();
    let report = report?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
