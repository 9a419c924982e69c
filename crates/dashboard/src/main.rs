//! PulseX dashboard binary.
//!
//! Loads configuration, initializes tracing, and either serves the dashboard
//! over HTTP, exports it to a directory, or lists the token pairs.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use px_core::config::AppConfig;
use px_dashboard::{export_view, run_server, DashboardService};

/// PulseX token pair dashboard
#[derive(Parser, Debug)]
#[command(name = "px-dashboard", about = "PulseX token pair dashboard")]
struct Args {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit JSON logs instead of human-readable output.
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard over HTTP (default).
    Serve,
    /// Fetch once and write the charts and an index.html to a directory.
    Render {
        /// Output directory.
        #[arg(short, long)]
        out: PathBuf,
        /// Token pair, e.g. "PLSX / WPLS". Defaults to the first pair.
        #[arg(short, long)]
        pair: Option<String>,
    },
    /// Print the token pairs found in the worksheet.
    Pairs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(args.config)?;

    px_core::logging::init_tracing(args.json_logs);

    tracing::info!(
        source = ?config.sheet.source,
        worksheet = %config.sheet.worksheet,
        window_hours = config.analytics.window_hours,
        "starting px-dashboard"
    );

    let service = Arc::new(DashboardService::from_config(&config)?);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(service, config.dashboard.bind).await,
        Command::Render { out, pair } => {
            let view = service.view(pair.as_deref()).await?;
            for path in export_view(&view, &out).await? {
                println!("{}", path.display());
            }
            Ok(())
        }
        Command::Pairs => {
            for pair in service.pairs().await? {
                println!("{pair}");
            }
            Ok(())
        }
    }
}

/// Run the HTTP server until Ctrl-C.
async fn serve(service: Arc<DashboardService>, bind: String) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let server_cancel = cancel.clone();
    let mut server =
        tokio::spawn(async move { run_server(service, &bind, server_cancel).await });

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("received Ctrl-C, shutting down");
        }
        result = &mut server => {
            return result.context("server task panicked")?;
        }
    }

    cancel.cancel();
    server.await.context("server task panicked")?
}
