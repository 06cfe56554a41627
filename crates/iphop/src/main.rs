//! iphop - terminal dashboard for the ip-hop DDNS service
//!
//! Main entry point for the iphop CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::Style;

mod commands;

use commands::{config, console as console_cmd, domains, metrics, providers, setup, status};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// iphop - terminal dashboard for the ip-hop DDNS service
#[derive(Parser)]
#[command(name = "iphop")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Server URL (default: from client.toml, else http://localhost:8001)
    #[arg(long, global = true, env = "IPHOP_SERVER_URL")]
    pub server: Option<String>,

    /// Username for authenticated commands (default: from client.toml)
    #[arg(short, long, global = true, env = "IPHOP_USERNAME")]
    pub username: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show server status and whether setup has been completed
    Status(status::StatusArgs),

    /// Create the first admin account
    Setup(setup::SetupArgs),

    /// Domain management
    Domains(domains::DomainsArgs),

    /// DNS provider management
    Providers(providers::ProvidersArgs),

    /// Dashboard metrics
    Metrics(metrics::MetricsArgs),

    /// Interactive dashboard console (REPL)
    Console(console_cmd::ConsoleArgs),

    /// Client configuration
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "iphop=debug,iphop_client=debug,iphop_config=debug,info"
    } else {
        "iphop=info,iphop_client=info,warn"
    };

    let file_appender = tracing_appender::rolling::daily(iphop_config::log_dir(), "iphop.log");
    let (non_blocking, log_guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "iphop=trace,iphop_client=trace,iphop_config=trace,info",
                )),
        )
        .init();

    let client_config = iphop_config::load_client_config()?;
    let server_url = cli
        .server
        .unwrap_or_else(|| client_config.server.clone());

    let ctx = commands::Context {
        server_url,
        json_output: cli.json,
        verbose: cli.verbose,
        username: cli.username,
        config: client_config,
    };

    let result = match cli.command {
        Commands::Status(args) => status::run(args, &ctx).await,
        Commands::Setup(args) => setup::run(args, &ctx).await,
        Commands::Domains(args) => domains::run(args, &ctx).await,
        Commands::Providers(args) => providers::run(args, &ctx).await,
        Commands::Metrics(args) => metrics::run(args, &ctx).await,
        Commands::Console(args) => console_cmd::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        let red = Style::new().red();
        eprintln!("{} {}", red.apply_to("Error:"), commands::describe(&e));
        // Flush the file log before exiting.
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}
