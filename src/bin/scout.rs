//! CLI binary for scout.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use scout::batch::{self, OutputFormat};
use scout::{ScoutConfig, ScoutServer, ScrapeOverrides};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scout: find developers located in a region through the GitHub user search.
#[derive(Parser)]
#[command(name = "scout", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run one scrape and write the records.
    Run(RunArgs),

    /// Serve scrapes and cached runs over HTTP.
    Serve(ServeArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Search term; repeat for several. Defaults to the configured terms.
    #[arg(short, long = "term", value_name = "TERM")]
    terms: Vec<String>,

    /// Output file. Defaults to stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Output encoding.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    #[command(flatten)]
    overrides: ScrapeOverrides,
}

#[derive(Args)]
struct ServeArgs {
    /// Interface to bind. Overrides `[server].host`.
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to bind. Overrides `[server].port`.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `scout run` output can be piped.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scout=info,scout_search=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ScoutConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Run(args) => run(config, args).await,
        Command::Serve(args) => serve(config, args).await,
    }
}

async fn run(config: ScoutConfig, args: RunArgs) -> anyhow::Result<()> {
    let mut scrape = args.overrides.apply(&config.scrape);
    if !args.terms.is_empty() {
        scrape.terms = args.terms;
    }

    let result = batch::run_batch(&scrape).await?;
    let rendered = batch::render(&result, args.format)?;
    batch::write_output(&rendered, args.out.as_deref())?;
    Ok(())
}

async fn serve(mut config: ScoutConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host.to_string();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let server = ScoutServer::start(&config).await?;
    println!("scout v{} listening on http://{}", env!("CARGO_PKG_VERSION"), server.addr());

    tokio::signal::ctrl_c().await?;
    info!("received Ctrl+C, shutting down...");
    server.shutdown();
    Ok(())
}
