use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use heads_up::web::{self, table::TableConfig};
use heads_up::{Console, ConsoleConfig, HttpGameServer};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "heads-up",
    version,
    about = "Heads-up hold'em against a bot (Rust edition)",
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Table server base URL (overrides the config file)
    #[arg(long)]
    server: Option<String>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable ANSI colors in CLI output
    #[arg(long = "no-color", default_value_t = false)]
    no_color: bool,

    /// Play the whole match by calling every street (useful for smoke tests)
    #[arg(long, default_value_t = false)]
    auto: bool,

    /// Start a table server in-process and play against it
    #[arg(long, default_value_t = false)]
    local: bool,

    /// Deck seed for the in-process table (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the table server
    Serve {
        /// Address to bind (HOST:PORT)
        #[arg(long, default_value = "0.0.0.0:5000")]
        addr: String,

        /// Deck seed (random if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Rounds per match
        #[arg(long, default_value_t = 10)]
        rounds: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = color_eyre::install();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Serve { addr, seed, rounds }) => {
            let config = TableConfig {
                rounds,
                seed,
                ..TableConfig::default()
            };
            run_server(addr, config).await?
        }
        None => run_client(cli).await?,
    }

    Ok(())
}

async fn run_client(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::default(),
    };
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if cli.no_color {
        config.no_color = true;
    }

    let _local = if cli.local {
        let table = TableConfig {
            seed: cli.seed,
            ..TableConfig::default()
        };
        let (addr, handle) = web::spawn_local(table).await?;
        config.server_url = format!("http://{addr}");
        Some(handle)
    } else {
        None
    };

    let server = HttpGameServer::new(&config.server_url)?;
    let mut console = Console::new(server, config);
    if cli.auto {
        let report = console.autoplay().await?;
        console.print_summary(&report);
        Ok(())
    } else {
        console.run().await
    }
}

async fn run_server(addr: String, config: TableConfig) -> Result<()> {
    let addr: SocketAddr = addr.parse()?;
    web::serve(addr, config).await
}
