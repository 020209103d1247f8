use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(
    name = "osti-cli",
    about = "Command-line interface for the OSTI.gov records search API",
    long_about = "Search DOE-sponsored research records on OSTI.gov and extract their citation URLs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    client: commands::ClientOptions,
}

#[derive(Subcommand)]
enum Commands {
    /// Search records and print them (or their citation URLs)
    Search(Box<commands::search::Search>),
    /// Print the number of records matching a filter
    Count(commands::count::Count),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with indicatif layer for progress bars
    let filter = if cli.verbose { "debug" } else { "info" };

    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(indicatif_layer.get_stderr_writer()),
        )
        .with(indicatif_layer)
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    match &cli.command {
        Commands::Search(cmd) => cmd.execute(&cli.client).await,
        Commands::Count(cmd) => cmd.execute(&cli.client).await,
    }
}
