use anyhow::{Context, Result};
use clap::Parser;
use pubmed_digest::config::{find_config_file, load_config};
use pubmed_digest::digest;
use pubmed_digest::models::SearchQuery;
use pubmed_digest::VERSION;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// PubMed Digest - weekly TMD / splint literature digest for Telegram
///
/// Without arguments: search PubMed, format the digest and send it to the chat
/// given by TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID.
#[derive(Parser, Debug)]
#[command(name = "pubmed-digest")]
#[command(version = VERSION)]
#[command(about = "Send a weekly PubMed digest to Telegram", long_about = None)]
struct Cli {
    /// Enable verbose logging (-v debug, -vv trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the message to stdout instead of sending it (no credentials needed)
    #[arg(long)]
    dry_run: bool,

    /// Print the PubMed search term and exit
    #[arg(long)]
    print_query: bool,
}

fn init_tracing(cli: &Cli) {
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let level = if cli.quiet { "error" } else { log_level };

    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("pubmed_digest={}", level)),
    );

    // Logs go to stderr; stdout is reserved for --dry-run and --print-query
    if cli.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    if cli.print_query {
        println!("{}", SearchQuery::tmd_splint_weekly().term());
        return Ok(());
    }

    let config_path = cli.config.clone().or_else(find_config_file);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }
    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;
    let query = SearchQuery::tmd_splint_weekly().sort_by(config.pubmed.sort);

    let outcome = digest::run(&config, &query, cli.dry_run).await?;

    tracing::info!(
        ids = outcome.ids_found,
        records = outcome.records,
        chunks = outcome.chunks_sent,
        fallback = outcome.fallback,
        "Run complete"
    );

    Ok(())
}
