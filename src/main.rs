use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use repolens_core::bootstrap::{build_forwarder, build_indexer, load_config, resolve_config_path};
use repolens_core::config::Config;
use repolens_gateway::GatewayServer;
use repolens_index::IndexReport;
use tokio::sync::watch;

#[derive(Debug, Parser)]
#[command(name = "repolens", version, about)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the OpenAI-compatible chat completions proxy.
    Serve,
    /// Index a source tree into the vector store.
    Index {
        /// Root of the repository to index.
        repo_path: PathBuf,
        /// Progress log location (defaults to `<REPO_PATH>/.repolens-progress`).
        #[arg(long)]
        log: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config);
    let config = load_config(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    match cli.command {
        Command::Serve => serve(&config).await,
        Command::Index { repo_path, log } => index(&config, &repo_path, log).await,
    }
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let forwarder = build_forwarder(config).context("building completion forwarder")?;
    tracing::info!(
        model = %config.llm.model,
        agents = forwarder.aggregator().len(),
        "forwarder ready"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    GatewayServer::new(
        &config.gateway.bind,
        config.gateway.port,
        forwarder,
        shutdown_rx,
    )
    .with_max_body_size(config.gateway.max_body_size)
    .serve()
    .await?;

    Ok(())
}

async fn index(config: &Config, repo_path: &Path, log: Option<PathBuf>) -> anyhow::Result<()> {
    anyhow::ensure!(
        repo_path.is_dir(),
        "{} is not a directory",
        repo_path.display()
    );
    let log_path = log.unwrap_or_else(|| config.progress_log_path(repo_path));

    let indexer = build_indexer(config).context("building indexer")?;
    let report = indexer
        .index(repo_path, &log_path)
        .await
        .with_context(|| format!("indexing {}", repo_path.display()))?;

    println!("{}", summary(&report, &config.index.collection));
    Ok(())
}

fn summary(report: &IndexReport, collection: &str) -> String {
    format!(
        "indexed into '{collection}': {} processed, {} skipped, {} failed of {} files; \
         {} chunks ({} dropped), {} points upserted in {} ms",
        report.files_processed,
        report.files_skipped,
        report.files_failed,
        report.files_total,
        report.chunks_created,
        report.chunks_dropped,
        report.points_upserted,
        report.duration_ms,
    )
}
