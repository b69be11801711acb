use anyhow::{Context, bail};
use clap::Parser;
use college_directory_mcp::cli::{Cli, Commands};
use college_directory_mcp::config::DirectoryConfig;
use college_directory_mcp::error::StoreError;
use college_directory_mcp::source::dataset::SEED_BATCH_PAUSE;
use college_directory_mcp::source::{PostgrestStore, StaticDataset, seed_store};
use college_directory_mcp::{DirectoryServer, DirectoryState};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    college_directory_mcp::tracing::init();

    let cli = Cli::parse();
    let config = DirectoryConfig::load().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config).await,
        Commands::Seed {
            batch_size,
            pause_ms,
        } => {
            let pause = pause_ms.map_or(SEED_BATCH_PAUSE, Duration::from_millis);
            seed(&config, batch_size, pause).await
        }
    }
}

async fn serve(config: &DirectoryConfig) -> anyhow::Result<()> {
    tracing::info!(
        "Starting college-directory-mcp ({} environment)",
        config.environment
    );

    let state = Arc::new(DirectoryState::from_config(config).await?);
    let server = DirectoryServer::new(state);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}

async fn seed(config: &DirectoryConfig, batch_size: usize, pause: Duration) -> anyhow::Result<()> {
    let store = match PostgrestStore::from_config(&config.store) {
        Ok(store) => store,
        Err(StoreError::Unconfigured) => {
            bail!("SUPABASE_URL and SUPABASE_ANON_KEY must be set to seed the store")
        }
        Err(e) => return Err(e).context("Failed to build record store client"),
    };

    let dataset = StaticDataset::load(config.resolved_dataset_path().as_deref()).await?;
    tracing::info!("Seeding {} colleges into {}", dataset.len(), store.table());

    let report = seed_store(&store, store.table(), &dataset, batch_size, pause).await;
    tracing::info!(
        "Seeding complete: {} inserted, {} failed in {} batches",
        report.inserted,
        report.failed,
        report.batches
    );

    if !report.is_success() {
        bail!("{} colleges failed to insert", report.failed);
    }
    Ok(())
}
