use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pricebook::{router, AppState};
use pricebook_core::{
    db, export_archive, import_archive, MemoryPriceStore, PostgresPriceStore, PriceStore,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Price list import/export service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP import/export API
    Serve(ServeArgs),
    /// Create the prices table if it does not exist
    InitDb,
    /// Import a local ZIP archive holding data.csv
    Import(ImportArgs),
    /// Export the prices table to a local ZIP archive
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,
    /// Keep prices in process memory instead of Postgres
    #[arg(long)]
    in_memory: bool,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Path of the archive to import
    archive: PathBuf,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Where to write the exported archive
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::InitDb => {
            let pool = connect_pool().await?;
            db::ensure_schema(&pool).await?;
            Ok(())
        }
        Command::Import(args) => {
            let bytes = tokio::fs::read(&args.archive)
                .await
                .with_context(|| format!("failed to read {}", args.archive.display()))?;
            let store = postgres_store().await?;
            let summary = import_archive(&store, &bytes)
                .await
                .with_context(|| format!("failed to import {}", args.archive.display()))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Command::Export(args) => {
            let store = postgres_store().await?;
            let archive = export_archive(&store).await.context("failed to export prices")?;
            tokio::fs::write(&args.output, &archive)
                .await
                .with_context(|| format!("failed to write {}", args.output.display()))?;
            info!(path = %args.output.display(), bytes = archive.len(), "export written");
            Ok(())
        }
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let store: Arc<dyn PriceStore> = if args.in_memory {
        warn!("Serving from an in-memory store; prices are lost on exit");
        Arc::new(MemoryPriceStore::new())
    } else {
        Arc::new(postgres_store().await?)
    };

    let app = router(AppState::new(store));
    let listener = TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn postgres_store() -> Result<PostgresPriceStore> {
    let pool = connect_pool().await?;
    db::ensure_schema(&pool).await?;
    Ok(PostgresPriceStore::new(pool))
}

async fn connect_pool() -> Result<db::DbPool> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("PRICEBOOK_DATABASE_URL"))
        .context("DATABASE_URL (or PRICEBOOK_DATABASE_URL) must be set")?;
    let pool = db::connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;
    Ok(pool)
}
