use anyhow::{bail, Result};
use grid_client::{domain::Table, Store};
use grid_service::{config::AppConfig, importer, observability};
use std::env;

/// Append every row of a CSV file to one table.
///
/// Usage:
///   import_csv <table> <csv_file_path>
#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        bail!("usage: import_csv <table> <csv_file_path>");
    }
    let table: Table = args[1].parse()?;
    let file_path = &args[2];

    // Load configuration (GRID_CONFIG can point to a different store).
    let cfg = AppConfig::load()?;
    observability::init_tracing(&cfg.log);

    let store = Store::open(&cfg.store.path).await?;
    store.create_schema().await?;

    let bytes = tokio::fs::read(file_path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to open CSV file '{file_path}': {e}"))?;
    let appended = importer::import_csv(&store, table, &bytes).await?;

    tracing::info!(%table, appended, file = %file_path, "import finished");
    store.close().await;
    Ok(())
}
