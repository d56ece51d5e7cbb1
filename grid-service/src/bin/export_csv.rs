use anyhow::{bail, Result};
use grid_client::{domain::Table, Store};
use grid_service::{
    config::AppConfig,
    export::{self, ExportFilter},
    observability,
};
use std::env;

/// Write a table as CSV to `<table>.csv` in the working directory.
///
/// Usage:
///   export_csv <table> [<column> <value>]
#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let filter_args = match args.len() {
        2 => None,
        4 => Some((&args[2], &args[3])),
        _ => bail!("usage: export_csv <table> [<column> <value>]"),
    };
    let table: Table = args[1].parse()?;
    let filter = filter_args
        .map(|(column, value)| ExportFilter::parse(table, column, value))
        .transpose()?;

    let cfg = AppConfig::load()?;
    observability::init_tracing(&cfg.log);
    let store = Store::open(&cfg.store.path).await?;
    store.create_schema().await?;

    let csv = export::export_csv(&store, table, filter.as_ref()).await?;
    let out = export::file_name(table);
    tokio::fs::write(&out, csv).await?;

    tracing::info!(%table, file = %out, "export written");
    store.close().await;
    Ok(())
}
