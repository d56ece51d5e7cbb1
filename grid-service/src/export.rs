use grid_client::{
    domain::{Record, Table, Value},
    GridError, Store,
};

/// Optional exact-match filter applied before export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFilter {
    pub column: String,
    pub value: Value,
}

impl ExportFilter {
    /// Build a filter from text, typing `raw` by the column's kind. An empty
    /// value on a numeric column filters for NULL.
    pub fn parse(table: Table, column: &str, raw: &str) -> Result<Self, GridError> {
        let value = if column == "id" {
            raw.trim().parse::<i64>().map(Value::Integer).map_err(|e| {
                GridError::SchemaMismatch { table, detail: format!("invalid id '{raw}': {e}") }
            })?
        } else {
            let col = table.column(column)?;
            Value::from_cell(col.kind, raw).map_err(|e| GridError::SchemaMismatch {
                table,
                detail: format!("invalid {column} '{raw}': {e}"),
            })?
        };
        Ok(Self { column: column.to_string(), value })
    }
}

/// Serialize a table (or the filtered view of it) as CSV with a header
/// row of `id` plus every column.
pub async fn export_csv(
    store: &Store,
    table: Table,
    filter: Option<&ExportFilter>,
) -> Result<String, GridError> {
    let records = match filter {
        Some(f) => store.select_where(table, &f.column, f.value.clone()).await?,
        None => store.select_all(table).await?,
    };
    let csv = records_to_csv(table, &records).map_err(|e| GridError::SchemaMismatch {
        table,
        detail: format!("failed to write CSV: {e}"),
    })?;
    tracing::info!(%table, rows = records.len(), filtered = filter.is_some(), "table exported");
    Ok(csv)
}

pub fn records_to_csv(table: Table, records: &[Record]) -> Result<String, csv::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(table.header())?;
    for record in records {
        let mut cells = Vec::with_capacity(record.values.len() + 1);
        cells.push(record.id.to_string());
        cells.extend(record.values.iter().map(|(_, v)| v.to_string()));
        wtr.write_record(&cells)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Suggested download file name.
pub fn file_name(table: Table) -> String {
    format!("{table}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer;

    async fn store_with_meters() -> Store {
        let store = Store::open_in_memory().await.unwrap();
        store.create_schema().await.unwrap();
        let csv = "location,latitude,longitude,meter_id\n\
                   \"Ngong Rd, Adams\",-1.3,36.78,M-1\n\
                   Karen,,36.7,M-2\n";
        importer::import_csv(&store, Table::Meters, csv.as_bytes()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn full_table_export_has_header_and_every_row() {
        let store = store_with_meters().await;
        let csv = export_csv(&store, Table::Meters, None).await.unwrap();

        assert_eq!(
            csv,
            "id,location,latitude,longitude,meter_id\n\
             1,\"Ngong Rd, Adams\",-1.3,36.78,M-1\n\
             2,Karen,,36.7,M-2\n"
        );
    }

    #[tokio::test]
    async fn filtered_export_keeps_only_matches() {
        let store = store_with_meters().await;
        let filter = ExportFilter { column: "meter_id".to_string(), value: Value::from("M-2") };
        let csv = export_csv(&store, Table::Meters, Some(&filter)).await.unwrap();

        assert_eq!(csv, "id,location,latitude,longitude,meter_id\n2,Karen,,36.7,M-2\n");
    }

    #[tokio::test]
    async fn exported_file_imports_back() {
        let store = store_with_meters().await;
        let csv = export_csv(&store, Table::Meters, None).await.unwrap();

        importer::import_csv(&store, Table::Meters, csv.as_bytes()).await.unwrap();
        let rows = store.select_all(Table::Meters).await.unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2].id, 3);
        assert_eq!(rows[2].text("location"), Some("Ngong Rd, Adams"));
    }

    #[test]
    fn filter_value_is_typed_by_column() {
        let f = ExportFilter::parse(Table::Poles, "latitude", "-1.5").unwrap();
        assert_eq!(f.value, Value::Real(-1.5));
        let f = ExportFilter::parse(Table::Poles, "id", "4").unwrap();
        assert_eq!(f.value, Value::Integer(4));
        let f = ExportFilter::parse(Table::Poles, "latitude", "").unwrap();
        assert_eq!(f.value, Value::Null);

        assert!(ExportFilter::parse(Table::Poles, "latitude", "far").is_err());
        assert!(matches!(
            ExportFilter::parse(Table::Poles, "colour", "red"),
            Err(GridError::InvalidColumn { .. })
        ));
    }

    #[test]
    fn empty_table_exports_header_only() {
        assert_eq!(
            records_to_csv(Table::Outages, &[]).unwrap(),
            "id,location,latitude,longitude,status,resolution_time\n"
        );
        assert_eq!(file_name(Table::PowerLines), "power_lines.csv");
    }
}
