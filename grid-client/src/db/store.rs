use std::{path::Path, str::FromStr};

use sqlx::{
    query::Query,
    query_builder::Separated,
    sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    QueryBuilder, Row, Sqlite, SqlitePool,
};

use crate::{
    domain::{
        AssetKind, Column, ColumnKind, ContactMessage, Customer, OutageRecord, PointAsset,
        PowerLine, Record, Table, Value,
    },
    error::{GridError, Result},
};

use super::asset_queries;

// SQLite's default host-parameter limit is 32766; stay well below it.
const MAX_BIND_PARAMS: usize = 30_000;

/// Handle to the record store.
///
/// Backed by a pool capped at one connection that is never idled out, so
/// every read and write in the process goes through the same connection and
/// serializes there. Every mutating call commits before it returns.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if missing) the store file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        Self::connect(options).await
    }

    /// A private in-memory store, lost when the handle is closed.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Ensure every table exists. Safe to call on every startup.
    pub async fn create_schema(&self) -> Result<()> {
        for table in Table::ALL {
            sqlx::query(&table.create_sql()).execute(&self.pool).await?;
        }
        tracing::debug!(tables = Table::ALL.len(), "schema ensured");
        Ok(())
    }

    /// Insert one row and return its assigned id. Columns left out are NULL.
    pub async fn insert(&self, table: Table, fields: &[(&str, Value)]) -> Result<i64> {
        let mut columns: Vec<&'static Column> = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            let column = table.column(name)?;
            if columns.iter().any(|c| c.name == column.name) {
                return Err(GridError::SchemaMismatch {
                    table,
                    detail: format!("column '{name}' given more than once"),
                });
            }
            check_value(table, column, value)?;
            columns.push(column);
        }

        let sql = if columns.is_empty() {
            format!("INSERT INTO {table} DEFAULT VALUES")
        } else {
            let names: Vec<&str> = columns.iter().map(|c| c.name).collect();
            let placeholders = vec!["?"; names.len()].join(", ");
            format!("INSERT INTO {table} ({}) VALUES ({placeholders})", names.join(", "))
        };

        let mut query = sqlx::query(&sql);
        for (_, value) in fields {
            query = bind_value(query, value);
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.last_insert_rowid())
    }

    /// Set one column of one row. Returns the number of rows changed; a
    /// missing id is not an error here.
    pub async fn update_field(
        &self,
        table: Table,
        id: i64,
        column: &str,
        value: Value,
    ) -> Result<u64> {
        let column = table.column(column)?;
        check_value(table, column, &value)?;

        let sql = format!("UPDATE {table} SET {} = ? WHERE id = ?", column.name);
        let result = bind_value(sqlx::query(&sql), &value)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_id(&self, table: Table, id: i64) -> Result<u64> {
        let sql = format!("DELETE FROM {table} WHERE id = ?");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Empty one table. Ids keep counting from where they were.
    pub async fn delete_all(&self, table: Table) -> Result<u64> {
        let sql = format!("DELETE FROM {table}");
        let result = sqlx::query(&sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Append many rows in a single transaction: either every row lands or
    /// none does.
    pub async fn append_rows(
        &self,
        table: Table,
        columns: &[&str],
        rows: &[Vec<Value>],
    ) -> Result<u64> {
        let mut catalogue: Vec<&'static Column> = Vec::with_capacity(columns.len());
        for name in columns {
            catalogue.push(table.column(name)?);
        }
        if catalogue.is_empty() {
            return Err(GridError::SchemaMismatch {
                table,
                detail: "no columns to append".to_string(),
            });
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != catalogue.len() {
                return Err(GridError::SchemaMismatch {
                    table,
                    detail: format!(
                        "row {} has {} values, expected {}",
                        idx + 1,
                        row.len(),
                        catalogue.len()
                    ),
                });
            }
            for (column, value) in catalogue.iter().zip(row) {
                check_value(table, column, value)?;
            }
        }
        if rows.is_empty() {
            return Ok(0);
        }

        let names: Vec<&str> = catalogue.iter().map(|c| c.name).collect();
        let rows_per_statement = (MAX_BIND_PARAMS / names.len()).max(1);

        let mut tx = self.pool.begin().await?;
        let mut appended = 0;
        for chunk in rows.chunks(rows_per_statement) {
            let mut builder =
                QueryBuilder::<Sqlite>::new(format!("INSERT INTO {table} ({}) ", names.join(", ")));
            builder.push_values(chunk, |mut b, row| {
                for value in row {
                    push_value(&mut b, value);
                }
            });
            appended += builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;

        tracing::debug!(%table, rows = appended, "rows appended");
        Ok(appended)
    }

    pub async fn select_all(&self, table: Table) -> Result<Vec<Record>> {
        let sql = format!("SELECT {} FROM {table} ORDER BY id", table.header().join(", "));
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(|row| record_from_row(table, row)).collect()
    }

    /// Rows whose `column` equals `value` exactly. A `Null` value matches
    /// NULL cells.
    pub async fn select_where(&self, table: Table, column: &str, value: Value) -> Result<Vec<Record>> {
        let column_name = if column == "id" {
            if !matches!(value, Value::Integer(_)) {
                return Err(GridError::SchemaMismatch {
                    table,
                    detail: "column 'id' expects an integer value".to_string(),
                });
            }
            "id"
        } else {
            let col = table.column(column)?;
            check_value(table, col, &value)?;
            col.name
        };

        let select = format!("SELECT {} FROM {table}", table.header().join(", "));
        let rows = if value.is_null() {
            let sql = format!("{select} WHERE {column_name} IS NULL ORDER BY id");
            sqlx::query(&sql).fetch_all(&self.pool).await?
        } else {
            let sql = format!("{select} WHERE {column_name} = ? ORDER BY id");
            bind_value(sqlx::query(&sql), &value).fetch_all(&self.pool).await?
        };
        rows.iter().map(|row| record_from_row(table, row)).collect()
    }

    pub async fn point_assets(&self, kind: AssetKind) -> Result<Vec<PointAsset>> {
        asset_queries::point_assets(&self.pool, kind).await
    }

    pub async fn power_lines(&self) -> Result<Vec<PowerLine>> {
        asset_queries::power_lines(&self.pool).await
    }

    pub async fn customers(&self) -> Result<Vec<Customer>> {
        asset_queries::customers(&self.pool).await
    }

    pub async fn outages(&self) -> Result<Vec<OutageRecord>> {
        asset_queries::outages(&self.pool).await
    }

    pub async fn contact_messages(&self) -> Result<Vec<ContactMessage>> {
        asset_queries::contact_messages(&self.pool).await
    }

    pub async fn contact_message(&self, id: i64) -> Result<Option<ContactMessage>> {
        asset_queries::contact_message(&self.pool, id).await
    }

    /// Set a message's response only if it has none yet. Returns rows
    /// changed: 0 when the id is missing or already answered.
    pub async fn answer_message(&self, id: i64, response: &str) -> Result<u64> {
        asset_queries::answer_message(&self.pool, id, response).await
    }
}

fn check_value(table: Table, column: &Column, value: &Value) -> Result<()> {
    let ok = match (column.kind, value) {
        (_, Value::Null) => true,
        (ColumnKind::Text, Value::Text(_)) => true,
        (ColumnKind::Real, Value::Real(_) | Value::Integer(_)) => true,
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        let expected = match column.kind {
            ColumnKind::Text => "text",
            ColumnKind::Real => "numeric",
        };
        Err(GridError::SchemaMismatch {
            table,
            detail: format!("column '{}' expects a {expected} value", column.name),
        })
    }
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Integer(v) => query.bind(*v),
        Value::Real(v) => query.bind(*v),
        Value::Text(s) => query.bind(s.clone()),
    }
}

fn push_value(b: &mut Separated<'_, '_, Sqlite, &'static str>, value: &Value) {
    match value {
        Value::Null => b.push_bind(None::<String>),
        Value::Integer(v) => b.push_bind(*v),
        Value::Real(v) => b.push_bind(*v),
        Value::Text(s) => b.push_bind(s.clone()),
    };
}

fn record_from_row(table: Table, row: &SqliteRow) -> Result<Record> {
    let id: i64 = row.try_get("id")?;
    let mut values = Vec::with_capacity(table.columns().len());
    for column in table.columns() {
        let value = match column.kind {
            ColumnKind::Text => row.try_get::<Option<String>, _>(column.name)?.into(),
            ColumnKind::Real => row.try_get::<Option<f64>, _>(column.name)?.into(),
        };
        values.push((column.name, value));
    }
    Ok(Record { table, id, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> Store {
        let store = Store::open_in_memory().await.unwrap();
        store.create_schema().await.unwrap();
        store
    }

    #[tokio::test]
    async fn create_schema_is_idempotent() {
        let store = store().await;
        store.create_schema().await.unwrap();
        assert!(store.select_all(Table::Meters).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_rejects_unknown_column_and_wrong_kind() {
        let store = store().await;

        let err = store
            .insert(Table::Poles, &[("meter_id", Value::from("M-1"))])
            .await
            .unwrap_err();
        assert!(matches!(err, GridError::InvalidColumn { .. }));

        let err = store
            .insert(Table::Poles, &[("latitude", Value::from("north"))])
            .await
            .unwrap_err();
        assert!(matches!(err, GridError::SchemaMismatch { .. }));

        assert!(store.select_all(Table::Poles).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn omitted_columns_read_back_as_null() {
        let store = store().await;
        let id = store
            .insert(Table::ContactCenter, &[("message", Value::from("no power in Kibera"))])
            .await
            .unwrap();

        let rows = store.select_all(Table::ContactCenter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].get("response"), Some(&Value::Null));
        assert_eq!(rows[0].text("message"), Some("no power in Kibera"));
    }

    #[tokio::test]
    async fn select_where_matches_exactly_and_on_null() {
        let store = store().await;
        for (meter_id, lat) in [("M-1", Some(-1.0)), ("M-2", None), ("M-1", Some(-2.0))] {
            store
                .insert(
                    Table::Meters,
                    &[("meter_id", Value::from(meter_id)), ("latitude", Value::from(lat))],
                )
                .await
                .unwrap();
        }

        let m1 = store.select_where(Table::Meters, "meter_id", "M-1".into()).await.unwrap();
        assert_eq!(m1.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);

        let no_lat = store.select_where(Table::Meters, "latitude", Value::Null).await.unwrap();
        assert_eq!(no_lat.len(), 1);
        assert_eq!(no_lat[0].text("meter_id"), Some("M-2"));

        let by_id = store.select_where(Table::Meters, "id", Value::Integer(2)).await.unwrap();
        assert_eq!(by_id.len(), 1);

        let partial = store.select_where(Table::Meters, "meter_id", "M-".into()).await.unwrap();
        assert!(partial.is_empty());
    }

    #[tokio::test]
    async fn append_rows_is_all_or_nothing_on_bad_row() {
        let store = store().await;
        let rows = vec![
            vec![Value::from("A"), Value::Real(1.0)],
            vec![Value::from("B"), Value::from("oops")],
        ];
        let err = store
            .append_rows(Table::Poles, &["location", "latitude"], &rows)
            .await
            .unwrap_err();
        assert!(matches!(err, GridError::SchemaMismatch { .. }));
        assert!(store.select_all(Table::Poles).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn answer_message_only_fills_empty_response() {
        let store = store().await;
        let id = store
            .insert(Table::ContactCenter, &[("customer_name", Value::from("Wanjiru"))])
            .await
            .unwrap();

        assert_eq!(store.answer_message(id, "crew on the way").await.unwrap(), 1);
        assert_eq!(store.answer_message(id, "second answer").await.unwrap(), 0);

        let msg = store.contact_message(id).await.unwrap().unwrap();
        assert_eq!(msg.response.as_deref(), Some("crew on the way"));
    }
}
