use sqlx::SqlitePool;

use crate::{
    domain::{
        point_asset::PointAssetRow, AssetKind, ContactMessage, Customer, OutageRecord, PointAsset,
        PowerLine,
    },
    error::Result,
};

/// Every asset of one kind, identifier column aliased to `external_id`.
pub async fn point_assets(pool: &SqlitePool, kind: AssetKind) -> Result<Vec<PointAsset>> {
    let sql = format!(
        r#"
        SELECT
            id,
            COALESCE(location, '') AS location,
            latitude,
            longitude,
            COALESCE({id_column}, '') AS external_id
        FROM {table}
        ORDER BY id
        "#,
        id_column = kind.id_column(),
        table = kind.table(),
    );

    let rows = sqlx::query_as::<_, PointAssetRow>(&sql).fetch_all(pool).await?;
    Ok(rows.into_iter().map(|r| r.into_asset(kind)).collect())
}

pub async fn power_lines(pool: &SqlitePool) -> Result<Vec<PowerLine>> {
    let rows = sqlx::query_as::<_, PowerLine>(
        r#"
        SELECT
            id,
            COALESCE(start_location, '') AS start_location,
            start_latitude,
            start_longitude,
            COALESCE(end_location, '') AS end_location,
            end_latitude,
            end_longitude,
            COALESCE(line_id, '') AS line_id
        FROM power_lines
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn customers(pool: &SqlitePool) -> Result<Vec<Customer>> {
    let rows = sqlx::query_as::<_, Customer>(
        r#"
        SELECT
            id,
            COALESCE(name, '') AS name,
            COALESCE(location, '') AS location,
            COALESCE(meter_serial_number, '') AS meter_serial_number,
            latitude,
            longitude,
            report
        FROM customers
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn outages(pool: &SqlitePool) -> Result<Vec<OutageRecord>> {
    let rows = sqlx::query_as::<_, OutageRecord>(
        r#"
        SELECT
            id,
            COALESCE(location, '') AS location,
            latitude,
            longitude,
            COALESCE(status, '') AS status,
            resolution_time
        FROM kplc_outages
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

const CONTACT_MESSAGE_COLUMNS: &str = r#"
    id,
    COALESCE(customer_name, '') AS customer_name,
    COALESCE(customer_contact, '') AS customer_contact,
    COALESCE(message, '') AS message,
    response
"#;

pub async fn contact_messages(pool: &SqlitePool) -> Result<Vec<ContactMessage>> {
    let sql = format!("SELECT {CONTACT_MESSAGE_COLUMNS} FROM contact_center ORDER BY id");
    let rows = sqlx::query_as::<_, ContactMessage>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn contact_message(pool: &SqlitePool, id: i64) -> Result<Option<ContactMessage>> {
    let sql = format!("SELECT {CONTACT_MESSAGE_COLUMNS} FROM contact_center WHERE id = $1");
    let row = sqlx::query_as::<_, ContactMessage>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Conditional update so the at-most-once response rule holds in a single
/// statement.
pub async fn answer_message(pool: &SqlitePool, id: i64, response: &str) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE contact_center
        SET response = $1
        WHERE id = $2
          AND (response IS NULL OR response = '')
        "#,
    )
    .bind(response)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
