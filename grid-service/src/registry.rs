use grid_client::{
    domain::{
        AssetKind, NewContactMessage, NewCustomer, NewOutage, NewPointAsset, NewPowerLine, Table,
        Value,
    },
    GridError, Store,
};

use crate::validation;

/// Typed entry point for form submissions. Validates, then makes exactly
/// one store call per submission.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    store: Store,
}

impl AssetRegistry {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn submit_customer(&self, customer: &NewCustomer) -> Result<i64, GridError> {
        rejected(Table::Customers, validation::validate_customer(customer))?;
        self.insert(Table::Customers, &customer.fields()).await
    }

    pub async fn submit_point_asset(
        &self,
        kind: AssetKind,
        asset: &NewPointAsset,
    ) -> Result<i64, GridError> {
        rejected(kind.table(), validation::validate_point_asset(asset))?;
        self.insert(kind.table(), &asset.fields(kind)).await
    }

    pub async fn submit_power_line(&self, line: &NewPowerLine) -> Result<i64, GridError> {
        rejected(Table::PowerLines, validation::validate_power_line(line))?;
        self.insert(Table::PowerLines, &line.fields()).await
    }

    pub async fn submit_contact_message(
        &self,
        message: &NewContactMessage,
    ) -> Result<i64, GridError> {
        self.insert(Table::ContactCenter, &message.fields()).await
    }

    pub async fn report_outage(&self, outage: &NewOutage) -> Result<i64, GridError> {
        rejected(Table::Outages, validation::validate_outage(outage))?;
        self.insert(Table::Outages, &outage.fields()).await
    }

    /// Record the operator's answer to a message. Only the first answer
    /// sticks; later ones fail with `AlreadyResponded`. A blank answer is
    /// rejected so it can never be overwritten by a later call.
    pub async fn respond_to_message(&self, id: i64, response: &str) -> Result<(), GridError> {
        if response.trim().is_empty() {
            return rejected(Table::ContactCenter, Err(GridError::BlankResponse { id }));
        }
        if self.store.answer_message(id, response).await? == 1 {
            tracing::info!(message_id = id, "contact-center message answered");
            return Ok(());
        }

        match self.store.contact_message(id).await? {
            None => Err(GridError::NotFound { table: Table::ContactCenter, id }),
            Some(_) => Err(GridError::AlreadyResponded { id }),
        }
    }

    pub async fn delete_record(&self, table: Table, id: i64) -> Result<(), GridError> {
        match self.store.delete_by_id(table, id).await? {
            0 => Err(GridError::NotFound { table, id }),
            _ => {
                tracing::info!(%table, id, "record deleted");
                Ok(())
            }
        }
    }

    pub async fn clear_table(&self, table: Table) -> Result<u64, GridError> {
        let removed = self.store.delete_all(table).await?;
        tracing::info!(%table, removed, "table cleared");
        Ok(removed)
    }

    async fn insert(&self, table: Table, fields: &[(&str, Value)]) -> Result<i64, GridError> {
        let id = self.store.insert(table, fields).await?;
        metrics::counter!("registry_records_created_total", "table" => table.name()).increment(1);
        tracing::info!(%table, id, "record created");
        Ok(id)
    }
}

fn rejected(table: Table, res: Result<(), GridError>) -> Result<(), GridError> {
    if let Err(e) = &res {
        metrics::counter!("registry_rejected_total", "table" => table.name()).increment(1);
        tracing::warn!(%table, error = %e, "submission rejected");
    }
    res
}
