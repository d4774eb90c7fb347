use tracing::instrument;

use super::ResourceClient;
use crate::framework::{ListQuery, SliceError};
use crate::model::{Invoice, InvoiceStatus};

resource_client!(
    /// Client for the `invoice` slice.
    Invoice
);

impl InvoiceClient {
    /// Lookup key under which a customer's invoice history is stored.
    pub fn history_key(customer_id: u64) -> String {
        format!("customer:{customer_id}")
    }

    /// Loads a customer's invoices into `lookups` without replacing the main list.
    #[instrument(skip(self))]
    pub async fn history_for(&self, customer_id: u64) -> Result<Vec<Invoice>, SliceError> {
        self.inner()
            .lookup(
                Self::history_key(customer_id),
                ListQuery::new().filter("customerId", customer_id),
            )
            .await
    }

    #[instrument(skip(self))]
    pub async fn mark_paid(&self, id: u64) -> Result<(), SliceError> {
        self.update_status(id, InvoiceStatus::Paid).await
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: u64) -> Result<(), SliceError> {
        self.update_status(id, InvoiceStatus::Cancelled).await
    }
}
