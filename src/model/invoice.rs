use serde::{Deserialize, Serialize};

use crate::framework::Resource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: u64,
    pub number: String,
    pub customer_id: u64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCreate {
    pub number: String,
    pub customer_id: u64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl Resource for Invoice {
    type Id = u64;
    type Create = InvoiceCreate;
    type Update = InvoiceUpdate;
    type Status = InvoiceStatus;

    const NAME: &'static str = "invoice";
    const BASE_PATH: &'static str = "invoices";
    const LIST_KEY: &'static str = "invoices";
    const RECORD_KEY: Option<&'static str> = Some("invoice");

    fn id(&self) -> &u64 {
        &self.id
    }
}
