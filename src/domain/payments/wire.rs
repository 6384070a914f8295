//! Request bodies and filters for `/otp/`.

use serde::Serialize;

use super::InvoiceState;
use crate::shared::Amount;

/// POST `/otp/` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub invoiced_price: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoiced_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoiced_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoiced_detail: Option<String>,
}

/// GET `/otp/invoices/` filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvoiceFilter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub state: Vec<InvoiceState>,
}

impl InvoiceFilter {
    pub fn state(mut self, state: InvoiceState) -> Self {
        self.state.push(state);
        self
    }
}
