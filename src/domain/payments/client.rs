//! Payments sub-client: payment group, invoices, receipts.

use crate::client::DaisyClient;
use crate::domain::payments::wire::InvoiceFilter;
use crate::domain::payments::{
    CreateInvoice, InvoiceLookup, PaymentGroup, PaymentInvoice, PaymentReceipt,
};
use crate::error::SdkError;
use crate::shared::is_unset_address;

pub struct Payments<'a> {
    pub(crate) client: &'a DaisyClient,
}

impl<'a> Payments<'a> {
    /// Fetch the payment group (GET `/otp/`).
    pub async fn get_data(&self) -> Result<PaymentGroup, SdkError> {
        Ok(self.client.http.get_data::<_, ()>("/otp/", None).await?)
    }

    /// Fetch the payment group and cache it on the client.
    pub async fn sync(&self) -> Result<PaymentGroup, SdkError> {
        let group = self.get_data().await?;

        if is_unset_address(group.token_address.as_deref()) {
            tracing::warn!("Payment group has no default token for new invoices; set one in the dashboard");
        } else if is_unset_address(group.wallet_address.as_deref()) {
            tracing::warn!("Payment group has no default wallet for new invoices; set one in the dashboard");
        }

        *self.client.payment_group.write().await = Some(group.clone());
        Ok(group)
    }

    /// The group cached by the last [`Payments::sync`].
    pub async fn manager(&self) -> Option<PaymentGroup> {
        self.client.payment_group.read().await.clone()
    }

    pub async fn get_invoices(
        &self,
        filter: &InvoiceFilter,
    ) -> Result<Vec<PaymentInvoice>, SdkError> {
        Ok(self
            .client
            .http
            .get_data("/otp/invoices/", Some(filter))
            .await?)
    }

    /// `Ok(None)` when no invoice matches.
    pub async fn get_invoice(
        &self,
        lookup: &InvoiceLookup,
    ) -> Result<Option<PaymentInvoice>, SdkError> {
        let path = lookup.path()?;
        Ok(self.client.http.get_data::<_, ()>(&path, None).await?)
    }

    pub async fn get_receipts(
        &self,
        lookup: &InvoiceLookup,
    ) -> Result<Vec<PaymentReceipt>, SdkError> {
        let path = format!("{}receipts/", lookup.path()?);
        Ok(self.client.http.get_data::<_, ()>(&path, None).await?)
    }

    /// Create an invoice (POST `/otp/`). Requires the secret key.
    ///
    /// A missing or malformed price fails with [`SdkError::Validation`]
    /// before any request is made.
    pub async fn create_invoice(&self, params: CreateInvoice) -> Result<PaymentInvoice, SdkError> {
        let body = params.into_request()?;
        tracing::debug!(price = %body.invoiced_price, "Creating invoice");
        Ok(self.client.http.post_data("/otp/", &body).await?)
    }
}
