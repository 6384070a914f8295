//! Payments domain: one-time invoices grouped under a payment group.

#[cfg(feature = "http")]
pub mod client;
pub mod wire;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SdkError;
use crate::shared::{serde_util, Amount};

// ─── PaymentGroup ────────────────────────────────────────────────────────────

/// The payments manager configured in the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentGroup {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "serde_util::opt_string_or_number::deserialize")]
    pub network_id: Option<String>,
    #[serde(default)]
    pub token_address: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// ─── Invoices ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceState {
    Pending,
    UnderPaid,
    Paid,
    OverPaid,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInvoice {
    pub id: String,
    #[serde(default)]
    pub identifier: Option<String>,
    pub state: InvoiceState,
    #[serde(default)]
    pub payment_state: Option<String>,
    #[serde(default)]
    pub amount_paid: Option<Amount>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    /// Deposit address, unique per invoice.
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub token_address: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    pub invoiced_price: Amount,
    #[serde(default)]
    pub invoiced_email: Option<String>,
    #[serde(default)]
    pub invoiced_name: Option<String>,
    #[serde(default)]
    pub invoiced_detail: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub id: String,
    pub tx_hash: String,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub on_chain_created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// How to find a single invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceLookup {
    Identifier(String),
    /// The invoice's deposit address.
    Address(String),
}

impl InvoiceLookup {
    /// Path below `/otp/invoices/`, validated non-empty.
    pub(crate) fn path(&self) -> Result<String, SdkError> {
        let (prefix, key) = match self {
            Self::Identifier(id) => ("", id),
            Self::Address(addr) => ("address/", addr),
        };
        if key.trim().is_empty() {
            return Err(SdkError::Validation("missing invoice identifier or address".into()));
        }
        Ok(format!("/otp/invoices/{}{}/", prefix, urlencoding::encode(key)))
    }
}

// ─── CreateInvoice ───────────────────────────────────────────────────────────

/// Parameters for `payments().create_invoice(..)`.
///
/// `invoiced_price` is required. It accepts base-10 integers, `0x` hex, or a
/// decimal with no fractional part, and is sent as a decimal string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateInvoice {
    pub invoiced_price: Option<String>,
    pub invoiced_email: Option<String>,
    pub invoiced_name: Option<String>,
    pub invoiced_detail: Option<String>,
}

impl CreateInvoice {
    pub fn new(price: impl ToString) -> Self {
        Self {
            invoiced_price: Some(price.to_string()),
            ..Self::default()
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.invoiced_email = Some(email.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.invoiced_name = Some(name.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.invoiced_detail = Some(detail.into());
        self
    }

    pub(crate) fn into_request(self) -> Result<wire::CreateInvoiceRequest, SdkError> {
        let raw = self
            .invoiced_price
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| SdkError::Validation("missing invoicedPrice".into()))?;
        let price = coerce_amount(&raw)
            .map_err(|e| SdkError::Validation(format!("invalid invoicedPrice: {}", e)))?;

        Ok(wire::CreateInvoiceRequest {
            invoiced_price: price,
            invoiced_email: self.invoiced_email,
            invoiced_name: self.invoiced_name,
            invoiced_detail: self.invoiced_detail,
        })
    }
}

fn coerce_amount(raw: &str) -> Result<Amount, String> {
    match Amount::from_str(raw) {
        Ok(amount) => Ok(amount),
        Err(e) => match Decimal::from_str(raw.trim()) {
            Ok(decimal) => Amount::from_decimal(decimal),
            Err(_) => Err(e),
        },
    }
}
