//! Subscriptions domain: managers, plans, subscriptions, receipts, invitations.

pub mod agreement;
#[cfg(feature = "http")]
pub mod client;
pub mod wire;

pub use agreement::{
    AuthorizeOptions, CancelAgreement, CancelOptions, SignedAgreement, SubscriptionAgreement,
    SubscriptionOptions,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SdkError;
use crate::shared::{serde_util, Amount};

// ─── SubscriptionManager ─────────────────────────────────────────────────────

/// The deployed subscription manager contract plus its plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionManager {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "serde_util::opt_string_or_number::deserialize")]
    pub network_id: Option<String>,
    /// Contract address; the EIP-712 `verifyingContract`.
    #[serde(default)]
    pub address: Option<String>,
    /// Address whose signature admits subscribers to private plans.
    #[serde(default)]
    pub authorizer: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub token_address: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub deployed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub plans: Vec<Plan>,
}

impl SubscriptionManager {
    /// The contract address, or `Validation` if the manager is not deployed.
    pub fn contract_address(&self) -> Result<&str, SdkError> {
        self.address
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| {
                SdkError::Validation("subscription manager has no contract address".into())
            })
    }

    pub fn plan(&self, id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == id)
    }
}

// ─── Plan ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Plan identifier on chain (`bytes32`).
    #[serde(default)]
    pub on_chain_id: Option<String>,
    pub price: Amount,
    #[serde(default, deserialize_with = "serde_util::opt_string_or_number::deserialize")]
    pub periods: Option<String>,
    /// `DAY`, `MONTH` or `YEAR`.
    #[serde(default)]
    pub period_unit: Option<String>,
    #[serde(default, deserialize_with = "serde_util::opt_string_or_number::deserialize")]
    pub max_executions: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `{ "id": ... }` reference embedded in subscriptions and invitations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRef {
    pub id: String,
}

// ─── Subscription ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionState {
    NotStarted,
    Pending,
    Active,
    ActiveCancelled,
    Cancelled,
    Expired,
    Invalid,
    NotEnoughFunds,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub daisy_id: String,
    /// Subscriber address.
    pub account: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub price: Option<Amount>,
    #[serde(default, deserialize_with = "serde_util::opt_string_or_number::deserialize")]
    pub periods: Option<String>,
    #[serde(default)]
    pub period_unit: Option<String>,
    #[serde(default, deserialize_with = "serde_util::opt_string_or_number::deserialize")]
    pub max_executions: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default, deserialize_with = "serde_util::opt_string_or_number::deserialize")]
    pub signature_expires_at: Option<String>,
    #[serde(default, deserialize_with = "serde_util::opt_string_or_number::deserialize")]
    pub next_payment: Option<String>,
    #[serde(default)]
    pub next_payment_date: Option<DateTime<Utc>>,
    /// Subscription identifier on chain (`bytes32`).
    #[serde(default)]
    pub on_chain_id: Option<String>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    pub state: SubscriptionState,
    #[serde(default)]
    pub cancel_state: Option<String>,
    #[serde(default)]
    pub plan: Option<PlanRef>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One billing cycle (or lifecycle action) of a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: String,
    pub tx_hash: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub fee_recipient: Option<String>,
    #[serde(default)]
    pub fee_amount: Option<Amount>,
    #[serde(default)]
    pub payment_recipient: Option<String>,
    #[serde(default)]
    pub payment_amount: Option<Amount>,
    #[serde(default, deserialize_with = "serde_util::opt_string_or_number::deserialize")]
    pub next_payment: Option<String>,
    #[serde(default)]
    pub on_chain_created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reason: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// How to find a single subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionLookup {
    DaisyId(String),
    OnChainId(String),
}

impl SubscriptionLookup {
    pub(crate) fn path(&self) -> Result<String, SdkError> {
        let (prefix, key) = match self {
            Self::DaisyId(id) => ("", id),
            Self::OnChainId(id) => ("hash/", id),
        };
        if key.trim().is_empty() {
            return Err(SdkError::Validation("missing daisyId or onChainId".into()));
        }
        Ok(format!("/subscriptions/{}{}/", prefix, urlencoding::encode(key)))
    }
}

// ─── Invitation ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub identifier: String,
    #[serde(default)]
    pub max_usages: u64,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub automatic: Option<bool>,
    #[serde(default)]
    pub share_path: Option<String>,
    #[serde(default, rename = "shareURL")]
    pub share_url: Option<String>,
    #[serde(default, rename = "callbackURL")]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub callback_extra: Option<serde_json::Value>,
    #[serde(default, rename = "redirectURLDefault")]
    pub redirect_url_default: Option<String>,
    #[serde(default)]
    pub plan: Option<PlanRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
