//! Agreements: the typed messages a subscriber (or authorizer) signs.
//!
//! Field names and order follow the `Subscription` and `CancelSubscription`
//! types in [`crate::eip712::schema::DAISY_TYPES`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Plan, Subscription, SubscriptionManager};
use crate::eip712::{agreement_nonce, signature_expires_at};
use crate::error::SdkError;
use crate::shared::{is_unset_address, ZERO_ADDRESS};

/// `Subscription` message. Numbers are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionAgreement {
    pub subscriber: String,
    pub token: String,
    pub price: String,
    pub periods: String,
    pub period_unit: String,
    pub max_executions: String,
    pub signature_expires_at: String,
    /// Plan `onChainId`.
    pub plan: String,
    pub nonce: String,
}

/// `CancelSubscription` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelAgreement {
    /// Subscription `onChainId`.
    pub subscription_id: String,
    pub signature_expires_at: String,
}

/// An agreement together with its signature, ready to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAgreement<A> {
    pub agreement: A,
    pub signature: String,
}

/// Overrides for [`SubscriptionAgreement::for_plan`].
#[derive(Debug, Clone, Default)]
pub struct SubscriptionOptions {
    pub signature_expires_at: Option<DateTime<Utc>>,
    /// Defaults to a fresh 32-byte nonce.
    pub nonce: Option<String>,
    /// Defaults to the manager's token.
    pub token: Option<String>,
    /// Defaults to the plan's `maxExecutions`, else `0`.
    pub max_executions: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct CancelOptions {
    pub signature_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizeOptions {
    /// Sign with the zero address as subscriber, so the authorization
    /// admits whichever account submits it.
    pub allow_any_address: bool,
}

fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str, SdkError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| SdkError::Validation(format!("missing {}", what)))
}

impl SubscriptionAgreement {
    /// Build the agreement `subscriber` signs to join `plan`.
    pub fn for_plan(
        manager: &SubscriptionManager,
        plan: &Plan,
        subscriber: &str,
        opts: SubscriptionOptions,
    ) -> Result<Self, SdkError> {
        if subscriber.trim().is_empty() {
            return Err(SdkError::Validation("missing subscriber".into()));
        }
        let token = match opts.token {
            Some(token) => token,
            None if !is_unset_address(manager.token_address.as_deref()) => {
                manager.token_address.clone().unwrap_or_default()
            }
            None => return Err(SdkError::Validation("manager has no token address".into())),
        };
        let max_executions = match opts.max_executions {
            Some(n) => n.to_string(),
            None => plan.max_executions.clone().unwrap_or_else(|| "0".to_string()),
        };

        Ok(Self {
            subscriber: subscriber.to_string(),
            token,
            price: plan.price.to_string(),
            periods: required(plan.periods.as_deref(), "plan periods")?.to_string(),
            period_unit: required(plan.period_unit.as_deref(), "plan periodUnit")?.to_string(),
            max_executions,
            signature_expires_at: signature_expires_at(opts.signature_expires_at),
            plan: required(plan.on_chain_id.as_deref(), "plan onChainId")?.to_string(),
            nonce: opts.nonce.unwrap_or_else(agreement_nonce),
        })
    }

    /// Copy with the zero address as subscriber.
    pub fn for_any_subscriber(&self) -> Self {
        Self {
            subscriber: ZERO_ADDRESS.to_string(),
            ..self.clone()
        }
    }

    pub fn to_message(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl CancelAgreement {
    pub fn for_subscription(
        subscription: &Subscription,
        opts: CancelOptions,
    ) -> Result<Self, SdkError> {
        Ok(Self {
            subscription_id: required(subscription.on_chain_id.as_deref(), "subscription onChainId")?
                .to_string(),
            signature_expires_at: signature_expires_at(opts.signature_expires_at),
        })
    }

    pub fn to_message(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
