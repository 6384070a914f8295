//! Request bodies and filters for the subscriptions endpoints.

use serde::Serialize;

use super::agreement::{CancelAgreement, SignedAgreement, SubscriptionAgreement};
use super::SubscriptionState;

/// GET `/subscriptions/` filter. Every field accepts several values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubscriptionFilter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub account: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub state: Vec<SubscriptionState>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub token: Vec<String>,
    #[serde(rename = "planId", skip_serializing_if = "Vec::is_empty")]
    pub plan_id: Vec<String>,
}

impl SubscriptionFilter {
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account.push(account.into());
        self
    }

    pub fn state(mut self, state: SubscriptionState) -> Self {
        self.state.push(state);
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token.push(token.into());
        self
    }

    pub fn plan_id(mut self, plan_id: impl Into<String>) -> Self {
        self.plan_id.push(plan_id.into());
        self
    }
}

/// POST `/subscriptions/` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub agreement: SubscriptionAgreement,
    /// Receipt of the token approval transaction, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<serde_json::Value>,
    pub signature: String,
    /// Authorizer signature, required for private plans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_signature: Option<String>,
}

impl Submission {
    pub fn with_receipt(mut self, receipt: serde_json::Value) -> Self {
        self.receipt = Some(receipt);
        self
    }

    pub fn with_auth_signature(mut self, signature: impl Into<String>) -> Self {
        self.auth_signature = Some(signature.into());
        self
    }
}

impl From<SignedAgreement<SubscriptionAgreement>> for Submission {
    fn from(signed: SignedAgreement<SubscriptionAgreement>) -> Self {
        Self {
            agreement: signed.agreement,
            receipt: None,
            signature: signed.signature,
            auth_signature: None,
        }
    }
}

/// POST `/subscriptions/cancel/` body.
pub type CancelSubmission = SignedAgreement<CancelAgreement>;

/// Parameters for `create_invitation`.
#[derive(Debug, Clone, PartialEq)]
pub struct InvitationParams {
    /// `0` means unlimited.
    pub max_usages: u64,
    pub active: bool,
    /// Echoed back to `callback_url`.
    pub callback_extra: serde_json::Value,
    pub callback_url: Option<String>,
    pub redirect_url_default: Option<String>,
}

impl Default for InvitationParams {
    fn default() -> Self {
        Self {
            max_usages: 0,
            active: true,
            callback_extra: serde_json::Value::Object(Default::default()),
            callback_url: None,
            redirect_url_default: None,
        }
    }
}

/// POST `/plans/{id}/invitations/` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationRequest {
    pub max_usages: u64,
    pub active: bool,
    pub callback_extra: serde_json::Value,
    #[serde(rename = "callbackURL", skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(rename = "redirectURLDefault", skip_serializing_if = "Option::is_none")]
    pub redirect_url_default: Option<String>,
}

impl From<InvitationParams> for InvitationRequest {
    fn from(params: InvitationParams) -> Self {
        Self {
            max_usages: params.max_usages,
            active: params.active,
            callback_extra: params.callback_extra,
            callback_url: params.callback_url,
            redirect_url_default: params.redirect_url_default,
        }
    }
}
