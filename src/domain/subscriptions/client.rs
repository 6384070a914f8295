//! Subscriptions sub-client: manager, subscriptions, submissions,
//! invitations and agreement signing.

use serde_json::Value;

use crate::client::DaisyClient;
use crate::domain::subscriptions::agreement::{
    AuthorizeOptions, CancelAgreement, CancelOptions, SignedAgreement, SubscriptionAgreement,
    SubscriptionOptions,
};
use crate::domain::subscriptions::wire::{
    CancelSubmission, InvitationParams, InvitationRequest, Submission, SubscriptionFilter,
};
use crate::domain::subscriptions::{
    Invitation, Plan, Receipt, Subscription, SubscriptionLookup, SubscriptionManager,
};
use crate::eip712::schema::{CANCEL_SUBSCRIPTION_TYPE, SUBSCRIPTION_TYPE};
use crate::eip712::Domain;
use crate::error::SdkError;
use crate::shared::is_unset_address;
use crate::signer::{LocalSigner, Signer};

pub struct Subscriptions<'a> {
    pub(crate) client: &'a DaisyClient,
}

impl<'a> Subscriptions<'a> {
    // ── Manager ──────────────────────────────────────────────────────────

    /// Fetch the manager and its plans (GET `/`).
    pub async fn get_data(&self) -> Result<SubscriptionManager, SdkError> {
        Ok(self.client.http.get_data::<_, ()>("/", None).await?)
    }

    /// Fetch the manager and cache it on the client.
    pub async fn sync(&self) -> Result<SubscriptionManager, SdkError> {
        let manager = self.get_data().await?;

        if is_unset_address(manager.token_address.as_deref()) {
            tracing::warn!("Subscription manager has no token address; set one in the dashboard");
        } else if is_unset_address(manager.wallet_address.as_deref()) {
            tracing::warn!("Subscription manager has no wallet address; set one in the dashboard");
        }

        *self.client.subscription_manager.write().await = Some(manager.clone());
        Ok(manager)
    }

    /// The manager cached by the last [`Subscriptions::sync`].
    pub async fn manager(&self) -> Option<SubscriptionManager> {
        self.client.subscription_manager.read().await.clone()
    }

    async fn cached_or_fetch(&self) -> Result<SubscriptionManager, SdkError> {
        if let Some(manager) = self.manager().await {
            return Ok(manager);
        }
        self.get_data().await
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub async fn get_subscriptions(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<Subscription>, SdkError> {
        Ok(self
            .client
            .http
            .get_data("/subscriptions/", Some(filter))
            .await?)
    }

    /// `Ok(None)` when no subscription matches.
    pub async fn get_subscription(
        &self,
        lookup: &SubscriptionLookup,
    ) -> Result<Option<Subscription>, SdkError> {
        let path = lookup.path()?;
        Ok(self.client.http.get_data::<_, ()>(&path, None).await?)
    }

    pub async fn get_receipts(&self, lookup: &SubscriptionLookup) -> Result<Vec<Receipt>, SdkError> {
        let path = format!("{}receipts/", lookup.path()?);
        Ok(self.client.http.get_data::<_, ()>(&path, None).await?)
    }

    // ── Submissions ──────────────────────────────────────────────────────

    /// Submit a signed agreement (POST `/subscriptions/`). Returns the full
    /// response body; the created subscription is `PENDING`.
    pub async fn submit(&self, submission: &Submission) -> Result<Value, SdkError> {
        tracing::debug!(subscriber = %submission.agreement.subscriber, "Submitting subscription");
        Ok(self.client.http.post("/subscriptions/", submission).await?.data)
    }

    /// Submit a signed cancellation (POST `/subscriptions/cancel/`).
    pub async fn submit_cancel(&self, submission: &CancelSubmission) -> Result<Value, SdkError> {
        tracing::debug!(subscription = %submission.agreement.subscription_id, "Submitting cancellation");
        Ok(self
            .client
            .http
            .post("/subscriptions/cancel/", submission)
            .await?
            .data)
    }

    /// Create an invitation link for a plan. Requires the secret key.
    pub async fn create_invitation(
        &self,
        plan_id: &str,
        params: InvitationParams,
    ) -> Result<Invitation, SdkError> {
        if plan_id.trim().is_empty() {
            return Err(SdkError::Validation("missing plan id".into()));
        }
        let path = format!("/plans/{}/invitations/", urlencoding::encode(plan_id));
        let body = InvitationRequest::from(params);
        Ok(self.client.http.post_data(&path, &body).await?)
    }

    // ── Signing ──────────────────────────────────────────────────────────

    /// Authorization signature admitting `agreement.subscriber` to a
    /// private plan, signed by the manager's authorizer key.
    ///
    /// Always fetches the manager so the domain uses the deployed contract.
    pub async fn authorize(
        &self,
        authorizer: &LocalSigner,
        agreement: &SubscriptionAgreement,
        opts: AuthorizeOptions,
    ) -> Result<String, SdkError> {
        let manager = self.get_data().await?;
        let domain = Domain::new(manager.contract_address()?);

        let agreement = if opts.allow_any_address {
            agreement.for_any_subscriber()
        } else {
            agreement.clone()
        };
        Ok(authorizer.sign_typed_data(&domain, SUBSCRIPTION_TYPE, agreement.to_message())?)
    }

    /// Build and sign a `Subscription` agreement for `plan` on behalf of
    /// the signer's address.
    pub async fn sign_subscription(
        &self,
        signer: &Signer,
        plan: &Plan,
        opts: SubscriptionOptions,
    ) -> Result<SignedAgreement<SubscriptionAgreement>, SdkError> {
        let manager = self.cached_or_fetch().await?;
        let domain = Domain::new(manager.contract_address()?);
        let agreement =
            SubscriptionAgreement::for_plan(&manager, plan, &signer.address(), opts)?;

        let signature = signer
            .sign_typed_data(&domain, SUBSCRIPTION_TYPE, agreement.to_message())
            .await?;
        Ok(SignedAgreement {
            agreement,
            signature,
        })
    }

    /// Build and sign a `CancelSubscription` agreement.
    pub async fn sign_cancel(
        &self,
        signer: &Signer,
        subscription: &Subscription,
        opts: CancelOptions,
    ) -> Result<SignedAgreement<CancelAgreement>, SdkError> {
        let agreement = CancelAgreement::for_subscription(subscription, opts)?;
        let manager = self.cached_or_fetch().await?;
        let domain = Domain::new(manager.contract_address()?);

        let signature = signer
            .sign_typed_data(&domain, CANCEL_SUBSCRIPTION_TYPE, agreement.to_message())
            .await?;
        Ok(SignedAgreement {
            agreement,
            signature,
        })
    }
}
