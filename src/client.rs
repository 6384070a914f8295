//! High-level client: `DaisyClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, the synced manager state and the accessors.

use crate::auth::Credentials;
use crate::domain::payments::client::Payments;
use crate::domain::payments::PaymentGroup;
use crate::domain::subscriptions::client::Subscriptions;
use crate::domain::subscriptions::SubscriptionManager;
use crate::error::{HttpError, SdkError};
use crate::graphql::client::GraphQl;
use crate::http::{DaisyHttp, ReqwestTransport, Transport};

use async_lock::RwLock;
use std::sync::Arc;
use std::time::Duration;

// Re-export sub-client types for convenience.
pub use crate::domain::payments::client::Payments as PaymentsClient;
pub use crate::domain::subscriptions::client::Subscriptions as SubscriptionsClient;
pub use crate::graphql::client::GraphQl as GraphQlClient;

/// The primary entry point for the Daisy SDK.
///
/// `client.payments()`, `client.subscriptions()` and `client.graphql()` borrow
/// the same HTTP client and credentials.
#[derive(Clone)]
pub struct DaisyClient {
    pub(crate) http: DaisyHttp,
    /// Set by `payments().sync()`.
    pub(crate) payment_group: Arc<RwLock<Option<PaymentGroup>>>,
    /// Set by `subscriptions().sync()`.
    pub(crate) subscription_manager: Arc<RwLock<Option<SubscriptionManager>>>,
}

impl DaisyClient {
    pub fn builder() -> DaisyClientBuilder {
        DaisyClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn payments(&self) -> Payments<'_> {
        Payments { client: self }
    }

    pub fn subscriptions(&self) -> Subscriptions<'_> {
        Subscriptions { client: self }
    }

    pub fn graphql(&self) -> GraphQl<'_> {
        GraphQl { client: self }
    }

    /// Raw HTTP access for endpoints without a typed wrapper.
    pub fn http(&self) -> &DaisyHttp {
        &self.http
    }

    pub fn credentials(&self) -> &Credentials {
        self.http.credentials()
    }

    /// Forget synced manager state.
    pub async fn clear_cache(&self) {
        *self.payment_group.write().await = None;
        *self.subscription_manager.write().await = None;
    }
}

impl std::fmt::Debug for DaisyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaisyClient")
            .field("base_url", &self.http.base_url())
            .field("credentials", self.http.credentials())
            .finish()
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct DaisyClientBuilder {
    base_url: String,
    credentials: Option<Credentials>,
    timeout: Option<Duration>,
    headers: Vec<(String, String)>,
    transport: Option<Arc<dyn Transport>>,
}

impl Default for DaisyClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            credentials: None,
            timeout: None,
            headers: Vec::new(),
            transport: None,
        }
    }
}

impl DaisyClientBuilder {
    /// Credentials and base URL from `DAISY_ID`, `DAISY_SECRET_KEY` and
    /// `DAISY_BASE_URL`.
    pub fn from_env() -> Result<Self, SdkError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DaisyClientBuilder::from_env`] over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SdkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_lookup(&lookup)?;
        let mut builder = Self::default().credentials(credentials);
        if let Some(url) = lookup(crate::network::BASE_URL_ENV).filter(|u| !u.is_empty()) {
            builder = builder.base_url(&url);
        }
        Ok(builder)
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Request timeout for the default transport. Ignored with a custom transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Extra header sent with every request. Replaces a default of the same name.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<DaisyClient, SdkError> {
        let credentials = self
            .credentials
            .ok_or_else(|| SdkError::Validation("missing identifier".to_string()))?;

        for (name, value) in &self.headers {
            validate_header(name, value)?;
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.timeout)?),
        };

        Ok(DaisyClient {
            http: DaisyHttp::new(&self.base_url, credentials, transport, self.headers),
            payment_group: Arc::new(RwLock::new(None)),
            subscription_manager: Arc::new(RwLock::new(None)),
        })
    }
}

fn validate_header(name: &str, value: &str) -> Result<(), HttpError> {
    reqwest::header::HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
        HttpError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        }
    })?;
    reqwest::header::HeaderValue::from_str(value).map_err(|e| HttpError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}
