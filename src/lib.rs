//! # Daisy SDK
//!
//! A Rust SDK for Daisy Payments: one-time payment invoices, token
//! subscriptions authorized with EIP-712 signatures, and on-chain
//! confirmation tracking.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core**: shared types, EIP-712 encoding, signers, domain models, webhooks (always available)
//! 2. **HTTP API**: `DaisyHttp` over a pluggable `Transport`, plus GraphQL
//! 3. **High-Level Client**: `DaisyClient` with `payments()`, `subscriptions()` and `graphql()`
//! 4. **Poller**: `ConfirmationPoller` streaming confirmation counts for a mined transaction
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use daisy_sdk::prelude::*;
//!
//! let client = DaisyClient::builder()
//!     .credentials(Credentials::with_secret("manager-id", "secret")?)
//!     .build()?;
//!
//! let manager = client.subscriptions().sync().await?;
//! let plan = manager.plan("plan-id").cloned().unwrap();
//!
//! let signer = Signer::from(LocalSigner::from_hex(PRIVATE_KEY)?);
//! let signed = client
//!     .subscriptions()
//!     .sign_subscription(&signer, &plan, SubscriptionOptions::default())
//!     .await?;
//! let created = client.subscriptions().submit(&signed.into()).await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and serde helpers.
pub mod shared;

/// EIP-712 typed data: schemas, domains, hashing, nonces.
pub mod eip712;

/// Local-key and wallet-delegated signers.
pub mod signer;

/// Domain modules: payments and subscriptions (types, wire types, clients).
pub mod domain;

/// Webhook payload verification.
pub mod webhooks;

/// Unified SDK error types.
pub mod error;

/// Network URL constants.
pub mod network;

/// Manager credentials.
pub mod auth;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client, transport abstraction and query encoding.
#[cfg(feature = "http")]
pub mod http;

/// GraphQL request/response types and client.
pub mod graphql;

// ── Layer 3: High-Level Client ───────────────────────────────────────────────

/// `DaisyClient`, the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Layer 4: Poller ──────────────────────────────────────────────────────────

/// Transaction confirmation poller.
#[cfg(feature = "http")]
pub mod poller;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared
    pub use crate::shared::{Amount, ZERO_ADDRESS};

    // Auth
    pub use crate::auth::Credentials;

    // EIP-712
    pub use crate::eip712::schema::DAISY_TYPES;
    pub use crate::eip712::{Domain, TypeSchema, TypedDataEnvelope, TypedField};

    // Signers
    pub use crate::signer::{
        recover_typed_data_signer, LocalSigner, RemoteSigner, Signer, WalletProvider,
    };

    // Domain types: payments
    pub use crate::domain::payments::wire::InvoiceFilter;
    pub use crate::domain::payments::{
        CreateInvoice, InvoiceLookup, InvoiceState, PaymentGroup, PaymentInvoice, PaymentReceipt,
    };

    // Domain types: subscriptions
    pub use crate::domain::subscriptions::wire::{
        CancelSubmission, InvitationParams, Submission, SubscriptionFilter,
    };
    pub use crate::domain::subscriptions::{
        AuthorizeOptions, CancelAgreement, CancelOptions, Invitation, Plan, Receipt,
        SignedAgreement, Subscription, SubscriptionAgreement, SubscriptionLookup,
        SubscriptionManager, SubscriptionOptions, SubscriptionState,
    };

    // Webhooks
    pub use crate::webhooks::WebhookPayload;

    // Errors
    pub use crate::error::{
        GraphQlError, HttpError, PollError, SdkError, SignerError, TypedDataError, WebhookError,
    };

    // High-level client
    #[cfg(feature = "http")]
    pub use crate::client::{DaisyClient, DaisyClientBuilder};

    #[cfg(feature = "http")]
    pub use crate::http::{ReqwestTransport, Transport};

    #[cfg(feature = "http")]
    pub use crate::signer::HttpWallet;

    // Poller
    #[cfg(feature = "http")]
    pub use crate::poller::{
        AlloyChainReader, ChainReader, ConfirmationPoller, PollEvent, PollerHandle, PollerState,
        TxTarget,
    };
}
