//! Typed-data signers.
//!
//! [`Signer`] is a tagged variant over the two backends:
//!
//! - [`LocalSigner`]: holds a secp256k1 private key and signs synchronously.
//!   Used server-side for authorization signatures on private plans.
//! - [`RemoteSigner`]: forwards the envelope to a [`WalletProvider`] and waits
//!   for a single response. Used for end-user signatures.
//!
//! Both produce a `0x`-prefixed 65-byte signature hex string.

pub mod local;
pub mod remote;

pub use local::{recover_typed_data_signer, LocalSigner};
#[cfg(feature = "http")]
pub use remote::HttpWallet;
pub use remote::{RemoteSigner, WalletProvider, DEFAULT_SIGN_METHOD};

use serde_json::Value;

use crate::eip712::{schema::DAISY_TYPES, Domain, TypedDataEnvelope};
use crate::error::SignerError;

#[derive(Debug, Clone)]
pub enum Signer {
    Local(LocalSigner),
    Remote(RemoteSigner),
}

impl Signer {
    /// Address whose signature is produced.
    pub fn address(&self) -> String {
        match self {
            Signer::Local(local) => local.address().to_checksum(None),
            Signer::Remote(remote) => remote.account().to_string(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Signer::Local(_))
    }

    /// Sign an already-built envelope.
    pub async fn sign(&self, envelope: &TypedDataEnvelope) -> Result<String, SignerError> {
        match self {
            Signer::Local(local) => local.sign_envelope(envelope),
            Signer::Remote(remote) => remote.sign_envelope(envelope).await,
        }
    }

    /// Build a Daisy envelope for `primary_type` and sign it.
    pub async fn sign_typed_data(
        &self,
        domain: &Domain,
        primary_type: &str,
        message: Value,
    ) -> Result<String, SignerError> {
        let envelope =
            crate::eip712::encode(DAISY_TYPES.clone(), domain.clone(), primary_type, message)?;
        self.sign(&envelope).await
    }
}

impl From<LocalSigner> for Signer {
    fn from(signer: LocalSigner) -> Self {
        Signer::Local(signer)
    }
}

impl From<RemoteSigner> for Signer {
    fn from(signer: RemoteSigner) -> Self {
        Signer::Remote(signer)
    }
}
