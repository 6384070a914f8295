//! Wallet-provider signer.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::eip712::TypedDataEnvelope;
use crate::error::SignerError;

/// RPC method used for typed-data signing unless overridden.
pub const DEFAULT_SIGN_METHOD: &str = "eth_signTypedData_v4";

/// An external wallet exposing EIP-1193 style `request(method, params)`.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Returns the `result` value, or [`SignerError::Rejected`] when the
    /// wallet answers with an error.
    async fn request(&self, method: &str, params: Value) -> Result<Value, SignerError>;
}

/// Delegates signing to a [`WalletProvider`] on behalf of `account`.
#[derive(Clone)]
pub struct RemoteSigner {
    provider: Arc<dyn WalletProvider>,
    account: String,
    method: String,
}

impl RemoteSigner {
    pub fn new(provider: Arc<dyn WalletProvider>, account: impl Into<String>) -> Self {
        Self {
            provider,
            account: account.into(),
            method: DEFAULT_SIGN_METHOD.to_string(),
        }
    }

    /// Override the RPC method (e.g. `eth_signTypedData_v3` for older wallets).
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// One provider round trip: `method(account, JSON.stringify(envelope))`.
    ///
    /// The envelope is validated first; a malformed envelope never reaches
    /// the wallet. Provider failures are returned as-is, never retried.
    pub async fn sign_envelope(&self, envelope: &TypedDataEnvelope) -> Result<String, SignerError> {
        envelope.validate()?;

        let params = json!([self.account, envelope.to_json_string()]);
        tracing::debug!(method = %self.method, account = %self.account, "Requesting typed-data signature");
        let result = self.provider.request(&self.method, params).await?;

        match result {
            Value::String(signature) => Ok(signature),
            other => Err(SignerError::InvalidSignature(format!(
                "expected a hex string, got {}",
                other
            ))),
        }
    }
}

impl std::fmt::Debug for RemoteSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSigner")
            .field("account", &self.account)
            .field("method", &self.method)
            .finish()
    }
}

// ─── HttpWallet ──────────────────────────────────────────────────────────────

/// JSON-RPC over HTTP wallet (a node with unlocked accounts, or a signing proxy).
#[cfg(feature = "http")]
pub struct HttpWallet {
    url: String,
    client: reqwest::Client,
    next_id: std::sync::atomic::AtomicU64,
}

#[cfg(feature = "http")]
impl HttpWallet {
    pub fn new(url: &str) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    pub fn with_client(url: &str, client: reqwest::Client) -> Self {
        Self {
            url: url.to_string(),
            client,
            next_id: std::sync::atomic::AtomicU64::new(1),
        }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl WalletProvider for HttpWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, SignerError> {
        let id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SignerError::Transport(e.to_string()))?;
        let payload: Value = resp
            .json()
            .await
            .map_err(|e| SignerError::Transport(e.to_string()))?;

        rpc_result(payload)
    }
}

/// Split a JSON-RPC response into its `result` or a rejection.
pub(crate) fn rpc_result(mut payload: Value) -> Result<Value, SignerError> {
    if let Some(error) = payload.get("error").filter(|e| !e.is_null()) {
        return Err(SignerError::Rejected {
            code: error.get("code").and_then(Value::as_i64),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string()),
        });
    }
    match payload.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(SignerError::InvalidSignature(
            "response has neither result nor error".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eip712::{encode, schema::DAISY_TYPES, Domain};
    use std::sync::Mutex;

    struct StubWallet {
        calls: Mutex<Vec<(String, Value)>>,
        answer: Result<Value, (i64, &'static str)>,
    }

    #[async_trait]
    impl WalletProvider for StubWallet {
        async fn request(&self, method: &str, params: Value) -> Result<Value, SignerError> {
            self.calls.lock().unwrap().push((method.to_string(), params));
            match &self.answer {
                Ok(v) => Ok(v.clone()),
                Err((code, message)) => Err(SignerError::Rejected {
                    code: Some(*code),
                    message: message.to_string(),
                }),
            }
        }
    }

    fn envelope() -> TypedDataEnvelope {
        encode(
            DAISY_TYPES.clone(),
            Domain::new("0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063"),
            "CancelSubscription",
            json!({ "subscriptionId": "0x01", "signatureExpiresAt": "1700000000" }),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_sign_sends_account_and_serialized_envelope() {
        let wallet = Arc::new(StubWallet {
            calls: Mutex::new(Vec::new()),
            answer: Ok(json!("0xsig")),
        });
        let signer = RemoteSigner::new(wallet.clone(), "0xabc");

        let sig = signer.sign_envelope(&envelope()).await.unwrap();
        assert_eq!(sig, "0xsig");

        let calls = wallet.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, DEFAULT_SIGN_METHOD);
        assert_eq!(calls[0].1[0], "0xabc");
        let sent: Value = serde_json::from_str(calls[0].1[1].as_str().unwrap()).unwrap();
        assert_eq!(sent["primaryType"], "CancelSubscription");
        assert!(sent["types"]["EIP712Domain"].is_array());
    }

    #[tokio::test]
    async fn test_rejection_surfaces_once() {
        let wallet = Arc::new(StubWallet {
            calls: Mutex::new(Vec::new()),
            answer: Err((4001, "User denied message signature")),
        });
        let signer = RemoteSigner::new(wallet.clone(), "0xabc").with_method("eth_signTypedData_v3");

        let err = signer.sign_envelope(&envelope()).await.unwrap_err();
        assert!(matches!(err, SignerError::Rejected { code: Some(4001), .. }));

        let calls = wallet.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "eth_signTypedData_v3");
    }

    #[tokio::test]
    async fn test_invalid_envelope_never_reaches_wallet() {
        let wallet = Arc::new(StubWallet {
            calls: Mutex::new(Vec::new()),
            answer: Ok(json!("0xsig")),
        });
        let signer = RemoteSigner::new(wallet.clone(), "0xabc");
        let mut bad = envelope();
        bad.primary_type = "Unknown".to_string();

        let err = signer.sign_envelope(&bad).await.unwrap_err();
        assert!(matches!(err, SignerError::TypedData(_)));
        assert!(wallet.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_rpc_result_parsing() {
        assert_eq!(
            rpc_result(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x01" })).unwrap(),
            json!("0x01")
        );
        let err = rpc_result(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "wrong network" }
        }))
        .unwrap_err();
        match err {
            SignerError::Rejected { code, message } => {
                assert_eq!(code, Some(-32000));
                assert_eq!(message, "wrong network");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
