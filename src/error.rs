//! Unified SDK error types.

use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Typed data error: {0}")]
    TypedData(#[from] TypedDataError),

    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("GraphQL error: {0}")]
    GraphQl(#[from] GraphQlError),

    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl SdkError {
    /// The structured body returned by the backend, if this is an API error.
    pub fn api_body(&self) -> Option<&serde_json::Value> {
        match self {
            SdkError::Http(HttpError::Api { body, .. }) => Some(body),
            _ => None,
        }
    }
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    /// Network failure or no response received (reqwest transport).
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Network failure reported by a custom transport.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx response. `message` is the server's `message` field.
    #[error("{message}")]
    Api {
        status: u16,
        status_text: String,
        message: String,
        body: serde_json::Value,
    },

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// A request body or query could not be serialized. Nothing was sent.
    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

impl HttpError {
    /// HTTP status code for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// EIP-712 schema / message errors. Always raised before any I/O.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypedDataError {
    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Field mismatch: `{type_name}` requires field `{field}`")]
    FieldMismatch { type_name: String, field: String },

    #[error("Invalid value for `{field}` ({kind}): {reason}")]
    InvalidValue {
        field: String,
        kind: String,
        reason: String,
    },

    #[error("Cyclic type reference through `{0}`")]
    CyclicType(String),
}

/// Signing errors.
#[derive(Error, Debug)]
pub enum SignerError {
    /// The wallet provider declined or failed to sign.
    #[error("Signing request rejected: {message}")]
    Rejected { code: Option<i64>, message: String },

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Wallet provider unreachable: {0}")]
    Transport(String),

    #[error(transparent)]
    TypedData(#[from] TypedDataError),
}

/// First error of a GraphQL `errors` array.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct GraphQlError {
    pub message: String,
    pub locations: Option<serde_json::Value>,
    pub path: Option<serde_json::Value>,
    pub extensions: Option<serde_json::Value>,
    /// Partial `data` returned alongside the errors.
    pub data: Option<serde_json::Value>,
}

/// Webhook verification errors.
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid digest: {0}")]
    InvalidDigest(String),
}

/// Per-cycle confirmation poller errors. Reported as events; polling continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid transaction target: {0}")]
    InvalidTarget(String),
}
