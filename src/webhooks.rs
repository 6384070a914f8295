//! Webhook signature verification.
//!
//! Daisy signs the canonical JSON of each webhook body (keys sorted at every
//! depth, compact) and sends the base64 digest alongside it.
//!
//! Two forms are not reproduced here. Arrays stay arrays: a signer that
//! rewrites arrays of primitives into index-keyed objects (`{"0":"a"}`)
//! produces different bytes. Numbers keep `serde_json` formatting, so a
//! float like `1.0` is written `1.0` where a JavaScript signer writes `1`.
//! Bodies that rely on either form will not verify as `Value`; pass the
//! exact signed string as `message` instead.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use serde::Deserialize;
use serde_json::{Map, Value};
use sha2::Sha256;

use crate::error::WebhookError;

pub const DEFAULT_ALGORITHM: &str = "RSA-SHA256";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// The webhook body. Strings are verified verbatim.
    pub message: Value,
    /// Base64 signature.
    pub digest: String,
    /// PEM public key (SPKI or PKCS#1).
    pub public_key: String,
    #[serde(default)]
    pub algorithm: Option<String>,
}

/// Sort object keys recursively, through arrays as well.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Bytes that were signed for `message`.
pub fn canonical_bytes(message: &Value) -> Vec<u8> {
    match message {
        Value::String(s) => s.as_bytes().to_vec(),
        other => canonicalize(other).to_string().into_bytes(),
    }
}

/// `Ok(true)` if `digest` is a valid signature over the canonical message.
///
/// Malformed keys or digests are errors; a well-formed signature that does
/// not match is `Ok(false)`.
pub fn verify(payload: &WebhookPayload) -> Result<bool, WebhookError> {
    let algorithm = payload.algorithm.as_deref().unwrap_or(DEFAULT_ALGORITHM);
    if !is_rsa_sha256(algorithm) {
        return Err(WebhookError::UnsupportedAlgorithm(algorithm.to_string()));
    }

    let public_key = parse_public_key(&payload.public_key)?;
    let raw = STANDARD
        .decode(payload.digest.trim())
        .map_err(|e| WebhookError::InvalidDigest(e.to_string()))?;
    let signature =
        Signature::try_from(raw.as_slice()).map_err(|e| WebhookError::InvalidDigest(e.to_string()))?;

    let verifying_key = VerifyingKey::<Sha256>::new(public_key);
    let verified = verifying_key
        .verify(&canonical_bytes(&payload.message), &signature)
        .is_ok();
    tracing::debug!(algorithm, verified, "Webhook signature checked");
    Ok(verified)
}

fn is_rsa_sha256(algorithm: &str) -> bool {
    matches!(
        algorithm.to_ascii_lowercase().as_str(),
        "rsa-sha256" | "sha256" | "sha256withrsaencryption"
    )
}

fn parse_public_key(pem: &str) -> Result<RsaPublicKey, WebhookError> {
    let pem = pem.trim();
    RsaPublicKey::from_public_key_pem(pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
        .map_err(|e| WebhookError::InvalidPublicKey(e.to_string()))
}
