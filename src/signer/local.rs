//! Private-key signer.

use alloy::primitives::{Address, Signature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use serde_json::Value;

use crate::eip712::{self, schema::DAISY_TYPES, Domain, TypedDataEnvelope};
use crate::error::SignerError;

/// Signs EIP-712 digests with an in-memory secp256k1 key. No I/O.
#[derive(Clone)]
pub struct LocalSigner {
    inner: PrivateKeySigner,
}

impl LocalSigner {
    pub fn from_bytes(key: &[u8]) -> Result<Self, SignerError> {
        if key.len() != 32 {
            return Err(SignerError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                key.len()
            )));
        }
        let inner = PrivateKeySigner::from_bytes(&B256::from_slice(key))
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Hex private key, with or without `0x`.
    pub fn from_hex(key: &str) -> Result<Self, SignerError> {
        let digits = key.trim().trim_start_matches("0x");
        let bytes = hex::decode(digits).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn random() -> Self {
        Self {
            inner: PrivateKeySigner::random(),
        }
    }

    pub fn address(&self) -> Address {
        self.inner.address()
    }

    /// Sign a Daisy typed message against `domain`.
    pub fn sign_typed_data(
        &self,
        domain: &Domain,
        primary_type: &str,
        message: Value,
    ) -> Result<String, SignerError> {
        let envelope =
            eip712::encode(DAISY_TYPES.clone(), domain.clone(), primary_type, message)?;
        self.sign_envelope(&envelope)
    }

    /// Sign `keccak256(0x1901 ‖ domainSeparator ‖ hashStruct(message))`.
    pub fn sign_envelope(&self, envelope: &TypedDataEnvelope) -> Result<String, SignerError> {
        let digest = envelope.signing_hash()?;
        let signature = self
            .inner
            .sign_hash_sync(&digest)
            .map_err(|e| SignerError::Signing(e.to_string()))?;
        Ok(encode_signature_hex(&signature))
    }

    /// `hashStruct` of a Daisy typed message, as `0x` hex.
    pub fn hash(&self, primary_type: &str, message: &Value) -> Result<String, SignerError> {
        Ok(eip712::hash_struct(&DAISY_TYPES, primary_type, message)?.to_string())
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address())
            .finish()
    }
}

/// 65 bytes `r ‖ s ‖ v` with `v ∈ {27, 28}`, as `0x` + 130 hex chars.
pub fn encode_signature_hex(signature: &Signature) -> String {
    format!("0x{}", hex::encode(signature.as_bytes()))
}

/// Recover the address that produced `signature` over `envelope`.
pub fn recover_typed_data_signer(
    envelope: &TypedDataEnvelope,
    signature: &str,
) -> Result<Address, SignerError> {
    let raw = hex::decode(signature.trim_start_matches("0x"))
        .map_err(|e| SignerError::InvalidSignature(e.to_string()))?;
    if raw.len() != 65 {
        return Err(SignerError::InvalidSignature(format!(
            "signature must be 65 bytes, got {}",
            raw.len()
        )));
    }
    let signature =
        Signature::from_raw(&raw).map_err(|e| SignerError::InvalidSignature(e.to_string()))?;
    let digest = envelope.signing_hash()?;
    signature
        .recover_address_from_prehash(&digest)
        .map_err(|e| SignerError::InvalidSignature(e.to_string()))
}
