//! EIP-712 typed data: schemas, domains, envelopes and hashing.
//!
//! The encoder is dynamic: a [`TypeSchema`] is plain data (as sent to a
//! wallet), not Rust types generated at compile time. This is what allows the
//! same envelope to be hashed locally, signed with a local key, or forwarded
//! verbatim to an external wallet.
//!
//! ```rust,ignore
//! use daisy_sdk::eip712::{encode, Domain, schema::{DAISY_TYPES, CANCEL_SUBSCRIPTION_TYPE}};
//!
//! let envelope = encode(
//!     DAISY_TYPES.clone(),
//!     Domain::new("0x8f3c..."),
//!     CANCEL_SUBSCRIPTION_TYPE,
//!     serde_json::json!({ "subscriptionId": "0xab..", "signatureExpiresAt": "1700000000" }),
//! )?;
//! let digest = envelope.signing_hash()?;
//! ```

pub mod encoder;
pub mod nonce;
pub mod schema;

pub use encoder::{domain_separator, encode_data, encode_type, hash_struct, signing_hash, type_hash};
pub use nonce::{agreement_nonce, gen_nonce, signature_expires_at};

use alloy::primitives::B256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::error::TypedDataError;

/// Name of the domain struct type.
pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain";

// ─── TypeSchema ──────────────────────────────────────────────────────────────

/// One `(name, type)` pair of a struct type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TypedField {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// Struct type name → ordered fields. Field order is part of the type hash.
pub type TypeSchema = BTreeMap<String, Vec<TypedField>>;

/// Build a schema entry from `(name, type)` pairs, keeping their order.
pub fn struct_type(fields: &[(&str, &str)]) -> Vec<TypedField> {
    fields
        .iter()
        .map(|(name, kind)| TypedField::new(*name, *kind))
        .collect()
}

// ─── Domain ──────────────────────────────────────────────────────────────────

/// EIP-712 domain. Only the fields that are set take part in the
/// `EIP712Domain` type; Daisy contracts use `verifyingContract` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    pub verifying_contract: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

impl Domain {
    pub fn new(verifying_contract: impl Into<String>) -> Self {
        Self {
            name: None,
            version: None,
            chain_id: None,
            verifying_contract: verifying_contract.into(),
            salt: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    /// The `EIP712Domain` fields in canonical order, present fields only.
    pub fn type_fields(&self) -> Vec<TypedField> {
        let mut fields = Vec::with_capacity(5);
        if self.name.is_some() {
            fields.push(TypedField::new("name", "string"));
        }
        if self.version.is_some() {
            fields.push(TypedField::new("version", "string"));
        }
        if self.chain_id.is_some() {
            fields.push(TypedField::new("chainId", "uint256"));
        }
        fields.push(TypedField::new("verifyingContract", "address"));
        if self.salt.is_some() {
            fields.push(TypedField::new("salt", "bytes32"));
        }
        fields
    }

    /// The domain as an encodable message.
    pub fn to_message(&self) -> serde_json::Value {
        // Domain only holds strings and integers.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

// ─── TypedDataEnvelope ───────────────────────────────────────────────────────

/// `{types, domain, primaryType, message}`, the bundle handed to a signer.
///
/// `types` never contains `EIP712Domain`; it is derived from `domain` and
/// injected on serialization, because wallets require it.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedDataEnvelope {
    pub types: TypeSchema,
    pub domain: Domain,
    pub primary_type: String,
    pub message: serde_json::Value,
}

/// Build and validate an envelope.
///
/// Fails with [`TypedDataError::UnknownType`] if `primary_type` (or any type it
/// references) is missing from `types`, and [`TypedDataError::FieldMismatch`]
/// if `message` lacks a declared field.
pub fn encode(
    types: TypeSchema,
    domain: Domain,
    primary_type: &str,
    message: serde_json::Value,
) -> Result<TypedDataEnvelope, TypedDataError> {
    let envelope = TypedDataEnvelope {
        types,
        domain,
        primary_type: primary_type.to_string(),
        message,
    };
    envelope.validate()?;
    Ok(envelope)
}

impl TypedDataEnvelope {
    /// Check the envelope encodes cleanly.
    pub fn validate(&self) -> Result<(), TypedDataError> {
        self.hash_struct().map(|_| ())
    }

    /// `hashStruct(primaryType, message)`.
    pub fn hash_struct(&self) -> Result<B256, TypedDataError> {
        hash_struct(&self.types, &self.primary_type, &self.message)
    }

    pub fn domain_separator(&self) -> Result<B256, TypedDataError> {
        domain_separator(&self.domain)
    }

    /// The final digest that gets signed.
    pub fn signing_hash(&self) -> Result<B256, TypedDataError> {
        signing_hash(&self.types, &self.domain, &self.primary_type, &self.message)
    }

    /// Serialized form sent to wallets (`eth_signTypedData_*` second param).
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeWire {
    types: TypeSchema,
    domain: Domain,
    primary_type: String,
    message: serde_json::Value,
}

impl Serialize for TypedDataEnvelope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut types = self.types.clone();
        types.insert(EIP712_DOMAIN_TYPE.to_string(), self.domain.type_fields());
        EnvelopeWire {
            types,
            domain: self.domain.clone(),
            primary_type: self.primary_type.clone(),
            message: self.message.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TypedDataEnvelope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut wire = EnvelopeWire::deserialize(deserializer)?;
        wire.types.remove(EIP712_DOMAIN_TYPE);
        Ok(Self {
            types: wire.types,
            domain: wire.domain,
            primary_type: wire.primary_type,
            message: wire.message,
        })
    }
}
