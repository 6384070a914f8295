//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize identically
//! to the raw format the backend sends, so they can be used directly in wire types
//! without conversion overhead.

pub mod serde_util;

use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// The zero address. Used as "any subscriber" in authorizations and as the
/// "not configured" marker for manager token/wallet addresses.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Whether an address field is missing or set to the zero address.
pub fn is_unset_address(address: Option<&str>) -> bool {
    match address {
        None => true,
        Some(a) => a.is_empty() || a.eq_ignore_ascii_case(ZERO_ADDRESS),
    }
}

// ─── DataEnvelope ────────────────────────────────────────────────────────────

/// Backend envelope: resource endpoints answer `{ "data": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

// ─── Amount ──────────────────────────────────────────────────────────────────

/// A non-negative token amount in base units, kept as a decimal string.
///
/// Amounts never go through floating point. The backend sends them either as
/// JSON strings or as integers; both deserialize into an `Amount`, and it always
/// serializes back as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Amount(String);

impl Amount {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_u256(&self) -> U256 {
        // Invariant: the inner string is always a valid base-10 U256.
        U256::from_str_radix(&self.0, 10).unwrap_or_default()
    }

    /// Convert an integral, non-negative decimal. Fractional values are rejected.
    pub fn from_decimal(value: Decimal) -> Result<Self, String> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(format!("amount must be non-negative, got {}", value));
        }
        if !value.fract().is_zero() {
            return Err(format!("amount must be an integer, got {}", value));
        }
        Ok(Self(value.trunc().normalize().to_string()))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(v: u64) -> Self {
        Self(v.to_string())
    }
}

impl From<u128> for Amount {
    fn from(v: u128) -> Self {
        Self(v.to_string())
    }
}

impl From<U256> for Amount {
    fn from(v: U256) -> Self {
        Self(v.to_string())
    }
}

impl FromStr for Amount {
    type Err = String;

    /// Accepts base-10 digits or `0x`-prefixed hex; normalizes to base 10.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("amount is empty".to_string());
        }
        let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
            Some(hex) => U256::from_str_radix(hex, 16),
            None => U256::from_str_radix(trimmed, 10),
        };
        parsed
            .map(Self::from)
            .map_err(|e| format!("invalid amount `{}`: {}", s, e))
    }
}

impl TryFrom<&str> for Amount {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_util::string_or_number::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
