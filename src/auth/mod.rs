//! Credentials: the `DAISY_ID` / `DAISY_SECRET_KEY` pair.
//!
//! Credentials map to HTTP Basic auth. The secret key is optional; without it
//! the client is limited to the backend's public read operations.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::SdkError;

/// Environment variable holding the manager identifier.
pub const IDENTIFIER_ENV: &str = "DAISY_ID";

/// Environment variable holding the secret key.
pub const SECRET_KEY_ENV: &str = "DAISY_SECRET_KEY";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    identifier: String,
    secret_key: Option<String>,
}

impl Credentials {
    /// Fails with [`SdkError::Validation`] if `identifier` is empty.
    pub fn new(identifier: impl Into<String>, secret_key: Option<String>) -> Result<Self, SdkError> {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            return Err(SdkError::Validation("missing identifier".to_string()));
        }
        Ok(Self {
            identifier,
            secret_key: secret_key.filter(|s| !s.is_empty()),
        })
    }

    /// Identifier-only credentials for public reads.
    pub fn public(identifier: impl Into<String>) -> Result<Self, SdkError> {
        Self::new(identifier, None)
    }

    pub fn with_secret(
        identifier: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, SdkError> {
        Self::new(identifier, Some(secret_key.into()))
    }

    /// Read [`IDENTIFIER_ENV`] and [`SECRET_KEY_ENV`] from the process environment.
    pub fn from_env() -> Result<Self, SdkError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Credentials::from_env`] over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SdkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let identifier = lookup(IDENTIFIER_ENV)
            .ok_or_else(|| SdkError::Validation(format!("{} is not set", IDENTIFIER_ENV)))?;
        Self::new(identifier, lookup(SECRET_KEY_ENV))
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn has_secret(&self) -> bool {
        self.secret_key.is_some()
    }

    /// `Authorization` header value: `Basic base64(identifier:secret)`.
    pub fn basic_auth_header(&self) -> String {
        let raw = format!(
            "{}:{}",
            self.identifier,
            self.secret_key.as_deref().unwrap_or("")
        );
        format!("Basic {}", STANDARD.encode(raw))
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_identifier_rejected() {
        assert!(matches!(
            Credentials::public(""),
            Err(SdkError::Validation(_))
        ));
    }

    #[test]
    fn test_basic_auth_header() {
        let creds = Credentials::with_secret("id", "secret").unwrap();
        // base64("id:secret")
        assert_eq!(creds.basic_auth_header(), "Basic aWQ6c2VjcmV0");

        let public = Credentials::public("id").unwrap();
        assert_eq!(public.basic_auth_header(), "Basic aWQ6");
        assert!(!public.has_secret());
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> =
            [(IDENTIFIER_ENV, "manager-1"), (SECRET_KEY_ENV, "s3cr3t")].into();
        let creds = Credentials::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(creds.identifier(), "manager-1");
        assert!(creds.has_secret());

        let missing = Credentials::from_lookup(|_| None);
        assert!(matches!(missing, Err(SdkError::Validation(_))));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::with_secret("id", "secret").unwrap();
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("secret\""));
        assert!(printed.contains("<redacted>"));
    }
}
