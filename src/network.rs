//! Network URL constants for the Daisy SDK.

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://sdk.daisypayments.com";

/// Staging REST API base URL.
pub const STAGING_API_URL: &str = "https://sdk.staging.daisypayments.com";

/// Environment variable overriding the base URL in `DaisyClientBuilder::from_env`.
pub const BASE_URL_ENV: &str = "DAISY_BASE_URL";
