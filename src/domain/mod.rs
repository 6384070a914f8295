//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs`: domain types as the backend returns them
//! - `wire.rs`: request bodies and query filters
//! - `client.rs`: sub-client with HTTP methods (feature `http`)

pub mod payments;
pub mod subscriptions;
