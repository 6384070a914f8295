//! Canonical Daisy subscription-manager schema.

use super::{struct_type, TypeSchema};

pub const SUBSCRIPTION_TYPE: &str = "Subscription";
pub const CANCEL_SUBSCRIPTION_TYPE: &str = "CancelSubscription";

lazy_static::lazy_static! {
    /// Struct types signed against a subscription manager contract.
    /// `EIP712Domain` is derived from the domain and not listed here.
    pub static ref DAISY_TYPES: TypeSchema = {
        let mut types = TypeSchema::new();
        types.insert(
            SUBSCRIPTION_TYPE.to_string(),
            struct_type(&[
                ("subscriber", "address"),
                ("token", "address"),
                ("price", "uint256"),
                ("periods", "uint256"),
                ("periodUnit", "string"),
                ("maxExecutions", "uint256"),
                ("signatureExpiresAt", "uint256"),
                ("plan", "bytes32"),
                ("nonce", "bytes32"),
            ]),
        );
        types.insert(
            CANCEL_SUBSCRIPTION_TYPE.to_string(),
            struct_type(&[
                ("subscriptionId", "bytes32"),
                ("signatureExpiresAt", "uint256"),
            ]),
        );
        types
    };
}
