//! [`ChainReader`] over an alloy [`Provider`].

use alloy::network::{Ethereum, TransactionResponse};
use alloy::primitives::B256;
use alloy::providers::Provider;
use async_trait::async_trait;

use super::{ChainReader, MinedTransaction};
use crate::error::PollError;

/// Reads transactions and chain height through any Ethereum provider.
pub struct AlloyChainReader<P> {
    provider: P,
}

impl<P> AlloyChainReader<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl AlloyChainReader<alloy::providers::RootProvider<Ethereum>> {
    /// JSON-RPC over HTTP at `rpc_url`.
    pub fn connect_http(rpc_url: &str) -> Result<Self, PollError> {
        let url = rpc_url
            .parse()
            .map_err(|e| PollError::Provider(format!("invalid RPC url {}: {}", rpc_url, e)))?;
        Ok(Self::new(
            alloy::providers::RootProvider::<Ethereum>::new_http(url),
        ))
    }
}

#[async_trait]
impl<P> ChainReader for AlloyChainReader<P>
where
    P: Provider<Ethereum>,
{
    async fn transaction(&self, hash: B256) -> Result<Option<MinedTransaction>, PollError> {
        let tx = self
            .provider
            .get_transaction_by_hash(hash)
            .await
            .map_err(|e| PollError::Provider(e.to_string()))?;

        Ok(tx.map(|tx| MinedTransaction {
            hash,
            block_number: tx.block_number(),
            raw: serde_json::to_value(&tx).unwrap_or_default(),
        }))
    }

    async fn block_number(&self) -> Result<u64, PollError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| PollError::Provider(e.to_string()))
    }
}
