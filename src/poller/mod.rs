//! Confirmation poller: waits for a transaction to be mined, then reports
//! its confirmation depth on every cycle until stopped.
//!
//! ```rust,ignore
//! let poller = ConfirmationPoller::new(AlloyChainReader::new(provider), tx_hash);
//! let handle = poller.handle();
//! let mut events = poller.into_stream();
//! while let Some(event) = events.next().await {
//!     if let PollEvent::Confirmation { confirmations, .. } = event {
//!         if confirmations >= 12 {
//!             handle.stop();
//!         }
//!     }
//! }
//! ```

pub mod provider;

pub use provider::AlloyChainReader;

use alloy::primitives::B256;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde_json::Value;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::PollError;

/// Delay between poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

// ─── ChainReader ─────────────────────────────────────────────────────────────

/// A transaction as seen by the node.
#[derive(Debug, Clone, PartialEq)]
pub struct MinedTransaction {
    pub hash: B256,
    /// `None` while pending.
    pub block_number: Option<u64>,
    /// The node's full transaction object.
    pub raw: Value,
}

/// The two node queries a poll cycle needs.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// `Ok(None)` if the node does not know the transaction.
    async fn transaction(&self, hash: B256) -> Result<Option<MinedTransaction>, PollError>;

    async fn block_number(&self) -> Result<u64, PollError>;
}

// ─── Target ──────────────────────────────────────────────────────────────────

/// The transaction being watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxTarget(pub B256);

impl TxTarget {
    /// Pull the hash out of a receipt-like object (`transactionHash` or `hash`).
    pub fn from_receipt(receipt: &Value) -> Result<Self, PollError> {
        let hash = receipt
            .get("transactionHash")
            .or_else(|| receipt.get("hash"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                PollError::InvalidTarget("receipt has no transactionHash".to_string())
            })?;
        hash.parse()
    }

    pub fn hash(&self) -> B256 {
        self.0
    }
}

impl From<B256> for TxTarget {
    fn from(hash: B256) -> Self {
        Self(hash)
    }
}

impl FromStr for TxTarget {
    type Err = PollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        B256::from_str(s.trim())
            .map(Self)
            .map_err(|e| PollError::InvalidTarget(format!("{}: {}", s, e)))
    }
}

// ─── Events & state ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// Emitted on every cycle once the transaction is mined.
    Confirmation {
        confirmations: u64,
        transaction: MinedTransaction,
    },
    /// A provider call failed. The next cycle is still scheduled.
    Error(PollError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    NotStarted,
    Polling,
    Stopped,
}

const NOT_STARTED: u8 = 0;
const POLLING: u8 = 1;
const STOPPED: u8 = 2;

/// Cloneable control handle. Stopping is cooperative: a cycle already in
/// flight completes, but its result is dropped and nothing more is polled.
#[derive(Debug, Clone)]
pub struct PollerHandle {
    state: Arc<AtomicU8>,
}

impl PollerHandle {
    pub fn stop(&self) {
        self.state.store(STOPPED, Ordering::SeqCst);
    }

    pub fn state(&self) -> PollerState {
        match self.state.load(Ordering::SeqCst) {
            NOT_STARTED => PollerState::NotStarted,
            POLLING => PollerState::Polling,
            _ => PollerState::Stopped,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == PollerState::Stopped
    }

    fn start(&self) -> bool {
        self.state
            .compare_exchange(NOT_STARTED, POLLING, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

// ─── ConfirmationPoller ──────────────────────────────────────────────────────

pub struct ConfirmationPoller<R> {
    reader: R,
    target: TxTarget,
    interval: Duration,
    handle: PollerHandle,
}

impl<R: ChainReader + 'static> ConfirmationPoller<R> {
    pub fn new(reader: R, target: impl Into<TxTarget>) -> Self {
        Self {
            reader,
            target: target.into(),
            interval: DEFAULT_POLL_INTERVAL,
            handle: PollerHandle {
                state: Arc::new(AtomicU8::new(NOT_STARTED)),
            },
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn handle(&self) -> PollerHandle {
        self.handle.clone()
    }

    /// Start polling. The first cycle runs immediately, then one cycle per
    /// interval; cycles never overlap. The stream ends once stopped.
    pub fn into_stream(self) -> BoxStream<'static, PollEvent> {
        let Self {
            reader,
            target,
            interval,
            handle,
        } = self;

        Box::pin(async_stream::stream! {
            if !handle.start() {
                return;
            }
            let hash = target.hash();

            loop {
                if handle.is_stopped() {
                    break;
                }
                tracing::debug!(tx = %hash, "Polling for confirmations");
                let outcome = poll_once(&reader, hash).await;
                if handle.is_stopped() {
                    break;
                }

                match outcome {
                    Ok(Some(event)) => yield event,
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(tx = %hash, error = %e, "Poll cycle failed");
                        yield PollEvent::Error(e);
                    }
                }

                futures_timer::Delay::new(interval).await;
            }
        })
    }
}

/// One cycle: look up the transaction, and if mined, the chain height.
async fn poll_once<R: ChainReader>(reader: &R, hash: B256) -> Result<Option<PollEvent>, PollError> {
    let Some(transaction) = reader.transaction(hash).await? else {
        return Ok(None);
    };
    let Some(mined_at) = transaction.block_number else {
        return Ok(None);
    };

    let height = reader.block_number().await?;
    Ok(Some(PollEvent::Confirmation {
        confirmations: height.saturating_sub(mined_at),
        transaction,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    const HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

    /// Scripted reader: pops one `transaction` answer per call.
    struct Script {
        answers: Mutex<Vec<Result<Option<MinedTransaction>, PollError>>>,
        height: u64,
        calls: AtomicUsize,
        stop_on_call: Option<PollerHandle>,
    }

    #[async_trait]
    impl ChainReader for Script {
        async fn transaction(&self, _hash: B256) -> Result<Option<MinedTransaction>, PollError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(handle) = &self.stop_on_call {
                handle.stop();
            }
            let mut answers = self.answers.lock().unwrap();
            if answers.is_empty() {
                Ok(None)
            } else {
                answers.remove(0)
            }
        }

        async fn block_number(&self) -> Result<u64, PollError> {
            Ok(self.height)
        }
    }

    fn mined(block: Option<u64>) -> MinedTransaction {
        MinedTransaction {
            hash: HASH.parse().unwrap(),
            block_number: block,
            raw: json!({}),
        }
    }

    fn script(answers: Vec<Result<Option<MinedTransaction>, PollError>>, height: u64) -> Script {
        Script {
            answers: Mutex::new(answers),
            height,
            calls: AtomicUsize::new(0),
            stop_on_call: None,
        }
    }

    #[test]
    fn test_target_from_receipt() {
        let target = TxTarget::from_receipt(&json!({ "transactionHash": HASH })).unwrap();
        assert_eq!(target.hash().to_string(), HASH);
        let target = TxTarget::from_receipt(&json!({ "hash": HASH })).unwrap();
        assert_eq!(target.hash().to_string(), HASH);
        assert!(TxTarget::from_receipt(&json!({ "status": 1 })).is_err());
        assert!("0x12".parse::<TxTarget>().is_err());
    }

    #[tokio::test]
    async fn test_pending_transaction_is_not_confirmed() {
        let poller = ConfirmationPoller::new(
            script(vec![Ok(Some(mined(None))), Ok(Some(mined(Some(10))))], 10),
            HASH.parse::<TxTarget>().unwrap(),
        )
        .interval(Duration::from_millis(1));

        let mut events = poller.into_stream();
        match events.next().await.unwrap() {
            PollEvent::Confirmation { confirmations, .. } => assert_eq!(confirmations, 0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_errors_do_not_stop_polling() {
        let poller = ConfirmationPoller::new(
            script(
                vec![
                    Err(PollError::Provider("timeout".into())),
                    Ok(Some(mined(Some(5)))),
                ],
                7,
            ),
            HASH.parse::<TxTarget>().unwrap(),
        )
        .interval(Duration::from_millis(1));
        let handle = poller.handle();
        let mut events = poller.into_stream();

        assert_eq!(
            events.next().await.unwrap(),
            PollEvent::Error(PollError::Provider("timeout".into()))
        );
        match events.next().await.unwrap() {
            PollEvent::Confirmation { confirmations, .. } => assert_eq!(confirmations, 2),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(handle.state(), PollerState::Polling);

        handle.stop();
        assert!(events.next().await.is_none());
        assert_eq!(handle.state(), PollerState::Stopped);
    }

    #[tokio::test]
    async fn test_in_flight_result_discarded_after_stop() {
        let target: TxTarget = HASH.parse().unwrap();
        let mut reader = script(vec![Ok(Some(mined(Some(1))))], 9);
        let handle = PollerHandle {
            state: Arc::new(AtomicU8::new(NOT_STARTED)),
        };
        reader.stop_on_call = Some(handle.clone());

        let poller = ConfirmationPoller {
            reader,
            target,
            interval: Duration::from_millis(1),
            handle: handle.clone(),
        };
        let mut events = poller.into_stream();
        assert!(events.next().await.is_none());
        assert!(handle.is_stopped());
    }

    #[tokio::test]
    async fn test_stopped_before_start_never_polls() {
        let poller = ConfirmationPoller::new(script(vec![], 0), HASH.parse::<TxTarget>().unwrap());
        let handle = poller.handle();
        assert_eq!(handle.state(), PollerState::NotStarted);
        handle.stop();

        let mut events = poller.into_stream();
        assert!(events.next().await.is_none());
    }

    #[test]
    fn test_confirmations_saturate() {
        let reader = script(vec![Ok(Some(mined(Some(20))))], 18);
        let event = tokio_test::block_on(poll_once(&reader, HASH.parse().unwrap()))
            .unwrap()
            .unwrap();
        match event {
            PollEvent::Confirmation { confirmations, .. } => assert_eq!(confirmations, 0),
            other => panic!("unexpected {:?}", other),
        }
    }
}
