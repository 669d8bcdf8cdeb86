use reqwest::StatusCode;
use thiserror::Error;

use bridge_protocols::ProtocolError;

/// Errors surfaced by the bridge core.
///
/// None of these are ever persisted as a payment disposition: an error
/// leaves no record, so the ledger consumer can replay the operation.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Payload signing or compliance decode failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Transport-level failure talking to an external endpoint.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The merchant callback answered outside 2xx.
    #[error("receive callback rejected the payment: status {0}")]
    CallbackRejected(StatusCode),

    /// The compliance server answered outside 2xx.
    #[error("compliance server rejected the lookup: status {0}")]
    ComplianceRejected(StatusCode),

    /// The ledger API answered outside 2xx while loading a memo.
    #[error("transaction lookup failed: status {0}")]
    HorizonRejected(StatusCode),

    /// A record for this operation id already exists.
    #[error("received payment {0} is already recorded")]
    DuplicateRecord(String),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("stored record is corrupt: {0}")]
    CorruptRecord(String),
}
