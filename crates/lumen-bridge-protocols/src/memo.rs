//! Transaction memo documents exchanged over the compliance protocol.

use serde::{Deserialize, Serialize};

/// Top-level memo document: `{"transaction": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoEnvelope {
    pub transaction: TransactionMemo,
}

/// Routing descriptor for a received payment. `route` identifies the final
/// recipient inside the receiving organization; the remaining fields are
/// passed through untouched when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionMemo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_info: Option<String>,
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}
