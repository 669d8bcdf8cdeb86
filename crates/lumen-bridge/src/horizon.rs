//! Ledger-API client used to resolve transaction memos.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use crate::error::BridgeError;
use crate::operation::PaymentOperation;

/// Capability that attaches the enclosing transaction's memo to an
/// operation in place.
pub trait MemoLoader: Send + Sync {
    fn load_memo(
        &self,
        operation: &mut PaymentOperation,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

/// Subset of the ledger's transaction document the bridge cares about.
#[derive(Debug, Deserialize)]
struct TransactionRecord {
    #[serde(default = "memo_type_none")]
    memo_type: String,
    #[serde(default)]
    memo: String,
}

fn memo_type_none() -> String {
    "none".to_string()
}

/// Memo loader backed by a Horizon-compatible ledger API.
#[derive(Debug, Clone)]
pub struct HorizonClient {
    http: reqwest::Client,
    base_url: String,
}

impl HorizonClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl MemoLoader for HorizonClient {
    async fn load_memo(&self, operation: &mut PaymentOperation) -> Result<(), BridgeError> {
        let url = format!(
            "{}/transactions/{}",
            self.base_url.trim_end_matches('/'),
            operation.transaction_hash
        );

        let resp = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(10))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(BridgeError::HorizonRejected(resp.status()));
        }

        let transaction: TransactionRecord = resp.json().await?;
        operation.memo.kind = transaction.memo_type;
        operation.memo.value = transaction.memo;
        Ok(())
    }
}
