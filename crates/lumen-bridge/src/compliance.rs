//! Compliance-server client: exchanges a hash memo for routing metadata.

use std::future::Future;
use std::time::Duration;

use bridge_protocols::{decode_receive_response, TransactionMemo};

use crate::error::BridgeError;

/// Capability that resolves a hash memo into an authenticated transaction
/// descriptor.
pub trait ComplianceResolver: Send + Sync {
    fn resolve_route(
        &self,
        memo_hash: &str,
    ) -> impl Future<Output = Result<TransactionMemo, BridgeError>> + Send;
}

/// HTTP client for a compliance server's receive endpoint.
#[derive(Debug, Clone)]
pub struct ComplianceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ComplianceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl ComplianceResolver for ComplianceClient {
    async fn resolve_route(&self, memo_hash: &str) -> Result<TransactionMemo, BridgeError> {
        let url = format!("{}/receive", self.base_url.trim_end_matches('/'));

        let resp = self
            .http
            .post(&url)
            .form(&[("memo", memo_hash)])
            .timeout(Duration::from_secs(10))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(BridgeError::ComplianceRejected(resp.status()));
        }

        let body = resp.bytes().await?;
        Ok(decode_receive_response(&body)?)
    }
}
