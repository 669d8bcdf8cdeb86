//! Signed webhook delivery to the merchant's receive callback.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;

use bridge_protocols::mac;

use crate::error::BridgeError;

/// Capability that delivers a form-encoded payload to a callback URL and
/// reports the HTTP status. The caller interprets the status.
pub trait WebhookSender: Send + Sync {
    fn post_form(
        &self,
        url: &str,
        fields: &[(&str, String)],
    ) -> impl Future<Output = Result<StatusCode, BridgeError>> + Send;
}

/// Webhook client that optionally authenticates payloads with a
/// `X_PAYLOAD_MAC` header.
#[derive(Debug, Clone)]
pub struct SignedWebhookClient {
    http: reqwest::Client,
    mac_key: Option<String>,
}

impl SignedWebhookClient {
    /// `mac_key` is the strkey-encoded signing seed; `None` disables the
    /// MAC header entirely.
    pub fn new(mac_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            mac_key,
        }
    }
}

impl WebhookSender for SignedWebhookClient {
    async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, String)],
    ) -> Result<StatusCode, BridgeError> {
        let body = {
            let mut serializer = url::form_urlencoded::Serializer::new(String::new());
            for (name, value) in fields {
                serializer.append_pair(name, value);
            }
            serializer.finish()
        };

        // The key is decoded before the request goes out: a broken key is a
        // configuration error, not a delivery failure.
        let mac_header = match &self.mac_key {
            Some(seed) => {
                let raw_key = mac::decode_seed(seed)?;
                Some(mac::sign(&raw_key, body.as_bytes()))
            }
            None => None,
        };

        let mut request = self
            .http
            .post(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .timeout(Duration::from_secs(30));
        if let Some(value) = mac_header {
            request = request.header(mac::PAYLOAD_MAC_HEADER, value);
        }

        let resp = request.body(body).send().await?;
        tracing::debug!(url = %url, status = %resp.status(), "webhook delivered");
        Ok(resp.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_protocols::ProtocolError;

    #[tokio::test]
    async fn test_broken_mac_key_fails_before_any_request() {
        // Nothing listens on this address; a decode failure must surface
        // before the client ever tries to connect.
        let client = SignedWebhookClient::new(Some("broken".to_string()));
        let err = client
            .post_form("http://127.0.0.1:1/receive", &[("foo", "base".to_string())])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BridgeError::Protocol(ProtocolError::InvalidMacKey)
        ));
        assert!(err.to_string().contains("invalid MAC key"));
    }
}
