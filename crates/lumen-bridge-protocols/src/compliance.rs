//! Compliance receive-protocol payloads.
//!
//! The compliance server wraps its answer in two layers of JSON-encoded
//! strings: the HTTP envelope carries `data`, itself a JSON document whose
//! `memo` field is another JSON document describing the transaction. The
//! inner layers are opaque authenticated blobs as far as transport is
//! concerned, so each layer is decoded separately and a failure names the
//! layer at fault.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::memo::{MemoEnvelope, TransactionMemo};

/// Envelope returned by the compliance server's `POST /receive`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveResponse {
    pub data: String,
}

/// Authenticated payment metadata carried inside the envelope. Only `memo`
/// is consumed by the gateway; the other fields ride along for callers that
/// need them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthData {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub need_info: bool,
    #[serde(default)]
    pub tx: String,
    pub memo: String,
}

/// Decode a receive response body down to its transaction descriptor:
/// envelope, then the auth data inside it, then the memo document inside
/// that.
pub fn decode_receive_response(body: &[u8]) -> Result<TransactionMemo, ProtocolError> {
    let envelope: ReceiveResponse =
        serde_json::from_slice(body).map_err(ProtocolError::Envelope)?;
    let auth: AuthData = serde_json::from_str(&envelope.data).map_err(ProtocolError::AuthData)?;
    let memo: MemoEnvelope = serde_json::from_str(&auth.memo).map_err(ProtocolError::Memo)?;
    Ok(memo.transaction)
}
