//! Wire formats for the lumen-bridge payment gateway.
//!
//! These are the payloads the gateway exchanges with its two external
//! counterparts, kept free of any I/O so both sides of each exchange can
//! share them:
//!
//! - [`mac`] — webhook payload authentication (strkey signing seed,
//!   HMAC-SHA256, base64 header value)
//! - [`compliance`] — the compliance server's receive-protocol envelope and
//!   its two-level decode
//! - [`memo`] — transaction memo documents carried inside that envelope

pub mod compliance;
pub mod error;
pub mod mac;
pub mod memo;

pub use compliance::{decode_receive_response, AuthData, ReceiveResponse};
pub use error::ProtocolError;
pub use memo::{MemoEnvelope, TransactionMemo};
