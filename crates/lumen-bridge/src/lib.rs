//! Payment-reaction core for a ledger payment gateway.
//!
//! For each inbound ledger operation the [`PaymentDispatcher`] decides,
//! idempotently, whether the payment is relevant, validates it against the
//! configured policy, optionally consults a compliance server, notifies the
//! merchant's receive callback with a MAC-authenticated payload, and records
//! exactly one durable outcome per operation.
//!
//! External collaborators are injected as capability traits so tests can
//! substitute them:
//!
//! - [`MemoLoader`] — attaches the enclosing transaction's memo
//!   ([`HorizonClient`])
//! - [`ComplianceResolver`] — exchanges a hash memo for an authenticated
//!   route ([`ComplianceClient`])
//! - [`WebhookSender`] — signed form POST to the callback
//!   ([`SignedWebhookClient`])
//! - [`PaymentStore`] — durable outcome records ([`SqlitePaymentStore`],
//!   [`InMemoryPaymentStore`])
//! - [`Clock`] — success timestamps ([`SystemClock`])
//!
//! Ledger synchronization itself (cursor management, streaming, retries) is
//! the caller's concern: this crate exposes a single `dispatch` entry point
//! per observed operation.

pub mod clock;
pub mod compliance;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod horizon;
pub mod operation;
pub mod store;
pub mod webhook;

pub use clock::{Clock, SystemClock};
pub use compliance::{ComplianceClient, ComplianceResolver};
pub use config::{Asset, ConfigError, GatewayConfig};
pub use dispatcher::PaymentDispatcher;
pub use error::BridgeError;
pub use horizon::{HorizonClient, MemoLoader};
pub use operation::{OperationMemo, PaymentOperation};
pub use store::{
    InMemoryPaymentStore, PaymentStatus, PaymentStore, ReceivedPayment, SqlitePaymentStore,
};
pub use webhook::{SignedWebhookClient, WebhookSender};
