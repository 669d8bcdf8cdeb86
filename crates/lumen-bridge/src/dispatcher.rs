//! The payment disposition state machine.
//!
//! Each inbound operation runs through a fixed sequence of checks, cheapest
//! first: duplicate lookup, operation kind, destination account, and asset
//! whitelist are all local; memo resolution, compliance negotiation, and
//! webhook delivery go over the network. Rejections persist a record
//! immediately and report success; network failures return the error with
//! nothing persisted, so the same operation can be replayed.

use tracing::{debug, info};

use crate::clock::Clock;
use crate::compliance::ComplianceResolver;
use crate::config::GatewayConfig;
use crate::error::BridgeError;
use crate::horizon::MemoLoader;
use crate::operation::PaymentOperation;
use crate::store::{PaymentStatus, PaymentStore, ReceivedPayment};
use crate::webhook::WebhookSender;

/// Memo type forwarded to the callback once compliance has resolved a hash
/// memo into a route.
const MEMO_TYPE_ROUTE: &str = "route";

/// Decides the disposition of each inbound ledger operation and records
/// exactly one durable outcome per operation id.
///
/// Holds no per-call state: any number of dispatches may run concurrently
/// against a single dispatcher.
pub struct PaymentDispatcher<S, L, N, W, C> {
    config: GatewayConfig,
    store: S,
    memo_loader: L,
    compliance: Option<N>,
    webhook: W,
    clock: C,
}

impl<S, L, N, W, C> PaymentDispatcher<S, L, N, W, C>
where
    S: PaymentStore,
    L: MemoLoader,
    N: ComplianceResolver,
    W: WebhookSender,
    C: Clock,
{
    pub fn new(
        config: GatewayConfig,
        store: S,
        memo_loader: L,
        compliance: Option<N>,
        webhook: W,
        clock: C,
    ) -> Self {
        Self {
            config,
            store,
            memo_loader,
            compliance,
            webhook,
            clock,
        }
    }

    /// Process one ledger operation to a terminal outcome.
    ///
    /// At most one record is persisted, at most one webhook call and one
    /// compliance call go out. Policy rejections persist their disposition
    /// and return `Ok`; upstream I/O failures return the error with nothing
    /// persisted.
    pub async fn dispatch(&self, mut operation: PaymentOperation) -> Result<(), BridgeError> {
        if self
            .store
            .find_by_operation_id(&operation.id)?
            .is_some()
        {
            debug!(operation_id = %operation.id, "operation already recorded, skipping");
            return Ok(());
        }

        if !operation.is_payment() {
            return self.record(&operation, PaymentStatus::NotPaymentOperation);
        }

        if operation.to != self.config.receiving_account {
            return self.record(&operation, PaymentStatus::SentNotReceived);
        }

        if !self
            .config
            .is_asset_allowed(&operation.asset_code, &operation.asset_issuer)
        {
            return self.record(&operation, PaymentStatus::AssetNotAllowed);
        }

        self.memo_loader.load_memo(&mut operation).await?;

        let (memo_kind, memo_value) = match (&self.compliance, operation.memo.is_hash()) {
            (Some(compliance), true) => {
                let transaction = compliance.resolve_route(&operation.memo.value).await?;
                debug!(
                    operation_id = %operation.id,
                    route = %transaction.route,
                    "compliance lookup resolved route"
                );
                (MEMO_TYPE_ROUTE.to_string(), transaction.route)
            }
            _ => (operation.memo.kind.clone(), operation.memo.value.clone()),
        };

        let fields = [
            ("id", operation.id.clone()),
            ("from", operation.from.clone()),
            ("amount", operation.amount.clone()),
            ("asset_code", operation.asset_code.clone()),
            ("asset_issuer", operation.asset_issuer.clone()),
            ("memo_type", memo_kind),
            ("memo", memo_value),
        ];

        let status = self
            .webhook
            .post_form(&self.config.receive_callback, &fields)
            .await?;
        if !status.is_success() {
            return Err(BridgeError::CallbackRejected(status));
        }

        self.record(&operation, PaymentStatus::Success)
    }

    fn record(
        &self,
        operation: &PaymentOperation,
        status: PaymentStatus,
    ) -> Result<(), BridgeError> {
        let record = ReceivedPayment {
            operation_id: operation.id.clone(),
            processed_at: self.clock.now(),
            paging_token: operation.paging_token.clone(),
            status,
        };

        match self.store.persist(&record) {
            Ok(()) => {
                info!(operation_id = %operation.id, status = %status, "received payment recorded");
                Ok(())
            }
            Err(BridgeError::DuplicateRecord(_)) => {
                // A concurrent dispatch of the same operation won the race;
                // its record stands.
                debug!(operation_id = %operation.id, "record already present, keeping existing outcome");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
