use serde::Deserialize;

/// Memo attached to an operation's enclosing transaction. `kind` follows the
/// ledger's vocabulary: `none`, `text`, `id`, `hash`, `return`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationMemo {
    #[serde(rename = "memo_type", default)]
    pub kind: String,
    #[serde(rename = "memo", default)]
    pub value: String,
}

impl OperationMemo {
    /// Hash memos reference an off-ledger compliance exchange.
    pub fn is_hash(&self) -> bool {
        self.kind == "hash"
    }
}

/// One ledger payment operation as the ledger API reports it. Ephemeral:
/// owned by the caller for the duration of a single dispatch.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentOperation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub paging_token: String,
    #[serde(default)]
    pub asset_code: String,
    #[serde(default)]
    pub asset_issuer: String,
    #[serde(default)]
    pub amount: String,
    /// Hash of the enclosing transaction; the memo loader fetches it.
    #[serde(default)]
    pub transaction_hash: String,
    /// Filled in by the memo loader, not present in the operation document.
    #[serde(skip)]
    pub memo: OperationMemo,
}

impl PaymentOperation {
    /// Payment-kind operations are forwarded; everything else is recorded
    /// and dropped.
    pub fn is_payment(&self) -> bool {
        matches!(self.kind.as_str(), "payment" | "path_payment")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_operation_document() {
        let op: PaymentOperation = serde_json::from_value(serde_json::json!({
            "id": "77309415424",
            "type": "payment",
            "from": "GBIHSMPXC2KJ3NJVHEYTG3KCHYEUQRT45X6AWYWXMAXZOAX4F5LFZYYQ",
            "to": "GATKP6ZQM5CSLECPMTAC5226PE367QALCPM6AFHTSULPPZMT62OOPMQB",
            "paging_token": "77309415424-1",
            "asset_code": "USD",
            "asset_issuer": "GD4I7AFSLZGTDL34TQLWJOM2NHLIIOEKD5RHHZUW54HERBLSIRKUOXRR",
            "amount": "200.0000000",
            "transaction_hash": "b9d0b229fc5b09d7bdbcbd71f25b9ed3b2c7e9cf9f6ea3ab23b6e18e6d9845d8"
        }))
        .unwrap();

        assert!(op.is_payment());
        assert_eq!(op.amount, "200.0000000");
        assert_eq!(op.memo.kind, "");
    }

    #[test]
    fn test_path_payment_counts_as_payment() {
        let op: PaymentOperation = serde_json::from_value(serde_json::json!({
            "id": "1",
            "type": "path_payment",
            "paging_token": "1-1"
        }))
        .unwrap();
        assert!(op.is_payment());
    }

    #[test]
    fn test_create_account_is_not_payment() {
        let op: PaymentOperation = serde_json::from_value(serde_json::json!({
            "id": "1",
            "type": "create_account",
            "paging_token": "1-1"
        }))
        .unwrap();
        assert!(!op.is_payment());
    }
}
