//! Durable received-payment records.
//!
//! The store is the single source of truth for whether an operation has
//! already been handled. `persist` is an atomic unique insert keyed by
//! operation id, so two concurrent dispatches of the same operation cannot
//! both create a record.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::BridgeError;

/// Final classification of one operation's handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Success,
    NotPaymentOperation,
    SentNotReceived,
    AssetNotAllowed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentStatus::Success => "Success",
            PaymentStatus::NotPaymentOperation => "Not a payment operation",
            PaymentStatus::SentNotReceived => "Operation sent not received",
            PaymentStatus::AssetNotAllowed => "Asset not allowed",
        })
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Success" => Ok(PaymentStatus::Success),
            "Not a payment operation" => Ok(PaymentStatus::NotPaymentOperation),
            "Operation sent not received" => Ok(PaymentStatus::SentNotReceived),
            "Asset not allowed" => Ok(PaymentStatus::AssetNotAllowed),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// Durable outcome of one dispatched operation. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedPayment {
    pub operation_id: String,
    pub processed_at: DateTime<Utc>,
    pub paging_token: String,
    pub status: PaymentStatus,
}

/// Repository of received-payment records.
pub trait PaymentStore: Send + Sync {
    /// Look up the record for an operation id, if one was ever persisted.
    fn find_by_operation_id(&self, id: &str) -> Result<Option<ReceivedPayment>, BridgeError>;

    /// Insert a new record. Fails with [`BridgeError::DuplicateRecord`] if a
    /// record with the same operation id already exists; never overwrites.
    fn persist(&self, record: &ReceivedPayment) -> Result<(), BridgeError>;
}

/// In-memory store backed by DashMap. Fast but lost on restart. Clones
/// share the underlying map.
#[derive(Clone, Default)]
pub struct InMemoryPaymentStore {
    records: Arc<DashMap<String, ReceivedPayment>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PaymentStore for InMemoryPaymentStore {
    fn find_by_operation_id(&self, id: &str) -> Result<Option<ReceivedPayment>, BridgeError> {
        Ok(self.records.get(id).map(|r| r.clone()))
    }

    fn persist(&self, record: &ReceivedPayment) -> Result<(), BridgeError> {
        use dashmap::mapref::entry::Entry;
        // The entry API makes the check-and-insert atomic within the process.
        match self.records.entry(record.operation_id.clone()) {
            Entry::Occupied(_) => Err(BridgeError::DuplicateRecord(record.operation_id.clone())),
            Entry::Vacant(v) => {
                v.insert(record.clone());
                Ok(())
            }
        }
    }
}

/// Persistent store backed by SQLite. Survives restarts; the primary key on
/// `operation_id` makes the insert atomic across processes too. Clones share
/// the underlying connection.
#[derive(Clone)]
pub struct SqlitePaymentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePaymentStore {
    /// Open (or create) the payments database at the given path.
    pub fn open(path: &str) -> Result<Self, BridgeError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS received_payments (
                operation_id TEXT PRIMARY KEY,
                processed_at INTEGER NOT NULL,
                paging_token TEXT NOT NULL,
                status TEXT NOT NULL
            );
            PRAGMA journal_mode=WAL;",
        )?;

        // Payment history is not for other local users' eyes.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            {
                tracing::warn!(
                    path = %path,
                    error = %e,
                    "failed to set payments database file permissions to 0600"
                );
            }
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(conn) => conn,
            Err(poisoned) => {
                tracing::error!("payment store mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl PaymentStore for SqlitePaymentStore {
    fn find_by_operation_id(&self, id: &str) -> Result<Option<ReceivedPayment>, BridgeError> {
        let conn = self.lock();
        let row = conn
            .query_row(
                "SELECT operation_id, processed_at, paging_token, status
                 FROM received_payments WHERE operation_id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((operation_id, seconds, paging_token, status)) = row else {
            return Ok(None);
        };
        let processed_at = DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| BridgeError::CorruptRecord(format!("timestamp {seconds} out of range")))?;
        let status: PaymentStatus = status.parse().map_err(BridgeError::CorruptRecord)?;

        Ok(Some(ReceivedPayment {
            operation_id,
            processed_at,
            paging_token,
            status,
        }))
    }

    fn persist(&self, record: &ReceivedPayment) -> Result<(), BridgeError> {
        let conn = self.lock();
        let result = conn.execute(
            "INSERT INTO received_payments (operation_id, processed_at, paging_token, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.operation_id,
                record.processed_at.timestamp(),
                record.paging_token,
                record.status.to_string()
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(BridgeError::DuplicateRecord(record.operation_id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(id: &str) -> ReceivedPayment {
        ReceivedPayment {
            operation_id: id.to_string(),
            processed_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            paging_token: format!("{id}-1"),
            status: PaymentStatus::Success,
        }
    }

    #[test]
    fn test_status_display_roundtrip() {
        for status in [
            PaymentStatus::Success,
            PaymentStatus::NotPaymentOperation,
            PaymentStatus::SentNotReceived,
            PaymentStatus::AssetNotAllowed,
        ] {
            let parsed: PaymentStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("Pending".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn test_in_memory_store_basic() {
        let store = InMemoryPaymentStore::new();
        assert!(store.find_by_operation_id("1").unwrap().is_none());

        store.persist(&sample_record("1")).unwrap();
        let found = store.find_by_operation_id("1").unwrap().unwrap();
        assert_eq!(found, sample_record("1"));
        assert!(store.find_by_operation_id("2").unwrap().is_none());
    }

    #[test]
    fn test_in_memory_store_rejects_duplicate() {
        let store = InMemoryPaymentStore::new();
        store.persist(&sample_record("1")).unwrap();

        let err = store.persist(&sample_record("1")).unwrap_err();
        assert!(matches!(err, BridgeError::DuplicateRecord(id) if id == "1"));
    }

    #[test]
    fn test_sqlite_store_basic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payments.db");
        let store = SqlitePaymentStore::open(path.to_str().unwrap()).unwrap();

        assert!(store.find_by_operation_id("1").unwrap().is_none());
        store.persist(&sample_record("1")).unwrap();
        let found = store.find_by_operation_id("1").unwrap().unwrap();
        assert_eq!(found, sample_record("1"));
    }

    #[test]
    fn test_sqlite_store_rejects_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payments.db");
        let store = SqlitePaymentStore::open(path.to_str().unwrap()).unwrap();

        store.persist(&sample_record("1")).unwrap();
        let mut second = sample_record("1");
        second.status = PaymentStatus::AssetNotAllowed;

        let err = store.persist(&second).unwrap_err();
        assert!(matches!(err, BridgeError::DuplicateRecord(_)));

        // The original record stands.
        let found = store.find_by_operation_id("1").unwrap().unwrap();
        assert_eq!(found.status, PaymentStatus::Success);
    }

    #[test]
    fn test_sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payments.db");

        {
            let store = SqlitePaymentStore::open(path.to_str().unwrap()).unwrap();
            store.persist(&sample_record("42")).unwrap();
        }

        let store = SqlitePaymentStore::open(path.to_str().unwrap()).unwrap();
        let found = store.find_by_operation_id("42").unwrap().unwrap();
        assert_eq!(found, sample_record("42"));
    }
}
