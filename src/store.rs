// SPDX-License-Identifier: MIT

//! Token storage keyed by athlete ID.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// OAuth credentials for one athlete.
///
/// Overwritten whole on every refresh, never merged field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub athlete_id: u64,
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp after which `access_token` is no longer valid.
    pub expires_at: i64,
}

/// Storage capability for token records.
///
/// The in-memory implementation lives for the process lifetime; a
/// durable backend can be swapped in without touching lifecycle logic.
/// No expiry enforcement happens here.
pub trait TokenStore: Send + Sync {
    /// Look up the record for an athlete.
    fn get(&self, athlete_id: u64) -> Option<TokenRecord>;

    /// Insert or overwrite the record for `record.athlete_id`.
    /// Overwrite is atomic per key.
    fn put(&self, record: TokenRecord);
}

/// Process-wide in-memory store backed by a concurrent map.
#[derive(Default)]
pub struct MemoryTokenStore {
    records: DashMap<u64, TokenRecord>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, athlete_id: u64) -> Option<TokenRecord> {
        self.records.get(&athlete_id).map(|r| r.value().clone())
    }

    fn put(&self, record: TokenRecord) {
        self.records.insert(record.athlete_id, record);
    }
}
