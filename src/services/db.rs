// src/services/db.rs
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::{Result, SyncError};

/// Append-only table storage keyed by a store-assigned, increasing `id`.
#[async_trait]
pub trait Store: Send + Sync {
    /// The row with the highest `id` in `table`, if any.
    async fn latest(&self, table: &str) -> Result<Option<Value>>;

    /// Appends `rows` in order and returns how many were written.
    async fn insert_many(&self, table: &str, rows: Vec<Value>) -> Result<usize>;
}

/// In-process store. Backs the dry-run tool and the tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    reject_inserts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following insert fail, to exercise the warning path.
    pub fn reject_inserts(&self, reject: bool) {
        self.reject_inserts.store(reject, Ordering::SeqCst);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().get(table).cloned().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Value>>> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn latest(&self, table: &str) -> Result<Option<Value>> {
        Ok(self.lock().get(table).and_then(|rows| rows.last().cloned()))
    }

    async fn insert_many(&self, table: &str, rows: Vec<Value>) -> Result<usize> {
        if self.reject_inserts.load(Ordering::SeqCst) {
            return Err(SyncError::StoreInsert {
                table: table.to_string(),
                reason: "inserts rejected".to_string(),
            });
        }

        if let Some(row) = rows.iter().find(|row| !row.is_object()) {
            return Err(SyncError::StoreInsert {
                table: table.to_string(),
                reason: format!("row is not an object: {}", row),
            });
        }

        let mut tables = self.lock();
        let stored = tables.entry(table.to_string()).or_default();
        let count = rows.len();
        for mut row in rows {
            let id = stored.len() as u64 + 1;
            if let Some(fields) = row.as_object_mut() {
                fields.insert("id".to_string(), Value::from(id));
            }
            stored.push(row);
        }
        Ok(count)
    }
}
