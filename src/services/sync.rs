// src/services/sync.rs
use log::{info, warn};

use crate::error::{Result, SyncError};
use crate::models::SyncRecord;
use crate::services::db::Store;

#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    Inserted(usize),
    NoNewData,
    /// The insert was attempted and the store refused it.
    Failed(String),
}

impl AppendOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, AppendOutcome::Failed(_))
    }
}

/// Position of the first fetched record whose key equals `last`.
pub fn match_index<R: SyncRecord>(fetched: &[R], last: Option<&R::Key>) -> Option<usize> {
    let last = last?;
    fetched.iter().position(|record| &record.key() == last)
}

/// Records strictly after `matched`; everything when nothing matched.
pub fn new_suffix<R>(fetched: &[R], matched: Option<usize>) -> &[R] {
    match matched {
        Some(i) => &fetched[i + 1..],
        None => fetched,
    }
}

/// Appends the part of `fetched` that follows the latest row stored in `table`.
///
/// `fetched` must be in ascending key order. A failed insert is reported as
/// [`AppendOutcome::Failed`] rather than an error; failing to read the latest row is an error.
pub async fn diff_and_append<S, R>(
    store: &S,
    table: &str,
    label: &str,
    fetched: &[R],
) -> Result<AppendOutcome>
where
    S: Store + ?Sized,
    R: SyncRecord,
{
    let last_key = match store.latest(table).await? {
        Some(row) => Some(R::key_from_row(&row).map_err(|e| SyncError::StoreQuery {
            table: table.to_string(),
            reason: format!("latest row has no usable key: {}", e),
        })?),
        None => None,
    };

    let matched = match_index(fetched, last_key.as_ref());
    if let (Some(key), None) = (&last_key, matched) {
        if !fetched.is_empty() {
            warn!(
                "Last stored {} key {:?} is not in the fetched window; appending all {} records",
                label,
                key,
                fetched.len()
            );
        }
    }

    let suffix = new_suffix(fetched, matched);
    if suffix.is_empty() {
        info!("No New {} Data", label);
        return Ok(AppendOutcome::NoNewData);
    }

    let rows = suffix
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    match store.insert_many(table, rows).await {
        Ok(count) => {
            info!("Update {} {} records", label, count);
            Ok(AppendOutcome::Inserted(count))
        }
        Err(e) => {
            warn!("Unable to update {}: {}", label, e);
            Ok(AppendOutcome::Failed(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MonthKey, ReturnRecord};
    use crate::services::db::MemoryStore;
    use serde_json::json;

    const TABLE: &str = "SET_Return";

    fn record(month: u32) -> ReturnRecord {
        ReturnRecord {
            year: 2024,
            month: format!("k{}", month),
            yearly_return: 0.0,
            monthly_return: 0.0,
            yearly_tri: 0.0,
            monthly_tri: 0.0,
        }
    }

    fn fetched(n: u32) -> Vec<ReturnRecord> {
        (0..n).map(record).collect()
    }

    fn months(rows: &[serde_json::Value]) -> Vec<String> {
        rows.iter()
            .map(|r| r["month"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn suffix_follows_matched_key() {
        let f = fetched(10);
        let last = MonthKey {
            year: 2024,
            month: "k6".to_string(),
        };
        let matched = match_index(&f, Some(&last));
        assert_eq!(matched, Some(6));
        let suffix = new_suffix(&f, matched);
        assert_eq!(suffix, &f[7..]);
        assert_eq!(suffix.len(), 3);
    }

    #[test]
    fn no_prior_key_means_whole_sequence() {
        let f = fetched(4);
        assert_eq!(match_index(&f, None), None);
        assert_eq!(new_suffix(&f, None).len(), 4);

        let unknown = MonthKey {
            year: 1999,
            month: "k1".to_string(),
        };
        assert_eq!(match_index(&f, Some(&unknown)), None);
    }

    #[test]
    fn last_element_match_leaves_nothing() {
        let f = fetched(3);
        assert!(new_suffix(&f, Some(2)).is_empty());
    }

    #[tokio::test]
    async fn appends_only_the_unseen_suffix() {
        let store = MemoryStore::new();
        store
            .insert_many(TABLE, fetched(7).iter().map(|r| serde_json::to_value(r).unwrap()).collect())
            .await
            .unwrap();

        let outcome = diff_and_append(&store, TABLE, "Market Return", &fetched(10)).await.unwrap();
        assert_eq!(outcome, AppendOutcome::Inserted(3));
        assert_eq!(
            months(&store.rows(TABLE)[7..]),
            vec!["k7", "k8", "k9"]
        );
    }

    #[tokio::test]
    async fn second_run_is_a_no_op() {
        let store = MemoryStore::new();
        let f = fetched(5);

        let first = diff_and_append(&store, TABLE, "Market Return", &f).await.unwrap();
        assert_eq!(first, AppendOutcome::Inserted(5));
        assert_eq!(months(&store.rows(TABLE)), vec!["k0", "k1", "k2", "k3", "k4"]);

        let second = diff_and_append(&store, TABLE, "Market Return", &f).await.unwrap();
        assert_eq!(second, AppendOutcome::NoNewData);
        assert_eq!(store.rows(TABLE).len(), 5);
    }

    #[tokio::test]
    async fn empty_fetch_is_no_new_data() {
        let store = MemoryStore::new();
        let outcome = diff_and_append::<_, ReturnRecord>(&store, TABLE, "Market Return", &[])
            .await
            .unwrap();
        assert_eq!(outcome, AppendOutcome::NoNewData);
    }

    #[tokio::test]
    async fn insert_failure_is_reported_not_raised() {
        let store = MemoryStore::new();
        store.reject_inserts(true);
        let outcome = diff_and_append(&store, TABLE, "Market Return", &fetched(2)).await.unwrap();
        assert!(outcome.is_failed());
    }

    #[tokio::test]
    async fn unreadable_latest_row_is_an_error() {
        let store = MemoryStore::new();
        store.insert_many(TABLE, vec![json!({ "note": "no key" })]).await.unwrap();
        let result = diff_and_append(&store, TABLE, "Market Return", &fetched(2)).await;
        assert!(matches!(result, Err(SyncError::StoreQuery { .. })));
    }
}
