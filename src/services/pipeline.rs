// src/services/pipeline.rs
use async_trait::async_trait;
use log::{error, info};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::models::{Mai, ReturnRecord, Set, SyncRecord};
use crate::services::bond::BondYieldSource;
use crate::services::clock::{Clock, SystemClock};
use crate::services::db::Store;
use crate::services::fetch::{DocumentFetcher, HttpFetcher};
use crate::services::index::IndexSource;
use crate::services::normalize::{normalize_all, Normalize};
use crate::services::supabase::SupabaseStore;
use crate::services::sync::{diff_and_append, AppendOutcome};

/// A series computed from a family's records and kept in its own table.
#[derive(Debug, Clone)]
pub struct DerivedSeries<R> {
    pub table: &'static str,
    pub label: &'static str,
    pub records: Vec<R>,
}

/// One published data set: where it comes from, how it is keyed and where it is stored.
#[async_trait]
pub trait DataFamily: Send + Sync {
    type Raw: Normalize<Output = Self::Record> + Send;
    type Record: SyncRecord;

    const TABLE: &'static str;
    const LABEL: &'static str;

    /// Fetches the source documents and returns raw records, oldest first.
    async fn fetch(&self, fetcher: &dyn DocumentFetcher, clock: &dyn Clock) -> Result<Vec<Self::Raw>>;

    fn derived(&self, _records: &[Self::Record]) -> Option<DerivedSeries<ReturnRecord>> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyKind {
    Bond,
    Set,
    Mai,
}

impl FamilyKind {
    pub const ALL: [FamilyKind; 3] = [FamilyKind::Bond, FamilyKind::Set, FamilyKind::Mai];
}

impl fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            FamilyKind::Bond => "bond",
            FamilyKind::Set => "set",
            FamilyKind::Mai => "mai",
        };
        f.pad(name)
    }
}

impl FromStr for FamilyKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bond" => Ok(FamilyKind::Bond),
            "set" => Ok(FamilyKind::Set),
            "mai" => Ok(FamilyKind::Mai),
            other => Err(SyncError::Config(format!(
                "unknown family {:?} (expected bond, set or mai)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FamilyReport {
    pub family: &'static str,
    pub primary: AppendOutcome,
    pub derived: Option<AppendOutcome>,
}

impl FamilyReport {
    pub fn has_failures(&self) -> bool {
        self.primary.is_failed() || self.derived.as_ref().is_some_and(AppendOutcome::is_failed)
    }
}

/// True when any family errored or had an insert refused.
pub fn any_failed(results: &[(FamilyKind, Result<FamilyReport>)]) -> bool {
    results.iter().any(|(_, result)| match result {
        Ok(report) => report.has_failures(),
        Err(_) => true,
    })
}

#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub bond: BondYieldSource,
    pub set: IndexSource<Set>,
    pub mai: IndexSource<Mai>,
}

pub struct SyncJob {
    fetcher: Arc<dyn DocumentFetcher>,
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    sources: Sources,
}

impl SyncJob {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        sources: Sources,
    ) -> Self {
        SyncJob {
            fetcher,
            store,
            clock,
            sources,
        }
    }

    /// HTTP fetcher, Supabase store and Bangkok clock, all taken from `config`.
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.http_timeout)?;
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build store client: {}", e)))?;
        let store = SupabaseStore::new(config.supabase.clone(), client);

        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(store),
            Arc::new(SystemClock),
            config.sources(),
        ))
    }

    /// Fetch, normalize and append one family, then its derived series if it has one.
    ///
    /// The derived series is computed from the fetched records and is appended even when
    /// the primary insert failed.
    pub async fn run<D: DataFamily>(&self, family: &D) -> Result<FamilyReport> {
        let raw = family.fetch(self.fetcher.as_ref(), self.clock.as_ref()).await?;
        let records = normalize_all(raw)?;
        info!("Fetched {} {} records", records.len(), D::LABEL);

        let primary = diff_and_append(self.store.as_ref(), D::TABLE, D::LABEL, &records).await?;

        let derived = match family.derived(&records) {
            Some(series) => Some(
                diff_and_append(self.store.as_ref(), series.table, series.label, &series.records)
                    .await?,
            ),
            None => None,
        };

        Ok(FamilyReport {
            family: D::LABEL,
            primary,
            derived,
        })
    }

    pub async fn run_kind(&self, kind: FamilyKind) -> Result<FamilyReport> {
        match kind {
            FamilyKind::Bond => self.run(&self.sources.bond).await,
            FamilyKind::Set => self.run(&self.sources.set).await,
            FamilyKind::Mai => self.run(&self.sources.mai).await,
        }
    }

    /// Runs `kinds` in order. A failing family is logged and does not stop the rest.
    pub async fn run_kinds(&self, kinds: &[FamilyKind]) -> Vec<(FamilyKind, Result<FamilyReport>)> {
        let mut results = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let result = self.run_kind(kind).await;
            if let Err(e) = &result {
                error!("{} sync failed: {}", kind, e);
            }
            results.push((kind, result));
        }
        results
    }

    pub async fn run_all(&self) -> Vec<(FamilyKind, Result<FamilyReport>)> {
        info!("Starting market statistics sync");
        let results = self.run_kinds(&FamilyKind::ALL).await;
        info!(
            "Market statistics sync finished{}",
            if any_failed(&results) { " with failures" } else { "" }
        );
        results
    }
}
