// src/services/bond.rs
use async_trait::async_trait;
use log::info;

use crate::error::{Result, SyncError};
use crate::models::{BondYield, BondYieldRaw};
use crate::services::clock::Clock;
use crate::services::fetch::DocumentFetcher;
use crate::services::pipeline::DataFamily;

pub const BOND_YIELD_URL: &str = "http://www.thaibma.or.th/yieldcurve/getintpttm?year=";

/// ThaiBMA government bond yield curve for the current calendar year.
#[derive(Debug, Clone)]
pub struct BondYieldSource {
    /// Endpoint prefix; the year is appended.
    pub base_url: String,
}

impl BondYieldSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        BondYieldSource {
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, year: i32) -> String {
        format!("{}{}", self.base_url, year)
    }
}

impl Default for BondYieldSource {
    fn default() -> Self {
        Self::new(BOND_YIELD_URL)
    }
}

#[async_trait]
impl DataFamily for BondYieldSource {
    type Raw = BondYieldRaw;
    type Record = BondYield;

    const TABLE: &'static str = "Bond_Yield";
    const LABEL: &'static str = "Bond Yield";

    async fn fetch(&self, fetcher: &dyn DocumentFetcher, clock: &dyn Clock) -> Result<Vec<BondYieldRaw>> {
        let url = self.url_for(clock.current_year());
        let body = fetcher.fetch(&url).await?;
        let records: Vec<BondYieldRaw> = serde_json::from_str(&body).map_err(|e| SyncError::Decode {
            what: format!("bond yields from {}", url),
            source: e,
        })?;

        info!("Found {} bond yield curves", records.len());
        Ok(records)
    }
}
