// src/config.rs
use std::env;
use std::time::Duration;

use crate::error::{Result, SyncError};
use crate::services::bond::{BondYieldSource, BOND_YIELD_URL};
use crate::services::index::{IndexSource, SET_INDEX_URL, SET_YIELD_URL};
use crate::services::pipeline::Sources;
use crate::services::supabase::SupabaseConfig;

/// Daily at 01:00 UTC (08:00 in Bangkok).
pub const DEFAULT_SCHEDULE: &str = "0 0 1 * * *";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub supabase: SupabaseConfig,
    /// Six-field cron expression (with seconds), evaluated in UTC.
    pub schedule: String,
    pub run_on_start: bool,
    pub http_timeout: Duration,
    pub bond_yield_url: String,
    pub set_index_url: String,
    pub set_yield_url: String,
}

impl SyncConfig {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<L>(lookup: L) -> Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let non_empty = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(*name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let url = non_empty(&["SUPABASE_URL", "SUPABASEURL"])
            .ok_or_else(|| SyncError::Config("SUPABASE_URL must be set".to_string()))?;
        let api_key = non_empty(&["SUPABASE_API_KEY", "SUPABASEAPI"])
            .ok_or_else(|| SyncError::Config("SUPABASE_API_KEY must be set".to_string()))?;

        let run_on_start = match non_empty(&["SYNC_RUN_ON_START"]) {
            Some(value) => parse_flag(&value)
                .ok_or_else(|| SyncError::Config(format!("SYNC_RUN_ON_START: bad value {:?}", value)))?,
            None => false,
        };

        let timeout_secs = match non_empty(&["SYNC_HTTP_TIMEOUT_SECS"]) {
            Some(value) => value.parse::<u64>().map_err(|_| {
                SyncError::Config(format!("SYNC_HTTP_TIMEOUT_SECS must be a number, got {:?}", value))
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(SyncConfig {
            supabase: SupabaseConfig { url, api_key },
            schedule: non_empty(&["SYNC_SCHEDULE"]).unwrap_or_else(|| DEFAULT_SCHEDULE.to_string()),
            run_on_start,
            http_timeout: Duration::from_secs(timeout_secs),
            bond_yield_url: non_empty(&["BOND_YIELD_URL"]).unwrap_or_else(|| BOND_YIELD_URL.to_string()),
            set_index_url: non_empty(&["SET_INDEX_URL"]).unwrap_or_else(|| SET_INDEX_URL.to_string()),
            set_yield_url: non_empty(&["SET_YIELD_URL"]).unwrap_or_else(|| SET_YIELD_URL.to_string()),
        })
    }

    pub fn sources(&self) -> Sources {
        Sources {
            bond: BondYieldSource::new(self.bond_yield_url.clone()),
            set: IndexSource::new(self.set_index_url.clone(), self.set_yield_url.clone()),
            mai: IndexSource::new(self.set_index_url.clone(), self.set_yield_url.clone()),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
