// src/services/supabase.rs

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::error::{Result, SyncError};
use crate::services::db::Store;

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub api_key: String,
}

/// Store backed by a Supabase project's PostgREST endpoint.
pub struct SupabaseStore {
    config: SupabaseConfig,
    client: Client,
}

impl SupabaseStore {
    pub fn new(config: SupabaseConfig, client: Client) -> Self {
        SupabaseStore { config, client }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }
}

#[async_trait]
impl Store for SupabaseStore {
    async fn latest(&self, table: &str) -> Result<Option<Value>> {
        let url = self.table_url(table);
        let query_error = |reason: String| SyncError::StoreQuery {
            table: table.to_string(),
            reason,
        };

        let rows: Vec<Value> = self
            .authorized(self.client.get(&url))
            .query(&[("select", "*"), ("order", "id.desc"), ("limit", "1")])
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| query_error(e.to_string()))?
            .json()
            .await
            .map_err(|e| query_error(e.to_string()))?;

        debug!("Latest row of {}: {:?}", table, rows.first());
        Ok(rows.into_iter().next())
    }

    async fn insert_many(&self, table: &str, rows: Vec<Value>) -> Result<usize> {
        let url = self.table_url(table);
        let count = rows.len();

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "return=minimal")
            .json(&rows)
            .send()
            .await
            .map_err(|e| SyncError::StoreInsert {
                table: table.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SyncError::StoreInsert {
                table: table.to_string(),
                reason: format!("{}: {}", status, error_text),
            });
        }

        info!("Inserted {} rows into {}", count, table);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_ignores_trailing_slash() {
        let store = SupabaseStore::new(
            SupabaseConfig {
                url: "https://project.supabase.co/".to_string(),
                api_key: "key".to_string(),
            },
            Client::new(),
        );
        assert_eq!(
            store.table_url("SET_Return"),
            "https://project.supabase.co/rest/v1/SET_Return"
        );
    }
}
