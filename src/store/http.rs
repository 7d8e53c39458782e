use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::{LedgerStore, StoreError};
use crate::models::Table;

/// Client for a remote spreadsheet-style table service.
///
/// `GET {base}/tables/{name}` returns the table as JSON (404 when absent);
/// `PUT {base}/tables/{name}` replaces it.
#[derive(Debug, Clone)]
pub struct HttpTableStore {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTableStore {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn url(&self, name: &str) -> String {
        format!("{}/tables/{}", self.base_url, name)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

#[async_trait]
impl LedgerStore for HttpTableStore {
    async fn read_table(&self, name: &str) -> Result<Table, StoreError> {
        let resp = self.authorize(self.http.get(self.url(name))).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(name.to_string())),
            StatusCode::TOO_MANY_REQUESTS => Err(StoreError::Unavailable(format!(
                "quota exceeded reading {name}"
            ))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StoreError::Unavailable(
                format!("access to {name} rejected ({})", resp.status()),
            )),
            _ => {
                let body = resp.error_for_status()?.bytes().await?;
                serde_json::from_slice(&body).map_err(|e| StoreError::Malformed {
                    table: name.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn write_table(&self, name: &str, table: &Table) -> Result<(), StoreError> {
        let resp = self
            .authorize(self.http.put(self.url(name)))
            .json(table)
            .send()
            .await?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(StoreError::Unavailable(format!(
                "quota exceeded writing {name}"
            )));
        }
        resp.error_for_status()?;

        tracing::debug!(table = name, rows = table.rows.len(), "Remote table written");
        Ok(())
    }
}
