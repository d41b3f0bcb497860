use std::time::Duration;

use clickhouse::{Client, Row};
use serde::Serialize;
use tracing::warn;

use crate::{batch::{batch_size_for, streaming_threshold}, error::LoaderError};

const MAX_INSERT_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub secure: bool,
}

impl LoaderConfig {
    fn url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }

    fn build_client(&self) -> Client {
        Client::default()
            .with_url(self.url())
            .with_user(&self.user)
            .with_password(&self.password)
            .with_database(&self.database)
    }
}

/// Thin wrapper around a `clickhouse::Client` that owns retry-with-reconnect
/// semantics for batch inserts. Rebuilt connections are cheap — `Client` is
/// just a handle over an HTTP pool — so "reconnect" means rebuilding the
/// client from the stored config rather than anything stateful.
pub struct StoreClient {
    config: LoaderConfig,
    client: Client,
}

impl StoreClient {
    pub fn new(config: LoaderConfig) -> Self {
        let client = config.build_client();
        Self { config, client }
    }

    fn reconnect(&mut self) {
        self.client = self.config.build_client();
    }

    pub async fn health_check(&self) -> Result<(), LoaderError> {
        self.client.query("SELECT 1").execute().await?;
        Ok(())
    }

    pub async fn execute_ddl(&self, statement: &str) -> Result<(), LoaderError> {
        self.client.query(statement).execute().await?;
        Ok(())
    }

    /// Inserts `rows` into `table`. Row counts at or below
    /// `streaming_threshold` go through in a single `insert`; above it, rows
    /// are split into adaptively-sized batches and streamed through one
    /// chunk at a time, so a dataset-sized era never has to buffer every row
    /// of a multi-million-row dataset into one outstanding ClickHouse
    /// insert.
    pub async fn insert_batched<T>(&mut self, table: &str, dataset: &str, rows: &[T]) -> Result<(), LoaderError>
    where
        T: Row + Serialize,
    {
        if rows.len() <= streaming_threshold(dataset) {
            return self.insert_chunk_with_retry(table, rows).await;
        }
        let batch_size = batch_size_for(dataset);
        for chunk in rows.chunks(batch_size) {
            self.insert_chunk_with_retry(table, chunk).await?;
        }
        Ok(())
    }

    async fn insert_chunk_with_retry<T>(&mut self, table: &str, chunk: &[T]) -> Result<(), LoaderError>
    where
        T: Row + Serialize,
    {
        let mut last_err = None;
        for attempt in 0..MAX_INSERT_ATTEMPTS {
            match self.try_insert_chunk(table, chunk).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    let backoff = Duration::from_secs(2u64.saturating_pow(attempt));
                    warn!(table, attempt, rows = chunk.len(), backoff_secs = backoff.as_secs(), "insert attempt failed: {err}");
                    if self.health_check().await.is_err() {
                        self.reconnect();
                    }
                    tokio::time::sleep(backoff).await;
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.expect("loop runs at least once"))
    }

    async fn try_insert_chunk<T>(&self, table: &str, chunk: &[T]) -> Result<(), LoaderError>
    where
        T: Row + Serialize,
    {
        let mut insert = self.client.insert(table)?;
        for row in chunk {
            insert.write(row).await?;
        }
        insert.end().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config(secure: bool) -> LoaderConfig {
        LoaderConfig {
            host: "clickhouse.internal".to_string(),
            port: 8443,
            user: "default".to_string(),
            password: String::new(),
            database: "beacon_chain".to_string(),
            secure,
        }
    }

    #[test]
    fn url_uses_https_when_secure() {
        assert_eq!(sample_config(true).url(), "https://clickhouse.internal:8443");
    }

    #[test]
    fn url_uses_http_when_insecure() {
        assert_eq!(sample_config(false).url(), "http://clickhouse.internal:8443");
    }
}
