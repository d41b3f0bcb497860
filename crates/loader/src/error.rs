#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("clickhouse error: {0}")]
    ClickHouse(#[from] clickhouse::error::Error),
    #[error("state store error: {0}")]
    Store(#[from] era_state::StoreError),
    #[error("migration {version} failed: {reason}")]
    MigrationFailed { version: String, reason: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
