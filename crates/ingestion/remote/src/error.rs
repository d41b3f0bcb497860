#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("could not parse era range {0:?}")]
    InvalidRange(String),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("download of {url} failed after {attempts} attempts")]
    DownloadExhausted { url: String, attempts: u32 },
    #[error("io error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
