#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("era file too short to contain a version header")]
    MissingVersionHeader,
    #[error("truncated record header at offset {offset}")]
    TruncatedRecordHeader { offset: usize },
    #[error("truncated record payload at offset {offset}: need {need} bytes")]
    TruncatedRecordPayload { offset: usize, need: usize },
    #[error("snappy decompression failed: {0}")]
    Decompression(String),
    #[error("could not parse era metadata from filename {filename:?}")]
    InvalidFilename { filename: String },
}
