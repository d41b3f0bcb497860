#[derive(Debug, thiserror::Error)]
pub enum SszError {
    #[error("buffer of {len} bytes is empty")]
    EmptyBuffer { len: usize },
}
