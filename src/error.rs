use thiserror::Error;

/// Failures reported by a [`crate::store::Store`].
///
/// These never escape the explorer operations: the list fetcher and the
/// action executor log them and degrade locally.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store answered with status {0}")]
    Status(u16),

    #[error("could not decode listing: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures that abort a command of the binary.
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("logging setup failed: {0}")]
    Logging(String),
}
