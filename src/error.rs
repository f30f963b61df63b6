/// Failures talking to a remote form endpoint.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// The request never completed: connection, timeout, or body read failure.
    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

/// Failures reading or writing a durable storage slot.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The slot holds something other than a JSON array of records.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    #[error("{0}")]
    Backend(String),
}
