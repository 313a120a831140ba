// Error taxonomy shared by the cache, rollups and endpoints
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatisticsError {
    /// The sample source could not be queried. Persisted snapshots are untouched.
    #[error("sample source unavailable: {0:#}")]
    SourceUnavailable(#[source] anyhow::Error),

    /// No data has been recorded for the requested snapshot or day.
    #[error("no data available: {0}")]
    DataUnavailable(String),

    /// A persisted snapshot could not be decoded into daily records.
    #[error("malformed snapshot {key}: {reason}")]
    MalformedSnapshot { key: String, reason: String },

    /// The snapshot store failed to read or write a blob.
    #[error("snapshot store failure: {0:#}")]
    Store(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StatisticsError>;
