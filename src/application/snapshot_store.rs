// Repository trait for persisted snapshot blobs
use async_trait::async_trait;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// The blob stored under `key`, or `None` if nothing has been saved yet.
    async fn load(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    /// Replace the blob stored under `key`.
    async fn save(&self, key: &str, blob: &[u8]) -> anyhow::Result<()>;
}
