// Upstream port - bulk query plus change subscription
use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::error::SourceError;
use crate::domain::reading::Reading;

/// What kind of row-level change upstream reported. Informational only; any
/// event triggers a full refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind) -> Self {
        Self { kind }
    }
}

/// Dropping the stream releases the subscription.
pub type ChangeStream = BoxStream<'static, ChangeEvent>;

#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Fetch up to `limit` most recent rows, newest first
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<Reading>, SourceError>;

    /// Subscribe to row-level change notifications for the table
    async fn subscribe(&self) -> Result<ChangeStream, SourceError>;
}
