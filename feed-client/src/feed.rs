use async_trait::async_trait;
use subwatch_core::{CoreError, ItemKind, ItemRecord};
use tokio::sync::mpsc;

/// Receiving end of a subscription. The feed closes it once unsubscribed.
pub type BatchReceiver = mpsc::Receiver<Vec<ItemRecord>>;

/// Transport capability for a single subreddit.
///
/// `fetch_recent` establishes the "as of now" baseline; batches delivered
/// after `subscribe` must only carry items created after that baseline.
/// Delivery happens on the feed's own tasks, concurrently with callers.
#[async_trait]
pub trait ItemFeed: Send + Sync {
    fn subreddit(&self) -> &str;

    async fn fetch_recent(&self, kind: ItemKind) -> Result<Vec<ItemRecord>, CoreError>;

    async fn subscribe(&self, kind: ItemKind) -> Result<BatchReceiver, CoreError>;

    /// Stops delivery. May return before the last in-flight batch lands.
    async fn unsubscribe(&self) -> Result<(), CoreError>;
}
