use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use subwatch_core::{CoreError, FeedError, ItemKind, ItemRecord};
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::feed::{BatchReceiver, ItemFeed};
use crate::listing::Listing;

pub const DEFAULT_DELIVERY_INTERVAL: Duration = Duration::from_secs(2);

const BATCH_CHANNEL_CAPACITY: usize = 16;

/// Offline [`ItemFeed`] that replays captured listing pages.
///
/// The first page is the baseline; each later page becomes one batch,
/// delivered every `delivery_interval` after `subscribe`. Ids in the
/// baseline are never delivered; an id seen in an earlier batch is
/// delivered again with its updated counts. Once the pages run out the
/// subscription idles until unsubscribed.
#[derive(Debug)]
pub struct ReplayFeed {
    subreddit: String,
    pages: Arc<[Listing]>,
    delivery_interval: Duration,
    stop_tx: Mutex<Option<watch::Sender<bool>>>,
}

impl ReplayFeed {
    pub fn new(
        subreddit: impl Into<String>,
        pages: Vec<Listing>,
        delivery_interval: Duration,
    ) -> Self {
        Self {
            subreddit: subreddit.into(),
            pages: pages.into(),
            delivery_interval,
            stop_tx: Mutex::new(None),
        }
    }

    /// Parses one listing per non-blank line.
    pub fn from_jsonl(
        subreddit: impl Into<String>,
        contents: &str,
        delivery_interval: Duration,
    ) -> Result<Self, CoreError> {
        let subreddit = subreddit.into();
        let pages = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| Listing::from_json(&subreddit, line))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Loaded {} replay pages for r/{}", pages.len(), subreddit);
        Ok(Self::new(subreddit, pages, delivery_interval))
    }

    /// Opens `<dir>/<subreddit>.jsonl`.
    pub async fn open(
        dir: &Path,
        subreddit: &str,
        delivery_interval: Duration,
    ) -> Result<Self, CoreError> {
        let path = dir.join(format!("{}.jsonl", subreddit));
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FeedError::SubredditNotFound {
                    subreddit: subreddit.to_string(),
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        };

        info!("Replaying r/{} from {}", subreddit, path.display());
        Self::from_jsonl(subreddit, &contents, delivery_interval)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_subscribed(&self) -> bool {
        self.stop_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn baseline(&self, kind: ItemKind) -> Result<Vec<ItemRecord>, CoreError> {
        let first = self.pages.first().ok_or_else(|| FeedError::ReplayExhausted {
            subreddit: self.subreddit.clone(),
        })?;
        Ok(first.clone().into_items(kind))
    }
}

#[async_trait]
impl ItemFeed for ReplayFeed {
    fn subreddit(&self) -> &str {
        &self.subreddit
    }

    async fn fetch_recent(&self, kind: ItemKind) -> Result<Vec<ItemRecord>, CoreError> {
        self.baseline(kind)
    }

    async fn subscribe(&self, kind: ItemKind) -> Result<BatchReceiver, CoreError> {
        let baseline = self.baseline(kind)?;

        let (stop_tx, mut stop_rx) = watch::channel(false);
        {
            let mut slot = self.stop_tx.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_some() {
                return Err(FeedError::SubscriptionFailed {
                    subreddit: self.subreddit.clone(),
                    reason: "already subscribed".to_string(),
                }
                .into());
            }
            *slot = Some(stop_tx);
        }

        let (batch_tx, batch_rx) = mpsc::channel(BATCH_CHANNEL_CAPACITY);
        let pages = Arc::clone(&self.pages);
        let interval = self.delivery_interval;
        let subreddit = self.subreddit.clone();
        let baseline_ids: HashSet<String> = baseline.into_iter().map(|item| item.id).collect();

        tokio::spawn(async move {
            for page in pages.iter().skip(1) {
                tokio::select! {
                    _ = stop_rx.changed() => {
                        debug!("Replay for r/{} stopped", subreddit);
                        return;
                    }
                    _ = sleep(interval) => {}
                }

                let batch: Vec<ItemRecord> = page
                    .clone()
                    .into_items(kind)
                    .into_iter()
                    .filter(|item| !item.has_id() || !baseline_ids.contains(&item.id))
                    .collect();
                if batch.is_empty() {
                    continue;
                }

                debug!("Replaying {} {} for r/{}", batch.len(), kind.plural(), subreddit);
                if batch_tx.send(batch).await.is_err() {
                    warn!("Batch receiver for r/{} dropped, ending replay", subreddit);
                    return;
                }
            }

            debug!("Replay pages for r/{} exhausted", subreddit);
            let _ = stop_rx.changed().await;
        });

        Ok(batch_rx)
    }

    async fn unsubscribe(&self) -> Result<(), CoreError> {
        let stop_tx = self
            .stop_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(stop_tx) = stop_tx {
            let _ = stop_tx.send(true);
            info!("Unsubscribed from r/{}", self.subreddit);
        }
        Ok(())
    }
}
