use feed_client::{BatchReceiver, ItemFeed};
use stats_engine::Aggregator;
use std::collections::HashSet;
use std::sync::Arc;
use subwatch_core::{CoreError, ItemKind};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::console::ItemObserver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Active,
}

struct ActiveSubscription {
    pump: JoinHandle<()>,
}

/// Start/stop wrapper around one feed subscription.
///
/// While active, a pump task hands every delivered batch to the observer
/// and then to the aggregator. `start` and `stop` are idempotent.
pub struct SubscriptionController {
    id: Uuid,
    feed: Arc<dyn ItemFeed>,
    kind: ItemKind,
    aggregator: Arc<Aggregator>,
    observer: ItemObserver,
    active: Mutex<Option<ActiveSubscription>>,
}

impl SubscriptionController {
    pub fn new(
        feed: Arc<dyn ItemFeed>,
        aggregator: Arc<Aggregator>,
        observer: ItemObserver,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: aggregator.kind(),
            feed,
            aggregator,
            observer,
            active: Mutex::new(None),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subreddit(&self) -> &str {
        self.feed.subreddit()
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn aggregator(&self) -> &Arc<Aggregator> {
        &self.aggregator
    }

    pub async fn state(&self) -> ControllerState {
        if self.active.lock().await.is_some() {
            ControllerState::Active
        } else {
            ControllerState::Idle
        }
    }

    /// Takes the baseline, subscribes and starts pumping batches.
    pub async fn start(&self) -> Result<(), CoreError> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            debug!("Subscription {} for r/{} already active", self.id, self.subreddit());
            return Ok(());
        }

        let baseline = self.feed.fetch_recent(self.kind).await?;
        let baseline_ids: HashSet<String> = baseline
            .into_iter()
            .filter(|item| item.has_id())
            .map(|item| item.id)
            .collect();

        let batches = self.feed.subscribe(self.kind).await?;
        let pump = tokio::spawn(pump_batches(
            batches,
            baseline_ids,
            Arc::clone(&self.aggregator),
            Arc::clone(&self.observer),
        ));
        *active = Some(ActiveSubscription { pump });

        info!(
            "Watching r/{} for new {} (subscription {})",
            self.subreddit(),
            self.kind.plural(),
            self.id
        );
        Ok(())
    }

    /// Unsubscribes and waits for in-flight batches to drain.
    ///
    /// The wait lasts until the feed closes its stream; callers that need a
    /// bound wrap this in a timeout. Batches that land after the unsubscribe
    /// call are still recorded. If the feed refuses to unsubscribe the
    /// controller stays `Active` so the stop can be retried.
    pub async fn stop(&self) -> Result<(), CoreError> {
        let mut active = self.active.lock().await;
        if active.is_none() {
            debug!("Subscription {} for r/{} already idle", self.id, self.subreddit());
            return Ok(());
        }

        self.feed.unsubscribe().await?;
        let Some(subscription) = active.take() else {
            return Ok(());
        };
        drop(active);

        if let Err(e) = subscription.pump.await {
            warn!("Batch pump for r/{} ended abnormally: {}", self.subreddit(), e);
        }

        info!("Stopped watching r/{}", self.subreddit());
        Ok(())
    }
}

async fn pump_batches(
    mut batches: BatchReceiver,
    baseline_ids: HashSet<String>,
    aggregator: Arc<Aggregator>,
    observer: ItemObserver,
) {
    while let Some(batch) = batches.recv().await {
        let fresh: Vec<_> = batch
            .into_iter()
            .filter(|item| !item.has_id() || !baseline_ids.contains(&item.id))
            .collect();

        for item in &fresh {
            observer(item);
        }
        aggregator.ingest_batch(fresh);
    }

    debug!("Batch stream for r/{} closed", aggregator.subreddit());
}
