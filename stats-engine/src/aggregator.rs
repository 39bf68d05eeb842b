use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use subwatch_core::{ItemKind, ItemRecord};
use tracing::{debug, warn};

use crate::summary;

/// Author with the highest item count and that count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorActivity {
    pub author: String,
    pub count: u64,
}

/// Consistent view of every statistic, taken under a single lock.
#[derive(Debug, Clone)]
pub struct AggregatorSnapshot {
    pub subreddit: String,
    pub kind: ItemKind,
    pub total_count: usize,
    pub most_active_author: Option<AuthorActivity>,
    pub most_recent_item: Option<ItemRecord>,
    pub top_positive: Option<ItemRecord>,
    pub top_negative: Option<ItemRecord>,
}

#[derive(Debug, Clone, Copy)]
struct AuthorTally {
    count: u64,
    first_seen: usize,
}

/// Latest observed signal value and the index of the record that carried it.
#[derive(Debug, Clone, Copy)]
struct SignalEntry {
    value: u64,
    observed_at: usize,
}

#[derive(Debug, Default)]
struct AggregatorState {
    items_seen: Vec<ItemRecord>,
    author_counts: HashMap<String, AuthorTally>,
    positive_by_item: HashMap<String, SignalEntry>,
    negative_by_item: HashMap<String, SignalEntry>,
    first_seen_by_id: HashMap<String, usize>,
}

impl AggregatorState {
    fn record(&mut self, item: ItemRecord) {
        let index = self.items_seen.len();

        if item.has_id() {
            self.first_seen_by_id.entry(item.id.clone()).or_insert(index);

            // Vote counts are totals, so a later observation replaces the earlier one.
            if item.positive_signal > 0 {
                self.positive_by_item.insert(
                    item.id.clone(),
                    SignalEntry {
                        value: item.positive_signal,
                        observed_at: index,
                    },
                );
            }
            if item.negative_signal > 0 {
                self.negative_by_item.insert(
                    item.id.clone(),
                    SignalEntry {
                        value: item.negative_signal,
                        observed_at: index,
                    },
                );
            }
        } else {
            warn!(
                "Item without id in r/{}, skipping signal tracking",
                item.subreddit
            );
        }

        match item.author() {
            Some(author) => {
                self.author_counts
                    .entry(author.to_string())
                    .or_insert(AuthorTally {
                        count: 0,
                        first_seen: index,
                    })
                    .count += 1;
            }
            None => debug!("Item {} has no author, skipping author count", item.id),
        }

        self.items_seen.push(item);
    }

    fn most_active_author(&self) -> Option<AuthorActivity> {
        self.author_counts
            .iter()
            .max_by_key(|(_, tally)| (tally.count, Reverse(tally.first_seen)))
            .map(|(author, tally)| AuthorActivity {
                author: author.clone(),
                count: tally.count,
            })
    }

    fn signal_leader(&self, signals: &HashMap<String, SignalEntry>) -> Option<&ItemRecord> {
        signals
            .iter()
            .max_by_key(|(id, entry)| {
                let first_seen = self
                    .first_seen_by_id
                    .get(id.as_str())
                    .copied()
                    .unwrap_or(usize::MAX);
                (entry.value, Reverse(first_seen))
            })
            .and_then(|(_, entry)| self.items_seen.get(entry.observed_at))
    }
}

/// Running statistics for one (subreddit, kind) pairing.
///
/// Ingestion and queries may come from different tasks; every access goes
/// through one mutex owned by this instance and nothing awaits while it is
/// held.
#[derive(Debug)]
pub struct Aggregator {
    subreddit: String,
    kind: ItemKind,
    state: Mutex<AggregatorState>,
}

impl Aggregator {
    pub fn new(subreddit: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            subreddit: subreddit.into(),
            kind,
            state: Mutex::new(AggregatorState::default()),
        }
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    fn state(&self) -> MutexGuard<'_, AggregatorState> {
        // Ingestion cannot leave the state half-written, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records each item in arrival order. Never fails.
    pub fn ingest_batch(&self, items: Vec<ItemRecord>) {
        if items.is_empty() {
            return;
        }

        let batch_len = items.len();
        let mut state = self.state();
        for item in items {
            state.record(item);
        }
        debug!(
            "Ingested {} {} for r/{} ({} total)",
            batch_len,
            self.kind.plural(),
            self.subreddit,
            state.items_seen.len()
        );
    }

    pub fn total_count(&self) -> usize {
        self.state().items_seen.len()
    }

    /// Ties go to the author whose first item arrived earliest.
    pub fn most_active_author(&self) -> Option<AuthorActivity> {
        self.state().most_active_author()
    }

    /// Last item in arrival order, regardless of its timestamp.
    pub fn most_recent_item(&self) -> Option<ItemRecord> {
        self.state().items_seen.last().cloned()
    }

    pub fn item_with_max_positive_signal(&self) -> Option<ItemRecord> {
        let state = self.state();
        state.signal_leader(&state.positive_by_item).cloned()
    }

    pub fn item_with_max_negative_signal(&self) -> Option<ItemRecord> {
        let state = self.state();
        state.signal_leader(&state.negative_by_item).cloned()
    }

    pub fn snapshot(&self) -> AggregatorSnapshot {
        let state = self.state();
        AggregatorSnapshot {
            subreddit: self.subreddit.clone(),
            kind: self.kind,
            total_count: state.items_seen.len(),
            most_active_author: state.most_active_author(),
            most_recent_item: state.items_seen.last().cloned(),
            top_positive: state.signal_leader(&state.positive_by_item).cloned(),
            top_negative: state.signal_leader(&state.negative_by_item).cloned(),
        }
    }

    pub fn render_summary(&self) -> String {
        summary::render_summary(&self.snapshot())
    }

    pub fn render_quick_stats(&self) -> String {
        summary::render_quick_stats(&self.snapshot())
    }
}
