use feed_client::ItemFeed;
use futures::future::join_all;
use stats_engine::Aggregator;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use subwatch_core::{AppConfig, CoreError, ErrorExt, ItemKind};
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use crate::console::ItemObserver;
use crate::interrupt::InterruptSignal;
use crate::subscription::SubscriptionController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Setup,
    Polling,
    Teardown,
    Terminal,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub kind: ItemKind,
    pub subreddits: Vec<String>,
    pub quick_stats_interval: Duration,
    pub stop_timeout: Duration,
}

impl From<&AppConfig> for SessionConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            kind: config.kind,
            subreddits: config.subreddits.clone(),
            quick_stats_interval: config.quick_stats_interval(),
            stop_timeout: config.stop_timeout(),
        }
    }
}

/// One watched subreddit: its statistics and the subscription feeding them.
pub struct SubredditWatch {
    pub subreddit: String,
    pub aggregator: Arc<Aggregator>,
    pub controller: SubscriptionController,
}

/// Drives every watched subreddit through setup, polling with periodic
/// quick stats, teardown with final summaries, and the exit gate.
pub struct SessionDriver {
    config: SessionConfig,
    watches: Vec<SubredditWatch>,
    phase: SessionPhase,
}

impl SessionDriver {
    /// `feeds` must line up with `config.subreddits`.
    pub fn new(
        config: SessionConfig,
        feeds: Vec<Arc<dyn ItemFeed>>,
        observer: ItemObserver,
    ) -> Result<Self, CoreError> {
        if feeds.len() != config.subreddits.len() {
            return Err(CoreError::InvalidInput {
                message: format!(
                    "{} feeds supplied for {} subreddits",
                    feeds.len(),
                    config.subreddits.len()
                ),
            });
        }

        let mut watches = Vec::with_capacity(feeds.len());
        for (subreddit, feed) in config.subreddits.iter().zip(feeds) {
            if !feed.subreddit().eq_ignore_ascii_case(subreddit) {
                return Err(CoreError::InvalidInput {
                    message: format!(
                        "feed for r/{} supplied where r/{} was expected",
                        feed.subreddit(),
                        subreddit
                    ),
                });
            }

            let aggregator = Arc::new(Aggregator::new(subreddit.clone(), config.kind));
            let controller =
                SubscriptionController::new(feed, Arc::clone(&aggregator), Arc::clone(&observer));
            watches.push(SubredditWatch {
                subreddit: subreddit.clone(),
                aggregator,
                controller,
            });
        }

        Ok(Self {
            config,
            watches,
            phase: SessionPhase::Setup,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn watches(&self) -> &[SubredditWatch] {
        &self.watches
    }

    fn enter(&mut self, phase: SessionPhase) {
        info!("Session phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Starts every subscription. If any fails, the ones already started
    /// are stopped again and the error is returned.
    pub async fn setup(&mut self) -> Result<(), CoreError> {
        for index in 0..self.watches.len() {
            if let Err(e) = self.watches[index].controller.start().await {
                e.log_error();
                self.stop_all().await;
                return Err(e);
            }
        }

        info!(
            "Watching {} subreddit(s) for new {}",
            self.watches.len(),
            self.config.kind.plural()
        );
        self.enter(SessionPhase::Polling);
        Ok(())
    }

    /// Emits quick stats every interval until the first interrupt.
    /// Returns the number of quick-stat rounds written.
    pub async fn poll(
        &mut self,
        interrupt: &mut InterruptSignal,
        out: &mut (dyn Write + Send),
    ) -> Result<u64, CoreError> {
        let mut rounds = 0;
        loop {
            tokio::select! {
                _ = interrupt.wait_for(1) => break,
                _ = sleep(self.config.quick_stats_interval) => {
                    rounds += 1;
                    self.write_quick_stats(out)?;
                }
            }
        }

        info!("Interrupt received after {} quick-stat round(s)", rounds);
        self.enter(SessionPhase::Teardown);
        Ok(rounds)
    }

    pub fn write_quick_stats(&self, out: &mut (dyn Write + Send)) -> Result<(), CoreError> {
        for watch in &self.watches {
            write!(out, "{}", watch.aggregator.render_quick_stats())?;
        }
        out.flush()?;
        Ok(())
    }

    /// Stops every subscription, each bounded by the stop timeout, then
    /// writes the final summaries in configured order.
    pub async fn teardown(&mut self, out: &mut (dyn Write + Send)) -> Result<(), CoreError> {
        let failures = self.stop_all().await;
        if !failures.is_empty() {
            warn!("{} subscription(s) did not stop cleanly", failures.len());
        }

        for watch in &self.watches {
            writeln!(out, "{}", watch.aggregator.render_summary())?;
        }
        out.flush()?;

        self.enter(SessionPhase::Terminal);
        Ok(())
    }

    /// Stops every subscription concurrently. Returns the failures, with a
    /// `CoreError::Timeout` for each stop that outlived the stop timeout.
    pub(crate) async fn stop_all(&self) -> Vec<CoreError> {
        let stop_timeout = self.config.stop_timeout;
        let stops = self.watches.iter().map(|watch| async move {
            let error = match timeout(stop_timeout, watch.controller.stop()).await {
                Ok(Ok(())) => return None,
                Ok(Err(e)) => e,
                Err(_) => {
                    warn!("Leaving r/{} to wind down in the background", watch.subreddit);
                    CoreError::Timeout {
                        seconds: stop_timeout.as_secs(),
                    }
                }
            };
            error.log_warn();
            Some(error)
        });
        join_all(stops).await.into_iter().flatten().collect()
    }

    /// Full run: setup, polling, teardown, then waits for the second
    /// interrupt before returning.
    pub async fn run(
        &mut self,
        interrupt: &mut InterruptSignal,
        out: &mut (dyn Write + Send),
    ) -> Result<(), CoreError> {
        self.setup().await?;
        self.poll(interrupt, out).await?;
        self.teardown(out).await?;

        writeln!(out, "Press Ctrl+C again to exit.")?;
        out.flush()?;
        interrupt.wait_for(2).await;
        info!("Session finished");
        Ok(())
    }
}
