//! Operator interrupt signal.
//!
//! A watch channel carries the number of interrupts seen so far. The
//! session loop waits on it instead of spinning.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct InterruptHandle {
    tx: Arc<watch::Sender<u32>>,
}

#[derive(Debug, Clone)]
pub struct InterruptSignal {
    rx: watch::Receiver<u32>,
}

pub fn interrupt_channel() -> (InterruptHandle, InterruptSignal) {
    let (tx, rx) = watch::channel(0);
    (InterruptHandle { tx: Arc::new(tx) }, InterruptSignal { rx })
}

impl InterruptHandle {
    pub fn trigger(&self) {
        self.tx.send_modify(|count| *count += 1);
    }
}

impl InterruptSignal {
    pub fn count(&self) -> u32 {
        *self.rx.borrow()
    }

    /// Resolves once `count` interrupts have been seen in total.
    ///
    /// A dropped [`InterruptHandle`] can never deliver another interrupt,
    /// so it resolves immediately in that case.
    pub async fn wait_for(&mut self, count: u32) {
        let _ = self.rx.wait_for(|seen| *seen >= count).await;
    }
}
