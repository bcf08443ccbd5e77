//! Per-conversation event sequencing.
//!
//! Inbound events that share a conversation key must be processed one at a
//! time, in arrival order; a reply computed from stale state must never
//! overtake a newer one. Events with different keys proceed concurrently.

use std::{
    collections::{HashMap, VecDeque},
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
};

use tracing::debug;

/// A queued unit of work.
type QueuedTask = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Keyed FIFO executor: at most one task in flight per key.
///
/// Queues are created lazily on first use and discarded once drained, so the
/// map only ever holds keys with work outstanding. Cloning is cheap and all
/// clones share the same queues.
#[derive(Clone, Default)]
pub struct Sequencer {
    queues: Arc<Mutex<HashMap<String, VecDeque<QueuedTask>>>>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task behind any outstanding work for `key`.
    ///
    /// Admission is synchronous, so two `enqueue` calls made in sequence are
    /// guaranteed to run in that order. Must be called from within a tokio
    /// runtime.
    pub fn enqueue<F>(&self, key: impl Into<String>, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let key = key.into();
        let task: QueuedTask = Box::pin(task);
        let start_drain = {
            let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
            match queues.get_mut(&key) {
                Some(pending) => {
                    pending.push_back(task);
                    debug!(%key, depth = pending.len(), "queued behind in-flight task");
                    false
                },
                None => {
                    queues.insert(key.clone(), VecDeque::from([task]));
                    true
                },
            }
        };

        if start_drain {
            let sequencer = self.clone();
            tokio::spawn(async move {
                sequencer.drain(&key).await;
            });
        }
    }

    /// Run queued tasks for `key` to completion, then drop the queue.
    ///
    /// Exactly one drain loop exists per live map entry: the `enqueue` call
    /// that inserts the entry spawns it, and only it removes the entry again.
    async fn drain(&self, key: &str) {
        loop {
            let next = {
                let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
                match queues.get_mut(key) {
                    Some(pending) => match pending.pop_front() {
                        Some(task) => Some(task),
                        None => {
                            queues.remove(key);
                            None
                        },
                    },
                    None => None,
                }
            };
            match next {
                Some(task) => task.await,
                None => break,
            }
        }
    }
}
